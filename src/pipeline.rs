//! Pipeline assembly and the single-pass collection scan.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::collector::{BoundCollector, MetaCollector};
use crate::constants::corpus::DEFAULT_VIEW;
use crate::errors::MetaError;
use crate::reader::CorpusReader;
use crate::resolve::ensure_unique_paths;
use crate::transport::fs::{ensure_readable_dir, write_atomic};
use crate::types::ViewName;

/// A bound collector attached to the views it reads.
#[derive(Clone, Debug)]
pub struct PipelineStage {
    /// Collector with its resolved storage paths.
    pub collector: BoundCollector,
    /// Views presented to the collector, in order, for every document.
    pub views: Vec<ViewName>,
}

/// Outcome of a completed scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Documents read from the corpus.
    pub documents: usize,
    /// Artifact files written, in collector order.
    pub artifacts: Vec<PathBuf>,
}

/// Corpus reader followed by the bound collectors of one configuration point.
pub struct MetaPipeline {
    reader: Box<dyn CorpusReader>,
    stages: Vec<PipelineStage>,
    output_root: PathBuf,
}

impl MetaPipeline {
    /// Attach every collector to the restricted views, or to the default view
    /// when `views` is `None`.
    ///
    /// The output folder is created and verified before any document is read,
    /// also when there are no collectors.
    pub fn assemble(
        reader: Box<dyn CorpusReader>,
        collectors: Vec<BoundCollector>,
        views: Option<&[ViewName]>,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self, MetaError> {
        let views: Vec<ViewName> = match views {
            None => vec![DEFAULT_VIEW.to_string()],
            Some([]) => {
                return Err(MetaError::Configuration(
                    "view restriction names no views".into(),
                ));
            }
            Some(views) => {
                let mut unique: Vec<ViewName> = Vec::with_capacity(views.len());
                for view in views {
                    if unique.contains(view) {
                        return Err(MetaError::Configuration(format!(
                            "view '{view}' is named more than once"
                        )));
                    }
                    unique.push(view.clone());
                }
                unique
            }
        };
        ensure_unique_paths(&collectors)?;
        let output_root = output_root.into();
        ensure_readable_dir(&output_root)?;

        let stages = collectors
            .into_iter()
            .map(|collector| PipelineStage {
                collector,
                views: views.clone(),
            })
            .collect();
        Ok(Self {
            reader,
            stages,
            output_root,
        })
    }

    /// Stages in collector order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Folder the artifacts are written to.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Scan the corpus once, then flush every artifact.
    ///
    /// Nothing is written unless the whole scan and every `finish` succeeded.
    pub fn run(self) -> Result<PipelineReport, MetaError> {
        let started = Instant::now();
        let mut running: Vec<(&PipelineStage, Box<dyn MetaCollector>)> = self
            .stages
            .iter()
            .map(|stage| {
                stage
                    .collector
                    .instantiate()
                    .map(|collector| (stage, collector))
            })
            .collect::<Result<_, MetaError>>()?;

        info!(
            reader = self.reader.id(),
            collectors = running.len(),
            output = %self.output_root.display(),
            "starting meta collection scan"
        );
        let mut documents = 0usize;
        for document in self.reader.open()? {
            let document = document?;
            for (stage, collector) in running.iter_mut() {
                for view_name in &stage.views {
                    let view = document.view(view_name).ok_or_else(|| MetaError::MissingView {
                        document: document.id.clone(),
                        view: view_name.clone(),
                    })?;
                    collector.collect(&document, view)?;
                }
            }
            documents += 1;
        }
        debug!(documents, "scan complete, finishing collectors");

        let mut pending = Vec::new();
        for (stage, collector) in running {
            let artifacts = collector.finish()?;
            for (relative, bytes) in stage.collector.place_artifacts(artifacts)? {
                pending.push((self.output_root.join(relative), bytes));
            }
        }

        let mut written = Vec::with_capacity(pending.len());
        for (path, bytes) in pending {
            write_atomic(&path, &bytes)?;
            debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
            written.push(path);
        }
        info!(
            documents,
            artifacts = written.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "meta collection scan finished"
        );
        Ok(PipelineReport {
            documents,
            artifacts: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::read_frequency_table;
    use crate::config::FeatureMode;
    use crate::constants::implementations::NGRAM;
    use crate::document::{Document, DocumentView};
    use crate::extractor::ExtractorDescriptor;
    use crate::reader::InMemoryCorpus;
    use crate::resolve::resolve_meta_collectors;
    use tempfile::tempdir;

    fn unigram_collectors(identity: &str) -> Vec<BoundCollector> {
        let descriptor = ExtractorDescriptor::named(identity, NGRAM)
            .with_parameter("min_n", 1)
            .with_parameter("max_n", 1);
        resolve_meta_collectors(&[descriptor], FeatureMode::Document).unwrap()
    }

    fn two_view_document(id: &str, source: &str, target: &str) -> Document {
        Document::with_views(
            id,
            vec![
                DocumentView::new("source", source),
                DocumentView::new("target", target),
            ],
        )
    }

    #[test]
    fn zero_collectors_still_prepare_the_output_folder() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("meta");
        let corpus = InMemoryCorpus::new("mem", vec![Document::single_view("0", "plum")]);
        let pipeline = MetaPipeline::assemble(Box::new(corpus), Vec::new(), None, &output).unwrap();
        assert!(output.is_dir());
        let report = pipeline.run().unwrap();
        assert_eq!(report.documents, 1);
        assert!(report.artifacts.is_empty());
    }

    #[test]
    fn restricted_views_feed_one_collector_per_binding() {
        let temp = tempdir().unwrap();
        let corpus = InMemoryCorpus::new(
            "pairs",
            vec![
                two_view_document("0", "plum tart", "plum jam"),
                two_view_document("1", "fig", "plum"),
            ],
        );
        let views = vec!["source".to_string(), "target".to_string()];
        let pipeline = MetaPipeline::assemble(
            Box::new(corpus),
            unigram_collectors("u"),
            Some(&views),
            temp.path(),
        )
        .unwrap();
        assert_eq!(pipeline.stages()[0].views, views);

        let report = pipeline.run().unwrap();
        assert_eq!(report.artifacts, vec![temp.path().join("u-ngrams.bin")]);
        let table = read_frequency_table(&report.artifacts[0]).unwrap();
        assert_eq!(table.documents, 4);
        assert_eq!(table.count("plum"), Some(3));
    }

    #[test]
    fn empty_or_repeated_view_restrictions_are_rejected() {
        let temp = tempdir().unwrap();
        let empty: Vec<ViewName> = Vec::new();
        let err = MetaPipeline::assemble(
            Box::new(InMemoryCorpus::new("mem", Vec::new())),
            Vec::new(),
            Some(&empty),
            temp.path(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MetaError::Configuration(_)));

        let repeated = vec!["a".to_string(), "a".to_string()];
        let err = MetaPipeline::assemble(
            Box::new(InMemoryCorpus::new("mem", Vec::new())),
            Vec::new(),
            Some(&repeated),
            temp.path(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("named more than once"));
    }

    #[test]
    fn missing_views_abort_without_writing_artifacts() {
        let temp = tempdir().unwrap();
        let corpus = InMemoryCorpus::new(
            "mixed",
            vec![
                two_view_document("0", "plum", "fig"),
                Document::single_view("1", "pear"),
            ],
        );
        let views = vec!["target".to_string()];
        let pipeline = MetaPipeline::assemble(
            Box::new(corpus),
            unigram_collectors("u"),
            Some(&views),
            temp.path(),
        )
        .unwrap();
        let err = pipeline.run().unwrap_err();
        match err {
            MetaError::MissingView { document, view } => {
                assert_eq!(document, "1");
                assert_eq!(view, "target");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
