//! The meta-collection task executed once per configuration point.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collector::BoundCollector;
use crate::config::{CorpusInput, ExperimentPoint, FeatureMode};
use crate::constants::storage::{INPUT_KEY, MANIFEST_FILENAME, MANIFEST_VERSION, META_KEY};
use crate::errors::MetaError;
use crate::hash::fingerprint;
use crate::pipeline::MetaPipeline;
use crate::reader::{CorpusReader, LineCorpusReader, SerializedCorpusReader};
use crate::resolve::resolve_meta_collectors;
use crate::storage::{AccessMode, StorageService};
use crate::transport::fs::write_atomic;

/// Lifecycle of one task execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskState {
    /// Created, never executed.
    #[default]
    Unbound,
    /// Resolving collectors.
    Resolving,
    /// Pipeline built, scan not started.
    Assembled,
    /// Scanning the corpus.
    Running,
    /// Artifacts and manifest written.
    Completed,
    /// Last execution failed.
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskState::Unbound => "unbound",
            TaskState::Resolving => "resolving",
            TaskState::Assembled => "assembled",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Record written last into the meta folder of a successful run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Manifest format version.
    pub version: u8,
    /// Fingerprint of the configuration point that produced the artifacts.
    pub fingerprint: String,
    /// Feature mode of the run.
    pub feature_mode: FeatureMode,
    /// UTC completion time.
    pub completed_at: DateTime<Utc>,
    /// Documents scanned.
    pub documents: usize,
    /// Artifact file names relative to the meta folder.
    pub artifacts: Vec<String>,
}

impl RunManifest {
    /// Read the manifest of `meta_folder`, if one exists.
    pub fn load(meta_folder: &Path) -> Result<Option<Self>, MetaError> {
        let path = meta_folder.join(MANIFEST_FILENAME);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = fs::read(&path)?;
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|err| MetaError::Artifact {
                path,
                reason: err.to_string(),
            })
    }
}

/// Summary of a completed execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaRunReport {
    /// Configuration fingerprint recorded in the manifest.
    pub fingerprint: String,
    /// Documents scanned.
    pub documents: usize,
    /// Absolute artifact paths, in collector order.
    pub artifacts: Vec<PathBuf>,
    /// Path of the written manifest.
    pub manifest: PathBuf,
}

/// Runs the meta-collection pre-pass for one configuration point.
///
/// Each `execute` resolves the collectors, assembles the pipeline, scans the
/// corpus once, and records a manifest. Failures are reported with the
/// configuration point attached and leave the task in `TaskState::Failed`.
#[derive(Debug)]
pub struct MetaInfoTask {
    point: ExperimentPoint,
    state: TaskState,
}

impl MetaInfoTask {
    /// Task for `point`, in `TaskState::Unbound`.
    pub fn new(point: ExperimentPoint) -> Self {
        Self {
            point,
            state: TaskState::Unbound,
        }
    }

    /// State after the last `execute`.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Configuration point this task runs.
    pub fn point(&self) -> &ExperimentPoint {
        &self.point
    }

    /// Resolve the bound collectors without touching storage.
    pub fn plan(&self) -> Result<Vec<BoundCollector>, MetaError> {
        resolve_meta_collectors(&self.point.extractors, self.point.feature_mode)
    }

    /// Fingerprint of the configuration point, its resolved collectors, and
    /// the size and modification time of every corpus file.
    pub fn fingerprint(&self, storage: &dyn StorageService) -> Result<String, MetaError> {
        let collectors = self.plan()?;
        let reader = self.reader(storage)?;
        self.fingerprint_of(&collectors, reader.as_ref())
    }

    /// True when the last successful run used the same configuration and all
    /// of its artifacts are still present.
    pub fn is_up_to_date(&self, storage: &dyn StorageService) -> Result<bool, MetaError> {
        let fingerprint = self.fingerprint(storage)?;
        let meta = storage.folder(META_KEY, AccessMode::ReadOnly)?;
        let Some(manifest) = RunManifest::load(&meta)? else {
            return Ok(false);
        };
        Ok(manifest.version == MANIFEST_VERSION
            && manifest.fingerprint == fingerprint
            && manifest
                .artifacts
                .iter()
                .all(|artifact| meta.join(artifact).is_file()))
    }

    /// Open the corpus configured for this point.
    pub fn reader(&self, storage: &dyn StorageService) -> Result<Box<dyn CorpusReader>, MetaError> {
        Ok(match &self.point.corpus {
            CorpusInput::Imported => {
                let input = storage.folder(INPUT_KEY, AccessMode::ReadOnly)?;
                Box::new(SerializedCorpusReader::from_root(input))
            }
            CorpusInput::Files { root, files } => Box::new(SerializedCorpusReader::from_files(
                root.display().to_string(),
                files.iter().map(|file| root.join(file)).collect(),
            )),
            CorpusInput::Lines { path, language } => {
                let reader = LineCorpusReader::new(path);
                match language {
                    Some(language) => Box::new(reader.with_language(language.clone())),
                    None => Box::new(reader),
                }
            }
        })
    }

    /// Run the pre-pass and write artifacts plus manifest into the meta folder.
    pub fn execute(&mut self, storage: &dyn StorageService) -> Result<MetaRunReport, MetaError> {
        info!(point = %self.point.describe(), "meta collection task starting");
        match self.execute_inner(storage) {
            Ok(report) => {
                self.state = TaskState::Completed;
                info!(
                    fingerprint = %report.fingerprint,
                    documents = report.documents,
                    artifacts = report.artifacts.len(),
                    "meta collection task completed"
                );
                Ok(report)
            }
            Err(err) => {
                let from = self.state;
                self.state = TaskState::Failed;
                warn!(state = %from, error = %err, "meta collection task failed");
                Err(err.at_point(self.point.describe()))
            }
        }
    }

    fn execute_inner(&mut self, storage: &dyn StorageService) -> Result<MetaRunReport, MetaError> {
        self.state = TaskState::Resolving;
        let collectors = self.plan()?;
        let reader = self.reader(storage)?;
        let fingerprint = self.fingerprint_of(&collectors, reader.as_ref())?;

        let meta = storage.folder(META_KEY, AccessMode::ReadWrite)?;
        let manifest_path = meta.join(MANIFEST_FILENAME);
        if manifest_path.exists() {
            debug!(path = %manifest_path.display(), "removing stale manifest");
            fs::remove_file(&manifest_path)?;
        }

        let pipeline = MetaPipeline::assemble(
            reader,
            collectors,
            self.point.views.as_deref(),
            &meta,
        )?;
        self.state = TaskState::Assembled;
        debug!(stages = pipeline.stages().len(), "pipeline assembled");

        self.state = TaskState::Running;
        let report = pipeline.run()?;

        let manifest = RunManifest {
            version: MANIFEST_VERSION,
            fingerprint: fingerprint.clone(),
            feature_mode: self.point.feature_mode,
            completed_at: Utc::now(),
            documents: report.documents,
            artifacts: report
                .artifacts
                .iter()
                .filter_map(|path| path.strip_prefix(&meta).ok())
                .map(|relative| relative.to_string_lossy().into_owned())
                .collect(),
        };
        let encoded = serde_json::to_vec_pretty(&manifest).map_err(|err| MetaError::Artifact {
            path: manifest_path.clone(),
            reason: err.to_string(),
        })?;
        write_atomic(&manifest_path, &encoded)?;

        Ok(MetaRunReport {
            fingerprint,
            documents: report.documents,
            artifacts: report.artifacts,
            manifest: manifest_path,
        })
    }

    fn fingerprint_of(
        &self,
        collectors: &[BoundCollector],
        reader: &dyn CorpusReader,
    ) -> Result<String, MetaError> {
        let mut parts = vec![self.point.describe(), format!("{:?}", self.point.corpus)];
        parts.extend(collectors.iter().map(BoundCollector::signature));
        for source in reader.sources()? {
            parts.push(source_stamp(&source));
        }
        Ok(fingerprint(MANIFEST_VERSION, parts))
    }
}

/// `path:len:mtime_nanos`, or `path:missing` when the file cannot be stat'ed.
fn source_stamp(path: &Path) -> String {
    match fs::metadata(path) {
        Ok(metadata) => {
            let modified = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |elapsed| elapsed.as_nanos());
            format!("{}:{}:{modified}", path.display(), metadata.len())
        }
        Err(_) => format!("{}:missing", path.display()),
    }
}
