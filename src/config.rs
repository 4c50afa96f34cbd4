use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::collectors::{KEYWORDS, KEYWORDS_FILE};
use crate::errors::MetaError;
use crate::extractor::ExtractorDescriptor;
use crate::types::{ExtractorId, ParameterMap, ViewName};

/// Granularity of the classification target.
///
/// Only `Unit` and `Sequence` add mode-level context collectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    /// One outcome per document.
    #[default]
    Document,
    /// One outcome per classification unit.
    Unit,
    /// One outcome per unit, classified jointly per sequence.
    Sequence,
    /// One outcome per document pair.
    Pair,
}

impl FeatureMode {
    /// Lowercase name as written in experiment files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureMode::Document => "document",
            FeatureMode::Unit => "unit",
            FeatureMode::Sequence => "sequence",
            FeatureMode::Pair => "pair",
        }
    }
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureMode {
    type Err = MetaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(FeatureMode::Document),
            "unit" => Ok(FeatureMode::Unit),
            "sequence" => Ok(FeatureMode::Sequence),
            "pair" => Ok(FeatureMode::Pair),
            other => Err(MetaError::Configuration(format!(
                "unknown feature mode '{other}'"
            ))),
        }
    }
}

/// Where the documents of one run come from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CorpusInput {
    /// Serialized documents imported into the task's `input` folder.
    #[default]
    Imported,
    /// Explicit serialized document files relative to `root` (cross-validation folds).
    Files {
        /// Folder the file list is relative to.
        root: PathBuf,
        /// Serialized document files, read in this order.
        files: Vec<PathBuf>,
    },
    /// One document per line of a plain or gzip-compressed text file.
    Lines {
        /// Text file, `.gz` for gzip.
        path: PathBuf,
        /// Language assigned to every document.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

/// One configuration point of an experiment sweep.
#[derive(Clone, Debug, Default)]
pub struct ExperimentPoint {
    /// Feature extractors in configuration order.
    pub extractors: Vec<ExtractorDescriptor>,
    /// Active feature mode.
    pub feature_mode: FeatureMode,
    /// Optional view restriction; `None` runs against the default view.
    pub views: Option<Vec<ViewName>>,
    /// Document source for the scan.
    pub corpus: CorpusInput,
}

impl ExperimentPoint {
    /// Point with no extractors, the default view, and an imported corpus.
    pub fn new(feature_mode: FeatureMode) -> Self {
        Self {
            feature_mode,
            ..Self::default()
        }
    }

    /// Append a feature extractor.
    pub fn with_extractor(mut self, extractor: ExtractorDescriptor) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Restrict collectors to the named views.
    pub fn with_views<I, V>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ViewName>,
    {
        self.views = Some(views.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the document source.
    pub fn with_corpus(mut self, corpus: CorpusInput) -> Self {
        self.corpus = corpus;
        self
    }

    /// Extractor identities in configuration order.
    pub fn identities(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.identity()).collect()
    }

    /// Human-readable coordinate of this point, used in error reports.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "feature_mode={} extractors=[{}]",
            self.feature_mode,
            self.identities().join(", ")
        );
        if let Some(views) = &self.views {
            out.push_str(&format!(" views=[{}]", views.join(", ")));
        }
        out
    }
}

/// Serialized extractor entry of an experiment file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Unique extractor identity.
    pub identity: ExtractorId,
    /// Built-in implementation name.
    pub implementation: String,
    /// Implementation parameters.
    #[serde(default)]
    pub parameters: ParameterMap,
}

impl ExtractorConfig {
    fn inline_keyword_file(&mut self, base: &Path) -> Result<(), MetaError> {
        let Some(value) = self.parameters.shift_remove(KEYWORDS_FILE) else {
            return Ok(());
        };
        let Value::String(relative) = value else {
            return Err(MetaError::Configuration(format!(
                "extractor '{}': {KEYWORDS_FILE} must be a path string",
                self.identity
            )));
        };
        let path = base.join(relative);
        let raw = fs::read_to_string(&path).map_err(|err| {
            MetaError::Configuration(format!(
                "extractor '{}': cannot read keywords file '{}': {err}",
                self.identity,
                path.display()
            ))
        })?;
        let entry = self
            .parameters
            .entry(KEYWORDS.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(keywords) = entry else {
            return Err(MetaError::Configuration(format!(
                "extractor '{}': {KEYWORDS} must be a list of strings",
                self.identity
            )));
        };
        keywords.extend(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| Value::String(line.to_string())),
        );
        Ok(())
    }
}

/// Serialized experiment configuration point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Feature mode, `document` when omitted.
    #[serde(default)]
    pub feature_mode: FeatureMode,
    /// View restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Vec<ViewName>>,
    /// Corpus input; relative paths are resolved by `from_path`.
    #[serde(default)]
    pub corpus: CorpusInput,
    /// Extractors in configuration order.
    #[serde(default)]
    pub extractors: Vec<ExtractorConfig>,
}

impl ExperimentConfig {
    /// Load a JSON experiment file.
    ///
    /// Relative corpus paths and keyword files are resolved against the
    /// file's directory. Keyword files are read here, once, and their entries
    /// are merged into the extractor's `keywords` list.
    pub fn from_path(path: &Path) -> Result<Self, MetaError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            MetaError::Configuration(format!(
                "cannot parse experiment file '{}': {err}",
                path.display()
            ))
        })?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.anchored_at(&base)
    }

    /// Resolve relative paths against `base` and inline keyword files.
    pub fn anchored_at(mut self, base: &Path) -> Result<Self, MetaError> {
        self.corpus = match self.corpus {
            CorpusInput::Imported => CorpusInput::Imported,
            CorpusInput::Files { root, files } => CorpusInput::Files {
                root: base.join(root),
                files,
            },
            CorpusInput::Lines { path, language } => CorpusInput::Lines {
                path: base.join(path),
                language,
            },
        };
        for entry in &mut self.extractors {
            entry.inline_keyword_file(base)?;
        }
        Ok(self)
    }

    /// Build the configuration point, keeping extractor order.
    pub fn into_point(self) -> ExperimentPoint {
        ExperimentPoint {
            extractors: self
                .extractors
                .into_iter()
                .map(|entry| {
                    ExtractorDescriptor::named(entry.identity, entry.implementation)
                        .with_parameters(entry.parameters)
                })
                .collect(),
            feature_mode: self.feature_mode,
            views: self.views,
            corpus: self.corpus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_modes_parse_and_display() {
        assert_eq!("Unit".parse::<FeatureMode>().unwrap(), FeatureMode::Unit);
        assert_eq!(FeatureMode::Sequence.to_string(), "sequence");
        assert!("token".parse::<FeatureMode>().is_err());
    }

    #[test]
    fn experiment_files_keep_extractor_and_parameter_order() {
        let raw = r#"{
            "feature_mode": "unit",
            "views": ["source", "target"],
            "corpus": {"type": "lines", "path": "corpus.txt.gz"},
            "extractors": [
                {"identity": "B", "implementation": "ngram", "parameters": {"max_n": 2, "min_n": 1}},
                {"identity": "A", "implementation": "token_count"}
            ]
        }"#;
        let config: ExperimentConfig = serde_json::from_str(raw).unwrap();
        let point = config.into_point();
        assert_eq!(point.feature_mode, FeatureMode::Unit);
        assert_eq!(point.identities(), vec!["B", "A"]);
        let keys: Vec<&String> = point.extractors[0].parameters().keys().collect();
        assert_eq!(keys, vec!["max_n", "min_n"]);
        assert_eq!(
            point.corpus,
            CorpusInput::Lines {
                path: PathBuf::from("corpus.txt.gz"),
                language: None
            }
        );
        assert_eq!(
            point.describe(),
            "feature_mode=unit extractors=[B, A] views=[source, target]"
        );
    }

    #[test]
    fn defaults_use_document_mode_and_imported_corpus() {
        let config: ExperimentConfig = serde_json::from_str("{}").unwrap();
        let point = config.into_point();
        assert_eq!(point.feature_mode, FeatureMode::Document);
        assert_eq!(point.corpus, CorpusInput::Imported);
        assert!(point.extractors.is_empty());
        assert!(point.views.is_none());
    }

    #[test]
    fn loading_anchors_paths_and_inlines_keyword_files() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("kw.txt"), "# fruit\nCherry\n\npeach\n").unwrap();
        let file = temp.path().join("experiment.json");
        fs::write(
            &file,
            r#"{
                "corpus": {"type": "lines", "path": "corpus.txt"},
                "extractors": [{
                    "identity": "kw",
                    "implementation": "keyword_ngram",
                    "parameters": {"keywords": ["plum"], "keywords_file": "kw.txt"}
                }]
            }"#,
        )
        .unwrap();

        let config = ExperimentConfig::from_path(&file).unwrap();
        assert_eq!(
            config.corpus,
            CorpusInput::Lines {
                path: temp.path().join("corpus.txt"),
                language: None
            }
        );
        let parameters = &config.extractors[0].parameters;
        assert!(!parameters.contains_key(KEYWORDS_FILE));
        assert_eq!(
            parameters[KEYWORDS],
            serde_json::json!(["plum", "Cherry", "peach"])
        );
    }

    #[test]
    fn missing_keyword_files_name_the_extractor() {
        let mut entry = ExtractorConfig {
            identity: "kw".into(),
            implementation: "keyword_ngram".into(),
            parameters: ParameterMap::new(),
        };
        entry
            .parameters
            .insert(KEYWORDS_FILE.into(), Value::String("absent.txt".into()));
        let err = entry.inline_keyword_file(Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, MetaError::Configuration(ref msg) if msg.contains("extractor 'kw'")));
    }
}
