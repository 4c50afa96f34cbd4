use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DocumentId, ExtractorId, ViewName};

/// Error type for meta-collection configuration, resolution, and IO failures.
#[derive(Debug, Error)]
pub enum MetaError {
    /// Invalid experiment configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A collector cannot run in the active configuration.
    #[error("unsupported configuration for collector '{collector}'{}: {reason}", extractor_suffix(.extractor))]
    UnsupportedConfiguration {
        /// Declaring extractor; `None` for mode-driven collectors.
        extractor: Option<ExtractorId>,
        /// Collector name.
        collector: String,
        /// What the collector rejected.
        reason: String,
    },
    /// An extractor or collector broke its declaration contract.
    #[error("invalid implementation '{implementation}'{}: {reason}", extractor_suffix(.extractor))]
    InvalidImplementation {
        /// Extractor the implementation was configured for, if any.
        extractor: Option<ExtractorId>,
        /// Implementation name as configured.
        implementation: String,
        /// Failure detail.
        reason: String,
    },
    /// An implementation name could not be turned into an extractor.
    #[error("cannot resolve implementation '{implementation}'{}: {reason}", extractor_suffix(.extractor))]
    Resolution {
        /// Extractor the implementation was configured for, if any.
        extractor: Option<ExtractorId>,
        /// Implementation name as configured.
        implementation: String,
        /// Failure detail.
        reason: String,
    },
    /// A storage folder is missing or unusable.
    #[error("storage failure at '{}': {reason}", .path.display())]
    Storage {
        /// Folder or file involved.
        path: PathBuf,
        /// Failure detail.
        reason: String,
    },
    /// An artifact or manifest could not be decoded.
    #[error("artifact '{}' is unreadable: {reason}", .path.display())]
    Artifact {
        /// Artifact or manifest file.
        path: PathBuf,
        /// Decode failure detail.
        reason: String,
    },
    /// The corpus reader failed mid-scan.
    #[error("corpus '{reader_id}' failed: {reason}")]
    Corpus {
        /// Failing reader's id.
        reader_id: String,
        /// Failure detail.
        reason: String,
    },
    /// A document lacks a view collectors are attached to.
    #[error("document '{document}' has no view '{view}'")]
    MissingView {
        /// Document being scanned.
        document: DocumentId,
        /// Attached view it does not have.
        view: ViewName,
    },
    /// Underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Any of the above, tagged with the configuration point that failed.
    #[error("configuration point [{point}] failed: {source}")]
    AtPoint {
        /// `ExperimentPoint::describe` of the failing point.
        point: String,
        /// Original error.
        #[source]
        source: Box<MetaError>,
    },
}

impl MetaError {
    /// Attach the configuration point description to an error.
    ///
    /// Errors that already carry a point are returned unchanged.
    pub fn at_point(self, point: impl Into<String>) -> Self {
        match self {
            MetaError::AtPoint { .. } => self,
            other => MetaError::AtPoint {
                point: point.into(),
                source: Box::new(other),
            },
        }
    }

    /// Error with the configuration point wrapper removed.
    pub fn root(&self) -> &MetaError {
        match self {
            MetaError::AtPoint { source, .. } => source.root(),
            other => other,
        }
    }
}

fn extractor_suffix(extractor: &Option<ExtractorId>) -> String {
    match extractor {
        Some(id) => format!(" (extractor '{id}')"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_extractor_when_present() {
        let err = MetaError::UnsupportedConfiguration {
            extractor: Some("ngram-1".into()),
            collector: "pair".into(),
            reason: "only primitive collectors are supported".into(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported configuration for collector 'pair' (extractor 'ngram-1'): only primitive collectors are supported"
        );

        let err = MetaError::InvalidImplementation {
            extractor: None,
            implementation: "custom".into(),
            reason: "no storage keys".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid implementation 'custom': no storage keys"
        );
    }

    #[test]
    fn at_point_wraps_once_and_root_unwraps() {
        let err = MetaError::Configuration("no feature extractors".into())
            .at_point("mode=document")
            .at_point("ignored");
        assert!(err.to_string().starts_with("configuration point [mode=document] failed"));
        assert!(matches!(err.root(), MetaError::Configuration(_)));
    }
}
