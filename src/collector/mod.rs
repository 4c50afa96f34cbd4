//! Collector units: corpus-wide pre-pass computations.
//!
//! Ownership model:
//! - `CollectorKind` names an implementation and its settings (static
//!   dispatch for built-ins, `Plugin` for third-party factories).
//! - `CollectorDescription` is what extractors declare; only `Primitive`
//!   descriptions can be bound.
//! - `BoundCollector` pairs a kind with its namespaced storage bindings.
//! - `MetaCollector` is the running, per-execution state created from a
//!   bound collector right before the scan.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::Artifact;
use crate::constants::implementations::{
    DOCUMENT_FREQUENCY_COLLECTOR, KEYWORD_NGRAM_COLLECTOR, NGRAM_COLLECTOR,
    SEQUENCE_CONTEXT_COLLECTOR, UNIT_CONTEXT_COLLECTOR,
};
use crate::document::{Document, DocumentView};
use crate::errors::MetaError;
use crate::namespace::{StorageBinding, StorageRequest};
use crate::types::{ExtractorId, StoragePath};

/// Built-in collector implementations.
pub mod builtin;

pub use builtin::{
    ContextCollector, ContextTarget, DocumentFrequencyCollector, DocumentFrequencySettings,
    KeywordNGramCollector, KeywordSettings, NGramFrequencyCollector, NGramSettings,
};

/// Running collector state for one execution.
///
/// A collector sees every document of the scan (once per attached view) and
/// returns its artifacts only when the scan has completed.
pub trait MetaCollector: Send {
    /// Implementation name used in logs and errors.
    fn name(&self) -> &str;
    /// Storage parameters this collector writes, with their preferred keys.
    fn storage_requests(&self) -> Vec<StorageRequest>;
    /// Accumulate state from one view of one document.
    fn collect(&mut self, document: &Document, view: &DocumentView) -> Result<(), MetaError>;
    /// Produce one artifact per storage parameter.
    fn finish(self: Box<Self>) -> Result<Vec<Artifact>, MetaError>;
}

/// Factory for collectors that live outside this crate.
pub trait CollectorFactory: Send + Sync {
    /// Implementation name used in logs, errors, and fingerprints.
    fn name(&self) -> &str;
    /// Create a fresh collector instance.
    fn create(&self) -> Result<Box<dyn MetaCollector>, MetaError>;
    /// Configuration summary folded into run fingerprints.
    fn signature(&self) -> String {
        self.name().to_string()
    }
}

/// Collector implementation plus its settings.
#[derive(Clone)]
pub enum CollectorKind {
    /// Corpus n-gram vocabulary with counts.
    NGramFrequency(NGramSettings),
    /// Counts of n-grams built from configured keywords.
    KeywordNGram(KeywordSettings),
    /// Number of views containing each token.
    DocumentFrequency(DocumentFrequencySettings),
    /// Surrounding text of every classification unit.
    UnitContext,
    /// Surrounding text of every classification sequence.
    SequenceContext,
    /// Third-party collector.
    Plugin(Arc<dyn CollectorFactory>),
}

impl CollectorKind {
    /// Implementation name.
    pub fn name(&self) -> &str {
        match self {
            CollectorKind::NGramFrequency(_) => NGRAM_COLLECTOR,
            CollectorKind::KeywordNGram(_) => KEYWORD_NGRAM_COLLECTOR,
            CollectorKind::DocumentFrequency(_) => DOCUMENT_FREQUENCY_COLLECTOR,
            CollectorKind::UnitContext => UNIT_CONTEXT_COLLECTOR,
            CollectorKind::SequenceContext => SEQUENCE_CONTEXT_COLLECTOR,
            CollectorKind::Plugin(factory) => factory.name(),
        }
    }

    /// Create a fresh running instance.
    pub fn instantiate(&self) -> Result<Box<dyn MetaCollector>, MetaError> {
        Ok(match self {
            CollectorKind::NGramFrequency(settings) => {
                Box::new(NGramFrequencyCollector::new(settings.clone()))
            }
            CollectorKind::KeywordNGram(settings) => {
                Box::new(KeywordNGramCollector::new(settings.clone()))
            }
            CollectorKind::DocumentFrequency(settings) => {
                Box::new(DocumentFrequencyCollector::new(settings.clone()))
            }
            CollectorKind::UnitContext => Box::new(ContextCollector::units()),
            CollectorKind::SequenceContext => Box::new(ContextCollector::sequences()),
            CollectorKind::Plugin(factory) => factory.create()?,
        })
    }

    /// Stable configuration summary used for run fingerprints.
    pub fn signature(&self) -> String {
        match self {
            CollectorKind::NGramFrequency(settings) => format!("{}{settings:?}", self.name()),
            CollectorKind::KeywordNGram(settings) => format!("{}{settings:?}", self.name()),
            CollectorKind::DocumentFrequency(settings) => format!("{}{settings:?}", self.name()),
            CollectorKind::UnitContext | CollectorKind::SequenceContext => self.name().to_string(),
            CollectorKind::Plugin(factory) => factory.signature(),
        }
    }
}

impl fmt::Debug for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// Collector declared by a meta-dependent extractor.
#[derive(Clone, Debug)]
pub enum CollectorDescription {
    /// A single collector.
    Primitive(CollectorKind),
    /// A composite of several collectors; declared but not supported.
    Aggregate {
        /// Aggregate name used in errors.
        name: String,
        /// Member descriptions.
        parts: Vec<CollectorDescription>,
    },
}

impl CollectorDescription {
    /// Name used in error messages.
    pub fn name(&self) -> &str {
        match self {
            CollectorDescription::Primitive(kind) => kind.name(),
            CollectorDescription::Aggregate { name, .. } => name,
        }
    }
}

impl From<CollectorKind> for CollectorDescription {
    fn from(kind: CollectorKind) -> Self {
        CollectorDescription::Primitive(kind)
    }
}

/// Collector whose storage parameters are bound to namespaced paths.
#[derive(Clone, Debug)]
pub struct BoundCollector {
    kind: CollectorKind,
    extractor: Option<ExtractorId>,
    bindings: Vec<StorageBinding>,
}

impl BoundCollector {
    pub(crate) fn new(
        kind: CollectorKind,
        extractor: Option<ExtractorId>,
        bindings: Vec<StorageBinding>,
    ) -> Self {
        Self {
            kind,
            extractor,
            bindings,
        }
    }

    /// Collector kind and settings.
    pub fn kind(&self) -> &CollectorKind {
        &self.kind
    }

    /// Owning extractor identity; `None` for mode-level collectors.
    pub fn extractor(&self) -> Option<&str> {
        self.extractor.as_deref()
    }

    /// Storage bindings in declaration order.
    pub fn bindings(&self) -> &[StorageBinding] {
        &self.bindings
    }

    /// Resolved path bound to `parameter`.
    pub fn path_for(&self, parameter: &str) -> Option<&StoragePath> {
        self.bindings
            .iter()
            .find(|binding| binding.parameter == parameter)
            .map(|binding| &binding.resolved_path)
    }

    /// Create the running collector for one execution.
    pub fn instantiate(&self) -> Result<Box<dyn MetaCollector>, MetaError> {
        self.kind.instantiate()
    }

    /// Map finished artifacts onto their bound paths.
    ///
    /// Every bound parameter must receive exactly one artifact.
    pub(crate) fn place_artifacts(
        &self,
        artifacts: Vec<Artifact>,
    ) -> Result<Vec<(PathBuf, Vec<u8>)>, MetaError> {
        let mut placed: Vec<(PathBuf, Vec<u8>)> = Vec::with_capacity(self.bindings.len());
        let mut seen: Vec<&str> = Vec::with_capacity(self.bindings.len());
        for artifact in artifacts {
            let Some(binding) = self
                .bindings
                .iter()
                .find(|binding| binding.parameter == artifact.parameter)
            else {
                return Err(self.contract_violation(format!(
                    "produced an artifact for undeclared parameter '{}'",
                    artifact.parameter
                )));
            };
            if seen.contains(&binding.parameter.as_str()) {
                return Err(self.contract_violation(format!(
                    "produced more than one artifact for parameter '{}'",
                    binding.parameter
                )));
            }
            seen.push(&binding.parameter);
            placed.push((PathBuf::from(&binding.resolved_path), artifact.bytes));
        }
        if let Some(missing) = self
            .bindings
            .iter()
            .find(|binding| !seen.contains(&binding.parameter.as_str()))
        {
            return Err(self.contract_violation(format!(
                "produced no artifact for parameter '{}'",
                missing.parameter
            )));
        }
        Ok(placed)
    }

    /// Stable summary of kind and bindings used for run fingerprints.
    pub fn signature(&self) -> String {
        let paths: Vec<&str> = self
            .bindings
            .iter()
            .map(|binding| binding.resolved_path.as_str())
            .collect();
        format!("{}=>[{}]", self.kind.signature(), paths.join(","))
    }

    fn contract_violation(&self, reason: String) -> MetaError {
        MetaError::InvalidImplementation {
            extractor: self.extractor.clone(),
            implementation: self.kind.name().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::collectors::{PARAM_UNIT_CONTEXT, UNIT_CONTEXT_KEY};

    fn bound_unit_context() -> BoundCollector {
        BoundCollector::new(
            CollectorKind::UnitContext,
            None,
            vec![StorageRequest::new(PARAM_UNIT_CONTEXT, UNIT_CONTEXT_KEY).bind(None)],
        )
    }

    #[test]
    fn built_in_kinds_instantiate_with_matching_names() {
        let kinds = [
            CollectorKind::NGramFrequency(NGramSettings::default()),
            CollectorKind::KeywordNGram(KeywordSettings::default()),
            CollectorKind::DocumentFrequency(DocumentFrequencySettings::default()),
            CollectorKind::UnitContext,
            CollectorKind::SequenceContext,
        ];
        for kind in kinds {
            let collector = kind.instantiate().unwrap();
            assert_eq!(collector.name(), kind.name());
            assert!(!collector.storage_requests().is_empty());
        }
    }

    #[test]
    fn signatures_reflect_settings() {
        let narrow = CollectorKind::NGramFrequency(NGramSettings {
            max_n: 1,
            ..NGramSettings::default()
        });
        let wide = CollectorKind::NGramFrequency(NGramSettings::default());
        assert_ne!(narrow.signature(), wide.signature());
        assert_eq!(narrow.signature(), narrow.clone().signature());
    }

    #[test]
    fn artifacts_are_placed_on_bound_paths() {
        let bound = bound_unit_context();
        let placed = bound
            .place_artifacts(vec![Artifact::new(PARAM_UNIT_CONTEXT, vec![1, 2])])
            .unwrap();
        assert_eq!(placed, vec![(PathBuf::from(UNIT_CONTEXT_KEY), vec![1, 2])]);
    }

    #[test]
    fn missing_or_unknown_artifacts_violate_the_contract() {
        let bound = bound_unit_context();
        let err = bound.place_artifacts(Vec::new()).unwrap_err();
        assert!(matches!(err, MetaError::InvalidImplementation { .. }));

        let err = bound
            .place_artifacts(vec![Artifact::new("other", Vec::new())])
            .unwrap_err();
        assert!(err.to_string().contains("undeclared parameter 'other'"));

        let err = bound
            .place_artifacts(vec![
                Artifact::new(PARAM_UNIT_CONTEXT, Vec::new()),
                Artifact::new(PARAM_UNIT_CONTEXT, Vec::new()),
            ])
            .unwrap_err();
        assert!(err.to_string().contains("more than one artifact"));
    }
}
