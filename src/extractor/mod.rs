//! Feature extractor descriptors and the dependency declarator capability.
//!
//! Descriptors are two-stage values: an `ExtractorDescriptor` carries the
//! identity, implementation reference, and raw parameters; `resolve` turns it
//! into a `ResolvedExtractor`. Resolution is pure, so it can be repeated
//! during validation without side effects.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::collector::CollectorDescription;
use crate::constants::implementations::{KEYWORD_NGRAM, NGRAM, TEXT_LENGTH, TFIDF, TOKEN_COUNT};
use crate::errors::MetaError;
use crate::types::{ExtractorId, ImplementationName, ParameterMap};

mod builtin;
mod params;

pub use builtin::{KeywordNGramExtractor, NGramExtractor, TfIdfExtractor};
use params::Params;

/// Capability of extractors that need a corpus-wide pre-pass.
pub trait MetaDependent {
    /// Collectors that must run before this extractor can compute features.
    fn meta_collectors(&self) -> Vec<CollectorDescription>;
}

/// Extractor implementation provided outside this crate.
pub trait ExtractorPlugin: Send + Sync {
    /// Implementation name used in logs and errors.
    fn name(&self) -> &str;
    /// Dependency declarator, when the extractor needs meta collection.
    fn as_meta_dependent(&self) -> Option<&dyn MetaDependent> {
        None
    }
}

/// Reference to an extractor implementation.
#[derive(Clone)]
pub enum ImplementationRef {
    /// Built-in implementation selected by name.
    Named(ImplementationName),
    /// Third-party implementation.
    Plugin(Arc<dyn ExtractorPlugin>),
}

impl ImplementationRef {
    /// Implementation name for logs and errors.
    pub fn name(&self) -> &str {
        match self {
            ImplementationRef::Named(name) => name,
            ImplementationRef::Plugin(plugin) => plugin.name(),
        }
    }
}

impl fmt::Debug for ImplementationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplementationRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ImplementationRef::Plugin(plugin) => {
                f.debug_tuple("Plugin").field(&plugin.name()).finish()
            }
        }
    }
}

/// Unresolved feature extractor configuration for one sweep point.
#[derive(Clone, Debug)]
pub struct ExtractorDescriptor {
    identity: ExtractorId,
    implementation: ImplementationRef,
    parameters: ParameterMap,
}

impl ExtractorDescriptor {
    /// Descriptor for a built-in implementation.
    pub fn named(identity: impl Into<ExtractorId>, implementation: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            implementation: ImplementationRef::Named(implementation.into()),
            parameters: ParameterMap::new(),
        }
    }

    /// Descriptor for a third-party implementation.
    pub fn plugin(identity: impl Into<ExtractorId>, plugin: Arc<dyn ExtractorPlugin>) -> Self {
        Self {
            identity: identity.into(),
            implementation: ImplementationRef::Plugin(plugin),
            parameters: ParameterMap::new(),
        }
    }

    /// Add or replace one parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace all parameters.
    pub fn with_parameters(mut self, parameters: ParameterMap) -> Self {
        self.parameters = parameters;
        self
    }

    /// Discriminator value naming this extractor configuration.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Implementation this descriptor resolves to.
    pub fn implementation(&self) -> &ImplementationRef {
        &self.implementation
    }

    /// Raw parameters, validated only by `resolve`.
    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    /// Resolve the descriptor into its concrete implementation.
    pub fn resolve(&self) -> Result<ResolvedExtractor, MetaError> {
        let name = match &self.implementation {
            ImplementationRef::Plugin(plugin) => {
                if !self.parameters.is_empty() {
                    return Err(MetaError::Resolution {
                        extractor: Some(self.identity.clone()),
                        implementation: plugin.name().to_string(),
                        reason: "plugin extractors are configured by their factory, not by parameters"
                            .into(),
                    });
                }
                return Ok(ResolvedExtractor::Plugin(plugin.clone()));
            }
            ImplementationRef::Named(name) => name.as_str(),
        };
        let params = Params::new(&self.identity, name, &self.parameters);
        match name {
            NGRAM => Ok(ResolvedExtractor::NGram(NGramExtractor::from_params(&params)?)),
            KEYWORD_NGRAM => Ok(ResolvedExtractor::KeywordNGram(
                KeywordNGramExtractor::from_params(&params)?,
            )),
            TFIDF => Ok(ResolvedExtractor::TfIdf(TfIdfExtractor::from_params(&params)?)),
            TOKEN_COUNT => {
                params.reject_unknown(&[])?;
                Ok(ResolvedExtractor::TokenCount)
            }
            TEXT_LENGTH => {
                params.reject_unknown(&[])?;
                Ok(ResolvedExtractor::TextLength)
            }
            other => Err(params.error(format!("no extractor implementation named '{other}'"))),
        }
    }
}

/// Concrete extractor implementation.
#[derive(Clone)]
pub enum ResolvedExtractor {
    /// N-gram features.
    NGram(NGramExtractor),
    /// Keyword n-gram features.
    KeywordNGram(KeywordNGramExtractor),
    /// TF-IDF weights.
    TfIdf(TfIdfExtractor),
    /// Counts tokens per target; no pre-pass.
    TokenCount,
    /// Measures text length per target; no pre-pass.
    TextLength,
    /// Third-party extractor.
    Plugin(Arc<dyn ExtractorPlugin>),
}

impl ResolvedExtractor {
    /// Implementation name.
    pub fn name(&self) -> &str {
        match self {
            ResolvedExtractor::NGram(_) => NGRAM,
            ResolvedExtractor::KeywordNGram(_) => KEYWORD_NGRAM,
            ResolvedExtractor::TfIdf(_) => TFIDF,
            ResolvedExtractor::TokenCount => TOKEN_COUNT,
            ResolvedExtractor::TextLength => TEXT_LENGTH,
            ResolvedExtractor::Plugin(plugin) => plugin.name(),
        }
    }

    /// Dependency declarator capability, when this extractor needs a pre-pass.
    pub fn as_meta_dependent(&self) -> Option<&dyn MetaDependent> {
        match self {
            ResolvedExtractor::NGram(extractor) => Some(extractor as &dyn MetaDependent),
            ResolvedExtractor::KeywordNGram(extractor) => Some(extractor as &dyn MetaDependent),
            ResolvedExtractor::TfIdf(extractor) => Some(extractor as &dyn MetaDependent),
            ResolvedExtractor::TokenCount | ResolvedExtractor::TextLength => None,
            ResolvedExtractor::Plugin(plugin) => plugin.as_meta_dependent(),
        }
    }
}

impl fmt::Debug for ResolvedExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResolvedExtractor").field(&self.name()).finish()
    }
}
