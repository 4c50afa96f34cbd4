//! Storage namespace allocation for collector outputs.
//!
//! `resolve_storage_path` is the naming contract shared with the
//! feature-computation phase: that phase recomputes the same paths from the
//! same extractor identities to locate its inputs. Changing the formula
//! breaks every previously written meta folder.

use serde::{Deserialize, Serialize};

use crate::constants::storage::NAMESPACE_SEPARATOR;
use crate::types::{ExtractorId, ParameterName, PreferredKey, StoragePath};

/// Map an extractor identity and a collector's preferred key to a storage path.
///
/// With an identity the result is `"{identity}-{preferred_key}"`; without one
/// (mode-level collectors) the preferred key is returned unchanged.
pub fn resolve_storage_path(extractor: Option<&str>, preferred_key: &str) -> StoragePath {
    match extractor {
        Some(identity) => format!("{identity}{NAMESPACE_SEPARATOR}{preferred_key}"),
        None => preferred_key.to_string(),
    }
}

/// A collector storage parameter and the preferred key it would like to write.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageRequest {
    /// Collector parameter that receives the location.
    pub parameter: ParameterName,
    /// Location the collector would use without namespacing.
    pub preferred_key: PreferredKey,
}

impl StorageRequest {
    /// Request `preferred_key` for `parameter`.
    pub fn new(parameter: impl Into<ParameterName>, preferred_key: impl Into<PreferredKey>) -> Self {
        Self {
            parameter: parameter.into(),
            preferred_key: preferred_key.into(),
        }
    }

    /// Bind this request into the namespace of `extractor`.
    pub fn bind(&self, extractor: Option<&str>) -> StorageBinding {
        StorageBinding {
            extractor: extractor.map(str::to_string),
            parameter: self.parameter.clone(),
            resolved_path: resolve_storage_path(extractor, &self.preferred_key),
        }
    }
}

/// A storage parameter bound to its namespaced location.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageBinding {
    /// Owning extractor identity; `None` for mode-level collectors.
    pub extractor: Option<ExtractorId>,
    /// Collector parameter that receives the location.
    pub parameter: ParameterName,
    /// Path relative to the meta output folder.
    pub resolved_path: StoragePath,
}
