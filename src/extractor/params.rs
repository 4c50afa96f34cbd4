use serde_json::Value;

use crate::errors::MetaError;
use crate::types::{ParameterMap, Term};

/// Typed access to an extractor's parameter map.
///
/// Every failure is reported as a resolution error naming the extractor.
pub(crate) struct Params<'a> {
    identity: &'a str,
    implementation: &'a str,
    map: &'a ParameterMap,
}

impl<'a> Params<'a> {
    pub(crate) fn new(identity: &'a str, implementation: &'a str, map: &'a ParameterMap) -> Self {
        Self {
            identity,
            implementation,
            map,
        }
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> MetaError {
        MetaError::Resolution {
            extractor: Some(self.identity.to_string()),
            implementation: self.implementation.to_string(),
            reason: reason.into(),
        }
    }

    /// Fail on parameters the implementation does not understand.
    pub(crate) fn reject_unknown(&self, known: &[&str]) -> Result<(), MetaError> {
        match self.map.keys().find(|key| !known.contains(&key.as_str())) {
            Some(key) => Err(self.error(format!("unknown parameter '{key}'"))),
            None => Ok(()),
        }
    }

    pub(crate) fn usize_or(&self, key: &str, default: usize) -> Result<usize, MetaError> {
        Ok(self.optional_usize(key)?.unwrap_or(default))
    }

    pub(crate) fn optional_usize(&self, key: &str) -> Result<Option<usize>, MetaError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(|raw| Some(raw as usize))
                .ok_or_else(|| self.error(format!("parameter '{key}' must be a non-negative integer"))),
        }
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> Result<bool, MetaError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| self.error(format!("parameter '{key}' must be a boolean"))),
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub(crate) fn string_list(&self, key: &str) -> Result<Vec<Term>, MetaError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.error(format!("parameter '{key}' must list strings")))
                })
                .collect(),
            Some(_) => Err(self.error(format!("parameter '{key}' must be a list of strings"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ParameterMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn typed_getters_apply_defaults_and_reject_wrong_types() {
        let parameters = map(json!({"max_n": 2, "lowercase": false, "top_k": null, "bad": "x"}));
        let params = Params::new("ng", "ngram", &parameters);
        assert_eq!(params.usize_or("max_n", 3).unwrap(), 2);
        assert_eq!(params.usize_or("min_n", 1).unwrap(), 1);
        assert!(!params.bool_or("lowercase", true).unwrap());
        assert_eq!(params.optional_usize("top_k").unwrap(), None);

        let err = params.usize_or("bad", 1).unwrap_err();
        assert!(matches!(err, MetaError::Resolution { .. }));
        assert!(err.to_string().contains("extractor 'ng'"));
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        let parameters = map(json!({"min_n": 1, "maxn": 2}));
        let params = Params::new("ng", "ngram", &parameters);
        let err = params.reject_unknown(&["min_n", "max_n"]).unwrap_err();
        assert!(err.to_string().contains("unknown parameter 'maxn'"));
    }

    #[test]
    fn string_lists_require_strings() {
        let parameters = map(json!({"keywords": ["a", "b"], "mixed": ["a", 1]}));
        let params = Params::new("kw", "keyword_ngram", &parameters);
        assert_eq!(params.string_list("keywords").unwrap(), vec!["a", "b"]);
        assert!(params.string_list("mixed").is_err());
        assert!(params.string_list("absent").unwrap().is_empty());
    }
}
