use std::collections::HashMap;

use crate::artifact::{Artifact, FrequencyTable};
use crate::collector::MetaCollector;
use crate::constants::collectors::{NGRAM_KEY, PARAM_NGRAM_FREQUENCIES};
use crate::constants::defaults::{NGRAM_MAX_N, NGRAM_MIN_N};
use crate::constants::implementations::NGRAM_COLLECTOR;
use crate::document::{Document, DocumentView};
use crate::errors::MetaError;
use crate::namespace::StorageRequest;
use crate::types::Term;
use crate::utils::{ngrams, tokenize};

/// Controls which n-grams are counted and how many are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramSettings {
    /// Smallest n-gram length.
    pub min_n: usize,
    /// Largest n-gram length.
    pub max_n: usize,
    /// Lowercase tokens before counting.
    pub lowercase: bool,
    /// Keep only the most frequent entries (all when `None`).
    pub top_k: Option<usize>,
}

impl Default for NGramSettings {
    fn default() -> Self {
        Self {
            min_n: NGRAM_MIN_N,
            max_n: NGRAM_MAX_N,
            lowercase: true,
            top_k: None,
        }
    }
}

/// Builds the corpus n-gram vocabulary with occurrence counts.
pub struct NGramFrequencyCollector {
    settings: NGramSettings,
    counts: HashMap<Term, u64>,
    documents: u64,
}

impl NGramFrequencyCollector {
    /// Empty collector.
    pub fn new(settings: NGramSettings) -> Self {
        Self {
            settings,
            counts: HashMap::new(),
            documents: 0,
        }
    }
}

impl MetaCollector for NGramFrequencyCollector {
    fn name(&self) -> &str {
        NGRAM_COLLECTOR
    }

    fn storage_requests(&self) -> Vec<StorageRequest> {
        vec![StorageRequest::new(PARAM_NGRAM_FREQUENCIES, NGRAM_KEY)]
    }

    fn collect(&mut self, _document: &Document, view: &DocumentView) -> Result<(), MetaError> {
        let tokens: Vec<Term> = tokenize(&view.text, self.settings.lowercase)
            .into_iter()
            .filter(|token| token != ",")
            .collect();
        for gram in ngrams(&tokens, self.settings.min_n, self.settings.max_n) {
            *self.counts.entry(gram).or_insert(0) += 1;
        }
        self.documents += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<Artifact>, MetaError> {
        let table = FrequencyTable::from_counts(self.documents, self.counts, self.settings.top_k);
        Ok(vec![Artifact::new(PARAM_NGRAM_FREQUENCIES, table.encode())])
    }
}
