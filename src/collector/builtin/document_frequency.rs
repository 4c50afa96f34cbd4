use std::collections::{HashMap, HashSet};

use crate::artifact::{Artifact, FrequencyTable};
use crate::collector::MetaCollector;
use crate::constants::collectors::{DOCUMENT_FREQUENCY_KEY, PARAM_IDF_TABLE};
use crate::constants::implementations::DOCUMENT_FREQUENCY_COLLECTOR;
use crate::document::{Document, DocumentView};
use crate::errors::MetaError;
use crate::namespace::StorageRequest;
use crate::types::Term;
use crate::utils::tokenize;

/// Document frequency settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentFrequencySettings {
    /// Lowercase tokens before counting.
    pub lowercase: bool,
}

impl Default for DocumentFrequencySettings {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

/// Counts the number of scanned views each token occurs in.
pub struct DocumentFrequencyCollector {
    settings: DocumentFrequencySettings,
    counts: HashMap<Term, u64>,
    documents: u64,
}

impl DocumentFrequencyCollector {
    /// Empty collector.
    pub fn new(settings: DocumentFrequencySettings) -> Self {
        Self {
            settings,
            counts: HashMap::new(),
            documents: 0,
        }
    }
}

impl MetaCollector for DocumentFrequencyCollector {
    fn name(&self) -> &str {
        DOCUMENT_FREQUENCY_COLLECTOR
    }

    fn storage_requests(&self) -> Vec<StorageRequest> {
        vec![StorageRequest::new(PARAM_IDF_TABLE, DOCUMENT_FREQUENCY_KEY)]
    }

    fn collect(&mut self, _document: &Document, view: &DocumentView) -> Result<(), MetaError> {
        let unique: HashSet<Term> = tokenize(&view.text, self.settings.lowercase)
            .into_iter()
            .filter(|token| token != ",")
            .collect();
        for token in unique {
            *self.counts.entry(token).or_insert(0) += 1;
        }
        self.documents += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<Artifact>, MetaError> {
        let table = FrequencyTable::from_counts(self.documents, self.counts, None);
        Ok(vec![Artifact::new(PARAM_IDF_TABLE, table.encode())])
    }
}
