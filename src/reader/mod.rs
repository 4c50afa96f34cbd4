//! Corpus readers consumed by the meta-collection scan.
//!
//! A reader is restartable: every `open` call yields the corpus from the
//! first document again, in the same order.

use std::path::PathBuf;
use std::sync::Arc;

use crate::document::Document;
use crate::errors::MetaError;

mod lines;
mod serialized;

pub use lines::LineCorpusReader;
pub use serialized::{
    SerializedCorpusReader, decode_document, encode_document, read_document, write_document,
};

/// Ordered stream of documents produced by one `open` call.
pub type DocumentStream<'a> = Box<dyn Iterator<Item = Result<Document, MetaError>> + 'a>;

/// Pluggable source of per-document records.
pub trait CorpusReader: Send {
    /// Stable reader identifier used in logs and errors.
    fn id(&self) -> &str;
    /// Start a new pass over the corpus.
    fn open(&self) -> Result<DocumentStream<'_>, MetaError>;
    /// Files the corpus is read from, in read order. Empty for corpora that
    /// do not live on disk.
    fn sources(&self) -> Result<Vec<PathBuf>, MetaError> {
        Ok(Vec::new())
    }
}

/// Documents held in memory.
pub struct InMemoryCorpus {
    id: String,
    documents: Arc<Vec<Document>>,
}

impl InMemoryCorpus {
    /// Hold `documents` under the reader id `id`.
    pub fn new(id: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            id: id.into(),
            documents: Arc::new(documents),
        }
    }
}

impl CorpusReader for InMemoryCorpus {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<DocumentStream<'_>, MetaError> {
        Ok(Box::new(self.documents.iter().cloned().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_corpus_restarts_from_the_first_document() {
        let corpus = InMemoryCorpus::new(
            "mem",
            vec![Document::single_view("0", "a"), Document::single_view("1", "b")],
        );
        for _ in 0..2 {
            let ids: Vec<String> = corpus
                .open()
                .unwrap()
                .map(|doc| doc.unwrap().id)
                .collect();
            assert_eq!(ids, vec!["0", "1"]);
        }
    }
}
