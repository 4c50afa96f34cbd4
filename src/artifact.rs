//! Collector outputs and their persisted encoding.
//!
//! Artifacts are bitcode payloads framed as `[ARTIFACT_PREFIX, version, ..]`.
//! The feature-computation phase reads them back with the `read_*` helpers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::collectors::{
    ARTIFACT_PREFIX, CONTEXT_TABLE_VERSION, FREQUENCY_TABLE_VERSION,
};
use crate::errors::MetaError;
use crate::types::{DocumentId, ParameterName, Term, ViewName};

/// Encoded output of one collector parameter, ready to be flushed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Storage parameter this artifact belongs to.
    pub parameter: ParameterName,
    /// Encoded payload.
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Payload for the storage parameter `parameter`.
    pub fn new(parameter: impl Into<ParameterName>, bytes: Vec<u8>) -> Self {
        Self {
            parameter: parameter.into(),
            bytes,
        }
    }
}

/// One term and its count.
#[derive(Clone, Debug, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct FrequencyEntry {
    /// Term or glued n-gram.
    pub term: Term,
    /// Occurrences, or documents containing the term.
    pub count: u64,
}

/// Corpus-wide term counts (vocabularies, document frequencies).
#[derive(Clone, Debug, Default, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct FrequencyTable {
    /// Number of views scanned while counting.
    pub documents: u64,
    /// Entries ordered by descending count, then term.
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Build a table from raw counts, keeping the `top_k` most frequent terms.
    pub fn from_counts(documents: u64, counts: HashMap<Term, u64>, top_k: Option<usize>) -> Self {
        let mut entries: Vec<FrequencyEntry> = counts
            .into_iter()
            .map(|(term, count)| FrequencyEntry { term, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        if let Some(limit) = top_k {
            entries.truncate(limit);
        }
        Self { documents, entries }
    }

    /// Count recorded for `term`.
    pub fn count(&self, term: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.term == term)
            .map(|entry| entry.count)
    }

    /// Inverse document frequency `ln(N / df)` for `term`.
    pub fn idf(&self, term: &str) -> Option<f64> {
        let df = self.count(term)?;
        if df == 0 || self.documents == 0 {
            return None;
        }
        Some((self.documents as f64 / df as f64).ln())
    }

    /// True when no term was counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Framed bitcode bytes.
    pub fn encode(&self) -> Vec<u8> {
        frame(FREQUENCY_TABLE_VERSION, bitcode::encode(self))
    }

    /// Inverse of [`FrequencyTable::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let raw = unframe(FREQUENCY_TABLE_VERSION, bytes)?;
        bitcode::decode(raw).map_err(|err| format!("corrupt frequency table: {err}"))
    }
}

/// Surrounding text captured for one unit or sequence.
#[derive(Clone, Debug, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct ContextEntry {
    /// Owning document.
    pub document: DocumentId,
    /// View the unit or sequence was annotated in.
    pub view: ViewName,
    /// Position of the unit or sequence within its view.
    pub index: u64,
    /// Text before the span, whitespace flattened.
    pub left: String,
    /// Text of the span itself.
    pub covered: String,
    /// Text after the span.
    pub right: String,
}

impl ContextEntry {
    /// Key used by error analysis to join outcomes with contexts.
    ///
    /// Unit and sequence indexes restart in every view, so the view is part
    /// of the key.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.document, self.view, self.index)
    }

    /// `left[covered]right` rendering.
    pub fn render(&self) -> String {
        format!("{}[{}]{}", self.left, self.covered, self.right)
    }
}

/// Context windows for every unit or sequence in the corpus.
#[derive(Clone, Debug, Default, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct ContextTable {
    /// Entries in scan order.
    pub entries: Vec<ContextEntry>,
}

impl ContextTable {
    /// Framed bitcode bytes.
    pub fn encode(&self) -> Vec<u8> {
        frame(CONTEXT_TABLE_VERSION, bitcode::encode(self))
    }

    /// Inverse of [`ContextTable::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let raw = unframe(CONTEXT_TABLE_VERSION, bytes)?;
        bitcode::decode(raw).map_err(|err| format!("corrupt context table: {err}"))
    }
}

/// Load a frequency table written by a collector.
pub fn read_frequency_table(path: &Path) -> Result<FrequencyTable, MetaError> {
    let bytes = fs::read(path)?;
    FrequencyTable::decode(&bytes).map_err(|reason| MetaError::Artifact {
        path: path.to_path_buf(),
        reason,
    })
}

/// Load a context table written by a mode-level collector.
pub fn read_context_table(path: &Path) -> Result<ContextTable, MetaError> {
    let bytes = fs::read(path)?;
    ContextTable::decode(&bytes).map_err(|reason| MetaError::Artifact {
        path: path.to_path_buf(),
        reason,
    })
}

fn frame(version: u8, payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + payload.len());
    out.push(ARTIFACT_PREFIX);
    out.push(version);
    out.extend_from_slice(&payload);
    out
}

fn unframe(version: u8, bytes: &[u8]) -> Result<&[u8], String> {
    match bytes {
        [prefix, found, rest @ ..] if *prefix == ARTIFACT_PREFIX => {
            if *found != version {
                return Err(format!(
                    "artifact version mismatch: expected {version}, found {found}"
                ));
            }
            Ok(rest)
        }
        _ => Err("artifact payload missing expected prefix".into()),
    }
}
