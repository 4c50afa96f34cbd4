mod context;
mod document_frequency;
mod keyword;
mod ngram;

pub use context::{ContextCollector, ContextTarget};
pub use document_frequency::{DocumentFrequencyCollector, DocumentFrequencySettings};
pub use keyword::{KeywordNGramCollector, KeywordSettings};
pub use ngram::{NGramFrequencyCollector, NGramSettings};
