/// Discriminator value naming one feature-extractor configuration.
/// Examples: `ngram-1`, `A`, `keywords_fruit`
pub type ExtractorId = String;
/// Implementation name used to select a built-in extractor or collector.
/// Examples: `ngram`, `keyword_ngram`, `tfidf`
pub type ImplementationName = String;
/// Name of a collector configuration parameter that receives a storage location.
/// Examples: `ngram_frequencies`, `idf_table`, `unit_context`
pub type ParameterName = String;
/// Storage key preferred by a collector before namespacing.
/// Examples: `ngrams.bin`, `document_frequency.bin`, `unit_context.bin`
pub type PreferredKey = String;
/// Namespaced storage path relative to the meta output folder.
/// Examples: `ngram-1-ngrams.bin`, `unit_context.bin`
pub type StoragePath = String;
/// Named document view.
/// Examples: `_InitialView`, `source`, `target`
pub type ViewName = String;
/// Stable document identifier.
/// Examples: `0`, `news/article_17.bin`
pub type DocumentId = String;
/// Key used to request a folder from the storage service.
/// Examples: `input`, `meta`
pub type StorageKey = String;
/// Token or n-gram text recorded in frequency tables.
/// Examples: `cherry`, `apricot_peach`
pub type Term = String;
/// Ordered extractor parameters as loaded from the experiment configuration.
/// Example: `{"min_n": 1, "max_n": 2, "lowercase": true}`
pub type ParameterMap = indexmap::IndexMap<String, serde_json::Value>;
