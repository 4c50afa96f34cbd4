/// Constants shared by the storage namespace allocator and storage service.
pub mod storage {
    /// Storage key of the folder holding imported, serialized documents.
    pub const INPUT_KEY: &str = "input";
    /// Storage key of the meta-collection output folder.
    pub const META_KEY: &str = "meta";
    /// Separator placed between an extractor identity and a preferred key.
    ///
    /// Part of the naming contract with the feature-computation phase.
    pub const NAMESPACE_SEPARATOR: &str = "-";
    /// File name of the run manifest written after a successful pass.
    pub const MANIFEST_FILENAME: &str = "manifest.json";
    /// Version tag for manifest compatibility checks.
    pub const MANIFEST_VERSION: u8 = 1;
}

/// Constants used by corpus readers and the document model.
pub mod corpus {
    /// Name of the view every single-view document carries.
    pub const DEFAULT_VIEW: &str = "_InitialView";
    /// File extension of serialized document files.
    pub const SERIALIZED_EXTENSION: &str = "bin";
    /// File extension that switches line readers to gzip decoding.
    pub const GZIP_EXTENSION: &str = "gz";
    /// Language assigned by line readers when none is configured.
    pub const DEFAULT_LANGUAGE: &str = "en";
    /// Prefix marker for bitcode-encoded documents.
    pub const DOCUMENT_PREFIX: u8 = b'D';
    /// Version tag for serialized documents.
    pub const DOCUMENT_VERSION: u8 = 1;
}

/// Constants used by collector implementations and artifact encoding.
pub mod collectors {
    /// Characters of surrounding text captured on each side of a unit or sequence.
    pub const CONTEXT_WINDOW_CHARS: usize = 30;
    /// Parameter receiving the unit-context artifact location.
    pub const PARAM_UNIT_CONTEXT: &str = "unit_context";
    /// Preferred key of the unit-context artifact.
    pub const UNIT_CONTEXT_KEY: &str = "unit_context.bin";
    /// Parameter receiving the sequence-context artifact location.
    pub const PARAM_SEQUENCE_CONTEXT: &str = "sequence_context";
    /// Preferred key of the sequence-context artifact.
    pub const SEQUENCE_CONTEXT_KEY: &str = "sequence_context.bin";
    /// Parameter receiving the n-gram frequency table location.
    pub const PARAM_NGRAM_FREQUENCIES: &str = "ngram_frequencies";
    /// Preferred key of the n-gram frequency table.
    pub const NGRAM_KEY: &str = "ngrams.bin";
    /// Parameter receiving the keyword n-gram table location.
    pub const PARAM_KEYWORD_NGRAMS: &str = "keyword_ngrams";
    /// Preferred key of the keyword n-gram table.
    pub const KEYWORD_NGRAM_KEY: &str = "keyword_ngrams.bin";
    /// Parameter receiving the document-frequency table location.
    pub const PARAM_IDF_TABLE: &str = "idf_table";
    /// Preferred key of the document-frequency table.
    pub const DOCUMENT_FREQUENCY_KEY: &str = "document_frequency.bin";
    /// Glue placed between tokens of one n-gram.
    pub const NGRAM_GLUE: &str = "_";
    /// Marker appended to keyword n-grams that end a sentence.
    pub const SENTENCE_BOUNDARY_MARK: &str = "SB";
    /// Token recorded for commas when keyword n-grams include them.
    pub const COMMA_TOKEN: &str = "CA";
    /// Extractor parameter listing keywords inline.
    pub const KEYWORDS: &str = "keywords";
    /// Experiment-file parameter naming a keyword file, one keyword per line.
    ///
    /// Read when the experiment file is loaded and merged into `KEYWORDS`.
    pub const KEYWORDS_FILE: &str = "keywords_file";

    /// Prefix marker for bitcode-encoded artifacts.
    pub const ARTIFACT_PREFIX: u8 = b'B';
    /// Version tag for frequency-table artifacts.
    pub const FREQUENCY_TABLE_VERSION: u8 = 1;
    /// Version tag for context-table artifacts.
    pub const CONTEXT_TABLE_VERSION: u8 = 1;
}

/// Names under which built-in extractors and collectors are resolved.
pub mod implementations {
    /// Word n-gram extractor.
    pub const NGRAM: &str = "ngram";
    /// Keyword n-gram extractor.
    pub const KEYWORD_NGRAM: &str = "keyword_ngram";
    /// TF-IDF extractor.
    pub const TFIDF: &str = "tfidf";
    /// Token count extractor (no pre-pass).
    pub const TOKEN_COUNT: &str = "token_count";
    /// Text length extractor (no pre-pass).
    pub const TEXT_LENGTH: &str = "text_length";

    /// Corpus n-gram vocabulary collector.
    pub const NGRAM_COLLECTOR: &str = "ngram_frequency";
    /// Keyword n-gram count collector.
    pub const KEYWORD_NGRAM_COLLECTOR: &str = "keyword_ngram_frequency";
    /// Document frequency collector.
    pub const DOCUMENT_FREQUENCY_COLLECTOR: &str = "document_frequency";
    /// Unit context collector added in unit mode.
    pub const UNIT_CONTEXT_COLLECTOR: &str = "unit_context";
    /// Sequence context collector added in sequence mode.
    pub const SEQUENCE_CONTEXT_COLLECTOR: &str = "sequence_context";
}

/// Defaults applied when extractor parameters are omitted.
pub mod defaults {
    /// Smallest n-gram length of the `ngram` extractor.
    pub const NGRAM_MIN_N: usize = 1;
    /// Largest n-gram length of the `ngram` extractor.
    pub const NGRAM_MAX_N: usize = 3;
    /// Largest n-gram length of the `keyword_ngram` extractor.
    pub const KEYWORD_MAX_N: usize = 3;
}
