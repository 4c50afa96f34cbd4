use crate::collector::{
    CollectorDescription, CollectorKind, DocumentFrequencySettings, KeywordSettings, NGramSettings,
};
use crate::constants::collectors::{KEYWORDS, KEYWORDS_FILE};
use crate::constants::defaults::{KEYWORD_MAX_N, NGRAM_MAX_N, NGRAM_MIN_N};
use crate::errors::MetaError;
use crate::extractor::MetaDependent;
use crate::extractor::params::Params;

/// N-gram extractor; needs the corpus n-gram vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramExtractor {
    /// Vocabulary collector settings.
    pub settings: NGramSettings,
}

impl NGramExtractor {
    pub(crate) fn from_params(params: &Params<'_>) -> Result<Self, MetaError> {
        params.reject_unknown(&["min_n", "max_n", "lowercase", "top_k"])?;
        let settings = NGramSettings {
            min_n: params.usize_or("min_n", NGRAM_MIN_N)?,
            max_n: params.usize_or("max_n", NGRAM_MAX_N)?,
            lowercase: params.bool_or("lowercase", true)?,
            top_k: params.optional_usize("top_k")?,
        };
        if settings.min_n == 0 || settings.min_n > settings.max_n {
            return Err(params.error(format!(
                "n-gram range {}..={} is empty",
                settings.min_n, settings.max_n
            )));
        }
        Ok(Self { settings })
    }
}

impl MetaDependent for NGramExtractor {
    fn meta_collectors(&self) -> Vec<CollectorDescription> {
        vec![CollectorKind::NGramFrequency(self.settings.clone()).into()]
    }
}

/// Keyword n-gram extractor; needs corpus counts of keyword n-grams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordNGramExtractor {
    /// Keyword collector settings.
    pub settings: KeywordSettings,
}

impl KeywordNGramExtractor {
    pub(crate) fn from_params(params: &Params<'_>) -> Result<Self, MetaError> {
        if params.contains(KEYWORDS_FILE) {
            return Err(params.error(
                "keywords_file must be inlined into keywords when the experiment file is loaded",
            ));
        }
        params.reject_unknown(&[KEYWORDS, "max_n", "include_commas", "mark_sentence_boundaries"])?;
        let mut keywords: Vec<String> = params
            .string_list(KEYWORDS)?
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .collect();
        keywords.sort();
        keywords.dedup();
        if keywords.is_empty() {
            return Err(params.error("no keywords configured"));
        }
        let settings = KeywordSettings {
            keywords,
            max_n: params.usize_or("max_n", KEYWORD_MAX_N)?,
            include_commas: params.bool_or("include_commas", false)?,
            mark_sentence_boundaries: params.bool_or("mark_sentence_boundaries", false)?,
        };
        if settings.max_n == 0 {
            return Err(params.error("max_n must be at least 1"));
        }
        Ok(Self { settings })
    }
}

impl MetaDependent for KeywordNGramExtractor {
    fn meta_collectors(&self) -> Vec<CollectorDescription> {
        vec![CollectorKind::KeywordNGram(self.settings.clone()).into()]
    }
}

/// TF-IDF extractor; needs document frequencies and the unigram vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TfIdfExtractor {
    /// Lowercase terms before counting.
    pub lowercase: bool,
}

impl TfIdfExtractor {
    pub(crate) fn from_params(params: &Params<'_>) -> Result<Self, MetaError> {
        params.reject_unknown(&["lowercase"])?;
        Ok(Self {
            lowercase: params.bool_or("lowercase", true)?,
        })
    }
}

impl MetaDependent for TfIdfExtractor {
    fn meta_collectors(&self) -> Vec<CollectorDescription> {
        vec![
            CollectorKind::DocumentFrequency(DocumentFrequencySettings {
                lowercase: self.lowercase,
            })
            .into(),
            CollectorKind::NGramFrequency(NGramSettings {
                min_n: 1,
                max_n: 1,
                lowercase: self.lowercase,
                top_k: None,
            })
            .into(),
        ]
    }
}
