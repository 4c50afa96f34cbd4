use std::collections::{HashMap, HashSet};

use crate::artifact::{Artifact, FrequencyTable};
use crate::collector::MetaCollector;
use crate::constants::collectors::{
    COMMA_TOKEN, KEYWORD_NGRAM_KEY, NGRAM_GLUE, PARAM_KEYWORD_NGRAMS, SENTENCE_BOUNDARY_MARK,
};
use crate::constants::defaults::KEYWORD_MAX_N;
use crate::constants::implementations::KEYWORD_NGRAM_COLLECTOR;
use crate::document::{Document, DocumentView};
use crate::errors::MetaError;
use crate::namespace::StorageRequest;
use crate::types::Term;
use crate::utils::{ngrams, sentences, tokenize};

/// Keyword n-gram settings.
///
/// Only configured keywords take part in n-grams; every other token is
/// skipped, so `apricot and peach` yields `apricot_peach`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordSettings {
    /// Lowercased keywords.
    pub keywords: Vec<Term>,
    /// Largest n-gram length.
    pub max_n: usize,
    /// Keep commas in the keyword stream as `CA`.
    pub include_commas: bool,
    /// Insert an `SB` marker after each sentence.
    pub mark_sentence_boundaries: bool,
}

impl Default for KeywordSettings {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            max_n: KEYWORD_MAX_N,
            include_commas: false,
            mark_sentence_boundaries: false,
        }
    }
}

/// Counts n-grams over the keyword stream of each view.
pub struct KeywordNGramCollector {
    settings: KeywordSettings,
    keywords: HashSet<Term>,
    counts: HashMap<Term, u64>,
    documents: u64,
}

impl KeywordNGramCollector {
    /// Empty collector; keywords are matched lowercased.
    pub fn new(settings: KeywordSettings) -> Self {
        let keywords = settings
            .keywords
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .collect();
        Self {
            settings,
            keywords,
            counts: HashMap::new(),
            documents: 0,
        }
    }

    fn keyword_stream(&self, text: &str) -> Vec<Term> {
        let mut stream = Vec::new();
        for sentence in sentences(text) {
            for token in tokenize(&sentence, true) {
                if token == "," {
                    if self.settings.include_commas {
                        stream.push(COMMA_TOKEN.to_string());
                    }
                } else if self.keywords.contains(&token) {
                    stream.push(token);
                }
            }
            if self.settings.mark_sentence_boundaries {
                stream.push(SENTENCE_BOUNDARY_MARK.to_string());
            }
        }
        stream
    }
}

fn is_marker_only(gram: &str) -> bool {
    gram.split(NGRAM_GLUE)
        .all(|part| part == COMMA_TOKEN || part == SENTENCE_BOUNDARY_MARK)
}

impl MetaCollector for KeywordNGramCollector {
    fn name(&self) -> &str {
        KEYWORD_NGRAM_COLLECTOR
    }

    fn storage_requests(&self) -> Vec<StorageRequest> {
        vec![StorageRequest::new(PARAM_KEYWORD_NGRAMS, KEYWORD_NGRAM_KEY)]
    }

    fn collect(&mut self, _document: &Document, view: &DocumentView) -> Result<(), MetaError> {
        let stream = self.keyword_stream(&view.text);
        for gram in ngrams(&stream, 1, self.settings.max_n) {
            if is_marker_only(&gram) {
                continue;
            }
            *self.counts.entry(gram).or_insert(0) += 1;
        }
        self.documents += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<Artifact>, MetaError> {
        let table = FrequencyTable::from_counts(self.documents, self.counts, None);
        Ok(vec![Artifact::new(PARAM_KEYWORD_NGRAMS, table.encode())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit_settings() -> KeywordSettings {
        KeywordSettings {
            keywords: ["cherry", "apricot", "peach", "nectarine"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            max_n: 2,
            ..KeywordSettings::default()
        }
    }

    fn run(settings: KeywordSettings, text: &str) -> FrequencyTable {
        let mut collector: Box<dyn MetaCollector> = Box::new(KeywordNGramCollector::new(settings));
        let doc = Document::single_view("0", text);
        collector.collect(&doc, &doc.views[0]).unwrap();
        let artifacts = collector.finish().unwrap();
        FrequencyTable::decode(&artifacts[0].bytes).unwrap()
    }

    const TEXT: &str = "Apricot and peach, guava. Nectarine trees grow.";

    #[test]
    fn non_keywords_are_skipped_when_forming_ngrams() {
        let table = run(fruit_settings(), TEXT);
        assert_eq!(table.count("apricot_peach"), Some(1));
        assert_eq!(table.count("peach_nectarine"), Some(1));
        assert_eq!(table.count("guava"), None);
        assert_eq!(table.count("peach_CA"), None);
    }

    #[test]
    fn commas_join_the_stream_when_enabled() {
        let settings = KeywordSettings {
            include_commas: true,
            ..fruit_settings()
        };
        let table = run(settings, TEXT);
        assert_eq!(table.count("peach_CA"), Some(1));
        assert_eq!(table.count("peach_nectarine"), None);
        assert_eq!(table.count("CA"), None);
    }

    #[test]
    fn sentence_markers_follow_each_sentence() {
        let settings = KeywordSettings {
            mark_sentence_boundaries: true,
            ..fruit_settings()
        };
        let table = run(settings, TEXT);
        assert_eq!(table.count("peach_SB"), Some(1));
        assert_eq!(table.count("SB_nectarine"), Some(1));
        assert_eq!(table.count("nectarine_SB"), Some(1));
        assert_eq!(table.count("SB"), None);
    }
}
