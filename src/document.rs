use serde::{Deserialize, Serialize};

use crate::constants::corpus::DEFAULT_VIEW;
pub use crate::types::{DocumentId, ViewName};

/// Character span `[begin, end)` over a view's text.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct TextSpan {
    /// Inclusive start offset in characters.
    pub begin: usize,
    /// Exclusive end offset in characters.
    pub end: usize,
}

impl TextSpan {
    /// Span covering `begin..end`.
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

/// One named view over a document (text plus classification targets).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct DocumentView {
    /// View name, unique within the document.
    pub name: ViewName,
    /// Raw view text.
    pub text: String,
    /// Classification units (unit feature mode).
    #[serde(default)]
    pub units: Vec<TextSpan>,
    /// Classification sequences (sequence feature mode).
    #[serde(default)]
    pub sequences: Vec<TextSpan>,
    /// Gold outcomes attached to this view.
    #[serde(default)]
    pub outcomes: Vec<String>,
}

impl DocumentView {
    /// Create a view with text and no annotations.
    pub fn new(name: impl Into<ViewName>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            units: Vec::new(),
            sequences: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Attach unit spans.
    pub fn with_units(mut self, units: Vec<TextSpan>) -> Self {
        self.units = units;
        self
    }

    /// Attach sequence spans.
    pub fn with_sequences(mut self, sequences: Vec<TextSpan>) -> Self {
        self.sequences = sequences;
        self
    }

    /// Attach gold outcomes.
    pub fn with_outcomes(mut self, outcomes: Vec<String>) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Text covered by `span`, clamped to the view bounds.
    pub fn covered_text(&self, span: TextSpan) -> String {
        let end = span.end.max(span.begin);
        self.text
            .chars()
            .skip(span.begin)
            .take(end - span.begin)
            .collect()
    }
}

/// Per-document record handed to collectors during the scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct Document {
    /// Stable document identifier.
    pub id: DocumentId,
    /// Origin of the document, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Document language, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Views in insertion order.
    pub views: Vec<DocumentView>,
}

impl Document {
    /// Create a document whose text lives in the default view.
    pub fn single_view(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: None,
            language: None,
            views: vec![DocumentView::new(DEFAULT_VIEW, text)],
        }
    }

    /// Create a document from explicit views.
    pub fn with_views(id: impl Into<DocumentId>, views: Vec<DocumentView>) -> Self {
        Self {
            id: id.into(),
            uri: None,
            language: None,
            views,
        }
    }

    /// Set the document language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the document origin.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Look up a view by name.
    pub fn view(&self, name: &str) -> Option<&DocumentView> {
        self.views.iter().find(|view| view.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_view_documents_expose_the_default_view() {
        let doc = Document::single_view("0", "cherry trees bloom");
        assert_eq!(doc.view(DEFAULT_VIEW).map(|v| v.text.as_str()), Some("cherry trees bloom"));
        assert!(doc.view("target").is_none());
    }

    #[test]
    fn covered_text_counts_characters_and_clamps() {
        let view = DocumentView::new(DEFAULT_VIEW, "naïve cats");
        assert_eq!(view.covered_text(TextSpan::new(0, 5)), "naïve");
        assert_eq!(view.covered_text(TextSpan::new(6, 99)), "cats");
        assert_eq!(view.covered_text(TextSpan::new(4, 2)), "");
    }
}
