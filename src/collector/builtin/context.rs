use crate::artifact::{Artifact, ContextEntry, ContextTable};
use crate::collector::MetaCollector;
use crate::constants::collectors::{
    CONTEXT_WINDOW_CHARS, PARAM_SEQUENCE_CONTEXT, PARAM_UNIT_CONTEXT, SEQUENCE_CONTEXT_KEY,
    UNIT_CONTEXT_KEY,
};
use crate::constants::implementations::{SEQUENCE_CONTEXT_COLLECTOR, UNIT_CONTEXT_COLLECTOR};
use crate::document::{Document, DocumentView, TextSpan};
use crate::errors::MetaError;
use crate::namespace::StorageRequest;

/// Which classification targets a context collector records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextTarget {
    /// Classification units.
    Unit,
    /// Sequences of units.
    Sequence,
}

/// Records the text surrounding each unit or sequence for error analysis.
///
/// Active only through the feature mode, never declared by extractors.
pub struct ContextCollector {
    target: ContextTarget,
    table: ContextTable,
}

impl ContextCollector {
    /// Collector for unit mode.
    pub fn units() -> Self {
        Self {
            target: ContextTarget::Unit,
            table: ContextTable::default(),
        }
    }

    /// Collector for sequence mode.
    pub fn sequences() -> Self {
        Self {
            target: ContextTarget::Sequence,
            table: ContextTable::default(),
        }
    }

    fn parameter(&self) -> &'static str {
        match self.target {
            ContextTarget::Unit => PARAM_UNIT_CONTEXT,
            ContextTarget::Sequence => PARAM_SEQUENCE_CONTEXT,
        }
    }
}

impl MetaCollector for ContextCollector {
    fn name(&self) -> &str {
        match self.target {
            ContextTarget::Unit => UNIT_CONTEXT_COLLECTOR,
            ContextTarget::Sequence => SEQUENCE_CONTEXT_COLLECTOR,
        }
    }

    fn storage_requests(&self) -> Vec<StorageRequest> {
        let key = match self.target {
            ContextTarget::Unit => UNIT_CONTEXT_KEY,
            ContextTarget::Sequence => SEQUENCE_CONTEXT_KEY,
        };
        vec![StorageRequest::new(self.parameter(), key)]
    }

    fn collect(&mut self, document: &Document, view: &DocumentView) -> Result<(), MetaError> {
        let spans = match self.target {
            ContextTarget::Unit => &view.units,
            ContextTarget::Sequence => &view.sequences,
        };
        if spans.is_empty() {
            return Ok(());
        }
        let length = view.text.chars().count();
        for (index, span) in spans.iter().enumerate() {
            self.table.entries.push(context_entry(document, view, length, *span, index));
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<Artifact>, MetaError> {
        Ok(vec![Artifact::new(self.parameter(), self.table.encode())])
    }
}

fn context_entry(
    document: &Document,
    view: &DocumentView,
    length: usize,
    span: TextSpan,
    index: usize,
) -> ContextEntry {
    let begin = span.begin.min(length);
    let end = span.end.clamp(begin, length);
    let left = TextSpan::new(begin.saturating_sub(CONTEXT_WINDOW_CHARS), begin);
    let right = TextSpan::new(end, end + CONTEXT_WINDOW_CHARS);
    ContextEntry {
        document: document.id.clone(),
        view: view.name.clone(),
        index: index as u64,
        left: flatten(&view.covered_text(left)),
        covered: flatten(&view.covered_text(TextSpan::new(begin, end))),
        right: flatten(&view.covered_text(right)),
    }
}

fn flatten(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::corpus::DEFAULT_VIEW;

    #[test]
    fn unit_contexts_capture_surrounding_windows() {
        let text = "The quick brown fox\njumps";
        let view = DocumentView::new(DEFAULT_VIEW, text)
            .with_units(vec![TextSpan::new(4, 9), TextSpan::new(20, 25)]);
        let doc = Document::with_views("d1", vec![view]);

        let mut collector: Box<dyn MetaCollector> = Box::new(ContextCollector::units());
        collector.collect(&doc, &doc.views[0]).unwrap();
        let artifacts = collector.finish().unwrap();
        assert_eq!(artifacts[0].parameter, PARAM_UNIT_CONTEXT);

        let table = ContextTable::decode(&artifacts[0].bytes).unwrap();
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].render(), "The [quick] brown fox jumps");
        assert_eq!(table.entries[1].key(), "d1__InitialView_1");
        assert_eq!(table.entries[1].covered, "jumps");
    }

    #[test]
    fn sequence_collector_ignores_units() {
        let view = DocumentView::new(DEFAULT_VIEW, "a b c")
            .with_units(vec![TextSpan::new(0, 1)])
            .with_sequences(vec![TextSpan::new(0, 5)]);
        let doc = Document::with_views("d", vec![view]);
        let mut collector: Box<dyn MetaCollector> = Box::new(ContextCollector::sequences());
        assert_eq!(collector.storage_requests()[0].preferred_key, SEQUENCE_CONTEXT_KEY);
        collector.collect(&doc, &doc.views[0]).unwrap();
        let artifacts = collector.finish().unwrap();
        let table = ContextTable::decode(&artifacts[0].bytes).unwrap();
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].covered, "a b c");
    }

    #[test]
    fn out_of_range_spans_are_clamped() {
        let view = DocumentView::new(DEFAULT_VIEW, "abc").with_units(vec![TextSpan::new(2, 10)]);
        let doc = Document::with_views("d", vec![view]);
        let mut collector = ContextCollector::units();
        collector.collect(&doc, &doc.views[0]).unwrap();
        assert_eq!(collector.table.entries[0].covered, "c");
        assert_eq!(collector.table.entries[0].right, "");
    }
}
