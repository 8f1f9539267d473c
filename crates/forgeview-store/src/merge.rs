//! The snippet merge engine.
//!
//! Pure function folding one [`SnippetUpdate`] into an existing span
//! collection. The session applies updates in arrival order; the engine
//! itself never looks at anything beyond the one map and the one update.

use forgeview_types::{SnippetUpdate, Span, SpanMap};

/// Fold one update into a span collection, producing the replacement map.
///
/// Every key listed in `update.span_ids` is removed, then a single new span
/// built from the update's fields is inserted under `span_ids[0]`. Because
/// the removal pass already dropped that key, the insertion always lands at
/// the end of the map — display order is arrival order of updates, not the
/// order implied by the original diagnostic.
///
/// Applying the same update twice yields the same map as applying it once.
/// Updates with disjoint `span_ids` commute; updates with overlapping
/// `span_ids` do **not** — the last one applied wins and its span sits at the
/// end. That hazard is inherited behavior, kept deliberately.
pub fn merge_spans(existing: &SpanMap, update: &SnippetUpdate) -> SpanMap {
    let mut spans: SpanMap = existing
        .iter()
        .filter(|(id, _)| !update.span_ids.contains(id))
        .map(|(id, span)| (*id, span.clone()))
        .collect();

    let Some(new_id) = update.new_span_id() else {
        // Malformed update with empty span_ids: nothing to remove, nothing
        // to insert.
        return spans;
    };

    let span = Span {
        id: new_id,
        file_name: update.file_name.clone(),
        block_line_start: update.line_start,
        block_line_end: update.line_end,
        line_start: update.primary_span.line_start,
        line_end: update.primary_span.line_end,
        column_start: update.primary_span.column_start,
        column_end: update.primary_span.column_end,
        text: update.text.clone(),
        plain_text: update.plain_text.clone(),
        label: String::new(),
        highlights: update.highlights.clone(),
    };
    spans.insert(new_id, span);
    spans
}
