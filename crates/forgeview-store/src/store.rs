//! The diagnostic store.

use std::fmt;

use indexmap::IndexMap;
use tracing::warn;

use forgeview_types::{Diagnostic, DiagnosticId, SnippetUpdate, UpdateTarget};

use crate::merge::merge_spans;

/// What an [`apply_snippet_update`](DiagnosticStore::apply_snippet_update)
/// call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEffect {
    /// The target was found and its spans were replaced.
    Updated,
    /// The target could not be resolved; the store is unchanged.
    Skipped(SkipReason),
}

/// Why an update was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No top-level diagnostic with this id.
    UnknownDiagnostic(DiagnosticId),
    /// The parent exists but has no child with this id.
    UnknownChild {
        parent: DiagnosticId,
        child: DiagnosticId,
    },
    /// The update listed no span ids, so there is no slot to fill.
    EmptySpanIds,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownDiagnostic(id) => {
                write!(f, "no diagnostic with id {id}")
            }
            SkipReason::UnknownChild { parent, child } => {
                write!(f, "diagnostic {parent} has no child {child}")
            }
            SkipReason::EmptySpanIds => write!(f, "update lists no span ids"),
        }
    }
}

/// The full nested diagnostic collection for one build run.
///
/// A value type: every operation returns a new store, leaving the receiver
/// untouched. Previously handed-out snapshots therefore remain valid for
/// concurrent readers. Operations never fail — an unresolved target is a
/// logged no-op.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagnosticStore {
    diagnostics: IndexMap<DiagnosticId, Diagnostic>,
    messages: Vec<String>,
}

impl DiagnosticStore {
    /// An empty store for a fresh build run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fresh store from a build's diagnostic tree and output lines.
    pub fn seed(diagnostics: Vec<Diagnostic>, messages: Vec<String>) -> Self {
        Self {
            diagnostics: diagnostics.into_iter().map(|d| (d.id, d)).collect(),
            messages,
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// All diagnostics in display order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.values()
    }

    /// Look up one top-level diagnostic.
    pub fn get(&self, id: DiagnosticId) -> Option<&Diagnostic> {
        self.diagnostics.get(&id)
    }

    /// Free-text build output lines, in arrival order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of top-level diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    // =========================================================================
    // Operations — pure, total, snapshot-producing
    // =========================================================================

    /// Insert or wholesale-replace the diagnostic at `diagnostic.id`.
    ///
    /// Replacement keeps the existing display position; a new id appends.
    pub fn upsert_diagnostic(&self, diagnostic: Diagnostic) -> Self {
        let mut next = self.clone();
        next.diagnostics.insert(diagnostic.id, diagnostic);
        next
    }

    /// Append one free-text build output line.
    pub fn add_message(&self, message: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.messages.push(message.into());
        next
    }

    /// Fold one snippet update into its target diagnostic's span collection.
    ///
    /// The target is either a top-level diagnostic or, for child-targeted
    /// updates, a child addressed by its own id within the parent. An
    /// unresolved target leaves the store unchanged and reports the skip.
    pub fn apply_snippet_update(&self, update: &SnippetUpdate) -> (Self, StoreEffect) {
        if update.new_span_id().is_none() {
            let reason = SkipReason::EmptySpanIds;
            warn!(update_target = ?update.target(), "dropping snippet update: {reason}");
            return (self.clone(), StoreEffect::Skipped(reason));
        }

        match update.target() {
            UpdateTarget::TopLevel(id) => {
                let Some(diagnostic) = self.diagnostics.get(&id) else {
                    let reason = SkipReason::UnknownDiagnostic(id);
                    warn!("snippet update target unresolved: {reason}");
                    return (self.clone(), StoreEffect::Skipped(reason));
                };
                let mut updated = diagnostic.clone();
                updated.spans = merge_spans(&diagnostic.spans, update);
                (self.upsert_diagnostic(updated), StoreEffect::Updated)
            }
            UpdateTarget::Child { parent, child } => {
                let Some(parent_diag) = self.diagnostics.get(&parent) else {
                    let reason = SkipReason::UnknownDiagnostic(parent);
                    warn!("snippet update target unresolved: {reason}");
                    return (self.clone(), StoreEffect::Skipped(reason));
                };
                let Some(child_diag) = parent_diag.children.get(&child) else {
                    let reason = SkipReason::UnknownChild { parent, child };
                    warn!("snippet update target unresolved: {reason}");
                    return (self.clone(), StoreEffect::Skipped(reason));
                };

                let mut updated_child = child_diag.clone();
                updated_child.spans = merge_spans(&child_diag.spans, update);

                // In-place replacement: the child keeps its display position.
                let mut updated_parent = parent_diag.clone();
                updated_parent.children.insert(child, updated_child);
                (self.upsert_diagnostic(updated_parent), StoreEffect::Updated)
            }
        }
    }

    /// Flip the children-visibility flag on the diagnostic at `id`.
    pub fn toggle_children(&self, id: DiagnosticId) -> Self {
        self.toggle(id, |d| d.show_children = !d.show_children)
    }

    /// Flip the span-visibility flag on the diagnostic at `id`.
    pub fn toggle_spans(&self, id: DiagnosticId) -> Self {
        self.toggle(id, |d| d.show_spans = !d.show_spans)
    }

    fn toggle(&self, id: DiagnosticId, flip: impl FnOnce(&mut Diagnostic)) -> Self {
        let Some(diagnostic) = self.diagnostics.get(&id) else {
            warn!("toggle on unknown diagnostic {id}");
            return self.clone();
        };
        let mut updated = diagnostic.clone();
        flip(&mut updated);
        self.upsert_diagnostic(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgeview_types::{ChildMap, Highlight, Level, SpanId, SpanMap};

    fn diagnostic(id: u32) -> Diagnostic {
        Diagnostic {
            id: DiagnosticId::new(id),
            level: Level::Error,
            message: format!("message {id}"),
            code: None,
            spans: SpanMap::new(),
            children: ChildMap::new(),
            show_children: true,
            show_spans: true,
        }
    }

    fn update(diagnostic_id: u32, parent_id: Option<u32>, span_ids: &[u32]) -> SnippetUpdate {
        SnippetUpdate {
            parent_id: parent_id.map(DiagnosticId::new),
            diagnostic_id: DiagnosticId::new(diagnostic_id),
            span_ids: span_ids.iter().copied().map(SpanId::new).collect(),
            text: vec!["new".into()],
            file_name: "src/main.rs".into(),
            line_start: 3,
            line_end: 8,
            highlights: Vec::new(),
            plain_text: "new".into(),
            primary_span: Highlight {
                line_start: 5,
                line_end: 5,
                column_start: 1,
                column_end: 3,
            },
        }
    }

    // =========================================================================
    // Upsert
    // =========================================================================

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let store = DiagnosticStore::new()
            .upsert_diagnostic(diagnostic(1))
            .upsert_diagnostic(diagnostic(2));

        let mut replacement = diagnostic(1);
        replacement.message = "replaced".into();
        let store = store.upsert_diagnostic(replacement);

        let ids: Vec<u32> = store.diagnostics().map(|d| d.id.raw()).collect();
        assert_eq!(ids, vec![1, 2], "replacement keeps position");
        assert_eq!(store.get(DiagnosticId::new(1)).unwrap().message, "replaced");
    }

    #[test]
    fn upsert_does_not_disturb_prior_snapshots() {
        let before = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let after = before.upsert_diagnostic(diagnostic(2));
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    // =========================================================================
    // Snippet updates
    // =========================================================================

    #[test]
    fn update_lands_in_empty_span_collection() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let (store, effect) = store.apply_snippet_update(&update(1, None, &[10]));

        assert_eq!(effect, StoreEffect::Updated);
        let spans = &store.get(DiagnosticId::new(1)).unwrap().spans;
        assert_eq!(spans.len(), 1);
        assert!(spans.contains_key(&SpanId::new(10)));
    }

    #[test]
    fn concrete_merge_scenario() {
        // Diagnostic 1 starts with span 10 containing "old"; the update
        // recomputes that same slot.
        let mut d = diagnostic(1);
        d.spans.insert(
            SpanId::new(10),
            forgeview_types::Span {
                id: SpanId::new(10),
                file_name: "src/main.rs".into(),
                block_line_start: 1,
                block_line_end: 2,
                line_start: 1,
                line_end: 1,
                column_start: 1,
                column_end: 2,
                text: vec!["old".into()],
                plain_text: "old".into(),
                label: String::new(),
                highlights: Vec::new(),
            },
        );
        let store = DiagnosticStore::new().upsert_diagnostic(d);

        let (store, effect) = store.apply_snippet_update(&update(1, None, &[10]));
        assert_eq!(effect, StoreEffect::Updated);

        let spans = &store.get(DiagnosticId::new(1)).unwrap().spans;
        assert_eq!(spans.len(), 1);
        let s = &spans[&SpanId::new(10)];
        assert_eq!(s.text, vec!["new".to_string()]);
        assert_eq!(s.line_start, 5);
    }

    #[test]
    fn unknown_target_leaves_store_value_equal() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let (after, effect) = store.apply_snippet_update(&update(2, None, &[1]));

        assert_eq!(after, store);
        assert_eq!(
            effect,
            StoreEffect::Skipped(SkipReason::UnknownDiagnostic(DiagnosticId::new(2)))
        );
    }

    #[test]
    fn child_update_addresses_child_by_its_own_id() {
        let mut parent = diagnostic(1);
        parent.children.insert(DiagnosticId::new(3), diagnostic(3));
        parent.children.insert(DiagnosticId::new(4), diagnostic(4));
        let store = DiagnosticStore::new().upsert_diagnostic(parent);

        let (store, effect) = store.apply_snippet_update(&update(3, Some(1), &[20]));
        assert_eq!(effect, StoreEffect::Updated);

        let parent = store.get(DiagnosticId::new(1)).unwrap();
        let child_ids: Vec<u32> = parent.children.keys().map(|k| k.raw()).collect();
        assert_eq!(child_ids, vec![3, 4], "child keeps its position");
        assert!(
            parent.children[&DiagnosticId::new(3)]
                .spans
                .contains_key(&SpanId::new(20))
        );
    }

    #[test]
    fn child_update_with_unknown_child_is_skipped() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let (after, effect) = store.apply_snippet_update(&update(9, Some(1), &[20]));

        assert_eq!(after, store);
        assert_eq!(
            effect,
            StoreEffect::Skipped(SkipReason::UnknownChild {
                parent: DiagnosticId::new(1),
                child: DiagnosticId::new(9),
            })
        );
    }

    #[test]
    fn empty_span_ids_update_is_skipped() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let (after, effect) = store.apply_snippet_update(&update(1, None, &[]));
        assert_eq!(after, store);
        assert_eq!(effect, StoreEffect::Skipped(SkipReason::EmptySpanIds));
    }

    // =========================================================================
    // Toggles and messages
    // =========================================================================

    #[test]
    fn toggle_children_is_an_involution() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let id = DiagnosticId::new(1);

        let once = store.toggle_children(id);
        assert!(!once.get(id).unwrap().show_children);
        let twice = once.toggle_children(id);
        assert_eq!(twice, store);
    }

    #[test]
    fn toggle_spans_is_an_involution() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        let id = DiagnosticId::new(1);
        assert_eq!(store.toggle_spans(id).toggle_spans(id), store);
    }

    #[test]
    fn toggle_on_unknown_id_is_a_no_op() {
        let store = DiagnosticStore::new().upsert_diagnostic(diagnostic(1));
        assert_eq!(store.toggle_children(DiagnosticId::new(42)), store);
    }

    #[test]
    fn messages_append_in_order() {
        let store = DiagnosticStore::new()
            .add_message("Compiling forgeview v0.1.0")
            .add_message("Finished dev profile");
        assert_eq!(
            store.messages(),
            ["Compiling forgeview v0.1.0", "Finished dev profile"]
        );
    }

    #[test]
    fn seed_keys_diagnostics_by_id() {
        let store = DiagnosticStore::seed(vec![diagnostic(2), diagnostic(5)], vec!["ok".into()]);
        assert_eq!(store.len(), 2);
        assert!(store.get(DiagnosticId::new(5)).is_some());
        assert_eq!(store.messages(), ["ok"]);
    }
}
