//! Incremental snippet updates.
//!
//! After a build completes, the backend keeps re-processing source excerpts
//! (syntax highlighting, context lines) and streams the results down as
//! [`SnippetUpdate`]s. Each update carries the full replacement content for
//! one span slot plus the set of existing span ids it supersedes.

use serde::{Deserialize, Serialize};

use crate::ids::{DiagnosticId, SpanId};

/// A highlighted source range, 1-based lines and character columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub line_start: usize,
    pub line_end: usize,
    pub column_start: usize,
    pub column_end: usize,
}

/// Newly available excerpt content for one span slot.
///
/// `span_ids` is non-empty and ordered; every listed id is removed from the
/// target diagnostic's span collection, and the replacement span is inserted
/// under `span_ids[0]`. A `parent_id` marks the update as child-targeted:
/// `diagnostic_id` then names a child of that parent rather than a top-level
/// diagnostic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnippetUpdate {
    #[serde(default)]
    pub parent_id: Option<DiagnosticId>,
    pub diagnostic_id: DiagnosticId,
    pub span_ids: Vec<SpanId>,
    /// Excerpt lines (may carry markup).
    pub text: Vec<String>,
    pub file_name: String,
    /// Extent of the excerpt, 1-based.
    pub line_start: usize,
    pub line_end: usize,
    /// Secondary sub-ranges with their labels.
    pub highlights: Vec<(Highlight, String)>,
    pub plain_text: String,
    /// The primary highlighted range within the excerpt.
    pub primary_span: Highlight,
}

impl SnippetUpdate {
    /// The diagnostic this update addresses, decoded once from the wire's
    /// `parent_id`-is-present convention.
    pub fn target(&self) -> UpdateTarget {
        match self.parent_id {
            Some(parent) => UpdateTarget::Child {
                parent,
                child: self.diagnostic_id,
            },
            None => UpdateTarget::TopLevel(self.diagnostic_id),
        }
    }

    /// The id the replacement span will be inserted under, if the update is
    /// well-formed (`span_ids` non-empty).
    pub fn new_span_id(&self) -> Option<SpanId> {
        self.span_ids.first().copied()
    }
}

/// Where a [`SnippetUpdate`] lands in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateTarget {
    /// A top-level diagnostic.
    TopLevel(DiagnosticId),
    /// A child diagnostic, addressed by its own id within the parent.
    Child {
        parent: DiagnosticId,
        child: DiagnosticId,
    },
}
