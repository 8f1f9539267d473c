//! Shared diagnostic and wire payload types for forgeview.
//!
//! This crate is the data-model foundation: typed IDs, diagnostics, source
//! spans, and the payloads that arrive from the build backend. It has **no
//! internal forgeview dependencies** — a pure leaf crate that the store and
//! session crates build on.
//!
//! # Entity Overview
//!
//! ```text
//! BuildResult ← one completed build request
//!     └── diagnostics: Vec<Diagnostic>
//!     └── push_data_key → keys a SnippetBatch pull
//!
//! Diagnostic (DiagnosticId) ← one compiler message
//!     └── spans: SpanMap (insertion order = display order)
//!     └── children: ChildMap (one nesting level is merge-addressable)
//!
//! SnippetUpdate ← newly available excerpt content for one span slot
//!     └── target() → TopLevel(id) | Child { parent, child }
//!     └── span_ids: ids it supersedes; span_ids[0] is the new span's id
//! ```
//!
//! # Key Types
//!
//! | Type              | Purpose                                       |
//! |-------------------|-----------------------------------------------|
//! | [`DiagnosticId`]  | Which diagnostic (unique within a build run)  |
//! | [`SpanId`]        | Which span slot within a diagnostic           |
//! | [`Diagnostic`]    | One compiler message with spans and children  |
//! | [`Span`]          | One source excerpt with a highlighted range   |
//! | [`SnippetUpdate`] | Incremental replacement for a set of spans    |
//! | [`BuildResult`]   | Payload of a completed build request          |
//! | [`BuildState`]    | Lifecycle of one build session                |

pub mod diagnostic;
pub mod ids;
pub mod payload;
pub mod state;
pub mod update;

// Re-export primary types at crate root for convenience.
pub use diagnostic::{ChildMap, Diagnostic, DiagnosticCode, Level, Span, SpanMap};
pub use ids::{DiagnosticId, SpanId};
pub use payload::{BuildResult, ChannelError, SnippetBatch};
pub use state::BuildState;
pub use update::{Highlight, SnippetUpdate, UpdateTarget};
