//! Snapshot-based diagnostic store for forgeview.
//!
//! The store owns the full nested diagnostic collection for one build run and
//! exposes pure operations: every operation takes `&self` and returns a new
//! [`DiagnosticStore`] value, so snapshots already handed to readers stay
//! valid forever. There is no interior mutability and no locking — mutual
//! exclusion is structural, one logical writer at a time.
//!
//! # Operation Semantics
//!
//! All operations are total. A snippet update that can't resolve its target
//! (unknown diagnostic id, unknown child) is a logged no-op, reported through
//! [`StoreEffect`] rather than an error — out-of-order delivery between the
//! one-shot pull and the live stream makes unknown targets an expected case,
//! and the session layer uses the [`SkipReason`] to decide whether to buffer
//! the update for replay.

mod merge;
mod store;

pub use merge::merge_spans;
pub use store::{DiagnosticStore, SkipReason, StoreEffect};
