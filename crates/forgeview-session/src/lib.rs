//! Build session controller and push-channel listener for forgeview.
//!
//! One [`BuildSession`] spans the lifetime of one build run: it issues the
//! build request through a [`BuildBackend`], seeds the diagnostic store from
//! the result, pulls the buffered snippet batch, then consumes the push
//! channel until it closes. The session exclusively owns the store and the
//! [`BuildState`](forgeview_types::BuildState) for the run; views read
//! immutable [`Snapshot`]s and never write back.
//!
//! ```text
//!   BuildBackend (trait)        mpsc        BuildSession (one task)
//!   ┌──────────────────┐   ◀── request ──  ┌──────────────────────────┐
//!   │ start_build()    │                   │ state machine (dispatch) │
//!   │ pull_snippets()  │  ── payloads ──▶  │ DiagnosticStore snapshots│
//!   └──────────────────┘                   │ pending-update buffer    │
//!   push channel ── ChannelEvent ────────▶ └──────────────────────────┘
//! ```
//!
//! Everything runs on one task: store mutations and channel-event handling
//! never interleave mid-merge, so the store needs no locks.

mod backend;
mod events;
mod session;

pub use backend::{BackendError, BuildBackend, ErrorSink, LoggingSink};
pub use events::{ChannelEvent, DecodeError};
pub use session::{BuildSession, SessionAction, SessionError, Snapshot};
