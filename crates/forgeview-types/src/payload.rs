//! Wire payloads delivered by the build backend.
//!
//! Transport mechanics (HTTP, event source) live outside this core; only the
//! decoded payload shapes matter here.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::update::SnippetUpdate;

/// Response to a successful build request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    /// The full diagnostic tree produced by the build.
    pub diagnostics: Vec<Diagnostic>,
    /// Free-text build output lines (stdout, non-JSON stderr).
    #[serde(default)]
    pub messages: Vec<String>,
    /// Keys the one-shot pull of buffered snippet updates, when the backend
    /// has re-processing in flight.
    #[serde(default)]
    pub push_data_key: Option<String>,
}

/// One pulled or streamed batch of snippet updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnippetBatch {
    pub snippets: Vec<SnippetUpdate>,
    /// The pull key this batch was buffered under.
    #[serde(default)]
    pub key: String,
}

/// A server-reported failure delivered on the push channel.
///
/// Non-fatal to the session unless paired with a close. When the payload
/// carries a full diagnostic, that diagnostic also enters the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelError {
    #[serde(default)]
    pub code: Option<DiagnosticCode>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub diagnostic: Option<Diagnostic>,
}
