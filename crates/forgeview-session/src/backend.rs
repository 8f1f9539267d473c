//! External collaborator seams.
//!
//! The session never speaks a transport itself; it talks to a
//! [`BuildBackend`] for the two request/response exchanges and hands stream
//! errors to an [`ErrorSink`]. Production implementations live outside this
//! core (HTTP client, error-display surface); tests provide in-memory ones.

use async_trait::async_trait;
use thiserror::Error;

use forgeview_types::{BuildResult, ChannelError, SnippetBatch};

/// Failure of a backend exchange.
///
/// Transport failures are terminal for the session: no automatic retry, a
/// new build must be explicitly triggered.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The build collaborator: triggers builds and serves buffered snippet pulls.
#[async_trait]
pub trait BuildBackend: Send + Sync {
    /// Trigger a build and wait for its completion payload.
    async fn start_build(&self) -> Result<BuildResult, BackendError>;

    /// Pull the snippet updates buffered under `key` since the build
    /// completed.
    async fn pull_snippets(&self, key: &str) -> Result<SnippetBatch, BackendError>;
}

/// The error-display collaborator: receives server-reported stream failures.
pub trait ErrorSink: Send {
    fn report(&mut self, error: &ChannelError);
}

/// A sink that only logs. Useful when no error surface is wired up.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl ErrorSink for LoggingSink {
    fn report(&mut self, error: &ChannelError) {
        tracing::error!(
            code = error.code.as_ref().map(|c| c.code.as_str()),
            explanation = error.explanation.as_deref(),
            "build stream reported an error"
        );
    }
}
