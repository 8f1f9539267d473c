//! The build session controller.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use forgeview_store::{DiagnosticStore, SkipReason, StoreEffect};
use forgeview_types::{BuildResult, BuildState, DiagnosticId, SnippetBatch, SnippetUpdate};

use crate::backend::{BackendError, BuildBackend, ErrorSink};
use crate::events::ChannelEvent;

/// A UI action dispatched into the session's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// A build was requested.
    StartBuild,
    /// The build request returned.
    BuildComplete,
    /// The build-results view was (re-)requested.
    ShowBuildResults,
    /// Navigation to an error-code explanation.
    ShowErrCode,
    /// Navigation to search results.
    ShowSearch,
    /// Navigation to a source file.
    ShowSource,
    /// Navigation to a source directory listing.
    ShowSourceDir,
    /// Navigation to the summary view.
    ShowSummary,
}

impl SessionAction {
    /// Diagnostic-detail actions that move a built session into navigation.
    fn is_navigation(&self) -> bool {
        matches!(
            self,
            SessionAction::ShowErrCode
                | SessionAction::ShowSearch
                | SessionAction::ShowSource
                | SessionAction::ShowSourceDir
                | SessionAction::ShowSummary
        )
    }
}

/// Terminal failure of a build session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("build request failed")]
    BuildRequest(#[source] BackendError),
    #[error("snippet pull failed")]
    SnippetPull(#[source] BackendError),
}

/// What the view layer reads: an immutable store snapshot plus the lifecycle
/// state. Cheap to clone; the store is shared, never copied.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub diagnostics: Arc<DiagnosticStore>,
    pub build_state: BuildState,
    /// Set when a transport failure made the session terminal.
    pub internal_error: bool,
}

/// One build run: owns the diagnostic store, the lifecycle state, and the
/// pending-update buffer for the session's lifetime.
///
/// All methods take `&mut self` and run to completion without suspension —
/// the session is driven by a single task, so store mutations never
/// interleave. A rebuild is a new `BuildSession`, not a reused one.
pub struct BuildSession<B> {
    backend: B,
    store: Arc<DiagnosticStore>,
    state: BuildState,
    internal_error: bool,
    /// Whether the one-shot pull has been applied (or skipped for lack of a
    /// key). Until then, updates with unresolved targets are buffered rather
    /// than dropped.
    pull_complete: bool,
    pending: Vec<SnippetUpdate>,
}

impl<B: BuildBackend> BuildSession<B> {
    /// A fresh session around a build collaborator.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            store: Arc::new(DiagnosticStore::new()),
            state: BuildState::Fresh,
            internal_error: false,
            pull_complete: false,
            pending: Vec::new(),
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            diagnostics: Arc::clone(&self.store),
            build_state: self.state,
            internal_error: self.internal_error,
        }
    }

    /// Publish a new store snapshot. Snapshots already handed out keep the
    /// previous value.
    fn commit(&mut self, next: DiagnosticStore) {
        self.store = Arc::new(next);
    }

    // =========================================================================
    // State machine
    // =========================================================================

    /// Dispatch one action. Actions not listed for the current state leave
    /// it unchanged.
    pub fn dispatch(&mut self, action: SessionAction) -> BuildState {
        use BuildState::*;

        self.state = match (self.state, action) {
            (Fresh, SessionAction::StartBuild) => Building,
            (Building, SessionAction::BuildComplete) => Built,
            // The build-in-progress view may itself be re-requested.
            (Building | BuiltAndNavigating, SessionAction::ShowBuildResults) => Built,
            (Built, a) if a.is_navigation() => BuiltAndNavigating,
            (state, _) => state,
        };
        self.state
    }

    // =========================================================================
    // Store operations (routed through the session so snapshots stay fresh)
    // =========================================================================

    /// Flip children visibility on one diagnostic.
    pub fn toggle_children(&mut self, id: DiagnosticId) {
        self.commit(self.store.toggle_children(id));
    }

    /// Flip span visibility on one diagnostic.
    pub fn toggle_spans(&mut self, id: DiagnosticId) {
        self.commit(self.store.toggle_spans(id));
    }

    /// Apply one snippet update, buffering it for replay when its target
    /// isn't known yet and the one-shot pull hasn't completed.
    pub fn apply_update(&mut self, update: SnippetUpdate) {
        let (next, effect) = self.store.apply_snippet_update(&update);
        match effect {
            StoreEffect::Updated => self.commit(next),
            StoreEffect::Skipped(SkipReason::EmptySpanIds) => {}
            StoreEffect::Skipped(reason) => {
                if self.pull_complete {
                    // Terminal: the store has already logged the drop.
                } else {
                    debug!(%reason, "buffering snippet update until pull completes");
                    self.pending.push(update);
                }
            }
        }
    }

    /// Seed the store from a completed build's payload.
    pub fn seed_build(&mut self, result: BuildResult) {
        self.commit(DiagnosticStore::seed(result.diagnostics, result.messages));
    }

    /// Apply the one-shot pulled batch, then replay anything buffered.
    pub fn apply_pulled(&mut self, batch: SnippetBatch) {
        for update in batch.snippets {
            self.apply_update(update);
        }
        self.finish_pull();
    }

    /// Mark the pull phase done and replay buffered updates once. Updates
    /// still unresolved after the replay are dropped.
    pub fn finish_pull(&mut self) {
        self.pull_complete = true;
        if self.pending.is_empty() {
            return;
        }
        info!(count = self.pending.len(), "replaying buffered snippet updates");
        for update in std::mem::take(&mut self.pending) {
            let (next, effect) = self.store.apply_snippet_update(&update);
            if effect == StoreEffect::Updated {
                self.commit(next);
            }
        }
    }

    /// Handle one push-channel event. Returns `true` when the channel closed.
    pub fn handle_event(&mut self, event: ChannelEvent, sink: &mut impl ErrorSink) -> bool {
        match event {
            ChannelEvent::Message(batch) => {
                for update in batch.snippets {
                    self.apply_update(update);
                }
                false
            }
            ChannelEvent::Error(error) => {
                sink.report(&error);
                // A server error that carries a diagnostic becomes visible
                // alongside the build's own diagnostics.
                if let Some(diagnostic) = error.diagnostic {
                    self.commit(self.store.upsert_diagnostic(diagnostic));
                }
                false
            }
            ChannelEvent::Close => true,
        }
    }

    // =========================================================================
    // Orchestration
    // =========================================================================

    /// Run one build end to end.
    ///
    /// Issues the build request, seeds the store, pulls buffered snippets
    /// when the result carries a key, then consumes `events` until the
    /// channel closes or the sender hangs up. Call once per session, from
    /// [`BuildState::Fresh`].
    ///
    /// A transport failure (build request or pull) marks the session as a
    /// terminal internal error and releases the channel.
    pub async fn run_build(
        &mut self,
        mut events: mpsc::Receiver<ChannelEvent>,
        sink: &mut impl ErrorSink,
    ) -> Result<(), SessionError> {
        self.dispatch(SessionAction::StartBuild);

        let result = match self.backend.start_build().await {
            Ok(result) => result,
            Err(e) => {
                self.internal_error = true;
                events.close();
                return Err(SessionError::BuildRequest(e));
            }
        };

        self.dispatch(SessionAction::BuildComplete);
        let push_data_key = result.push_data_key.clone();
        self.seed_build(result);

        match push_data_key {
            Some(key) => match self.backend.pull_snippets(&key).await {
                Ok(batch) => self.apply_pulled(batch),
                Err(e) => {
                    self.internal_error = true;
                    events.close();
                    return Err(SessionError::SnippetPull(e));
                }
            },
            None => self.finish_pull(),
        }

        while let Some(event) = events.recv().await {
            if self.handle_event(event, sink) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Dispatch-only tests need a backend that is never called.
    struct NoBackend;

    #[async_trait]
    impl BuildBackend for NoBackend {
        async fn start_build(&self) -> Result<BuildResult, BackendError> {
            unreachable!("dispatch tests never hit the backend")
        }

        async fn pull_snippets(&self, _key: &str) -> Result<SnippetBatch, BackendError> {
            unreachable!("dispatch tests never hit the backend")
        }
    }

    fn session() -> BuildSession<NoBackend> {
        BuildSession::new(NoBackend)
    }

    #[test]
    fn full_lifecycle_scenario() {
        let mut s = session();
        assert_eq!(s.state(), BuildState::Fresh);

        assert_eq!(s.dispatch(SessionAction::StartBuild), BuildState::Building);
        assert_eq!(s.dispatch(SessionAction::BuildComplete), BuildState::Built);
        assert_eq!(
            s.dispatch(SessionAction::ShowSource),
            BuildState::BuiltAndNavigating
        );
        assert_eq!(
            s.dispatch(SessionAction::ShowBuildResults),
            BuildState::Built
        );
    }

    #[test]
    fn show_build_results_while_building() {
        let mut s = session();
        s.dispatch(SessionAction::StartBuild);
        assert_eq!(
            s.dispatch(SessionAction::ShowBuildResults),
            BuildState::Built
        );
    }

    #[test]
    fn unlisted_actions_are_no_ops() {
        let mut s = session();
        assert_eq!(s.dispatch(SessionAction::BuildComplete), BuildState::Fresh);
        assert_eq!(s.dispatch(SessionAction::ShowSource), BuildState::Fresh);

        s.dispatch(SessionAction::StartBuild);
        assert_eq!(s.dispatch(SessionAction::StartBuild), BuildState::Building);
        assert_eq!(s.dispatch(SessionAction::ShowErrCode), BuildState::Building);
    }

    #[test]
    fn every_navigation_action_moves_built_to_navigating() {
        for action in [
            SessionAction::ShowErrCode,
            SessionAction::ShowSearch,
            SessionAction::ShowSource,
            SessionAction::ShowSourceDir,
            SessionAction::ShowSummary,
        ] {
            let mut s = session();
            s.dispatch(SessionAction::StartBuild);
            s.dispatch(SessionAction::BuildComplete);
            assert_eq!(s.dispatch(action), BuildState::BuiltAndNavigating);
        }
    }
}
