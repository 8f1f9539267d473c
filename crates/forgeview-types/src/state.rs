//! Build session lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of one build session.
///
/// Process-scoped to a single session: initialized to [`Fresh`](Self::Fresh)
/// at session start and destroyed when a new session begins. Transitions are
/// owned by the session controller; anything not listed there leaves the
/// state unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildState {
    /// No build has been requested yet.
    #[default]
    Fresh,
    /// A build request is in flight.
    Building,
    /// The build finished; results are the active view.
    Built,
    /// The build finished and the user navigated away to a detail view.
    BuiltAndNavigating,
}

impl BuildState {
    /// Whether build results exist (navigating or not).
    pub fn is_built(&self) -> bool {
        matches!(self, BuildState::Built | BuildState::BuiltAndNavigating)
    }
}
