use crate::backend::SessionStore;
use tracing::{debug, info, warn};

/// Lifecycle phases of one practice attempt. `Completed` and `Failed` are
/// terminal; every operation is a no-op outside its guard phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    Active,
    Completing,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// One attempt at a scored activity, coordinating the begin/complete protocol
/// against the persistence backend.
///
/// Each attempt owns its own instance; nothing is shared across concurrent
/// activities. The phase guard at the top of `complete` (entered before the
/// await point) is what keeps a timer-expiry completion and a manual submit
/// from double-reporting: the second caller sees `Completing` and backs off.
#[derive(Debug)]
pub struct PracticeSession<S> {
    store: S,
    activity_id: String,
    session_id: Option<String>,
    phase: Phase,
    final_score: Option<f64>,
}

impl<S: SessionStore> PracticeSession<S> {
    pub fn new(store: S, activity_id: impl Into<String>) -> Self {
        Self {
            store,
            activity_id: activity_id.into(),
            session_id: None,
            phase: Phase::Unstarted,
            final_score: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Score submitted to the backend, set on the transition to `Completed`.
    pub fn final_score(&self) -> Option<f64> {
        self.final_score
    }

    /// Register the attempt with the backend and move to `Active`.
    ///
    /// Returns the backend-assigned session id, or `None` when creation
    /// failed (the error is logged with its taxonomy) or when the attempt is
    /// already past `Unstarted`. At most one begin can succeed per instance.
    pub async fn begin(&mut self) -> Option<String> {
        if self.phase != Phase::Unstarted {
            debug!(phase = ?self.phase, "begin ignored: session already started");
            return None;
        }

        match self.store.create_session(&self.activity_id).await {
            Ok(id) => {
                info!(activity = %self.activity_id, session = %id, "practice session started");
                self.session_id = Some(id.clone());
                self.phase = Phase::Active;
                Some(id)
            }
            Err(err) => {
                warn!(activity = %self.activity_id, error = %err, "could not start practice session");
                None
            }
        }
    }

    /// Report the final score and move to `Completed`.
    ///
    /// No-ops unless the attempt is `Active` with a session id, so calling
    /// before a successful begin, twice in a row, or from a terminal phase
    /// issues no backend call. The backend call itself is best-effort: a
    /// failure is logged and the attempt still finishes, because the
    /// learner's result is already final on this side.
    pub async fn complete(&mut self, final_score: f64) {
        if self.phase != Phase::Active {
            debug!(phase = ?self.phase, "complete ignored: session not active");
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            debug!("complete ignored: no session id");
            return;
        };

        // Guard against re-entrant completion before suspending.
        self.phase = Phase::Completing;

        if let Err(err) = self.store.complete_session(&session_id, final_score).await {
            warn!(session = %session_id, error = %err, "could not record practice result");
        } else {
            info!(session = %session_id, score = final_score, "practice session completed");
        }

        self.final_score = Some(final_score);
        self.phase = Phase::Completed;
    }

    /// Abandon an active attempt after an irrecoverable mid-activity error
    /// (for example, the content fetch failed). Terminal; no backend call.
    pub fn fail(&mut self) {
        if self.phase == Phase::Active {
            warn!(activity = %self.activity_id, "practice session failed");
            self.phase = Phase::Failed;
        }
    }

    /// Discard the current attempt so the same activity can be replayed.
    pub fn reset(&mut self) {
        self.session_id = None;
        self.final_score = None;
        self.phase = Phase::Unstarted;
    }
}
