//! # Session Tracking
//!
//! Client-side view of one server session. Only backend status responses
//! update it, and status never moves backwards:
//!
//! ```text
//! pending → uploading → analyzing → completed
//!                                 ↘ error
//! ```
//!
//! A response reporting an earlier state than the one already observed is a
//! stale read and is dropped. Once terminal, only the same terminal status
//! is accepted (to refresh the analysis summary).

use log::{debug, warn};

use crate::api::{SessionInfo, SessionStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionTracker {
    info: SessionInfo,
}

impl SessionTracker {
    pub fn new(info: SessionInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// Applies a status response. Returns whether it was accepted.
    pub fn observe(&mut self, update: SessionInfo) -> bool {
        if update.session_id != self.info.session_id {
            warn!(
                "Ignoring status for session {} while tracking {}",
                update.session_id, self.info.session_id
            );
            return false;
        }

        let current = self.info.status;
        let accepted = match (current.rank(), update.status.rank()) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(_), Some(_)) if current.is_terminal() => update.status == current,
            (Some(cur), Some(new)) => new >= cur,
        };

        if accepted {
            debug!(
                "Session {}: {} → {}",
                self.info.session_id,
                current.label(),
                update.status.label()
            );
            self.info = update;
        } else {
            debug!(
                "Session {}: dropping {} after {}",
                self.info.session_id,
                update.status.label(),
                current.label()
            );
        }
        accepted
    }

    /// Records a local phase change (e.g. upload finished) without a round trip.
    pub fn advance_to(&mut self, status: SessionStatus) -> bool {
        let update = SessionInfo {
            status,
            ..self.info.clone()
        };
        self.observe(update)
    }
}
