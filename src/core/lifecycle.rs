//! # Session Lifecycle
//!
//! Drives one video from selection to an analysed session:
//!
//! ```text
//! Idle ──run()──▶ Uploading ──upload ok──▶ Analyzing ──poll: completed──▶ Success
//!  ▲                  │                        │
//!  │                  └──request failed──┐     ├──poll: error────────────▶ Error
//!  │                                     ▼     └──attempts exhausted─────▶ Error
//!  └────────── select_file / clear_file ◀── Error ──run() (retry)──▶ Uploading
//! ```
//!
//! Validation happens synchronously in `select_file` and again at the top of
//! `run`, so an invalid file never reaches the backend. Polling uses the
//! injected `RetryPolicy`; individual poll failures are non-terminal.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiError, SessionInfo, SessionStatus, VideoBackend};
use crate::core::retry::RetryPolicy;
use crate::core::session::SessionTracker;
use crate::core::upload::{self, ValidationError, VideoFile};

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleError {
    Validation(ValidationError),
    Request(ApiError),
    /// Attempt budget ran out before the backend reported a terminal status.
    TimedOut { attempts: u32 },
    /// The backend reported `error` for the analysis.
    AnalysisFailed(SessionInfo),
    AlreadyRunning,
    NoFileSelected,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::Validation(e) => write!(f, "{e}"),
            LifecycleError::Request(e) => write!(f, "Lỗi khi upload video: {e}"),
            LifecycleError::TimedOut { attempts } => write!(
                f,
                "Video analysis timed out after {attempts} status checks. Please try again."
            ),
            LifecycleError::AnalysisFailed(info) => {
                write!(f, "Video analysis failed for session {}", info.session_id)
            }
            LifecycleError::AlreadyRunning => write!(f, "an upload is already in progress"),
            LifecycleError::NoFileSelected => write!(f, "no video selected"),
        }
    }
}

impl std::error::Error for LifecycleError {}

impl From<ValidationError> for LifecycleError {
    fn from(e: ValidationError) -> Self {
        LifecycleError::Validation(e)
    }
}

impl From<ApiError> for LifecycleError {
    fn from(e: ApiError) -> Self {
        LifecycleError::Request(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Uploading,
    Analyzing,
    Success(SessionInfo),
    Error(LifecycleError),
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Uploading | Phase::Analyzing)
    }
}

/// Progress notifications emitted while `run` is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    SessionCreated(String),
    Uploading,
    Analyzing,
    PollAttempt {
        attempt: u32,
        max_attempts: u32,
        status: Option<SessionStatus>,
    },
}

pub struct LifecycleController {
    policy: RetryPolicy,
    max_upload_bytes: u64,
    selected: Option<VideoFile>,
    phase: Phase,
    progress: Option<UnboundedSender<LifecycleEvent>>,
}

impl LifecycleController {
    pub fn new(policy: RetryPolicy, max_upload_bytes: u64) -> Self {
        Self {
            policy,
            max_upload_bytes,
            selected: None,
            phase: Phase::Idle,
            progress: None,
        }
    }

    pub fn with_progress(mut self, sender: UnboundedSender<LifecycleEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn selected_file(&self) -> Option<&VideoFile> {
        self.selected.as_ref()
    }

    /// Runs the guards and, if they pass, keeps `file` for the next `run`.
    ///
    /// A rejected file leaves any previously selected file in place.
    pub fn select_file(&mut self, file: VideoFile) -> Result<(), LifecycleError> {
        if self.phase.is_active() {
            return Err(LifecycleError::AlreadyRunning);
        }
        if let Err(e) = upload::validate(&file, self.max_upload_bytes) {
            warn!("Rejected {}: {}", file.name, e);
            let err = LifecycleError::Validation(e);
            self.phase = Phase::Error(err.clone());
            return Err(err);
        }
        info!("Selected {} ({} bytes)", file.name, file.size);
        self.selected = Some(file);
        self.phase = Phase::Idle;
        Ok(())
    }

    pub fn clear_file(&mut self) {
        if self.phase.is_active() {
            return;
        }
        self.selected = None;
        self.phase = Phase::Idle;
    }

    /// Create session → upload → poll until terminal.
    ///
    /// Calling this again after an error is the retry path; the selected
    /// file is reused.
    pub async fn run(&mut self, backend: &dyn VideoBackend) -> Result<SessionInfo, LifecycleError> {
        if self.phase.is_active() {
            return Err(LifecycleError::AlreadyRunning);
        }
        let file = self.selected.clone().ok_or(LifecycleError::NoFileSelected)?;

        let result = self.drive(backend, &file).await;
        self.phase = match &result {
            Ok(info) => Phase::Success(info.clone()),
            Err(e) => Phase::Error(e.clone()),
        };
        result
    }

    async fn drive(&mut self, backend: &dyn VideoBackend, file: &VideoFile) -> Result<SessionInfo, LifecycleError> {
        upload::validate(file, self.max_upload_bytes)?;

        self.phase = Phase::Uploading;
        self.emit(LifecycleEvent::Uploading);

        let session = backend.create_session().await?;
        info!("Lifecycle: session {} created", session.session_id);
        self.emit(LifecycleEvent::SessionCreated(session.session_id.clone()));
        let session_id = session.session_id.clone();
        let tracker = Mutex::new(SessionTracker::new(session));

        let uploaded = backend.upload_video(&session_id, file).await?;
        info!("Lifecycle: uploaded to {}", uploaded.video_path);

        self.phase = Phase::Analyzing;
        self.emit(LifecycleEvent::Analyzing);
        lock_tracker(&tracker).advance_to(SessionStatus::Analyzing);

        let policy = self.policy;
        let max_attempts = policy.max_attempts;
        let progress = self.progress.clone();
        let tracker_ref = &tracker;
        let session_ref = session_id.as_str();

        let polled = policy
            .poll_until(
                |attempt| {
                    let progress = progress.clone();
                    async move {
                        let result = backend.session_status(session_ref).await;
                        let status = result.as_ref().ok().map(|info| info.status);
                        if let Some(tx) = &progress {
                            let _ = tx.send(LifecycleEvent::PollAttempt {
                                attempt,
                                max_attempts,
                                status,
                            });
                        }
                        let update = result?;
                        let mut t = lock_tracker(tracker_ref);
                        t.observe(update);
                        Ok::<_, ApiError>(t.info().clone())
                    }
                },
                |info| info.status.is_terminal(),
            )
            .await;

        match polled {
            Ok(done) if done.value.status == SessionStatus::Completed => {
                info!(
                    "Lifecycle: session {} completed after {} polls",
                    session_id, done.attempts
                );
                Ok(done.value)
            }
            Ok(done) => {
                warn!("Lifecycle: backend reported analysis error for {}", session_id);
                Err(LifecycleError::AnalysisFailed(done.value))
            }
            Err(timeout) => {
                warn!(
                    "Lifecycle: session {} timed out after {} polls",
                    session_id, timeout.attempts
                );
                Err(LifecycleError::TimedOut {
                    attempts: timeout.attempts,
                })
            }
        }
    }

    fn emit(&self, event: LifecycleEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event);
        }
    }
}

/// Locks the tracker, recovering it if a poll task panicked while holding it.
fn lock_tracker(tracker: &Mutex<SessionTracker>) -> MutexGuard<'_, SessionTracker> {
    tracker.lock().unwrap_or_else(|e| e.into_inner())
}
