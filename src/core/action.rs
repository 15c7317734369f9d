//! # Actions
//!
//! Everything that can happen in Vista becomes an `Action`.
//! User presses Enter on a path? That's `Action::SubmitPath`.
//! The backend answers? That's `Action::SendFinished { .. }`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state and returns an `Effect` describing any I/O the
//! adapter must start. No network calls happen here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Results from background work carry the session id they were started
//! for; anything arriving for a session the user already left is dropped.

use std::time::Duration;

use log::{debug, info, warn};

use crate::api::{ApiError, SessionInfo, SessionSummary};
use crate::core::chat::SendOutcome;
use crate::core::conversation::ConversationStore;
use crate::core::lifecycle::{LifecycleError, LifecycleEvent, Phase};
use crate::core::reveal::Reveal;
use crate::core::state::{ActiveReveal, App, RightTab, Screen};
use crate::core::upload::{self, VideoFile};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Path typed on the upload screen. Empty retries the last selected file.
    SubmitPath(String),
    LifecycleProgress(LifecycleEvent),
    LifecycleFinished(Result<SessionInfo, LifecycleError>),
    SubmitMessage(String),
    SendFinished {
        session_id: String,
        outcome: SendOutcome,
    },
    SessionsLoaded(Result<Vec<SessionSummary>, ApiError>),
    SelectQuestion(Option<usize>),
    ToggleSidebar,
    ToggleThoughts,
    SwitchTab,
    BackToUpload,
    RevealTick(Duration),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    StartUpload(VideoFile),
    SendMessage { session_id: String, text: String },
    LoadSessions,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::SubmitPath(path) => submit_path(app, path.trim()),

        Action::LifecycleProgress(event) => {
            if !app.upload_phase.is_active() {
                return Effect::None;
            }
            match event {
                LifecycleEvent::SessionCreated(id) => {
                    app.status_message = format!("Đã tạo phiên {id}");
                    app.pending_session = Some(id);
                }
                LifecycleEvent::Uploading => {
                    app.upload_phase = Phase::Uploading;
                    app.status_message = "Đang tải video lên...".to_string();
                }
                LifecycleEvent::Analyzing => {
                    app.upload_phase = Phase::Analyzing;
                    app.status_message = "Đang phân tích video...".to_string();
                }
                LifecycleEvent::PollAttempt {
                    attempt,
                    max_attempts,
                    status,
                } => {
                    debug!("Poll {}/{}: {:?}", attempt, max_attempts, status);
                    app.poll_progress = Some((attempt, max_attempts));
                }
            }
            Effect::None
        }

        Action::LifecycleFinished(result) => {
            if app.screen != Screen::Upload || !app.upload_phase.is_active() {
                warn!("Dropping lifecycle result that no longer has an owner");
                return Effect::None;
            }
            match result {
                Ok(info) => {
                    info!("Analysis complete for {}", info.session_id);
                    app.enter_chat(info);
                    Effect::LoadSessions
                }
                Err(e) => {
                    app.status_message = e.to_string();
                    app.upload_phase = Phase::Error(e);
                    app.poll_progress = None;
                    Effect::None
                }
            }
        }

        Action::SubmitMessage(text) => {
            let Some(session_id) = app.session_id() else {
                return Effect::None;
            };
            if text.trim().is_empty() || app.store.is_loading() {
                return Effect::None;
            }
            let session_id = session_id.to_string();
            app.selected_question = None;
            app.status_message = "Đang suy nghĩ...".to_string();
            Effect::SendMessage { session_id, text }
        }

        Action::SendFinished {
            session_id,
            outcome,
        } => {
            if app.session_id() != Some(session_id.as_str()) {
                debug!("Dropping reply for abandoned session {}", session_id);
                return Effect::None;
            }
            match outcome {
                SendOutcome::Answered { message_id } => {
                    let content = app
                        .store
                        .snapshot()
                        .messages
                        .into_iter()
                        .find(|m| m.id == message_id)
                        .map(|m| m.content);
                    if let Some(content) = content {
                        app.reveal = Some(ActiveReveal {
                            message_id,
                            reveal: Reveal::new(content),
                        });
                    }
                    app.status_message = format!("Phiên {session_id}");
                }
                SendOutcome::Failed { error, .. } => {
                    app.status_message = format!("Lỗi: {error}");
                }
                SendOutcome::Ignored(reason) => {
                    debug!("Send ignored: {:?}", reason);
                }
            }
            Effect::None
        }

        Action::SessionsLoaded(result) => {
            match result {
                Ok(sessions) => app.sessions = sessions,
                Err(e) => warn!("Failed to load sessions: {}", e),
            }
            Effect::None
        }

        Action::SelectQuestion(index) => {
            app.selected_question = index;
            if index.is_some() {
                app.right_tab = RightTab::Thoughts;
            }
            Effect::None
        }

        Action::ToggleSidebar => {
            app.show_sidebar = !app.show_sidebar;
            if app.show_sidebar && app.session().is_some() {
                Effect::LoadSessions
            } else {
                Effect::None
            }
        }

        Action::ToggleThoughts => {
            app.show_thoughts = !app.show_thoughts;
            Effect::None
        }

        Action::SwitchTab => {
            app.right_tab = app.right_tab.next();
            Effect::None
        }

        Action::BackToUpload => {
            if app.screen == Screen::Upload {
                return Effect::None;
            }
            info!("Leaving session {:?}", app.session_id());
            app.store.reset();
            // In-flight sends keep the old handle and land nowhere.
            app.store = ConversationStore::new();
            app.screen = Screen::Upload;
            app.upload_phase = Phase::Idle;
            app.selected_file = None;
            app.selected_question = None;
            app.reveal = None;
            app.right_tab = RightTab::default();
            app.status_message = "Chọn video để bắt đầu phân tích".to_string();
            Effect::None
        }

        Action::RevealTick(elapsed) => {
            if let Some(active) = &mut app.reveal {
                active.reveal.advance_by(elapsed, app.reveal_speed);
                if active.reveal.is_done() {
                    app.reveal = None;
                }
            }
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

fn submit_path(app: &mut App, path: &str) -> Effect {
    if app.screen != Screen::Upload || app.upload_phase.is_active() {
        return Effect::None;
    }

    let file = if path.is_empty() {
        match &app.selected_file {
            Some(file) => file.clone(),
            None => return Effect::None,
        }
    } else {
        match VideoFile::from_path(path) {
            Ok(file) => file,
            Err(e) => return reject(app, e.into()),
        }
    };

    if let Err(e) = upload::validate(&file, app.max_upload_bytes) {
        return reject(app, e.into());
    }

    info!("Starting upload of {}", file.name);
    app.selected_file = Some(file.clone());
    app.upload_phase = Phase::Uploading;
    app.poll_progress = None;
    app.pending_session = None;
    app.status_message = format!("Đang tải {} lên...", file.name);
    Effect::StartUpload(file)
}

fn reject(app: &mut App, error: LifecycleError) -> Effect {
    warn!("Rejected upload: {}", error);
    app.status_message = error.to_string();
    app.upload_phase = Phase::Error(error);
    Effect::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Message, Role, SessionStatus};
    use crate::core::chat::IgnoreReason;
    use crate::core::upload::ValidationError;
    use crate::test_support::{server_error, session, test_config};
    use std::io::Write;

    fn chat_app() -> App {
        let mut app = App::new(&test_config());
        app.upload_phase = Phase::Analyzing;
        let effect = update(
            &mut app,
            Action::LifecycleFinished(Ok(session("s1", SessionStatus::Completed))),
        );
        assert_eq!(effect, Effect::LoadSessions);
        app
    }

    fn video_on_disk(bytes: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(&vec![0u8; bytes]).unwrap();
        file
    }

    #[test]
    fn test_submit_valid_path_starts_upload() {
        let video = video_on_disk(64);
        let mut app = App::new(&test_config());

        let effect = update(&mut app, Action::SubmitPath(video.path().display().to_string()));

        assert!(matches!(effect, Effect::StartUpload(ref f) if f.size == 64 && f.mime == "video/mp4"));
        assert_eq!(app.upload_phase, Phase::Uploading);
        assert!(app.selected_file.is_some());
    }

    #[test]
    fn test_submit_non_video_is_rejected_without_effect() {
        let text = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let mut app = App::new(&test_config());

        let effect = update(&mut app, Action::SubmitPath(text.path().display().to_string()));

        assert_eq!(effect, Effect::None);
        assert!(matches!(
            app.upload_phase,
            Phase::Error(LifecycleError::Validation(ValidationError::NotAVideo { .. }))
        ));
    }

    #[test]
    fn test_submit_while_uploading_is_ignored() {
        let video = video_on_disk(8);
        let mut app = App::new(&test_config());
        app.upload_phase = Phase::Analyzing;

        let effect = update(&mut app, Action::SubmitPath(video.path().display().to_string()));

        assert_eq!(effect, Effect::None);
        assert_eq!(app.upload_phase, Phase::Analyzing);
    }

    #[test]
    fn test_empty_path_retries_selected_file() {
        let video = video_on_disk(8);
        let mut app = App::new(&test_config());
        update(&mut app, Action::SubmitPath(video.path().display().to_string()));
        update(
            &mut app,
            Action::LifecycleFinished(Err(LifecycleError::TimedOut { attempts: 30 })),
        );
        assert!(matches!(app.upload_phase, Phase::Error(LifecycleError::TimedOut { .. })));

        let effect = update(&mut app, Action::SubmitPath(String::new()));

        assert!(matches!(effect, Effect::StartUpload(_)));
        assert_eq!(app.upload_phase, Phase::Uploading);
    }

    #[test]
    fn test_progress_events_update_phase_and_counter() {
        let mut app = App::new(&test_config());
        app.upload_phase = Phase::Uploading;

        update(&mut app, Action::LifecycleProgress(LifecycleEvent::SessionCreated("s9".into())));
        update(&mut app, Action::LifecycleProgress(LifecycleEvent::Analyzing));
        update(
            &mut app,
            Action::LifecycleProgress(LifecycleEvent::PollAttempt {
                attempt: 3,
                max_attempts: 30,
                status: Some(SessionStatus::Analyzing),
            }),
        );

        assert_eq!(app.pending_session.as_deref(), Some("s9"));
        assert_eq!(app.upload_phase, Phase::Analyzing);
        assert_eq!(app.poll_progress, Some((3, 30)));
    }

    #[test]
    fn test_success_hands_off_to_chat_with_welcome() {
        let app = chat_app();
        assert_eq!(app.session_id(), Some("s1"));
        let snap = app.store.snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].role, Role::Assistant);
        assert!(snap.messages[0].content.starts_with("Xin chào!"));
    }

    #[test]
    fn test_submit_message_emits_send() {
        let mut app = chat_app();
        let effect = update(&mut app, Action::SubmitMessage("Có bao nhiêu người?".into()));
        assert_eq!(
            effect,
            Effect::SendMessage {
                session_id: "s1".into(),
                text: "Có bao nhiêu người?".into()
            }
        );
    }

    #[test]
    fn test_submit_message_guards() {
        let mut app = chat_app();
        assert_eq!(update(&mut app, Action::SubmitMessage("   ".into())), Effect::None);

        app.store.set_loading(true);
        assert_eq!(update(&mut app, Action::SubmitMessage("hi".into())), Effect::None);

        let mut upload = App::new(&test_config());
        assert_eq!(update(&mut upload, Action::SubmitMessage("hi".into())), Effect::None);
    }

    #[test]
    fn test_answer_starts_reveal_until_done() {
        let mut app = chat_app();
        let id = app.store.append(Message::assistant("abcd"));

        update(
            &mut app,
            Action::SendFinished {
                session_id: "s1".into(),
                outcome: SendOutcome::Answered { message_id: id.clone() },
            },
        );
        let message = app.store.snapshot().messages.into_iter().find(|m| m.id == id).unwrap();
        assert_eq!(app.display_text(&message), "");

        update(&mut app, Action::RevealTick(Duration::from_millis(60)));
        assert_eq!(app.display_text(&message), "ab");

        update(&mut app, Action::RevealTick(Duration::from_secs(1)));
        assert!(app.reveal.is_none());
        assert_eq!(app.display_text(&message), "abcd");
    }

    #[test]
    fn test_failed_send_sets_status() {
        let mut app = chat_app();
        update(
            &mut app,
            Action::SendFinished {
                session_id: "s1".into(),
                outcome: SendOutcome::Failed {
                    message_id: "x".into(),
                    error: server_error(),
                },
            },
        );
        assert!(app.status_message.starts_with("Lỗi"));
        assert!(app.reveal.is_none());
    }

    #[test]
    fn test_back_to_upload_drops_session_and_late_results() {
        let mut app = chat_app();
        let old_store = app.store.clone();

        update(&mut app, Action::BackToUpload);

        assert_eq!(app.screen, Screen::Upload);
        assert!(app.store.is_empty());
        assert!(old_store.is_empty());

        let effect = update(
            &mut app,
            Action::SendFinished {
                session_id: "s1".into(),
                outcome: SendOutcome::Answered { message_id: "m".into() },
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(app.reveal.is_none());

        let effect = update(
            &mut app,
            Action::LifecycleFinished(Ok(session("s1", SessionStatus::Completed))),
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.screen, Screen::Upload);
    }

    #[test]
    fn test_select_question_switches_to_thoughts() {
        let mut app = chat_app();
        update(&mut app, Action::SelectQuestion(Some(1)));
        assert_eq!(app.selected_question, Some(1));
        assert_eq!(app.right_tab, RightTab::Thoughts);

        update(&mut app, Action::SwitchTab);
        assert_eq!(app.right_tab, RightTab::History);
    }

    #[test]
    fn test_toggles() {
        let mut app = chat_app();
        assert_eq!(update(&mut app, Action::ToggleSidebar), Effect::None);
        assert!(!app.show_sidebar);
        assert_eq!(update(&mut app, Action::ToggleSidebar), Effect::LoadSessions);
        update(&mut app, Action::ToggleThoughts);
        assert!(!app.show_thoughts);
    }

    #[test]
    fn test_sessions_loaded_error_keeps_list() {
        let mut app = chat_app();
        update(&mut app, Action::SessionsLoaded(Ok(vec![])));
        update(&mut app, Action::SessionsLoaded(Err(server_error())));
        assert!(app.sessions.is_empty());
    }

    #[test]
    fn test_ignored_send_is_noop() {
        let mut app = chat_app();
        update(
            &mut app,
            Action::SendFinished {
                session_id: "s1".into(),
                outcome: SendOutcome::Ignored(IgnoreReason::Busy),
            },
        );
        assert!(app.reveal.is_none());
    }

    #[test]
    fn test_quit() {
        let mut app = App::new(&test_config());
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
