//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (upload in flight, waiting for an answer, revealing an
//!   answer): draws every 30-80ms.
//! - **Idle**: sleeps up to 500ms and only redraws on input, background
//!   results or a change in the conversation store.
//!
//! Background work (lifecycle, chat requests, session listing) runs on
//! tokio tasks that report back through an `mpsc` channel of `Action`s.
//! The reducer in `core::action` decides what to do with each one.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::VideoBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::chat;
use crate::core::config::ResolvedConfig;
use crate::core::lifecycle::{LifecycleController, Phase};
use crate::core::retry::RetryPolicy;
use crate::core::state::{App, Screen};
use crate::core::thoughts;
use crate::core::upload::VideoFile;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const REVEAL_TICK: Duration = Duration::from_millis(30);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub path_input: InputBox,
    pub chat_input: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            path_input: InputBox::new("Đường dẫn video"),
            chat_input: InputBox::new("Câu hỏi về video"),
        }
    }

    fn reset(&mut self) {
        self.message_list.reset();
        self.path_input.clear();
        self.chat_input.clear();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // blinking cursors flicker under continuous redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Everything a spawned task needs to do its job.
struct Runner {
    backend: Arc<dyn VideoBackend>,
    policy: RetryPolicy,
    max_upload_bytes: u64,
    tx: mpsc::Sender<Action>,
}

pub fn run(
    mut app: App,
    backend: Arc<dyn VideoBackend>,
    config: &ResolvedConfig,
) -> std::io::Result<()> {
    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let runner = Runner {
        backend,
        policy: config.retry_policy(),
        max_upload_bytes: config.max_upload_bytes,
        tx,
    };

    let mut tui = TuiState::new();
    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // A resumed session starts on the chat screen and wants its sidebar.
    if app.session().is_some() && app.show_sidebar {
        runner.apply(Effect::LoadSessions, &app);
    }

    let start_time = Instant::now();
    let mut last_tick = Instant::now();
    let mut store_rx = app.store.subscribe();
    let mut needs_redraw = true;

    loop {
        if app.reveal.is_some() {
            let now = Instant::now();
            update(&mut app, Action::RevealTick(now - last_tick));
            last_tick = now;
        } else {
            last_tick = Instant::now();
        }

        if store_rx.has_changed().unwrap_or(false) {
            store_rx.borrow_and_update();
            needs_redraw = true;
        }

        let animating = app.is_animating();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if app.reveal.is_some() {
            REVEAL_TICK
        } else if animating {
            ANIMATION_TICK
        } else {
            IDLE_TICK
        };
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let Some(action) = translate_event(&event, &app, &mut tui) else {
                continue;
            };
            let leaving_session = matches!(action, Action::BackToUpload);
            let effect = update(&mut app, action);
            if leaving_session && app.screen == Screen::Upload {
                tui.reset();
                store_rx = app.store.subscribe();
            }
            if let Effect::SendMessage { .. } = &effect {
                tui.message_list.stick_to_bottom = true;
            }
            if runner.apply(effect, &app) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let rejected_path = match &action {
                Action::LifecycleFinished(Err(_)) => app.selected_file.clone(),
                _ => None,
            };
            let effect = update(&mut app, action);
            if let (Some(file), Phase::Error(_)) = (rejected_path, &app.upload_phase) {
                tui.path_input.set_text(&file.path.to_string_lossy());
            }
            if runner.apply(effect, &app) {
                should_quit = true;
            }
        }

        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Maps a terminal event to an app action, feeding editing keys to whichever
/// input box is active.
fn translate_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::Resize => None,
        TuiEvent::ForceQuit => Some(Action::Quit),
        _ => match app.screen {
            Screen::Upload => translate_upload_event(event, app, tui),
            Screen::Chat(_) => translate_chat_event(event, app, tui),
        },
    }
}

fn translate_upload_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::Escape => Some(Action::Quit),
        _ => match tui.path_input.handle_event(event)? {
            InputEvent::Submit(path) => {
                let path = path.trim().to_string();
                // Keep the typed path visible so a rejected one can be edited.
                if !path.is_empty() {
                    tui.path_input.set_text(&path);
                }
                if app.upload_phase.is_active() {
                    return None;
                }
                Some(Action::SubmitPath(path))
            }
            InputEvent::ContentChanged => None,
        },
    }
}

fn translate_chat_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::NewUpload => Some(Action::BackToUpload),
        TuiEvent::ToggleSidebar => Some(Action::ToggleSidebar),
        TuiEvent::ToggleThoughts => Some(Action::ToggleThoughts),
        TuiEvent::SwitchTab => Some(Action::SwitchTab),
        TuiEvent::PrevQuestion | TuiEvent::NextQuestion => {
            let count = thoughts::question_list(&app.store.snapshot().messages).len();
            let forward = matches!(event, TuiEvent::NextQuestion);
            step_selection(app.selected_question, count, forward).map(Action::SelectQuestion)
        }
        TuiEvent::Escape => app
            .selected_question
            .is_some()
            .then_some(Action::SelectQuestion(None)),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(event);
            None
        }
        _ => match tui.chat_input.handle_event(event)? {
            InputEvent::Submit(text) => Some(Action::SubmitMessage(text)),
            InputEvent::ContentChanged => None,
        },
    }
}

/// Moves the question selection one step. Returns `None` when nothing
/// changes.
fn step_selection(current: Option<usize>, count: usize, forward: bool) -> Option<Option<usize>> {
    if count == 0 {
        return None;
    }
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => count - 1,
        (Some(i), true) => (i + 1).min(count - 1),
        (Some(i), false) => i.saturating_sub(1),
    };
    (current != Some(next)).then_some(Some(next))
}

impl Runner {
    /// Carries out an effect. Returns true when the app should exit.
    fn apply(&self, effect: Effect, app: &App) -> bool {
        match effect {
            Effect::None => false,
            Effect::Quit => true,
            Effect::StartUpload(file) => {
                self.spawn_upload(file);
                false
            }
            Effect::SendMessage { session_id, text } => {
                self.spawn_send(app, session_id, text);
                false
            }
            Effect::LoadSessions => {
                self.spawn_load_sessions();
                false
            }
        }
    }

    fn send(tx: &mpsc::Sender<Action>, action: Action) {
        if tx.send(action).is_err() {
            warn!("Failed to deliver background result: receiver dropped");
        }
    }

    fn spawn_upload(&self, file: VideoFile) {
        info!("Spawning lifecycle for {}", file.name);
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut controller =
            LifecycleController::new(self.policy, self.max_upload_bytes).with_progress(progress_tx);

        let progress_out = tx.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = progress_rx.recv().await {
                if progress_out.send(Action::LifecycleProgress(event)).is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let result = match controller.select_file(file) {
                Ok(()) => controller.run(backend.as_ref()).await,
                Err(e) => Err(e),
            };
            // Closing the progress sender lets the forwarder drain and exit,
            // so every progress event lands before the final result.
            drop(controller);
            if let Err(e) = forwarder.await {
                warn!("Progress forwarder failed: {}", e);
            }
            Self::send(&tx, Action::LifecycleFinished(result));
        });
    }

    fn spawn_send(&self, app: &App, session_id: String, text: String) {
        info!("Spawning chat request for session {}", session_id);
        let backend = Arc::clone(&self.backend);
        let store = app.store.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = chat::send_message(&store, backend.as_ref(), &session_id, &text).await;
            Self::send(&tx, Action::SendFinished { session_id, outcome });
        });
    }

    fn spawn_load_sessions(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.list_sessions().await;
            Self::send(&tx, Action::SessionsLoaded(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Message, SessionStatus};
    use crate::test_support::{session, test_config};

    #[test]
    fn test_step_selection() {
        assert_eq!(step_selection(None, 0, true), None);
        assert_eq!(step_selection(None, 3, true), Some(Some(0)));
        assert_eq!(step_selection(None, 3, false), Some(Some(2)));
        assert_eq!(step_selection(Some(1), 3, true), Some(Some(2)));
        assert_eq!(step_selection(Some(2), 3, true), None);
        assert_eq!(step_selection(Some(0), 3, false), None);
    }

    #[test]
    fn test_escape_quits_on_upload_screen() {
        let app = App::new(&test_config());
        let mut tui = TuiState::new();
        assert_eq!(
            translate_event(&TuiEvent::Escape, &app, &mut tui),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_typed_path_is_submitted_and_kept() {
        let app = App::new(&test_config());
        let mut tui = TuiState::new();
        for c in "/tmp/clip.mp4".chars() {
            assert_eq!(translate_event(&TuiEvent::InputChar(c), &app, &mut tui), None);
        }
        let action = translate_event(&TuiEvent::Submit, &app, &mut tui);
        assert_eq!(action, Some(Action::SubmitPath("/tmp/clip.mp4".into())));
        assert_eq!(tui.path_input.buffer, "/tmp/clip.mp4");
    }

    #[test]
    fn test_chat_shortcuts() {
        let info = session("s-1", SessionStatus::Completed);
        let app = App::resume(
            &test_config(),
            info,
            vec![Message::user("một"), Message::user("hai")],
        );
        let mut tui = TuiState::new();

        assert_eq!(
            translate_event(&TuiEvent::NewUpload, &app, &mut tui),
            Some(Action::BackToUpload)
        );
        assert_eq!(
            translate_event(&TuiEvent::NextQuestion, &app, &mut tui),
            Some(Action::SelectQuestion(Some(0)))
        );
        assert_eq!(translate_event(&TuiEvent::Escape, &app, &mut tui), None);
        assert_eq!(
            translate_event(&TuiEvent::ForceQuit, &app, &mut tui),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_chat_input_submits_message() {
        let info = session("s-1", SessionStatus::Completed);
        let app = App::resume(&test_config(), info, Vec::new());
        let mut tui = TuiState::new();
        tui.chat_input.set_text("có gì?");
        assert_eq!(
            translate_event(&TuiEvent::Submit, &app, &mut tui),
            Some(Action::SubmitMessage("có gì?".into()))
        );
    }
}
