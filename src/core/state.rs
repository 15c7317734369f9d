//! # Application State
//!
//! UI-level state for Vista. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── screen: Screen                 // Upload | Chat(SessionInfo)
//! ├── store: ConversationStore       // transcript + loading flag
//! ├── upload_phase: Phase            // mirror of the lifecycle controller
//! ├── poll_progress: Option<(u32, u32)>
//! ├── selected_file: Option<VideoFile>
//! ├── status_message: String         // status bar text
//! ├── show_sidebar / show_thoughts   // panel visibility
//! ├── right_tab: RightTab            // History | Thoughts
//! ├── selected_question: Option<usize>
//! ├── sessions: Vec<SessionSummary>  // left sidebar
//! └── reveal: Option<ActiveReveal>   // answer currently being typed out
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::time::Duration;

use crate::api::{Message, SessionInfo, SessionSummary};
use crate::core::config::ResolvedConfig;
use crate::core::conversation::ConversationStore;
use crate::core::lifecycle::Phase;
use crate::core::reveal::Reveal;
use crate::core::upload::VideoFile;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Upload,
    Chat(SessionInfo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RightTab {
    #[default]
    History,
    Thoughts,
}

impl RightTab {
    pub fn next(self) -> Self {
        match self {
            RightTab::History => RightTab::Thoughts,
            RightTab::Thoughts => RightTab::History,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RightTab::History => "Lịch sử",
            RightTab::Thoughts => "Suy nghĩ",
        }
    }
}

/// An assistant answer being revealed character by character.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveReveal {
    pub message_id: String,
    pub reveal: Reveal,
}

pub struct App {
    pub screen: Screen,
    pub store: ConversationStore,
    pub upload_phase: Phase,
    /// (attempt, max_attempts) of the latest status poll.
    pub poll_progress: Option<(u32, u32)>,
    /// Session id announced by the running lifecycle, if any.
    pub pending_session: Option<String>,
    pub selected_file: Option<VideoFile>,
    pub status_message: String,
    pub show_sidebar: bool,
    pub show_thoughts: bool,
    pub right_tab: RightTab,
    pub selected_question: Option<usize>,
    pub sessions: Vec<SessionSummary>,
    pub reveal: Option<ActiveReveal>,
    pub max_upload_bytes: u64,
    pub reveal_speed: Duration,
}

impl App {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            screen: Screen::Upload,
            store: ConversationStore::new(),
            upload_phase: Phase::Idle,
            poll_progress: None,
            pending_session: None,
            selected_file: None,
            status_message: String::from("Chọn video để bắt đầu phân tích"),
            show_sidebar: config.show_sidebar,
            show_thoughts: config.show_thoughts,
            right_tab: RightTab::default(),
            selected_question: None,
            sessions: Vec::new(),
            reveal: None,
            max_upload_bytes: config.max_upload_bytes,
            reveal_speed: config.reveal_speed,
        }
    }

    /// Opens straight on the chat screen of an existing session.
    pub fn resume(config: &ResolvedConfig, info: SessionInfo, history: Vec<Message>) -> Self {
        let mut app = Self::new(config);
        app.enter_chat(info);
        app.store.extend(history);
        app
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        match &self.screen {
            Screen::Chat(info) => Some(info),
            Screen::Upload => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session().map(|s| s.session_id.as_str())
    }

    /// Switches to the chat screen and seeds the welcome message.
    pub(crate) fn enter_chat(&mut self, info: SessionInfo) {
        self.store.append(Message::assistant(welcome_message(&info)));
        self.status_message = format!("Phiên {}", info.session_id);
        self.upload_phase = Phase::Success(info.clone());
        self.poll_progress = None;
        self.pending_session = None;
        self.selected_question = None;
        self.reveal = None;
        self.screen = Screen::Chat(info);
    }

    /// Text shown for an assistant message, honoring an in-progress reveal.
    pub fn display_text<'a>(&'a self, message: &'a Message) -> &'a str {
        match &self.reveal {
            Some(active) if active.message_id == message.id => active.reveal.visible(),
            _ => &message.content,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.reveal.is_some() || self.upload_phase.is_active() || self.store.is_loading()
    }
}

pub fn welcome_message(info: &SessionInfo) -> String {
    let summary = info.summary();
    format!(
        "Xin chào! Tôi đã phân tích video của bạn và tìm thấy {} khung hình quan trọng với {} mối quan hệ. \
         Bạn có thể hỏi tôi bất kỳ câu hỏi nào về nội dung video!",
        summary.keyframes_count, summary.scene_graph_relations
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnalysisSummary, Role, SessionStatus};
    use crate::test_support::{session, test_config};

    #[test]
    fn test_app_new_defaults() {
        let app = App::new(&test_config());
        assert_eq!(app.screen, Screen::Upload);
        assert!(app.store.is_empty());
        assert_eq!(app.upload_phase, Phase::Idle);
        assert!(app.show_sidebar);
        assert_eq!(app.right_tab, RightTab::History);
        assert!(!app.is_animating());
    }

    #[test]
    fn test_resume_seeds_welcome_then_history() {
        let mut info = session("s1", SessionStatus::Completed);
        info.analysis_results = Some(AnalysisSummary {
            keyframes_count: 12,
            scene_graph_relations: 34,
            video_duration: None,
        });
        let history = vec![Message::user("q"), Message::assistant("a")];

        let app = App::resume(&test_config(), info, history);

        let snap = app.store.snapshot();
        assert_eq!(snap.messages.len(), 3);
        assert_eq!(snap.messages[0].role, Role::Assistant);
        assert!(snap.messages[0].content.contains("12 khung hình"));
        assert!(snap.messages[0].content.contains("34 mối quan hệ"));
        assert_eq!(app.session_id(), Some("s1"));
    }

    #[test]
    fn test_welcome_without_results_reports_zero() {
        let text = welcome_message(&session("s1", SessionStatus::Completed));
        assert!(text.contains("tìm thấy 0 khung hình"));
    }
}
