use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;

use crate::core::state::{App, Screen};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    MessageList, SessionSidebar, ThoughtPanel, TitleBar, UploadPanel, VisibleMessage,
};

const SIDEBAR_WIDTH: u16 = 22;
const THOUGHTS_PERCENT: u16 = 35;

const UPLOAD_HINTS: &str = "Enter tải lên · Esc/Ctrl+C thoát";
const CHAT_HINTS: &str =
    "Enter gửi · Ctrl+U video mới · Ctrl+B phiên · Ctrl+T suy nghĩ · Tab đổi tab · Ctrl+P/N chọn câu hỏi";

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    match &app.screen {
        Screen::Upload => draw_upload(frame, app, tui, spinner_frame),
        Screen::Chat(_) => draw_chat(frame, app, tui, spinner_frame),
    }
}

fn hints(text: &'static str) -> Line<'static> {
    Line::styled(text, Style::default().fg(Color::DarkGray))
}

fn draw_upload(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    tui.path_input.enabled = !app.upload_phase.is_active();
    let input_height = tui.path_input.calculate_height(frame.area().width);
    let [title_area, body_area, input_area, hint_area] =
        Layout::vertical([Length(1), Min(0), Length(input_height), Length(1)])
            .areas(frame.area());

    TitleBar::new(None, app.status_message.clone()).render(frame, title_area);

    UploadPanel {
        phase: &app.upload_phase,
        selected_file: app.selected_file.as_ref(),
        pending_session: app.pending_session.as_deref(),
        poll_progress: app.poll_progress,
        max_upload_bytes: app.max_upload_bytes,
        spinner_frame,
    }
    .render(frame, body_area);

    tui.path_input.render(frame, input_area);
    frame.render_widget(hints(UPLOAD_HINTS), hint_area);
}

fn draw_chat(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let snapshot = app.store.snapshot();
    tui.chat_input.enabled = !snapshot.is_loading;

    let input_height = tui.chat_input.calculate_height(frame.area().width);
    let [title_area, body_area, input_area, hint_area] =
        Layout::vertical([Length(1), Min(0), Length(input_height), Length(1)])
            .areas(frame.area());

    TitleBar::new(app.session().cloned(), app.status_message.clone()).render(frame, title_area);

    let [sidebar_area, messages_area, thoughts_area] = body_columns(app, body_area);

    if app.show_sidebar {
        SessionSidebar {
            sessions: &app.sessions,
            current: app.session_id(),
        }
        .render(frame, sidebar_area);
    }

    let messages = snapshot
        .messages
        .iter()
        .map(|m| VisibleMessage {
            id: &m.id,
            role: m.role,
            text: app.display_text(m),
        })
        .collect();
    MessageList::new(&mut tui.message_list, messages, snapshot.is_loading, spinner_frame)
        .render(frame, messages_area);

    if app.show_thoughts {
        ThoughtPanel {
            messages: &snapshot.messages,
            tab: app.right_tab,
            selected_question: app.selected_question,
        }
        .render(frame, thoughts_area);
    }

    tui.chat_input.render(frame, input_area);
    frame.render_widget(hints(CHAT_HINTS), hint_area);
}

/// Splits the chat body into [sidebar, messages, thoughts]. Hidden panels
/// get a zero-width column.
fn body_columns(app: &App, area: Rect) -> [Rect; 3] {
    use Constraint::{Fill, Length, Percentage};

    let sidebar = if app.show_sidebar { SIDEBAR_WIDTH } else { 0 };
    let thoughts = if app.show_thoughts { THOUGHTS_PERCENT } else { 0 };
    Layout::horizontal([Length(sidebar), Fill(1), Percentage(thoughts)]).areas(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Message, SessionStatus};
    use crate::core::action::{Action, update};
    use crate::test_support::{session, test_config};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_upload_screen() {
        let app = App::new(&test_config());
        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(text.contains("VISTA"));
        assert!(text.contains("Tải video"));
        assert!(text.contains("Đường dẫn video"));
    }

    #[test]
    fn test_chat_screen_with_panels() {
        let info = session("s-1", SessionStatus::Completed);
        let app = App::resume(&test_config(), info, vec![Message::user("Ai đang nói?")]);
        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(text.contains("s-1"));
        assert!(text.contains("Xin chào!"));
        assert!(text.contains("Phiên"));
        assert!(text.contains("Lịch sử"));
    }

    #[test]
    fn test_hidden_panels_free_the_space() {
        let info = session("s-1", SessionStatus::Completed);
        let mut app = App::resume(&test_config(), info, Vec::new());
        update(&mut app, Action::ToggleSidebar);
        update(&mut app, Action::ToggleThoughts);

        let columns = body_columns(&app, Rect::new(0, 0, 100, 10));
        assert_eq!(columns[0].width, 0);
        assert_eq!(columns[2].width, 0);
        assert_eq!(columns[1].width, 100);

        let mut tui = TuiState::new();
        let text = draw(&app, &mut tui);
        assert!(!text.contains("Lịch sử"));
    }
}
