//! # SessionSidebar Component
//!
//! Left column listing the sessions the backend knows about. The current
//! session is highlighted. Read-only; switching sessions is done from the
//! command line with `vista tui --session <id>`.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem};

use crate::api::{SessionStatus, SessionSummary};
use crate::tui::component::Component;

pub struct SessionSidebar<'a> {
    pub sessions: &'a [SessionSummary],
    pub current: Option<&'a str>,
}

fn status_color(status: SessionStatus) -> Color {
    match status {
        SessionStatus::Completed => Color::Green,
        SessionStatus::Error => Color::Red,
        SessionStatus::Unknown => Color::DarkGray,
        _ => Color::Yellow,
    }
}

/// Session ids are UUIDs; the first block is enough to tell them apart.
fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

impl SessionSidebar<'_> {
    fn items(&self) -> Vec<ListItem<'static>> {
        if self.sessions.is_empty() {
            return vec![ListItem::new(Line::styled(
                "Chưa có phiên nào",
                Style::default().fg(Color::DarkGray),
            ))];
        }
        self.sessions
            .iter()
            .map(|s| {
                let is_current = self.current == Some(s.session_id.as_str());
                let marker = if is_current { "▶ " } else { "  " };
                let id_style = if is_current {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let mut spans = vec![
                    Span::raw(marker),
                    Span::styled(short_id(&s.session_id).to_string(), id_style),
                    Span::raw(" "),
                    Span::styled("●", Style::default().fg(status_color(s.status))),
                ];
                if !s.has_video {
                    spans.push(Span::styled(" ∅", Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    }
}

impl Component for SessionSidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Phiên");
        frame.render_widget(List::new(self.items()).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn summary(id: &str, status: SessionStatus) -> SessionSummary {
        SessionSummary {
            session_id: id.to_string(),
            status,
            created_at: None,
            has_video: true,
        }
    }

    fn rendered(sidebar: &mut SessionSidebar<'_>) -> String {
        let backend = TestBackend::new(24, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| sidebar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3f2a91c0-aaaa-bbbb"), "3f2a91c0");
        assert_eq!(short_id("plain"), "plain");
    }

    #[test]
    fn test_marks_current_session() {
        let sessions = vec![
            summary("aaaa-1", SessionStatus::Completed),
            summary("bbbb-2", SessionStatus::Analyzing),
        ];
        let mut sidebar = SessionSidebar {
            sessions: &sessions,
            current: Some("bbbb-2"),
        };
        let text = rendered(&mut sidebar);
        assert!(text.contains("  aaaa"));
        assert!(text.contains("▶ bbbb"));
    }

    #[test]
    fn test_empty_list_placeholder() {
        let mut sidebar = SessionSidebar {
            sessions: &[],
            current: None,
        };
        assert!(rendered(&mut sidebar).contains("Chưa có phiên nào"));
    }
}
