//! # TitleBar Component
//!
//! Top status line: session id, analysis summary and the current status
//! message. Purely presentational; all data arrives as props.
//!
//! ```text
//! VISTA | s-3f2a | 42 keyframes · 118 relations · 12.5s | Đang suy nghĩ...
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::api::{AnalysisSummary, SessionInfo};
use crate::tui::component::Component;

pub struct TitleBar {
    pub session: Option<SessionInfo>,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(session: Option<SessionInfo>, status_message: String) -> Self {
        Self {
            session,
            status_message,
        }
    }

    fn text(&self) -> String {
        let mut parts = vec!["VISTA".to_string()];
        if let Some(session) = &self.session {
            parts.push(session.session_id.clone());
            parts.push(summary_text(&session.summary()));
        }
        if !self.status_message.is_empty() {
            parts.push(self.status_message.clone());
        }
        parts.join(" | ")
    }
}

fn summary_text(summary: &AnalysisSummary) -> String {
    let mut text = format!(
        "{} keyframes · {} relations",
        summary.keyframes_count, summary.scene_graph_relations
    );
    if let Some(duration) = summary.video_duration {
        text.push_str(&format!(" · {duration:.1}s"));
    }
    text
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionStatus;
    use crate::test_support::session;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_without_session() {
        let mut title_bar = TitleBar::new(None, "Chọn video".to_string());
        let text = rendered(&mut title_bar);
        assert!(text.starts_with("VISTA | Chọn video"));
    }

    #[test]
    fn test_title_bar_shows_summary() {
        let mut info = session("s-42", SessionStatus::Completed);
        info.analysis_results = Some(AnalysisSummary {
            keyframes_count: 42,
            scene_graph_relations: 118,
            video_duration: Some(12.5),
        });
        let mut title_bar = TitleBar::new(Some(info), String::new());

        let text = rendered(&mut title_bar);

        assert!(text.contains("s-42"));
        assert!(text.contains("42 keyframes · 118 relations · 12.5s"));
    }
}
