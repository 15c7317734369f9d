//! # ThoughtPanel Component
//!
//! Right column with two tabs:
//!
//! - **Lịch sử**: every question asked in this session, the selected one
//!   highlighted (Ctrl+P / Ctrl+N move the selection).
//! - **Suy nghĩ**: the reasoning and tool calls behind the selected
//!   question's answer, or the latest answer when nothing is selected.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use crate::api::Message;
use crate::core::state::RightTab;
use crate::core::thoughts::{self, EntryKind, PanelEntry};
use crate::tui::component::Component;

const TABS: [RightTab; 2] = [RightTab::History, RightTab::Thoughts];

pub struct ThoughtPanel<'a> {
    pub messages: &'a [Message],
    pub tab: RightTab,
    pub selected_question: Option<usize>,
}

fn entries_text(entries: &[PanelEntry]) -> Text<'static> {
    if entries.is_empty() {
        return Text::styled(
            "Chưa có suy nghĩ nào cho câu trả lời này",
            Style::default().fg(Color::DarkGray),
        );
    }
    let mut lines = Vec::new();
    for entry in entries {
        let (icon, color) = match entry.kind {
            EntryKind::Thought => ("💭", Color::Magenta),
            EntryKind::Function => ("🔧", Color::Cyan),
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{icon} ")),
            Span::styled(
                entry.title.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.extend(entry.body.lines().map(|l| Line::raw(l.to_string())));
        lines.push(Line::default());
    }
    Text::from(lines)
}

impl ThoughtPanel<'_> {
    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let questions = thoughts::question_list(self.messages);
        if questions.is_empty() {
            frame.render_widget(
                Paragraph::new("Chưa có câu hỏi nào").style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        }
        let items: Vec<ListItem> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| ListItem::new(format!("{}. {}", i + 1, q.lines().next().unwrap_or(""))))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(self.selected_question);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_thoughts(&self, frame: &mut Frame, area: Rect) {
        let entries = thoughts::panel_entries(self.messages, self.selected_question);
        frame.render_widget(
            Paragraph::new(entries_text(&entries)).wrap(Wrap { trim: false }),
            area,
        );
    }
}

impl Component for ThoughtPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [tabs_area, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

        let selected = TABS.iter().position(|t| *t == self.tab).unwrap_or(0);
        let tabs = Tabs::new(TABS.iter().map(|t| t.label()))
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, tabs_area);

        match self.tab {
            RightTab::History => self.render_history(frame, body),
            RightTab::Thoughts => self.render_thoughts(frame, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Part;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn transcript() -> Vec<Message> {
        vec![
            Message::user("Có mấy người?"),
            Message::assistant("Hai người.").with_parts(vec![Part::Thought {
                content: "đếm người trong khung hình".into(),
                author: Some("Planner".into()),
            }]),
            Message::user("Họ làm gì?"),
            Message::assistant("Nói chuyện."),
        ]
    }

    fn rendered(panel: &mut ThoughtPanel<'_>) -> String {
        let backend = TestBackend::new(50, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| panel.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_history_lists_questions() {
        let messages = transcript();
        let mut panel = ThoughtPanel {
            messages: &messages,
            tab: RightTab::History,
            selected_question: Some(1),
        };
        let text = rendered(&mut panel);
        assert!(text.contains("1. Có mấy người?"));
        assert!(text.contains("▶ 2. Họ làm gì?"));
    }

    #[test]
    fn test_thoughts_tab_shows_selected_reasoning() {
        let messages = transcript();
        let mut panel = ThoughtPanel {
            messages: &messages,
            tab: RightTab::Thoughts,
            selected_question: Some(0),
        };
        let text = rendered(&mut panel);
        assert!(text.contains("Planner"));
        assert!(text.contains("đếm người trong khung hình"));
    }

    #[test]
    fn test_entries_text_placeholder() {
        let text = entries_text(&[]);
        assert_eq!(text.lines.len(), 1);
    }
}
