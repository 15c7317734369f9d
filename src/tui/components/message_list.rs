//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! `MessageList` is transient (created each frame) and wraps a
//! `&mut MessageListState` that persists in `TuiState`. Heights are cached
//! per message and only recomputed when the width or the visible text
//! changes, which during a reveal is only the message being typed out.

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::Role;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

/// A message as it should look this frame.
pub struct VisibleMessage<'a> {
    pub id: &'a str,
    pub role: Role,
    pub text: &'a str,
}

pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    pub viewport_height: u16,
    pub content_height: u16,
    heights: HashMap<String, CachedHeight>,
}

#[derive(Clone, Copy, PartialEq)]
struct CachedHeight {
    width: u16,
    text_len: usize,
    height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            viewport_height: 0,
            content_height: 0,
            heights: HashMap::new(),
        }
    }

    /// Forget everything (new conversation).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn measure(&mut self, message: &VisibleMessage<'_>, width: u16, rendered: &Message) -> u16 {
        let key = CachedHeight {
            width,
            text_len: message.text.len(),
            height: 0,
        };
        if let Some(cached) = self.heights.get(message.id)
            && cached.width == key.width
            && cached.text_len == key.text_len
        {
            return cached.height;
        }
        let height = rendered.height(width);
        self.heights
            .insert(message.id.to_string(), CachedHeight { height, ..key });
        height
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: Vec<VisibleMessage<'a>>,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: Vec<VisibleMessage<'a>>,
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            spinner_frame,
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // scrollbar column

        let mut rendered = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            let widget = Message::new(message.role, message.text);
            let height = self.state.measure(message, content_width, &widget);
            rendered.push((widget, height));
        }

        let spinner_height = u16::from(self.is_loading);
        let total: u16 = rendered.iter().map(|(_, h)| *h).sum::<u16>() + spinner_height;
        self.state.content_height = total;
        self.state.viewport_height = area.height;

        let mut scroll_view = ScrollView::new(Size::new(content_width, total))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (widget, height) in rendered {
            scroll_view.render_widget(widget, Rect::new(0, y, content_width, height));
            y += height;
        }
        if self.is_loading {
            let frame_symbol = SPINNER[self.spinner_frame % SPINNER.len()];
            scroll_view.render_widget(
                Line::styled(
                    format!(" {frame_symbol} Đang phân tích câu hỏi..."),
                    Style::default().fg(Color::DarkGray),
                ),
                Rect::new(0, y, content_width, 1),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        } else if self.state.scroll_state.offset().y > self.state.max_offset() {
            let max_y = self.state.max_offset();
            self.state.scroll_state.set_offset(Position { x: 0, y: max_y });
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut MessageListState, texts: &[(&str, Role, &str)], loading: bool) -> String {
        let backend = TestBackend::new(40, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let messages = texts
                    .iter()
                    .map(|(id, role, text)| VisibleMessage {
                        id,
                        role: *role,
                        text,
                    })
                    .collect();
                MessageList::new(state, messages, loading, 0).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_renders_roles_and_text() {
        let mut state = MessageListState::new();
        let text = draw(
            &mut state,
            &[("1", Role::User, "Có gì?"), ("2", Role::Assistant, "Một con mèo")],
            false,
        );
        assert!(text.contains("bạn"));
        assert!(text.contains("vista"));
        assert!(text.contains("Một con mèo"));
        assert_eq!(state.content_height, 6);
    }

    #[test]
    fn test_loading_adds_spinner_row() {
        let mut state = MessageListState::new();
        let text = draw(&mut state, &[("1", Role::User, "hi")], true);
        assert!(text.contains("Đang phân tích"));
        assert_eq!(state.content_height, 4);
    }

    #[test]
    fn test_height_cache_tracks_text_changes() {
        let mut state = MessageListState::new();
        draw(&mut state, &[("1", Role::Assistant, "a")], false);
        assert_eq!(state.content_height, 3);
        draw(&mut state, &[("1", Role::Assistant, "a\n\nb")], false);
        assert_eq!(state.content_height, 5);
    }

    #[test]
    fn test_scroll_up_unpins() {
        let mut state = MessageListState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }
}
