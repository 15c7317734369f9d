use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::Role;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

const PLACEHOLDER: &str = "…";

/// One chat message: a rounded block titled by role, markdown inside.
///
/// Transient: built each frame from the text that should currently be
/// visible (which may be a partial reveal).
pub struct Message {
    role: Role,
    text: Text<'static>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        let content = content.trim();
        let text = if content.is_empty() {
            Text::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
        } else {
            markdown::render(content, role_color(role))
        };
        Self { role, text }
    }

    fn paragraph(&self) -> Paragraph<'_> {
        Paragraph::new(self.text.clone()).wrap(Wrap { trim: false })
    }

    /// Rendered height at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if inner == 0 {
            return 1;
        }
        let lines = self.paragraph().line_count(inner) as u16;
        lines.max(1) + VERTICAL_OVERHEAD
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "bạn",
        Role::Assistant => "vista",
    }
}

pub fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::Green,
        Role::Assistant => Color::Blue,
    }
}

impl Widget for Message {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = Style::default()
            .fg(role_color(self.role))
            .add_modifier(Modifier::DIM);

        let block = Block::bordered()
            .title(role_label(self.role))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        self.paragraph().render(inner, buf);
    }
}
