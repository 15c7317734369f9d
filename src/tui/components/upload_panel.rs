//! # UploadPanel Component
//!
//! The upload screen body: what file is selected, where the lifecycle is,
//! and the error banner when it failed. The path itself is typed into an
//! `InputBox` rendered below this panel.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::core::lifecycle::Phase;
use crate::core::upload::VideoFile;
use crate::tui::component::Component;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

pub struct UploadPanel<'a> {
    pub phase: &'a Phase,
    pub selected_file: Option<&'a VideoFile>,
    pub pending_session: Option<&'a str>,
    pub poll_progress: Option<(u32, u32)>,
    pub max_upload_bytes: u64,
    pub spinner_frame: usize,
}

fn format_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    format!("{:.1} MB", bytes as f64 / MIB)
}

impl UploadPanel<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::styled(
                "VISTA · Hỏi đáp về video",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Line::default(),
        ];

        match self.selected_file {
            Some(file) => lines.push(Line::from(vec![
                Span::raw("Video: "),
                Span::styled(file.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!(" ({}, {})", format_size(file.size), file.mime), dim),
            ])),
            None => lines.push(Line::styled(
                format!(
                    "Nhập đường dẫn tới file video (tối đa {})",
                    format_size(self.max_upload_bytes)
                ),
                dim,
            )),
        }
        lines.push(Line::default());

        let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
        match self.phase {
            Phase::Idle => {
                lines.push(Line::styled("Nhấn Enter để tải lên", dim));
            }
            Phase::Uploading => {
                lines.push(Line::styled(
                    format!("{spinner} Đang tải video lên..."),
                    Style::default().fg(Color::Cyan),
                ));
            }
            Phase::Analyzing => {
                let progress = match self.poll_progress {
                    Some((attempt, max)) => format!(" (lần {attempt}/{max})"),
                    None => String::new(),
                };
                lines.push(Line::styled(
                    format!("{spinner} Đang phân tích video...{progress}"),
                    Style::default().fg(Color::Cyan),
                ));
            }
            Phase::Success(info) => {
                lines.push(Line::styled(
                    format!("✓ Phân tích xong phiên {}", info.session_id),
                    Style::default().fg(Color::Green),
                ));
            }
            Phase::Error(error) => {
                lines.push(Line::styled(
                    format!("✗ {error}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
                let hint = if self.selected_file.is_some() {
                    "Nhấn Enter để thử lại, hoặc nhập đường dẫn khác"
                } else {
                    "Nhập đường dẫn khác"
                };
                lines.push(Line::styled(hint, dim));
            }
        }

        if let Some(id) = self.pending_session
            && self.phase.is_active()
        {
            lines.push(Line::styled(format!("Phiên: {id}"), dim));
        }

        lines
    }
}

impl Component for UploadPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Tải video");
        let paragraph = Paragraph::new(self.lines())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}
