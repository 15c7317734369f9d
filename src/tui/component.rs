use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Screen-level widgets (`UploadPanel`, `ThoughtPanel`, ...) are built from
/// borrowed `App` fields each frame. `&mut self` lets the persistent ones
/// (`MessageList`, `InputBox`) refresh height caches and scroll offsets
/// while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Component-local key handling.
pub trait EventHandler {
    /// What the component reports upward, if anything.
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
