//! # TUI Components
//!
//! Components follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built each frame from borrowed application state:
//! - `TitleBar`: session id, analysis summary and status message
//! - `Message`: one chat message
//! - `UploadPanel`: selected file, lifecycle progress, error banner
//! - `SessionSidebar`: sessions known to the backend
//! - `ThoughtPanel`: question history and reasoning tabs
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own presentation state that persists in `TuiState` and emit events:
//! - `InputBox`: path and question editor
//! - `MessageList`: scrollable conversation with height caching
//!
//! Components receive external data as props instead of reading `App`
//! directly, which keeps them testable against a `TestBackend`.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── input_box.rs
//! ├── upload_panel.rs
//! ├── session_sidebar.rs
//! └── thought_panel.rs
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState, VisibleMessage};
pub mod session_sidebar;
pub mod thought_panel;
pub mod upload_panel;
pub use session_sidebar::SessionSidebar;
pub use thought_panel::ThoughtPanel;
pub use upload_panel::UploadPanel;
