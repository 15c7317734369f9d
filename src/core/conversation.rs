//! # Conversation Store
//!
//! Single owner of the shared chat state: the transcript and the global
//! "assistant is responding" flag. The message list, the composer and both
//! side panels read the same state through `subscribe()` / `snapshot()`;
//! only the store mutates it.
//!
//! ```text
//!                ┌──────────────────────────┐
//!   append ────▶ │ ConversationStore        │ ──watch──▶ message list
//!   fill   ────▶ │  is_loading              │ ──watch──▶ thoughts panel
//!   loading ───▶ │  messages (append-only)  │ ──watch──▶ history panel
//!                └──────────────────────────┘
//! ```
//!
//! Supported mutations are append and the single in-place fill of the
//! pending assistant placeholder. Nothing is removed or reordered; `reset`
//! exists only for tearing the whole conversation down when the session is
//! abandoned.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use crate::api::{Message, Part, Role};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSnapshot {
    pub is_loading: bool,
    pub messages: Vec<Message>,
    /// Id of the assistant placeholder awaiting its content, if any.
    pub pending_placeholder: Option<String>,
}

/// Cloneable handle to the store. Clones share the same state.
#[derive(Clone)]
pub struct ConversationStore {
    state: Arc<watch::Sender<ConversationSnapshot>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConversationSnapshot::default());
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn len(&self) -> usize {
        self.state.borrow().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a message and returns its id.
    pub fn append(&self, message: Message) -> String {
        let id = message.id.clone();
        debug!("Appending {:?} message {}", message.role, id);
        self.state.send_modify(|s| s.messages.push(message));
        id
    }

    /// Appends several messages in order (e.g. a transcript loaded from the backend).
    pub fn extend(&self, messages: Vec<Message>) {
        if messages.is_empty() {
            return;
        }
        self.state.send_modify(|s| s.messages.extend(messages));
    }

    /// Appends an empty assistant message to be filled once the reply lands.
    pub fn append_placeholder(&self) -> String {
        let placeholder = Message::assistant("");
        let id = placeholder.id.clone();
        self.state.send_modify(|s| {
            s.messages.push(placeholder);
            s.pending_placeholder = Some(id.clone());
        });
        id
    }

    /// Fills the pending placeholder in place. Returns false if `id` isn't
    /// the pending placeholder (it was already filled, or the store was reset).
    pub fn fill_placeholder(&self, id: &str, content: String, parts: Vec<Part>) -> bool {
        let filled = self.state.send_if_modified(|s| {
            if s.pending_placeholder.as_deref() != Some(id) {
                return false;
            }
            let Some(message) = s
                .messages
                .iter_mut()
                .rev()
                .find(|m| m.id == id && m.role == Role::Assistant)
            else {
                return false;
            };
            message.content = content;
            message.parts = parts;
            s.pending_placeholder = None;
            true
        });
        if !filled {
            warn!("Placeholder {} is no longer pending, dropping reply", id);
        }
        filled
    }

    /// Sets the loading flag unless it is already set. Returns whether this
    /// call acquired it.
    pub fn try_begin_send(&self) -> bool {
        self.state.send_if_modified(|s| {
            if s.is_loading {
                false
            } else {
                s.is_loading = true;
                true
            }
        })
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_loading != loading;
            s.is_loading = loading;
            changed
        });
    }

    pub fn finish_send(&self) {
        self.set_loading(false);
    }

    /// Drops the whole conversation. Only for abandoning the session.
    pub fn reset(&self) {
        debug!("Resetting conversation");
        self.state.send_replace(ConversationSnapshot::default());
    }
}
