//! # Send-Message Flow
//!
//! ```text
//! input ─▶ blank? ──yes──▶ Ignored(EmptyInput)
//!            │ no
//!            ▼
//!         loading? ──yes──▶ Ignored(Busy)
//!            │ no (flag now held)
//!            ▼
//!   append user ─▶ append placeholder ─▶ chat() ─┬─ok──▶ fill with answer
//!                                                └─err─▶ fill with apology
//!                                                   │
//!                                             clear loading
//! ```
//!
//! Every accepted send leaves exactly one user entry followed by exactly one
//! assistant entry, whatever the backend does.

use log::{info, warn};

use crate::api::{ApiError, Message, VideoBackend};
use crate::core::conversation::ConversationStore;

/// Shown in place of the answer when the chat request fails.
pub const APOLOGY: &str =
    "Xin lỗi, có lỗi xảy ra khi xử lý tin nhắn của bạn. Vui lòng thử lại.";

/// Shown when the backend answered but with no text.
pub const NO_ANSWER: &str = "Không thể tạo câu trả lời.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Nothing was appended and no request was made.
    Ignored(IgnoreReason),
    /// The placeholder was filled with the backend's answer.
    Answered { message_id: String },
    /// The placeholder was filled with the apology.
    Failed { message_id: String, error: ApiError },
}

/// Sends `input` to the session's chat endpoint and folds the reply into `store`.
pub async fn send_message(
    store: &ConversationStore,
    backend: &dyn VideoBackend,
    session_id: &str,
    input: &str,
) -> SendOutcome {
    if input.trim().is_empty() {
        return SendOutcome::Ignored(IgnoreReason::EmptyInput);
    }
    if !store.try_begin_send() {
        info!("Send ignored: a reply is still pending");
        return SendOutcome::Ignored(IgnoreReason::Busy);
    }

    store.append(Message::user(input));
    let placeholder = store.append_placeholder();

    let outcome = match backend.chat(session_id, input).await {
        Ok(reply) => {
            let text = reply.text().unwrap_or(NO_ANSWER).to_string();
            info!(
                "Chat reply for {}: {} chars, {} parts",
                session_id,
                text.len(),
                reply.parts.len()
            );
            store.fill_placeholder(&placeholder, text, reply.parts);
            SendOutcome::Answered {
                message_id: placeholder,
            }
        }
        Err(error) => {
            warn!("Error sending message: {}", error);
            store.fill_placeholder(&placeholder, APOLOGY.to_string(), Vec::new());
            SendOutcome::Failed {
                message_id: placeholder,
                error,
            }
        }
    };

    store.finish_send();
    outcome
}
