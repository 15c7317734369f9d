//! Wire types for the VISTA REST API.
//!
//! Everything here mirrors the JSON the backend sends or expects. Statuses
//! and message parts are closed enums so every consumer matches exhaustively
//! instead of comparing strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Sessions
// ============================================================================

/// Lifecycle status of a server-side session.
///
/// The backend has used several spellings over time; the aliases fold them
/// onto the five lifecycle states. Anything else decodes as `Unknown`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[serde(alias = "created")]
    Pending,
    #[serde(alias = "video_uploaded")]
    Uploading,
    #[serde(alias = "processing")]
    Analyzing,
    Completed,
    #[serde(alias = "processing_error", alias = "upload_error")]
    Error,
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    /// Position in the lifecycle. `Unknown` has no position.
    pub fn rank(self) -> Option<u8> {
        match self {
            SessionStatus::Pending => Some(0),
            SessionStatus::Uploading => Some(1),
            SessionStatus::Analyzing => Some(2),
            SessionStatus::Completed | SessionStatus::Error => Some(3),
            SessionStatus::Unknown => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Uploading => "uploading",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
            SessionStatus::Unknown => "unknown",
        }
    }
}

/// Summary of a finished analysis run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub keyframes_count: u32,
    #[serde(default)]
    pub scene_graph_relations: u32,
    #[serde(default)]
    pub video_duration: Option<f64>,
}

/// Session record as returned by create/get/status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub analysis_results: Option<AnalysisSummary>,
}

impl SessionInfo {
    /// Analysis summary, or zeroes when the backend didn't send one.
    pub fn summary(&self) -> AnalysisSummary {
        self.analysis_results.clone().unwrap_or_default()
    }
}

/// One row of `GET /sessions`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub has_video: bool,
}

#[derive(Deserialize, Debug)]
pub struct SessionList {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub message: String,
    pub video_path: String,
    pub session_id: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Analysis
// ============================================================================

#[derive(Serialize, Debug)]
pub struct AnalyzeRequest<'a> {
    pub question: &'a str,
    pub session_id: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub answer: String,
    pub keyframes_count: u32,
    pub output_dir: String,
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub scene_graph: Vec<String>,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A typed fragment of an assistant message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    /// Intermediate reasoning attributed to one of the backend agents.
    Thought {
        content: String,
        #[serde(default)]
        author: Option<String>,
    },
    /// Final answer content.
    Text {
        content: String,
        #[serde(default)]
        author: Option<String>,
    },
    /// A tool invocation or its result. `data` is passed through untouched.
    Function {
        content: String,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
}

/// A transcript entry. `sent_at` is local bookkeeping and never sent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip, default = "Utc::now")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            parts: Vec::new(),
            sent_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_parts(mut self, parts: Vec<Part>) -> Self {
        self.parts = parts;
        self
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Reply from `POST /sessions/{id}/chat`.
///
/// Depending on the backend version the answer arrives in `content` or
/// `answer`; `parts` may be missing entirely.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl ChatReply {
    /// The answer text: `content` first, then `answer`, skipping blanks.
    pub fn text(&self) -> Option<&str> {
        [self.content.as_deref(), self.answer.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

#[derive(Deserialize, Debug)]
pub struct MessageList {
    pub messages: Vec<Message>,
}
