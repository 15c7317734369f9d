//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::api::{
    ApiError, ChatReply, Part, SessionInfo, SessionStatus, SessionSummary,
    UploadResponse, VideoBackend,
};
use crate::core::config::{ResolvedConfig, VistaConfig, resolve_with_env};
use crate::core::upload::VideoFile;

/// Default config, unaffected by the environment the tests run in.
pub fn test_config() -> ResolvedConfig {
    resolve_with_env(&VistaConfig::default(), None, |_| None)
}

pub fn video_file(name: &str, mime: &str, size: u64) -> VideoFile {
    VideoFile {
        path: PathBuf::from(name),
        name: name.to_string(),
        mime: mime.to_string(),
        size,
    }
}

pub fn session(id: &str, status: SessionStatus) -> SessionInfo {
    SessionInfo {
        session_id: id.to_string(),
        status,
        video_path: None,
        created_at: None,
        analysis_results: None,
    }
}

pub fn server_error() -> ApiError {
    ApiError::RequestFailed {
        status: 500,
        body: "Internal Server Error".to_string(),
    }
}

/// A backend whose responses are scripted up front.
///
/// Status polling answers `analyzing` until call `terminal_at`, then the
/// terminal status. The first `failing_status` status calls error out but
/// still count as calls.
pub struct ScriptedBackend {
    terminal_at: Option<u32>,
    terminal_status: SessionStatus,
    failing_status: u32,
    failing_uploads: AtomicU32,
    chat_replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    create: AtomicU32,
    upload: AtomicU32,
    status: AtomicU32,
    chat: AtomicU32,
}

impl ScriptedBackend {
    fn with_terminal(terminal_at: Option<u32>, terminal_status: SessionStatus) -> Self {
        Self {
            terminal_at,
            terminal_status,
            failing_status: 0,
            failing_uploads: AtomicU32::new(0),
            chat_replies: Mutex::new(VecDeque::new()),
            create: AtomicU32::new(0),
            upload: AtomicU32::new(0),
            status: AtomicU32::new(0),
            chat: AtomicU32::new(0),
        }
    }

    pub fn completing_after(calls: u32) -> Self {
        Self::with_terminal(Some(calls), SessionStatus::Completed)
    }

    pub fn erroring_after(calls: u32) -> Self {
        Self::with_terminal(Some(calls), SessionStatus::Error)
    }

    pub fn never_completing() -> Self {
        Self::with_terminal(None, SessionStatus::Completed)
    }

    pub fn failing_status_calls(mut self, count: u32) -> Self {
        self.failing_status = count;
        self
    }

    pub fn failing_uploads(self, count: u32) -> Self {
        self.failing_uploads.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_chat_reply(self, reply: Result<ChatReply, ApiError>) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(reply);
        self
    }

    pub fn create_calls(&self) -> u32 {
        self.create.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> u32 {
        self.upload.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.status.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> u32 {
        self.chat.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoBackend for ScriptedBackend {
    async fn create_session(&self) -> Result<SessionInfo, ApiError> {
        let n = self.create.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(session(&format!("session-{n}"), SessionStatus::Pending))
    }

    async fn upload_video(&self, session_id: &str, file: &VideoFile) -> Result<UploadResponse, ApiError> {
        self.upload.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_uploads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_uploads.store(remaining - 1, Ordering::SeqCst);
            return Err(server_error());
        }
        Ok(UploadResponse {
            message: "Video uploaded successfully".to_string(),
            video_path: format!("uploads/{session_id}/{}", file.name),
            session_id: session_id.to_string(),
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionInfo, ApiError> {
        let n = self.status.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failing_status {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        let status = match self.terminal_at {
            Some(at) if n >= at => self.terminal_status,
            _ => SessionStatus::Analyzing,
        };
        Ok(session(session_id, status))
    }

    async fn chat(&self, _session_id: &str, message: &str) -> Result<ChatReply, ApiError> {
        self.chat.fetch_add(1, Ordering::SeqCst);
        let scripted = self.chat_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(ChatReply {
                content: Some(format!("echo: {message}")),
                parts: vec![Part::Text {
                    content: format!("echo: {message}"),
                    author: Some("Video Analyst".to_string()),
                }],
                ..Default::default()
            })
        })
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        Ok(Vec::new())
    }
}
