//! HTTP client for the VISTA REST API.
//!
//! One method per endpoint, one round trip per call. Non-2xx responses turn
//! into `ApiError::RequestFailed` carrying the status and raw body text.
//!
//! The client remembers the id of the last session it created so callers can
//! pass `None` for the session on follow-up calls. An explicit id always wins.

use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::backend::VideoBackend;
use super::error::ApiError;
use super::types::{
    AnalyzeRequest, AnalyzeResponse, ChatReply, ChatRequest, DeleteResponse, Message,
    MessageList, SessionInfo, SessionList, SessionSummary, UploadResponse,
};
use crate::core::upload::VideoFile;

pub struct VistaClient {
    base_url: String,
    http: reqwest::Client,
    current_session: Mutex<Option<String>>,
}

impl VistaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
            current_session: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn current_session_id(&self) -> Option<String> {
        self.current_session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_current_session_id(&self, session_id: Option<String>) {
        *self
            .current_session
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = session_id;
    }

    /// Explicit id, else the cached one, else `NoSession`.
    fn resolve_session(&self, session_id: Option<&str>) -> Result<String, ApiError> {
        session_id
            .map(str::to_string)
            .or_else(|| self.current_session_id())
            .ok_or(ApiError::NoSession)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// `POST /sessions`. Caches the new id as the current session.
    pub async fn create_session(&self) -> Result<SessionInfo, ApiError> {
        info!("Creating session");
        let response = self
            .http
            .post(self.url("/sessions"))
            .send()
            .await
            .map_err(network)?;
        let session: SessionInfo = decode(response, "create session").await?;
        info!("Session created: {}", session.session_id);
        self.set_current_session_id(Some(session.session_id.clone()));
        Ok(session)
    }

    /// `POST /sessions/{id}/upload` as multipart with the video under `file`.
    pub async fn upload_video(
        &self,
        file: &VideoFile,
        session_id: Option<&str>,
    ) -> Result<UploadResponse, ApiError> {
        let id = self.resolve_session(session_id)?;
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| ApiError::Io(format!("{}: {e}", file.path.display())))?;

        info!(
            "Uploading {} ({} bytes, {}) to session {}",
            file.name, file.size, file.mime, id
        );

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| ApiError::Io(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url(&format!("/sessions/{id}/upload")))
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        decode(response, "upload").await
    }

    /// `GET /sessions/{id}/status`.
    pub async fn session_status(&self, session_id: &str) -> Result<SessionInfo, ApiError> {
        debug!("Getting session status: {}", session_id);
        let response = self
            .http
            .get(self.url(&format!("/sessions/{session_id}/status")))
            .send()
            .await
            .map_err(network)?;
        decode(response, "session status").await
    }

    /// `POST /sessions/{id}/analyze`.
    pub async fn analyze(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<AnalyzeResponse, ApiError> {
        let id = self.resolve_session(session_id)?;
        info!("Analyzing video for session {}", id);
        let response = self
            .http
            .post(self.url(&format!("/sessions/{id}/analyze")))
            .json(&AnalyzeRequest {
                question,
                session_id: &id,
            })
            .send()
            .await
            .map_err(network)?;
        decode(response, "analyze").await
    }

    /// `POST /sessions/{id}/chat`.
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let id = self.resolve_session(session_id)?;
        info!("Sending chat message to session {} ({} chars)", id, message.len());
        let response = self
            .http
            .post(self.url(&format!("/sessions/{id}/chat")))
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(network)?;
        let reply: ChatReply = decode(response, "chat").await?;
        debug!("Chat reply: {} parts", reply.parts.len());
        Ok(reply)
    }

    /// `GET /sessions/{id}/messages`.
    pub async fn messages(&self, session_id: Option<&str>) -> Result<Vec<Message>, ApiError> {
        let id = self.resolve_session(session_id)?;
        let response = self
            .http
            .get(self.url(&format!("/sessions/{id}/messages")))
            .send()
            .await
            .map_err(network)?;
        let list: MessageList = decode(response, "messages").await?;
        Ok(list.messages)
    }

    /// `GET /sessions/{id}`.
    pub async fn get_session(&self, session_id: Option<&str>) -> Result<SessionInfo, ApiError> {
        let id = self.resolve_session(session_id)?;
        let response = self
            .http
            .get(self.url(&format!("/sessions/{id}")))
            .send()
            .await
            .map_err(network)?;
        decode(response, "get session").await
    }

    /// `DELETE /sessions/{id}`. Forgets the cached id if it was this one.
    pub async fn delete_session(&self, session_id: Option<&str>) -> Result<(), ApiError> {
        let id = self.resolve_session(session_id)?;
        info!("Deleting session {}", id);
        let response = self
            .http
            .delete(self.url(&format!("/sessions/{id}")))
            .send()
            .await
            .map_err(network)?;
        let deleted: DeleteResponse = decode(response, "delete session").await?;
        debug!("Delete response: {:?}", deleted.message);

        if self.current_session_id().as_deref() == Some(id.as_str()) {
            self.set_current_session_id(None);
        }
        Ok(())
    }

    /// `GET /sessions`.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let response = self
            .http
            .get(self.url("/sessions"))
            .send()
            .await
            .map_err(network)?;
        let list: SessionList = decode(response, "list sessions").await?;
        Ok(list.sessions)
    }
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

/// Turns a response into `T`, or `RequestFailed` with the raw body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T, ApiError> {
    let status = response.status();
    debug!("{} response status: {}", what, status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("{} failed: {} - {}", what, status.as_u16(), body);
        return Err(ApiError::RequestFailed {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await.map_err(network)?;
    serde_json::from_str(&body).map_err(|e| {
        warn!("{} returned an unexpected body: {}", what, e);
        ApiError::Decode(e.to_string())
    })
}

#[async_trait]
impl VideoBackend for VistaClient {
    async fn create_session(&self) -> Result<SessionInfo, ApiError> {
        VistaClient::create_session(self).await
    }

    async fn upload_video(
        &self,
        session_id: &str,
        file: &VideoFile,
    ) -> Result<UploadResponse, ApiError> {
        VistaClient::upload_video(self, file, Some(session_id)).await
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionInfo, ApiError> {
        VistaClient::session_status(self, session_id).await
    }

    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError> {
        VistaClient::chat(self, message, Some(session_id)).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        VistaClient::list_sessions(self).await
    }
}
