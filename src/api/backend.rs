use async_trait::async_trait;

use super::error::ApiError;
use super::types::{ChatReply, SessionInfo, SessionSummary, UploadResponse};
use crate::core::upload::VideoFile;

/// The backend operations the lifecycle, chat flow and TUI depend on.
///
/// `VistaClient` is the HTTP implementation; tests substitute scripted fakes.
/// Every method is a single round trip with no retries.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    async fn create_session(&self) -> Result<SessionInfo, ApiError>;

    async fn upload_video(
        &self,
        session_id: &str,
        file: &VideoFile,
    ) -> Result<UploadResponse, ApiError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionInfo, ApiError>;

    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;
}
