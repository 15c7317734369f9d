pub mod backend;
pub mod client;
pub mod error;
pub mod types;

pub use backend::VideoBackend;
pub use client::VistaClient;
pub use error::ApiError;
pub use types::{
    AnalysisSummary, AnalyzeResponse, ChatReply, Message, Part, Role, SessionInfo,
    SessionStatus, SessionSummary, UploadResponse,
};
