use std::fmt;

/// Errors that can occur while talking to the VISTA backend.
///
/// The backend defines no error schema, so HTTP failures keep the raw status
/// and body text. Nothing here is retried automatically.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Non-2xx response.
    RequestFailed { status: u16, body: String },
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// 2xx response whose body didn't match the expected shape.
    Decode(String),
    /// No session id was passed and none is cached.
    NoSession,
    /// The local video file couldn't be read for upload.
    Io(String),
}

impl ApiError {
    /// HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { status, body } => {
                write!(f, "request failed (HTTP {status}): {body}")
            }
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Decode(msg) => write!(f, "unexpected response: {msg}"),
            ApiError::NoSession => {
                write!(f, "no active session, create a session first")
            }
            ApiError::Io(msg) => write!(f, "could not read video: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
