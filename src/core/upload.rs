//! # Upload Validation
//!
//! Synchronous guards run before any network call: the file must look like
//! a video and must not exceed the size ceiling. A file that fails either
//! guard never reaches the backend.

use std::fmt;
use std::path::{Path, PathBuf};

/// Default upload ceiling: 100 MiB, inclusive.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// A local video selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl VideoFile {
    /// Reads size from file metadata and infers the MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let metadata =
            std::fs::metadata(path).map_err(|e| ValidationError::Unreadable(format!("{}: {e}", path.display())))?;
        if !metadata.is_file() {
            return Err(ValidationError::Unreadable(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            mime,
            size: metadata.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// MIME type doesn't start with `video/`.
    NotAVideo { mime: String },
    /// File is larger than the configured ceiling.
    TooLarge { size: u64, limit: u64 },
    /// File is missing or not a regular file.
    Unreadable(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotAVideo { mime } => {
                write!(f, "Vui lòng chọn file video hợp lệ ({mime})")
            }
            ValidationError::TooLarge { limit, .. } => write!(
                f,
                "File video quá lớn. Vui lòng chọn file nhỏ hơn {}MB",
                limit / (1024 * 1024)
            ),
            ValidationError::Unreadable(msg) => write!(f, "Không đọc được file: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Runs both guards against `file`.
pub fn validate(file: &VideoFile, max_bytes: u64) -> Result<(), ValidationError> {
    if !file.mime.starts_with("video/") {
        return Err(ValidationError::NotAVideo {
            mime: file.mime.clone(),
        });
    }
    if file.size > max_bytes {
        return Err(ValidationError::TooLarge {
            size: file.size,
            limit: max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(mime: &str, size: u64) -> VideoFile {
        VideoFile {
            path: PathBuf::from("clip"),
            name: "clip".into(),
            mime: mime.into(),
            size,
        }
    }

    #[test]
    fn test_accepts_video_mime_types() {
        for mime in ["video/mp4", "video/webm", "video/quicktime"] {
            assert_eq!(validate(&file(mime, 1024), DEFAULT_MAX_UPLOAD_BYTES), Ok(()));
        }
    }

    #[test]
    fn test_rejects_non_video_mime_types() {
        for mime in ["image/png", "application/octet-stream", "text/plain", "audio/mpeg", "videox/mp4"] {
            assert!(matches!(
                validate(&file(mime, 1024), DEFAULT_MAX_UPLOAD_BYTES),
                Err(ValidationError::NotAVideo { .. })
            ));
        }
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        assert_eq!(
            validate(&file("video/mp4", DEFAULT_MAX_UPLOAD_BYTES), DEFAULT_MAX_UPLOAD_BYTES),
            Ok(())
        );
        assert_eq!(
            validate(&file("video/mp4", DEFAULT_MAX_UPLOAD_BYTES + 1), DEFAULT_MAX_UPLOAD_BYTES),
            Err(ValidationError::TooLarge {
                size: DEFAULT_MAX_UPLOAD_BYTES + 1,
                limit: DEFAULT_MAX_UPLOAD_BYTES,
            })
        );
    }

    #[test]
    fn test_from_path_infers_mime_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let video = VideoFile::from_path(&path).unwrap();
        assert_eq!(video.name, "clip.mp4");
        assert_eq!(video.mime, "video/mp4");
        assert_eq!(video.size, 2048);
    }

    #[test]
    fn test_from_path_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.zzz");
        std::fs::write(&path, b"hello").unwrap();

        let video = VideoFile::from_path(&path).unwrap();
        assert_eq!(video.mime, "application/octet-stream");
        assert!(validate(&video, DEFAULT_MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = VideoFile::from_path("/definitely/not/here.mp4");
        assert!(matches!(result, Err(ValidationError::Unreadable(_))));
    }

    #[test]
    fn test_too_large_message_mentions_limit() {
        let err = ValidationError::TooLarge {
            size: 200 * 1024 * 1024,
            limit: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert!(err.to_string().contains("100MB"));
    }
}
