//! Disk abstraction trait
//!
//! This module defines the [`Disk`] trait that all storage backends must
//! implement. The upload pipeline works against this trait only and never
//! couples to a concrete backend.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("read failed: {0}")]
    ReadFailed(String),

    #[error("this disk does not support temporary URLs")]
    TemporaryUrlUnsupported,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("disk configuration error: {0}")]
    Config(String),
}

/// Result type for disk operations
pub type DiskResult<T> = Result<T, DiskError>;

/// Whether a stored object is publicly addressable or requires a signed URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Storage backend abstraction.
///
/// Write operations use overwrite semantics: putting or renaming onto an
/// existing path replaces it (last writer wins, no partial-write state).
#[async_trait]
pub trait Disk: Send + Sync {
    /// Stable identifier for this disk. Two handles with the same name are
    /// treated as the same backend by the move optimization.
    fn name(&self) -> &str;

    /// Check whether a file exists at the given path.
    async fn exists(&self, path: &str) -> DiskResult<bool>;

    /// Read the full contents of a file.
    async fn get(&self, path: &str) -> DiskResult<Bytes>;

    /// Write a file, replacing any existing file at the path.
    async fn put(&self, path: &str, data: Bytes, visibility: Visibility) -> DiskResult<()>;

    /// Move a file within this disk, replacing any existing destination.
    async fn rename(&self, from: &str, to: &str) -> DiskResult<()>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete(&self, path: &str) -> DiskResult<()>;

    /// Public (non-expiring) URL for a path.
    fn url(&self, path: &str) -> String;

    /// Temporary signed URL for a path. Backends without signing support
    /// return [`DiskError::TemporaryUrlUnsupported`].
    async fn temporary_url(&self, path: &str, expires_in: Duration) -> DiskResult<String>;

    /// Size in bytes of the file at the given path.
    async fn size(&self, path: &str) -> DiskResult<u64>;

    /// Declared MIME type of the file at the given path.
    async fn mime_type(&self, path: &str) -> DiskResult<String>;
}

/// Infer a MIME type from a path's extension.
pub fn mime_type_for_path(path: &str) -> String {
    let extension = path
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" | "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

/// Reject keys that could escape the backend's root.
pub(crate) fn validate_key(path: &str) -> DiskResult<()> {
    if path.is_empty() {
        return Err(DiskError::InvalidPath("empty path".to_string()));
    }
    if path.starts_with('/') || path.split('/').any(|segment| segment == "..") {
        return Err(DiskError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path("videos/a.mp4"), "video/mp4");
        assert_eq!(mime_type_for_path("a.WEBM"), "video/webm");
        assert_eq!(mime_type_for_path("clip.mov"), "video/quicktime");
        assert_eq!(mime_type_for_path("noext"), "application/octet-stream");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("videos/a.mp4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("videos/../../secret").is_err());
        // A ".." substring inside a segment is a legal (if odd) filename.
        assert!(validate_key("videos/a..b.mp4").is_ok());
    }
}
