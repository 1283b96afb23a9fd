//! In-memory disk implementation.
//!
//! Used by tests and by embedders that want a throwaway backend. Unlike the
//! local disk it can mint (fake) temporary URLs, so both directions of the
//! private-URL fallback are exercisable.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::disk::{mime_type_for_path, validate_key, Disk, DiskError, DiskResult, Visibility};

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    #[allow(dead_code)]
    visibility: Visibility,
}

/// In-memory disk backed by a mutex-guarded map.
pub struct MemoryDisk {
    name: String,
    base_url: String,
    supports_temporary_urls: bool,
    files: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryDisk {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            supports_temporary_urls: true,
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Disable temporary-URL minting to emulate backends without signing.
    pub fn without_temporary_urls(mut self) -> Self {
        self.supports_temporary_urls = false;
        self
    }

    /// Number of stored files (test helper).
    pub fn file_count(&self) -> usize {
        self.files.lock().expect("disk map poisoned").len()
    }
}

#[async_trait]
impl Disk for MemoryDisk {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &str) -> DiskResult<bool> {
        validate_key(path)?;
        Ok(self.files.lock().expect("disk map poisoned").contains_key(path))
    }

    async fn get(&self, path: &str) -> DiskResult<Bytes> {
        validate_key(path)?;
        self.files
            .lock()
            .expect("disk map poisoned")
            .get(path)
            .map(|o| o.data.clone())
            .ok_or_else(|| DiskError::NotFound(path.to_string()))
    }

    async fn put(&self, path: &str, data: Bytes, visibility: Visibility) -> DiskResult<()> {
        validate_key(path)?;
        let size = data.len();
        self.files
            .lock()
            .expect("disk map poisoned")
            .insert(path.to_string(), StoredObject { data, visibility });

        tracing::debug!(disk = %self.name, path = %path, size_bytes = size, "memory disk write");
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> DiskResult<()> {
        validate_key(from)?;
        validate_key(to)?;
        let mut files = self.files.lock().expect("disk map poisoned");
        let object = files
            .remove(from)
            .ok_or_else(|| DiskError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), object);
        Ok(())
    }

    async fn delete(&self, path: &str) -> DiskResult<()> {
        validate_key(path)?;
        self.files.lock().expect("disk map poisoned").remove(path);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn temporary_url(&self, path: &str, expires_in: Duration) -> DiskResult<String> {
        if !self.supports_temporary_urls {
            return Err(DiskError::TemporaryUrlUnsupported);
        }
        validate_key(path)?;
        Ok(format!(
            "{}?expires_in={}",
            self.url(path),
            expires_in.as_secs()
        ))
    }

    async fn size(&self, path: &str) -> DiskResult<u64> {
        validate_key(path)?;
        self.files
            .lock()
            .expect("disk map poisoned")
            .get(path)
            .map(|o| o.data.len() as u64)
            .ok_or_else(|| DiskError::NotFound(path.to_string()))
    }

    async fn mime_type(&self, path: &str) -> DiskResult<String> {
        if !self.exists(path).await? {
            return Err(DiskError::NotFound(path.to_string()));
        }
        Ok(mime_type_for_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let disk = MemoryDisk::new("mem", "http://test/storage");
        let data = Bytes::from_static(b"hello");

        disk.put("a/b.txt", data.clone(), Visibility::Public)
            .await
            .unwrap();
        assert!(disk.exists("a/b.txt").await.unwrap());
        assert_eq!(disk.get("a/b.txt").await.unwrap(), data);
        assert_eq!(disk.size("a/b.txt").await.unwrap(), 5);

        disk.delete("a/b.txt").await.unwrap();
        assert!(!disk.exists("a/b.txt").await.unwrap());
        assert!(disk.delete("a/b.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_moves_object() {
        let disk = MemoryDisk::new("mem", "http://test/storage");
        disk.put("tmp/x.mp4", Bytes::from_static(b"v"), Visibility::Public)
            .await
            .unwrap();

        disk.rename("tmp/x.mp4", "videos/x.mp4").await.unwrap();
        assert!(!disk.exists("tmp/x.mp4").await.unwrap());
        assert!(disk.exists("videos/x.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_temporary_url_toggle() {
        let signed = MemoryDisk::new("mem", "http://test/storage");
        let url = signed
            .temporary_url("a.mp4", Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(url, "http://test/storage/a.mp4?expires_in=300");

        let unsigned = MemoryDisk::new("mem", "http://test/storage").without_temporary_urls();
        let result = unsigned.temporary_url("a.mp4", Duration::from_secs(300)).await;
        assert!(matches!(result, Err(DiskError::TemporaryUrlUnsupported)));
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let disk = MemoryDisk::new("mem", "http://test/storage");
        let result = disk.get("../secret").await;
        assert!(matches!(result, Err(DiskError::InvalidPath(_))));
    }
}
