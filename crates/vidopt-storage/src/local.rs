//! Local filesystem disk implementation.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::disk::{
    mime_type_for_path, validate_key, Disk, DiskError, DiskResult, Visibility,
};

/// Local filesystem disk.
#[derive(Clone)]
pub struct LocalDisk {
    name: String,
    base_path: PathBuf,
    base_url: String,
}

impl LocalDisk {
    /// Create a new local disk rooted at `base_path`.
    ///
    /// # Arguments
    /// * `name` - Disk identifier referenced by field configuration (e.g., "public")
    /// * `base_path` - Root directory for file storage
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/storage")
    pub async fn new(
        name: impl Into<String>,
        base_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> DiskResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            DiskError::Config(format!(
                "failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalDisk {
            name: name.into(),
            base_path,
            base_url: base_url.into(),
        })
    }

    /// Convert a storage path to a filesystem path with traversal validation.
    fn key_to_path(&self, path: &str) -> DiskResult<PathBuf> {
        validate_key(path)?;
        Ok(self.base_path.join(path))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> DiskResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    #[cfg(unix)]
    async fn apply_visibility(&self, path: &Path, visibility: Visibility) -> DiskResult<()> {
        use std::os::unix::fs::PermissionsExt;

        let mode = match visibility {
            Visibility::Public => 0o644,
            Visibility::Private => 0o600,
        };
        fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
        Ok(())
    }

    #[cfg(not(unix))]
    async fn apply_visibility(&self, _path: &Path, _visibility: Visibility) -> DiskResult<()> {
        Ok(())
    }
}

#[async_trait]
impl Disk for LocalDisk {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &str) -> DiskResult<bool> {
        let path = self.key_to_path(path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn get(&self, path: &str) -> DiskResult<Bytes> {
        let fs_path = self.key_to_path(path)?;

        if !fs::try_exists(&fs_path).await.unwrap_or(false) {
            return Err(DiskError::NotFound(path.to_string()));
        }

        let data = fs::read(&fs_path).await.map_err(|e| {
            DiskError::ReadFailed(format!("failed to read {}: {}", fs_path.display(), e))
        })?;

        Ok(Bytes::from(data))
    }

    async fn put(&self, path: &str, data: Bytes, visibility: Visibility) -> DiskResult<()> {
        let fs_path = self.key_to_path(path)?;
        let size = data.len();

        self.ensure_parent_dir(&fs_path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&fs_path).await.map_err(|e| {
            DiskError::WriteFailed(format!("failed to create {}: {}", fs_path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            DiskError::WriteFailed(format!("failed to write {}: {}", fs_path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            DiskError::WriteFailed(format!("failed to sync {}: {}", fs_path.display(), e))
        })?;

        self.apply_visibility(&fs_path, visibility).await?;

        tracing::info!(
            disk = %self.name,
            path = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "local disk write successful"
        );

        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> DiskResult<()> {
        let from_path = self.key_to_path(from)?;
        let to_path = self.key_to_path(to)?;

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(DiskError::NotFound(from.to_string()));
        }

        self.ensure_parent_dir(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            DiskError::WriteFailed(format!(
                "failed to move {} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })?;

        tracing::info!(
            disk = %self.name,
            from = %from,
            to = %to,
            "local disk move successful"
        );

        Ok(())
    }

    async fn delete(&self, path: &str) -> DiskResult<()> {
        let fs_path = self.key_to_path(path)?;

        if !fs::try_exists(&fs_path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&fs_path).await.map_err(|e| {
            DiskError::WriteFailed(format!("failed to delete {}: {}", fs_path.display(), e))
        })?;

        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn temporary_url(&self, _path: &str, _expires_in: Duration) -> DiskResult<String> {
        Err(DiskError::TemporaryUrlUnsupported)
    }

    async fn size(&self, path: &str) -> DiskResult<u64> {
        let fs_path = self.key_to_path(path)?;
        let meta = fs::metadata(&fs_path)
            .await
            .map_err(|_| DiskError::NotFound(path.to_string()))?;
        Ok(meta.len())
    }

    async fn mime_type(&self, path: &str) -> DiskResult<String> {
        let fs_path = self.key_to_path(path)?;
        if !fs::try_exists(&fs_path).await.unwrap_or(false) {
            return Err(DiskError::NotFound(path.to_string()));
        }
        Ok(mime_type_for_path(path))
    }
}
