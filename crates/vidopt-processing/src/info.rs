//! Stored-file information lookup.

use std::time::Duration;

use vidopt_storage::{Disk, DiskResult, Visibility};

/// Lifetime of temporary URLs minted for private files.
pub const TEMPORARY_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// Display information for a stored file.
#[derive(Clone, Debug)]
pub struct StoredFileInfo {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub url: String,
}

/// Look up display information for a stored file.
///
/// Returns `Ok(None)` when the file is missing or the existence check fails.
/// Private files get a temporary URL when the disk can mint one; any failure
/// there falls back to the plain URL (cosmetic, never blocks). With
/// `fetch_info` disabled the existence check, size and content type are
/// skipped.
pub async fn stored_file_info(
    disk: &dyn Disk,
    path: &str,
    visibility: Visibility,
    fetch_info: bool,
) -> DiskResult<Option<StoredFileInfo>> {
    if fetch_info {
        match disk.exists(path).await {
            Ok(true) => {}
            Ok(false) | Err(_) => return Ok(None),
        }
    }

    let url = match visibility {
        Visibility::Private => match disk.temporary_url(path, TEMPORARY_URL_TTL).await {
            Ok(url) => url,
            Err(_) => disk.url(path),
        },
        Visibility::Public => disk.url(path),
    };

    let name = path.rsplit('/').next().unwrap_or(path).to_string();

    let (size, content_type) = if fetch_info {
        (disk.size(path).await?, Some(disk.mime_type(path).await?))
    } else {
        (0, None)
    };

    Ok(Some(StoredFileInfo {
        name,
        size,
        content_type,
        url,
    }))
}
