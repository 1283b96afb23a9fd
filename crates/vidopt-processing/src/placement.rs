//! Final artifact placement into destination storage.

use bytes::Bytes;

use vidopt_storage::{DiskRegistry, DiskResult, Visibility};

/// What gets placed: raw bytes (transcoded artifact or fallback read) or a
/// move directive for an untranscoded temporary file.
#[derive(Clone, Debug)]
pub enum Artifact {
    Bytes(Bytes),
    Move {
        source_disk: String,
        source_path: String,
    },
}

/// Write the final artifact to `dest_disk` at `dest_path`.
///
/// A move directive becomes an in-place rename when source and destination
/// are the same disk, avoiding duplicate I/O; across disks it degrades to a
/// read-then-write copy. Overwrite semantics throughout: retrying with the
/// same destination leaves storage in the same end state.
pub async fn place(
    artifact: Artifact,
    disks: &DiskRegistry,
    dest_disk: &str,
    dest_path: &str,
    visibility: Visibility,
) -> DiskResult<String> {
    let dest = disks.disk(dest_disk)?;

    match artifact {
        Artifact::Bytes(data) => {
            dest.put(dest_path, data, visibility).await?;
        }
        Artifact::Move {
            source_disk,
            source_path,
        } => {
            if source_disk == dest_disk {
                dest.rename(&source_path, dest_path).await?;
            } else {
                let data = disks.disk(&source_disk)?.get(&source_path).await?;
                dest.put(dest_path, data, visibility).await?;
            }
        }
    }

    tracing::info!(disk = %dest_disk, path = %dest_path, "artifact placed");
    Ok(dest_path.to_string())
}
