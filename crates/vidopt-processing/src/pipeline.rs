//! Pipeline orchestrator.
//!
//! Sequences one uploaded file through existence check → transcode decision
//! → (encode | skip) → placement, applying the failure-fallback policy: a
//! transcode failure is never fatal to the upload, while a placement failure
//! propagates because no further fallback exists.

use std::sync::Arc;
use thiserror::Error;

use vidopt_core::{
    decide, join_stored_path, resolve_stored_name, OptimizerDefaults, TranscodeDecision,
};
use vidopt_storage::{Disk, DiskError, DiskRegistry};

use crate::encoder::{EncodeJob, Encoder};
use crate::placement::{place, Artifact};
use crate::upload::{FieldConfig, UploadedFileRef};

/// Unrecoverable failure of a save operation.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Destination write/move failed. Not swallowed: once both the transcode
    /// and fallback-placement paths are exhausted there is nothing left to
    /// try.
    #[error("failed to store uploaded file: {0}")]
    Placement(#[from] DiskError),
}

/// Orchestrates the upload-to-storage pipeline for uploaded files.
///
/// Each file is processed by one independent, strictly sequential
/// invocation; the pipeline itself holds no mutable state and may be shared
/// across concurrent invocations.
pub struct SavePipeline {
    disks: DiskRegistry,
    encoder: Arc<dyn Encoder>,
    defaults: OptimizerDefaults,
}

impl SavePipeline {
    pub fn new(disks: DiskRegistry, encoder: Arc<dyn Encoder>, defaults: OptimizerDefaults) -> Self {
        Self {
            disks,
            encoder,
            defaults,
        }
    }

    /// Save one uploaded file, returning the final stored path.
    ///
    /// Returns `Ok(None)` when the source file no longer exists (or the
    /// existence check itself fails); nothing is written in that case. The
    /// temporary source file is deleted after the pipeline consumes it,
    /// success or failure.
    pub async fn save_uploaded_file(
        &self,
        file: &UploadedFileRef,
        config: &FieldConfig,
    ) -> Result<Option<String>, SaveError> {
        let source = match self.disks.disk(&file.disk) {
            Ok(disk) => disk,
            Err(err) => {
                tracing::debug!(file = %file.path, error = %err, "source disk unavailable, skipping file");
                return Ok(None);
            }
        };

        match source.exists(&file.path).await {
            Ok(true) => {}
            // A failed existence check is treated the same as a missing file.
            Ok(false) | Err(_) => {
                tracing::debug!(file = %file.path, "source file missing, skipping");
                return Ok(None);
            }
        }

        let policy = config.policy.or_defaults(&self.defaults);

        let stored = match decide(&file.content_type, &policy) {
            TranscodeDecision::Skip => self.place_original(file, config, source.as_ref()).await?,
            TranscodeDecision::Transcode { format, params } => {
                let job = EncodeJob::new(file.path.clone(), format, params);
                tracing::info!(
                    file = %file.original_name,
                    format = %format,
                    crf = params.crf,
                    "transcoding upload"
                );

                match self.encoder.encode(&job, source.as_ref()).await {
                    Ok(data) => {
                        let filename = resolve_stored_name(
                            &file.original_name,
                            config.preserve_filenames,
                            Some(format),
                        );
                        let dest_path = join_stored_path(config.directory.as_deref(), &filename);
                        place(
                            Artifact::Bytes(data),
                            &self.disks,
                            &config.disk,
                            &dest_path,
                            config.visibility,
                        )
                        .await?
                    }
                    Err(err) => {
                        tracing::warn!(
                            file = %file.original_name,
                            error = %err,
                            "transcode failed, storing original file"
                        );
                        self.place_original(file, config, source.as_ref()).await?
                    }
                }
            }
        };

        self.discard_source(file, source.as_ref()).await;

        tracing::info!(file = %file.original_name, stored = %stored, "upload saved");
        Ok(Some(stored))
    }

    /// Save a batch of uploaded files, returning the stored paths.
    ///
    /// Files are isolated from each other: a missing source skips that file
    /// only. Placement failures still propagate.
    pub async fn save_uploaded_files(
        &self,
        files: &[UploadedFileRef],
        config: &FieldConfig,
    ) -> Result<Vec<String>, SaveError> {
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            if let Some(path) = self.save_uploaded_file(file, config).await? {
                stored.push(path);
            }
        }
        Ok(stored)
    }

    /// Store the original file unmodified: in-place move when configured and
    /// the source lives on the destination disk, copy-store otherwise.
    async fn place_original(
        &self,
        file: &UploadedFileRef,
        config: &FieldConfig,
        source: &dyn Disk,
    ) -> Result<String, SaveError> {
        let filename = resolve_stored_name(&file.original_name, config.preserve_filenames, None);
        let dest_path = join_stored_path(config.directory.as_deref(), &filename);

        let artifact = if config.move_files {
            Artifact::Move {
                source_disk: file.disk.clone(),
                source_path: file.path.clone(),
            }
        } else {
            let data = source.get(&file.path).await?;
            Artifact::Bytes(data)
        };

        Ok(place(
            artifact,
            &self.disks,
            &config.disk,
            &dest_path,
            config.visibility,
        )
        .await?)
    }

    /// The temporary file is consumed by the pipeline; deletion failures are
    /// logged, not propagated. Deleting an already-moved file is a no-op.
    async fn discard_source(&self, file: &UploadedFileRef, source: &dyn Disk) {
        if let Err(err) = source.delete(&file.path).await {
            tracing::debug!(
                file = %file.path,
                error = %err,
                "failed to delete temporary upload"
            );
        }
    }
}
