//! Uploaded-file and field-configuration snapshots handed to the pipeline.

use vidopt_core::OptimizationPolicy;
use vidopt_storage::Visibility;

/// A temporary uploaded file awaiting processing.
///
/// Owned exclusively by one `save_uploaded_file` call; the pipeline deletes
/// it from temporary storage after consuming it, success or failure. The
/// current disk/path are part of the public surface so the pipeline can
/// compare disk identity for the move optimization.
#[derive(Clone, Debug)]
pub struct UploadedFileRef {
    /// Client-supplied file name.
    pub original_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Name of the disk the temporary file currently lives on.
    pub disk: String,
    /// Path of the temporary file on that disk.
    pub path: String,
}

/// Immutable per-invocation snapshot of the upload field's configuration.
///
/// Replaces the closure-per-tunable pattern: every tunable is resolved to a
/// plain value before the pipeline runs.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    /// Destination directory on the destination disk, if any.
    pub directory: Option<String>,
    /// Destination disk name.
    pub disk: String,
    pub visibility: Visibility,
    /// Move instead of copy when no transcoding happens and the source lives
    /// on the destination disk.
    pub move_files: bool,
    pub preserve_filenames: bool,
    /// Per-field optimize/format overrides, merged over process defaults at
    /// save time.
    pub policy: OptimizationPolicy,
}

impl FieldConfig {
    /// Plain copy-store configuration targeting `disk` with no transcoding.
    pub fn new(disk: impl Into<String>) -> Self {
        Self {
            directory: None,
            disk: disk.into(),
            visibility: Visibility::Public,
            move_files: false,
            preserve_filenames: false,
            policy: OptimizationPolicy::default(),
        }
    }
}
