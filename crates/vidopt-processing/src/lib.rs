//! Vidopt Processing Library
//!
//! The upload-to-storage pipeline: given a temporary uploaded file and an
//! immutable field-configuration snapshot, decide whether to transcode it,
//! run FFmpeg with policy-driven parameters, fall back to the original file
//! on encoder failure, and place the final artifact into destination storage
//! under a deterministic name.

pub mod encoder;
pub mod info;
pub mod placement;
pub mod pipeline;
pub mod upload;

// Re-export commonly used types
pub use encoder::{EncodeError, EncodeJob, Encoder, FfmpegEncoder};
pub use info::{stored_file_info, StoredFileInfo, TEMPORARY_URL_TTL};
pub use placement::{place, Artifact};
pub use pipeline::{SaveError, SavePipeline};
pub use upload::{FieldConfig, UploadedFileRef};
