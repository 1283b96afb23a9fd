//! FFmpeg encoder adapter.
//!
//! Stages the source file into a per-job scratch directory, invokes ffmpeg
//! with the resolved parameter set, and captures the output artifact. The
//! scratch directory is removed on every exit path, including spawn failures
//! and abandonment, because cleanup rides on [`tempfile::TempDir`] drop
//! rather than on sequencing.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use uuid::Uuid;

use vidopt_core::{EncodeParams, OptimizerDefaults, TargetFormat};
use vidopt_storage::Disk;

const STDERR_TAIL_BYTES: usize = 2048;

/// One transcode attempt, created by the pipeline from a `Transcode`
/// decision and discarded after the encoder consumes it.
#[derive(Clone, Debug)]
pub struct EncodeJob {
    /// Path of the source file on the source disk.
    pub source_path: String,
    /// Destination container format.
    pub format: TargetFormat,
    /// Codec parameter set derived from the quality level.
    pub params: EncodeParams,
    /// Unique token; scratch areas are never shared across jobs.
    pub token: Uuid,
}

impl EncodeJob {
    pub fn new(source_path: impl Into<String>, format: TargetFormat, params: EncodeParams) -> Self {
        Self {
            source_path: source_path.into(),
            format,
            params,
            token: Uuid::new_v4(),
        }
    }
}

/// Staging or encoder-invocation failure. Never propagated as a crash; the
/// pipeline falls back to storing the original file.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid encoder path: {0}")]
    InvalidEncoderPath(String),

    #[error("failed to stage source for encoding: {0}")]
    Stage(String),

    #[error("failed to launch encoder: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("encoder exited with failure: {stderr}")]
    Encoder { stderr: String },

    #[error("failed to read encoder output: {0}")]
    Output(String),
}

/// Transcoding capability consumed by the pipeline. Exactly one production
/// implementation exists ([`FfmpegEncoder`]); tests substitute stubs at this
/// seam.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run one transcode attempt, reading the source from `source`.
    ///
    /// Returns the complete output artifact, never a partial file.
    async fn encode(&self, job: &EncodeJob, source: &dyn Disk) -> Result<Bytes, EncodeError>;
}

/// FFmpeg-backed encoder.
pub struct FfmpegEncoder {
    ffmpeg_path: String,
    scratch_root: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        scratch_root: impl Into<PathBuf>,
    ) -> Result<Self, EncodeError> {
        let ffmpeg_path = ffmpeg_path.into();

        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(EncodeError::InvalidEncoderPath(ffmpeg_path));
        }

        Ok(Self {
            ffmpeg_path,
            scratch_root: scratch_root.into(),
        })
    }

    pub fn from_defaults(defaults: &OptimizerDefaults) -> Result<Self, EncodeError> {
        Self::new(defaults.ffmpeg_path.clone(), defaults.scratch_root.clone())
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    #[tracing::instrument(skip(self, source), fields(token = %job.token, format = %job.format))]
    async fn encode(&self, job: &EncodeJob, source: &dyn Disk) -> Result<Bytes, EncodeError> {
        let data = source
            .get(&job.source_path)
            .await
            .map_err(|e| EncodeError::Stage(e.to_string()))?;

        // Removed on drop, on every exit path below.
        let scratch = tempfile::Builder::new()
            .prefix(&format!("vidopt-{}-", job.token))
            .tempdir_in(&self.scratch_root)
            .map_err(|e| EncodeError::Stage(format!("failed to create scratch dir: {}", e)))?;

        let input_path = scratch.path().join("input");
        tokio::fs::write(&input_path, &data)
            .await
            .map_err(|e| EncodeError::Stage(format!("failed to write staged input: {}", e)))?;

        let output_path = scratch
            .path()
            .join(format!("output.{}", job.format.extension()));

        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-c:v".to_string(),
            job.format.video_codec().to_string(),
            "-crf".to_string(),
            job.params.crf.to_string(),
        ];

        if job.format == TargetFormat::Webm {
            // Constant-quality mode for vp9; without this -crf is ignored.
            args.extend_from_slice(&["-b:v".to_string(), "0".to_string()]);
        }

        args.extend_from_slice(&[
            "-c:a".to_string(),
            job.format.audio_codec().to_string(),
            "-f".to_string(),
            job.format.as_str().to_string(),
            output_path.to_string_lossy().to_string(),
        ]);

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(EncodeError::Spawn)?;

        if !output.status.success() {
            return Err(EncodeError::Encoder {
                stderr: stderr_tail(&output.stderr),
            });
        }

        let encoded = tokio::fs::read(&output_path)
            .await
            .map_err(|e| EncodeError::Output(format!("missing encoder output: {}", e)))?;

        tracing::info!(
            input_bytes = data.len(),
            output_bytes = encoded.len(),
            "transcode completed"
        );

        Ok(Bytes::from(encoded))
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let start = trimmed
        .char_indices()
        .rev()
        .nth(STDERR_TAIL_BYTES - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    trimmed[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;
    use vidopt_core::QualityLevel;
    use vidopt_core::{decide, OptimizationPolicy, TranscodeDecision};
    use vidopt_storage::{MemoryDisk, Visibility};

    fn transcode_job(format: TargetFormat) -> EncodeJob {
        let policy = OptimizationPolicy {
            quality: Some(QualityLevel::Medium),
            format: Some(format),
        };
        match decide("video/mp4", &policy) {
            TranscodeDecision::Transcode { format, params } => {
                EncodeJob::new("tmp/input.mp4", format, params)
            }
            TranscodeDecision::Skip => unreachable!(),
        }
    }

    #[test]
    fn test_rejects_dangerous_encoder_path() {
        let scratch = std::env::temp_dir();
        assert!(matches!(
            FfmpegEncoder::new("ffmpeg; rm -rf /", &scratch),
            Err(EncodeError::InvalidEncoderPath(_))
        ));
        assert!(FfmpegEncoder::new("ffmpeg", &scratch).is_ok());
    }

    #[tokio::test]
    async fn test_missing_source_is_stage_error() {
        let scratch = tempfile::tempdir().unwrap();
        let encoder = FfmpegEncoder::new("ffmpeg", scratch.path()).unwrap();
        let disk = MemoryDisk::new("tmp", "http://test/tmp");

        let result = encoder
            .encode(&transcode_job(TargetFormat::Webm), &disk)
            .await;
        assert!(matches!(result, Err(EncodeError::Stage(_))));
    }

    #[tokio::test]
    async fn test_spawn_failure_cleans_scratch() {
        let scratch = tempfile::tempdir().unwrap();
        let encoder =
            FfmpegEncoder::new("vidopt-nonexistent-encoder-binary", scratch.path()).unwrap();

        let disk = Arc::new(MemoryDisk::new("tmp", "http://test/tmp"));
        disk.put(
            "tmp/input.mp4",
            Bytes::from_static(b"not a real video"),
            Visibility::Private,
        )
        .await
        .unwrap();

        let result = encoder
            .encode(&transcode_job(TargetFormat::Mp4), disk.as_ref())
            .await;
        assert!(matches!(result, Err(EncodeError::Spawn(_))));

        // No scratch files attributable to the job may remain.
        let leftover = std::fs::read_dir(scratch.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_stderr_tail_truncates() {
        let long = vec![b'x'; STDERR_TAIL_BYTES * 2];
        let tail = stderr_tail(&long);
        assert_eq!(tail.len(), STDERR_TAIL_BYTES);

        assert_eq!(stderr_tail(b"  short error \n"), "short error");
    }
}
