//! Process-wide optimizer defaults.
//!
//! Read once from the environment into an immutable snapshot and passed
//! explicitly into the pipeline; nothing looks these values up ambiently.

use std::env;
use std::path::PathBuf;

use crate::policy::{PolicyParseError, QualityLevel, TargetFormat};

const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Configuration error while reading optimizer defaults.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: PolicyParseError,
    },
}

/// Read-only process-wide defaults for the optimization pipeline.
///
/// `default_quality` and `default_format` apply only when a field instance
/// does not override them.
#[derive(Clone, Debug)]
pub struct OptimizerDefaults {
    pub default_quality: Option<QualityLevel>,
    pub default_format: Option<TargetFormat>,
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: String,
    /// Root directory under which per-job scratch directories are created.
    pub scratch_root: PathBuf,
}

impl Default for OptimizerDefaults {
    fn default() -> Self {
        Self {
            default_quality: None,
            default_format: None,
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            scratch_root: env::temp_dir(),
        }
    }
}

impl OptimizerDefaults {
    /// Load defaults from the environment (`.env` honored via dotenvy).
    ///
    /// Recognized variables: `VIDOPT_OPTIMIZE` (low|medium|high),
    /// `VIDOPT_FORMAT` (webm|mp4), `VIDOPT_FFMPEG_PATH`, `VIDOPT_SCRATCH_DIR`.
    /// Unset variables fall back to [`OptimizerDefaults::default`]; invalid
    /// enum values are configuration errors rather than silent fallbacks.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let default_quality = match non_empty_var("VIDOPT_OPTIMIZE") {
            Some(v) => Some(v.parse().map_err(|source| ConfigError::Invalid {
                var: "VIDOPT_OPTIMIZE",
                source,
            })?),
            None => None,
        };

        let default_format = match non_empty_var("VIDOPT_FORMAT") {
            Some(v) => Some(v.parse().map_err(|source| ConfigError::Invalid {
                var: "VIDOPT_FORMAT",
                source,
            })?),
            None => None,
        };

        let ffmpeg_path =
            non_empty_var("VIDOPT_FFMPEG_PATH").unwrap_or_else(|| DEFAULT_FFMPEG_PATH.to_string());

        let scratch_root = non_empty_var("VIDOPT_SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            default_quality,
            default_format,
            ffmpeg_path,
            scratch_root,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = OptimizerDefaults::default();
        assert!(defaults.default_quality.is_none());
        assert!(defaults.default_format.is_none());
        assert_eq!(defaults.ffmpeg_path, "ffmpeg");
        assert_eq!(defaults.scratch_root, env::temp_dir());
    }

    #[test]
    fn test_from_env_reads_overrides() {
        env::set_var("VIDOPT_OPTIMIZE", "high");
        env::set_var("VIDOPT_FORMAT", "mp4");
        env::set_var("VIDOPT_FFMPEG_PATH", "/usr/local/bin/ffmpeg");

        let defaults = OptimizerDefaults::from_env().unwrap();
        assert_eq!(defaults.default_quality, Some(QualityLevel::High));
        assert_eq!(defaults.default_format, Some(TargetFormat::Mp4));
        assert_eq!(defaults.ffmpeg_path, "/usr/local/bin/ffmpeg");

        env::remove_var("VIDOPT_OPTIMIZE");
        env::remove_var("VIDOPT_FORMAT");
        env::remove_var("VIDOPT_FFMPEG_PATH");
    }

    #[test]
    fn test_non_empty_var_ignores_blank() {
        env::set_var("VIDOPT_BLANK_TEST", "   ");
        assert!(non_empty_var("VIDOPT_BLANK_TEST").is_none());
        assert!(non_empty_var("VIDOPT_UNSET_TEST").is_none());
        env::remove_var("VIDOPT_BLANK_TEST");
    }
}
