//! Optimization policy value objects.
//!
//! A policy is resolved once per save operation by merging the field-level
//! override with the process-wide defaults. Both fields are optional; a fully
//! unset policy disables transcoding entirely.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::OptimizerDefaults;

/// Error parsing a quality level or target format from configuration.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized {kind} {value:?} (expected one of: {expected})")]
pub struct PolicyParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Perceptual quality level for transcoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Low => "low",
            QualityLevel::Medium => "medium",
            QualityLevel::High => "high",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLevel {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(QualityLevel::Low),
            "medium" => Ok(QualityLevel::Medium),
            "high" => Ok(QualityLevel::High),
            _ => Err(PolicyParseError {
                kind: "quality level",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

/// Target container format for transcoded output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Webm,
    Mp4,
}

impl TargetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Webm => "webm",
            TargetFormat::Mp4 => "mp4",
        }
    }

    /// File extension for the container (no leading dot).
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// FFmpeg video codec for this container.
    pub fn video_codec(&self) -> &'static str {
        match self {
            TargetFormat::Webm => "libvpx-vp9",
            TargetFormat::Mp4 => "libx264",
        }
    }

    /// FFmpeg audio codec for this container.
    pub fn audio_codec(&self) -> &'static str {
        match self {
            TargetFormat::Webm => "libopus",
            TargetFormat::Mp4 => "aac",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webm" => Ok(TargetFormat::Webm),
            "mp4" => Ok(TargetFormat::Mp4),
            _ => Err(PolicyParseError {
                kind: "target format",
                value: s.to_string(),
                expected: "webm, mp4",
            }),
        }
    }
}

/// Per-field optimization policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationPolicy {
    pub quality: Option<QualityLevel>,
    pub format: Option<TargetFormat>,
}

impl OptimizationPolicy {
    /// True when neither a quality level nor a target format is set.
    pub fn is_unset(&self) -> bool {
        self.quality.is_none() && self.format.is_none()
    }

    /// Merge this policy over the process-wide defaults. Field-level values
    /// win per field, not per policy.
    pub fn or_defaults(&self, defaults: &OptimizerDefaults) -> OptimizationPolicy {
        OptimizationPolicy {
            quality: self.quality.or(defaults.default_quality),
            format: self.format.or(defaults.default_format),
        }
    }
}
