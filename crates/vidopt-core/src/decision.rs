//! Transcode decision engine.
//!
//! [`decide`] is a pure function of its inputs: no I/O, no ambient
//! configuration lookups. Quality-to-CRF tables are fixed per container
//! format and monotonic (high < medium < low CRF).

use crate::media::is_video;
use crate::policy::{OptimizationPolicy, QualityLevel, TargetFormat};

// CRF by quality for libx264 output (0-51 scale; lower is higher quality).
const MP4_CRF_LOW: u8 = 36;
const MP4_CRF_MEDIUM: u8 = 28;
const MP4_CRF_HIGH: u8 = 20;

// CRF by quality for libvpx-vp9 output (0-63 scale; lower is higher quality).
const WEBM_CRF_LOW: u8 = 42;
const WEBM_CRF_MEDIUM: u8 = 34;
const WEBM_CRF_HIGH: u8 = 26;

/// Encoder parameter set derived from the quality level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeParams {
    /// Constant rate factor passed to the encoder.
    pub crf: u8,
}

/// Outcome of the transcode decision for one uploaded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscodeDecision {
    /// Store the file as-is.
    Skip,
    /// Transcode into `format` with `params` before storing.
    Transcode {
        format: TargetFormat,
        params: EncodeParams,
    },
}

/// Decide whether and how to transcode a file with the given declared media
/// type under the given (already defaults-merged) policy.
///
/// Returns [`TranscodeDecision::Skip`] for non-video media types and for a
/// fully unset policy. When only a quality level is set the container
/// defaults to webm; an unset quality level maps to the format's medium
/// entry, never an error.
pub fn decide(media_type: &str, policy: &OptimizationPolicy) -> TranscodeDecision {
    if !is_video(media_type) || policy.is_unset() {
        return TranscodeDecision::Skip;
    }

    let format = policy.format.unwrap_or(TargetFormat::Webm);
    let quality = policy.quality.unwrap_or(QualityLevel::Medium);

    TranscodeDecision::Transcode {
        format,
        params: EncodeParams {
            crf: crf_for(format, quality),
        },
    }
}

fn crf_for(format: TargetFormat, quality: QualityLevel) -> u8 {
    match (format, quality) {
        (TargetFormat::Mp4, QualityLevel::Low) => MP4_CRF_LOW,
        (TargetFormat::Mp4, QualityLevel::Medium) => MP4_CRF_MEDIUM,
        (TargetFormat::Mp4, QualityLevel::High) => MP4_CRF_HIGH,
        (TargetFormat::Webm, QualityLevel::Low) => WEBM_CRF_LOW,
        (TargetFormat::Webm, QualityLevel::Medium) => WEBM_CRF_MEDIUM,
        (TargetFormat::Webm, QualityLevel::High) => WEBM_CRF_HIGH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(quality: Option<QualityLevel>, format: Option<TargetFormat>) -> OptimizationPolicy {
        OptimizationPolicy { quality, format }
    }

    #[test]
    fn test_non_video_always_skips() {
        let p = policy(Some(QualityLevel::High), Some(TargetFormat::Mp4));
        assert_eq!(decide("image/png", &p), TranscodeDecision::Skip);
        assert_eq!(decide("application/pdf", &p), TranscodeDecision::Skip);
        assert_eq!(decide("audio/mpeg", &p), TranscodeDecision::Skip);
    }

    #[test]
    fn test_unset_policy_skips_video() {
        assert_eq!(
            decide("video/mp4", &OptimizationPolicy::default()),
            TranscodeDecision::Skip
        );
    }

    #[test]
    fn test_quality_only_defaults_to_webm() {
        let p = policy(Some(QualityLevel::Medium), None);
        assert_eq!(
            decide("video/mp4", &p),
            TranscodeDecision::Transcode {
                format: TargetFormat::Webm,
                params: EncodeParams { crf: WEBM_CRF_MEDIUM },
            }
        );
    }

    #[test]
    fn test_format_only_uses_medium_quality() {
        let p = policy(None, Some(TargetFormat::Mp4));
        assert_eq!(
            decide("video/quicktime", &p),
            TranscodeDecision::Transcode {
                format: TargetFormat::Mp4,
                params: EncodeParams { crf: MP4_CRF_MEDIUM },
            }
        );
    }

    #[test]
    fn test_quality_monotonic_per_format() {
        for format in [TargetFormat::Webm, TargetFormat::Mp4] {
            let low = crf_for(format, QualityLevel::Low);
            let medium = crf_for(format, QualityLevel::Medium);
            let high = crf_for(format, QualityLevel::High);
            assert!(high < medium, "{format}: high CRF must be below medium");
            assert!(medium < low, "{format}: medium CRF must be below low");
        }
    }

    #[test]
    fn test_decision_is_deterministic() {
        let p = policy(Some(QualityLevel::Low), Some(TargetFormat::Webm));
        let first = decide("video/webm", &p);
        for _ in 0..10 {
            assert_eq!(decide("video/webm", &p), first);
        }
    }
}
