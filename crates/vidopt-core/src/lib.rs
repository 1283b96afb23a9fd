//! Vidopt Core Library
//!
//! This crate holds the pure parts of the video upload optimization pipeline:
//! the optimization policy model, the transcode decision engine, the stored-name
//! policy, and the process-wide configuration defaults. Nothing here performs
//! I/O except [`OptimizerDefaults::from_env`], which reads the environment once.

pub mod config;
pub mod decision;
pub mod media;
pub mod naming;
pub mod policy;

// Re-export commonly used types
pub use config::{ConfigError, OptimizerDefaults};
pub use decision::{decide, EncodeParams, TranscodeDecision};
pub use media::{is_video, ACCEPTED_VIDEO_TYPES};
pub use naming::{join_stored_path, resolve_stored_name};
pub use policy::{OptimizationPolicy, PolicyParseError, QualityLevel, TargetFormat};
