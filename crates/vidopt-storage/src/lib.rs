//! Vidopt Storage Library
//!
//! Storage abstraction for the upload pipeline: the [`Disk`] trait plus
//! local-filesystem and in-memory backends, and a name-keyed registry so the
//! pipeline can resolve configured disk names and compare disk identity for
//! the move optimization.
//!
//! Paths are relative keys. Keys must not contain `..` or a leading `/`;
//! validation is enforced by each backend before touching the filesystem.

pub mod disk;
pub mod local;
pub mod memory;
pub mod registry;

// Re-export commonly used types
pub use disk::{mime_type_for_path, Disk, DiskError, DiskResult, Visibility};
pub use local::LocalDisk;
pub use memory::MemoryDisk;
pub use registry::DiskRegistry;
