//! Name-keyed disk registry.
//!
//! Field configuration refers to disks by name (e.g. "local", "public"); the
//! registry resolves those names to backends. Registered handles are shared
//! `Arc`s so concurrent pipeline invocations can hold them freely.

use std::collections::HashMap;
use std::sync::Arc;

use crate::disk::{Disk, DiskError, DiskResult};

/// Registry mapping disk names to backends.
#[derive(Clone, Default)]
pub struct DiskRegistry {
    disks: HashMap<String, Arc<dyn Disk>>,
}

impl DiskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a disk under its own name, replacing any previous entry.
    pub fn register(&mut self, disk: Arc<dyn Disk>) {
        self.disks.insert(disk.name().to_string(), disk);
    }

    /// Builder-style registration.
    pub fn with(mut self, disk: Arc<dyn Disk>) -> Self {
        self.register(disk);
        self
    }

    /// Resolve a disk by name.
    pub fn disk(&self, name: &str) -> DiskResult<Arc<dyn Disk>> {
        self.disks
            .get(name)
            .cloned()
            .ok_or_else(|| DiskError::Config(format!("disk not configured: {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDisk;

    #[test]
    fn test_lookup() {
        let registry =
            DiskRegistry::new().with(Arc::new(MemoryDisk::new("mem", "http://test/storage")));

        assert!(registry.disk("mem").is_ok());
        assert!(matches!(
            registry.disk("missing"),
            Err(DiskError::Config(_))
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = DiskRegistry::new();
        registry.register(Arc::new(MemoryDisk::new("mem", "http://a")));
        registry.register(Arc::new(MemoryDisk::new("mem", "http://b")));

        let disk = registry.disk("mem").unwrap();
        assert_eq!(disk.url("x"), "http://b/x");
    }
}
