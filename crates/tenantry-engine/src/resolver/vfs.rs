//! Virtual (distributed) filesystem seam.

use std::fmt;
use std::io;

use bytes::Bytes;
use dashmap::DashMap;

/// Read access to a virtual filesystem holding tenant or shared code.
pub trait VirtualFs: Send + Sync + fmt::Debug {
    /// `Ok(None)` when nothing exists at `path`.
    fn read(&self, path: &str) -> io::Result<Option<Bytes>>;
}

/// In-memory filesystem, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryVfs {
    files: DashMap<String, Bytes>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.files.insert(path.into(), data.into());
    }

    pub fn remove(&self, path: &str) -> Option<Bytes> {
        self.files.remove(path).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl VirtualFs for MemoryVfs {
    fn read(&self, path: &str) -> io::Result<Option<Bytes>> {
        Ok(self.files.get(path).map(|b| b.value().clone()))
    }
}
