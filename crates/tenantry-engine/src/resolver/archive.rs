//! Tar (optionally gzip-compressed) archive roots.
//!
//! The archive is read and indexed on first lookup, then kept for the
//! root's lifetime. Concurrent first lookups wait for a single build. A
//! failed read is not cached; the next lookup retries.

use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use flate2::read::GzDecoder;
use tar::Archive;
use tenantry_core::CodeSource;

use super::source::{is_safe_relative, Backing, ResourceHandle, RootKind, SourceRoot};

/// Maximum number of entries indexed from one archive.
const MAX_ENTRY_COUNT: usize = 100_000;

/// Maximum total bytes held for one archive.
const MAX_INDEXED_SIZE: u64 = 512 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

type ArchiveIndex = HashMap<String, Bytes>;

#[derive(Debug)]
pub struct ArchiveRoot {
    id: String,
    code_source: CodeSource,
    backing: Backing,
    index: Mutex<Option<Arc<ArchiveIndex>>>,
}

impl ArchiveRoot {
    pub fn new(code_source: CodeSource, backing: Backing) -> Self {
        Self {
            id: code_source.to_string(),
            code_source,
            backing,
            index: Mutex::new(None),
        }
    }

    fn index(&self) -> Option<Arc<ArchiveIndex>> {
        // Held across the build so only one caller reads the archive.
        let mut slot = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ix) = slot.as_ref() {
            return Some(Arc::clone(ix));
        }
        match self.load_index() {
            Ok(ix) => {
                tracing::debug!(root = %self.id, entries = ix.len(), "archive indexed");
                let ix = Arc::new(ix);
                *slot = Some(Arc::clone(&ix));
                Some(ix)
            }
            Err(e) => {
                tracing::warn!(root = %self.id, error = %e, "archive unreadable; treating as empty");
                None
            }
        }
    }

    fn load_index(&self) -> io::Result<ArchiveIndex> {
        let raw = self
            .backing
            .read(&self.code_source.location)?
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "archive does not exist"))?;
        read_archive(&raw)
    }
}

impl SourceRoot for ArchiveRoot {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> RootKind {
        if self.backing.is_local() {
            RootKind::LocalArchive
        } else {
            RootKind::VfsArchive
        }
    }

    fn code_source(&self) -> &CodeSource {
        &self.code_source
    }

    fn locate(&self, path: &str) -> Option<ResourceHandle> {
        if !is_safe_relative(path) {
            return None;
        }
        let data = self.index()?.get(path)?.clone();
        Some(ResourceHandle {
            code_source: self.code_source.clone(),
            path: path.to_string(),
            data,
        })
    }
}

/// Index every regular file of a tar or tar.gz image by its relative path.
pub(crate) fn read_archive(raw: &[u8]) -> io::Result<ArchiveIndex> {
    if raw.starts_with(&GZIP_MAGIC) {
        index_entries(Archive::new(GzDecoder::new(raw)))
    } else {
        index_entries(Archive::new(raw))
    }
}

fn index_entries<R: Read>(mut archive: Archive<R>) -> io::Result<ArchiveIndex> {
    let mut out = HashMap::new();
    let mut total: u64 = 0;

    for (n, entry) in archive.entries()?.enumerate() {
        if n >= MAX_ENTRY_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("archive exceeds maximum entry count ({MAX_ENTRY_COUNT})"),
            ));
        }
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        total = total.saturating_add(entry.size());
        if total > MAX_INDEXED_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("archive exceeds maximum size ({MAX_INDEXED_SIZE} bytes)"),
            ));
        }

        let path = entry.path()?.to_string_lossy().into_owned();
        let path = path.trim_start_matches("./").to_string();
        if !is_safe_relative(&path) {
            continue;
        }

        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        out.insert(path, Bytes::from(data));
    }

    Ok(out)
}
