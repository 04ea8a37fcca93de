//! Source roots: where a tier's module bytes come from.
//!
//! A root is one of four backings behind [`SourceRoot`]: a local directory,
//! a local tar archive, a directory in the virtual filesystem, or a tar
//! archive stored in the virtual filesystem. Archives are recognised by
//! their `.tar`, `.tgz` or `.tar.gz` suffix.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tenantry_core::error::{Result, TrustError};
use tenantry_core::CodeSource;

use super::archive::ArchiveRoot;
use super::vfs::VirtualFs;

pub const PROTOCOL_FILE: &str = "file";
pub const PROTOCOL_VFS: &str = "vfs";

/// Suffix appended to a module's resource path.
pub const MODULE_SUFFIX: &str = ".mod";

const ARCHIVE_SUFFIXES: [&str; 3] = [".tar", ".tgz", ".tar.gz"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    LocalDirectory,
    LocalArchive,
    VfsDirectory,
    VfsArchive,
}

/// Bytes located in a root, tagged with the root's code source.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    pub code_source: CodeSource,
    pub path: String,
    pub data: Bytes,
}

pub trait SourceRoot: Send + Sync + fmt::Debug {
    /// `protocol:location`, unique per root.
    fn id(&self) -> &str;

    fn kind(&self) -> RootKind;

    fn code_source(&self) -> &CodeSource;

    /// Look up a relative resource path. Read failures are logged and
    /// reported as `None`.
    fn locate(&self, path: &str) -> Option<ResourceHandle>;
}

/// `a.b.Foo` -> `a/b/Foo.mod`; `None` for malformed names.
pub fn module_path(name: &str) -> Option<String> {
    if name.is_empty() || name.contains(['/', '\\']) || name.split('.').any(str::is_empty) {
        return None;
    }
    Some(format!("{}{MODULE_SUFFIX}", name.replace('.', "/")))
}

/// Relative, non-empty, and free of `..` segments.
pub fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && !path.split('/').any(|seg| seg == "..")
}

pub fn is_archive_location(location: &str) -> bool {
    ARCHIVE_SUFFIXES.iter().any(|s| location.ends_with(s))
}

/// Where a root's bytes are read from.
#[derive(Debug, Clone)]
pub enum Backing {
    Local,
    Vfs(Arc<dyn VirtualFs>),
}

impl Backing {
    pub(crate) fn read(&self, path: &str) -> io::Result<Option<Bytes>> {
        match self {
            Backing::Local => match fs::metadata(path) {
                Ok(meta) if meta.is_file() => fs::read(path).map(|v| Some(Bytes::from(v))),
                Ok(_) => Ok(None),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            },
            Backing::Vfs(vfs) => vfs.read(path),
        }
    }

    pub(crate) fn join(&self, dir: &str, path: &str) -> String {
        match self {
            Backing::Local => Path::new(dir).join(path).to_string_lossy().into_owned(),
            Backing::Vfs(_) => format!("{}/{}", dir.trim_end_matches('/'), path),
        }
    }

    pub(crate) fn is_local(&self) -> bool {
        matches!(self, Backing::Local)
    }
}

/// A directory, read entry by entry on demand.
#[derive(Debug)]
pub struct DirectoryRoot {
    id: String,
    code_source: CodeSource,
    backing: Backing,
}

impl DirectoryRoot {
    pub fn new(code_source: CodeSource, backing: Backing) -> Self {
        Self {
            id: code_source.to_string(),
            code_source,
            backing,
        }
    }
}

impl SourceRoot for DirectoryRoot {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> RootKind {
        if self.backing.is_local() {
            RootKind::LocalDirectory
        } else {
            RootKind::VfsDirectory
        }
    }

    fn code_source(&self) -> &CodeSource {
        &self.code_source
    }

    fn locate(&self, path: &str) -> Option<ResourceHandle> {
        if !is_safe_relative(path) {
            return None;
        }
        let full = self.backing.join(&self.code_source.location, path);
        match self.backing.read(&full) {
            Ok(Some(data)) => Some(ResourceHandle {
                code_source: self.code_source.clone(),
                path: path.to_string(),
                data,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(root = %self.id, %path, error = %e, "source root read failed; treating as not found");
                None
            }
        }
    }
}

/// Classify and open a configured root.
pub fn open_root(
    protocol: &str,
    location: &str,
    vfs: Option<&Arc<dyn VirtualFs>>,
) -> Result<Arc<dyn SourceRoot>> {
    let backing = match protocol {
        PROTOCOL_FILE => Backing::Local,
        PROTOCOL_VFS => Backing::Vfs(vfs.cloned().ok_or_else(|| {
            TrustError::Config(format!(
                "root vfs:{location} configured but no virtual filesystem is attached"
            ))
        })?),
        other => {
            return Err(TrustError::Config(format!(
                "unsupported root protocol '{other}' (expected file or vfs)"
            )))
        }
    };

    let code_source = CodeSource::new(protocol, location);
    let root: Arc<dyn SourceRoot> = if is_archive_location(location) {
        Arc::new(ArchiveRoot::new(code_source, backing))
    } else {
        Arc::new(DirectoryRoot::new(code_source, backing))
    };
    Ok(root)
}
