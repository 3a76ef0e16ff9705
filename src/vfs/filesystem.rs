use std::fmt;
use std::fs::File;
use std::sync::Arc;

use bytes::Bytes;

use super::listing::{DirectoryStream, EntryFilter};
use super::node::{AttributeRecord, AttributeValue, DirectoryEntry, EntryKind};
use super::path::GitHubPath;
use super::resolver::PathResolver;
use crate::cache::ListingCache;
use crate::config::FilesystemOptions;
use crate::error::{GhfsError, Result};
use crate::fetch::ContentFetcher;
use crate::locator::RepoLocator;

/// Access modes accepted by [`ReadOnlyFs::check_access`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    Execute,
}

/// Capability surface a host integration layer adapts
///
/// Paths are filesystem paths (rooted at the locator's base path). Every
/// mutator fails with [`GhfsError::ReadOnlyViolation`] without touching any
/// state.
pub trait ReadOnlyFs: Send + Sync {
    fn exists(&self, path: &str) -> Result<bool>;

    fn kind(&self, path: &str) -> Result<EntryKind>;

    fn read_dir(&self, path: &str) -> Result<DirectoryStream>;

    fn read(&self, path: &str) -> Result<Bytes>;

    fn read_attributes(&self, path: &str) -> Result<AttributeRecord>;

    /// False for a missing path
    fn is_directory(&self, path: &str) -> Result<bool> {
        match self.kind(path) {
            Ok(kind) => Ok(kind == EntryKind::Directory),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// False for a missing path
    fn is_regular_file(&self, path: &str) -> Result<bool> {
        match self.kind(path) {
            Ok(kind) => Ok(kind == EntryKind::File),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn check_access(&self, path: &str, modes: &[AccessMode]) -> Result<()> {
        self.kind(path)?;
        if modes.contains(&AccessMode::Write) {
            return Err(GhfsError::ReadOnlyViolation("write access"));
        }
        if modes.contains(&AccessMode::Execute) {
            return Err(GhfsError::ReadOnlyViolation("execute access"));
        }
        Ok(())
    }

    fn create_directory(&self, _path: &str) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("create_directory"))
    }

    fn delete(&self, _path: &str) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("delete"))
    }

    fn copy(&self, _from: &str, _to: &str) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("copy"))
    }

    fn rename(&self, _from: &str, _to: &str) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("rename"))
    }

    fn write(&self, _path: &str, _data: &[u8]) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("write"))
    }

    fn create_symbolic_link(&self, _link: &str, _target: &str) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("create_symbolic_link"))
    }

    fn create_link(&self, _link: &str, _existing: &str) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("create_link"))
    }

    fn set_attribute(&self, _path: &str, _name: &str, _value: AttributeValue) -> Result<()> {
        Err(GhfsError::ReadOnlyViolation("set_attribute"))
    }
}

struct FsInner {
    key: String,
    locator: RepoLocator,
    sequence: u64,
    resolver: PathResolver,
}

/// A read-only view of one repository subtree
///
/// Cheap to clone; clones share identity. Handles are created by
/// [`FilesystemRegistry`](crate::registry::FilesystemRegistry) and stay
/// usable after being closed there, they just can no longer be looked up.
#[derive(Clone)]
pub struct GitHubFileSystem {
    inner: Arc<FsInner>,
}

impl GitHubFileSystem {
    pub(crate) fn new(
        key: String,
        locator: RepoLocator,
        sequence: u64,
        fetcher: Arc<dyn ContentFetcher>,
        options: &FilesystemOptions,
    ) -> Self {
        let memo = options
            .listing_ttl
            .map(|ttl| ListingCache::new(options.listing_cache_capacity, ttl));
        GitHubFileSystem {
            inner: Arc::new(FsInner {
                key,
                locator,
                sequence,
                resolver: PathResolver::new(fetcher, memo),
            }),
        }
    }

    /// Registry key this filesystem was opened under
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn locator(&self) -> &RepoLocator {
        &self.inner.locator
    }

    /// Open order within the owning registry
    pub fn sequence(&self) -> u64 {
        self.inner.sequence
    }

    pub fn root(&self) -> GitHubPath {
        GitHubPath::new(self.clone(), "/")
    }

    /// Parse `path` against this filesystem's root
    pub fn path(&self, path: &str) -> GitHubPath {
        GitHubPath::new(self.clone(), path)
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    /// Identity comparison
    pub fn same(&self, other: &GitHubFileSystem) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Drop memoized listings
    pub fn clear_cache(&self) {
        self.inner.resolver.clear_memo();
    }

    /// Like [`ReadOnlyFs::read_dir`], yielding only entries `filter` accepts
    pub fn read_dir_filtered(&self, path: &str, filter: EntryFilter) -> Result<DirectoryStream> {
        Ok(DirectoryStream::with_filter(self.entries(path)?, filter))
    }

    /// Open the locally cached copy of a file
    pub fn open(&self, path: &str) -> Result<File> {
        let path = self.path(path);
        self.inner.resolver.open(self.locator(), path.as_str())
    }

    fn entries(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let path = self.path(path);
        let listed = self
            .inner
            .resolver
            .listing_entries(self.locator(), path.as_str())?;
        Ok(listed
            .into_iter()
            .map(|entry| DirectoryEntry {
                path: self.path(&entry.fs_path),
                name: entry.name,
                kind: entry.kind,
                size: entry.size,
            })
            .collect())
    }
}

impl ReadOnlyFs for GitHubFileSystem {
    fn exists(&self, path: &str) -> Result<bool> {
        let path = self.path(path);
        self.inner.resolver.exists(self.locator(), path.as_str())
    }

    fn kind(&self, path: &str) -> Result<EntryKind> {
        let path = self.path(path);
        self.inner.resolver.kind(self.locator(), path.as_str())
    }

    fn read_dir(&self, path: &str) -> Result<DirectoryStream> {
        Ok(DirectoryStream::new(self.entries(path)?))
    }

    fn read(&self, path: &str) -> Result<Bytes> {
        let path = self.path(path);
        self.inner.resolver.read(self.locator(), path.as_str())
    }

    fn read_attributes(&self, path: &str) -> Result<AttributeRecord> {
        let path = self.path(path);
        self.inner.resolver.attributes(self.locator(), path.as_str())
    }
}

impl PartialEq for GitHubFileSystem {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for GitHubFileSystem {}

impl fmt::Debug for GitHubFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubFileSystem")
            .field("key", &self.inner.key)
            .field("locator", &self.inner.locator)
            .field("sequence", &self.inner.sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;

    fn filesystem(fetcher: Arc<StaticFetcher>) -> GitHubFileSystem {
        GitHubFileSystem::new(
            "github://github.com/o/r/tree/main".to_string(),
            RepoLocator::new("o", "r", "main", "/"),
            0,
            fetcher,
            &FilesystemOptions::default(),
        )
    }

    #[test]
    fn test_mutators_are_rejected() {
        let fetcher = Arc::new(StaticFetcher::new().unwrap());
        let fs = filesystem(fetcher.clone());

        let results = [
            ("create_directory", fs.create_directory("/a")),
            ("delete", fs.delete("/a")),
            ("copy", fs.copy("/a", "/b")),
            ("rename", fs.rename("/a", "/b")),
            ("write", fs.write("/a", b"data")),
            ("create_symbolic_link", fs.create_symbolic_link("/a", "/b")),
            ("create_link", fs.create_link("/a", "/b")),
            (
                "set_attribute",
                fs.set_attribute("/a", "size", AttributeValue::Size(Some(1))),
            ),
        ];
        for (name, result) in results {
            match result {
                Err(GhfsError::ReadOnlyViolation(op)) => assert_eq!(op, name),
                other => panic!("{name}: expected a read-only violation, got {other:?}"),
            }
        }
        assert_eq!(fetcher.request_count(), 0);
        assert!(fs.is_read_only());
    }

    #[test]
    fn test_check_access() {
        let fetcher = Arc::new(StaticFetcher::new().unwrap().with_text(
            "https://api.github.com/repos/o/r/contents/README.md?ref=main",
            r#"{"path": "README.md", "type": "file", "size": 5}"#,
        ));
        let fs = filesystem(fetcher);

        assert!(fs.check_access("/README.md", &[AccessMode::Read]).is_ok());
        assert!(matches!(
            fs.check_access("/README.md", &[AccessMode::Read, AccessMode::Write]),
            Err(GhfsError::ReadOnlyViolation(_))
        ));
        assert!(matches!(
            fs.check_access("/README.md", &[AccessMode::Execute]),
            Err(GhfsError::ReadOnlyViolation(_))
        ));
        assert!(fs.check_access("/missing", &[AccessMode::Read]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_path_is_neither_file_nor_directory() {
        let fs = filesystem(Arc::new(StaticFetcher::new().unwrap()));
        assert!(!fs.is_directory("/nope").unwrap());
        assert!(!fs.is_regular_file("/nope").unwrap());
        assert!(fs.kind("/nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_clones_share_identity() {
        let fetcher = Arc::new(StaticFetcher::new().unwrap());
        let a = filesystem(fetcher.clone());
        let b = filesystem(fetcher);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.root().as_str(), "/");
    }
}
