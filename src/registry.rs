use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{ClientConfig, FilesystemOptions};
use crate::error::{GhfsError, Result};
use crate::fetch::{ContentFetcher, FetchError, HttpFetcher};
use crate::locator::RepoLocator;
use crate::vfs::{GitHubFileSystem, GitHubPath, to_filesystem_path};

/// Registry of open filesystems, keyed by the string they were opened with
///
/// One fetcher is shared by every filesystem the registry opens.
pub struct FilesystemRegistry {
    fetcher: Arc<dyn ContentFetcher>,
    options: FilesystemOptions,
    filesystems: RwLock<HashMap<String, GitHubFileSystem>>,
    next_sequence: AtomicU64,
}

impl FilesystemRegistry {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self::with_options(fetcher, FilesystemOptions::default())
    }

    pub fn with_options(fetcher: Arc<dyn ContentFetcher>, options: FilesystemOptions) -> Self {
        FilesystemRegistry {
            fetcher,
            options,
            filesystems: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Create a registry backed by the HTTP transport
    pub fn with_http(
        config: ClientConfig,
        options: FilesystemOptions,
    ) -> std::result::Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::with_options(Arc::new(fetcher), options))
    }

    /// Open a filesystem for `key`, which must parse as a locator
    pub fn open(&self, key: &str) -> Result<GitHubFileSystem> {
        let locator = RepoLocator::parse(key)?;

        let mut filesystems = self
            .filesystems
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match filesystems.entry(key.to_string()) {
            Entry::Occupied(_) => Err(GhfsError::AlreadyOpen(key.to_string())),
            Entry::Vacant(slot) => {
                let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
                let fs = GitHubFileSystem::new(
                    key.to_string(),
                    locator,
                    sequence,
                    Arc::clone(&self.fetcher),
                    &self.options,
                );
                tracing::info!(key, locator = %fs.locator(), "opened filesystem");
                Ok(slot.insert(fs).clone())
            }
        }
    }

    /// Open a filesystem keyed by the locator's identity URI
    pub fn open_locator(&self, locator: &RepoLocator) -> Result<GitHubFileSystem> {
        self.open(&locator.to_uri())
    }

    pub fn get(&self, key: &str) -> Result<GitHubFileSystem> {
        self.filesystems
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| GhfsError::HandleNotFound(key.to_string()))
    }

    /// Map a URI to a path in the most recently opened filesystem containing it
    pub fn path_for_uri(&self, uri: &str) -> Result<GitHubPath> {
        let target = RepoLocator::parse(uri)?;
        let filesystems = self
            .filesystems
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let fs = filesystems
            .values()
            .filter(|fs| fs.locator().contains(&target))
            .max_by_key(|fs| fs.sequence())
            .ok_or_else(|| GhfsError::HandleNotFound(uri.to_string()))?;

        let fs_path = to_filesystem_path(target.base_path(), fs.locator().base_path());
        Ok(fs.path(&fs_path))
    }

    /// Remove `fs` from the registry; closing twice is a no-op
    pub fn close(&self, fs: &GitHubFileSystem) {
        let removed = {
            let mut filesystems = self
                .filesystems
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let before = filesystems.len();
            filesystems.retain(|_, open| !open.same(fs));
            before - filesystems.len()
        };
        fs.clear_cache();
        if removed > 0 {
            tracing::info!(key = fs.key(), "closed filesystem");
        }
    }

    /// Close every open filesystem
    pub fn close_all(&self) {
        let drained: Vec<GitHubFileSystem> = self
            .filesystems
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, fs)| fs)
            .collect();
        for fs in &drained {
            fs.clear_cache();
        }
        tracing::info!(count = drained.len(), "closed all filesystems");
    }

    pub fn len(&self) -> usize {
        self.filesystems
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of open filesystems, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .filesystems
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
