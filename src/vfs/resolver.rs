use std::fs::File;
use std::sync::Arc;

use bytes::Bytes;

use super::listing::{ListedEntry, Listing, decode_listing, to_listed_entries};
use super::node::{AttributeRecord, EntryKind};
use super::translate::to_repo_path;
use crate::cache::ListingCache;
use crate::error::{GhfsError, Result};
use crate::fetch::{ContentFetcher, FetchError};
use crate::locator::RepoLocator;

/// Resolves filesystem paths against the remote repository
///
/// Stateless apart from the optional listing memo: every query builds a URL
/// from the locator and asks the fetcher.
pub struct PathResolver {
    fetcher: Arc<dyn ContentFetcher>,
    memo: Option<ListingCache>,
}

impl PathResolver {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, memo: Option<ListingCache>) -> Self {
        PathResolver { fetcher, memo }
    }

    /// Fetch and decode the contents listing for `fs_path`
    pub fn fetch_listing(&self, locator: &RepoLocator, fs_path: &str) -> Result<Listing> {
        let repo_path = to_repo_path(fs_path, locator.base_path());

        if let Some(text) = self.memo.as_ref().and_then(|memo| memo.get(&repo_path)) {
            tracing::debug!(repo_path = %repo_path, "listing memo hit");
            return decode_listing(&text);
        }

        let url = locator.contents_url(&repo_path);
        tracing::trace!(path = fs_path, url = %url, "resolving listing");
        let text = self
            .fetcher
            .fetch_text(&url)
            .map_err(|e| GhfsError::from_fetch(e, fs_path))?;

        let listing = decode_listing(&text)?;
        if let Some(memo) = &self.memo {
            memo.put(repo_path, Arc::from(text));
        }
        Ok(listing)
    }

    /// A 404 means absent; every other failure propagates
    pub fn exists(&self, locator: &RepoLocator, fs_path: &str) -> Result<bool> {
        match self.fetch_listing(locator, fs_path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn kind(&self, locator: &RepoLocator, fs_path: &str) -> Result<EntryKind> {
        Ok(self.fetch_listing(locator, fs_path)?.kind())
    }

    pub fn attributes(&self, locator: &RepoLocator, fs_path: &str) -> Result<AttributeRecord> {
        let listing = self.fetch_listing(locator, fs_path)?;
        let size = match &listing {
            Listing::File(item) => item.size,
            Listing::Directory(_) => None,
        };
        Ok(AttributeRecord {
            kind: listing.kind(),
            size,
            creation_time: None,
            modification_time: None,
        })
    }

    /// Children of a directory, translated back into filesystem paths
    pub fn listing_entries(&self, locator: &RepoLocator, fs_path: &str) -> Result<Vec<ListedEntry>> {
        match self.fetch_listing(locator, fs_path)? {
            Listing::Directory(items) => Ok(to_listed_entries(items, locator.base_path())),
            Listing::File(_) => Err(GhfsError::InvalidArgument(format!(
                "Not a directory: {fs_path}"
            ))),
        }
    }

    /// Read a whole file through the fetcher's local cache
    pub fn read(&self, locator: &RepoLocator, fs_path: &str) -> Result<Bytes> {
        let local = self.cached_copy(locator, fs_path)?;
        let data = std::fs::read(&local)
            .map_err(|e| GhfsError::TransportFailure(FetchError::Io(e)))?;
        Ok(Bytes::from(data))
    }

    /// Open the locally cached copy of a file
    pub fn open(&self, locator: &RepoLocator, fs_path: &str) -> Result<File> {
        let local = self.cached_copy(locator, fs_path)?;
        File::open(&local).map_err(|e| GhfsError::TransportFailure(FetchError::Io(e)))
    }

    fn cached_copy(&self, locator: &RepoLocator, fs_path: &str) -> Result<std::path::PathBuf> {
        let url = locator.raw_url(&to_repo_path(fs_path, locator.base_path()));
        tracing::trace!(path = fs_path, url = %url, "resolving file");
        self.fetcher
            .fetch_and_cache_file(&url)
            .map_err(|e| GhfsError::from_fetch(e, fs_path))
    }

    pub fn clear_memo(&self) {
        if let Some(memo) = &self.memo {
            memo.clear();
        }
    }
}
