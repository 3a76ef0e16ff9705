use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use tempfile::TempDir;

use super::{ContentFetcher, FetchError};

/// A canned response for one URL
#[derive(Debug, Clone)]
enum Canned {
    Body(Vec<u8>),
    Status(u16),
}

/// In-memory fetcher serving canned responses keyed by exact URL
///
/// Unknown URLs answer 404, like a server would. Every request is recorded so
/// callers can assert how many round trips an operation cost. Files handed
/// out by [`ContentFetcher::fetch_and_cache_file`] live in a private temp
/// directory removed on drop.
pub struct StaticFetcher {
    responses: RwLock<HashMap<String, Canned>>,
    requests: Mutex<Vec<String>>,
    files: TempDir,
    next_file: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> std::io::Result<Self> {
        Ok(StaticFetcher {
            responses: RwLock::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            files: tempfile::tempdir()?,
            next_file: AtomicUsize::new(0),
        })
    }

    /// Serve `body` for `url`
    pub fn insert_text(&self, url: impl Into<String>, body: impl Into<String>) {
        self.insert(url.into(), Canned::Body(body.into().into_bytes()));
    }

    /// Serve raw bytes for `url`
    pub fn insert_bytes(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.insert(url.into(), Canned::Body(body.into()));
    }

    /// Answer `url` with an HTTP status (404 maps to `NotFound`)
    pub fn insert_status(&self, url: impl Into<String>, status: u16) {
        self.insert(url.into(), Canned::Status(status));
    }

    /// Builder-style [`StaticFetcher::insert_text`]
    pub fn with_text(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert_text(url, body);
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Directory holding files handed out by `fetch_and_cache_file`
    pub fn files_dir(&self) -> &Path {
        self.files.path()
    }

    fn insert(&self, url: String, canned: Canned) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, canned);
    }

    fn respond(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let canned = self
            .responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned();

        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(404)) | None => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
            Some(Canned::Status(status)) => Err(FetchError::Http {
                status,
                url: url.to_string(),
            }),
        }
    }
}

impl ContentFetcher for StaticFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.respond(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn fetch_and_cache_file(&self, url: &str) -> Result<PathBuf, FetchError> {
        let body = self.respond(url)?;
        let name = format!("file-{}", self.next_file.fetch_add(1, Ordering::Relaxed));
        let path = self.files.path().join(name);
        std::fs::write(&path, body)?;
        Ok(path)
    }
}
