use std::io::Write;
use std::path::PathBuf;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tempfile::NamedTempFile;
use url::Url;

use super::{ContentFetcher, FetchError};
use crate::config::ClientConfig;

const LISTING_ACCEPT: &str = "application/vnd.github+json";

/// Blocking HTTP transport backed by reqwest, with an on-disk file cache
pub struct HttpFetcher {
    client: Client,
    token: Option<String>,
    cache_root: PathBuf,
}

impl HttpFetcher {
    /// Create a new fetcher from configuration
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(HttpFetcher {
            client,
            cache_root: config.resolved_cache_dir(),
            token: config.token,
        })
    }

    /// Local path a URL is cached under: `<root>/<host>/<url path...>`
    pub fn cache_path(&self, url: &str) -> Result<PathBuf, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: format!("Invalid URL: {e}"),
        })?;

        let mut path = self.cache_root.join(parsed.host_str().unwrap_or("unknown-host"));
        for segment in parsed.path_segments().into_iter().flatten() {
            if segment.is_empty() || segment == "." || segment == ".." {
                continue;
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn get(&self, url: &str, accept: Option<&str>) -> Result<Response, FetchError> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
            status => Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "fetching listing");
        let response = self.get(url, Some(LISTING_ACCEPT))?;
        let text = response.text().map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: format!("Failed to read response: {e}"),
        })?;
        Ok(text.trim().to_string())
    }

    fn fetch_and_cache_file(&self, url: &str) -> Result<PathBuf, FetchError> {
        let dest = self.cache_path(url)?;
        if dest.is_file() {
            tracing::debug!(url, path = %dest.display(), "file cache hit");
            return Ok(dest);
        }

        tracing::debug!(url, "downloading file");
        let bytes = self
            .get(url, None)?
            .bytes()
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                message: format!("Failed to read response: {e}"),
            })?;

        let parent = dest.parent().unwrap_or(&self.cache_root);
        std::fs::create_dir_all(parent)?;

        // Readers never observe a half-written file
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&dest).map_err(|e| FetchError::Io(e.error))?;

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fetcher_in(dir: &Path) -> HttpFetcher {
        HttpFetcher::new(ClientConfig {
            cache_dir: Some(dir.to_path_buf()),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_cache_path_mirrors_url() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        let path = fetcher
            .cache_path("https://raw.githubusercontent.com/jbangdev/jbang/main/build.gradle")
            .unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("raw.githubusercontent.com")
                .join("jbangdev")
                .join("jbang")
                .join("main")
                .join("build.gradle")
        );
    }

    #[test]
    fn test_cached_copy_is_reused_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        // Unroutable host: a network attempt would fail
        let url = "https://cache-only.invalid/o/r/main/README.md";
        let cached = fetcher.cache_path(url).unwrap();
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, b"hello").unwrap();

        let path = fetcher.fetch_and_cache_file(url).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_url_is_a_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        assert!(matches!(
            fetcher.cache_path("not a url"),
            Err(FetchError::Network { .. })
        ));
    }
}
