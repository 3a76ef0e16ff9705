use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding an API token for the HTTP transport
pub const TOKEN_ENV: &str = "GHFS_TOKEN";
/// Fallback token variable, shared with other GitHub tooling
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Environment variable overriding the file cache directory
pub const CACHE_DIR_ENV: &str = "GHFS_CACHE_DIR";

/// Configuration for creating an HTTP transport
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User-Agent header, required by the GitHub API
    pub user_agent: String,
    /// Optional bearer token attached to every request
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Directory for downloaded files (defaults to the user cache dir)
    pub cache_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("ghfs/{}", env!("CARGO_PKG_VERSION")),
            token: None,
            timeout: Duration::from_secs(10),
            cache_dir: None,
        }
    }
}

impl ClientConfig {
    /// Build the default configuration, then apply environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.token = std::env::var(TOKEN_ENV)
            .or_else(|_| std::env::var(GITHUB_TOKEN_ENV))
            .ok()
            .filter(|t| !t.trim().is_empty());
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        config
    }

    /// Resolve the cache directory, falling back to `<cache>/ghfs`
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("ghfs")
        })
    }
}

/// Options applied to every filesystem a registry opens
#[derive(Debug, Clone)]
pub struct FilesystemOptions {
    /// Memoize listing responses per filesystem for this long (disabled when `None`)
    pub listing_ttl: Option<Duration>,
    /// Maximum number of memoized listings per filesystem
    pub listing_cache_capacity: usize,
}

impl Default for FilesystemOptions {
    fn default() -> Self {
        Self {
            listing_ttl: None,
            listing_cache_capacity: 256,
        }
    }
}
