//! Mapping between filesystem paths and repository paths.
//!
//! Filesystem paths are what callers see: absolute, rooted at the locator's
//! base path. Repository paths are what the contents API speaks: rooted at
//! the repository root. For any filesystem path `p` under base `b`,
//! `to_filesystem_path(&to_repo_path(p, b), b) == p`.

fn is_root(base_path: &str) -> bool {
    base_path.is_empty() || base_path == "/"
}

/// Rebase a filesystem path onto `base_path`
pub fn to_repo_path(fs_path: &str, base_path: &str) -> String {
    let base = base_path.trim_end_matches('/');

    if fs_path == "/" {
        return if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        };
    }

    let relative = fs_path.strip_prefix('/').unwrap_or(fs_path);
    if is_root(base_path) {
        format!("/{relative}")
    } else {
        format!("{base}/{relative}")
    }
}

/// Strip `base_path` from a repository path as returned by the contents API
///
/// Paths that do not lie under `base_path` come back unchanged (with a
/// leading slash) and are reported at `warn` level.
pub fn to_filesystem_path(repo_path: &str, base_path: &str) -> String {
    let repo = repo_path.strip_prefix('/').unwrap_or(repo_path);
    if is_root(base_path) {
        return format!("/{repo}");
    }

    let base = base_path.trim_start_matches('/').trim_end_matches('/');
    if let Some(rest) = repo.strip_prefix(base) {
        if rest.is_empty() {
            return "/".to_string();
        }
        if let Some(relative) = rest.strip_prefix('/') {
            return format!("/{relative}");
        }
    }

    tracing::warn!(
        repo_path,
        base_path,
        "repository path lies outside the base path, returning it unchanged"
    );
    format!("/{repo}")
}
