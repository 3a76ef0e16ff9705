//! Read-only filesystem over GitHub repositories.
//!
//! A [`FilesystemRegistry`] opens a [`GitHubFileSystem`] for a repository
//! locator (browser URL, raw URL, or `github://` URI). Paths in that
//! filesystem are rooted at the locator's base path; listings come from the
//! contents API and file bytes from the raw endpoint, both through a
//! pluggable [`ContentFetcher`].

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod locator;
pub mod logging;
pub mod registry;
pub mod shell;
pub mod ui;
pub mod vfs;

pub use config::{ClientConfig, FilesystemOptions};
pub use error::{GhfsError, Result};
pub use fetch::{ContentFetcher, FetchError, HttpFetcher, StaticFetcher};
pub use locator::RepoLocator;
pub use registry::FilesystemRegistry;
pub use vfs::{GitHubFileSystem, GitHubPath, ReadOnlyFs};
