use std::fmt;
use std::fs::File;

use bytes::Bytes;

use super::filesystem::{AccessMode, GitHubFileSystem, ReadOnlyFs};
use super::listing::{DirectoryStream, EntryFilter};
use super::node::{AttributeName, AttributeRecord, AttributeValue, EntryKind};
use super::translate::to_repo_path;
use crate::error::Result;
use crate::locator::{RepoLocator, is_within};

/// Normalize a path string into segments, resolving `.` and `..`
/// `..` at the root stays at the root
fn normalize_into(segments: &mut Vec<String>, path: &str) {
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment.to_string()),
        }
    }
}

fn render(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

/// A path in a GitHub filesystem
///
/// Always absolute and normalized, and relative to the filesystem's base
/// path rather than the repository root. Holds no remote state: every query
/// goes back to the owning filesystem.
#[derive(Clone)]
pub struct GitHubPath {
    filesystem: GitHubFileSystem,
    /// Normalized absolute path, `/` for the root
    path: String,
}

impl GitHubPath {
    /// Parse a path string against the root of `filesystem`
    pub fn new(filesystem: GitHubFileSystem, path: &str) -> Self {
        let mut segments = Vec::new();
        normalize_into(&mut segments, path);
        GitHubPath {
            filesystem,
            path: render(&segments),
        }
    }

    pub fn filesystem(&self) -> &GitHubFileSystem {
        &self.filesystem
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path segments (e.g., ["main", "java", "App.java"])
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Get the last segment (filename)
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Get the parent path, `None` at the root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let parent = match self.path.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.path[..pos],
        };
        Some(GitHubPath {
            filesystem: self.filesystem.clone(),
            path: parent.to_string(),
        })
    }

    /// Resolve `other` against this path; absolute inputs start from the root
    pub fn join(&self, other: &str) -> Self {
        let mut segments: Vec<String> = if other.starts_with('/') {
            Vec::new()
        } else {
            self.segments().map(String::from).collect()
        };
        normalize_into(&mut segments, other);
        GitHubPath {
            filesystem: self.filesystem.clone(),
            path: render(&segments),
        }
    }

    /// Whether `other` is this path or lies below it
    pub fn starts_with(&self, other: &GitHubPath) -> bool {
        self.filesystem == other.filesystem
            && is_within(&self.path, &other.path)
    }

    /// Repository-relative path this path maps to
    pub fn repo_path(&self) -> String {
        to_repo_path(&self.path, self.filesystem.locator().base_path())
    }

    /// Raw content URL for this path
    pub fn raw_url(&self) -> String {
        self.filesystem.locator().raw_url(&self.repo_path())
    }

    /// Identity URI of this path: the filesystem locator rebased here
    pub fn to_uri(&self) -> String {
        let locator = self.filesystem.locator();
        RepoLocator::new(
            locator.owner(),
            locator.repo(),
            locator.git_ref(),
            &self.repo_path(),
        )
        .to_uri()
    }

    pub fn exists(&self) -> Result<bool> {
        self.filesystem.exists(&self.path)
    }

    pub fn kind(&self) -> Result<EntryKind> {
        self.filesystem.kind(&self.path)
    }

    pub fn is_directory(&self) -> Result<bool> {
        self.filesystem.is_directory(&self.path)
    }

    pub fn is_regular_file(&self) -> Result<bool> {
        self.filesystem.is_regular_file(&self.path)
    }

    pub fn read_attributes(&self) -> Result<AttributeRecord> {
        self.filesystem.read_attributes(&self.path)
    }

    pub fn read_attribute(&self, name: &str) -> Result<AttributeValue> {
        let name: AttributeName = name.parse()?;
        Ok(self.read_attributes()?.get(name))
    }

    pub fn read_dir(&self) -> Result<DirectoryStream> {
        self.filesystem.read_dir(&self.path)
    }

    pub fn read_dir_filtered(&self, filter: EntryFilter) -> Result<DirectoryStream> {
        self.filesystem.read_dir_filtered(&self.path, filter)
    }

    pub fn read(&self) -> Result<Bytes> {
        self.filesystem.read(&self.path)
    }

    pub fn read_to_string(&self) -> Result<String> {
        let bytes = self.read()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Open the locally cached copy for streaming reads
    pub fn open(&self) -> Result<File> {
        self.filesystem.open(&self.path)
    }

    pub fn check_access(&self, modes: &[AccessMode]) -> Result<()> {
        self.filesystem.check_access(&self.path, modes)
    }
}

impl PartialEq for GitHubPath {
    fn eq(&self, other: &Self) -> bool {
        self.filesystem == other.filesystem && self.path == other.path
    }
}

impl Eq for GitHubPath {}

impl fmt::Debug for GitHubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubPath")
            .field("filesystem", &self.filesystem.key())
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for GitHubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fetch::StaticFetcher;
    use crate::registry::FilesystemRegistry;

    fn filesystem(uri: &str) -> super::GitHubFileSystem {
        let registry = FilesystemRegistry::new(Arc::new(StaticFetcher::new().unwrap()));
        registry.open(uri).unwrap()
    }

    #[test]
    fn test_parse_normalizes() {
        let fs = filesystem("github://github.com/o/r/tree/main/src");
        assert_eq!(fs.path("/main/java/").as_str(), "/main/java");
        assert_eq!(fs.path("main//java/./App.java").as_str(), "/main/java/App.java");
        assert_eq!(fs.path("").as_str(), "/");
        assert_eq!(fs.path("/..").as_str(), "/");
        assert!(fs.path("/").is_root());
    }

    #[test]
    fn test_parent() {
        let fs = filesystem("github://github.com/o/r/tree/main");
        let path = fs.path("/prefix/subdir/file.txt");
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "/prefix/subdir");
        assert_eq!(fs.path("/top").parent().unwrap().as_str(), "/");
        assert!(fs.root().parent().is_none());
    }

    #[test]
    fn test_join() {
        let fs = filesystem("github://github.com/o/r/tree/main");
        let path = fs.path("/prefix");
        assert_eq!(path.join("subdir/file.txt").as_str(), "/prefix/subdir/file.txt");
        assert_eq!(path.join("/abs").as_str(), "/abs");
    }

    #[test]
    fn test_join_with_dotdot() {
        let fs = filesystem("github://github.com/o/r/tree/main");
        let path = fs.path("/prefix/subdir");
        assert_eq!(path.join("../file.txt").as_str(), "/prefix/file.txt");
        assert_eq!(path.join("../../../x").as_str(), "/x");
    }

    #[test]
    fn test_file_name_and_segments() {
        let fs = filesystem("github://github.com/o/r/tree/main");
        let path = fs.path("/a/b/c.txt");
        assert_eq!(path.file_name(), Some("c.txt"));
        assert_eq!(path.segments().collect::<Vec<_>>(), ["a", "b", "c.txt"]);
        assert_eq!(fs.root().file_name(), None);
    }

    #[test]
    fn test_repo_path_and_urls() {
        let fs = filesystem("github://github.com/jbangdev/jbang/tree/main/src");
        let path = fs.path("/main/App.java");
        assert_eq!(path.repo_path(), "/src/main/App.java");
        assert_eq!(
            path.raw_url(),
            "https://raw.githubusercontent.com/jbangdev/jbang/main/src/main/App.java"
        );
        assert_eq!(
            path.to_uri(),
            "github://github.com/jbangdev/jbang/tree/main/src/main/App.java"
        );
        assert_eq!(fs.root().repo_path(), "/src");
    }

    #[test]
    fn test_equality_requires_same_filesystem() {
        let a = filesystem("github://github.com/o/r/tree/main");
        let b = filesystem("github://github.com/o/r/tree/main");
        assert_eq!(a.path("/x"), a.path("x/"));
        assert_ne!(a.path("/x"), b.path("/x"));
        assert!(a.path("/x/y").starts_with(&a.path("/x")));
        assert!(!a.path("/xy").starts_with(&a.path("/x")));
    }
}
