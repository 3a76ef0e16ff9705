//! Repository locators.
//!
//! A [`RepoLocator`] names a subtree of a GitHub repository at a given ref.
//! It can be parsed from browser URLs (`tree`/`blob`), raw-content URLs, and
//! the `github://` identity URI, and always serializes back to the identity
//! form.
//!
//! Locators hold decoded paths, matching what the contents API returns.
//! Encoding happens only when a URL is built.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::error::{GhfsError, Result};

/// Scheme of the identity URI
pub const SCHEME: &str = "github";
pub const GITHUB_HOST: &str = "github.com";
pub const RAW_HOST: &str = "raw.githubusercontent.com";
/// Base of the contents (listing) endpoint
pub const API_BASE: &str = "https://api.github.com/repos";
/// Base of the raw file endpoint
pub const RAW_BASE: &str = "https://raw.githubusercontent.com";
/// Ref used when an input omits one
pub const DEFAULT_REF: &str = "main";

/// Characters escaped inside a path; `/` stays a separator
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &PATH.add(b'/');

/// Characters escaped inside a query value
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>');

/// Owner, repository, ref and base path of a remote subtree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoLocator {
    owner: String,
    repo: String,
    git_ref: String,
    /// Always absolute; `/` for the repository root, never a trailing slash
    base_path: String,
}

impl RepoLocator {
    /// Create a locator, normalizing `base_path`
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
        base_path: &str,
    ) -> Self {
        RepoLocator {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            base_path: normalize_base_path(base_path),
        }
    }

    /// Parse any accepted URL or URI shape
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim())
            .map_err(|e| GhfsError::InvalidLocator(format!("{input}: {e}")))?;

        let decoded = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(|s| decode_segment(input, s))
            .collect::<Result<Vec<String>>>()?;
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

        match (url.scheme(), url.host_str().unwrap_or_default()) {
            (SCHEME, GITHUB_HOST) => Self::from_browse_segments(input, &segments, true),
            ("https", GITHUB_HOST) => Self::from_browse_segments(input, &segments, false),
            ("https", RAW_HOST) => Self::from_raw_segments(input, &segments),
            (scheme, host) => Err(GhfsError::InvalidLocator(format!(
                "{input}: unsupported scheme/host {scheme}://{host}"
            ))),
        }
    }

    /// `{owner}/{repo}[/tree|blob/{ref}][/{path...}]`; the identity URI also
    /// accepts a bare `{ref}` directly after the repository
    fn from_browse_segments(input: &str, segments: &[&str], bare_ref: bool) -> Result<Self> {
        let (owner, repo, rest) = split_owner_repo(input, segments)?;

        let (git_ref, path): (&str, &[&str]) = match rest {
            [keyword, git_ref, path @ ..] if is_keyword(keyword) => (*git_ref, path),
            [keyword] if is_keyword(keyword) => (DEFAULT_REF, &[][..]),
            [git_ref, path @ ..] if bare_ref => (*git_ref, path),
            _ => (DEFAULT_REF, &[][..]),
        };

        Ok(Self::new(owner, repo, git_ref, &path.join("/")))
    }

    /// `{owner}/{repo}/{ref}/{path...}`
    fn from_raw_segments(input: &str, segments: &[&str]) -> Result<Self> {
        let (owner, repo, rest) = split_owner_repo(input, segments)?;
        let (git_ref, path): (&str, &[&str]) = match rest {
            [git_ref, path @ ..] => (*git_ref, path),
            [] => (DEFAULT_REF, &[][..]),
        };
        Ok(Self::new(owner, repo, git_ref, &path.join("/")))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Serialize to the identity URI, always in the `tree` form
    pub fn to_uri(&self) -> String {
        let base = if self.base_path == "/" {
            String::new()
        } else {
            encode_path(&self.base_path)
        };
        format!(
            "{SCHEME}://{GITHUB_HOST}/{}/{}/tree/{}{}",
            encode_segment(&self.owner),
            encode_segment(&self.repo),
            encode_segment(&self.git_ref),
            base
        )
    }

    /// Contents endpoint for a repository-relative path
    pub fn contents_url(&self, repo_path: &str) -> String {
        format!(
            "{API_BASE}/{}/{}/contents{}?ref={}",
            encode_segment(&self.owner),
            encode_segment(&self.repo),
            encode_path(repo_path),
            utf8_percent_encode(&self.git_ref, QUERY_VALUE)
        )
    }

    /// Raw content URL for a repository-relative path
    pub fn raw_url(&self, repo_path: &str) -> String {
        format!(
            "{RAW_BASE}/{}/{}/{}{}",
            encode_segment(&self.owner),
            encode_segment(&self.repo),
            utf8_percent_encode(&self.git_ref, PATH),
            encode_path(repo_path)
        )
    }

    /// Whether `other` names this subtree or something below it
    pub fn contains(&self, other: &RepoLocator) -> bool {
        self.owner == other.owner
            && self.repo == other.repo
            && self.git_ref == other.git_ref
            && is_within(&other.base_path, &self.base_path)
    }
}

impl fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for RepoLocator {
    type Err = GhfsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Normalize a base path: leading `/`, no trailing or doubled slashes,
/// `""` and `/` both become `/`
pub fn normalize_base_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Component-wise prefix test on absolute paths
pub(crate) fn is_within(path: &str, base: &str) -> bool {
    if base == "/" {
        return true;
    }
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn is_keyword(segment: &str) -> bool {
    segment == "tree" || segment == "blob"
}

/// Percent-encode a repository path segment by segment, with a leading `/`
fn encode_path(path: &str) -> String {
    let encoded = utf8_percent_encode(path.trim_start_matches('/'), PATH).to_string();
    format!("/{encoded}")
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn decode_segment(input: &str, segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| GhfsError::InvalidLocator(format!("{input}: {e}")))
}

fn split_owner_repo<'a, 'b>(
    input: &str,
    segments: &'b [&'a str],
) -> Result<(&'a str, &'a str, &'b [&'a str])> {
    match segments {
        [owner, repo, rest @ ..] => Ok((*owner, *repo, rest)),
        _ => Err(GhfsError::InvalidLocator(format!(
            "{input}: expected /{{owner}}/{{repo}} after the host"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parts(locator: &RepoLocator) -> (&str, &str, &str, &str) {
        (
            locator.owner(),
            locator.repo(),
            locator.git_ref(),
            locator.base_path(),
        )
    }

    #[test]
    fn test_parse_tree_url() {
        let locator = RepoLocator::parse("https://github.com/jbangdev/jbang/tree/main/src").unwrap();
        assert_eq!(parts(&locator), ("jbangdev", "jbang", "main", "/src"));
    }

    #[test]
    fn test_parse_blob_url() {
        let locator =
            RepoLocator::parse("https://github.com/jbangdev/jbang/blob/main/src/App.java").unwrap();
        assert_eq!(parts(&locator), ("jbangdev", "jbang", "main", "/src/App.java"));
    }

    #[test]
    fn test_parse_raw_url() {
        let locator = RepoLocator::parse(
            "https://raw.githubusercontent.com/jbangdev/jbang/branch/path/to/file.java",
        )
        .unwrap();
        assert_eq!(
            parts(&locator),
            ("jbangdev", "jbang", "branch", "/path/to/file.java")
        );
    }

    #[test]
    fn test_parse_repo_url_defaults_ref_and_root() {
        let locator = RepoLocator::parse("https://github.com/jbangdev/jbang").unwrap();
        assert_eq!(parts(&locator), ("jbangdev", "jbang", "main", "/"));

        let locator = RepoLocator::parse("https://github.com/jbangdev/jbang/tree").unwrap();
        assert_eq!(locator.git_ref(), "main");
    }

    #[test]
    fn test_parse_identity_forms() {
        let tree = RepoLocator::parse("github://github.com/o/r/tree/v1.2/a/b").unwrap();
        let blob = RepoLocator::parse("github://github.com/o/r/blob/v1.2/a/b").unwrap();
        let bare = RepoLocator::parse("github://github.com/o/r/v1.2/a/b").unwrap();
        assert_eq!(parts(&tree), ("o", "r", "v1.2", "/a/b"));
        assert_eq!(tree, blob);
        assert_eq!(tree, bare);

        let root = RepoLocator::parse("github://github.com/o/r").unwrap();
        assert_eq!(parts(&root), ("o", "r", "main", "/"));
    }

    #[test]
    fn test_equivalent_inputs_agree() {
        let a = RepoLocator::parse("https://github.com/o/r/tree/dev/src/").unwrap();
        let b = RepoLocator::parse("https://raw.githubusercontent.com/o/r/dev/src").unwrap();
        let c = RepoLocator::parse("github://github.com/o/r/tree/dev/src").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_parse_rejects_bad_inputs() {
        for input in [
            "not a url",
            "http://github.com/o/r",
            "https://gitlab.com/o/r",
            "github://example.com/o/r/tree/main",
            "https://github.com/only-owner",
            "github://github.com/",
            "https://raw.githubusercontent.com/o",
        ] {
            assert!(
                matches!(RepoLocator::parse(input), Err(GhfsError::InvalidLocator(_))),
                "expected InvalidLocator for {input}"
            );
        }
    }

    #[test]
    fn test_to_uri_round_trip() {
        let locator = RepoLocator::new("jbangdev", "jbang", "main", "src");
        assert_eq!(locator.to_uri(), "github://github.com/jbangdev/jbang/tree/main/src");
        assert_eq!(RepoLocator::parse(&locator.to_uri()).unwrap(), locator);

        let root = RepoLocator::new("jbangdev", "jbang", "main", "/");
        assert_eq!(root.to_uri(), "github://github.com/jbangdev/jbang/tree/main");
        assert_eq!(root.to_string().parse::<RepoLocator>().unwrap(), root);
    }

    #[test]
    fn test_base_path_normalization() {
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("src"), "/src");
        assert_eq!(normalize_base_path("/src/"), "/src");
        assert_eq!(normalize_base_path("a//b/"), "/a/b");
        assert_eq!(
            RepoLocator::new("owner", "repo", "main", "src"),
            RepoLocator::new("owner", "repo", "main", "/src")
        );
    }

    #[test]
    fn test_endpoint_urls() {
        let locator = RepoLocator::new("jbangdev", "jbang", "main", "/src");
        assert_eq!(
            locator.contents_url("/src/main"),
            "https://api.github.com/repos/jbangdev/jbang/contents/src/main?ref=main"
        );
        assert_eq!(
            locator.raw_url("/build.gradle"),
            "https://raw.githubusercontent.com/jbangdev/jbang/main/build.gradle"
        );
        assert_eq!(
            locator.contents_url("src"),
            "https://api.github.com/repos/jbangdev/jbang/contents/src?ref=main"
        );
    }

    #[test]
    fn test_contains() {
        let root = RepoLocator::new("o", "r", "main", "/");
        let src = RepoLocator::new("o", "r", "main", "/src");
        let nested = RepoLocator::new("o", "r", "main", "/src/main");
        let sibling = RepoLocator::new("o", "r", "main", "/srcfoo");
        let other_ref = RepoLocator::new("o", "r", "dev", "/src");

        assert!(root.contains(&src));
        assert!(src.contains(&src));
        assert!(src.contains(&nested));
        assert!(!src.contains(&sibling));
        assert!(!src.contains(&root));
        assert!(!src.contains(&other_ref));
    }

    #[test]
    fn test_parse_decodes_path_segments() {
        let locator = RepoLocator::parse("https://github.com/o/r/tree/main/my%20dir").unwrap();
        assert_eq!(locator.base_path(), "/my dir");
        assert_eq!(locator.to_uri(), "github://github.com/o/r/tree/main/my%20dir");
        assert_eq!(RepoLocator::parse(&locator.to_uri()).unwrap(), locator);

        let raw = RepoLocator::parse("https://raw.githubusercontent.com/o/r/main/docs/C%23").unwrap();
        assert_eq!(raw.base_path(), "/docs/C#");
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        assert!(matches!(
            RepoLocator::parse("https://github.com/o/r/tree/main/%FF"),
            Err(GhfsError::InvalidLocator(_))
        ));
    }

    #[test]
    fn test_endpoint_urls_escape_special_characters() {
        let locator = RepoLocator::new("o", "r", "v1.0", "/");
        let contents = locator.contents_url("/docs/C#");
        assert_eq!(
            contents,
            "https://api.github.com/repos/o/r/contents/docs/C%23?ref=v1.0"
        );
        let parsed = Url::parse(&contents).unwrap();
        assert_eq!(parsed.path(), "/repos/o/r/contents/docs/C%23");
        assert_eq!(parsed.query(), Some("ref=v1.0"));
        assert_eq!(parsed.fragment(), None);

        assert_eq!(
            locator.contents_url("/a b/100%?/x"),
            "https://api.github.com/repos/o/r/contents/a%20b/100%25%3F/x?ref=v1.0"
        );
        assert_eq!(
            locator.raw_url("/docs/C#/Program.cs"),
            "https://raw.githubusercontent.com/o/r/v1.0/docs/C%23/Program.cs"
        );

        let branch = RepoLocator::new("o", "r", "feature/a&b", "/");
        assert_eq!(
            branch.contents_url("/"),
            "https://api.github.com/repos/o/r/contents/?ref=feature/a%26b"
        );
    }

    fn name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-][A-Za-z0-9._-]{0,11}"
    }

    fn path_segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_#?%+-][A-Za-z0-9 ._#?%+-]{0,8}"
    }

    fn locator() -> impl Strategy<Value = RepoLocator> {
        (
            name(),
            name(),
            name(),
            prop::collection::vec(path_segment(), 0..4),
        )
            .prop_map(|(owner, repo, git_ref, segments)| {
                RepoLocator::new(owner, repo, git_ref, &segments.join("/"))
            })
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(path in ".*") {
            let once = normalize_base_path(&path);
            prop_assert_eq!(normalize_base_path(&once), once);
        }

        #[test]
        fn prop_identity_uri_round_trip(locator in locator()) {
            prop_assert_eq!(RepoLocator::parse(&locator.to_uri()).unwrap(), locator);
        }
    }
}
