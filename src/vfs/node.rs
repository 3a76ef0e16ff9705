use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::GitHubPath;
use crate::error::GhfsError;

/// Kind of a remote entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Classify the contents API `type` field
    /// Symlinks and submodules read as files; unknown types are rejected
    pub fn from_api_type(kind: &str) -> Option<Self> {
        match kind {
            "dir" => Some(EntryKind::Directory),
            "file" | "symlink" | "submodule" => Some(EntryKind::File),
            _ => None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// One child produced while decoding a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: GitHubPath,
    pub kind: EntryKind,
    /// Size reported by the listing, files only
    pub size: Option<u64>,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Attributes of a single path, derived per query and never cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub kind: EntryKind,
    pub size: Option<u64>,
    /// The contents API reports no timestamps; kept for host adapters
    pub creation_time: Option<DateTime<Utc>>,
    pub modification_time: Option<DateTime<Utc>>,
}

impl AttributeRecord {
    pub fn is_directory(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_regular_file(&self) -> bool {
        !self.kind.is_dir()
    }

    /// Look up one named attribute
    pub fn get(&self, name: AttributeName) -> AttributeValue {
        match name {
            AttributeName::Size => AttributeValue::Size(self.size),
            AttributeName::CreationTime => AttributeValue::Time(self.creation_time),
            AttributeName::LastModifiedTime => AttributeValue::Time(self.modification_time),
            AttributeName::IsRegularFile => AttributeValue::Flag(self.is_regular_file()),
            AttributeName::IsDirectory => AttributeValue::Flag(self.is_directory()),
            AttributeName::IsSymbolicLink | AttributeName::IsOther => AttributeValue::Flag(false),
        }
    }
}

/// Fixed set of queryable attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeName {
    Size,
    CreationTime,
    LastModifiedTime,
    IsRegularFile,
    IsDirectory,
    IsSymbolicLink,
    IsOther,
}

impl FromStr for AttributeName {
    type Err = GhfsError;

    /// Accepts bare names and the `basic:` view prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("basic:").unwrap_or(s);
        match name {
            "size" => Ok(AttributeName::Size),
            "creationTime" => Ok(AttributeName::CreationTime),
            "lastModifiedTime" => Ok(AttributeName::LastModifiedTime),
            "isRegularFile" => Ok(AttributeName::IsRegularFile),
            "isDirectory" => Ok(AttributeName::IsDirectory),
            "isSymbolicLink" => Ok(AttributeName::IsSymbolicLink),
            "isOther" => Ok(AttributeName::IsOther),
            _ => Err(GhfsError::InvalidArgument(format!(
                "unknown attribute name: {s}"
            ))),
        }
    }
}

/// Value of a single named attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Size(Option<u64>),
    Time(Option<DateTime<Utc>>),
    Flag(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_type_classification() {
        assert_eq!(EntryKind::from_api_type("dir"), Some(EntryKind::Directory));
        assert_eq!(EntryKind::from_api_type("file"), Some(EntryKind::File));
        assert_eq!(EntryKind::from_api_type("symlink"), Some(EntryKind::File));
        assert_eq!(EntryKind::from_api_type("submodule"), Some(EntryKind::File));
        assert_eq!(EntryKind::from_api_type("blob"), None);
    }

    #[test]
    fn test_attribute_names() {
        assert_eq!("size".parse::<AttributeName>().unwrap(), AttributeName::Size);
        assert_eq!(
            "basic:isDirectory".parse::<AttributeName>().unwrap(),
            AttributeName::IsDirectory
        );
        assert!(matches!(
            "owner".parse::<AttributeName>(),
            Err(GhfsError::InvalidArgument(_))
        ));
        assert!("posix:size".parse::<AttributeName>().is_err());
    }

    #[test]
    fn test_attribute_lookup() {
        let record = AttributeRecord {
            kind: EntryKind::File,
            size: Some(42),
            creation_time: None,
            modification_time: None,
        };
        assert_eq!(record.get(AttributeName::Size), AttributeValue::Size(Some(42)));
        assert_eq!(
            record.get(AttributeName::IsRegularFile),
            AttributeValue::Flag(true)
        );
        assert_eq!(
            record.get(AttributeName::IsDirectory),
            AttributeValue::Flag(false)
        );
        assert_eq!(
            record.get(AttributeName::LastModifiedTime),
            AttributeValue::Time(None)
        );
    }
}
