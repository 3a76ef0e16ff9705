//! Decoding of contents API responses.
//!
//! A directory answers with a JSON array of records, a file with a single
//! record. Each record must carry a string `path` (repository-relative, no
//! leading slash) and a string `type`. Anything else aborts decoding of the
//! whole response.

use serde::Deserialize;
use serde_json::Value;

use super::node::{DirectoryEntry, EntryKind};
use super::translate::to_filesystem_path;
use crate::error::{GhfsError, Result};

#[derive(Debug, Deserialize)]
struct RawItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    size: Option<u64>,
}

/// One validated record of a contents response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Repository-relative path exactly as returned
    pub path: String,
    pub name: Option<String>,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

/// A decoded contents response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Children in remote order
    Directory(Vec<RemoteItem>),
    File(RemoteItem),
}

impl Listing {
    pub fn kind(&self) -> EntryKind {
        match self {
            Listing::Directory(_) => EntryKind::Directory,
            Listing::File(item) => item.kind,
        }
    }
}

/// A child translated back into filesystem terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub fs_path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

/// Decode listing text
pub fn decode_listing(text: &str) -> Result<Listing> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| GhfsError::MalformedRemoteResponse(format!("invalid JSON: {e}")))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                decode_item(item).map_err(|e| {
                    GhfsError::MalformedRemoteResponse(format!("listing entry {index}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Listing::Directory),
        Value::Object(_) => decode_item(value)
            .map(Listing::File)
            .map_err(GhfsError::MalformedRemoteResponse),
        other => Err(GhfsError::MalformedRemoteResponse(format!(
            "expected an array or an object, got {}",
            json_type(&other)
        ))),
    }
}

fn decode_item(value: Value) -> std::result::Result<RemoteItem, String> {
    let raw: RawItem = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let kind = EntryKind::from_api_type(&raw.kind)
        .ok_or_else(|| format!("unknown entry type `{}` for {}", raw.kind, raw.path))?;
    Ok(RemoteItem {
        path: raw.path,
        name: raw.name,
        kind,
        size: raw.size,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Translate directory records into filesystem entries, preserving order
pub fn to_listed_entries(items: Vec<RemoteItem>, base_path: &str) -> Vec<ListedEntry> {
    items
        .into_iter()
        .map(|item| {
            let fs_path = to_filesystem_path(&item.path, base_path);
            let name = item.name.unwrap_or_else(|| {
                fs_path
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });
            ListedEntry {
                name,
                fs_path,
                kind: item.kind,
                size: item.size,
            }
        })
        .collect()
}

/// Filter applied while iterating a [`DirectoryStream`]
pub type EntryFilter = Box<dyn FnMut(&DirectoryEntry) -> Result<bool> + Send>;

/// Single-pass iterator over the children of one directory
///
/// The listing is fetched in full before the stream is handed out, so the
/// stream itself never touches the network. When a filter fails on an entry
/// that entry is skipped and iteration continues.
pub struct DirectoryStream {
    entries: std::vec::IntoIter<DirectoryEntry>,
    filter: Option<EntryFilter>,
}

impl std::fmt::Debug for DirectoryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryStream")
            .field("entries", &self.entries)
            .field("filter", &self.filter.as_ref().map(|_| "<filter>"))
            .finish()
    }
}

impl DirectoryStream {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        DirectoryStream {
            entries: entries.into_iter(),
            filter: None,
        }
    }

    pub fn with_filter(entries: Vec<DirectoryEntry>, filter: EntryFilter) -> Self {
        DirectoryStream {
            entries: entries.into_iter(),
            filter: Some(filter),
        }
    }
}

impl Iterator for DirectoryStream {
    type Item = DirectoryEntry;

    fn next(&mut self) -> Option<DirectoryEntry> {
        for entry in self.entries.by_ref() {
            let Some(filter) = self.filter.as_mut() else {
                return Some(entry);
            };
            match filter(&entry) {
                Ok(true) => return Some(entry),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(path = %entry.path, error = %e, "filter failed, skipping entry");
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for DirectoryStream {}
