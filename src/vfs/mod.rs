pub mod filesystem;
pub mod listing;
pub mod node;
pub mod path;
pub mod resolver;
pub mod translate;

pub use filesystem::{AccessMode, GitHubFileSystem, ReadOnlyFs};
pub use listing::{DirectoryStream, EntryFilter};
pub use node::{AttributeName, AttributeRecord, AttributeValue, DirectoryEntry, EntryKind};
pub use path::GitHubPath;
pub use resolver::PathResolver;
pub use translate::{to_filesystem_path, to_repo_path};
