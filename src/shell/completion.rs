use rustyline::Context;
use rustyline::completion::{Completer, Pair};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::vfs::GitHubPath;

/// Entry in completion cache with metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionEntry {
    pub name: String,
    pub is_dir: bool,
}

const COMMANDS: &[&str] = &["ls", "cd", "cat", "stat", "pwd", "info", "help", "exit", "quit"];

/// Cache of available completions for different directories
///
/// Shared between the shell state and the line editor. Entries are fetched
/// lazily the first time a directory is completed and kept for the session.
#[derive(Clone)]
pub struct CompletionCache {
    /// Directory path -> entries
    entries: Arc<RwLock<HashMap<String, Vec<CompletionEntry>>>>,
    current: Arc<RwLock<GitHubPath>>,
}

impl CompletionCache {
    pub fn new(current: GitHubPath) -> Self {
        CompletionCache {
            entries: Arc::new(RwLock::new(HashMap::new())),
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn set_current_path(&self, path: GitHubPath) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = path;
    }

    pub fn current_path(&self) -> GitHubPath {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_entries(&self, path: String, entries: Vec<CompletionEntry>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, entries);
    }

    pub fn get_entries(&self, path: &str) -> Option<Vec<CompletionEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Cached entries for `dir`, listing it remotely on a miss
    ///
    /// Failures complete to nothing; they are not cached.
    pub fn entries_for(&self, dir: &GitHubPath) -> Vec<CompletionEntry> {
        if let Some(cached) = self.get_entries(dir.as_str()) {
            return cached;
        }
        match dir.read_dir() {
            Ok(stream) => {
                let entries: Vec<_> = stream
                    .map(|e| CompletionEntry {
                        is_dir: e.is_dir(),
                        name: e.name,
                    })
                    .collect();
                self.update_entries(dir.as_str().to_string(), entries.clone());
                entries
            }
            Err(e) => {
                tracing::debug!(path = %dir, error = %e, "completion listing failed");
                Vec::new()
            }
        }
    }
}

/// Tab completion helper for the shell
pub struct ShellCompleter {
    cache: CompletionCache,
}

impl ShellCompleter {
    pub fn new(cache: CompletionCache) -> Self {
        ShellCompleter { cache }
    }

    /// Complete a command at the start of the line
    fn complete_command(&self, word: &str) -> Vec<Pair> {
        COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(word))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect()
    }

    /// Complete a path argument; `cd` only offers directories
    fn complete_path(&self, path: &str, command: &str) -> Vec<Pair> {
        // Split at the last slash, keeping it on the directory part
        let (dir_part, file_prefix) = match path.rfind('/') {
            Some(pos) => path.split_at(pos + 1),
            None => ("", path),
        };

        let dir = self.cache.current_path().join(dir_part);
        self.cache
            .entries_for(&dir)
            .into_iter()
            .filter(|entry| entry.name.starts_with(file_prefix))
            .filter(|entry| command != "cd" || entry.is_dir)
            .map(|entry| {
                let suffix = if entry.is_dir { "/" } else { "" };
                Pair {
                    replacement: format!("{dir_part}{}{suffix}", entry.name),
                    display: format!("{}{suffix}", entry.name),
                }
            })
            .collect()
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(command) = words.first().copied() else {
            return Ok((0, Vec::new()));
        };

        // Still typing the command name
        if words.len() == 1 && !line.ends_with(char::is_whitespace) {
            let start = line.len() - command.len();
            return Ok((start, self.complete_command(command)));
        }

        // Complete the word under the cursor, which is empty after a space
        let word = if line.ends_with(char::is_whitespace) {
            ""
        } else {
            words.last().copied().unwrap_or_default()
        };
        Ok((pos - word.len(), self.complete_path(word, command)))
    }
}

impl rustyline::Helper for ShellCompleter {}
impl rustyline::highlight::Highlighter for ShellCompleter {}
impl rustyline::hint::Hinter for ShellCompleter {
    type Hint = String;
}
impl rustyline::validate::Validator for ShellCompleter {}
