use anyhow::Result;
use colored::*;

use super::output::print_line;
use super::{Command, ShellState};
use crate::shell::completion::CompletionEntry;
use crate::vfs::{DirectoryEntry, EntryKind, GitHubPath};

pub struct LsCommand;

impl Command for LsCommand {
    fn name(&self) -> &str {
        "ls"
    }

    fn usage(&self) -> &str {
        "ls [-l] [PATH] - List directory contents"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let mut long_format = false;
        let mut path_arg: Option<&str> = None;

        for arg in args {
            if arg == "-l" {
                long_format = true;
            } else if !arg.starts_with('-') && path_arg.is_none() {
                path_arg = Some(arg.as_str());
            }
        }

        let (target, filter_pattern) = match path_arg {
            Some(path) if path.contains('*') || path.contains('?') => {
                let (parent, pattern) = match path.rfind('/') {
                    Some(0) => ("/", &path[1..]),
                    Some(pos) => (&path[..pos], &path[pos + 1..]),
                    None => ("", path),
                };
                (state.resolve(parent), Some(pattern.to_string()))
            }
            Some(path) => (state.resolve(path), None),
            None => (state.current_path().clone(), None),
        };

        let attrs = target.read_attributes()?;
        if attrs.kind == EntryKind::File {
            let name = target.file_name().unwrap_or_default();
            if long_format {
                print_line!("{}", Self::long_line(name, EntryKind::File, attrs.size));
            } else {
                print_line!("{name}");
            }
            return Ok(());
        }

        let entries: Vec<DirectoryEntry> = target.read_dir()?.collect();
        Self::remember_completions(state, &target, &entries);

        if long_format {
            print_line!("{:<50} {:>12} TYPE", "NAME", "SIZE");
            print_line!("{}", "-".repeat(70));
        }
        for entry in entries
            .iter()
            .filter(|e| Self::should_display(&e.name, &filter_pattern))
        {
            if long_format {
                print_line!("{}", Self::long_line(&entry.name, entry.kind, entry.size));
            } else if entry.is_dir() {
                print_line!("{}", format!("{}/", entry.name).blue().bold());
            } else {
                print_line!("{}", entry.name);
            }
        }
        Ok(())
    }
}

impl LsCommand {
    fn long_line(name: &str, kind: EntryKind, size: Option<u64>) -> String {
        let size_str = size
            .map(|s| humansize::format_size(s, humansize::BINARY))
            .unwrap_or_else(|| "-".to_string());
        match kind {
            EntryKind::Directory => format!(
                "{:<50} {:>12} {}",
                format!("{name}/").blue().bold(),
                size_str,
                kind
            ),
            EntryKind::File => format!("{name:<50} {size_str:>12} {kind}"),
        }
    }

    /// Seed tab completion with a listing we already paid for
    fn remember_completions(state: &ShellState, dir: &GitHubPath, entries: &[DirectoryEntry]) {
        let completions = entries
            .iter()
            .map(|e| CompletionEntry {
                name: e.name.clone(),
                is_dir: e.is_dir(),
            })
            .collect();
        state
            .completion_cache()
            .update_entries(dir.as_str().to_string(), completions);
    }

    /// Check if a filename should be displayed given an optional filter pattern
    fn should_display(filename: &str, filter_pattern: &Option<String>) -> bool {
        match filter_pattern {
            Some(pattern) => Self::matches_pattern(filename, pattern),
            None => true,
        }
    }

    /// Match a filename against a simple wildcard pattern (* and ?)
    pub fn matches_pattern(filename: &str, pattern: &str) -> bool {
        let name: Vec<char> = filename.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        Self::matches_chars(&name, &pattern)
    }

    fn matches_chars(name: &[char], pattern: &[char]) -> bool {
        match (pattern.first(), name.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                let rest = &pattern[1..];
                (0..=name.len()).any(|skip| Self::matches_chars(&name[skip..], rest))
            }
            (Some('?'), Some(_)) => Self::matches_chars(&name[1..], &pattern[1..]),
            (Some(p), Some(n)) if p == n => Self::matches_chars(&name[1..], &pattern[1..]),
            _ => false,
        }
    }
}
