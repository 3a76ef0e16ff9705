use anyhow::{Result, anyhow};
use colored::*;

use super::output::print_line;
use super::{Command, ShellState};

pub struct StatCommand;

impl Command for StatCommand {
    fn name(&self) -> &str {
        "stat"
    }

    fn usage(&self) -> &str {
        "stat PATH - Show type and size of a path"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let Some(path_str) = args.first() else {
            return Err(anyhow!("Usage: stat PATH"));
        };

        let target = state.resolve(path_str);
        let attrs = target.read_attributes()?;

        let size = attrs
            .size
            .map(|s| format!("{s} ({})", humansize::format_size(s, humansize::BINARY)))
            .unwrap_or_else(|| "-".to_string());
        let time = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
        };

        print_line!("{:<10} {}", "path".bold(), target);
        print_line!("{:<10} {}", "repo path".bold(), target.repo_path());
        print_line!("{:<10} {}", "type".bold(), attrs.kind);
        print_line!("{:<10} {}", "size".bold(), size);
        print_line!("{:<10} {}", "created".bold(), time(attrs.creation_time));
        print_line!("{:<10} {}", "modified".bold(), time(attrs.modification_time));
        if attrs.is_regular_file() {
            print_line!("{:<10} {}", "raw url".bold(), target.raw_url());
        }
        Ok(())
    }
}
