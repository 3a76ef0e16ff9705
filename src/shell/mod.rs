pub mod commands;
pub mod completion;

use anyhow::{Result, anyhow};
use colored::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::registry::FilesystemRegistry;
use crate::vfs::{GitHubFileSystem, GitHubPath};
use commands::Command;
pub use completion::{CompletionCache, ShellCompleter};

/// Returned by `exit`/`quit` so the REPL can stop cleanly
#[derive(Debug, thiserror::Error)]
#[error("exit")]
pub struct ExitRequested;

/// Shell state - tracks current location and provides command execution
pub struct ShellState {
    registry: Arc<FilesystemRegistry>,
    filesystem: GitHubFileSystem,
    /// Current directory
    current: GitHubPath,
    /// Tab completion cache
    completion_cache: CompletionCache,
    /// Registered commands
    commands: HashMap<String, Arc<dyn Command>>,
}

impl ShellState {
    /// Open `locator` in `registry` and start at its root
    pub fn new(registry: Arc<FilesystemRegistry>, locator: &str) -> Result<Self> {
        let filesystem = registry.open(locator)?;
        Ok(Self::from_filesystem(registry, filesystem))
    }

    /// Create shell state over an already open filesystem
    pub fn from_filesystem(registry: Arc<FilesystemRegistry>, filesystem: GitHubFileSystem) -> Self {
        let current = filesystem.root();
        let completion_cache = CompletionCache::new(current.clone());

        let mut state = ShellState {
            registry,
            filesystem,
            current,
            completion_cache,
            commands: HashMap::new(),
        };

        state.register_command(Arc::new(commands::ls::LsCommand));
        state.register_command(Arc::new(commands::cd::CdCommand));
        state.register_command(Arc::new(commands::cat::CatCommand));
        state.register_command(Arc::new(commands::stat::StatCommand));

        state
    }

    fn register_command(&mut self, command: Arc<dyn Command>) {
        self.commands.insert(command.name().to_string(), command);
    }

    /// Execute a command line
    pub fn execute(&mut self, line: &str) -> Result<()> {
        let parts = Self::parse_command_line(line.trim())?;

        let Some((cmd_name, args)) = parts.split_first() else {
            return Ok(());
        };

        match cmd_name.as_str() {
            "exit" | "quit" => return Err(ExitRequested.into()),
            "help" => {
                self.print_help();
                return Ok(());
            }
            "pwd" => {
                println!("{}", self.current);
                return Ok(());
            }
            "info" => {
                self.print_info();
                return Ok(());
            }
            _ => {}
        }

        if let Some(command) = self.commands.get(cmd_name) {
            let cmd = Arc::clone(command);
            cmd.execute(self, args)
        } else {
            Err(anyhow!("Unknown command: {cmd_name}"))
        }
    }

    pub fn filesystem(&self) -> &GitHubFileSystem {
        &self.filesystem
    }

    pub fn current_path(&self) -> &GitHubPath {
        &self.current
    }

    pub fn set_current_path(&mut self, path: GitHubPath) {
        self.completion_cache.set_current_path(path.clone());
        self.current = path;
    }

    /// Resolve a command argument against the current directory
    pub fn resolve(&self, arg: &str) -> GitHubPath {
        self.current.join(arg)
    }

    pub fn completion_cache(&self) -> &CompletionCache {
        &self.completion_cache
    }

    fn print_help(&self) {
        println!("Available commands:");
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();
        for name in names {
            if let Some(command) = self.commands.get(name) {
                println!("  {}", command.usage());
            }
        }
        println!("  pwd - Print working directory");
        println!("  info - Show the open repository");
        println!("  help - Show this help");
        println!("  exit/quit - Exit the shell");
        println!();
        println!("`ls` accepts * and ? in the last path segment.");
    }

    fn print_info(&self) {
        let locator = self.filesystem.locator();
        println!("{:<12} {}/{}", "repository".bold(), locator.owner(), locator.repo());
        println!("{:<12} {}", "ref".bold(), locator.git_ref());
        println!("{:<12} {}", "base path".bold(), locator.base_path());
        println!("{:<12} {}", "uri".bold(), locator.to_uri());
        println!("{:<12} {}", "cwd".bold(), self.current.to_uri());
        println!("{:<12} {}", "open".bold(), self.registry.len());
    }

    /// Get the prompt string
    pub fn prompt(&self) -> String {
        let locator = self.filesystem.locator();
        format!(
            "ghsh:{}/{}@{}:{} $ ",
            locator.owner(),
            locator.repo(),
            locator.git_ref(),
            self.current
        )
    }

    /// Parse command line respecting quotes (both single and double)
    pub fn parse_command_line(line: &str) -> Result<Vec<String>> {
        let mut args = Vec::new();
        let mut current_arg = String::new();
        let mut in_single_quote = false;
        let mut in_double_quote = false;
        let mut escape_next = false;

        for ch in line.chars() {
            if escape_next {
                current_arg.push(ch);
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if !in_single_quote => escape_next = true,
                '\'' if !in_double_quote => in_single_quote = !in_single_quote,
                '"' if !in_single_quote => in_double_quote = !in_double_quote,
                ' ' | '\t' if !in_single_quote && !in_double_quote => {
                    if !current_arg.is_empty() {
                        args.push(std::mem::take(&mut current_arg));
                    }
                }
                _ => current_arg.push(ch),
            }
        }

        if !current_arg.is_empty() {
            args.push(current_arg);
        }

        if in_single_quote {
            return Err(anyhow!("Unclosed single quote"));
        }
        if in_double_quote {
            return Err(anyhow!("Unclosed double quote"));
        }

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_words() {
        let args = ShellState::parse_command_line("ls -l  src\tmain").unwrap();
        assert_eq!(args, ["ls", "-l", "src", "main"]);
    }

    #[test]
    fn test_parse_quotes_and_escapes() {
        let args = ShellState::parse_command_line(r#"cat "my file.txt" 'a "b"' c\ d"#).unwrap();
        assert_eq!(args, ["cat", "my file.txt", r#"a "b""#, "c d"]);
    }

    #[test]
    fn test_parse_unclosed_quotes() {
        assert!(ShellState::parse_command_line("cat 'oops").is_err());
        assert!(ShellState::parse_command_line("cat \"oops").is_err());
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(ShellState::parse_command_line("").unwrap().is_empty());
    }
}
