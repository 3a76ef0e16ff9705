use anyhow::Result;

pub mod cat;
pub mod cd;
pub mod ls;
pub mod output;
pub mod stat;

use super::ShellState;

/// Trait for shell commands
pub trait Command: Send + Sync {
    /// Get the command name
    fn name(&self) -> &str;

    /// Get command usage help
    fn usage(&self) -> &str;

    /// Execute the command
    fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()>;
}
