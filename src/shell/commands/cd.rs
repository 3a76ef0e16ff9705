use anyhow::{Result, anyhow};

use super::{Command, ShellState};
use crate::vfs::EntryKind;

pub struct CdCommand;

impl Command for CdCommand {
    fn name(&self) -> &str {
        "cd"
    }

    fn usage(&self) -> &str {
        "cd [PATH] - Change current directory"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let Some(path_str) = args.first() else {
            let root = state.filesystem().root();
            state.set_current_path(root);
            return Ok(());
        };

        let target = state.resolve(path_str);

        // The root always exists; skip the round trip
        if target.is_root() {
            state.set_current_path(target);
            return Ok(());
        }

        match target.kind()? {
            EntryKind::Directory => {
                state.set_current_path(target);
                Ok(())
            }
            EntryKind::File => Err(anyhow!("Not a directory: {path_str}")),
        }
    }
}
