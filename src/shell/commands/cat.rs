use anyhow::{Result, anyhow};

use super::output::{print_line, print_str};
use super::{Command, ShellState};
use crate::ui::create_spinner;
use crate::vfs::EntryKind;

/// Bytes shown as hex when a file is not UTF-8
const HEX_PREVIEW_LEN: usize = 1024;

pub struct CatCommand;

impl Command for CatCommand {
    fn name(&self) -> &str {
        "cat"
    }

    fn usage(&self) -> &str {
        "cat FILE - Display file contents"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let Some(path_str) = args.first() else {
            return Err(anyhow!("Usage: cat FILE"));
        };

        let target = state.resolve(path_str);
        if target.kind()? == EntryKind::Directory {
            return Err(anyhow!("Is a directory: {path_str}"));
        }

        let filename = target.file_name().unwrap_or(path_str.as_str());
        let spinner = create_spinner(&format!("Fetching {filename}..."));
        let result = target.read();
        spinner.finish_and_clear();
        let bytes = result?;

        match std::str::from_utf8(&bytes) {
            Ok(text) => print_str!("{text}"),
            Err(_) => {
                eprintln!("Warning: File contains binary data");
                let display_len = bytes.len().min(HEX_PREVIEW_LEN);
                for (i, byte) in bytes[..display_len].iter().enumerate() {
                    if i % 16 == 0 {
                        print_str!("\n{i:08x}: ");
                    }
                    print_str!("{byte:02x} ");
                }
                print_line!();
                if bytes.len() > HEX_PREVIEW_LEN {
                    eprintln!("... ({} more bytes)", bytes.len() - HEX_PREVIEW_LEN);
                }
            }
        }
        Ok(())
    }
}
