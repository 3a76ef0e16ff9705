//! Output macros for shell commands.
//!
//! When stdout is a pipe that the reader closes early (`ghsh -c 'cat f' | head`)
//! the command returns `Ok(())` instead of failing.

/// Print with newline; returns `Ok(())` from the caller on BrokenPipe
macro_rules! print_line {
    ($($arg:tt)*) => {{
        use std::io::Write;
        match writeln!(std::io::stdout(), $($arg)*) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }};
}

/// Print without newline; returns `Ok(())` from the caller on BrokenPipe
macro_rules! print_str {
    ($($arg:tt)*) => {{
        use std::io::Write;
        match write!(std::io::stdout(), $($arg)*) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }};
}

pub(crate) use print_line;
pub(crate) use print_str;
