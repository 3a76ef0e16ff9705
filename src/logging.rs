use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a stderr subscriber for the shell.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` for this crate
/// when `verbose` is on. Stdout stays reserved for command output.
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_directive = if verbose { "warn,ghfs=debug" } else { "warn" };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
