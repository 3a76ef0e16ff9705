use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use ghfs::config::{CACHE_DIR_ENV, TOKEN_ENV};
use ghfs::shell::{ExitRequested, ShellCompleter, ShellState};
use ghfs::{ClientConfig, FilesystemOptions, FilesystemRegistry};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

/// Browse a GitHub repository like a Unix shell
#[derive(Debug, Parser)]
#[command(name = "ghsh", version, about)]
struct Args {
    /// Repository to open: a github.com tree/blob URL, a raw URL, or a github:// URI
    locator: String,

    /// API token (falls back to GITHUB_TOKEN)
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Directory for downloaded files
    #[arg(long, env = CACHE_DIR_ENV)]
    cache_dir: Option<PathBuf>,

    /// Reuse directory listings for this many seconds
    #[arg(long, value_name = "SECS")]
    listing_ttl: Option<u64>,

    /// Run one command line and exit
    #[arg(short = 'c', value_name = "CMD")]
    command: Option<String>,

    /// Log fetches and cache activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(e) = ghfs::logging::init(args.verbose) {
        eprintln!("{} failed to initialize logging: {e}", "Warning:".yellow().bold());
    }

    let mut config = ClientConfig::from_env();
    if args.token.is_some() {
        config.token = args.token;
    }
    if args.cache_dir.is_some() {
        config.cache_dir = args.cache_dir;
    }
    let options = FilesystemOptions {
        listing_ttl: args.listing_ttl.map(Duration::from_secs),
        ..FilesystemOptions::default()
    };

    let registry = Arc::new(FilesystemRegistry::with_http(config, options)?);
    let mut state = match ShellState::new(Arc::clone(&registry), &args.locator) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            std::process::exit(2);
        }
    };

    let outcome = match args.command {
        Some(line) => run_once(&mut state, &line),
        None => run_repl(&mut state),
    };

    registry.close_all();
    outcome
}

/// `-c`: run a single command line, reporting failure through the exit code
fn run_once(state: &mut ShellState, line: &str) -> anyhow::Result<()> {
    match state.execute(line) {
        Ok(()) => Ok(()),
        Err(e) if e.is::<ExitRequested>() => Ok(()),
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            std::process::exit(1);
        }
    }
}

fn run_repl(state: &mut ShellState) -> anyhow::Result<()> {
    let locator = state.filesystem().locator();
    println!("{}", "=".repeat(60).cyan());
    println!("{}", "  ghsh - The GitHub Shell".bold().cyan());
    println!(
        "{}",
        format!("  {}/{} @ {}", locator.owner(), locator.repo(), locator.git_ref()).cyan()
    );
    println!("{}", "=".repeat(60).cyan());
    println!();
    println!("Type 'help' for available commands or 'exit' to quit");
    println!();

    let completer = ShellCompleter::new(state.completion_cache().clone());
    let mut rl: Editor<ShellCompleter, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(completer));

    let history_file = dirs::home_dir().map(|home| home.join(".ghsh_history"));
    if let Some(path) = &history_file {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = state.prompt();

        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match state.execute(&line) {
                    Ok(()) => {}
                    Err(e) if e.is::<ExitRequested>() => break,
                    Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                eprintln!("{} {err:?}", "Error:".red().bold());
                break;
            }
        }
    }

    if let Some(path) = &history_file {
        let _ = rl.save_history(path);
    }

    println!("Goodbye!");
    Ok(())
}
