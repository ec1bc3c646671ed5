//! # vendr CLI Entry Point
//!
//! Parses CLI arguments with clap and routes commands to the library.
//!
//! - `install` - fetch missing dependencies at their locked revisions
//! - `update` - refresh every dependency, converting hand-vendored copies
//! - `list` - show what is in the vendor directory
//! - `completion` - shell completion scripts

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;

use vendr::deps;
use vendr::logging;
use vendr::project::Project;
use vendr::status;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "vendr")]
#[command(about = "Vendor-directory dependency manager", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Start the vendr.toml search from this directory
    #[arg(short = 'C', long = "dir", global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch missing dependencies, honoring vendr.lock
    Install,
    /// Update all dependencies, replacing hand-vendored copies
    Update,
    /// Show the state of each dependency in the vendor directory
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() {
    enable_windows_utf8_console();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completion { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    let start = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Could not read current directory")?,
    };
    let project = Project::discover(&start)
        .context("Run vendr from a project directory (one containing vendr.toml)")?;

    match cli.command {
        Commands::Install => deps::install_dependencies(&project),
        Commands::Update => deps::update_dependencies(&project),
        Commands::List { json } => status::print_status(&project, json),
        Commands::Completion { .. } => Ok(()),
    }
}
