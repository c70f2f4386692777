//! `opal-ar` — the archive-creation entry point for Opal builds.
//!
//! The build system invokes this binary in place of the archiver for every
//! per-target archive creation; the default pass-through mode records the
//! target's object files in the archive cache and forwards the original
//! invocation unchanged. The `merge` and `merge-phase-2` subcommands replay
//! every cached record into the final merged archives, and `clean` resets the
//! cache for a from-scratch build.

#![warn(missing_docs)]

mod clean;
mod merge;
mod passthrough;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};

/// Opal's archive-creation entry point and cache maintenance tool.
#[derive(Parser, Debug)]
#[command(name = "opal-ar", version, about = "Opal object-archive cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Build root containing the archive cache and merged archive outputs.
    #[arg(long, global = true, default_value = ".")]
    pub build_root: String,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete the entire archive cache and recreate it empty.
    ///
    /// Only for an explicit top-level clean; never run this mid-build.
    Clean,

    /// Merge every cached target record into the phase-1 archive.
    Merge,

    /// Merge every cached record plus the standard-library core object into
    /// the phase-2 archive.
    #[command(name = "merge-phase-2")]
    MergePhase2,

    /// Default pass-through mode: `<archiver> [flags] <output> <objects|@rsp...>`.
    ///
    /// Records the target's expanded object list and forwards the original
    /// invocation unchanged to the underlying archiver.
    #[command(external_subcommand)]
    Archive(Vec<String>),
}

fn main() {
    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    };
    process::exit(code);
}

/// Dispatches the parsed command line. Returns the process exit code.
fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = opal_config::load_config(Path::new(&cli.build_root))?;
    match &cli.command {
        Command::Clean => clean::run(&config, cli),
        Command::Merge => merge::run_phase_1(&config, cli),
        Command::MergePhase2 => merge::run_phase_2(&config, cli),
        Command::Archive(args) => passthrough::run(&config, cli, args),
    }
}
