//! `opal-ar merge` and `opal-ar merge-phase-2` — the serial merge barrier.
//!
//! Both subcommands run strictly after all per-target recording for the build
//! has completed; they snapshot the cache directory and must not race with
//! in-flight records.

use opal_archive::RecordStore;
use opal_common::probe;
use opal_config::OrchestratorConfig;

use crate::Cli;

/// Runs the `merge` subcommand (phase 1).
pub fn run_phase_1(
    config: &OrchestratorConfig,
    cli: &Cli,
) -> Result<i32, Box<dyn std::error::Error>> {
    let store = RecordStore::new(&config.paths.cache_dir);
    let merged = opal_archive::merge(
        &store,
        &config.toolchain.archiver,
        &config.paths.phase1_archive,
    )?;
    if !cli.quiet {
        eprintln!(
            "   Archive {} ({} objects)",
            merged.path.display(),
            merged.members.len()
        );
    }
    Ok(0)
}

/// Runs the `merge-phase-2` subcommand.
///
/// Valid only once the standard-library core unit has been compiled to its
/// fixed path; a missing core object is a user-facing error, not an archiver
/// failure.
pub fn run_phase_2(
    config: &OrchestratorConfig,
    cli: &Cli,
) -> Result<i32, Box<dyn std::error::Error>> {
    let core = &config.paths.core_object;
    if !probe(core).exists() {
        eprintln!(
            "error: standard-library core object {} not found; compile the core before merge-phase-2",
            core.display()
        );
        return Ok(1);
    }

    let store = RecordStore::new(&config.paths.cache_dir);
    let merged = opal_archive::merge_phase_2(
        &store,
        &config.toolchain.archiver,
        &config.paths.phase2_archive,
        core,
    )?;
    if !cli.quiet {
        eprintln!(
            "   Archive {} ({} objects)",
            merged.path.display(),
            merged.members.len()
        );
    }
    Ok(0)
}
