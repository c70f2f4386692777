//! `opal-ar clean` — reset the archive cache.

use opal_archive::RecordStore;
use opal_config::OrchestratorConfig;

use crate::Cli;

/// Runs the `clean` subcommand.
pub fn run(config: &OrchestratorConfig, cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let store = RecordStore::new(&config.paths.cache_dir);
    store.clean()?;
    if !cli.quiet {
        eprintln!("   Cleaned {}", store.cache_dir().display());
    }
    Ok(0)
}
