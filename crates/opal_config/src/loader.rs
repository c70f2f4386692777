//! Configuration file loading and resolution.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{BuildPaths, ConfigFile, OrchestratorConfig, ToolchainConfig};

/// Name of the optional per-build configuration file.
const CONFIG_FILE: &str = "opal-build.toml";

/// Loads the orchestration configuration for a build rooted at `build_root`.
///
/// Reads `<build_root>/opal-build.toml` when present; a missing file is not an
/// error and yields the baked-in defaults. Relative path overrides are resolved
/// against the build root.
pub fn load_config(build_root: &Path) -> Result<OrchestratorConfig, ConfigError> {
    let path = build_root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::IoError(e)),
    };
    load_config_from_str(&content, build_root)
}

/// Parses and resolves a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(
    content: &str,
    build_root: &Path,
) -> Result<OrchestratorConfig, ConfigError> {
    let file: ConfigFile =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate(&file)?;
    Ok(resolve(file, build_root))
}

/// Validates override values before resolution.
fn validate(file: &ConfigFile) -> Result<(), ConfigError> {
    if let Some(archiver) = &file.toolchain.archiver {
        if archiver.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "toolchain.archiver is empty".to_string(),
            ));
        }
    }
    if let Some(driver) = &file.toolchain.driver {
        if driver.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "toolchain.driver is empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Applies file overrides on top of the default layout and toolchain settings.
fn resolve(file: ConfigFile, build_root: &Path) -> OrchestratorConfig {
    let defaults = BuildPaths::rooted_at(build_root);
    let rebase = |p: PathBuf| {
        if p.is_absolute() {
            p
        } else {
            build_root.join(p)
        }
    };

    let paths = BuildPaths {
        cache_dir: file.build.cache_dir.map(rebase).unwrap_or(defaults.cache_dir),
        phase1_archive: file
            .build
            .phase1_archive
            .map(rebase)
            .unwrap_or(defaults.phase1_archive),
        phase2_archive: file
            .build
            .phase2_archive
            .map(rebase)
            .unwrap_or(defaults.phase2_archive),
        core_object: file
            .build
            .core_object
            .map(rebase)
            .unwrap_or(defaults.core_object),
    };

    let tc_defaults = ToolchainConfig::default();
    let toolchain = ToolchainConfig {
        baked_driver: file.toolchain.driver.or(tc_defaults.baked_driver),
        archiver: file.toolchain.archiver.unwrap_or(tc_defaults.archiver),
        raw_jit_flags: file.toolchain.jit_flags.unwrap_or(tc_defaults.raw_jit_flags),
    };

    OrchestratorConfig { paths, toolchain }
}
