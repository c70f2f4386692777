//! Configuration types for one build invocation.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Compiler driver path baked in at build time by the packager, if any.
pub const BAKED_DRIVER_PATH: Option<&str> = option_env!("OPAL_BAKED_CC");

/// Extra JIT compile flags baked in at build time (include search paths and
/// defines recorded on the build machine).
pub const BAKED_JIT_FLAGS: &str = match option_env!("OPAL_BAKED_JIT_FLAGS") {
    Some(flags) => flags,
    None => "",
};

/// Environment variable overriding the compiler driver at runtime.
pub const DRIVER_ENV_VAR: &str = "OPAL_CC";

/// Environment variable overriding the archiver at runtime.
pub const ARCHIVER_ENV_VAR: &str = "OPAL_AR";

/// On-disk layout of one build invocation's outputs.
///
/// All archive-cache operations receive this (or a path out of it) explicitly;
/// the layout has the lifecycle of a single build invocation and is never
/// stored in process-global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    /// Root of the per-target object record cache. Created lazily, cleared
    /// wholesale by `clean`, persists across incremental rebuilds.
    pub cache_dir: PathBuf,

    /// Output path of the phase-1 merged archive (runtime plus all compiled
    /// Opal internals).
    pub phase1_archive: PathBuf,

    /// Output path of the phase-2 merged archive (phase 1 plus the compiled
    /// standard-library core).
    pub phase2_archive: PathBuf,

    /// Fixed output path of the compiled standard-library core unit. Phase-2
    /// merging may only run after this object exists.
    pub core_object: PathBuf,
}

impl BuildPaths {
    /// Returns the default layout under the given build root.
    pub fn rooted_at(build_root: &Path) -> Self {
        Self {
            cache_dir: build_root.join("archive-cache"),
            phase1_archive: build_root.join("libopal.a"),
            phase2_archive: build_root.join("libopal-standalone.a"),
            core_object: build_root.join("opal.core.o"),
        }
    }
}

/// Toolchain settings: baked-in defaults plus file and environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Compiler driver path fixed at build time, if the packager provided one.
    pub baked_driver: Option<PathBuf>,

    /// Archiver command used for merge passes.
    pub archiver: PathBuf,

    /// Raw baked-in JIT flag string, filtered at startup into an effective
    /// subset before use.
    pub raw_jit_flags: String,
}

impl ToolchainConfig {
    /// Compiler driver supplied via the runtime environment, if any.
    pub fn driver_env_override() -> Option<PathBuf> {
        match std::env::var_os(DRIVER_ENV_VAR) {
            Some(v) if !v.is_empty() => Some(PathBuf::from(v)),
            _ => None,
        }
    }

    /// Archiver supplied via the runtime environment, if any.
    pub fn archiver_env_override() -> Option<PathBuf> {
        match std::env::var_os(ARCHIVER_ENV_VAR) {
            Some(v) if !v.is_empty() => Some(PathBuf::from(v)),
            _ => None,
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            baked_driver: BAKED_DRIVER_PATH.map(PathBuf::from),
            archiver: Self::archiver_env_override().unwrap_or_else(|| PathBuf::from("ar")),
            raw_jit_flags: BAKED_JIT_FLAGS.to_string(),
        }
    }
}

/// Fully resolved configuration for one build invocation.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Build-tree layout.
    pub paths: BuildPaths,

    /// Toolchain defaults and overrides.
    pub toolchain: ToolchainConfig,
}

/// Raw `opal-build.toml` contents before resolution against the build root.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Build-tree layout overrides.
    #[serde(default)]
    pub build: BuildSection,

    /// Toolchain overrides.
    #[serde(default)]
    pub toolchain: ToolchainSection,
}

/// `[build]` section of `opal-build.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSection {
    /// Override for the archive-cache root.
    pub cache_dir: Option<PathBuf>,

    /// Override for the phase-1 merged archive path.
    pub phase1_archive: Option<PathBuf>,

    /// Override for the phase-2 merged archive path.
    pub phase2_archive: Option<PathBuf>,

    /// Override for the standard-library core object path.
    pub core_object: Option<PathBuf>,
}

/// `[toolchain]` section of `opal-build.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainSection {
    /// Override for the baked-in compiler driver path.
    pub driver: Option<PathBuf>,

    /// Override for the archiver command.
    pub archiver: Option<PathBuf>,

    /// Override for the raw JIT flag string.
    pub jit_flags: Option<String>,
}
