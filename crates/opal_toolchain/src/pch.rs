//! Precompiled prelude header management.
//!
//! Every JIT compilation includes the Opal prelude header; precompiling it
//! once removes that parse from every evaluation. The artifact is built at
//! most once per installation and afterwards trusted as-is: consuming it with
//! staleness validation enabled would stat every header path recorded inside
//! it, and those are absolute paths on the machine that built the artifact.

use std::path::{Path, PathBuf};
use std::process::Command;

use opal_common::{binary_version, probe, resource_dir, user_cache_dir, Probe};

use crate::error::ToolchainError;

/// Prelude header filename within the resource include tree.
const PRELUDE_HEADER: &str = "prelude.hpp";

/// Precompiled artifact filename.
const PCH_FILE: &str = "prelude.hpp.pch";

/// Candidate locations for the precompiled prelude artifact.
#[derive(Debug, Clone)]
pub struct PchPaths {
    /// Prelude header source compiled on first use.
    pub prelude: PathBuf,

    /// Artifact location in a development tree, checked first.
    pub development: PathBuf,

    /// Artifact location in the per-user versioned cache; also the build
    /// destination when neither candidate exists.
    pub installed: PathBuf,
}

impl PchPaths {
    /// Default candidate locations for this process.
    ///
    /// Returns `None` when neither a resource directory nor a user cache
    /// directory can be determined.
    pub fn discover() -> Option<Self> {
        let resources = resource_dir()?;
        let cache = user_cache_dir(binary_version())?;
        Some(Self {
            prelude: resources.join("include").join(PRELUDE_HEADER),
            development: resources.join(PCH_FILE),
            installed: cache.join(PCH_FILE),
        })
    }
}

/// Lifecycle state of the precompiled prelude header.
enum PchState {
    Unbuilt,
    Built(PathBuf),
}

/// Builds (once) and hands out the precompiled prelude header.
///
/// The manager is consulted once per JIT compilation; after the first
/// resolution the artifact path is cached and no further probing happens.
pub struct PchManager {
    paths: PchPaths,
    state: PchState,
}

impl PchManager {
    /// Creates a manager over the given candidate locations.
    pub fn new(paths: PchPaths) -> Self {
        Self {
            paths,
            state: PchState::Unbuilt,
        }
    }

    /// Returns a usable precompiled-header artifact, building it on first use.
    ///
    /// An artifact found at a candidate location is returned without any
    /// rebuilding or re-validation. Otherwise the driver compiles the prelude
    /// header to the installed location; a failed build is fatal and reported
    /// with the full command, never retried.
    pub fn ensure_built(
        &mut self,
        driver: &Path,
        search_flags: &[String],
    ) -> Result<PathBuf, ToolchainError> {
        if let PchState::Built(path) = &self.state {
            return Ok(path.clone());
        }
        let path = self.resolve_or_build(driver, search_flags, probe)?;
        self.state = PchState::Built(path.clone());
        Ok(path)
    }

    /// Resolution core with an injectable probe for tests.
    fn resolve_or_build(
        &self,
        driver: &Path,
        search_flags: &[String],
        mut probe_fn: impl FnMut(&Path) -> Probe,
    ) -> Result<PathBuf, ToolchainError> {
        for candidate in [&self.paths.development, &self.paths.installed] {
            if probe_fn(candidate).exists() {
                return Ok(candidate.clone());
            }
        }
        self.build(driver, search_flags)?;
        Ok(self.paths.installed.clone())
    }

    /// Compiles the prelude header to the installed location.
    fn build(&self, driver: &Path, search_flags: &[String]) -> Result<(), ToolchainError> {
        if let Some(parent) = self.paths.installed.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ToolchainError::Spawn {
                argv: vec![driver.display().to_string()],
                source: e,
            })?;
        }

        let mut argv: Vec<String> = vec![
            driver.display().to_string(),
            "-x".to_string(),
            "c++-header".to_string(),
            self.paths.prelude.display().to_string(),
            "-o".to_string(),
            self.paths.installed.display().to_string(),
        ];
        argv.extend(search_flags.iter().cloned());

        let output = Command::new(driver)
            .args(&argv[1..])
            .output()
            .map_err(|e| ToolchainError::Spawn {
                argv: argv.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ToolchainError::PchBuild {
                argv,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

/// Flags that make the driver consume a precompiled-header artifact.
///
/// Staleness validation is always disabled: it would probe header paths from
/// the build machine and can raise an OS access-consent prompt. Trusting a
/// possibly-stale artifact is an accepted tradeoff.
pub fn load_flags(pch_path: &Path) -> Vec<String> {
    vec![
        "-include-pch".to_string(),
        pch_path.display().to_string(),
        "-Xclang".to_string(),
        "-fno-validate-pch".to_string(),
    ]
}
