//! Compiler driver resolution.
//!
//! Candidates are tried in strict priority order: a driver bundled in the
//! application's resource directory, the path baked in at build time, then a
//! runtime environment override. A candidate wins by existing and being
//! accessible; candidates under home-directory prefixes that cannot belong to
//! this machine's current user are rejected before any probe happens, because
//! even a failed existence check against them can raise an OS access-consent
//! prompt on some platforms.

use std::path::{Path, PathBuf};

use opal_common::{probe, Probe};
use opal_config::ToolchainConfig;

use crate::error::ToolchainError;

/// Path segment marking a distributed application bundle.
const BUNDLE_MARKER: &str = ".app";

/// Filename of the compiler driver looked for in the resource directory.
const DRIVER_NAME: &str = "clang++";

/// Prefixes under which per-user home directories live.
const HOME_ROOTS: &[&str] = &["/home/", "/Users/"];

/// Returns `true` when the running executable lives inside a distributed
/// application bundle.
pub fn process_in_bundle() -> bool {
    match opal_common::process_path() {
        Some(path) => path_in_bundle(&path),
        None => false,
    }
}

/// Bundle classification on an explicit executable path.
pub fn path_in_bundle(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_string_lossy().ends_with(BUNDLE_MARKER))
}

/// Decides whether a candidate path may be probed at all.
///
/// In bundle mode, every home-prefixed path is a stale reference to the
/// machine that built the bundle and is rejected without probing. In
/// development mode, home-prefixed paths are allowed only under the current
/// user's own home; a path under another user's home (or any home-style path
/// when the current home is unknown) is rejected without probing.
pub fn may_probe(path: &Path, is_bundle: bool, home_dir: Option<&Path>) -> bool {
    if !is_home_style(path) {
        return true;
    }
    if is_bundle {
        return false;
    }
    match home_dir {
        Some(home) => path.starts_with(home),
        None => false,
    }
}

/// Returns `true` for paths under a per-user home root.
fn is_home_style(path: &Path) -> bool {
    let s = path.to_string_lossy();
    HOME_ROOTS.iter().any(|root| s.starts_with(root))
}

/// Builds the ordered candidate list for the compiler driver.
///
/// Priority: bundled copy in the resource directory, baked-in build-time
/// path, runtime environment override.
pub fn driver_candidates(config: &ToolchainConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(resources) = opal_common::resource_dir() {
        candidates.push(resources.join("bin").join(DRIVER_NAME));
    }
    if let Some(baked) = &config.baked_driver {
        candidates.push(baked.clone());
    }
    if let Some(env) = ToolchainConfig::driver_env_override() {
        candidates.push(env);
    }
    candidates
}

/// Finds the first accessible compiler driver for this process.
///
/// Returns [`ToolchainError::NotFound`] when no candidate is accessible;
/// callers surface this as a configuration error rather than proceeding
/// with a null toolchain.
pub fn find_compiler_driver(
    config: &ToolchainConfig,
    is_bundle: bool,
    home_dir: Option<&Path>,
) -> Result<PathBuf, ToolchainError> {
    find_driver_in(&driver_candidates(config), is_bundle, home_dir, probe)
}

/// Core selection loop with an injectable probe.
///
/// The probe seam exists so tests can count probes and verify that rejected
/// candidates are never touched.
pub fn find_driver_in(
    candidates: &[PathBuf],
    is_bundle: bool,
    home_dir: Option<&Path>,
    mut probe_fn: impl FnMut(&Path) -> Probe,
) -> Result<PathBuf, ToolchainError> {
    for candidate in candidates {
        if !may_probe(candidate, is_bundle, home_dir) {
            continue;
        }
        if probe_fn(candidate).exists() {
            return Ok(candidate.clone());
        }
    }
    Err(ToolchainError::NotFound {
        candidates: candidates.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn bundle_marker_detected_anywhere_in_path() {
        assert!(path_in_bundle(Path::new(
            "/Applications/Opal.app/Contents/MacOS/opal"
        )));
        assert!(!path_in_bundle(Path::new("/usr/local/bin/opal")));
    }

    #[test]
    fn bundle_mode_rejects_home_paths_without_probing() {
        let candidates = vec![PathBuf::from("/home/builder/llvm/bin/clang++")];
        let probes = Cell::new(0u32);
        let result = find_driver_in(&candidates, true, Some(Path::new("/home/alice")), |_| {
            probes.set(probes.get() + 1);
            Probe::Exists
        });
        assert!(matches!(result, Err(ToolchainError::NotFound { .. })));
        assert_eq!(probes.get(), 0);
    }

    #[test]
    fn dev_mode_rejects_other_users_home_without_probing() {
        let candidates = vec![PathBuf::from("/home/builder/llvm/bin/clang++")];
        let probes = Cell::new(0u32);
        let result = find_driver_in(&candidates, false, Some(Path::new("/home/alice")), |_| {
            probes.set(probes.get() + 1);
            Probe::Exists
        });
        assert!(result.is_err());
        assert_eq!(probes.get(), 0);
    }

    #[test]
    fn dev_mode_probes_current_users_home_and_honors_result() {
        let candidates = vec![PathBuf::from("/home/alice/llvm/bin/clang++")];
        let probes = Cell::new(0u32);

        let found = find_driver_in(&candidates, false, Some(Path::new("/home/alice")), |_| {
            probes.set(probes.get() + 1);
            Probe::Exists
        });
        assert_eq!(found.unwrap(), candidates[0]);
        assert_eq!(probes.get(), 1);

        let missing = find_driver_in(&candidates, false, Some(Path::new("/home/alice")), |_| {
            Probe::AbsentOrDenied
        });
        assert!(missing.is_err());
    }

    #[test]
    fn unknown_home_rejects_home_style_paths() {
        assert!(!may_probe(
            Path::new("/Users/builder/clang++"),
            false,
            None
        ));
    }

    #[test]
    fn non_home_paths_always_probed() {
        assert!(may_probe(Path::new("/usr/bin/clang++"), true, None));
        assert!(may_probe(Path::new("/opt/llvm/bin/clang++"), false, None));
    }

    #[test]
    fn first_accessible_candidate_wins() {
        let candidates = vec![
            PathBuf::from("/opt/a/clang++"),
            PathBuf::from("/opt/b/clang++"),
        ];
        let result = find_driver_in(&candidates, false, None, |p| {
            if p.starts_with("/opt/b") {
                Probe::Exists
            } else {
                Probe::AbsentOrDenied
            }
        });
        assert_eq!(result.unwrap(), Path::new("/opt/b/clang++"));
    }

    #[test]
    fn denied_probe_keeps_searching() {
        // A denied probe behaves like absence: resolution moves on instead of
        // aborting.
        let candidates = vec![
            PathBuf::from("/restricted/clang++"),
            PathBuf::from("/usr/bin/clang++"),
        ];
        let result = find_driver_in(&candidates, false, None, |p| {
            if p.starts_with("/restricted") {
                Probe::AbsentOrDenied
            } else {
                Probe::Exists
            }
        });
        assert_eq!(result.unwrap(), Path::new("/usr/bin/clang++"));
    }

    #[test]
    fn empty_candidate_list_is_not_found() {
        let result = find_driver_in(&[], false, None, |_| Probe::Exists);
        assert!(matches!(result, Err(ToolchainError::NotFound { .. })));
    }
}
