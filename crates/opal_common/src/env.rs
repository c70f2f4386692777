//! Environment and path discovery for the running process.
//!
//! Every lookup here is non-throwing: it returns a defined value or `None`,
//! never an error. Callers that cannot proceed without a value surface their
//! own configuration error; the lookups themselves stay silent.

use std::io;
use std::path::PathBuf;

/// Product name used for per-user cache and config subdirectories.
const PRODUCT_DIR: &str = "opal";

/// Version string baked into the binary at build time.
pub fn binary_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// The current user's home directory, if the environment declares one.
///
/// Reads `$HOME` on Unix and `%USERPROFILE%` on Windows. An empty value is
/// treated as undeclared.
pub fn user_home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    match std::env::var_os(var) {
        Some(v) if !v.is_empty() => Some(PathBuf::from(v)),
        _ => None,
    }
}

/// Per-user cache directory for one binary version.
///
/// Resolves to `$XDG_CACHE_HOME/opal/<version>` when the XDG variable is set,
/// falling back to `~/.cache/opal/<version>`. Versioned so that caches from
/// different Opal releases never collide.
pub fn user_cache_dir(binary_version: &str) -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CACHE_HOME") {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => user_home_dir()?.join(".cache"),
    };
    Some(base.join(PRODUCT_DIR).join(binary_version))
}

/// Per-user configuration directory.
///
/// Resolves to `$XDG_CONFIG_HOME/opal`, falling back to `~/.config/opal`.
pub fn user_config_dir() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => user_home_dir()?.join(".config"),
    };
    Some(base.join(PRODUCT_DIR))
}

/// Full path of the running executable.
pub fn process_path() -> Option<PathBuf> {
    std::env::current_exe().ok()
}

/// Directory containing the running executable.
pub fn process_dir() -> Option<PathBuf> {
    process_path().and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

/// Resource directory shipped alongside the executable.
///
/// In an application bundle the resources sit next to the executable under
/// `../Resources`; in an installed or development tree they live under
/// `../share/opal` relative to the binary. The returned path is not probed
/// here; callers apply their own existence discipline.
pub fn resource_dir() -> Option<PathBuf> {
    let dir = process_dir()?;
    let in_bundle = dir
        .components()
        .any(|c| c.as_os_str().to_string_lossy().ends_with(".app"));
    if in_bundle {
        Some(dir.join("..").join("Resources"))
    } else {
        Some(dir.join("..").join("share").join(PRODUCT_DIR))
    }
}

/// Creates a unique, empty temporary file with the given prefix and returns
/// its path.
///
/// The file persists after the handle is dropped; the caller owns deletion.
/// Used for response-file round-trips between the code generator and the
/// archive entry point.
pub fn make_temp_file(prefix: &str) -> io::Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .tempfile_in(std::env::temp_dir())?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}
