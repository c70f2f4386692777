//! Linker argument assembly and dynamic-library resolution.

use std::path::{Path, PathBuf};

use opal_common::{probe, Probe};

use crate::error::LinkError;

/// System frameworks required on Apple platforms for any graphics/windowing
/// use. Linked unconditionally, after user libraries.
const APPLE_FRAMEWORKS: &[&str] = &["Cocoa", "IOKit", "CoreVideo"];

/// Which consumer the composed link inputs are for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkMode {
    /// Interactive evaluation: libraries resolve through the dynamic loader.
    Jit,
    /// Batch build: a full linker invocation for a standalone artifact.
    Aot,
}

/// User-facing link inputs for one build or evaluation session.
#[derive(Debug, Clone, Default)]
pub struct LinkRequest {
    /// Merged archives produced by the archive cache, in link order.
    pub archives: Vec<PathBuf>,

    /// User-requested library search directories, in order.
    pub library_dirs: Vec<PathBuf>,

    /// User-requested bare library names, in order.
    pub libraries: Vec<String>,
}

/// Composed link inputs, shaped per mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposedLink {
    /// Arguments for the linker invocation.
    Aot {
        /// The assembled argument vector.
        args: Vec<String>,
    },
    /// Resolved shared-library paths to hand to the dynamic loader.
    Jit {
        /// One on-disk path per requested library, in request order.
        load_paths: Vec<PathBuf>,
    },
}

/// Composes link inputs for the given mode.
///
/// AOT assembly order: merged archives, `-L` per user directory, `-l` per
/// user library, then the platform framework tail. The user-library
/// enumeration is never skipped. JIT resolves each user library against the
/// search directories using the platform naming convention.
pub fn compose_link(mode: LinkMode, request: &LinkRequest) -> Result<ComposedLink, LinkError> {
    match mode {
        LinkMode::Aot => Ok(ComposedLink::Aot {
            args: aot_args(request, cfg!(target_vendor = "apple")),
        }),
        LinkMode::Jit => {
            let mut load_paths = Vec::with_capacity(request.libraries.len());
            for name in &request.libraries {
                load_paths.push(resolve_dynamic_library(name, &request.library_dirs)?);
            }
            Ok(ComposedLink::Jit { load_paths })
        }
    }
}

/// AOT argument assembly with an explicit platform switch for tests.
fn aot_args(request: &LinkRequest, apple: bool) -> Vec<String> {
    let mut args = Vec::new();
    for archive in &request.archives {
        args.push(archive.display().to_string());
    }
    for dir in &request.library_dirs {
        args.push(format!("-L{}", dir.display()));
    }
    for name in &request.libraries {
        args.push(format!("-l{name}"));
    }
    if apple {
        for framework in APPLE_FRAMEWORKS {
            args.push("-framework".to_string());
            args.push((*framework).to_string());
        }
    }
    args
}

/// The platform's expected on-disk filename for a bare library name.
///
/// `lib<name>.so` on Linux, `lib<name>.dylib` on macOS, `<name>.dll` on
/// Windows. A mismatch here makes present libraries report as not found,
/// so the convention comes from the standard library's platform constants.
pub fn dynamic_library_filename(name: &str) -> String {
    format!(
        "{}{name}{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}

/// Resolves one bare library name against the search directories.
pub fn resolve_dynamic_library(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, LinkError> {
    resolve_dynamic_library_with(name, dirs, probe)
}

/// Resolution core with an injectable probe for tests.
fn resolve_dynamic_library_with(
    name: &str,
    dirs: &[PathBuf],
    mut probe_fn: impl FnMut(&Path) -> Probe,
) -> Result<PathBuf, LinkError> {
    let filename = dynamic_library_filename(name);
    for dir in dirs {
        let candidate = dir.join(&filename);
        if probe_fn(&candidate).exists() {
            return Ok(candidate);
        }
    }
    Err(LinkError::LibraryNotFound {
        name: name.to_string(),
        filename,
        searched: dirs.to_vec(),
    })
}
