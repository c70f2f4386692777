//! Non-raising filesystem probing.
//!
//! Toolchain and precompiled-header resolution repeatedly asks "is this path
//! usable?" against candidates that may live on other machines' layouts or
//! behind OS permission walls. Probing must therefore never raise: a denied
//! probe is treated exactly like an absent path so that resolution keeps
//! searching the remaining candidates instead of aborting the process.

use std::path::Path;

/// Outcome of probing a filesystem path.
///
/// Permission denial is indistinguishable from absence: every probing site
/// treats both the same way and moves on to the next candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The path exists and its metadata could be read.
    Exists,
    /// The path does not exist, or reading its metadata failed for any reason,
    /// including permission denial.
    AbsentOrDenied,
}

impl Probe {
    /// Returns `true` if the probe found an existing, readable path.
    pub fn exists(self) -> bool {
        matches!(self, Probe::Exists)
    }
}

/// Probes a path, mapping every failure to [`Probe::AbsentOrDenied`].
///
/// Uses a symlink-level metadata lookup so a dangling symlink still counts as
/// present on disk, and so the target of the link is never touched.
pub fn probe(path: &Path) -> Probe {
    match std::fs::symlink_metadata(path) {
        Ok(_) => Probe::Exists,
        Err(_) => Probe::AbsentOrDenied,
    }
}
