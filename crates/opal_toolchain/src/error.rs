//! Error types for toolchain resolution and precompiled-header builds.

use std::path::PathBuf;

/// Errors that can occur while resolving or invoking the native toolchain.
///
/// Probe denial is never an error here: a denied probe is absorbed as a
/// non-match and only contributes to `NotFound` when every candidate fails.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// No accessible compiler driver candidate was found.
    #[error(
        "no usable compiler driver found (tried: {}); install clang or point {} at a working driver",
        .candidates.iter().map(|c| c.display().to_string()).collect::<Vec<_>>().join(", "),
        opal_config::types::DRIVER_ENV_VAR
    )]
    NotFound {
        /// Every candidate path that was considered, in priority order.
        candidates: Vec<PathBuf>,
    },

    /// The compiler driver could not be spawned at all.
    #[error("failed to spawn compiler driver `{}`: {source}", .argv.join(" "))]
    Spawn {
        /// The full argument vector of the failed invocation.
        argv: Vec<String>,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The precompiled-header build reported a nonzero status.
    #[error(
        "precompiled header build failed (command: {}): {stderr}",
        .argv.join(" ")
    )]
    PchBuild {
        /// The full argument vector of the failed invocation.
        argv: Vec<String>,
        /// Captured stderr of the failed build.
        stderr: String,
    },
}
