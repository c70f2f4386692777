//! Error types for archive cache operations.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors that can occur while recording, merging, or cleaning the archive
/// cache.
///
/// Archiver failures are fatal and never retried: the invocation is assumed
/// deterministic and idempotent given identical inputs, so a retry would only
/// repeat the failure.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// An I/O error occurred while reading or writing cache state.
    #[error("archive cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A response file named by an archiving invocation could not be read.
    #[error("failed to read response file {path}: {source}")]
    ResponseFile {
        /// The response file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A target record could not be serialized.
    #[error("failed to encode record {path}: {reason}")]
    Record {
        /// The record file path.
        path: PathBuf,
        /// Description of the encoding failure.
        reason: String,
    },

    /// The archiver subprocess could not be spawned.
    #[error("failed to spawn archiver `{}`: {source}", .argv.join(" "))]
    ArchiverSpawn {
        /// The full argument vector of the failed invocation.
        argv: Vec<String>,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The archiver subprocess reported a nonzero status.
    #[error("archiver failed with {status} (command: {})", .argv.join(" "))]
    ArchiverFailed {
        /// The full argument vector of the failed invocation.
        argv: Vec<String>,
        /// The subprocess exit status.
        status: ExitStatus,
    },
}
