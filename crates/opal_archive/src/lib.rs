//! The object archive cache for Opal builds.
//!
//! The build system creates one static archive per translation-unit target,
//! potentially concurrently. This crate intercepts each of those archiving
//! invocations, durably records the object files belonging to each target in
//! a per-build cache directory, and later replays every record into one or
//! two final merged archives that the link step consumes. Per-target records
//! are replaced wholesale on every invocation, so the cache always holds each
//! target's latest full membership and incremental rebuilds stay idempotent
//! without any cross-process locking.

#![warn(missing_docs)]

pub mod error;
pub mod merge;
pub mod record;

pub use error::ArchiveError;
pub use merge::{merge, merge_phase_2, run_archiver, MergedArchive};
pub use record::{expand_object_args, sanitize_key, RecordStore, TargetRecord};
