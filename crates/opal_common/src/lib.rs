//! Shared foundational types for the Opal build orchestrator.
//!
//! This crate provides the non-raising filesystem probe used by every component
//! that resolves toolchain, precompiled-header, or flag paths, plus the
//! environment and path discovery lookups for the running process.

#![warn(missing_docs)]

pub mod env;
pub mod probe;

pub use env::{
    binary_version, make_temp_file, process_dir, process_path, resource_dir, user_cache_dir,
    user_config_dir, user_home_dir,
};
pub use probe::{probe, Probe};
