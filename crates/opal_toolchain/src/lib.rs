//! Native toolchain resolution for Opal's JIT and AOT paths.
//!
//! Finds a usable compiler driver across heterogeneous end-user machines where
//! build-time paths may be stale or access-restricted, filters the baked-in
//! JIT compile flags down to an effective subset, and manages the precompiled
//! prelude header that accelerates every JIT compilation.

#![warn(missing_docs)]

pub mod error;
pub mod flags;
pub mod pch;
pub mod resolver;

pub use error::ToolchainError;
pub use flags::{filter_effective_flags, filter_effective_flags_with};
pub use pch::{load_flags, PchManager, PchPaths};
pub use resolver::{
    driver_candidates, find_compiler_driver, find_driver_in, may_probe, path_in_bundle,
    process_in_bundle,
};
