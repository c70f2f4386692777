//! Build orchestration configuration for Opal.
//!
//! This crate owns the layout of one build invocation (where the object
//! archive cache lives, where the merged archives are written, where the
//! compiled standard-library core lands) plus the toolchain defaults baked in
//! at build time and their runtime overrides. The layout is explicit state
//! passed into every operation that needs it; nothing here is process-global.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{BuildPaths, OrchestratorConfig, ToolchainConfig};
