//! Link command composition for Opal's AOT and JIT paths.
//!
//! The AOT path assembles the final linker invocation from the merged
//! archives, the user's requested search paths and libraries, and the
//! platform's required system frameworks. The JIT path resolves the same
//! user libraries against the dynamic loader's search instead, using the
//! platform's on-disk naming convention so present libraries are actually
//! found.

#![warn(missing_docs)]

pub mod compose;
pub mod error;

pub use compose::{
    compose_link, dynamic_library_filename, resolve_dynamic_library, ComposedLink, LinkMode,
    LinkRequest,
};
pub use error::LinkError;
