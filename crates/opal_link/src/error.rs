//! Error types for link composition.

use std::path::PathBuf;

/// Errors that can occur while composing link inputs.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A user-requested library is absent from every search directory.
    ///
    /// Reports the exact filename looked for and the exact directories
    /// consulted, so platform naming-convention mismatches are diagnosable
    /// from the message alone.
    #[error(
        "library `{name}` not found: looked for `{filename}` in {}",
        .searched.iter().map(|d| d.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    LibraryNotFound {
        /// The bare library name the user requested.
        name: String,
        /// The platform-specific filename that was searched for.
        filename: String,
        /// Every directory consulted, in search order.
        searched: Vec<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_filename_and_every_search_path() {
        let err = LinkError::LibraryNotFound {
            name: "cairo".to_string(),
            filename: "libcairo.so".to_string(),
            searched: vec![PathBuf::from("/usr/lib"), PathBuf::from("/opt/lib")],
        };
        let msg = err.to_string();
        assert!(msg.contains("`cairo`"));
        assert!(msg.contains("libcairo.so"));
        assert!(msg.contains("/usr/lib"));
        assert!(msg.contains("/opt/lib"));
    }
}
