use std::path::PathBuf;

use thiserror::Error;

/// Error type for manifest operations
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON object or contains syntax errors
    #[error("Failed to parse manifest: {0}")]
    ParseFailed(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// The dependency section to write into does not exist
    #[error("\"{0}\" section not found in manifest")]
    MissingSection(&'static str),
}
