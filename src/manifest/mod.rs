//! package.json reading and editing
//!
//! Edits are applied as byte-range replacements on the original text, so
//! formatting, key order and unrelated fields are preserved.

pub mod error;
pub mod package_json;

use std::path::Path;

pub use error::ManifestError;
pub use package_json::{
    DependencyEntry, DependencyKind, ManifestUpdate, Selection, apply_selections,
    parse_dependencies,
};

/// Read the manifest file
pub fn load_manifest(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the manifest file
pub fn save_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    std::fs::write(path, content).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");

        save_manifest(&path, "{\n  \"name\": \"app\"\n}\n").unwrap();

        assert_eq!(load_manifest(&path).unwrap(), "{\n  \"name\": \"app\"\n}\n");
    }

    #[test]
    fn load_manifest_reports_missing_file_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");

        let err = load_manifest(&path).unwrap_err();

        assert!(matches!(err, ManifestError::Io { ref path, .. } if path.ends_with("package.json")));
    }
}
