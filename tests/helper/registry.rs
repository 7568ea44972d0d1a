//! Registry test utilities

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tempfile::TempDir;

use engine_range::config::RunConfig;
use engine_range::engine::{VersionCatalogEntry, VersionFilter};
use engine_range::version::error::RegistryError;
use engine_range::version::registry::Registry;

/// Mock registry serving fixed catalogs
#[derive(Default)]
pub struct MockRegistry {
    catalogs: HashMap<String, Vec<VersionCatalogEntry>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package whose versions declare `engines.node` (or nothing, for `None`)
    pub fn with_engines(mut self, package: &str, versions: &[(&str, Option<&str>)]) -> Self {
        self.catalogs.insert(
            package.to_string(),
            versions
                .iter()
                .map(|(version, engine)| VersionCatalogEntry {
                    version: version.to_string(),
                    declared_engine: engine.map(str::to_string),
                    ..Default::default()
                })
                .collect(),
        );
        self
    }

    #[allow(dead_code)]
    pub fn with_catalog(mut self, package: &str, catalog: Vec<VersionCatalogEntry>) -> Self {
        self.catalogs.insert(package.to_string(), catalog);
        self
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_catalog(
        &self,
        package_name: &str,
    ) -> Result<Vec<VersionCatalogEntry>, RegistryError> {
        match self.catalogs.get(package_name) {
            Some(catalog) => Ok(catalog.clone()),
            None => Err(RegistryError::NotFound(package_name.to_string())),
        }
    }
}

/// Create a project directory holding `package.json` and a config pointing at it
pub fn create_test_project(
    manifest: &str,
    node_version: &str,
    view_only: bool,
) -> (TempDir, RunConfig) {
    let temp_dir = TempDir::new().unwrap();
    let manifest_path = temp_dir.path().join("package.json");
    std::fs::write(&manifest_path, manifest).unwrap();

    let config = RunConfig {
        registry_url: "http://127.0.0.1".to_string(),
        node_version: node_version.to_string(),
        version_filter: VersionFilter::CanonicalOnly,
        view_only,
        manifest_path,
    };

    (temp_dir, config)
}

#[allow(dead_code)]
pub fn read_manifest(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
