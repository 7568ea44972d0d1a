//! npm registry API implementation

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{DEFAULT_REGISTRY_URL, FETCH_TIMEOUT_MS};
use crate::engine::types::VersionCatalogEntry;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// Response from npm registry API (full packument)
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(default)]
    versions: IndexMap<String, Value>,
}

/// Registry implementation for npm registry API
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("engine-range/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    /// Pick the engine-related fields out of one version document.
    ///
    /// Very old packages publish `engines` as an array of strings; those carry
    /// no usable `node` key and are treated as absent.
    fn catalog_entry(version: String, info: &Value) -> VersionCatalogEntry {
        let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);

        VersionCatalogEntry {
            version,
            declared_engine: text(info.get("engines").and_then(|engines| engines.get("node"))),
            build_runtime_version: text(info.get("_nodeVersion")),
            build_package_manager_version: text(info.get("_npmVersion")),
        }
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_catalog(
        &self,
        package_name: &str,
    ) -> Result<Vec<VersionCatalogEntry>, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        let catalog: Vec<VersionCatalogEntry> = package_info
            .versions
            .into_iter()
            .map(|(version, info)| Self::catalog_entry(version, &info))
            .collect();

        debug!("{} has {} published versions", package_name, catalog.len());

        Ok(catalog)
    }
}
