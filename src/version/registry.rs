//! Registry trait for fetching package catalogs

#[cfg(test)]
use mockall::automock;

use crate::engine::types::VersionCatalogEntry;
use crate::version::error::RegistryError;

/// Trait for fetching the published versions of a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the metadata of every published version of a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "lodash", "@types/node")
    ///
    /// # Returns
    /// * `Ok(Vec<VersionCatalogEntry>)` - One entry per published version, in no particular order
    /// * `Err(RegistryError)` - If the fetch fails or the package does not exist
    async fn fetch_catalog(
        &self,
        package_name: &str,
    ) -> Result<Vec<VersionCatalogEntry>, RegistryError>;
}
