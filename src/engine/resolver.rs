//! Engine requirement derivation
//!
//! Turns a package catalog into one [`EngineRequirement`] per version in two
//! independent steps: [`accepts`] decides which versions take part, and
//! [`derive_requirement`] applies the fallback chain
//! `engines.node` -> `>=_nodeVersion` -> `*`.

use tracing::{debug, warn};

use crate::engine::types::{
    EngineRequirement, RequirementMap, RequirementSource, VersionCatalogEntry, VersionFilter,
};
use crate::version::range::RangeSpec;
use crate::version::semver::{is_canonical, parse_catalog_version};

/// Constraint used when a version carries no engine signal
pub const ANY_VERSION: &str = "*";

/// Build the requirement map for every catalog version accepted by `filter`.
///
/// Never fails: versions with unparseable version strings or constraints are
/// logged and left out, and an empty catalog yields an empty map.
pub fn resolve_requirements(
    catalog: &[VersionCatalogEntry],
    filter: VersionFilter,
) -> RequirementMap {
    let requirements: RequirementMap = catalog
        .iter()
        .filter(|entry| accepts(filter, &entry.version))
        .filter_map(derive_requirement)
        .map(|requirement| (requirement.version.clone(), requirement))
        .collect();

    debug!(
        "Derived {} engine requirements from {} catalog entries",
        requirements.len(),
        catalog.len()
    );

    requirements
}

/// Whether a catalog version takes part in resolution
pub fn accepts(filter: VersionFilter, version: &str) -> bool {
    if filter == VersionFilter::CanonicalOnly && !is_canonical(version) {
        return false;
    }

    if parse_catalog_version(version).is_none() {
        warn!("Skipping malformed version string: {:?}", version);
        return false;
    }

    true
}

/// Apply the three-tier fallback to a single catalog entry.
///
/// Returns None when the resulting constraint does not parse.
pub fn derive_requirement(entry: &VersionCatalogEntry) -> Option<EngineRequirement> {
    let declared = non_blank(entry.declared_engine.as_deref());
    let build_runtime = non_blank(entry.build_runtime_version.as_deref());

    let (constraint, source) = match (declared, build_runtime) {
        (Some(declared), _) => (declared.to_string(), RequirementSource::DeclaredEngine),
        (None, Some(build_runtime)) => (
            format!(">={}", build_runtime.trim()),
            RequirementSource::InferredFromBuildRuntime,
        ),
        (None, None) => (ANY_VERSION.to_string(), RequirementSource::DefaultAny),
    };

    if let Err(e) = RangeSpec::parse(&constraint) {
        warn!(
            "Skipping {}: unusable {} constraint ({})",
            entry.version, source, e
        );
        return None;
    }

    Some(EngineRequirement {
        version: entry.version.clone(),
        constraint,
        source,
        declared_engine: entry.declared_engine.clone(),
        build_package_manager_version: entry.build_package_manager_version.clone(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
