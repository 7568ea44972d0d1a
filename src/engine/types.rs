//! Data model shared by the resolver and the collapser

use std::fmt;

use indexmap::IndexMap;

/// Raw engine-related metadata of one published version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalogEntry {
    /// Version string as published (e.g., "4.17.21")
    pub version: String,
    /// `engines.node` as declared in the published package.json
    pub declared_engine: Option<String>,
    /// `_nodeVersion`: the Node.js version the package was published with
    pub build_runtime_version: Option<String>,
    /// `_npmVersion`: the npm version the package was published with
    pub build_package_manager_version: Option<String>,
}

/// Where an engine requirement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementSource {
    /// Taken verbatim from `engines.node`
    DeclaredEngine,
    /// `>=` the Node.js version the package was built with
    InferredFromBuildRuntime,
    /// No engine signal at all; any runtime is accepted
    DefaultAny,
}

impl RequirementSource {
    /// Returns the string representation of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementSource::DeclaredEngine => "engines.node",
            RequirementSource::InferredFromBuildRuntime => "_nodeVersion",
            RequirementSource::DefaultAny => "default",
        }
    }
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime constraint derived for one package version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequirement {
    pub version: String,
    /// Always a non-empty, parseable range expression
    pub constraint: String,
    pub source: RequirementSource,
    /// Raw `engines.node`, kept for diagnostics even when it was not used
    pub declared_engine: Option<String>,
    /// Raw `_npmVersion`, kept for diagnostics
    pub build_package_manager_version: Option<String>,
}

/// Engine requirements keyed by version string, in catalog order
pub type RequirementMap = IndexMap<String, EngineRequirement>;

/// Which catalog versions take part in resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionFilter {
    /// Only plain `major.minor.patch` versions
    #[default]
    CanonicalOnly,
    /// Pre-release and build-tagged versions too
    All,
}

impl VersionFilter {
    pub fn from_all_versions_flag(all_versions: bool) -> Self {
        if all_versions {
            VersionFilter::All
        } else {
            VersionFilter::CanonicalOnly
        }
    }
}

/// Closed run `[lower, upper]` of consecutive compatible catalog versions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompatibilityInterval {
    pub lower: String,
    pub upper: String,
}

impl CompatibilityInterval {
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

impl fmt::Display for CompatibilityInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">={} <={}", self.lower, self.upper)
    }
}

/// Render intervals as a single range expression: `>=1.0.0 <=1.2.0 || >=2.0.0 <=2.1.0`
pub fn format_intervals(intervals: &[CompatibilityInterval]) -> String {
    intervals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" || ")
}
