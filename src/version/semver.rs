use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// Matches a strict `major.minor.patch` version with no pre-release or build suffix
static CANONICAL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid canonical version regex"));

/// Returns true if the version is a plain `major.minor.patch` triple.
///
/// Examples:
/// - "1.2.3" -> true
/// - "1.2.3-beta.1" -> false
/// - "1.2.3+build.5" -> false
/// - "v1.2.3" -> false
pub fn is_canonical(version: &str) -> bool {
    CANONICAL_VERSION.is_match(version)
}

/// Strip a leading `v` (as printed by `node --version`) and surrounding whitespace
pub fn normalize_version(version: &str) -> &str {
    let version = version.trim();
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}

/// Parse a catalog version string strictly.
///
/// Catalog keys are full semver strings, so no padding is applied here.
pub fn parse_catalog_version(version: &str) -> Option<Version> {
    Version::parse(version.trim()).ok()
}

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros and
/// strips a leading 'v'.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = normalize_version(version);
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}
