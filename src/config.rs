use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::engine::types::VersionFilter;
use crate::version::semver::{normalize_version, parse_version};

// =============================================================================
// Constants
// =============================================================================

/// Default npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Timeout for a single registry request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each fetch request to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Manifest file looked up in the working directory
pub const MANIFEST_FILE: &str = "package.json";

/// Environment variable npm itself uses to override the registry
const NPM_REGISTRY_ENV: &str = "npm_config_registry";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to run `node --version`: {0}")]
    NodeNotFound(#[from] std::io::Error),

    #[error("Invalid Node.js version: {0:?}")]
    InvalidNodeVersion(String),
}

/// Everything a run needs, resolved up front so nothing below reads ambient state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Registry base URL without trailing slash
    pub registry_url: String,
    /// Node.js version compatibility is checked against (no `v` prefix)
    pub node_version: String,
    pub version_filter: VersionFilter,
    /// Print ranges without touching the manifest
    pub view_only: bool,
    pub manifest_path: PathBuf,
}

/// Determine the registry URL.
///
/// Priority: explicit value, `npm_config_registry`, `<cwd>/.npmrc`,
/// `~/.npmrc`, then the public npm registry.
pub fn discover_registry(explicit: Option<&str>, cwd: &Path) -> String {
    let read_npmrc = |dir: &Path| std::fs::read_to_string(dir.join(".npmrc")).ok();

    discover_registry_with_env(
        explicit,
        std::env::var(NPM_REGISTRY_ENV).ok(),
        read_npmrc(cwd),
        dirs::home_dir().and_then(|home| read_npmrc(&home)),
    )
}

fn discover_registry_with_env(
    explicit: Option<&str>,
    env_registry: Option<String>,
    project_npmrc: Option<String>,
    user_npmrc: Option<String>,
) -> String {
    let registry = explicit
        .map(str::to_string)
        .or(env_registry)
        .or_else(|| project_npmrc.as_deref().and_then(npmrc_registry))
        .or_else(|| user_npmrc.as_deref().and_then(npmrc_registry))
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

    let registry = registry.trim().trim_end_matches('/').to_string();
    debug!("Using registry {}", registry);
    registry
}

/// Extract the top-level `registry=` entry from `.npmrc` content
fn npmrc_registry(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "registry")
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// Determine the target Node.js version.
///
/// Uses the explicit value when given, otherwise asks the `node` binary on PATH.
pub fn detect_node_version(explicit: Option<&str>) -> Result<String, ConfigError> {
    let raw = match explicit {
        Some(version) => version.to_string(),
        None => {
            let output = Command::new("node").arg("--version").output()?;
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
    };

    parse_node_version(&raw)
}

/// Normalize `v20.11.0\n` style output into `20.11.0`
fn parse_node_version(raw: &str) -> Result<String, ConfigError> {
    let normalized = normalize_version(raw);
    if parse_version(normalized).is_none() {
        return Err(ConfigError::InvalidNodeVersion(raw.trim().to_string()));
    }
    Ok(normalized.to_string())
}

/// Manifest path: explicit path or `package.json` in `cwd`
pub fn manifest_path(explicit: Option<PathBuf>, cwd: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| cwd.join(MANIFEST_FILE))
}
