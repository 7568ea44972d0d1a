//! Batch resolution of dependencies against one Node.js version
//!
//! Each dependency is fetched and resolved independently; a failure for one
//! never affects the others.

use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::engine::{
    CollapseError, CompatibilityInterval, VersionFilter, collapse_ranges, resolve_requirements,
    select_latest,
};
use crate::manifest::{DependencyEntry, DependencyKind, Selection};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// A dependency to resolve and the manifest section it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRequest {
    pub name: String,
    pub kind: DependencyKind,
}

impl DependencyRequest {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// What resolution produced for one dependency
#[derive(Debug)]
pub enum DependencyOutcome {
    /// At least one release runs on the target; `selected` is the newest
    Compatible {
        intervals: Vec<CompatibilityInterval>,
        selected: String,
    },
    /// The catalog was fetched but no release accepts the target
    NoCompatibleVersion,
    /// The registry could not provide a catalog
    CatalogUnavailable(RegistryError),
    /// The catalog or target could not be compared
    InvalidVersionData(CollapseError),
}

#[derive(Debug)]
pub struct DependencyReport {
    pub request: DependencyRequest,
    pub outcome: DependencyOutcome,
}

impl DependencyReport {
    /// The manifest write this report calls for, if any
    pub fn selection(&self) -> Option<Selection> {
        match &self.outcome {
            DependencyOutcome::Compatible { selected, .. } => Some(Selection::new(
                self.request.name.clone(),
                self.request.kind,
                selected.clone(),
            )),
            _ => None,
        }
    }
}

/// Requests for explicitly named dependencies.
///
/// A name repeated within one section is requested once.
pub fn requests_from_names(deps: &[String], dev_deps: &[String]) -> Vec<DependencyRequest> {
    let requests: IndexSet<DependencyRequest> = deps
        .iter()
        .map(|name| DependencyRequest::new(name.clone(), DependencyKind::Dependencies))
        .chain(
            dev_deps
                .iter()
                .map(|name| DependencyRequest::new(name.clone(), DependencyKind::DevDependencies)),
        )
        .collect();

    requests.into_iter().collect()
}

/// Requests for every registry dependency declared in the manifest
pub fn requests_from_manifest(entries: &[DependencyEntry]) -> Vec<DependencyRequest> {
    entries
        .iter()
        .filter(|entry| {
            let keep = entry.is_registry_spec();
            if !keep {
                info!(
                    "Skipping {} ({}:{}:{}): \"{}\" is not a registry version",
                    entry.name,
                    entry.kind.field_name(),
                    entry.line + 1,
                    entry.column + 1,
                    entry.version
                );
            }
            keep
        })
        .map(|entry| DependencyRequest::new(entry.name.clone(), entry.kind))
        .collect()
}

/// Fetch one package's catalog and find the releases compatible with `node_version`
pub async fn resolve_dependency(
    registry: &dyn Registry,
    package_name: &str,
    node_version: &str,
    filter: VersionFilter,
) -> DependencyOutcome {
    let catalog = match registry.fetch_catalog(package_name).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to fetch catalog for {}: {}", package_name, e);
            return DependencyOutcome::CatalogUnavailable(e);
        }
    };

    let requirements = resolve_requirements(&catalog, filter);
    for requirement in requirements.values() {
        debug!(
            "{}@{} requires node {} (from {})",
            package_name, requirement.version, requirement.constraint, requirement.source
        );
    }

    let intervals = match collapse_ranges(&requirements, node_version) {
        Ok(intervals) => intervals,
        Err(e) => {
            error!("Cannot compare versions of {}: {}", package_name, e);
            return DependencyOutcome::InvalidVersionData(e);
        }
    };

    let Some(selected) = select_latest(&intervals).map(str::to_string) else {
        warn!(
            "No release of {} is compatible with node {}",
            package_name, node_version
        );
        return DependencyOutcome::NoCompatibleVersion;
    };

    DependencyOutcome::Compatible {
        intervals,
        selected,
    }
}

/// Resolve every request concurrently, preserving request order in the result.
///
/// Fetches are executed in parallel with staggered start times to avoid rate limiting.
pub async fn resolve_dependencies(
    registry: &dyn Registry,
    requests: Vec<DependencyRequest>,
    node_version: &str,
    filter: VersionFilter,
) -> Vec<DependencyReport> {
    let futures = requests.into_iter().enumerate().map(|(i, request)| {
        let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
        async move {
            sleep(delay).await;
            let outcome = resolve_dependency(registry, &request.name, node_version, filter).await;
            DependencyReport { request, outcome }
        }
    });

    join_all(futures).await
}
