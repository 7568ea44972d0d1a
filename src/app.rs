//! One invocation: resolve the requested dependencies, report, then update the manifest

use std::io::Write;

use tracing::{info, warn};

use crate::batch::{
    DependencyReport, DependencyRequest, requests_from_manifest, requests_from_names,
    resolve_dependencies,
};
use crate::config::RunConfig;
use crate::manifest::{
    ManifestError, ManifestUpdate, Selection, apply_selections, load_manifest, parse_dependencies,
    save_manifest,
};
use crate::report::{render_applied, render_report, render_skipped};
use crate::version::registry::Registry;

/// What a run did
#[derive(Debug)]
pub struct RunSummary {
    pub reports: Vec<DependencyReport>,
    /// `None` in view mode or when nothing was compatible
    pub update: Option<ManifestUpdate>,
}

/// Dependencies to check: the named ones, or every registry dependency in the manifest
pub fn collect_requests(
    config: &RunConfig,
    deps: &[String],
    dev_deps: &[String],
) -> Result<Vec<DependencyRequest>, ManifestError> {
    if !deps.is_empty() || !dev_deps.is_empty() {
        return Ok(requests_from_names(deps, dev_deps));
    }

    warn!(
        "No dependencies given, will use {} dependencies/devDependencies",
        config.manifest_path.display()
    );
    let content = load_manifest(&config.manifest_path)?;
    let entries = parse_dependencies(&content)?;
    Ok(requests_from_manifest(&entries))
}

pub async fn run(
    config: &RunConfig,
    requests: Vec<DependencyRequest>,
    registry: &dyn Registry,
    out: &mut dyn Write,
) -> anyhow::Result<RunSummary> {
    info!(
        "Checking {} dependencies against node {}",
        requests.len(),
        config.node_version
    );

    let reports = resolve_dependencies(
        registry,
        requests,
        &config.node_version,
        config.version_filter,
    )
    .await;

    for report in &reports {
        writeln!(out, "{}", render_report(report, &config.node_version))?;
    }

    if config.view_only {
        return Ok(RunSummary {
            reports,
            update: None,
        });
    }

    let selections: Vec<Selection> = reports.iter().filter_map(|r| r.selection()).collect();
    if selections.is_empty() {
        info!("Nothing to write to {}", config.manifest_path.display());
        return Ok(RunSummary {
            reports,
            update: None,
        });
    }

    let content = load_manifest(&config.manifest_path)?;
    let update = apply_selections(&content, &selections)?;
    save_manifest(&config.manifest_path, &update.content)?;

    for selection in &update.applied {
        writeln!(out, "{}", render_applied(selection))?;
    }
    for (selection, reason) in &update.skipped {
        warn!("Skipped {}: {}", selection.name, reason);
        writeln!(out, "{}", render_skipped(selection, reason))?;
    }

    Ok(RunSummary {
        reports,
        update: Some(update),
    })
}
