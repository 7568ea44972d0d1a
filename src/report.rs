//! Human-readable output lines

use crate::batch::{DependencyOutcome, DependencyReport};
use crate::engine::types::format_intervals;
use crate::manifest::{ManifestError, Selection};

/// One line describing what was found for a dependency
pub fn render_report(report: &DependencyReport, node_version: &str) -> String {
    let name = &report.request.name;
    match &report.outcome {
        DependencyOutcome::Compatible { intervals, .. } => {
            format!("{} range is: {}", name, format_intervals(intervals))
        }
        DependencyOutcome::NoCompatibleVersion => {
            format!("{}: no version is compatible with node {}", name, node_version)
        }
        DependencyOutcome::CatalogUnavailable(e) => {
            format!("{}: could not fetch versions: {}", name, e)
        }
        DependencyOutcome::InvalidVersionData(e) => {
            format!("{}: could not compare versions: {}", name, e)
        }
    }
}

pub fn render_applied(selection: &Selection) -> String {
    format!(
        "{}: set to {} in {}",
        selection.name,
        selection.version,
        selection.kind.field_name()
    )
}

pub fn render_skipped(selection: &Selection, reason: &ManifestError) -> String {
    format!("{}: not written ({})", selection.name, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::DependencyRequest;
    use crate::engine::{CollapseError, CompatibilityInterval};
    use crate::manifest::DependencyKind;
    use crate::version::error::RegistryError;

    fn report(outcome: DependencyOutcome) -> DependencyReport {
        DependencyReport {
            request: DependencyRequest::new("lodash", DependencyKind::Dependencies),
            outcome,
        }
    }

    #[test]
    fn render_report_lists_intervals() {
        let line = render_report(
            &report(DependencyOutcome::Compatible {
                intervals: vec![
                    CompatibilityInterval::new("1.0.0", "1.2.0"),
                    CompatibilityInterval::new("2.0.0", "2.0.0"),
                ],
                selected: "2.0.0".to_string(),
            }),
            "12.0.0",
        );

        assert_eq!(line, "lodash range is: >=1.0.0 <=1.2.0 || >=2.0.0 <=2.0.0");
    }

    #[test]
    fn render_report_distinguishes_failures() {
        assert_eq!(
            render_report(&report(DependencyOutcome::NoCompatibleVersion), "8.0.0"),
            "lodash: no version is compatible with node 8.0.0"
        );
        assert_eq!(
            render_report(
                &report(DependencyOutcome::CatalogUnavailable(RegistryError::NotFound(
                    "lodash".to_string()
                ))),
                "8.0.0"
            ),
            "lodash: could not fetch versions: Package not found: lodash"
        );
        assert!(
            render_report(
                &report(DependencyOutcome::InvalidVersionData(
                    CollapseError::MalformedTarget("x".to_string())
                )),
                "x"
            )
            .starts_with("lodash: could not compare versions:")
        );
    }

    #[test]
    fn render_applied_names_section() {
        let selection = Selection::new("jest", DependencyKind::DevDependencies, "29.7.0");

        assert_eq!(
            render_applied(&selection),
            "jest: set to 29.7.0 in devDependencies"
        );
    }

    #[test]
    fn render_skipped_includes_reason() {
        let selection = Selection::new("jest", DependencyKind::DevDependencies, "29.7.0");

        assert_eq!(
            render_skipped(&selection, &ManifestError::MissingSection("devDependencies")),
            "jest: not written (\"devDependencies\" section not found in manifest)"
        );
    }
}
