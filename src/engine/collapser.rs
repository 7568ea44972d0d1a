//! Collapse per-version compatibility into contiguous intervals

use semver::Version;
use tracing::debug;

use crate::engine::error::CollapseError;
use crate::engine::types::{CompatibilityInterval, RequirementMap};
use crate::version::range::RangeSpec;
use crate::version::semver::{parse_catalog_version, parse_version};

/// Find every maximal run of consecutive versions whose engine constraint is
/// satisfied by `target`.
///
/// Versions are walked in ascending semver order, so the returned intervals
/// are disjoint and ascending: the last one covers the newest compatible
/// versions. An empty result means no version is compatible.
///
/// Fails fast if the target, any version key or any constraint does not parse.
pub fn collapse_ranges(
    requirements: &RequirementMap,
    target: &str,
) -> Result<Vec<CompatibilityInterval>, CollapseError> {
    let target_version =
        parse_version(target).ok_or_else(|| CollapseError::MalformedTarget(target.to_string()))?;

    let mut scanned: Vec<(Version, &str, bool)> = requirements
        .iter()
        .map(|(version, requirement)| -> Result<_, CollapseError> {
            let parsed = parse_catalog_version(version)
                .ok_or_else(|| CollapseError::MalformedVersion(version.clone()))?;
            let range = RangeSpec::parse(&requirement.constraint).map_err(|_| {
                CollapseError::MalformedConstraint {
                    version: version.clone(),
                    constraint: requirement.constraint.clone(),
                }
            })?;
            Ok((parsed, version.as_str(), range.satisfies(&target_version)))
        })
        .collect::<Result<_, CollapseError>>()?;

    scanned.sort_by(|(a, ..), (b, ..)| a.cmp(b));

    let mut intervals = Vec::new();
    let mut open: Option<(&str, &str)> = None;

    for (_, version, satisfied) in scanned {
        open = match (open, satisfied) {
            (None, true) => Some((version, version)),
            (Some((lower, _)), true) => Some((lower, version)),
            (Some((lower, upper)), false) => {
                intervals.push(CompatibilityInterval::new(lower, upper));
                None
            }
            (None, false) => None,
        };
    }

    if let Some((lower, upper)) = open {
        intervals.push(CompatibilityInterval::new(lower, upper));
    }

    debug!(
        "node {} is compatible with {} interval(s) out of {} versions",
        target,
        intervals.len(),
        requirements.len()
    );

    Ok(intervals)
}

/// Upper bound of the last interval: the newest compatible version.
///
/// None means no compatible release exists.
pub fn select_latest(intervals: &[CompatibilityInterval]) -> Option<&str> {
    intervals.last().map(|interval| interval.upper.as_str())
}
