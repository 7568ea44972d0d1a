//! npm-style semver range expressions
//!
//! Supports the range grammar found in `engines.node` fields:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators, also `>= 1.2.3`
//! - `1.2.x`, `1.x`, `*`, `10`, `>=10` - wildcards and partial versions
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=10 <14` (AND) and `^12 || ^14` (OR)
//!
//! Every form is desugared at parse time into plain comparators, so
//! satisfaction is a simple walk over the tree.

use semver::{BuildMetadata, Prerelease, Version};

use crate::version::error::VersionError;
use crate::version::semver::normalize_version;

/// A parsed range expression such as `>=14 <20 || ^22`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    spec: VersionSpec,
}

impl RangeSpec {
    /// Parse a range expression
    ///
    /// Empty alternatives inside an OR (`1.x ||`) match anything, but an
    /// entirely empty expression is rejected.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::InvalidRange(input.to_string()));
        }

        let mut alternatives = trimmed
            .split("||")
            .map(parse_conjunction)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| VersionError::InvalidRange(input.to_string()))?;

        let spec = if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            VersionSpec::Or(alternatives)
        };

        Ok(Self { spec })
    }

    /// Check if a version satisfies this range
    pub fn satisfies(&self, version: &Version) -> bool {
        self.spec.satisfies(version)
    }
}

/// Compound range tree
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionSpec {
    /// Single comparator
    Single(VersionRange),
    /// AND of ranges (>=1.0.0 <2.0.0) - space-separated, all must satisfy
    And(Vec<VersionSpec>),
    /// OR of specs (^1.0.0 || ^2.0.0) - any must satisfy
    Or(Vec<VersionSpec>),
}

impl VersionSpec {
    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Single(range) => range.satisfies(version),
            VersionSpec::And(specs) => specs.iter().all(|s| s.satisfies(version)),
            VersionSpec::Or(specs) => specs.iter().any(|s| s.satisfies(version)),
        }
    }
}

/// Desugared comparator
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionRange {
    /// `*`, `x`, `>=*`
    Any,
    /// `<*`, `>*`
    Never,
    Exact(Version),
    Gte(Version),
    Gt(Version),
    Lte(Version),
    Lt(Version),
    /// Half-open `>=from <to`, produced by carets, tildes and x-ranges
    Span { from: Version, to: Version },
}

impl VersionRange {
    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::Never => false,
            VersionRange::Exact(v) => version == v,
            VersionRange::Gte(v) => version >= v,
            VersionRange::Gt(v) => version > v,
            VersionRange::Lte(v) => version <= v,
            VersionRange::Lt(v) => version < v,
            VersionRange::Span { from, to } => version >= from && version < to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Gte,
    Gt,
    Lte,
    Lt,
    Caret,
    Tilde,
}

impl Operator {
    /// Longest prefixes first so `>=` is not read as `>`
    const PREFIXES: [(&'static str, Operator); 8] = [
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        ("~>", Operator::Tilde),
        (">", Operator::Gt),
        ("<", Operator::Lt),
        ("=", Operator::Eq),
        ("^", Operator::Caret),
        ("~", Operator::Tilde),
    ];

    fn split(term: &str) -> (Self, &str) {
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, op)| {
                term.strip_prefix(*prefix)
                    .map(|rest| (*op, rest.trim_start()))
            })
            .unwrap_or((Operator::Eq, term))
    }

    fn is_bare(token: &str) -> bool {
        Self::PREFIXES.iter().any(|(prefix, _)| *prefix == token)
    }
}

/// A version whose trailing components may be missing or wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let text = normalize_version(text);
        let text = text.split_once('+').map_or(text, |(core, _)| core);
        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (text, None),
        };

        let components: Vec<&str> = core.split('.').collect();
        if components.len() > 3 {
            return None;
        }

        let mut numbers = [None; 3];
        let mut wildcard_seen = false;
        for (slot, part) in numbers.iter_mut().zip(&components) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard_seen = true;
                continue;
            }
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // Anything after a wildcard is ignored: 1.x.3 is 1.x
            if !wildcard_seen {
                *slot = Some(part.parse::<u64>().ok()?);
            }
        }

        let [major, minor, patch] = numbers;
        let pre = match pre {
            Some(pre) if patch.is_some() => Prerelease::new(pre).ok()?,
            Some(_) => return None,
            None => Prerelease::EMPTY,
        };

        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

fn version(major: u64, minor: u64, patch: u64) -> Version {
    Version::new(major, minor, patch)
}

fn next_major(major: u64) -> Version {
    version(major.saturating_add(1), 0, 0)
}

fn next_minor(major: u64, minor: u64) -> Version {
    version(major, minor.saturating_add(1), 0)
}

/// Turn an operator and a possibly partial version into a comparator
fn desugar(op: Operator, partial: Partial) -> VersionRange {
    let Some(major) = partial.major else {
        return match op {
            Operator::Gt | Operator::Lt => VersionRange::Never,
            _ => VersionRange::Any,
        };
    };

    match (partial.minor, partial.patch) {
        (Some(minor), Some(patch)) => {
            let full = Version {
                major,
                minor,
                patch,
                pre: partial.pre,
                build: BuildMetadata::EMPTY,
            };
            match op {
                Operator::Eq => VersionRange::Exact(full),
                Operator::Gte => VersionRange::Gte(full),
                Operator::Gt => VersionRange::Gt(full),
                Operator::Lte => VersionRange::Lte(full),
                Operator::Lt => VersionRange::Lt(full),
                Operator::Tilde => VersionRange::Span {
                    from: full,
                    to: next_minor(major, minor),
                },
                // ^1.2.3 -> <2.0.0, ^0.2.3 -> <0.3.0, ^0.0.3 -> <0.0.4
                Operator::Caret => {
                    let to = if major > 0 {
                        next_major(major)
                    } else if minor > 0 {
                        next_minor(0, minor)
                    } else {
                        version(0, 0, patch.saturating_add(1))
                    };
                    VersionRange::Span { from: full, to }
                }
            }
        }
        (Some(minor), None) => match op {
            Operator::Eq | Operator::Tilde => VersionRange::Span {
                from: version(major, minor, 0),
                to: next_minor(major, minor),
            },
            Operator::Caret if major == 0 => VersionRange::Span {
                from: version(0, minor, 0),
                to: next_minor(0, minor),
            },
            Operator::Caret => VersionRange::Span {
                from: version(major, minor, 0),
                to: next_major(major),
            },
            Operator::Gte => VersionRange::Gte(version(major, minor, 0)),
            Operator::Gt => VersionRange::Gte(next_minor(major, minor)),
            Operator::Lte => VersionRange::Lt(next_minor(major, minor)),
            Operator::Lt => VersionRange::Lt(version(major, minor, 0)),
        },
        _ => match op {
            Operator::Eq | Operator::Tilde | Operator::Caret => VersionRange::Span {
                from: version(major, 0, 0),
                to: next_major(major),
            },
            Operator::Gte => VersionRange::Gte(version(major, 0, 0)),
            Operator::Gt => VersionRange::Gte(next_major(major)),
            Operator::Lte => VersionRange::Lt(next_major(major)),
            Operator::Lt => VersionRange::Lt(version(major, 0, 0)),
        },
    }
}

/// Split on whitespace, gluing a detached operator onto the version after it
/// (`>= 10` becomes `>=10`)
fn tokenize(part: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending_operator: Option<&str> = None;

    for word in part.split_whitespace() {
        match pending_operator.take() {
            Some(op) => tokens.push(format!("{op}{word}")),
            None if Operator::is_bare(word) => pending_operator = Some(word),
            None => tokens.push(word.to_string()),
        }
    }

    // A dangling operator is kept so that parsing rejects it
    if let Some(op) = pending_operator {
        tokens.push(op.to_string());
    }

    tokens
}

fn parse_comparator(token: &str) -> Option<VersionRange> {
    let (op, rest) = Operator::split(token);
    Partial::parse(rest).map(|partial| desugar(op, partial))
}

/// `1.2 - 2.3` means `>=1.2.0 <2.4.0`
fn parse_hyphen(from: &str, to: &str) -> Option<VersionSpec> {
    let lower = desugar(Operator::Gte, Partial::parse(from)?);
    let upper = desugar(Operator::Lte, Partial::parse(to)?);
    Some(VersionSpec::And(vec![
        VersionSpec::Single(lower),
        VersionSpec::Single(upper),
    ]))
}

/// Parse one `||` alternative: space-separated comparators and hyphen ranges
fn parse_conjunction(part: &str) -> Option<VersionSpec> {
    let tokens = tokenize(part);
    if tokens.is_empty() {
        return Some(VersionSpec::Single(VersionRange::Any));
    }

    let mut specs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens.get(i + 1).is_some_and(|t| t == "-") {
            let to = tokens.get(i + 2)?;
            specs.push(parse_hyphen(&tokens[i], to)?);
            i += 3;
        } else {
            specs.push(VersionSpec::Single(parse_comparator(&tokens[i])?));
            i += 1;
        }
    }

    if specs.len() == 1 {
        specs.pop()
    } else {
        Some(VersionSpec::And(specs))
    }
}
