//! package.json parser and editor

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::manifest::error::ManifestError;

/// Dependency section of a package.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 2] =
        [DependencyKind::Dependencies, DependencyKind::DevDependencies];

    /// JSON key of the section
    pub fn field_name(&self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "dependencies",
            DependencyKind::DevDependencies => "devDependencies",
        }
    }

    fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == name)
    }
}

/// A dependency declared in package.json
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub name: String,
    /// Version specification as written (e.g., "^4.17.21")
    pub version: String,
    pub kind: DependencyKind,
    /// Byte offset of the version string in the source (start, inside quotes)
    pub start_offset: usize,
    /// Byte offset of the version string in the source (end, inside quotes)
    pub end_offset: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
}

impl DependencyEntry {
    /// Whether the specification resolves through the registry at all.
    ///
    /// Aliases, local paths, workspace links, git and tarball URLs do not.
    pub fn is_registry_spec(&self) -> bool {
        const NON_REGISTRY_PREFIXES: [&str; 9] = [
            "npm:",
            "file:",
            "link:",
            "workspace:",
            "portal:",
            "git",
            "github:",
            "http:",
            "https:",
        ];

        !NON_REGISTRY_PREFIXES
            .iter()
            .any(|prefix| self.version.starts_with(prefix))
            && !self.version.contains('/')
    }
}

/// A version to write for one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub kind: DependencyKind,
    pub version: String,
}

impl Selection {
    pub fn new(name: impl Into<String>, kind: DependencyKind, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            version: version.into(),
        }
    }
}

/// Result of applying selections to a manifest
#[derive(Debug)]
pub struct ManifestUpdate {
    /// The edited manifest text
    pub content: String,
    /// Selections written (replaced or inserted)
    pub applied: Vec<Selection>,
    /// Selections that could not be written, with the reason
    pub skipped: Vec<(Selection, ManifestError)>,
}

/// Layout of one dependency section object
#[derive(Debug)]
struct SectionLayout {
    kind: DependencyKind,
    /// Byte offset just after `{`
    open_end: usize,
    /// Byte offset of `}`
    close_start: usize,
    /// Byte range of the last pair
    last_pair: Option<(usize, usize)>,
    entries: Vec<DependencyEntry>,
}

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// Extract `dependencies` and `devDependencies` entries with string values
pub fn parse_dependencies(content: &str) -> Result<Vec<DependencyEntry>, ManifestError> {
    Ok(parse_layout(content)?
        .into_iter()
        .flat_map(|section| section.entries)
        .collect())
}

/// Write the selected versions into the manifest text.
///
/// Existing entries have their value replaced in place. Missing entries are
/// appended to their section. A selection whose section does not exist is
/// skipped and reported in [`ManifestUpdate::skipped`].
pub fn apply_selections(
    content: &str,
    selections: &[Selection],
) -> Result<ManifestUpdate, ManifestError> {
    let sections = parse_layout(content)?;

    let mut edits = Vec::new();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for kind in DependencyKind::ALL {
        // A repeated name keeps its first position and its last version
        let wanted: IndexMap<&str, &Selection> = selections
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| (s.name.as_str(), s))
            .collect();
        if wanted.is_empty() {
            continue;
        }

        let Some(section) = sections.iter().find(|s| s.kind == kind) else {
            warn!("No \"{}\" section to write into", kind.field_name());
            skipped.extend(
                wanted
                    .into_values()
                    .map(|s| (s.clone(), ManifestError::MissingSection(kind.field_name()))),
            );
            continue;
        };

        let mut inserts = Vec::new();
        for selection in wanted.into_values() {
            match section.entries.iter().find(|e| e.name == selection.name) {
                Some(entry) => edits.push(Edit {
                    start: entry.start_offset,
                    end: entry.end_offset,
                    text: escape_inner(&selection.version),
                }),
                None => inserts.push(selection),
            }
            applied.push(selection.clone());
        }

        if !inserts.is_empty() {
            edits.push(insertion_edit(section, &inserts, content));
        }
    }

    // Apply back to front so earlier offsets stay valid
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    debug_assert!(
        edits.windows(2).all(|pair| pair[1].end <= pair[0].start),
        "manifest edits overlap"
    );
    let mut updated = content.to_string();
    for edit in edits {
        updated.replace_range(edit.start..edit.end, &edit.text);
    }

    debug!(
        "Applied {} selections, skipped {}",
        applied.len(),
        skipped.len()
    );

    Ok(ManifestUpdate {
        content: updated,
        applied,
        skipped,
    })
}

fn parse_layout(content: &str) -> Result<Vec<SectionLayout>, ManifestError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_json::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set JSON language for tree-sitter: {}", e);
        ManifestError::TreeSitter(e.to_string())
    })?;

    let tree = parser.parse(content, None).ok_or_else(|| {
        warn!("Failed to parse JSON content");
        ManifestError::ParseFailed("Failed to parse JSON".to_string())
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(ManifestError::ParseFailed(
            "package.json contains syntax errors".to_string(),
        ));
    }

    let Some(document) = root.child(0).filter(|node| node.kind() == "object") else {
        return Err(ManifestError::ParseFailed(
            "package.json root is not an object".to_string(),
        ));
    };

    let mut sections = Vec::new();
    let mut cursor = document.walk();

    for child in document.children(&mut cursor) {
        if child.kind() != "pair" {
            continue;
        }

        let Some(key_node) = child.child_by_field_name("key") else {
            continue;
        };

        let Some(kind) = DependencyKind::from_field_name(&get_string_value(key_node, content))
        else {
            continue;
        };

        let Some(value_node) = child.child_by_field_name("value") else {
            continue;
        };

        if value_node.kind() != "object" {
            warn!("\"{}\" is not an object", kind.field_name());
            continue;
        }

        sections.push(section_layout(kind, value_node, content));
    }

    Ok(sections)
}

fn section_layout(
    kind: DependencyKind,
    object_node: tree_sitter::Node,
    content: &str,
) -> SectionLayout {
    let mut entries = Vec::new();
    let mut last_pair = None;
    let mut cursor = object_node.walk();

    for child in object_node.children(&mut cursor) {
        if child.kind() != "pair" {
            continue;
        }
        last_pair = Some((child.start_byte(), child.end_byte()));

        let (Some(key_node), Some(value_node)) = (
            child.child_by_field_name("key"),
            child.child_by_field_name("value"),
        ) else {
            continue;
        };

        if value_node.kind() != "string" {
            continue;
        }

        let start_point = value_node.start_position();

        // Adjust for quotes - the actual version starts after the opening quote
        entries.push(DependencyEntry {
            name: get_string_value(key_node, content),
            version: get_string_value(value_node, content),
            kind,
            start_offset: value_node.start_byte() + 1,
            end_offset: value_node.end_byte() - 1,
            line: start_point.row,
            column: start_point.column + 1,
        });
    }

    SectionLayout {
        kind,
        open_end: object_node.start_byte() + 1,
        close_start: object_node.end_byte() - 1,
        last_pair,
        entries,
    }
}

/// Build the text that appends new pairs to a section, matching its layout
fn insertion_edit(section: &SectionLayout, inserts: &[&Selection], content: &str) -> Edit {
    let pair = |s: &Selection| format!("{}: {}", json_string(&s.name), json_string(&s.version));
    let multiline = content[section.open_end..section.close_start].contains('\n');

    match section.last_pair {
        Some((pair_start, pair_end)) => {
            let separator = if multiline {
                format!(",\n{}", line_indent(content, pair_start))
            } else {
                ", ".to_string()
            };
            let text: String = inserts
                .iter()
                .map(|s| format!("{separator}{}", pair(*s)))
                .collect();
            Edit {
                start: pair_end,
                end: pair_end,
                text,
            }
        }
        None => {
            let key_indent = line_indent(content, section.open_end - 1);
            let pairs: Vec<String> = inserts.iter().map(|s| pair(*s)).collect();
            let text = if key_indent.is_empty() {
                pairs.join(", ")
            } else {
                let entry_indent = key_indent.repeat(2);
                format!(
                    "\n{entry_indent}{}\n{key_indent}",
                    pairs.join(&format!(",\n{entry_indent}"))
                )
            };
            Edit {
                start: section.open_end,
                end: section.close_start,
                text,
            }
        }
    }
}

/// Leading whitespace of the line containing `offset`
fn line_indent(content: &str, offset: usize) -> &str {
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &content[line_start..];
    let width = line.len() - line.trim_start_matches(|c: char| c == ' ' || c == '\t').len();
    &line[..width]
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// JSON-escaped text to place between existing quotes
fn escape_inner(value: &str) -> String {
    let quoted = json_string(value);
    quoted[1..quoted.len() - 1].to_string()
}

/// Get the string value from a string node (removes quotes)
fn get_string_value(node: tree_sitter::Node, content: &str) -> String {
    let text = &content[node.byte_range()];
    text.trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dependencies_extracts_both_sections() {
        let content = r#"{
  "name": "my-app",
  "dependencies": {
    "lodash": "4.17.21"
  },
  "devDependencies": {
    "typescript": "5.0.0"
  },
  "peerDependencies": {
    "react": "18.0.0"
  }
}"#;
        let result = parse_dependencies(content).unwrap();
        assert_eq!(
            result,
            vec![
                DependencyEntry {
                    name: "lodash".to_string(),
                    version: "4.17.21".to_string(),
                    kind: DependencyKind::Dependencies,
                    start_offset: 57,
                    end_offset: 64,
                    line: 3,
                    column: 15,
                },
                DependencyEntry {
                    name: "typescript".to_string(),
                    version: "5.0.0".to_string(),
                    kind: DependencyKind::DevDependencies,
                    start_offset: 113,
                    end_offset: 118,
                    line: 6,
                    column: 19,
                },
            ]
        );
    }

    #[test]
    fn parse_dependencies_returns_empty_without_sections() {
        let content = r#"{ "name": "my-app", "version": "1.0.0" }"#;
        assert!(parse_dependencies(content).unwrap().is_empty());
    }

    #[test]
    fn parse_dependencies_rejects_invalid_json() {
        let content = r#"{ "dependencies": { "lodash": } "#;
        assert!(matches!(
            parse_dependencies(content),
            Err(ManifestError::ParseFailed(_))
        ));
    }

    #[test]
    fn parse_dependencies_rejects_non_object_root() {
        assert!(matches!(
            parse_dependencies("[1, 2, 3]"),
            Err(ManifestError::ParseFailed(_))
        ));
    }

    #[test]
    fn is_registry_spec_detects_non_registry_sources() {
        let entry = |version: &str| DependencyEntry {
            name: "pkg".to_string(),
            version: version.to_string(),
            kind: DependencyKind::Dependencies,
            start_offset: 0,
            end_offset: 0,
            line: 0,
            column: 0,
        };

        assert!(entry("^1.2.3").is_registry_spec());
        assert!(entry(">=1 <2 || 3.x").is_registry_spec());
        assert!(!entry("npm:other@1.0.0").is_registry_spec());
        assert!(!entry("file:../local").is_registry_spec());
        assert!(!entry("workspace:*").is_registry_spec());
        assert!(!entry("git+https://example.com/repo.git").is_registry_spec());
        assert!(!entry("user/repo").is_registry_spec());
    }

    #[test]
    fn apply_selections_replaces_existing_values_in_place() {
        let content = r#"{
  "name": "my-app",
  "dependencies": {
    "lodash": "^4.0.0",
    "express": "4.17.0"
  },
  "devDependencies": {
    "typescript": "~4.9.0"
  }
}
"#;
        let update = apply_selections(
            content,
            &[
                Selection::new("lodash", DependencyKind::Dependencies, "4.17.21"),
                Selection::new("typescript", DependencyKind::DevDependencies, "5.3.3"),
            ],
        )
        .unwrap();

        assert_eq!(
            update.content,
            r#"{
  "name": "my-app",
  "dependencies": {
    "lodash": "4.17.21",
    "express": "4.17.0"
  },
  "devDependencies": {
    "typescript": "5.3.3"
  }
}
"#
        );
        assert_eq!(update.applied.len(), 2);
        assert!(update.skipped.is_empty());
    }

    #[test]
    fn apply_selections_appends_missing_entries_with_section_indent() {
        let content = "{\n  \"dependencies\": {\n    \"lodash\": \"4.17.21\"\n  }\n}\n";

        let update = apply_selections(
            content,
            &[
                Selection::new("express", DependencyKind::Dependencies, "4.18.2"),
                Selection::new("@types/node", DependencyKind::Dependencies, "20.11.0"),
            ],
        )
        .unwrap();

        assert_eq!(
            update.content,
            "{\n  \"dependencies\": {\n    \"lodash\": \"4.17.21\",\n    \"express\": \"4.18.2\",\n    \"@types/node\": \"20.11.0\"\n  }\n}\n"
        );
    }

    #[test]
    fn apply_selections_fills_empty_section() {
        let content = "{\n  \"devDependencies\": {}\n}\n";

        let update = apply_selections(
            content,
            &[Selection::new("jest", DependencyKind::DevDependencies, "29.7.0")],
        )
        .unwrap();

        assert_eq!(
            update.content,
            "{\n  \"devDependencies\": {\n    \"jest\": \"29.7.0\"\n  }\n}\n"
        );
    }

    #[test]
    fn apply_selections_keeps_inline_sections_inline() {
        let content = r#"{"dependencies": {"a": "1.0.0"}}"#;

        let update = apply_selections(
            content,
            &[Selection::new("b", DependencyKind::Dependencies, "2.0.0")],
        )
        .unwrap();

        assert_eq!(
            update.content,
            r#"{"dependencies": {"a": "1.0.0", "b": "2.0.0"}}"#
        );
    }

    #[test]
    fn apply_selections_skips_selection_without_section() {
        let content = "{\n  \"dependencies\": {\n    \"lodash\": \"4.0.0\"\n  }\n}\n";

        let update = apply_selections(
            content,
            &[
                Selection::new("lodash", DependencyKind::Dependencies, "4.17.21"),
                Selection::new("jest", DependencyKind::DevDependencies, "29.7.0"),
            ],
        )
        .unwrap();

        assert_eq!(
            update.content,
            "{\n  \"dependencies\": {\n    \"lodash\": \"4.17.21\"\n  }\n}\n"
        );
        assert_eq!(
            update.applied,
            vec![Selection::new(
                "lodash",
                DependencyKind::Dependencies,
                "4.17.21"
            )]
        );
        assert_eq!(update.skipped.len(), 1);
        assert_eq!(update.skipped[0].0.name, "jest");
        assert!(matches!(
            update.skipped[0].1,
            ManifestError::MissingSection("devDependencies")
        ));
    }

    #[test]
    fn apply_selections_writes_repeated_existing_entry_once() {
        let content = "{\n  \"dependencies\": {\n    \"a\": \"^1.0.0\"\n  }\n}\n";
        let selection = Selection::new("a", DependencyKind::Dependencies, "1.1.0");

        let update = apply_selections(content, &[selection.clone(), selection.clone()]).unwrap();

        assert_eq!(
            update.content,
            "{\n  \"dependencies\": {\n    \"a\": \"1.1.0\"\n  }\n}\n"
        );
        assert_eq!(update.applied, vec![selection]);
        assert_eq!(parse_dependencies(&update.content).unwrap().len(), 1);
    }

    #[test]
    fn apply_selections_inserts_repeated_missing_entry_once() {
        let content = "{\n  \"dependencies\": {\n    \"b\": \"2.0.0\"\n  }\n}\n";

        let update = apply_selections(
            content,
            &[
                Selection::new("a", DependencyKind::Dependencies, "1.0.0"),
                Selection::new("a", DependencyKind::Dependencies, "1.1.0"),
            ],
        )
        .unwrap();

        assert_eq!(
            update.content,
            "{\n  \"dependencies\": {\n    \"b\": \"2.0.0\",\n    \"a\": \"1.1.0\"\n  }\n}\n"
        );
        assert_eq!(update.applied.len(), 1);
    }

    #[test]
    fn apply_selections_keeps_same_name_in_both_sections() {
        let content = "{\n  \"dependencies\": {},\n  \"devDependencies\": {}\n}\n";

        let update = apply_selections(
            content,
            &[
                Selection::new("a", DependencyKind::Dependencies, "1.0.0"),
                Selection::new("a", DependencyKind::DevDependencies, "1.0.0"),
            ],
        )
        .unwrap();

        let entries = parse_dependencies(&update.content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, DependencyKind::Dependencies);
        assert_eq!(entries[1].kind, DependencyKind::DevDependencies);
    }

    #[test]
    fn apply_selections_escapes_values() {
        let content = "{\n  \"dependencies\": {\n    \"odd\": \"1.0.0\"\n  }\n}\n";

        let update = apply_selections(
            content,
            &[Selection::new("odd", DependencyKind::Dependencies, "1.0.0 \"x\"")],
        )
        .unwrap();

        assert!(update.content.contains(r#""odd": "1.0.0 \"x\"""#));
    }

    #[test]
    fn line_indent_returns_leading_whitespace() {
        let content = "{\n\t\t\"a\": 1\n}";
        let offset = content.find('"').unwrap();
        assert_eq!(line_indent(content, offset), "\t\t");
        assert_eq!(line_indent(content, 0), "");
    }
}
