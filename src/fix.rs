//! Schema Constraint Fixer
//!
//! Rewrites JSON Schemas so downstream type generators accept them:
//! conflicting `enum` + `const` pairs lose the `enum`, numeric schemas lose
//! their bounds. Constructs generators commonly reject (`patternProperties`,
//! `if`/`then`/`else`) are reported but left alone.

use serde::Serialize;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::FixConfig;
use crate::error::{Result, SnippetError};
use crate::loader::{load_json_file, scan_json_files};

const NUMERIC_BOUNDS: [&str; 4] = ["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum"];
const CONDITIONAL_KEYS: [&str; 3] = ["if", "then", "else"];

/// What a fix pass did at one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    /// `enum` removed in favour of `const`
    EnumConstConflict,
    /// Bounds removed from a number/integer schema
    NumericConstraints,
    /// `patternProperties` present (not modified)
    PatternProperties,
    /// `if`/`then`/`else` present (not modified)
    Conditional,
}

impl FixKind {
    /// Warnings leave the schema untouched
    pub fn is_warning(&self) -> bool {
        matches!(self, FixKind::PatternProperties | FixKind::Conditional)
    }
}

/// One recorded change or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixChange {
    pub kind: FixKind,
    /// JSON location of the object; `$` for the document root
    pub location: String,
    pub detail: String,
}

impl fmt::Display for FixChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.detail)
    }
}

/// Fixed schema plus everything that happened to it
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub schema: Value,
    pub changes: Vec<FixChange>,
}

impl FixOutcome {
    pub fn modified(&self) -> bool {
        self.changes.iter().any(|c| !c.kind.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &FixChange> {
        self.changes.iter().filter(|c| c.kind.is_warning())
    }
}

/// Totals for a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub modified: usize,
    pub warnings: usize,
    pub failed: Vec<PathBuf>,
}

/// Applies the configured passes in order: enum/const, numeric, complex
#[derive(Debug, Clone)]
pub struct ConstraintFixer {
    config: FixConfig,
}

impl Default for ConstraintFixer {
    fn default() -> Self {
        Self::new(FixConfig::default())
    }
}

impl ConstraintFixer {
    pub fn new(config: FixConfig) -> Self {
        Self { config }
    }

    /// Fix a copy of `schema`
    pub fn fix(&self, schema: &Value) -> FixOutcome {
        let mut fixed = schema.clone();
        let mut changes = Vec::new();

        if self.config.enum_const {
            walk(&mut fixed, "", &mut |obj, loc| {
                if obj.contains_key("enum") && obj.contains_key("const") {
                    let kept = obj.get("const").map(Value::to_string).unwrap_or_default();
                    obj.shift_remove("enum");
                    changes.push(FixChange {
                        kind: FixKind::EnumConstConflict,
                        location: display_location(loc),
                        detail: format!("kept const={}, removed enum", kept),
                    });
                }
            });
        }

        if self.config.numeric_constraints {
            walk(&mut fixed, "", &mut |obj, loc| {
                let numeric = matches!(
                    obj.get("type").and_then(Value::as_str),
                    Some("number") | Some("integer")
                );
                if !numeric {
                    return;
                }
                let removed: Vec<&str> = NUMERIC_BOUNDS
                    .iter()
                    .copied()
                    .filter(|bound| obj.shift_remove(*bound).is_some())
                    .collect();
                if !removed.is_empty() {
                    changes.push(FixChange {
                        kind: FixKind::NumericConstraints,
                        location: display_location(loc),
                        detail: format!("removed {}", removed.join(", ")),
                    });
                }
            });
        }

        if self.config.report_complex {
            walk(&mut fixed, "", &mut |obj, loc| {
                if obj.contains_key("patternProperties") {
                    changes.push(FixChange {
                        kind: FixKind::PatternProperties,
                        location: display_location(loc),
                        detail: "patternProperties may not be supported by generators".to_string(),
                    });
                }
                if CONDITIONAL_KEYS.iter().any(|k| obj.contains_key(*k)) {
                    changes.push(FixChange {
                        kind: FixKind::Conditional,
                        location: display_location(loc),
                        detail: "conditional schema (if/then/else) may not be supported by generators"
                            .to_string(),
                    });
                }
            });
        }

        FixOutcome { schema: fixed, changes }
    }

    /// Read `input`, fix it and return the outcome without writing anything
    pub fn fix_path(&self, input: &Path) -> Result<FixOutcome> {
        let schema = load_json_file(input)?;
        let outcome = self.fix(&schema);
        for change in &outcome.changes {
            if change.kind.is_warning() {
                warn!(file = %input.display(), location = %change.location, "{}", change.detail);
            } else {
                debug!(file = %input.display(), location = %change.location, "{}", change.detail);
            }
        }
        Ok(outcome)
    }

    /// Fix one file and write pretty JSON to `output`
    pub fn fix_file(&self, input: &Path, output: &Path) -> Result<FixOutcome> {
        let outcome = self.fix_path(input)?;
        write_json(output, &outcome.schema)?;
        info!(input = %input.display(), output = %output.display(), changes = outcome.changes.len(), "fixed schema");
        Ok(outcome)
    }

    /// Fix every `*.json` under `input_dir`, mirroring the tree under
    /// `output_dir`. Per-file failures are logged and counted.
    pub fn fix_batch(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
        if !input_dir.is_dir() {
            return Err(SnippetError::NotADirectory(input_dir.to_path_buf()));
        }

        let mut summary = BatchSummary::default();
        for file in scan_json_files(input_dir) {
            let target = output_dir.join(&file.relative);
            match self.fix_file(&file.path, &target) {
                Ok(outcome) => {
                    summary.processed += 1;
                    if outcome.modified() {
                        summary.modified += 1;
                    }
                    summary.warnings += outcome.warnings().count();
                }
                Err(e) => {
                    warn!(file = %file.path.display(), error = %e, "failed to fix schema");
                    summary.failed.push(file.path);
                }
            }
        }

        Ok(summary)
    }
}

/// Visit every object depth-first, parents before children
fn walk<F>(value: &mut Value, location: &str, visit: &mut F)
where
    F: FnMut(&mut serde_json::Map<String, Value>, &str),
{
    match value {
        Value::Object(obj) => {
            visit(obj, location);
            for (key, child) in obj.iter_mut() {
                let child_loc = if location.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", location, key)
                };
                walk(child, &child_loc, visit);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                walk(item, &format!("{}[{}]", location, i), visit);
            }
        }
        _ => {}
    }
}

fn display_location(location: &str) -> String {
    if location.is_empty() {
        "$".to_string()
    } else {
        location.to_string()
    }
}

fn pretty(value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let write_err = |source| SnippetError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, pretty(value)?).map_err(write_err)
}

/// Unified-style line diff between two schemas' pretty JSON
pub fn diff_schemas(original: &Value, fixed: &Value) -> Result<String> {
    let before = pretty(original)?;
    let after = pretty(fixed)?;

    let diff = TextDiff::from_lines(&before, &after);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => continue,
        };
        out.push_str(sign);
        out.push_str(change.value());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_const_conflict() {
        let schema = json!({
            "properties": {
                "entity_type": {
                    "type": "string",
                    "enum": ["Focus", "Bond"],
                    "const": "Bond"
                }
            }
        });

        let outcome = ConstraintFixer::default().fix(&schema);
        assert_eq!(
            outcome.schema["properties"]["entity_type"],
            json!({ "type": "string", "const": "Bond" })
        );
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].kind, FixKind::EnumConstConflict);
        assert_eq!(outcome.changes[0].location, "properties.entity_type");
        assert!(outcome.modified());
        // input untouched
        assert!(schema["properties"]["entity_type"].get("enum").is_some());
    }

    #[test]
    fn test_numeric_bounds_removed() {
        let schema = json!({
            "type": "object",
            "minimum": 1,
            "items": [
                { "type": "integer", "minimum": 0, "exclusiveMaximum": 10 },
                { "type": "string", "maximum": 3 }
            ]
        });

        let outcome = ConstraintFixer::default().fix(&schema);
        assert_eq!(outcome.schema["items"][0], json!({ "type": "integer" }));
        // non-numeric types keep their keys
        assert_eq!(outcome.schema["minimum"], json!(1));
        assert_eq!(outcome.schema["items"][1]["maximum"], json!(3));
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].location, "items[0]");
        assert_eq!(outcome.changes[0].detail, "removed minimum, exclusiveMaximum");
    }

    #[test]
    fn test_complex_patterns_are_warnings() {
        let schema = json!({
            "patternProperties": { "^x-": {} },
            "if": { "properties": { "a": { "const": 1 } } },
            "then": { "required": ["b"] }
        });

        let outcome = ConstraintFixer::default().fix(&schema);
        assert_eq!(outcome.schema, schema);
        assert!(!outcome.modified());
        let kinds: Vec<FixKind> = outcome.warnings().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![FixKind::PatternProperties, FixKind::Conditional]);
        assert_eq!(outcome.changes[0].location, "$");
    }

    #[test]
    fn test_disabled_passes() {
        let config = FixConfig {
            enum_const: false,
            numeric_constraints: true,
            report_complex: false,
        };
        let schema = json!({ "type": "number", "maximum": 5, "enum": [1], "const": 1, "else": {} });

        let outcome = ConstraintFixer::new(config).fix(&schema);
        assert_eq!(outcome.schema, json!({ "type": "number", "enum": [1], "const": 1, "else": {} }));
        assert_eq!(outcome.changes.len(), 1);
    }

    #[test]
    fn test_diff_schemas() {
        let original = json!({ "type": "integer", "minimum": 0 });
        let fixed = json!({ "type": "integer" });

        let diff = diff_schemas(&original, &fixed).unwrap();
        assert!(diff.contains("-  \"minimum\": 0\n"));
        assert!(diff.contains("-  \"type\": \"integer\",\n"));
        assert!(diff.contains("+  \"type\": \"integer\"\n"));
    }

    #[test]
    fn test_fix_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        std::fs::write(&input, r#"{"type": "number", "maximum": 1}"#).unwrap();
        let output = dir.path().join("nested/out/fixed.json");

        ConstraintFixer::default().fix_file(&input, &output).unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, json!({ "type": "number" }));
    }
}
