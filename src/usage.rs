//! Direct Usage Collection
//!
//! Scans source schemas (everything outside the snippets and assembled
//! trees) and records which snippets each one references directly. Inline
//! definition counts are gathered on the same pass for reporting only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::graph::SnippetName;
use crate::loader::{is_empty_document, scan_json_files, try_load_json_file, InputDigest};
use crate::refs::ReferenceExtractor;
use crate::snippet::{is_under, SnippetCategory};

/// Keys tallied as common property patterns
const PROPERTY_PATTERN_KEYS: [&str; 4] = ["entity_type", "status", "description", "entity_id"];

/// One direct reference from a source schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSite {
    /// Source schema, relative to the schemas root
    pub file: PathBuf,
    pub location: String,
    pub path: String,
    pub category: SnippetCategory,
}

/// Inline definitions that could become snippets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineCounts {
    /// type_definitions + enum_definitions + constraint_patterns
    pub count: usize,
    /// Objects with both `type` and `properties`
    pub type_definitions: usize,
    /// Objects with `enum`
    pub enum_definitions: usize,
    /// Objects with `minimum` or `maximum`
    pub constraint_patterns: usize,
    /// Occurrences of common property keys (not part of `count`)
    pub property_patterns: usize,
}

impl InlineCounts {
    /// Count inline definitions in a parsed schema
    pub fn of(schema: &Value) -> Self {
        let mut counts = Self::default();
        counts.visit(schema);
        counts
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::Object(obj) => {
                if obj.contains_key("type") && obj.contains_key("properties") {
                    self.type_definitions += 1;
                    self.count += 1;
                }
                if obj.contains_key("enum") {
                    self.enum_definitions += 1;
                    self.count += 1;
                }
                if obj.contains_key("minimum") || obj.contains_key("maximum") {
                    self.constraint_patterns += 1;
                    self.count += 1;
                }
                self.property_patterns += PROPERTY_PATTERN_KEYS
                    .iter()
                    .filter(|k| obj.contains_key(**k))
                    .count();

                for child in obj.values() {
                    self.visit(child);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.visit(item);
                }
            }
            _ => {}
        }
    }

    /// Pattern breakdown in fixed order
    pub fn patterns(&self) -> [(&'static str, usize); 4] {
        [
            ("type_definitions", self.type_definitions),
            ("enum_definitions", self.enum_definitions),
            ("constraint_patterns", self.constraint_patterns),
            ("property_patterns", self.property_patterns),
        ]
    }

    /// Patterns sorted by count, highest first; ties keep the fixed order
    pub fn most_common(&self) -> Vec<(&'static str, usize)> {
        let mut patterns = self.patterns().to_vec();
        patterns.sort_by(|a, b| b.1.cmp(&a.1));
        patterns
    }

    fn add(&mut self, other: &InlineCounts) {
        self.count += other.count;
        self.type_definitions += other.type_definitions;
        self.enum_definitions += other.enum_definitions;
        self.constraint_patterns += other.constraint_patterns;
        self.property_patterns += other.property_patterns;
    }
}

/// Inline counts for one source schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInline {
    pub file: PathBuf,
    pub counts: InlineCounts,
}

/// Everything gathered from source schemas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectUsage {
    /// Source schema files found (loadable or not)
    pub schemas_analyzed: usize,
    pub directly_used: BTreeSet<SnippetName>,
    /// Usage sites per snippet, in scan order
    pub usage: BTreeMap<SnippetName, Vec<UsageSite>>,
    pub total_references: usize,
    pub inline_by_schema: Vec<SchemaInline>,
    /// Pattern counts summed over all source schemas
    pub inline_totals: InlineCounts,
}

impl DirectUsage {
    /// Source schemas with inline definitions, most first (ties by path)
    pub fn top_inline(&self, limit: usize) -> Vec<&SchemaInline> {
        let mut ranked: Vec<&SchemaInline> = self.inline_by_schema
            .iter()
            .filter(|s| s.counts.count > 0)
            .collect();
        ranked.sort_by(|a, b| b.counts.count.cmp(&a.counts.count).then_with(|| a.file.cmp(&b.file)));
        ranked.truncate(limit);
        ranked
    }

    /// Snippets by number of direct usage sites, most first (ties by name)
    pub fn most_used(&self, limit: usize) -> Vec<(&SnippetName, usize)> {
        let mut ranked: Vec<(&SnippetName, usize)> = self.usage
            .iter()
            .map(|(name, sites)| (name, sites.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }

    pub fn use_count(&self, name: &str) -> usize {
        self.usage.get(name).map(|s| s.len()).unwrap_or(0)
    }
}

/// Is `relative` a source schema (outside snippets and assembled)?
pub fn is_source_schema(relative: &Path, snippets_dir: &str, assembled_dir: &str) -> bool {
    !is_under(relative, snippets_dir) && !is_under(relative, assembled_dir)
}

/// Scan source schemas under `schemas_root` and record direct snippet usage
pub fn collect_direct_usage(
    schemas_root: &Path,
    snippets_dir: &str,
    assembled_dir: &str,
    extractor: &ReferenceExtractor,
    mut digest: Option<&mut InputDigest>,
) -> DirectUsage {
    let mut usage = DirectUsage::default();

    for file in scan_json_files(schemas_root) {
        if !is_source_schema(&file.relative, snippets_dir, assembled_dir) {
            continue;
        }
        if let Some(d) = digest.as_deref_mut() {
            d.update(&file);
        }
        usage.schemas_analyzed += 1;

        let Some(content) = try_load_json_file(&file.path) else {
            continue;
        };
        if is_empty_document(&content) {
            continue;
        }

        let refs = extractor.extract(&content, &file.relative);
        usage.total_references += refs.len();

        for r in refs {
            usage.directly_used.insert(r.snippet.clone());
            usage.usage.entry(r.snippet).or_default().push(UsageSite {
                file: file.relative.clone(),
                location: r.location,
                path: r.path,
                category: r.category,
            });
        }

        let counts = InlineCounts::of(&content);
        usage.inline_totals.add(&counts);
        usage.inline_by_schema.push(SchemaInline {
            file: file.relative.clone(),
            counts,
        });
    }

    debug!(
        schemas = usage.schemas_analyzed,
        references = usage.total_references,
        direct = usage.directly_used.len(),
        "collected direct snippet usage"
    );

    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_inline_counts() {
        let schema = json!({
            "type": "object",
            "description": "root",
            "properties": {
                "status": { "enum": ["a", "b"], "description": "state" },
                "age": { "type": "integer", "minimum": 0, "maximum": 150 },
                "nested": {
                    "type": "object",
                    "properties": { "entity_id": { "type": "string" } }
                }
            }
        });

        let counts = InlineCounts::of(&schema);
        assert_eq!(counts.type_definitions, 2);
        assert_eq!(counts.enum_definitions, 1);
        assert_eq!(counts.constraint_patterns, 1);
        assert_eq!(counts.count, 4);
        // "description" on root and status, "status" + "entity_id" as property keys
        assert_eq!(counts.property_patterns, 4);
    }

    #[test]
    fn test_most_common_is_stable() {
        let counts = InlineCounts {
            count: 2,
            type_definitions: 1,
            enum_definitions: 1,
            constraint_patterns: 0,
            property_patterns: 3,
        };
        let names: Vec<&str> = counts.most_common().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["property_patterns", "type_definitions", "enum_definitions", "constraint_patterns"]);
    }

    #[test]
    fn test_source_schema_filter() {
        assert!(is_source_schema(Path::new("entities/Focus.schema.json"), "snippets", "assembled"));
        assert!(!is_source_schema(Path::new("snippets/types/A.json"), "snippets", "assembled"));
        assert!(!is_source_schema(Path::new("assembled/Focus.json"), "snippets", "assembled"));
    }

    #[test]
    fn test_collect_direct_usage() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("entities")).unwrap();
        fs::create_dir_all(root.join("assembled")).unwrap();
        fs::create_dir_all(root.join("snippets/fields")).unwrap();

        fs::write(
            root.join("entities/Focus.schema.json"),
            r#"{
                "type": "object",
                "properties": {
                    "id": {"$ref": "../snippets/fields/entity_id.json"},
                    "owner": {"$ref": "../snippets/fields/entity_id.json"},
                    "pos": {"$ref": "../snippets/types/Vec3.json"}
                }
            }"#,
        )
        .unwrap();
        fs::write(root.join("entities/Broken.schema.json"), "{").unwrap();
        fs::write(
            root.join("assembled/Focus.json"),
            r#"{"$ref": "../snippets/types/Ignored.json"}"#,
        )
        .unwrap();
        fs::write(
            root.join("snippets/fields/entity_id.json"),
            r#"{"$ref": "../snippets/types/AlsoIgnored.json"}"#,
        )
        .unwrap();

        let usage = collect_direct_usage(root, "snippets", "assembled", &ReferenceExtractor::default(), None);

        assert_eq!(usage.schemas_analyzed, 2);
        assert_eq!(usage.total_references, 3);
        assert_eq!(
            usage.directly_used.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Vec3", "entity_id"]
        );
        assert_eq!(usage.use_count("entity_id"), 2);
        assert_eq!(usage.usage["entity_id"][1].location, "properties.owner.$ref");
        assert_eq!(usage.inline_totals.type_definitions, 1);
        assert_eq!(usage.top_inline(10).len(), 1);
        assert_eq!(usage.most_used(1)[0].0, "entity_id");
    }
}
