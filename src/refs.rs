//! Reference Extraction
//!
//! Walks a parsed schema and collects every `$ref` that points at a snippet.
//! Classification is lexical: nothing here touches the filesystem.

use serde_json::Value;
use std::path::Path;

use crate::snippet::{file_stem, is_under, SnippetCategory, SnippetRef};

/// Extracts snippet references from parsed schemas
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    /// Object key that carries a reference
    ref_key: String,
    /// Directory name that marks snippet files
    snippets_dir: String,
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new("$ref", "snippets")
    }
}

impl ReferenceExtractor {
    pub fn new(ref_key: impl Into<String>, snippets_dir: impl Into<String>) -> Self {
        Self {
            ref_key: ref_key.into(),
            snippets_dir: snippets_dir.into(),
        }
    }

    /// Collect snippet references in document order
    pub fn extract(&self, schema: &Value, file_path: &Path) -> Vec<SnippetRef> {
        let mut refs = Vec::new();
        let ctx = FileContext {
            in_snippets: is_under(file_path, &self.snippets_dir),
            own_category: SnippetCategory::from_path(file_path),
        };
        self.walk(schema, "", &ctx, &mut refs);
        refs
    }

    fn walk(&self, value: &Value, path: &str, ctx: &FileContext, refs: &mut Vec<SnippetRef>) {
        match value {
            Value::Object(obj) => {
                for (key, child) in obj {
                    let location = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };

                    if key == &self.ref_key {
                        if let Some(target) = child.as_str() {
                            if let Some(category) = self.classify(target, ctx) {
                                refs.push(SnippetRef {
                                    snippet: file_stem(Path::new(target)),
                                    path: target.to_string(),
                                    location: location.clone(),
                                    category,
                                });
                            }
                        }
                    }

                    self.walk(child, &location, ctx, refs);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk(item, &format!("{}[{}]", path, i), ctx, refs);
                }
            }
            _ => {}
        }
    }

    /// Category of a snippet reference, or None when `target` is not one
    fn classify(&self, target: &str, ctx: &FileContext) -> Option<SnippetCategory> {
        if target.contains(self.snippets_dir.as_str()) {
            return Some(SnippetCategory::from_marker(target));
        }

        // Relative refs inside the snippets tree carry no structure of their
        // own; borrow the referencing file's category.
        if ctx.in_snippets && (target.starts_with("./") || target.starts_with("../")) {
            return Some(ctx.own_category);
        }

        None
    }
}

struct FileContext {
    in_snippets: bool,
    own_category: SnippetCategory,
}

/// Extract with the default `$ref` key and `snippets` directory
pub fn find_snippet_references(schema: &Value, file_path: &Path) -> Vec<SnippetRef> {
    ReferenceExtractor::default().extract(schema, file_path)
}
