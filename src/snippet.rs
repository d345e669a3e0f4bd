//! Snippet identity: names, categories and reference records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Snippet category, derived purely from directory conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetCategory {
    /// Lives under a `fields/` directory; expected to be referenced directly
    Field,
    /// Lives under a `types/` directory; may compose transitively
    Type,
    Other,
}

impl SnippetCategory {
    /// Category of a path-like string: `/fields/` wins over `/types/`
    pub fn from_marker(s: &str) -> Self {
        if s.contains("/fields/") {
            Self::Field
        } else if s.contains("/types/") {
            Self::Type
        } else {
            Self::Other
        }
    }

    /// Category of a file on disk
    pub fn from_path(path: &Path) -> Self {
        // Leading slash so a relative "fields/x.json" still matches
        Self::from_marker(&format!("/{}", normalize_path(path)))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Type => "type",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SnippetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, categorized schema fragment discovered on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub name: String,
    pub category: SnippetCategory,
    pub file_path: PathBuf,
}

impl Snippet {
    pub fn from_path(path: &Path) -> Self {
        Self {
            name: file_stem(path),
            category: SnippetCategory::from_path(path),
            file_path: path.to_path_buf(),
        }
    }
}

/// A `$ref` that points at a snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetRef {
    /// Target snippet name (filename stem of `path`)
    pub snippet: String,
    /// Raw reference string as written in the schema
    pub path: String,
    /// JSON location of the reference key, e.g. `properties.id.$ref`
    pub location: String,
    /// Category of the reference context
    pub category: SnippetCategory,
}

/// Forward-slash rendering of a path
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexical filename stem: `../types/Vec3.json` -> `Vec3`
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| normalize_path(path))
}

/// True when the components of `dir_name` (one or more, e.g. `snippets` or
/// `lib/snippets`) appear as a contiguous run of components in `path`
pub fn is_under(path: &Path, dir_name: &str) -> bool {
    let dir: Vec<Component<'_>> = Path::new(dir_name)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if dir.is_empty() {
        return false;
    }

    let components: Vec<Component<'_>> = path.components().collect();
    components.windows(dir.len()).any(|window| window == dir.as_slice())
}
