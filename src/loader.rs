//! Schema Loading
//!
//! Reads JSON files from disk. Per-file failures are logged and skipped so a
//! single malformed schema never aborts an analysis run.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Result, SnippetError};

/// Read and parse one JSON file
pub fn load_json_file(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path).map_err(|source| SnippetError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| SnippetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_json_file`], but logs and swallows the error
pub fn try_load_json_file(path: &Path) -> Option<serde_json::Value> {
    match load_json_file(path) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable schema");
            None
        }
    }
}

/// Whether a parsed document carries anything worth walking
pub fn is_empty_document(json: &serde_json::Value) -> bool {
    match json {
        serde_json::Value::Null => true,
        serde_json::Value::Object(obj) => obj.is_empty(),
        serde_json::Value::Array(arr) => arr.is_empty(),
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Number(_) => false,
    }
}

/// A `*.json` file found under a scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    /// Path on disk
    pub path: PathBuf,
    /// Path relative to the scan root
    pub relative: PathBuf,
}

/// Recursively list `*.json` files under `root`, sorted by path.
/// A missing root yields an empty list.
pub fn scan_json_files(root: &Path) -> Vec<JsonFile> {
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
            Some(JsonFile {
                path: e.path().to_path_buf(),
                relative,
            })
        })
        .collect()
}

/// Incremental SHA-256 over scanned inputs
#[derive(Default)]
pub struct InputDigest {
    hasher: Sha256,
}

impl InputDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a file's relative path and raw bytes into the digest
    pub fn update(&mut self, file: &JsonFile) {
        self.hasher.update(file.relative.to_string_lossy().as_bytes());
        self.hasher.update([0u8]);
        // Unreadable files still contribute their path
        if let Ok(bytes) = fs::read(&file.path) {
            self.hasher.update(&bytes);
        }
        self.hasher.update([0u8]);
    }

    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_and_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, r#"{"type": "string"}"#).unwrap();
        fs::write(&bad, "{ not json").unwrap();

        assert_eq!(load_json_file(&good).unwrap(), json!({"type": "string"}));
        assert!(matches!(load_json_file(&bad), Err(SnippetError::Parse { .. })));
        assert!(matches!(
            load_json_file(&dir.path().join("missing.json")),
            Err(SnippetError::Read { .. })
        ));
        assert!(try_load_json_file(&bad).is_none());
    }

    #[test]
    fn test_scan_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/z.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = scan_json_files(dir.path());
        let rel: Vec<String> = files.iter().map(|f| f.relative.to_string_lossy().replace('\\', "/")).collect();
        assert_eq!(rel, vec!["a.json", "b/z.json"]);
    }

    #[test]
    fn test_scan_missing_root() {
        assert!(scan_json_files(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(is_empty_document(&json!({})));
        assert!(is_empty_document(&json!([])));
        assert!(is_empty_document(&json!(null)));
        assert!(!is_empty_document(&json!({"a": 1})));
    }

    #[test]
    fn test_digest_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();

        let digest = |root: &Path| {
            let mut d = InputDigest::new();
            for f in scan_json_files(root) {
                d.update(&f);
            }
            d.finish()
        };

        let first = digest(dir.path());
        assert_eq!(first, digest(dir.path()));

        fs::write(dir.path().join("a.json"), r#"{"x": 1}"#).unwrap();
        assert_ne!(first, digest(dir.path()));
    }
}
