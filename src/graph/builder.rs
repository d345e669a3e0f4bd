//! Dependency graph construction from the snippets subtree

use std::path::{Path, PathBuf};
use tracing::debug;

use super::DependencyGraph;
use crate::loader::{is_empty_document, scan_json_files, try_load_json_file, InputDigest};
use crate::refs::ReferenceExtractor;
use crate::snippet::Snippet;

/// Scan `schemas_root/<snippets_dir>` and build the snippet graph.
///
/// Every `*.json` file registers a snippet whose category comes from its
/// path alone. Files that fail to load are logged and contribute no edges,
/// but stay registered. A missing snippets directory yields an empty graph.
pub fn build_dependency_graph(
    schemas_root: &Path,
    snippets_dir: &str,
    extractor: &ReferenceExtractor,
    mut digest: Option<&mut InputDigest>,
) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    let snippets_root = schemas_root.join(snippets_dir);

    for file in scan_json_files(&snippets_root) {
        if let Some(d) = digest.as_deref_mut() {
            d.update(&file);
        }

        // Identity is relative to the schemas root so category and
        // "inside snippets" checks never see the caller's absolute prefix.
        let rel_path: PathBuf = Path::new(snippets_dir).join(&file.relative);
        let snippet = Snippet::from_path(&rel_path);
        let name = snippet.name.clone();
        graph.register(snippet);

        let Some(content) = try_load_json_file(&file.path) else {
            continue;
        };
        if is_empty_document(&content) {
            continue;
        }

        for r in extractor.extract(&content, &rel_path) {
            graph.add_edge(name.clone(), r.snippet);
        }
    }

    debug!(
        snippets = graph.snippet_count(),
        edges = graph.edge_count(),
        root = %snippets_root.display(),
        "built snippet dependency graph"
    );

    graph
}
