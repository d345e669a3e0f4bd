//! Snippet Dependency Graph
//!
//! Adjacency mapping from snippet name to the snippet names it references.
//! Names that are referenced but never discovered on disk stay in the edge
//! sets as dangling targets; they have no category and no outgoing edges.
//!
//! The closures in [`closure`] run directly on the mapping. petgraph is only
//! used for cycle detection and DOT export.

pub mod builder;
pub mod closure;
pub mod cycles;

pub use builder::build_dependency_graph;
pub use closure::{transitive_field_issues, transitive_type_usage, TypeClosure};
pub use cycles::{find_cycles, SnippetCycle};

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::snippet::{Snippet, SnippetCategory};

/// Snippet name (filename stem)
pub type SnippetName = String;

/// Directed snippet → {referenced snippets} graph with precomputed categories
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Outgoing references per snippet
    pub(crate) deps: HashMap<SnippetName, HashSet<SnippetName>>,

    /// Discovered snippets by name (last file wins on duplicate stems)
    pub(crate) snippets: HashMap<SnippetName, Snippet>,

    /// Names discovered in more than one file
    pub(crate) duplicates: BTreeSet<SnippetName>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a discovered snippet file
    pub fn register(&mut self, snippet: Snippet) {
        if self.snippets.contains_key(&snippet.name) {
            self.duplicates.insert(snippet.name.clone());
        }
        self.snippets.insert(snippet.name.clone(), snippet);
    }

    /// Add a `from -> to` reference. Neither end needs to be registered.
    pub fn add_edge(&mut self, from: impl Into<SnippetName>, to: impl Into<SnippetName>) {
        self.deps.entry(from.into()).or_default().insert(to.into());
    }

    /// Declared category of a discovered snippet
    pub fn category(&self, name: &str) -> Option<SnippetCategory> {
        self.snippets.get(name).map(|s| s.category)
    }

    pub fn get(&self, name: &str) -> Option<&Snippet> {
        self.snippets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snippets.contains_key(name)
    }

    /// Outgoing references of `name` (empty for unknown or dangling names)
    pub fn refs_out(&self, name: &str) -> impl Iterator<Item = &SnippetName> {
        self.deps.get(name).into_iter().flatten()
    }

    /// Snippets that reference `name`, sorted
    pub fn refs_in(&self, name: &str) -> Vec<&SnippetName> {
        let mut sources: Vec<&SnippetName> = self.deps
            .iter()
            .filter(|(_, targets)| targets.contains(name))
            .map(|(source, _)| source)
            .collect();
        sources.sort();
        sources
    }

    pub fn snippet_count(&self) -> usize {
        self.snippets.len()
    }

    /// Total number of snippet → snippet references
    pub fn edge_count(&self) -> usize {
        self.deps.values().map(|d| d.len()).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &SnippetName> {
        self.snippets.keys()
    }

    /// Names of discovered snippets in one category
    pub fn names_in(&self, category: SnippetCategory) -> BTreeSet<SnippetName> {
        self.snippets
            .values()
            .filter(|s| s.category == category)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Names appearing as edge sources or targets without a snippet file
    pub fn dangling(&self) -> BTreeSet<SnippetName> {
        self.deps
            .iter()
            .flat_map(|(source, targets)| std::iter::once(source).chain(targets))
            .filter(|name| !self.snippets.contains_key(*name))
            .cloned()
            .collect()
    }

    pub fn duplicates(&self) -> &BTreeSet<SnippetName> {
        &self.duplicates
    }

    /// Non-empty outgoing sets of snippets in `category`, sorted by name
    pub fn chains_from(&self, category: SnippetCategory) -> Vec<(SnippetName, Vec<SnippetName>)> {
        let mut chains: Vec<(SnippetName, Vec<SnippetName>)> = self.deps
            .iter()
            .filter(|(name, targets)| !targets.is_empty() && self.category(name) == Some(category))
            .map(|(name, targets)| {
                let mut targets: Vec<SnippetName> = targets.iter().cloned().collect();
                targets.sort();
                (name.clone(), targets)
            })
            .collect();
        chains.sort();
        chains
    }

    /// Build a petgraph view; dangling targets become nodes too
    pub fn to_petgraph(&self) -> (DiGraph<SnippetName, ()>, HashMap<SnippetName, NodeIndex>) {
        let mut names: BTreeSet<&SnippetName> = self.snippets.keys().collect();
        for (source, targets) in &self.deps {
            names.insert(source);
            names.extend(targets);
        }

        let mut graph = DiGraph::with_capacity(names.len(), self.edge_count());
        let mut indices = HashMap::with_capacity(names.len());
        for name in names {
            indices.insert(name.clone(), graph.add_node(name.clone()));
        }

        let mut sources: Vec<&SnippetName> = self.deps.keys().collect();
        sources.sort();
        for source in sources {
            let mut targets: Vec<&SnippetName> = self.deps[source].iter().collect();
            targets.sort();
            for target in targets {
                graph.add_edge(indices[source], indices[target], ());
            }
        }

        (graph, indices)
    }

    /// Export the snippet graph to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph SnippetGraph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  bgcolor=\"#1e1e1e\";\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10, fontcolor=\"white\", color=\"#404040\"];\n");
        output.push_str("  edge [color=\"#808080\"];\n");
        output.push('\n');

        let (graph, _) = self.to_petgraph();

        for idx in graph.node_indices() {
            let name = &graph[idx];
            let color = match self.category(name) {
                Some(SnippetCategory::Field) => "#00BCD4",
                Some(SnippetCategory::Type) => "#FF9800",
                Some(SnippetCategory::Other) => "#607D8B",
                None => "#F44336", // dangling
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                dot_id(name),
                name.replace('"', "\\\""),
                color
            ));
        }

        output.push('\n');

        for edge in graph.raw_edges() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                dot_id(&graph[edge.source()]),
                dot_id(&graph[edge.target()])
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn dot_id(name: &str) -> String {
    name.replace(['/', '.', '-', '"'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn snippet(name: &str, category: SnippetCategory) -> Snippet {
        Snippet {
            name: name.to_string(),
            category,
            file_path: PathBuf::from(format!("snippets/{}.json", name)),
        }
    }

    fn sample() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.register(snippet("A", SnippetCategory::Type));
        graph.register(snippet("B", SnippetCategory::Type));
        graph.register(snippet("F", SnippetCategory::Field));
        graph.add_edge("A", "B");
        graph.add_edge("A", "F");
        graph.add_edge("F", "Ghost");
        graph
    }

    #[test]
    fn test_edges_and_lookup() {
        let graph = sample();
        assert_eq!(graph.snippet_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.category("A"), Some(SnippetCategory::Type));
        assert_eq!(graph.category("Ghost"), None);

        let mut out: Vec<&SnippetName> = graph.refs_out("A").collect();
        out.sort();
        assert_eq!(out, vec!["B", "F"]);
        assert_eq!(graph.refs_out("Ghost").count(), 0);
        assert_eq!(graph.refs_in("F"), vec!["A"]);
    }

    #[test]
    fn test_dangling_and_duplicates() {
        let mut graph = sample();
        assert_eq!(graph.dangling().into_iter().collect::<Vec<_>>(), vec!["Ghost"]);

        graph.register(snippet("A", SnippetCategory::Other));
        assert!(graph.duplicates().contains("A"));
        assert_eq!(graph.category("A"), Some(SnippetCategory::Other));
    }

    #[test]
    fn test_chains_from() {
        let graph = sample();
        assert_eq!(
            graph.chains_from(SnippetCategory::Type),
            vec![("A".to_string(), vec!["B".to_string(), "F".to_string()])]
        );
        assert_eq!(
            graph.chains_from(SnippetCategory::Field),
            vec![("F".to_string(), vec!["Ghost".to_string()])]
        );
    }

    #[test]
    fn test_to_petgraph_includes_dangling() {
        let (graph, indices) = sample().to_petgraph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(indices.contains_key("Ghost"));
    }

    #[test]
    fn test_to_dot() {
        let dot = sample().to_dot();
        assert!(dot.starts_with("digraph SnippetGraph {"));
        assert!(dot.contains("\"A\" -> \"B\";"));
        assert!(dot.contains("\"F\" -> \"Ghost\";"));
        assert!(dot.contains("#F44336"));
    }
}
