//! Snippet Usage Analysis
//!
//! Ties the pieces together: build the snippet graph, collect direct usage
//! from source schemas, run both closures and derive orphans.
//!
//! Orphans are computed against the type-restricted closure. A field that is
//! reachable only through another snippet is therefore both flagged as a
//! transitive field issue and reported as orphaned.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SnippetConfig;
use crate::error::{Result, SnippetError};
use crate::graph::{
    build_dependency_graph, find_cycles, transitive_field_issues, transitive_type_usage,
    DependencyGraph, SnippetCycle, SnippetName,
};
use crate::loader::InputDigest;
use crate::refs::ReferenceExtractor;
use crate::snippet::SnippetCategory;
use crate::usage::{collect_direct_usage, DirectUsage};

/// Runs a full analysis over one schemas tree
#[derive(Debug, Clone)]
pub struct SnippetAnalyzer {
    schemas_root: PathBuf,
    snippets_dir: String,
    assembled_dir: String,
    extractor: ReferenceExtractor,
}

impl SnippetAnalyzer {
    /// Analyzer with the conventional `snippets/` and `assembled/` layout
    pub fn new(schemas_root: impl Into<PathBuf>) -> Self {
        Self {
            schemas_root: schemas_root.into(),
            snippets_dir: "snippets".to_string(),
            assembled_dir: "assembled".to_string(),
            extractor: ReferenceExtractor::default(),
        }
    }

    pub fn from_config(config: &SnippetConfig) -> Self {
        let schemas = &config.schemas;
        Self {
            schemas_root: schemas.root.clone(),
            snippets_dir: schemas.snippets_dir.clone(),
            assembled_dir: schemas.assembled_dir.clone(),
            extractor: ReferenceExtractor::new(&schemas.ref_key, &schemas.snippets_dir),
        }
    }

    pub fn schemas_root(&self) -> &Path {
        &self.schemas_root
    }

    /// Build only the snippet graph
    pub fn dependency_graph(&self) -> DependencyGraph {
        build_dependency_graph(&self.schemas_root, &self.snippets_dir, &self.extractor, None)
    }

    /// Scan the tree and compute every usage set
    pub fn run(&self) -> Result<SnippetAnalysis> {
        if !self.schemas_root.is_dir() {
            return Err(SnippetError::NotADirectory(self.schemas_root.clone()));
        }

        let mut digest = InputDigest::new();

        let graph = build_dependency_graph(
            &self.schemas_root,
            &self.snippets_dir,
            &self.extractor,
            Some(&mut digest),
        );
        info!(
            snippets = graph.snippet_count(),
            references = graph.edge_count(),
            "snippet graph loaded"
        );

        let direct = collect_direct_usage(
            &self.schemas_root,
            &self.snippets_dir,
            &self.assembled_dir,
            &self.extractor,
            Some(&mut digest),
        );
        info!(
            schemas = direct.schemas_analyzed,
            directly_used = direct.directly_used.len(),
            "source schemas scanned"
        );

        Ok(SnippetAnalysis::compute(
            self.schemas_root.clone(),
            graph,
            direct,
            digest.finish(),
        ))
    }
}

/// Computed usage sets for one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct SnippetAnalysis {
    pub schemas_root: PathBuf,

    /// SHA-256 over every scanned file; stable for an unchanged tree
    pub input_digest: String,

    pub all_snippets: BTreeSet<SnippetName>,
    pub field_snippets: BTreeSet<SnippetName>,
    pub type_snippets: BTreeSet<SnippetName>,
    pub other_snippets: BTreeSet<SnippetName>,

    /// Referenced by at least one source schema
    pub directly_used: BTreeSet<SnippetName>,
    /// Direct usage plus transitively reached types
    pub all_used: BTreeSet<SnippetName>,
    pub transitive_types: BTreeSet<SnippetName>,
    /// Fields reached only through other snippets
    pub transitive_field_issues: BTreeSet<SnippetName>,
    /// `all_snippets - all_used`
    pub orphaned: BTreeSet<SnippetName>,

    /// Referenced names with no snippet file
    pub unresolved: BTreeSet<SnippetName>,
    /// Names backed by more than one file
    pub duplicates: BTreeSet<SnippetName>,
    pub cycles: Vec<SnippetCycle>,

    /// Snippet → snippets it references
    pub dependencies: BTreeMap<SnippetName, BTreeSet<SnippetName>>,

    pub direct: DirectUsage,

    /// Percentage of snippets in `all_used`
    pub usage_rate: f64,

    #[serde(skip)]
    pub graph: DependencyGraph,
}

impl SnippetAnalysis {
    /// Derive every usage set from a built graph and collected direct usage
    pub fn compute(
        schemas_root: PathBuf,
        graph: DependencyGraph,
        direct: DirectUsage,
        input_digest: String,
    ) -> Self {
        let all_snippets: BTreeSet<SnippetName> = graph.names().cloned().collect();
        let directly_used = direct.directly_used.clone();

        let closure = transitive_type_usage(&directly_used, &graph);
        let field_issues = transitive_field_issues(&directly_used, &graph);

        let orphaned: BTreeSet<SnippetName> = all_snippets
            .difference(&closure.all_used)
            .cloned()
            .collect();

        let mut unresolved = graph.dangling();
        unresolved.extend(
            directly_used
                .iter()
                .filter(|name| !graph.contains(name))
                .cloned(),
        );

        let usage_rate = if all_snippets.is_empty() {
            0.0
        } else {
            closure.all_used.len() as f64 / all_snippets.len() as f64 * 100.0
        };

        let dependencies = graph
            .deps
            .iter()
            .map(|(name, targets)| (name.clone(), targets.iter().cloned().collect()))
            .collect();

        Self {
            schemas_root,
            input_digest,
            field_snippets: graph.names_in(SnippetCategory::Field),
            type_snippets: graph.names_in(SnippetCategory::Type),
            other_snippets: graph.names_in(SnippetCategory::Other),
            all_snippets,
            directly_used,
            all_used: closure.all_used,
            transitive_types: closure.transitive_types,
            transitive_field_issues: field_issues,
            orphaned,
            unresolved,
            duplicates: graph.duplicates().clone(),
            cycles: find_cycles(&graph),
            dependencies,
            direct,
            usage_rate,
            graph,
        }
    }

    /// Subset of `names` whose declared category is `category`
    pub fn in_category(
        &self,
        names: &BTreeSet<SnippetName>,
        category: SnippetCategory,
    ) -> BTreeSet<SnippetName> {
        names
            .iter()
            .filter(|n| self.graph.category(n) == Some(category))
            .cloned()
            .collect()
    }

    /// Category label for display; `unknown` for names without a file
    pub fn category_label(&self, name: &str) -> &'static str {
        self.graph
            .category(name)
            .map(|c| c.as_str())
            .unwrap_or("unknown")
    }

    /// Average snippet references per analyzed source schema
    pub fn reference_density(&self) -> f64 {
        if self.direct.schemas_analyzed == 0 {
            0.0
        } else {
            self.direct.total_references as f64 / self.direct.schemas_analyzed as f64
        }
    }
}
