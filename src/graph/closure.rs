//! Transitive Closure Engine
//!
//! Two worklist fixed points over the same adjacency mapping, with different
//! expansion predicates:
//!
//! - **Type-restricted closure**: only `type` snippets are pulled in
//!   transitively. Fields and other snippets are never expanded through.
//! - **Unrestricted reachability**: follows every edge, and flags `field`
//!   snippets that are reached without being referenced directly.
//!
//! Both terminate once a full pass adds nothing. Cycles and self references
//! are absorbed by set membership; dangling names have no outgoing edges.

use std::collections::BTreeSet;

use super::{DependencyGraph, SnippetName};
use crate::snippet::SnippetCategory;

/// Result of the type-restricted closure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeClosure {
    /// Direct usage plus every transitively reached type
    pub all_used: BTreeSet<SnippetName>,
    /// Types reached only through other snippets
    pub transitive_types: BTreeSet<SnippetName>,
}

/// Expand `direct` through references whose target is a declared `type`
pub fn transitive_type_usage(
    direct: &BTreeSet<SnippetName>,
    graph: &DependencyGraph,
) -> TypeClosure {
    let mut used = direct.clone();
    let mut transitive_types = BTreeSet::new();

    loop {
        let mut added = BTreeSet::new();

        for snippet in &used {
            for referenced in graph.refs_out(snippet) {
                if used.contains(referenced) {
                    continue;
                }
                if graph.category(referenced) == Some(SnippetCategory::Type) {
                    added.insert(referenced.clone());
                }
            }
        }

        if added.is_empty() {
            break;
        }

        transitive_types.extend(added.iter().cloned());
        used.extend(added);
    }

    TypeClosure {
        all_used: used,
        transitive_types,
    }
}

/// Follow every edge from `direct`; return fields reached only transitively
pub fn transitive_field_issues(
    direct: &BTreeSet<SnippetName>,
    graph: &DependencyGraph,
) -> BTreeSet<SnippetName> {
    let mut reachable = direct.clone();
    let mut issues = BTreeSet::new();
    let mut frontier: Vec<SnippetName> = direct.iter().cloned().collect();

    while let Some(snippet) = frontier.pop() {
        for referenced in graph.refs_out(&snippet) {
            if !reachable.insert(referenced.clone()) {
                continue;
            }
            if graph.category(referenced) == Some(SnippetCategory::Field)
                && !direct.contains(referenced)
            {
                issues.insert(referenced.clone());
            }
            frontier.push(referenced.clone());
        }
    }

    issues
}
