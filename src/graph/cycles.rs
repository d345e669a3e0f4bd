//! Snippet cycle detection (strongly connected components)

use petgraph::algo::kosaraju_scc;
use serde::{Deserialize, Serialize};

use super::{DependencyGraph, SnippetName};

/// A group of snippets that reference each other
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnippetCycle {
    /// Members, sorted
    pub members: Vec<SnippetName>,
    /// Single snippet referencing itself
    pub is_self_referential: bool,
}

/// All cycles in the graph: SCCs with more than one member, plus self loops
pub fn find_cycles(graph: &DependencyGraph) -> Vec<SnippetCycle> {
    let (pg, _) = graph.to_petgraph();

    let mut cycles: Vec<SnippetCycle> = kosaraju_scc(&pg)
        .into_iter()
        .filter_map(|scc| {
            if scc.len() == 1 {
                let idx = scc[0];
                if !pg.contains_edge(idx, idx) {
                    return None;
                }
                return Some(SnippetCycle {
                    members: vec![pg[idx].clone()],
                    is_self_referential: true,
                });
            }

            let mut members: Vec<SnippetName> = scc.iter().map(|idx| pg[*idx].clone()).collect();
            members.sort();
            Some(SnippetCycle {
                members,
                is_self_referential: false,
            })
        })
        .collect();

    cycles.sort();
    cycles
}
