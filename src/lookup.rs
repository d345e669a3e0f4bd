//! Single-snippet lookup with fuzzy suggestions

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use std::path::PathBuf;

use crate::analysis::SnippetAnalysis;
use crate::error::{Result, SnippetError};
use crate::graph::SnippetName;
use crate::snippet::SnippetCategory;
use crate::usage::UsageSite;

/// How a snippet is used in the current tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    Direct,
    TransitiveType,
    TransitiveFieldIssue,
    Orphaned,
}

/// Everything known about one snippet
#[derive(Debug, Clone, Serialize)]
pub struct SnippetDetails {
    pub name: SnippetName,
    pub category: Option<SnippetCategory>,
    pub file_path: Option<PathBuf>,
    /// Snippets this one references, sorted
    pub references: Vec<SnippetName>,
    /// Snippets referencing this one, sorted
    pub referenced_by: Vec<SnippetName>,
    pub usage_sites: Vec<UsageSite>,
    pub status: Vec<UsageStatus>,
}

impl SnippetAnalysis {
    /// Describe `name`, or fail with fuzzy suggestions
    pub fn explain(&self, name: &str) -> Result<SnippetDetails> {
        let known = self.graph.contains(name)
            || self.directly_used.contains(name)
            || self.unresolved.contains(name);

        if !known {
            return Err(SnippetError::UnknownSnippet {
                name: name.to_string(),
                suggestions: self.suggest(name, 5),
            });
        }

        let snippet = self.graph.get(name);

        let mut references: Vec<SnippetName> = self.graph.refs_out(name).cloned().collect();
        references.sort();

        let mut status = Vec::new();
        if self.directly_used.contains(name) {
            status.push(UsageStatus::Direct);
        }
        if self.transitive_types.contains(name) {
            status.push(UsageStatus::TransitiveType);
        }
        if self.transitive_field_issues.contains(name) {
            status.push(UsageStatus::TransitiveFieldIssue);
        }
        if self.orphaned.contains(name) {
            status.push(UsageStatus::Orphaned);
        }

        Ok(SnippetDetails {
            name: name.to_string(),
            category: snippet.map(|s| s.category),
            file_path: snippet.map(|s| s.file_path.clone()),
            references,
            referenced_by: self.graph.refs_in(name).into_iter().cloned().collect(),
            usage_sites: self.direct.usage.get(name).cloned().unwrap_or_default(),
            status,
        })
    }

    /// Snippet names that fuzzily match `query`, best first
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<SnippetName> {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, &SnippetName)> = self.all_snippets
            .iter()
            .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
            .collect();

        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        results
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect()
    }
}
