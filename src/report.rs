//! Report Generation
//!
//! Renders a finished [`SnippetAnalysis`] as Markdown or JSON. Rendering only
//! reads the analysis.

use chrono::{DateTime, Local};
use std::path::Path;

use crate::analysis::SnippetAnalysis;
use crate::config::{ReportConfig, ReportFormat};
use crate::error::{Result, SnippetError};
use crate::graph::SnippetName;
use crate::snippet::SnippetCategory;

/// Limits applied while rendering
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Entries listed per category and in top lists
    pub list_limit: usize,
    /// Usage sites listed per snippet in the details section
    pub usage_detail_limit: usize,
    /// Schemas listed in the inline definition ranking
    pub top_inline: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            list_limit: 10,
            usage_detail_limit: 5,
            top_inline: 10,
        }
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            list_limit: config.list_limit,
            usage_detail_limit: config.usage_detail_limit,
            top_inline: config.top_inline,
        }
    }
}

/// Render in the requested format
pub fn render(
    analysis: &SnippetAnalysis,
    format: ReportFormat,
    options: &ReportOptions,
    generated_at: DateTime<Local>,
) -> Result<String> {
    match format {
        ReportFormat::Markdown => Ok(render_markdown(analysis, options, generated_at)),
        ReportFormat::Json => render_json(analysis),
    }
}

/// Pretty JSON dump of the whole analysis
pub fn render_json(analysis: &SnippetAnalysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

/// Write a report without ever leaving a partial file behind: the content
/// lands in a sibling temp file first and is renamed into place.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| SnippetError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, content).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        write_err(e)
    })
}

fn code_list(names: &[SnippetName]) -> String {
    names.iter().map(|n| format!("`{}`", n)).collect::<Vec<_>>().join(", ")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render the Markdown report
pub fn render_markdown(
    analysis: &SnippetAnalysis,
    options: &ReportOptions,
    generated_at: DateTime<Local>,
) -> String {
    let a = analysis;
    let direct = &a.direct;
    let mut out = String::new();

    // ---------------------------------------------------------------- summary
    out.push_str("# Source Schema Snippet Usage Analysis Report\n\n");
    out.push_str("## Executive Summary\n\n");
    out.push_str("Analysis of source schemas (assembled directory excluded, transitive closure for types only):\n");
    out.push_str(&format!("- **{} source schemas** analyzed\n", direct.schemas_analyzed));
    out.push_str(&format!(
        "- **{} snippets exist** ({} fields, {} types)\n",
        a.all_snippets.len(),
        a.field_snippets.len(),
        a.type_snippets.len()
    ));
    out.push_str(&format!("- **{} snippets actually used** (including transitive types)\n", a.all_used.len()));
    out.push_str(&format!(
        "- **{} directly used**, **{} types transitively used**\n",
        a.directly_used.len(),
        a.transitive_types.len()
    ));
    out.push_str(&format!(
        "- **{} fields used transitively** (medium priority optimization)\n",
        a.transitive_field_issues.len()
    ));
    out.push_str(&format!("- **{} truly orphaned snippets**\n", a.orphaned.len()));
    out.push_str(&format!("- **{} inline definitions** in source schemas\n", direct.inline_totals.count));
    out.push_str(&format!("- **{} total snippet references**\n", direct.total_references));
    out.push_str(&format!("- **Usage rate: {:.1}%**\n", a.usage_rate));

    // ----------------------------------------------------------- key findings
    out.push_str("\n## Key Findings\n\n");
    out.push_str(&format!(
        "### 1. Snippet Usage Status ({}/{} snippets used)\n\n",
        a.all_used.len(),
        a.all_snippets.len()
    ));
    out.push_str(&format!("**✅ DIRECTLY USED SNIPPETS ({} total):**\n", a.directly_used.len()));

    for (label, category) in [("Fields", SnippetCategory::Field), ("Types", SnippetCategory::Type)] {
        let used = a.in_category(&a.directly_used, category);
        out.push_str(&format!("- **{}** - {} snippets directly used\n", label, used.len()));
        for name in used.iter().take(options.list_limit) {
            out.push_str(&format!("  - `{}` (used {}x)\n", name, direct.use_count(name)));
        }
        if used.len() > options.list_limit {
            out.push_str(&format!("  - ... and {} more\n", used.len() - options.list_limit));
        }
    }
    let direct_other = a.in_category(&a.directly_used, SnippetCategory::Other);
    if !direct_other.is_empty() {
        out.push_str(&format!("- **Other** - {} snippets directly used\n", direct_other.len()));
    }

    out.push_str(&format!(
        "\n**🔗 TRANSITIVELY USED TYPES ({} total - CORRECT BEHAVIOR):**\n",
        a.transitive_types.len()
    ));
    if a.transitive_types.is_empty() {
        out.push_str("- None (all type snippets are directly referenced)\n");
    } else {
        for name in &a.transitive_types {
            let users: Vec<SnippetName> = a.graph
                .refs_in(name)
                .into_iter()
                .filter(|s| a.directly_used.contains(*s))
                .cloned()
                .collect();
            if users.is_empty() {
                out.push_str(&format!("- `{}` ← transitive chain\n", name));
            } else {
                out.push_str(&format!("- `{}` ← used by `{}`\n", name, users.join(", ")));
            }
        }
    }

    out.push_str(&format!(
        "\n**⚠️ TRANSITIVELY USED FIELDS ({} total - MEDIUM PRIORITY OPTIMIZATION):**\n",
        a.transitive_field_issues.len()
    ));
    if a.transitive_field_issues.is_empty() {
        out.push_str("- None! All field snippets are properly directly referenced ✅\n");
    } else {
        out.push_str("**These fields should be directly referenced by schemas, not through other snippets:**\n");
        for name in &a.transitive_field_issues {
            let via: Vec<&SnippetName> = a.graph.refs_in(name);
            if via.is_empty() {
                out.push_str(&format!("- `{}` ← indirect usage\n", name));
            } else {
                let via: Vec<&str> = via.iter().map(|s| s.as_str()).collect();
                out.push_str(&format!("- `{}` ← currently used via `{}`\n", name, via.join(", ")));
            }
        }
    }

    out.push_str(&format!("\n**🔍 TRULY ORPHANED SNIPPETS ({} total):**\n", a.orphaned.len()));
    if a.orphaned.is_empty() {
        out.push_str("- None! All snippets are being used ✅\n");
    } else {
        for (label, category) in [
            ("Fields", SnippetCategory::Field),
            ("Types", SnippetCategory::Type),
            ("Other", SnippetCategory::Other),
        ] {
            let orphaned = a.in_category(&a.orphaned, category);
            if orphaned.is_empty() {
                continue;
            }
            out.push_str(&format!("**Orphaned {} ({}):**\n", label, orphaned.len()));
            for name in &orphaned {
                out.push_str(&format!("- `{}`\n", name));
            }
        }
    }

    // --------------------------------------------------------- inline ranking
    let top_inline = direct.top_inline(options.top_inline);
    out.push_str("\n### 2. Source Schemas with Most Inline Definitions\n\n");
    out.push_str("**Top Candidates for Optimization:**\n");
    for (i, schema) in top_inline.iter().enumerate() {
        out.push_str(&format!(
            "{}. `{}` - {} inline definitions\n",
            i + 1,
            file_name(&schema.file),
            schema.counts.count
        ));
    }

    out.push_str("\n### 3. Pattern Analysis\n\n");
    out.push_str("**Constraint Patterns:**\n");
    for (pattern, count) in direct.inline_totals.most_common() {
        out.push_str(&format!("- `{}` - {} occurrences\n", pattern, count));
    }

    out.push_str("\n### 4. Most Referenced Snippets\n\n");
    out.push_str(&format!("**Top {} Most Used Snippets:**\n", options.list_limit));
    for (name, count) in direct.most_used(options.list_limit) {
        out.push_str(&format!(
            "- `{}` ({}) - used {} times\n",
            name,
            a.category_label(name),
            count
        ));
    }

    // ------------------------------------------------------ dependency chains
    out.push_str("\n### 5. Snippet Dependency Chains\n\n");
    out.push_str("**Valid type-to-type dependencies:**\n");
    for (name, targets) in a.graph.chains_from(SnippetCategory::Type) {
        out.push_str(&format!("- `{}` → {}\n", name, code_list(&targets)));
    }

    let field_chains = a.graph.chains_from(SnippetCategory::Field);
    if !field_chains.is_empty() {
        out.push_str("\n**Field-to-other dependencies (review these):**\n");
        for (name, targets) in field_chains {
            out.push_str(&format!("- `{}` → {}\n", name, code_list(&targets)));
        }
    }

    // ------------------------------------------------------ graph diagnostics
    out.push_str("\n### 6. Graph Diagnostics\n\n");
    out.push_str(&format!("**Snippet cycles ({}):**\n", a.cycles.len()));
    if a.cycles.is_empty() {
        out.push_str("- None\n");
    }
    for cycle in &a.cycles {
        if cycle.is_self_referential {
            out.push_str(&format!("- `{}` references itself\n", cycle.members[0]));
        } else {
            out.push_str(&format!("- {}\n", code_list(&cycle.members)));
        }
    }

    out.push_str(&format!("\n**Unresolved references ({}):**\n", a.unresolved.len()));
    if a.unresolved.is_empty() {
        out.push_str("- None\n");
    }
    for name in &a.unresolved {
        out.push_str(&format!("- `{}` has no snippet file\n", name));
    }

    if !a.duplicates.is_empty() {
        out.push_str(&format!("\n**Duplicate snippet names ({}):**\n", a.duplicates.len()));
        for name in &a.duplicates {
            out.push_str(&format!("- `{}` is defined by more than one file\n", name));
        }
    }

    // ---------------------------------------------------------------- details
    out.push_str("\n## Detailed Usage Analysis\n\n");
    out.push_str("### Direct Snippet Usage Details\n");
    for name in &a.directly_used {
        let sites = direct.usage.get(name).map(Vec::as_slice).unwrap_or_default();
        out.push_str(&format!(
            "\n#### `{}` ({}, used {} times)\n",
            name,
            a.category_label(name),
            sites.len()
        ));
        for site in sites.iter().take(options.usage_detail_limit) {
            out.push_str(&format!("- `{}` at `{}`\n", file_name(&site.file), site.location));
        }
        if sites.len() > options.usage_detail_limit {
            out.push_str(&format!(
                "- ... and {} more usages\n",
                sites.len() - options.usage_detail_limit
            ));
        }
    }

    // -------------------------------------------------------- recommendations
    out.push_str("\n## Recommendations\n\n");
    out.push_str(&format!(
        "### Priority 1: Address Remaining {} Orphaned Snippets\n",
        a.orphaned.len()
    ));
    if a.orphaned.is_empty() {
        out.push_str("✅ No orphaned snippets! Excellent snippet utilization.\n");
    } else {
        out.push_str("**Consider removing or finding uses for:**\n");
        for name in &a.orphaned {
            out.push_str(&format!("- `{}` ({}) - Review if still needed\n", name, a.category_label(name)));
        }
    }

    out.push_str(&format!(
        "\n### Priority 2: Fix {} Transitive Field Usage (Medium Priority)\n",
        a.transitive_field_issues.len()
    ));
    out.push_str("**Fields should be directly referenced by schemas, not through other snippets:**\n");
    if a.transitive_field_issues.is_empty() {
        out.push_str("✅ All fields are properly directly referenced.\n");
    } else {
        for name in &a.transitive_field_issues {
            out.push_str(&format!("- `{}` - Make schemas reference this directly\n", name));
        }
    }

    out.push_str("\n### Priority 3: Optimize High-Inline Schemas\n");
    out.push_str("**Focus on schemas with most inline definitions for snippet extraction:**\n");
    for (i, schema) in top_inline.iter().take(5).enumerate() {
        out.push_str(&format!(
            "{}. `{}` - {} inline definitions\n",
            i + 1,
            file_name(&schema.file),
            schema.counts.count
        ));
    }

    out.push_str("\n### Priority 4: Pattern Consolidation\n");
    out.push_str("**Common patterns that could be standardized:**\n");
    for (pattern, count) in direct.inline_totals.most_common() {
        out.push_str(&format!(
            "- `{}` appears {} times - consider snippet consolidation\n",
            pattern, count
        ));
    }

    // ---------------------------------------------------------------- metrics
    out.push_str("\n## Success Metrics\n\n");
    out.push_str("**Current Status:**\n");
    out.push_str(&format!("- Total snippets: {}\n", a.all_snippets.len()));
    out.push_str(&format!("- Used snippets: {} ({:.1}%)\n", a.all_used.len(), a.usage_rate));
    out.push_str(&format!("  - Directly used: {}\n", a.directly_used.len()));
    out.push_str(&format!("  - Transitive types: {} (correct)\n", a.transitive_types.len()));
    out.push_str(&format!(
        "  - Transitive fields: {} (needs optimization)\n",
        a.transitive_field_issues.len()
    ));
    out.push_str(&format!("- Orphaned snippets: {}\n", a.orphaned.len()));
    out.push_str(&format!("- Total snippet references: {}\n", direct.total_references));
    out.push_str(&format!("- Inline definitions: {}\n", direct.inline_totals.count));
    out.push_str(&format!("- Schemas analyzed: {}\n", direct.schemas_analyzed));

    out.push_str("\n**Quality Indicators:**\n");
    out.push_str(&format!("- Usage efficiency: {:.1}% snippet utilization\n", a.usage_rate));
    out.push_str(&format!("- Reference density: {:.1} refs per schema\n", a.reference_density()));
    out.push_str("- Architecture: Types use transitive deps ✅, Fields should be direct\n");
    out.push_str(&format!("- Input digest: `{}`\n", a.input_digest));

    out.push_str("\n---\n\n");
    out.push_str(&format!(
        "*Generated by snippet-analyzer (transitive types only) on {}*\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out
}

/// Lines worth echoing to the terminal after a run
pub fn summary_lines(analysis: &SnippetAnalysis) -> Vec<String> {
    vec![
        format!("- {} source schemas analyzed", analysis.direct.schemas_analyzed),
        format!(
            "- {} snippets exist ({} fields, {} types)",
            analysis.all_snippets.len(),
            analysis.field_snippets.len(),
            analysis.type_snippets.len()
        ),
        format!("- Usage rate: {:.1}%", analysis.usage_rate),
        format!(
            "- {} fields used transitively",
            analysis.transitive_field_issues.len()
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyGraph;
    use crate::snippet::Snippet;
    use crate::usage::{DirectUsage, UsageSite};
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn analysis() -> SnippetAnalysis {
        let mut graph = DependencyGraph::new();
        for (name, category) in [
            ("A", SnippetCategory::Type),
            ("B", SnippetCategory::Type),
            ("F", SnippetCategory::Field),
            ("G", SnippetCategory::Field),
        ] {
            graph.register(Snippet {
                name: name.to_string(),
                category,
                file_path: PathBuf::from(format!("snippets/{}.json", name)),
            });
        }
        graph.add_edge("A", "B");

        let mut direct = DirectUsage::default();
        direct.schemas_analyzed = 1;
        direct.total_references = 2;
        for name in ["A", "G"] {
            direct.directly_used.insert(name.to_string());
            direct.usage.entry(name.to_string()).or_default().push(UsageSite {
                file: PathBuf::from("entities/Focus.schema.json"),
                location: format!("properties.{}.$ref", name),
                path: format!("../snippets/x/{}.json", name),
                category: SnippetCategory::Other,
            });
        }

        SnippetAnalysis::compute(PathBuf::from("schemas"), graph, direct, "abc123".to_string())
    }

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_markdown_sections() {
        let report = render_markdown(&analysis(), &ReportOptions::default(), timestamp());

        assert!(report.contains("- **1 source schemas** analyzed"));
        assert!(report.contains("- **4 snippets exist** (2 fields, 2 types)"));
        assert!(report.contains("- **Usage rate: 75.0%**"));
        assert!(report.contains("- `B` ← used by `A`"));
        assert!(report.contains("**Orphaned Fields (1):**\n- `F`"));
        assert!(report.contains("- `A` → `B`"));
        assert!(report.contains("#### `G` (field, used 1 times)"));
        assert!(report.contains("- `Focus.schema.json` at `properties.G.$ref`"));
        assert!(report.contains("- Reference density: 2.0 refs per schema"));
        assert!(report.contains("- Input digest: `abc123`"));
        assert!(report.contains("on 2024-01-02 03:04:05*"));
    }

    #[test]
    fn test_markdown_is_deterministic() {
        let a = analysis();
        let first = render_markdown(&a, &ReportOptions::default(), timestamp());
        let second = render_markdown(&a, &ReportOptions::default(), timestamp());
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_limit_truncates() {
        let options = ReportOptions { list_limit: 0, ..ReportOptions::default() };
        let report = render_markdown(&analysis(), &options, timestamp());
        assert!(report.contains("- **Fields** - 1 snippets directly used\n  - ... and 1 more"));
    }

    #[test]
    fn test_json_output() {
        let json = render_json(&analysis()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["orphaned"], serde_json::json!(["F"]));
        assert_eq!(value["transitive_types"], serde_json::json!(["B"]));
        assert_eq!(value["dependencies"]["A"], serde_json::json!(["B"]));
        assert!(value.get("graph").is_none());
    }

    #[test]
    fn test_write_report_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/REPORT.md");
        write_report(&path, "first").unwrap();
        write_report(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("out/REPORT.md.tmp").exists());
    }
}
