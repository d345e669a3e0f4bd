//! Familiar Snippet Analyzer
//!
//! Measures how the reusable schema snippets under `schemas/snippets/` are
//! used by the source schemas of the Familiar platform.
//!
//! ## Features
//!
//! - **Direct Usage**: every `$ref` from a source schema to a snippet
//! - **Transitive Types**: types reached only through other type snippets
//! - **Field Hygiene**: fields reached only through other snippets are flagged
//! - **Orphans**: snippets nothing uses
//! - **Diagnostics**: cycles, dangling references, duplicate names, DOT export
//! - **Constraint Fixer**: rewrites schemas so type generators accept them
//!
//! ## Layout
//!
//! ```text
//! schemas/
//! ├── snippets/
//! │   ├── fields/      # field snippets
//! │   └── types/       # type snippets
//! ├── assembled/       # generated output, ignored
//! └── entities/        # source schemas (anything else)
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod fix;
pub mod graph;
pub mod loader;
pub mod lookup;
pub mod refs;
pub mod report;
pub mod snippet;
pub mod usage;

pub use analysis::{SnippetAnalysis, SnippetAnalyzer};
pub use config::{ReportFormat, SnippetConfig};
pub use error::{Result, SnippetError};
pub use fix::{ConstraintFixer, FixChange, FixKind, FixOutcome};
pub use graph::{DependencyGraph, SnippetCycle, SnippetName};
pub use lookup::{SnippetDetails, UsageStatus};
pub use refs::{find_snippet_references, ReferenceExtractor};
pub use report::ReportOptions;
pub use snippet::{Snippet, SnippetCategory, SnippetRef};
pub use usage::{DirectUsage, InlineCounts, UsageSite};
