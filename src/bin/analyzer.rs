//! Snippet Usage Analyzer CLI
//!
//! Scans a schemas tree, computes direct, transitive and orphaned snippet
//! usage and writes a report.
//!
//! Usage:
//!   snippet-analyzer analyze --schemas-dir docs/v3/schemas
//!   snippet-analyzer show EntityId
//!   snippet-analyzer graph --output snippets.dot

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use familiar_snippets::report::{self, ReportOptions};
use familiar_snippets::{ReportFormat, SnippetAnalyzer, SnippetConfig, SnippetError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snippet-analyzer")]
#[command(about = "Analyze how schema snippets are used by source schemas")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Schemas root (overrides config)
    #[arg(short, long, global = true)]
    schemas_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write the report
    Analyze {
        /// Report path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format: markdown or json
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Print the report instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Explain a single snippet
    Show {
        /// Snippet name (file stem)
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the snippet dependency graph in DOT format
    Graph {
        /// Output file (defaults to snippets.dot)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SnippetConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(dir) = cli.schemas_dir {
        config.schemas.root = dir;
    }
    let problems = config.validate();
    if !problems.is_empty() {
        anyhow::bail!("invalid configuration: {}", problems.join("; "));
    }

    let analyzer = SnippetAnalyzer::from_config(&config);

    match cli.command {
        Commands::Analyze { output, format, stdout } => {
            let format = format.unwrap_or(config.report.format);
            let output = output.unwrap_or_else(|| config.report.output.clone());

            if !stdout {
                println!("🔍 Analyzing snippet usage in {:?}\n", analyzer.schemas_root());
            }
            let analysis = analyzer.run()?;

            let options = ReportOptions::from(&config.report);
            let content = report::render(&analysis, format, &options, Local::now())?;

            if stdout {
                println!("{}", content);
                return Ok(());
            }

            report::write_report(&output, &content)?;

            println!("📊 Summary:");
            for line in report::summary_lines(&analysis) {
                println!("   {}", line);
            }
            if !analysis.unresolved.is_empty() {
                println!("   - {} unresolved references", analysis.unresolved.len());
            }
            if !analysis.cycles.is_empty() {
                println!("   - {} snippet cycles", analysis.cycles.len());
            }
            println!("\n✅ Report written to: {:?}", output);
        }

        Commands::Show { name, json } => {
            let analysis = analyzer.run()?;
            let details = match analysis.explain(&name) {
                Ok(details) => details,
                Err(SnippetError::UnknownSnippet { name, suggestions }) => {
                    eprintln!("❌ Unknown snippet: {}", name);
                    if !suggestions.is_empty() {
                        eprintln!("   Did you mean: {}?", suggestions.join(", "));
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
                return Ok(());
            }

            println!("📦 {}", details.name);
            match (&details.category, &details.file_path) {
                (Some(category), Some(path)) => {
                    println!("   Category: {}", category);
                    println!("   File: {}", path.display());
                }
                _ => println!("   ⚠️  No snippet file found (unresolved reference)"),
            }
            println!("   Status: {:?}", details.status);

            println!("\n   References ({}):", details.references.len());
            for target in &details.references {
                println!("     → {}", target);
            }
            println!("\n   Referenced by ({}):", details.referenced_by.len());
            for source in &details.referenced_by {
                println!("     ← {}", source);
            }
            println!("\n   Direct usage sites ({}):", details.usage_sites.len());
            for site in &details.usage_sites {
                println!("     - {} at {}", site.file.display(), site.location);
            }
        }

        Commands::Graph { output } => {
            let graph = analyzer.dependency_graph();
            println!(
                "Graph loaded: {} snippets, {} edges",
                graph.snippet_count(),
                graph.edge_count()
            );

            let output = output.unwrap_or_else(|| PathBuf::from("snippets.dot"));
            report::write_report(&output, &graph.to_dot())?;
            println!("✅ Exported DOT to: {:?}", output);
        }
    }

    Ok(())
}
