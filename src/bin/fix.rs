//! Schema Constraint Fixer CLI
//!
//! Usage:
//!   schema-fix input_schema.json output_schema.json
//!   schema-fix --batch input_dir/ output_dir/
//!   schema-fix --dry-run input_schema.json output_schema.json

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use familiar_snippets::fix::diff_schemas;
use familiar_snippets::{ConstraintFixer, SnippetConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-fix")]
#[command(about = "Fix JSON schemas for code generator compatibility")]
struct Cli {
    /// Input schema file or directory
    input: PathBuf,

    /// Output schema file or directory
    output: PathBuf,

    /// Process every schema under the input directory
    #[arg(long)]
    batch: bool,

    /// Show the changes without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,
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
    let config = SnippetConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    let fixer = ConstraintFixer::new(config.fix);

    if cli.batch {
        if cli.dry_run {
            anyhow::bail!("--dry-run only works on a single file");
        }

        let summary = fixer
            .fix_batch(&cli.input, &cli.output)
            .with_context(|| format!("failed to process {:?}", cli.input))?;

        println!("📁 Processed {} schema files", summary.processed);
        println!("   🔧 {} modified", summary.modified);
        println!("   ⚠️  {} warnings", summary.warnings);
        if !summary.failed.is_empty() {
            println!("   ❌ {} failed (skipped):", summary.failed.len());
        }
        for failed in &summary.failed {
            println!("      - {}", failed.display());
        }
    } else if cli.dry_run {
        let original = familiar_snippets::loader::load_json_file(&cli.input)?;
        let outcome = fixer.fix(&original);

        for change in &outcome.changes {
            println!("🔧 {}", change);
        }
        print!("{}", diff_schemas(&original, &outcome.schema)?);
        println!("\n(dry run, nothing written to {:?})", cli.output);
        return Ok(());
    } else {
        println!("📝 Processing: {:?}", cli.input);
        let outcome = fixer.fix_file(&cli.input, &cli.output)?;
        for change in &outcome.changes {
            println!("🔧 {}", change);
        }
        println!("✅ Fixed schema saved to: {:?}", cli.output);
    }

    println!("🎉 Schema fixing complete!");
    Ok(())
}
