//! Snippet Config CLI
//!
//! View and manage snippet tool configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use familiar_snippets::SnippetConfig;

#[derive(Parser)]
#[command(name = "snippet-config")]
#[command(about = "View and manage snippet analyzer configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: snippets.toml)
        #[arg(short, long, default_value = "snippets.toml")]
        output: PathBuf,

        /// Schemas root to record in the new file
        #[arg(short, long)]
        schemas_dir: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = SnippetConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Snippet Analyzer Configuration\n");
                println!("Schemas:");
                println!("  Root: {:?}", cfg.schemas.root);
                println!("  Snippets: {}", cfg.schemas.snippets_dir);
                println!("  Assembled (ignored): {}", cfg.schemas.assembled_dir);
                println!("  Reference key: {}", cfg.schemas.ref_key);

                println!("\nReport:");
                println!("  Output: {:?}", cfg.report.output);
                println!("  Format: {:?}", cfg.report.format);
                println!("  List limit: {}", cfg.report.list_limit);
                println!("  Usage details per snippet: {}", cfg.report.usage_detail_limit);
                println!("  Top inline schemas: {}", cfg.report.top_inline);

                println!("\nFix:");
                println!("  enum + const: {}", cfg.fix.enum_const);
                println!("  Numeric constraints: {}", cfg.fix.numeric_constraints);
                println!("  Report complex patterns: {}", cfg.fix.report_complex);
            }
        }

        Commands::Init { output, schemas_dir, force } => {
            if output.exists() && !force {
                eprintln!("❌ {} already exists (use --force to overwrite)", output.display());
                std::process::exit(1);
            }

            let mut cfg = SnippetConfig::default();
            if let Some(dir) = schemas_dir {
                cfg.schemas.root = dir;
            }
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output.display());
            if !cfg.snippets_path().is_dir() {
                println!("   ⚠️  No snippets directory at {:?} yet", cfg.snippets_path());
            }
        }

        Commands::Validate { config } => match SnippetConfig::load_from(config.as_deref()) {
            Ok(cfg) => {
                let problems = cfg.validate();
                if !problems.is_empty() {
                    eprintln!("❌ Configuration has {} problem(s):", problems.len());
                    for problem in &problems {
                        eprintln!("   - {}", problem);
                    }
                    std::process::exit(1);
                }

                println!("✅ Configuration is valid");
                println!("   Schemas: {:?}", cfg.schemas.root);
                println!("   Snippets: {:?}", cfg.snippets_path());
                println!("   Ignored: {:?}", cfg.schemas.root.join(&cfg.schemas.assembled_dir));
                if !cfg.schemas.root.is_dir() {
                    println!("   ⚠️  Schemas root does not exist; analysis will fail");
                } else if !cfg.snippets_path().is_dir() {
                    println!("   ⚠️  Snippets directory does not exist; every snippet set will be empty");
                }
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
