//! Configuration management for the snippet tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (snippets.toml)
//! - Environment variables (SNIPPETS__*)
//!
//! ## Example config file (snippets.toml):
//! ```toml
//! [schemas]
//! root = "schemas"
//! snippets_dir = "snippets"
//! assembled_dir = "assembled"
//! ref_key = "$ref"
//!
//! [report]
//! output = "SNIPPET_ANALYSIS_REPORT.md"
//! format = "markdown"
//! list_limit = 10
//!
//! [fix]
//! enum_const = true
//! numeric_constraints = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Main configuration for the snippet tools
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnippetConfig {
    /// Schema tree layout
    #[serde(default)]
    pub schemas: SchemasConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Constraint fixer settings
    #[serde(default)]
    pub fix: FixConfig,
}

/// Schema tree layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Root directory holding snippets and source schemas
    #[serde(default = "default_schemas_root")]
    pub root: PathBuf,

    /// Snippets subdirectory name (relative to root)
    #[serde(default = "default_snippets_dir")]
    pub snippets_dir: String,

    /// Assembled output directory name, excluded from analysis
    #[serde(default = "default_assembled_dir")]
    pub assembled_dir: String,

    /// Object key that marks a reference
    #[serde(default = "default_ref_key")]
    pub ref_key: String,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where the report is written
    #[serde(default = "default_report_output")]
    pub output: PathBuf,

    /// Report format (markdown or json)
    #[serde(default)]
    pub format: ReportFormat,

    /// Entries shown per category / top list
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Usage sites shown per snippet in the details section
    #[serde(default = "default_usage_detail_limit")]
    pub usage_detail_limit: usize,

    /// Schemas shown in the inline definition ranking
    #[serde(default = "default_list_limit")]
    pub top_inline: usize,
}

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format '{}' (expected markdown or json)", other)),
        }
    }
}

/// Constraint fixer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Drop `enum` when `const` is also present
    #[serde(default = "default_true")]
    pub enum_const: bool,

    /// Drop numeric bounds from number/integer schemas
    #[serde(default = "default_true")]
    pub numeric_constraints: bool,

    /// Warn about patternProperties and if/then/else
    #[serde(default = "default_true")]
    pub report_complex: bool,
}

// Default value functions
fn default_schemas_root() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_snippets_dir() -> String {
    "snippets".to_string()
}

fn default_assembled_dir() -> String {
    "assembled".to_string()
}

fn default_ref_key() -> String {
    "$ref".to_string()
}

fn default_report_output() -> PathBuf {
    PathBuf::from("SNIPPET_ANALYSIS_REPORT.md")
}

fn default_list_limit() -> usize {
    10
}

fn default_usage_detail_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            root: default_schemas_root(),
            snippets_dir: default_snippets_dir(),
            assembled_dir: default_assembled_dir(),
            ref_key: default_ref_key(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            format: ReportFormat::Markdown,
            list_limit: default_list_limit(),
            usage_detail_limit: default_usage_detail_limit(),
            top_inline: default_list_limit(),
        }
    }
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            enum_const: true,
            numeric_constraints: true,
            report_complex: true,
        }
    }
}

impl SnippetConfig {
    /// Load configuration, layering an explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> crate::Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "snippets.toml",
            ".snippets.toml",
            "config/snippets.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "snippets") {
            let xdg_config = config_dir.config_dir().join("snippets.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SNIPPETS__SCHEMAS__ROOT=..., SNIPPETS__REPORT__FORMAT=json
        builder = builder.add_source(
            Environment::with_prefix("SNIPPETS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| crate::SnippetError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path of the snippets directory
    pub fn snippets_path(&self) -> PathBuf {
        self.schemas.root.join(&self.schemas.snippets_dir)
    }

    /// Layout problems that would make an analysis meaningless.
    ///
    /// Directory names are matched against root-relative paths, so they must
    /// be relative, non-empty and must not climb out of the root. A nested
    /// value such as `lib/snippets` is fine.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let schemas = &self.schemas;

        for (key, value) in [
            ("schemas.snippets_dir", &schemas.snippets_dir),
            ("schemas.assembled_dir", &schemas.assembled_dir),
        ] {
            let path = Path::new(value);
            if value.trim().is_empty() {
                problems.push(format!("{} is empty", key));
            } else if path.is_absolute() {
                problems.push(format!("{} must be relative to schemas.root, got {:?}", key, value));
            } else if path.components().any(|c| matches!(c, Component::ParentDir)) {
                problems.push(format!("{} must stay inside schemas.root, got {:?}", key, value));
            }
        }

        if Path::new(&schemas.snippets_dir) == Path::new(&schemas.assembled_dir) {
            problems.push(format!(
                "schemas.snippets_dir and schemas.assembled_dir are both {:?}",
                schemas.snippets_dir
            ));
        }

        if schemas.ref_key.is_empty() {
            problems.push("schemas.ref_key is empty".to_string());
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnippetConfig::default();
        assert_eq!(config.schemas.root, PathBuf::from("schemas"));
        assert_eq!(config.schemas.ref_key, "$ref");
        assert_eq!(config.report.format, ReportFormat::Markdown);
        assert!(config.fix.enum_const);
    }

    #[test]
    fn test_serialize_config() {
        let config = SnippetConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[schemas]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("[fix]"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SnippetConfig = toml::from_str(
            r#"
            [report]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.report.list_limit, 10);
        assert_eq!(config.schemas.snippets_dir, "snippets");
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_validate_layout() {
        let mut config = SnippetConfig::default();
        assert!(config.validate().is_empty());

        config.schemas.snippets_dir = "lib/snippets".to_string();
        assert!(config.validate().is_empty());

        config.schemas.snippets_dir = "../shared/snippets".to_string();
        config.schemas.assembled_dir = String::new();
        config.schemas.ref_key = String::new();
        let problems = config.validate();
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("schemas.snippets_dir must stay inside"));
        assert_eq!(problems[1], "schemas.assembled_dir is empty");
        assert_eq!(problems[2], "schemas.ref_key is empty");

        let mut config = SnippetConfig::default();
        config.schemas.assembled_dir = "snippets".to_string();
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_snippets_path() {
        let config = SnippetConfig::default();
        assert_eq!(config.snippets_path(), PathBuf::from("schemas/snippets"));
    }
}
