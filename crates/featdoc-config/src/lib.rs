//! Configuration parsing and management for featdoc.
//!
//! This crate provides:
//! - Reporter options as a host or `featdoc.toml` supplies them
//! - TOML parsing and config discovery
//! - Precedence handling (CLI > config file > defaults)

use featdoc_types::{
    DEFAULT_OUTPUT_FILE, DEFAULT_PLACEHOLDER_BASE, Placeholders, TEST_TYPE_BEHAVIOR,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for by [`discover_config`].
pub const CONFIG_FILE_NAME: &str = "featdoc.toml";

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Output format of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown fragment, embedded between placeholder markers.
    #[default]
    Markdown,
    /// JSON records, always overwriting the destination.
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

/// Reporter options as supplied by the host or a config file.
///
/// Every field is optional; unset fields fall back to the defaults in
/// [`EffectiveOptions`]. Both `snake_case` and the host's `camelCase` keys
/// are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReporterOptions {
    /// Destination document.
    #[serde(default, alias = "outputFile")]
    pub output_file: Option<String>,

    /// Output format.
    #[serde(default, alias = "outputFormat")]
    pub output_format: Option<OutputFormat>,

    /// Link to the full test report, appended to Markdown output.
    #[serde(default, alias = "fullReportLink")]
    pub full_report_link: Option<String>,

    /// Show each context as a heading.
    #[serde(default, alias = "reportProjects")]
    pub report_projects: Option<bool>,

    /// Base name of the placeholder marker pair.
    #[serde(default, alias = "embeddingPlaceholder")]
    pub embedding_placeholder: Option<String>,

    /// Classification treated as behavioral.
    #[serde(default, alias = "behaviorTestType")]
    pub behavior_test_type: Option<String>,
}

// ============================================================================
// Effective Configuration
// ============================================================================

/// Effective options with all values resolved.
///
/// This represents the final configuration after applying:
/// 1. Defaults
/// 2. Config file values
/// 3. CLI overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    pub output_file: PathBuf,
    pub format: OutputFormat,
    pub full_report_link: Option<String>,
    pub report_projects: bool,
    pub placeholder: String,
    pub behavior_test_type: String,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            format: OutputFormat::Markdown,
            full_report_link: None,
            report_projects: false,
            placeholder: DEFAULT_PLACEHOLDER_BASE.to_string(),
            behavior_test_type: TEST_TYPE_BEHAVIOR.to_string(),
        }
    }
}

impl EffectiveOptions {
    /// Resolve host-supplied options against the defaults.
    pub fn from_options(options: &ReporterOptions) -> Self {
        resolve_config(Some(options), &CliOverrides::default())
    }

    /// The marker pair derived from the placeholder base.
    pub fn placeholders(&self) -> Placeholders {
        Placeholders::from_base(&self.placeholder)
    }

    /// Check the resolved values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "output_file must not be empty".to_string(),
            ));
        }
        check_not_blank("embedding_placeholder", &self.placeholder)?;
        check_not_blank("behavior_test_type", &self.behavior_test_type)?;
        Ok(())
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ReporterOptions, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<ReporterOptions, ConfigError> {
    let config: ReporterOptions = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration values.
///
/// Only values that are set are checked.
pub fn validate_config(config: &ReporterOptions) -> Result<(), ConfigError> {
    if let Some(output_file) = &config.output_file {
        check_not_blank("output_file", output_file)?;
    }
    if let Some(placeholder) = &config.embedding_placeholder {
        check_not_blank("embedding_placeholder", placeholder)?;
    }
    if let Some(test_type) = &config.behavior_test_type {
        check_not_blank("behavior_test_type", test_type)?;
    }
    Ok(())
}

fn check_not_blank(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue(format!(
            "{} must not be empty",
            name
        )));
    }
    Ok(())
}

/// Try to find and load configuration from the standard location.
///
/// Searches for `featdoc.toml` in the current directory and parent directories.
pub fn discover_config() -> Option<(PathBuf, ReporterOptions)> {
    let current = std::env::current_dir().ok()?;
    discover_config_from(&current)
}

/// Like [`discover_config`], starting from `start`.
pub fn discover_config_from(start: &Path) -> Option<(PathBuf, ReporterOptions)> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists()
            && let Ok(config) = load_config(&config_path)
        {
            return Some((config_path, config));
        }

        if !current.pop() {
            break;
        }
    }

    None
}

// ============================================================================
// Precedence Resolution
// ============================================================================

/// CLI override options.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub full_report_link: Option<String>,
    pub report_projects: Option<bool>,
    pub placeholder: Option<String>,
    pub behavior_test_type: Option<String>,
}

/// Resolve effective options from the config file and CLI overrides.
///
/// Precedence: CLI > config file > defaults. An empty report link counts as
/// unset.
pub fn resolve_config(config: Option<&ReporterOptions>, cli: &CliOverrides) -> EffectiveOptions {
    let mut effective = EffectiveOptions::default();

    // Apply config file values
    if let Some(config) = config {
        if let Some(output_file) = &config.output_file {
            effective.output_file = PathBuf::from(output_file);
        }
        if let Some(format) = config.output_format {
            effective.format = format;
        }
        if let Some(link) = &config.full_report_link {
            effective.full_report_link = Some(link.clone());
        }
        if let Some(report_projects) = config.report_projects {
            effective.report_projects = report_projects;
        }
        if let Some(placeholder) = &config.embedding_placeholder {
            effective.placeholder = placeholder.clone();
        }
        if let Some(test_type) = &config.behavior_test_type {
            effective.behavior_test_type = test_type.clone();
        }
    }

    // Apply CLI overrides
    if let Some(output_file) = &cli.output_file {
        effective.output_file = output_file.clone();
    }
    if let Some(format) = cli.format {
        effective.format = format;
    }
    if let Some(link) = &cli.full_report_link {
        effective.full_report_link = Some(link.clone());
    }
    if let Some(report_projects) = cli.report_projects {
        effective.report_projects = report_projects;
    }
    if let Some(placeholder) = &cli.placeholder {
        effective.placeholder = placeholder.clone();
    }
    if let Some(test_type) = &cli.behavior_test_type {
        effective.behavior_test_type = test_type.clone();
    }

    effective.full_report_link = effective.full_report_link.filter(|link| !link.is_empty());
    effective
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let effective = EffectiveOptions::default();
        assert_eq!(effective.output_file, PathBuf::from("FEATURES.md"));
        assert_eq!(effective.format, OutputFormat::Markdown);
        assert_eq!(effective.full_report_link, None);
        assert!(!effective.report_projects);
        assert_eq!(effective.behavior_test_type, "behavior");
        assert_eq!(effective.placeholders().start, "<!-- featdoc--start -->");
        assert!(effective.validate().is_ok());
    }

    #[test]
    fn test_parse_snake_case() {
        let config = parse_config(
            r#"
output_file = "docs/FEATURES.md"
output_format = "json"
full_report_link = "https://ci.example.com/report"
report_projects = true
embedding_placeholder = "features"
behavior_test_type = "spec"
"#,
        )
        .unwrap();

        assert_eq!(config.output_file.as_deref(), Some("docs/FEATURES.md"));
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(
            config.full_report_link.as_deref(),
            Some("https://ci.example.com/report")
        );
        assert_eq!(config.report_projects, Some(true));
        assert_eq!(config.embedding_placeholder.as_deref(), Some("features"));
        assert_eq!(config.behavior_test_type.as_deref(), Some("spec"));
    }

    #[test]
    fn test_parse_camel_case() {
        let config = parse_config(
            r#"
outputFile = "README.md"
outputFormat = "markdown"
reportProjects = false
embeddingPlaceholder = "generated"
"#,
        )
        .unwrap();

        assert_eq!(config.output_file.as_deref(), Some("README.md"));
        assert_eq!(config.output_format, Some(OutputFormat::Markdown));
        assert_eq!(config.report_projects, Some(false));
        assert_eq!(config.embedding_placeholder.as_deref(), Some("generated"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ReporterOptions::default());
    }

    #[test]
    fn test_format_names_match_config_values() {
        for format in [OutputFormat::Markdown, OutputFormat::Json] {
            let config = parse_config(&format!("output_format = \"{}\"", format.as_str())).unwrap();
            assert_eq!(config.output_format, Some(format));
        }
    }

    #[test]
    fn test_parse_unknown_format_fails() {
        let result = parse_config(r#"output_format = "html""#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        for content in [
            r#"output_file = """#,
            r#"embedding_placeholder = " ""#,
            r#"behavior_test_type = """#,
        ] {
            let result = parse_config(content);
            assert!(
                matches!(result, Err(ConfigError::InvalidValue(_))),
                "expected InvalidValue for {content}"
            );
        }
    }

    #[test]
    fn test_effective_validate_rejects_empty_placeholder() {
        let effective = EffectiveOptions {
            placeholder: String::new(),
            ..EffectiveOptions::default()
        };
        let err = effective.validate().unwrap_err();
        assert!(err.to_string().contains("embedding_placeholder"));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "report_projects = true\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.report_projects, Some(true));
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = load_config(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_discover_config_walks_up() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "output_file = \"docs/FEATURES.md\"\n",
        )
        .unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (path, config) = discover_config_from(&nested).unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(config.output_file.as_deref(), Some("docs/FEATURES.md"));
    }

    #[test]
    fn test_resolve_config_precedence() {
        let config = ReporterOptions {
            output_file: Some("from-file.md".to_string()),
            output_format: Some(OutputFormat::Json),
            report_projects: Some(true),
            ..ReporterOptions::default()
        };
        let cli = CliOverrides {
            output_file: Some(PathBuf::from("from-cli.md")),
            ..CliOverrides::default()
        };

        let effective = resolve_config(Some(&config), &cli);
        assert_eq!(effective.output_file, PathBuf::from("from-cli.md"));
        assert_eq!(effective.format, OutputFormat::Json);
        assert!(effective.report_projects);
        assert_eq!(effective.placeholder, "featdoc");
    }

    #[test]
    fn test_resolve_config_without_file() {
        let cli = CliOverrides {
            placeholder: Some("custom".to_string()),
            report_projects: Some(true),
            ..CliOverrides::default()
        };

        let effective = resolve_config(None, &cli);
        assert_eq!(effective.placeholder, "custom");
        assert!(effective.report_projects);
        assert_eq!(effective.placeholders().end, "<!-- custom--end -->");
    }

    #[test]
    fn test_empty_report_link_is_unset() {
        let options = ReporterOptions {
            full_report_link: Some(String::new()),
            ..ReporterOptions::default()
        };
        assert_eq!(EffectiveOptions::from_options(&options).full_report_link, None);
    }
}
