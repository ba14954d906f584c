//! Configuration management for KSS.
//!
//! Parses `kss.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`. Expanded fields:
//! - `templates.main`, `templates.section`, `templates.subsection`
//! - `output.dir`
//! - `output.base_url`

mod expand;

use std::path::{Path, PathBuf};

use kss_sections::{ParserOptions, RootOrder};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override master page template.
    pub main_template: Option<PathBuf>,
    /// Override section page template.
    pub section_template: Option<PathBuf>,
    /// Override subsection page template.
    pub subsection_template: Option<PathBuf>,
    /// Override link prefix.
    pub base_url: Option<String>,
    /// Override root ordering.
    pub root_order: Option<RootOrder>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "kss.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template locations (relative strings from TOML).
    templates: TemplatesConfigRaw,
    /// Output settings (relative strings from TOML).
    output: OutputConfigRaw,
    /// Options forwarded to the styleguide parser untouched.
    pub parser: toml::Table,

    /// Resolved template paths (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Resolved output settings (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw template locations as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemplatesConfigRaw {
    main: Option<String>,
    section: Option<String>,
    subsection: Option<String>,
}

/// Resolved template locations. Any of them may still be missing.
#[derive(Debug, Default)]
pub struct TemplatesConfig {
    /// Master (index) page template.
    pub main: Option<PathBuf>,
    /// Top-level section page template.
    pub section: Option<PathBuf>,
    /// Subsection page template.
    pub subsection: Option<PathBuf>,
}

/// The three required templates, all present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplatePaths {
    /// Master (index) page template.
    pub main: PathBuf,
    /// Top-level section page template.
    pub section: PathBuf,
    /// Subsection page template.
    pub subsection: PathBuf,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    base_url: Option<String>,
    root_order: Option<RootOrder>,
}

/// Resolved output configuration.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Output directory. `None` means next to the first input document.
    pub dir: Option<PathBuf>,
    /// Prefix for generated section links.
    pub base_url: String,
    /// Ordering of roots and sibling sections.
    pub root_order: RootOrder,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`templates.main`").
        field: String,
        /// Error message (e.g., "${`THEME_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty when present.
fn require_non_empty(value: Option<&str>, field: &str) -> Result<(), ConfigError> {
    if value.is_some_and(str::is_empty) {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `kss.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, so CLI
    /// arguments take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.output_dir {
            self.output_resolved.dir = Some(dir.clone());
        }
        if let Some(path) = &settings.main_template {
            self.templates_resolved.main = Some(path.clone());
        }
        if let Some(path) = &settings.section_template {
            self.templates_resolved.section = Some(path.clone());
        }
        if let Some(path) = &settings.subsection_template {
            self.templates_resolved.subsection = Some(path.clone());
        }
        if let Some(base_url) = &settings.base_url {
            self.output_resolved.base_url.clone_from(base_url);
        }
        if let Some(order) = settings.root_order {
            self.output_resolved.root_order = order;
        }
    }

    /// Get the three page templates.
    ///
    /// All three are required. Use this instead of reading
    /// `templates_resolved` directly when starting a build.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming every missing template.
    pub fn require_templates(&self) -> Result<TemplatePaths, ConfigError> {
        let TemplatesConfig {
            main,
            section,
            subsection,
        } = &self.templates_resolved;

        let missing: Vec<&str> = [
            ("templates.main", main.is_none()),
            ("templates.section", section.is_none()),
            ("templates.subsection", subsection.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        match (main, section, subsection) {
            (Some(main), Some(section), Some(subsection)) => Ok(TemplatePaths {
                main: main.clone(),
                section: section.clone(),
                subsection: subsection.clone(),
            }),
            _ => Err(ConfigError::Validation(format!(
                "missing required template path(s): {}",
                missing.join(", ")
            ))),
        }
    }

    /// Parser options as an opaque JSON object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a `[parser]` value has no JSON form.
    pub fn parser_options(&self) -> Result<ParserOptions, ConfigError> {
        match serde_json::to_value(&self.parser) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Ok(ParserOptions::new()),
            Err(e) => Err(ConfigError::Validation(format!(
                "[parser] options are not representable: {e}"
            ))),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;
        config.validate()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate raw configuration values.
    ///
    /// Missing templates are not an error here: CLI settings may still
    /// supply them. See [`Config::require_templates`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a present value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(self.templates.main.as_deref(), "templates.main")?;
        require_non_empty(self.templates.section.as_deref(), "templates.section")?;
        require_non_empty(self.templates.subsection.as_deref(), "templates.subsection")?;
        require_non_empty(self.output.dir.as_deref(), "output.dir")?;

        if let Some(base_url) = &self.output.base_url
            && base_url.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::Validation(
                "output.base_url cannot contain whitespace".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.templates.main, "templates.main")?;
        expand::expand_opt(&mut self.templates.section, "templates.section")?;
        expand::expand_opt(&mut self.templates.subsection, "templates.subsection")?;
        expand::expand_opt(&mut self.output.dir, "output.dir")?;
        expand::expand_opt(&mut self.output.base_url, "output.base_url")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&String>| path.map(|p| config_dir.join(p));

        self.templates_resolved = TemplatesConfig {
            main: resolve(self.templates.main.as_ref()),
            section: resolve(self.templates.section.as_ref()),
            subsection: resolve(self.templates.subsection.as_ref()),
        };

        self.output_resolved = OutputConfig {
            dir: resolve(self.output.dir.as_ref()),
            base_url: self.output.base_url.clone().unwrap_or_default(),
            root_order: self.output.root_order.unwrap_or_default(),
        };
    }
}
