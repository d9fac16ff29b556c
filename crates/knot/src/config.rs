use anyhow::{Context, Result};
use knot_emit::{DEFAULT_TEMPLATE, Template};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing_subscriber::EnvFilter;

/// Settings for a knot run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Text output configuration
    #[serde(default)]
    pub text: TextConfig,

    /// Tolerances for the closure and continuity checks
    #[serde(default)]
    pub check: CheckConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Line template used when `--format` is not given
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Largest gap between the end and the start that still counts as a closed loop
    #[serde(default = "default_closure_tolerance")]
    pub closure_tolerance: f64,

    /// Largest derivative mismatch at a joint before a warning is logged
    #[serde(default = "default_residual_tolerance")]
    pub residual_tolerance: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            closure_tolerance: default_closure_tolerance(),
            residual_tolerance: default_residual_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_closure_tolerance() -> f64 {
    1e-9
}

fn default_residual_tolerance() -> f64 {
    1e-6
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config as TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config as JSON")
    }

    pub fn validate(&self) -> Result<()> {
        self.template()?;

        for (name, value) in [
            ("check.closure_tolerance", self.check.closure_tolerance),
            ("check.residual_tolerance", self.check.residual_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{name} must be a finite, non-negative number (got {value})");
            }
        }

        EnvFilter::try_new(&self.log.level)
            .with_context(|| format!("invalid log.level {:?}", self.log.level))?;

        Ok(())
    }

    /// The configured text template, parsed
    pub fn template(&self) -> Result<Template> {
        Template::parse(&self.text.template)
            .with_context(|| format!("invalid text.template {:?}", self.text.template))
    }
}
