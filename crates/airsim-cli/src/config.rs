//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use airsim_core::{AirSystemKind, SystemConfig, VentilationMode};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::OutputFormat;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format ("text" or "json")
    #[serde(default)]
    pub format: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Default number of cycles for `simulate`
    #[serde(default)]
    pub cycles: Option<u32>,

    /// Default simulated minutes between cycles
    #[serde(default)]
    pub step_minutes: Option<i64>,

    /// Systems simulated when `--system` is not given
    #[serde(default)]
    pub systems: Vec<SystemConfig>,
}

impl Config {
    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("airsim")
            .join("config.toml")
    }

    /// The explicit path if given, else the default one
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(Self::default_path, Path::to_path_buf)
    }

    /// Load config from file, or return default if not found or unreadable
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match Self::read(path) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring config {}: {:#}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Read and parse a config file, validating every system entry
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.format {
            parse_format(format)?;
        }
        for (index, system) in self.systems.iter().enumerate() {
            system
                .validate()
                .with_context(|| format!("Invalid [[systems]] entry #{}", index + 1))?;
        }
        Ok(())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Starter config written by `config init`
    pub fn starter() -> Self {
        let mut home = SystemConfig::new(AirSystemKind::Home);
        home.filter_efficiency = Some(95.0);

        let mut kitchen = SystemConfig::new(AirSystemKind::Kitchen);
        kitchen.preferred_mode = Some(VentilationMode::Cooking);

        let mut bedroom = SystemConfig::new(AirSystemKind::Bedroom);
        bedroom.sleep_start = Some("22:30".to_string());
        bedroom.sleep_end = Some("06:45".to_string());

        Self {
            format: Some("text".to_string()),
            no_color: false,
            cycles: Some(12),
            step_minutes: Some(10),
            systems: vec![home, kitchen, bedroom],
        }
    }

    /// Resolve output format: explicit flag overrides config
    pub fn resolve_format(&self, explicit: Option<OutputFormat>) -> OutputFormat {
        explicit
            .or_else(|| self.format.as_deref().and_then(|f| parse_format(f).ok()))
            .unwrap_or_default()
    }
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    match s.to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => bail!("Unknown output format '{}'. Use: text, json", other),
    }
}
