//! Driver configuration file handling

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use shy_animation::HeaderLayout;
use shy_core::SyncConfig;
use std::fs;
use std::path::Path;

/// Top-level driver configuration (shy.toml)
#[derive(Debug, Deserialize, Serialize)]
pub struct ShyConfig {
    /// A `[sync]` table without `threshold` still gets the driver default
    #[serde(default = "default_sync", deserialize_with = "deserialize_sync")]
    pub sync: SyncConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub header: HeaderLayout,
}

/// Collapse distance of the sample page header
const DEFAULT_THRESHOLD: f64 = 150.0;

fn default_sync() -> SyncConfig {
    SyncConfig::with_threshold(DEFAULT_THRESHOLD)
}

fn deserialize_sync<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SyncConfig, D::Error> {
    let mut table = toml::Table::deserialize(deserializer)?;
    table
        .entry("threshold")
        .or_insert(toml::Value::Float(DEFAULT_THRESHOLD));
    toml::Value::Table(table)
        .try_into()
        .map_err(serde::de::Error::custom)
}

impl Default for ShyConfig {
    fn default() -> Self {
        Self {
            sync: default_sync(),
            page: PageConfig::default(),
            header: HeaderLayout::default(),
        }
    }
}

/// Simulated tabbed page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageConfig {
    /// Number of tabs, each with its own scroll view
    #[serde(default = "default_tabs")]
    pub tabs: usize,
    /// Height of every tab's content
    #[serde(default = "default_content_height")]
    pub content_height: f64,
    /// Visible height of a tab's scroll view
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Virtual milliseconds per frame
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

fn default_tabs() -> usize {
    3
}

fn default_content_height() -> f64 {
    3000.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_frame_ms() -> u64 {
    16
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            tabs: default_tabs(),
            content_height: default_content_height(),
            viewport_height: default_viewport_height(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl PageConfig {
    /// Scrollable extent of a tab
    pub fn max_offset(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

impl ShyConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("{} not found, using default configuration", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ShyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        if self.page.tabs == 0 {
            bail!("page.tabs must be at least 1");
        }
        if self.page.frame_ms == 0 {
            bail!("page.frame_ms must be at least 1");
        }
        if self.page.content_height < 0.0 || self.page.viewport_height < 0.0 {
            bail!("page heights must not be negative");
        }
        Ok(())
    }
}
