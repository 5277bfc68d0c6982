use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use planner_core::{HierarchyMode, DEFAULT_UNDO_DEPTH};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "rocket-planner";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Whether a portfolio may mix programs and projects
    pub hierarchy_mode: HierarchyMode,
    /// Number of commands kept in the undo history
    pub undo_depth: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            hierarchy_mode: HierarchyMode::Lenient,
            undo_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the user's config directory, then apply
    /// `RPLAN_HIERARCHY_MODE` and `RPLAN_UNDO_DEPTH`.
    /// Returns defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_overrides(
            std::env::var("RPLAN_HIERARCHY_MODE").ok().as_deref(),
            std::env::var("RPLAN_UNDO_DEPTH").ok().as_deref(),
        )
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the current configuration to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Apply textual overrides. Unparseable values are logged and ignored.
    pub fn with_overrides(mut self, mode: Option<&str>, undo_depth: Option<&str>) -> Self {
        if let Some(mode) = mode {
            match HierarchyMode::from_str(mode.trim()) {
                Some(mode) => self.hierarchy_mode = mode,
                None => tracing::warn!("Ignoring unknown hierarchy mode '{}'", mode),
            }
        }
        if let Some(depth) = undo_depth {
            match depth.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => self.undo_depth = depth,
                _ => tracing::warn!("Ignoring invalid undo depth '{}'", depth),
            }
        }
        self
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
