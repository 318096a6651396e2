//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Actor configuration
    #[serde(default)]
    pub actor: ActorConfig,

    /// Board geometry and palette
    #[serde(default)]
    pub board: BoardConfig,
}

/// Actor-related configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    /// Default actor id when none specified
    #[serde(default = "default_actor")]
    pub default: String,
}

fn default_actor() -> String {
    "unknown".to_string()
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            default: default_actor(),
        }
    }
}

/// Named constants shared by the kanban and timeline engines
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Number of palette slots tasks cycle through
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,

    /// Width of one day column on the timeline, in pixels
    #[serde(default = "default_day_column_width_px")]
    pub day_column_width_px: u32,

    /// Number of day columns shown by default
    #[serde(default = "default_visible_days")]
    pub default_visible_days: u32,

    /// Width of the resize handles at each end of a timeline bar
    #[serde(default = "default_handle_width_px")]
    pub handle_width_px: u32,

    /// Optional color names, one per palette slot
    #[serde(default)]
    pub palette: Vec<String>,
}

fn default_palette_size() -> usize {
    8
}

fn default_day_column_width_px() -> u32 {
    40
}

fn default_visible_days() -> u32 {
    30
}

fn default_handle_width_px() -> u32 {
    8
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            palette_size: default_palette_size(),
            day_column_width_px: default_day_column_width_px(),
            default_visible_days: default_visible_days(),
            handle_width_px: default_handle_width_px(),
            palette: Vec::new(),
        }
    }
}

impl BoardConfig {
    /// Color name for a palette slot, if a palette is configured.
    pub fn color(&self, slot: usize) -> Option<&str> {
        self.palette.get(slot).map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        if self.palette_size == 0 {
            return Err(Error::InvalidConfig(
                "board.palette_size must be >= 1".to_string(),
            ));
        }
        if self.day_column_width_px == 0 {
            return Err(Error::InvalidConfig(
                "board.day_column_width_px must be >= 1".to_string(),
            ));
        }
        if self.default_visible_days == 0 {
            return Err(Error::InvalidConfig(
                "board.default_visible_days must be >= 1".to_string(),
            ));
        }
        if self.handle_width_px.saturating_mul(2) > self.day_column_width_px {
            return Err(Error::InvalidConfig(format!(
                "board.handle_width_px ({}) leaves no body on a one-day bar of {}px",
                self.handle_width_px, self.day_column_width_px
            )));
        }
        if !self.palette.is_empty() && self.palette.len() != self.palette_size {
            return Err(Error::InvalidConfig(format!(
                "board.palette has {} entries but board.palette_size is {}",
                self.palette.len(),
                self.palette_size
            )));
        }
        if self.palette.iter().any(|color| color.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "board.palette cannot include empty entries".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a `.taskboard.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a root directory, or return defaults
    pub fn load_from_root(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILENAME);
        if config_path.exists() {
            match Self::load(&config_path) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.actor.default.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "actor.default cannot be empty".to_string(),
            ));
        }
        self.board.validate()
    }
}
