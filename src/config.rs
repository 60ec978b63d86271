//! TOML configuration. Every field is optional; an empty file gives the
//! defaults.
//!
//! ```toml
//! log_file = "menus.log"
//! templates = ["menus.toml"]
//!
//! [placement]
//! margin = 4
//! default_horizontal = "right"
//! align_nested_to_trigger_top = true
//!
//! [[select]]
//! kind = "flat"
//! options = [{ value = "a", label = "A" }]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::PLACEMENT_MARGIN;
use crate::dropdown::DropdownSettings;
use crate::error::{MenuError, Result};
use crate::layout::HorizontalMode;
use crate::select::SelectConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub placement: PlacementConfig,
    /// Template files, resolved relative to the config file's directory.
    pub templates: Vec<PathBuf>,
    pub log_file: Option<PathBuf>,
    #[serde(rename = "select")]
    pub selects: Vec<SelectConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub margin: i32,
    pub default_horizontal: HorizontalMode,
    pub align_nested_to_trigger_top: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: PLACEMENT_MARGIN,
            default_horizontal: HorizontalMode::Right,
            align_nested_to_trigger_top: false,
        }
    }
}

impl From<PlacementConfig> for DropdownSettings {
    fn from(config: PlacementConfig) -> Self {
        Self {
            margin: config.margin,
            default_horizontal: config.default_horizontal,
            align_nested_to_trigger_top: config.align_nested_to_trigger_top,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk. Relative template paths are resolved against the
    /// file's directory.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            for template in &mut config.templates {
                if template.is_relative() {
                    *template = dir.join(&*template);
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.placement.margin < 0 {
            return Err(MenuError::Config(format!(
                "placement.margin must not be negative (got {})",
                self.placement.margin
            )));
        }
        Ok(())
    }

    pub fn dropdown_settings(&self) -> DropdownSettings {
        self.placement.into()
    }
}
