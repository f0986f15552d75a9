//! Configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub use crate::action::ActionsConfig;
pub use crate::assets::AssetManifest;
pub use crate::dispatch::{DispatchConfig, DispatchMode};
pub use crate::layout::LayoutConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetManifest,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Half-width of an icon's square tap footprint, in the icon model's own units.
    /// Scales with the icon, so larger cards get larger hit areas.
    #[serde(default = "default_hit_half_extent")]
    pub hit_half_extent: f32,
    /// Touch movement (pixels) beyond which a touch is a drag, not a tap
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f32,
}

fn default_hit_half_extent() -> f32 {
    0.5
}

fn default_drag_threshold() -> f32 {
    10.0
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_half_extent: default_hit_half_extent(),
            drag_threshold: default_drag_threshold(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.actions
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.layout.validate().map_err(ConfigError::Invalid)?;
        let half_extent = self.interaction.hit_half_extent;
        if !(half_extent.is_finite() && half_extent > 0.0) {
            return Err(ConfigError::Invalid(
                "interaction.hit_half_extent must be finite and positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults when it is missing
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = Config::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&Config::default())?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = r#"
[actions]
call_number = "+15550100"

[dispatch]
mode = "system"
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.actions.call_number, "+15550100");
        assert_eq!(config.actions.facebook_url, "https://mail.google.com/mail");
        assert_eq!(config.dispatch.mode, DispatchMode::System);
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.assets.border, "models/border.glb");
        assert_eq!(config.interaction.hit_half_extent, 0.5);
    }

    #[test]
    fn test_invalid_action_rejected() {
        let toml = r#"
[actions]
message_url = "instagram.com/dream_ar_"
"#;
        assert!(matches!(Config::from_toml(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let toml = r#"
[layout]
border_scale_z = -1.3
"#;
        assert!(matches!(Config::from_toml(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conf").join("arcard.toml");

        save_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config, Config::default());
    }
}
