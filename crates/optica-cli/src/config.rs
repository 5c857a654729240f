//! TOML render configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use optica_raytrace::TraceSettings;
use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;

/// Everything a render needs besides the scene itself.
///
/// Every key is optional; command-line flags override file values.
///
/// ```toml
/// scene = "lens"
/// width = 800
/// height = 600
/// background = [0.05, 0.05, 0.1]
///
/// [camera]
/// position = [0.0, 1.0, -8.0]
/// look_at = [0.0, 0.0, 0.0]
/// field_of_view = 50.0
///
/// [trace]
/// max_trace_level = 200
/// exhaustion = "background"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Demo scene name.
    pub scene: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Output PNG path.
    pub output: Option<PathBuf>,
    /// Background colour override.
    pub background: Option<[f64; 3]>,
    /// Camera override; each demo scene has its own default.
    pub camera: Option<CameraConfig>,
    /// Trace settings.
    pub trace: TraceSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scene: "csg".to_string(),
            width: 640,
            height: 480,
            output: None,
            background: None,
            camera: None,
            trace: TraceSettings::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optica_raytrace::Exhaustion;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(RenderConfig::from_toml("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = RenderConfig::from_toml(
            r#"
            scene = "lens"
            width = 32
            height = 16
            output = "lens.png"
            background = [0.1, 0.2, 0.3]

            [camera]
            position = [0.0, 1.0, -8.0]
            look_at = [0.0, 0.0, 0.0]

            [trace]
            max_trace_level = 7
            exhaustion = "background"
            "#,
        )
        .unwrap();
        assert_eq!(config.scene, "lens");
        assert_eq!((config.width, config.height), (32, 16));
        assert_eq!(config.output, Some(PathBuf::from("lens.png")));
        assert_eq!(config.background, Some([0.1, 0.2, 0.3]));
        let camera = config.camera.unwrap();
        assert_eq!(camera.up, [0.0, 1.0, 0.0]);
        assert_eq!(camera.field_of_view, 60.0);
        assert_eq!(config.trace.max_trace_level, 7);
        assert_eq!(config.trace.exhaustion, Exhaustion::Background);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(RenderConfig::from_toml("widht = 10").is_err());
    }
}
