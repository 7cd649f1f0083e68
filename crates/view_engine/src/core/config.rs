//! Viewer configuration
//!
//! All tunables for the scene, the camera rig, and the frame loop live here.
//! Defaults match the remote authority's reference client so a bare
//! `ViewerConfig::default()` produces the familiar framing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration trait for file-backed config types
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file (format chosen by extension)
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file (format chosen by extension)
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Semantically invalid configuration
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Scene appearance and framing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Background color as a packed RGB integer
    pub bg_color: u32,
    /// Fraction of the render distance at which fog starts
    pub fog_factor: f32,
    /// Far clipping / fog end distance
    pub render_distance: f32,
    /// Ambient light color as a packed RGB integer
    pub ambient_color: u32,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Directional light color as a packed RGB integer
    pub light_color: u32,
    /// Directional light intensity
    pub light_intensity: f32,
    /// Whether the built-in ground plane starts visible
    pub show_ground_plane: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            bg_color: 0x0042_4242,
            fog_factor: 0.5,
            render_distance: 100.0,
            ambient_color: 0x00ff_ffff,
            ambient_intensity: 0.5,
            light_color: 0x00ff_ffff,
            light_intensity: 0.5,
            show_ground_plane: true,
        }
    }
}

/// Camera rig settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial camera position
    pub position: [f32; 3],
    /// Initial look-at point
    pub look_at: [f32; 3],
    /// Field of view in degrees
    pub fov_degrees: f32,
    /// Transition length in ticks for smooth moves
    pub smoothing_window: u32,
    /// Zoom sensitivity applied to wheel-style input
    pub zoom_factor: f32,
    /// Rotation sensitivity applied to drag-style input
    pub rotate_factor: f32,
    /// Pan sensitivity applied to drag-style input
    pub move_factor: f32,
    /// Autonomous rotation rate in degrees per second (0 disables)
    pub auto_rotate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [3.0, 3.0, 3.0],
            look_at: [0.0, 0.0, 0.0],
            fov_degrees: 70.0,
            smoothing_window: 5,
            zoom_factor: 0.001,
            rotate_factor: 0.01,
            move_factor: 0.01,
            auto_rotate: 0.0,
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scene appearance settings
    pub scene: SceneConfig,
    /// Camera rig settings
    pub camera: CameraConfig,
    /// Frame-rate estimator window in ticks
    pub fps_interval: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            camera: CameraConfig::default(),
            fps_interval: 60,
        }
    }
}

impl ViewerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scene.render_distance <= 0.0 {
            return Err(ConfigError::Invalid(
                "render_distance must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scene.fog_factor) {
            return Err(ConfigError::Invalid(
                "fog_factor must be within [0, 1]".to_string(),
            ));
        }
        if self.camera.smoothing_window == 0 {
            return Err(ConfigError::Invalid(
                "smoothing_window must be at least 1 tick".to_string(),
            ));
        }
        if self.camera.fov_degrees <= 0.0 || self.camera.fov_degrees >= 180.0 {
            return Err(ConfigError::Invalid(
                "fov_degrees must be within (0, 180)".to_string(),
            ));
        }
        if self.fps_interval == 0 {
            return Err(ConfigError::Invalid(
                "fps_interval must be at least 1 tick".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config for ViewerConfig {}
