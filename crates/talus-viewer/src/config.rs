//! Viewer configuration loaded from TOML
//!
//! Every field has a default, and the defaults together describe the
//! built-in scene, so the viewer runs with no config file at all.

use serde::{Deserialize, Serialize};
use std::path::Path;
use talus_core::{Result, TalusError};

/// Root of the viewer config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default = "default_props")]
    pub props: Vec<PropConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Heightmap image, relative to the asset root
    #[serde(default = "default_heightmap")]
    pub heightmap: String,
    /// Precomputed normal map matching the heightmap
    #[serde(default = "default_normal_map")]
    pub normal_map: String,
    /// World height of a full-intensity sample
    #[serde(default = "default_height_scale")]
    pub height_scale: f32,
    /// World units between neighboring samples
    #[serde(default = "default_horizontal_scale")]
    pub horizontal_scale: f32,
    /// Layer texture repeats across the terrain
    #[serde(default = "default_texture_tile")]
    pub texture_tile: f32,
    #[serde(default)]
    pub layers: LayerTextures,
}

/// Altitude-ordered surface textures, low to high
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerTextures {
    #[serde(default = "default_dirt")]
    pub dirt: String,
    #[serde(default = "default_sand")]
    pub sand: String,
    #[serde(default = "default_grass")]
    pub grass: String,
    #[serde(default = "default_rock")]
    pub rock: String,
    #[serde(default = "default_snow")]
    pub snow: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_yaw")]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Movement speed in world units per second
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Look sensitivity in degrees per pixel of mouse travel
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// Sun direction; normalized before upload
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_accent_color")]
    pub accent_color: [f32; 4],
    /// Seconds between pulses
    #[serde(default = "default_scan_period")]
    pub period: f32,
    /// Pulse travel speed in world units per second
    #[serde(default = "default_scan_speed")]
    pub speed: f32,
}

/// A textured box placed in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropConfig {
    #[serde(default = "default_prop_texture")]
    pub texture: String,
    pub position: [f32; 3],
    #[serde(default = "default_prop_scale")]
    pub scale: f32,
    /// Spin rate per axis in radians per second
    #[serde(default)]
    pub spin: [f32; 3],
}

impl ViewerConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// Reject values the renderer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(TalusError::ConfigError(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.terrain.height_scale <= 0.0 || self.terrain.horizontal_scale <= 0.0 {
            return Err(TalusError::ConfigError(format!(
                "terrain scales must be positive, got height_scale {} horizontal_scale {}",
                self.terrain.height_scale, self.terrain.horizontal_scale
            )));
        }
        if self.camera.near <= 0.0 || self.camera.near >= self.camera.far {
            return Err(TalusError::ConfigError(format!(
                "camera planes must satisfy 0 < near < far, got near {} far {}",
                self.camera.near, self.camera.far
            )));
        }
        if self.scan.period <= 0.0 || self.scan.speed <= 0.0 {
            return Err(TalusError::ConfigError(format!(
                "scan period and speed must be positive, got period {} speed {}",
                self.scan.period, self.scan.speed
            )));
        }
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            terrain: TerrainConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            scan: ScanConfig::default(),
            props: default_props(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: default_heightmap(),
            normal_map: default_normal_map(),
            height_scale: default_height_scale(),
            horizontal_scale: default_horizontal_scale(),
            texture_tile: default_texture_tile(),
            layers: LayerTextures::default(),
        }
    }
}

impl Default for LayerTextures {
    fn default() -> Self {
        Self {
            dirt: default_dirt(),
            sand: default_sand(),
            grass: default_grass(),
            rock: default_rock(),
            snow: default_snow(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            yaw: default_yaw(),
            pitch: 0.0,
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            speed: default_speed(),
            sensitivity: default_sensitivity(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            accent_color: default_accent_color(),
            period: default_scan_period(),
            speed: default_scan_speed(),
        }
    }
}

fn default_title() -> String {
    "talus".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_heightmap() -> String {
    "heightmap.png".to_string()
}
fn default_normal_map() -> String {
    "normalmap.png".to_string()
}
fn default_height_scale() -> f32 {
    250.0
}
fn default_horizontal_scale() -> f32 {
    5.0
}
fn default_texture_tile() -> f32 {
    64.0
}
fn default_dirt() -> String {
    "dirt.png".to_string()
}
fn default_sand() -> String {
    "sand.png".to_string()
}
fn default_grass() -> String {
    "grass.png".to_string()
}
fn default_rock() -> String {
    "rock.png".to_string()
}
fn default_snow() -> String {
    "snow.png".to_string()
}
fn default_camera_position() -> [f32; 3] {
    [100.0, 125.0, 100.0]
}
fn default_yaw() -> f32 {
    45.0
}
fn default_fov() -> f32 {
    45.0
}
fn default_near() -> f32 {
    0.05
}
fn default_far() -> f32 {
    10000.0
}
fn default_speed() -> f32 {
    12.0
}
fn default_sensitivity() -> f32 {
    0.2
}
fn default_light_direction() -> [f32; 3] {
    [-0.5, -0.5, -0.5]
}
fn default_true() -> bool {
    true
}
fn default_accent_color() -> [f32; 4] {
    [0.2, 1.0, 0.6, 1.0]
}
fn default_scan_period() -> f32 {
    8.0
}
fn default_scan_speed() -> f32 {
    300.0
}
fn default_prop_texture() -> String {
    "crate.png".to_string()
}
fn default_prop_scale() -> f32 {
    1.0
}

fn default_props() -> Vec<PropConfig> {
    vec![
        PropConfig {
            texture: default_prop_texture(),
            position: [100.0, 350.0, 300.0],
            scale: 200.0,
            spin: [0.2, 0.4, -0.2],
        },
        PropConfig {
            texture: default_prop_texture(),
            position: [1500.0, 150.0, 1300.0],
            scale: 10.0,
            spin: [0.0, 0.0, 0.0],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_builtin_scene() {
        let config: ViewerConfig = toml::from_str("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.terrain.height_scale, 250.0);
        assert_eq!(config.terrain.horizontal_scale, 5.0);
        assert_eq!(config.camera.position, [100.0, 125.0, 100.0]);
        assert_eq!(config.camera.yaw, 45.0);
        assert_eq!(config.props.len(), 2);
        assert_eq!(config.props[0].scale, 200.0);
        assert_eq!(config.props[0].spin, [0.2, 0.4, -0.2]);
        assert_eq!(config.props[1].spin, [0.0, 0.0, 0.0]);
        assert!(config.scan.enabled);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: ViewerConfig = toml::from_str(
            r#"
            [terrain]
            height_scale = 100.0

            [scan]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.terrain.height_scale, 100.0);
        // Sibling fields keep their defaults
        assert_eq!(config.terrain.horizontal_scale, 5.0);
        assert!(!config.scan.enabled);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn props_table_replaces_defaults() {
        let config: ViewerConfig = toml::from_str(
            r#"
            [[props]]
            texture = "barrel.png"
            position = [10.0, 20.0, 30.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.props.len(), 1);
        assert_eq!(config.props[0].texture, "barrel.png");
        assert_eq!(config.props[0].scale, 1.0);
        assert_eq!(config.props[0].spin, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = ViewerConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.camera.speed, config.camera.speed);
        assert_eq!(parsed.terrain.layers.snow, config.terrain.layers.snow);
        assert_eq!(parsed.props.len(), config.props.len());
    }

    #[test]
    fn validate_rejects_zero_window() {
        let mut config = ViewerConfig::default();
        config.window.width = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window size"));
    }

    #[test]
    fn validate_rejects_inverted_planes() {
        let mut config = ViewerConfig::default();
        config.camera.near = 100.0;
        config.camera.far = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_builtin_scene() {
        assert!(ViewerConfig::default().validate().is_ok());
    }
}
