//! Viewer configuration.
//!
//! Every section has defaults matching the bundled alley scene, so an empty
//! YAML document (or no file at all) yields a working setup. A config file only
//! needs the keys it wants to change.

use crate::light::LightSet;
use crate::sprite::SpritePlacement;
use crate::types::ModelPlacement;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    /// Root that relative asset paths resolve against.
    pub resources: PathBuf,
    pub assets: AssetPaths,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub scene_model: PathBuf,
    pub billboard_model: PathBuf,
    /// Prefix for material sampler slot names, e.g. `material.texture_diffuse1`.
    pub material_prefix: String,
    pub sprite_texture: PathBuf,
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub skybox_faces: [PathBuf; 6],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub zoom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub clear_color: [f32; 4],
    pub shininess: f32,
    pub scene_placement: ModelPlacement,
    pub billboard_placement: ModelPlacement,
    pub lights: LightSet,
    pub sprites: Vec<SpritePlacement>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            resources: PathBuf::from("resources"),
            assets: AssetPaths::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Nocturne".into(),
            width: 1600,
            height: 800,
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        let face = |name: &str| PathBuf::from(format!("textures/skybox/{name}.jpg"));
        Self {
            scene_model: PathBuf::from("objects/scene/scene.obj"),
            billboard_model: PathBuf::from("objects/billboard/billboard.obj"),
            material_prefix: "material.".into(),
            sprite_texture: PathBuf::from("textures/mita.jpg"),
            skybox_faces: [
                face("posx"),
                face("negx"),
                face("posy"),
                face("negy"),
                face("posz"),
                face("negz"),
            ],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -0.3),
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shininess: 32.0,
            scene_placement: ModelPlacement::new(Vec3::new(0.0, -3.0, 0.0), 0.05),
            billboard_placement: ModelPlacement::new(Vec3::new(11.0, 1.5, -11.75), 0.2),
            lights: LightSet::street_lamps(),
            sprites: SpritePlacement::graffiti(),
        }
    }
}

impl ViewerConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&source)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Resolve an asset path against the resource root. Absolute paths pass through.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.resources.join(path)
        }
    }

    pub fn skybox_face_paths(&self) -> [PathBuf; 6] {
        self.assets.skybox_faces.clone().map(|face| self.resolve(face))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        let config = ViewerConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let yaml = "window:\n  width: 1024\ncamera:\n  speed: 5.0\n";
        let config = ViewerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera.speed, 5.0);
        assert_eq!(config.camera.position, Vec3::new(0.0, 0.0, -0.3));
        assert_eq!(config.scene.lights.len(), 8);
    }

    #[test]
    fn yaml_roundtrip_preserves_scene() {
        let config = ViewerConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back = ViewerConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn nine_lights_is_a_parse_error() {
        let lamp = "  - position: [0, 0, 0]\n    ambient: [0, 0, 0]\n    diffuse: [0, 0, 0]\n    specular: [0, 0, 0]\n    constant: 1.0\n    linear: 0.0\n    quadratic: 0.0\n";
        let yaml = format!("scene:\n  lights:\n{}", lamp.repeat(9));
        assert!(matches!(
            ViewerConfig::from_yaml_str(&yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn relative_paths_resolve_against_resources() {
        let mut config = ViewerConfig::default();
        config.resources = PathBuf::from("/data/res");
        assert_eq!(
            config.resolve("textures/mita.jpg"),
            PathBuf::from("/data/res/textures/mita.jpg")
        );
        assert_eq!(config.resolve("/abs/x.png"), PathBuf::from("/abs/x.png"));
        let faces = config.skybox_face_paths();
        assert_eq!(faces[0], PathBuf::from("/data/res/textures/skybox/posx.jpg"));
        assert_eq!(faces[5], PathBuf::from("/data/res/textures/skybox/negz.jpg"));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "resources: assets\nprojection:\n  far: 250.0").unwrap();
        let config = ViewerConfig::load(tmp.path()).unwrap();
        assert_eq!(config.resources, PathBuf::from("assets"));
        assert_eq!(config.projection.far, 250.0);
        assert_eq!(config.projection.near, 0.1);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ViewerConfig::load("/nonexistent/nocturne.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/nocturne.yaml"));
    }
}
