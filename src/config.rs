use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    camera::Camera,
    geometry::{FloatType, ScreenSize, WorldPoint},
    light::PointLight,
    scene::{Material, Scene, SceneError, test_scene},
    transport::TransportSettings,
    util::Rgb,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid camera: {0}")]
    Camera(&'static str),
}

/// Which triangles to scatter photons around.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneSource {
    #[default]
    BoxAndPrism,
    CornellBox,
    /// Wavefront OBJ file, all triangles sharing one color and material.
    Obj {
        path: PathBuf,
        #[serde(default = "default_obj_color")]
        color: Rgb,
        #[serde(default)]
        material: Material,
    },
}

fn default_obj_color() -> Rgb {
    test_scene::WHITE
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: WorldPoint,
    /// Radians, positive turns right.
    pub yaw: FloatType,
    /// Pixels
    pub focal_length: FloatType,
    pub resolution: ScreenSize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig::from(&Camera::default())
    }
}

impl From<&Camera> for CameraConfig {
    fn from(camera: &Camera) -> Self {
        CameraConfig {
            position: camera.position(),
            yaw: camera.yaw(),
            focal_length: camera.focal_length(),
            resolution: camera.get_resolution(),
        }
    }
}

impl TryFrom<&CameraConfig> for Camera {
    type Error = ConfigError;

    fn try_from(config: &CameraConfig) -> Result<Camera, ConfigError> {
        if config.resolution.x == 0 || config.resolution.y == 0 {
            return Err(ConfigError::Camera("resolution must be non-zero"));
        }
        if !(config.focal_length > 0.0 && config.focal_length.is_finite()) {
            return Err(ConfigError::Camera("focal length must be positive"));
        }
        Ok(Camera::builder()
            .position(config.position)
            .yaw(config.yaw)
            .focal_length(config.focal_length)
            .resolution(config.resolution)
            .build())
    }
}

/// Everything needed for one run, loadable from a JSON file where every key is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transport: TransportSettings,
    pub light: PointLight,
    pub camera: CameraConfig,
    pub scene: SceneSource,
    /// Where the CLI writes the resulting image.
    pub output: PathBuf,
    /// Draw recorded bounce paths under the photons. Only useful with path recording on.
    pub draw_paths: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            transport: TransportSettings::default(),
            light: PointLight::default(),
            camera: CameraConfig::default(),
            scene: SceneSource::default(),
            output: PathBuf::from("photons.png"),
            draw_paths: false,
        }
    }
}

impl Config {
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(?config, "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_owned(),
            source,
        })
    }

    pub fn camera(&self) -> Result<Camera, ConfigError> {
        Camera::try_from(&self.camera)
    }

    pub fn build_scene(&self) -> Result<Scene, SceneError> {
        match &self.scene {
            SceneSource::BoxAndPrism => test_scene::box_and_prism(),
            SceneSource::CornellBox => test_scene::cornell_box(),
            SceneSource::Obj {
                path,
                color,
                material,
            } => Scene::with_obj(path, *color, *material),
        }
    }
}
