use serde::{Deserialize, Serialize};

use crate::{
    geometry::{WorldPoint, WorldVector},
    util::Rgb,
};

/// Isotropic point light.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: WorldPoint,
    /// Total power emitted in all directions, split evenly among the photons of a pass.
    pub power: Rgb,
}

impl PointLight {
    pub fn new(position: WorldPoint, power: Rgb) -> Self {
        PointLight { position, power }
    }

    pub fn translate(&mut self, offset: &WorldVector) {
        self.position += *offset;
    }
}

impl Default for PointLight {
    fn default() -> Self {
        PointLight::new(WorldPoint::new(0.0, -0.5, -0.7), Rgb::new(10.0, 10.0, 10.0))
    }
}
