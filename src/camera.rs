use assert2::assert;
use bon::bon;
use nalgebra::{Rotation3, Vector3};

use crate::geometry::{FloatType, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Pinhole camera turning only around the vertical axis.
///
/// Camera space has +x to the right, +y down and +z forward, matching the screen
/// layout where row 0 is at the top.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    position: WorldPoint,
    yaw: FloatType,
    /// Camera to world rotation, kept in sync with `yaw`.
    rotation: Rotation3<FloatType>,

    /// Distance from the pinhole to the image plane in pixels
    focal_length: FloatType,
    resolution: ScreenSize,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        position: WorldPoint,
        #[builder(default)] yaw: FloatType,
        focal_length: FloatType,
        resolution: ScreenSize,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(focal_length > 0.0);

        Camera {
            position,
            yaw,
            rotation: yaw_rotation(yaw),
            focal_length,
            resolution,
        }
    }
}

impl Camera {
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    pub fn yaw(&self) -> FloatType {
        self.yaw
    }

    pub fn focal_length(&self) -> FloatType {
        self.focal_length
    }

    pub fn get_resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> WorldVector {
        self.rotation * Vector3::z()
    }

    /// Unit vector pointing to the right side of the image.
    pub fn right(&self) -> WorldVector {
        self.rotation * Vector3::x()
    }

    /// Projects a world point to the pixel it lands on.
    ///
    /// Returns None for points at or behind the camera plane and for points falling
    /// outside the image.
    pub fn project(&self, point: &WorldPoint) -> Option<ScreenPoint> {
        let p = self.rotation.inverse_transform_vector(&(point - self.position));
        if p.z <= 0.0 {
            return None;
        }

        let x = (self.focal_length * p.x / p.z + self.resolution.x as FloatType / 2.0).floor();
        let y = (self.focal_length * p.y / p.z + self.resolution.y as FloatType / 2.0).floor();
        let in_range = |v: FloatType, size: u32| v >= 0.0 && v < size as FloatType;
        if !in_range(x, self.resolution.x) || !in_range(y, self.resolution.y) {
            return None;
        }

        Some(ScreenPoint::new(x as u32, y as u32))
    }

    pub fn move_forward(&mut self, distance: FloatType) {
        self.position += self.forward() * distance;
    }

    pub fn strafe_right(&mut self, distance: FloatType) {
        self.position += self.right() * distance;
    }

    /// Turns the camera around the vertical axis, positive angles turn right.
    pub fn rotate(&mut self, angle: FloatType) {
        self.yaw += angle;
        self.rotation = yaw_rotation(self.yaw);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::builder()
            .position(WorldPoint::new(0.0, 0.0, -2.0))
            .focal_length(500.0)
            .resolution(ScreenSize::new(1000, 1000))
            .build()
    }
}

fn yaw_rotation(yaw: FloatType) -> Rotation3<FloatType> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), yaw)
}
