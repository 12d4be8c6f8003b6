mod ray_triangle_intersection;
mod triangle;

use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use ray_triangle_intersection::TriangleHit;
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f64;

pub type ScreenPoint = Point2<u32>;
pub type ScreenSize = Vector2<u32>;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;

/// Tolerance used for "is this vector usable as a direction" checks.
pub const EPSILON: FloatType = 1e-9;

/// Relative tolerance of the ray-triangle system determinant.
/// Systems whose determinant is smaller than this fraction of `|direction| * |e1 x e2|`
/// are considered singular (ray parallel to the plane, or zero area triangle).
pub const DEGENERATE_DETERMINANT: FloatType = 1e-12;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, not necessarily normalized.
    /// Parameter `t` of intersections is measured in multiples of this vector.
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray { origin, direction }
    }

    pub fn point_at(&self, t: FloatType) -> WorldPoint {
        self.origin + self.direction * t
    }
}
