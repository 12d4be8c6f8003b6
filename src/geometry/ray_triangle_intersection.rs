use nalgebra::Matrix3;

use super::{BarycentricCoordinates, DEGENERATE_DETERMINANT, FloatType, Ray, Triangle, WorldPoint};

/// Solution of the ray-triangle system for a single triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter, in multiples of the (unnormalized) ray direction.
    pub t: FloatType,
    pub uv: BarycentricCoordinates<FloatType>,
}

impl Triangle<WorldPoint> {
    /// Calculates ray intersection with the (two sided) triangle.
    ///
    /// Solves `[-direction, e1, e2] * (t, u, v) = origin - self[0]` directly.
    /// Returns None if the system is singular (ray parallel to the triangle plane or
    /// a zero area triangle), if the hit is not strictly in front of the ray origin, or
    /// if the hit lies outside of the triangle. Triangle edges count as inside.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        let [e1, e2] = self.edges();
        let m = Matrix3::from_columns(&[-ray.direction, e1, e2]);

        // det(m) = -direction . (e1 x e2), scale it by the magnitudes involved
        let scale = ray.direction.norm() * e1.cross(&e2).norm();
        let det = m.determinant();
        if det.is_nan() || det.abs() <= DEGENERATE_DETERMINANT * scale {
            return None;
        }

        let solution = m.try_inverse()? * (ray.origin - self[0]);
        if !solution.iter().all(|x| x.is_finite()) {
            return None;
        }

        let t = solution.x;
        let uv = BarycentricCoordinates {
            u: solution.y,
            v: solution.z,
        };

        if t > 0.0 && uv.is_inside() {
            Some(TriangleHit { t, uv })
        } else {
            None
        }
    }
}
