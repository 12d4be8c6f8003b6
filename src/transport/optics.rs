use nalgebra::Unit;
use rand_distr::{Distribution as _, UnitSphere};

use crate::geometry::{EPSILON, FloatType, WorldVector};

/// Mirrors `direction` about the plane with the given normal.
/// Neither vector needs to be normalized, the result keeps the length of `direction`.
pub fn reflect(direction: &WorldVector, normal: &WorldVector) -> WorldVector {
    let normal_squared = normal.norm_squared();
    if normal_squared == 0.0 {
        return *direction;
    }
    direction - normal * (2.0 * direction.dot(normal) / normal_squared)
}

/// Bends `direction` through an interface by Snell's law.
///
/// `ratio` is `n1 / n2`, the refractive index of the medium the photon is leaving divided
/// by the one it is entering. The normal may face either side of the surface.
/// Returns a unit vector, or None on total internal reflection.
pub fn refract(
    direction: &WorldVector,
    normal: &WorldVector,
    ratio: FloatType,
) -> Option<WorldVector> {
    let d = direction.try_normalize(EPSILON)?;
    let n = facing_against(&normal.try_normalize(EPSILON)?, &d);

    let cos_i = -n.dot(&d);
    let k = 1.0 - ratio * ratio * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }

    Some(d * ratio + n * (ratio * cos_i - k.sqrt()))
}

/// Cosine weighted direction in the hemisphere on the side of the surface that `incoming`
/// arrived from.
pub fn diffuse_bounce(
    incoming: &WorldVector,
    normal: &WorldVector,
    rng: &mut impl rand::Rng,
) -> WorldVector {
    let Some(n) = normal.try_normalize(EPSILON) else {
        return -incoming;
    };
    let n = facing_against(&n, incoming);

    // Normal plus a uniform point on the unit sphere is cosine distributed around the normal
    let offset: [FloatType; 3] = UnitSphere.sample(rng);
    Unit::try_new(n + WorldVector::from(offset), EPSILON)
        .map(Unit::into_inner)
        .unwrap_or(n)
}

/// Flips the normal so that it points against `direction`.
fn facing_against(normal: &WorldVector, direction: &WorldVector) -> WorldVector {
    if normal.dot(direction) > 0.0 {
        -normal
    } else {
        *normal
    }
}
