//! Built-in scene: the Cornell box with a short diffuse block, a tall mirror block and
//! a glass prism.
//!
//! Modelled in the classic 555 unit box and rescaled to `[-1, 1]^3` with x and y
//! flipped, so that +y points down and the camera looks along +z into the open side.

use super::{Material, Scene, SceneError, SceneTriangle};
use crate::{
    geometry::{FloatType, Triangle, WorldPoint, WorldVector},
    util::Rgb,
};

const L: FloatType = 555.0;
/// Gap between the floor and the bottom of the prism, in model units.
const PRISM_LIFT: FloatType = 1.0;

pub const DIFFUSE: Material = Material::diffuse(0.7);
pub const MIRROR: Material = Material::mirror(1.0);
pub const GLASS: Material = Material::new(0.0, 0.1, 0.85, 1.5);

pub const RED: Rgb = Rgb::new(0.75, 0.15, 0.15);
pub const YELLOW: Rgb = Rgb::new(0.75, 0.75, 0.15);
pub const GREEN: Rgb = Rgb::new(0.15, 0.75, 0.15);
pub const CYAN: Rgb = Rgb::new(0.15, 0.75, 0.75);
pub const BLUE: Rgb = Rgb::new(0.15, 0.15, 0.75);
pub const PURPLE: Rgb = Rgb::new(0.75, 0.15, 0.75);
pub const WHITE: Rgb = Rgb::new(0.75, 0.75, 0.75);

/// The full box-and-prism scene.
pub fn box_and_prism() -> Result<Scene, SceneError> {
    let mut triangles = cornell_box_triangles();
    triangles.extend(prism([80.0, 340.0], [220.0, 340.0], [150.0, 480.0], 220.0));
    Scene::new(triangles)
}

/// The box with both blocks, without the prism.
pub fn cornell_box() -> Result<Scene, SceneError> {
    Scene::new(cornell_box_triangles())
}

fn cornell_box_triangles() -> Vec<SceneTriangle> {
    let mut triangles = Vec::with_capacity(30);

    // Room, open towards -z
    let [a, b, c, d, e, f, g, h] = cuboid_corners(
        [L, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [L, 0.0, L],
        [0.0, 0.0, L],
        L,
    );
    let mut room = |v0, v1, v2, color| triangles.push(model_triangle(v0, v1, v2, color, DIFFUSE));
    // Floor
    room(c, b, a, GREEN);
    room(c, d, b, GREEN);
    // Left wall
    room(a, e, c, PURPLE);
    room(c, e, g, PURPLE);
    // Right wall
    room(f, b, d, YELLOW);
    room(h, f, d, YELLOW);
    // Ceiling
    room(e, f, g, CYAN);
    room(f, h, g, CYAN);
    // Back wall
    room(g, d, c, WHITE);
    room(g, h, d, WHITE);

    triangles.extend(block(
        cuboid_corners(
            [290.0, 0.0, 114.0],
            [130.0, 0.0, 65.0],
            [240.0, 0.0, 272.0],
            [82.0, 0.0, 225.0],
            165.0,
        ),
        RED,
        DIFFUSE,
    ));
    triangles.extend(block(
        cuboid_corners(
            [423.0, 0.0, 247.0],
            [265.0, 0.0, 296.0],
            [472.0, 0.0, 406.0],
            [314.0, 0.0, 456.0],
            330.0,
        ),
        BLUE,
        MIRROR,
    ));

    triangles
}

/// Bottom four corners and the same four lifted by `height`, in model coordinates.
fn cuboid_corners(
    a: [FloatType; 3],
    b: [FloatType; 3],
    c: [FloatType; 3],
    d: [FloatType; 3],
    height: FloatType,
) -> [WorldPoint; 8] {
    let bottom = [a, b, c, d].map(WorldPoint::from);
    let lift = WorldVector::new(0.0, height, 0.0);
    [
        bottom[0],
        bottom[1],
        bottom[2],
        bottom[3],
        bottom[0] + lift,
        bottom[1] + lift,
        bottom[2] + lift,
        bottom[3] + lift,
    ]
}

/// Five visible faces of a block standing on the floor, normals pointing out.
fn block(corners: [WorldPoint; 8], color: Rgb, material: Material) -> Vec<SceneTriangle> {
    let [a, b, c, d, e, f, g, h] = corners;
    [
        (e, b, a),
        (e, f, b),
        (f, d, b),
        (f, h, d),
        (h, c, d),
        (h, g, c),
        (g, e, c),
        (e, a, c),
        (g, f, e),
        (g, h, f),
    ]
    .into_iter()
    .map(|(v0, v1, v2)| model_triangle(v0, v1, v2, color, material))
    .collect()
}

/// Closed upright triangular prism hovering just above the floor, footprint given in
/// model x/z.
fn prism(
    a: [FloatType; 2],
    b: [FloatType; 2],
    c: [FloatType; 2],
    height: FloatType,
) -> Vec<SceneTriangle> {
    let bottom = [a, b, c].map(|[x, z]| WorldPoint::new(x, PRISM_LIFT, z));
    let top = bottom.map(|p| p + WorldVector::new(0.0, height, 0.0));
    let center = Triangle::new(bottom[0], bottom[1], bottom[2]).centroid()
        + WorldVector::new(0.0, height / 2.0, 0.0);

    let mut faces = vec![(top[0], top[1], top[2]), (bottom[0], bottom[1], bottom[2])];
    for i in 0..3 {
        let j = (i + 1) % 3;
        faces.push((bottom[i], bottom[j], top[j]));
        faces.push((bottom[i], top[j], top[i]));
    }

    faces
        .into_iter()
        .map(|(v0, v1, v2)| {
            let triangle = Triangle::new(v0, v1, v2);
            let outwards = triangle.normal().dot(&(triangle.centroid() - center)) > 0.0;
            let (v1, v2) = if outwards { (v1, v2) } else { (v2, v1) };
            model_triangle(v0, v1, v2, WHITE, GLASS)
        })
        .collect()
}

/// Maps a point from the 555 unit model space into the scene.
fn to_scene(p: WorldPoint) -> WorldPoint {
    let scaled = p * (2.0 / L) - WorldVector::repeat(1.0);
    WorldPoint::new(-scaled.x, -scaled.y, scaled.z)
}

fn model_triangle(
    v0: WorldPoint,
    v1: WorldPoint,
    v2: WorldPoint,
    color: Rgb,
    material: Material,
) -> SceneTriangle {
    SceneTriangle::new(
        Triangle::new(to_scene(v0), to_scene(v1), to_scene(v2)),
        color,
        material,
    )
}
