mod material;
mod obj;
pub mod test_scene;

use std::f64::consts::PI;

use index_vec::IndexVec;
use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::{
    geometry::{FloatType, Ray, Triangle, WorldPoint, WorldVector},
    light::PointLight,
    util::{Rgb, black},
};

pub use material::{Interaction, Material, MaterialError};
pub use obj::ObjOpenError;

index_vec::define_index_type! {
    pub struct TriangleIdx = u32;
}

/// A surface of the scene: geometry, derived normal and the photon response.
#[derive(Clone, Debug)]
pub struct SceneTriangle {
    vertices: Triangle<WorldPoint>,
    /// Unit normal, `e2 x e1`. Zero for degenerate triangles.
    normal: WorldVector,
    pub color: Rgb,
    pub material: Material,
}

impl SceneTriangle {
    pub fn new(vertices: Triangle<WorldPoint>, color: Rgb, material: Material) -> Self {
        let normal = unit_normal(&vertices);
        SceneTriangle {
            vertices,
            normal,
            color,
            material,
        }
    }

    pub fn vertices(&self) -> &Triangle<WorldPoint> {
        &self.vertices
    }

    /// Replaces the geometry, keeping the normal in sync.
    pub fn set_vertices(&mut self, vertices: Triangle<WorldPoint>) {
        self.normal = unit_normal(&vertices);
        self.vertices = vertices;
    }

    pub fn normal(&self) -> &WorldVector {
        &self.normal
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == WorldVector::zeros()
    }
}

fn unit_normal(vertices: &Triangle<WorldPoint>) -> WorldVector {
    vertices
        .normal()
        .try_normalize(0.0)
        .filter(|n| n.iter().all(|x| x.is_finite()))
        .unwrap_or_else(WorldVector::zeros)
}

/// Nearest surface hit along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub position: WorldPoint,
    /// Euclidean distance from the ray origin, independent of the direction's length.
    pub distance: FloatType,
    pub triangle: TriangleIdx,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Triangle {index} has an invalid material: {source}")]
    InvalidMaterial {
        index: usize,
        #[source]
        source: MaterialError,
    },

    #[error("Failed to load OBJ scene: {0}")]
    Obj(#[from] ObjOpenError),
}

/// Immutable set of triangles that photons bounce around in.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    triangles: IndexVec<TriangleIdx, SceneTriangle>,
}

impl Scene {
    /// Validates the materials and wraps the triangles.
    /// Degenerate triangles are kept (they never intersect anything), but reported.
    #[tracing::instrument(skip_all, fields(triangle_count = triangles.len()))]
    pub fn new(triangles: Vec<SceneTriangle>) -> Result<Scene, SceneError> {
        for (index, triangle) in triangles.iter().enumerate() {
            triangle
                .material
                .validate()
                .map_err(|source| SceneError::InvalidMaterial { index, source })?;
            if triangle.is_degenerate() {
                tracing::warn!(index, "degenerate triangle will never be hit");
            }
        }

        Ok(Scene {
            triangles: IndexVec::from_vec(triangles),
        })
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneTriangle> {
        self.triangles.iter()
    }

    /// Finds the hit nearest to the ray origin by testing every triangle.
    ///
    /// `exclude` skips one triangle, used for rays leaving a surface so that they don't
    /// immediately hit the surface they start on.
    /// Nearest means smallest `|hit - origin|`, ties go to the lower index.
    pub fn find_closest_intersection(
        &self,
        ray: &Ray,
        exclude: Option<TriangleIdx>,
    ) -> Option<Intersection> {
        self.triangles
            .iter_enumerated()
            .filter(|(index, _)| Some(*index) != exclude)
            .filter_map(|(index, triangle)| {
                let hit = triangle.vertices.intersect(ray)?;
                let position = ray.point_at(hit.t);
                Some(Intersection {
                    position,
                    distance: (position - ray.origin).norm(),
                    triangle: index,
                })
            })
            .min_by_key(|intersection| OrderedFloat(intersection.distance))
    }

    /// Irradiance from a point light at a surface point, zero if the light is occluded
    /// or behind the surface.
    pub fn direct_light(&self, intersection: &Intersection, light: &PointLight) -> Rgb {
        let to_light = light.position - intersection.position;
        let distance = to_light.norm();
        if distance == 0.0 {
            return black();
        }

        let shadow_ray = Ray::new(intersection.position, to_light);
        if let Some(occluder) =
            self.find_closest_intersection(&shadow_ray, Some(intersection.triangle))
        {
            if occluder.distance < distance {
                return black();
            }
        }

        let normal = self[intersection.triangle].normal();
        let cos = (normal.dot(&to_light) / distance).max(0.0);
        light.power * (cos / (4.0 * PI * distance * distance))
    }
}

impl std::ops::Index<TriangleIdx> for Scene {
    type Output = SceneTriangle;

    fn index(&self, index: TriangleIdx) -> &SceneTriangle {
        &self.triangles[index]
    }
}
