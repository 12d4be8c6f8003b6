use std::{fs, path::Path};

use thiserror::Error;

use super::{Material, Scene, SceneError, SceneTriangle};
use crate::{
    geometry::{Triangle, WorldPoint},
    util::Rgb,
};

impl Scene {
    /// Loads all triangles of a Wavefront OBJ file, giving every one of them the same
    /// color and material. Non-triangle primitives are skipped.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn with_obj(
        path: impl AsRef<Path>,
        color: Rgb,
        material: Material,
    ) -> Result<Scene, SceneError> {
        let content = fs::read_to_string(path).map_err(ObjOpenError::from)?;
        let parsed = wavefront_obj::obj::parse(content).map_err(ObjOpenError::from)?;

        Scene::new(load_obj(parsed, color, material))
    }
}

fn load_obj(obj: wavefront_obj::obj::ObjSet, color: Rgb, material: Material) -> Vec<SceneTriangle> {
    let mut triangles = Vec::new();
    let mut skipped = 0usize;

    for o in obj.objects.into_iter() {
        let vertex = |index: usize| {
            let v = &o.vertices[index];
            WorldPoint::new(v.x, v.y, v.z)
        };

        for geometry in &o.geometry {
            for shape in &geometry.shapes {
                let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                    skipped += 1;
                    continue;
                };

                triangles.push(SceneTriangle::new(
                    Triangle::new(vertex(a.0), vertex(b.0), vertex(c.0)),
                    color,
                    material,
                ));
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "non-triangle primitives ignored");
    }
    tracing::debug!(triangles = triangles.len(), "OBJ loaded");

    triangles
}

#[derive(Error, Debug)]
pub enum ObjOpenError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),
}
