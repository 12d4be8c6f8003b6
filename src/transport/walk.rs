use crate::{
    geometry::{FloatType, Ray, WorldPoint, WorldVector},
    light::PointLight,
    photon::Photon,
    scene::{Intersection, Interaction, Scene, TriangleIdx},
    transport::{
        DiffuseModel, TirPolicy, TransportSettings,
        optics::{diffuse_bounce, reflect, refract},
    },
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WalkState {
    Traveling,
    /// Came to rest on a surface.
    Absorbed,
    /// Left the scene without hitting anything.
    Escaped,
}

/// What happened during one photon's walk, for statistics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WalkSummary {
    pub state: WalkState,
    /// Number of surface interactions.
    pub bounces: usize,
    /// The walk was cut short by the bounce limit.
    pub truncated: bool,
    pub total_internal_reflections: usize,
}

/// Mutable state of a single photon's random walk.
struct Walk<'a> {
    scene: &'a Scene,
    settings: &'a TransportSettings,
    path: Option<&'a mut Vec<WorldPoint>>,

    ray: Ray,
    /// Surface the ray is leaving, never tested for the next hit.
    exclude: Option<TriangleIdx>,
    state: WalkState,

    bounces: usize,
    total_internal_reflections: usize,
}

impl Walk<'_> {
    fn record(&mut self, point: WorldPoint) {
        if let Some(path) = self.path.as_mut() {
            path.push(point);
        }
    }

    /// Advances the walk by one surface interaction.
    fn step(&mut self, rng: &mut impl rand::Rng) {
        debug_assert!(self.state == WalkState::Traveling);

        let Some(hit) = self.scene.find_closest_intersection(&self.ray, self.exclude) else {
            self.state = WalkState::Escaped;
            return;
        };

        self.bounces += 1;
        self.record(hit.position);
        self.exclude = Some(hit.triangle);
        self.ray.origin = hit.position;

        let scene = self.scene;
        let triangle = &scene[hit.triangle];
        let epsilon: FloatType = rng.random();
        match triangle.material.choose(epsilon) {
            Interaction::Absorb => self.state = WalkState::Absorbed,
            Interaction::Diffuse => {
                self.ray.direction = match self.settings.diffuse_model {
                    DiffuseModel::Mirror => reflect(&self.ray.direction, triangle.normal()),
                    DiffuseModel::CosineHemisphere => {
                        diffuse_bounce(&self.ray.direction, triangle.normal(), rng)
                    }
                }
            }
            Interaction::Specular => {
                self.ray.direction = reflect(&self.ray.direction, triangle.normal());
            }
            Interaction::Transmit => self.transmit(&hit),
        }
    }

    /// Passes the photon through a transparent object.
    ///
    /// The entry refraction happens at the hit point, then the refracted ray is cast from
    /// the same point to find where it leaves the medium, and the exit refraction happens
    /// there with the indices swapped. The medium is assumed to be air on the outside.
    /// Total internal reflections keep the photon inside and the search for an exit
    /// continues, each reflection counting as a bounce.
    /// An opaque surface found instead of an exit is left for the next step, where it is
    /// hit like any other surface.
    fn transmit(&mut self, entry: &Intersection) {
        let scene = self.scene;
        let index = scene[entry.triangle].material.refractive_index;
        let entry_normal = scene[entry.triangle].normal();

        let Some(inside) = refract(&self.ray.direction, entry_normal, 1.0 / index) else {
            // Can't happen going from air into a denser medium
            self.ray.direction = reflect(&self.ray.direction, entry_normal);
            return;
        };
        self.ray.direction = inside;

        loop {
            let Some(exit) = scene.find_closest_intersection(&self.ray, self.exclude) else {
                self.state = WalkState::Escaped;
                return;
            };
            if scene[exit.triangle].material.transmit == 0.0 {
                return;
            }

            self.record(exit.position);
            self.exclude = Some(exit.triangle);
            self.ray.origin = exit.position;

            let exit_normal = scene[exit.triangle].normal();
            if let Some(outside) = refract(&self.ray.direction, exit_normal, index) {
                self.ray.direction = outside;
                return;
            }

            self.total_internal_reflections += 1;
            tracing::trace!(origin = ?self.ray.origin, "total internal reflection");
            match self.settings.tir_policy {
                TirPolicy::Reflect => {
                    self.ray.direction = reflect(&self.ray.direction, exit_normal);
                    self.bounces += 1;
                    if self.bounces >= self.settings.max_bounces.get() {
                        // Still inside, the caller stops the walk
                        return;
                    }
                }
                TirPolicy::Absorb => {
                    self.state = WalkState::Absorbed;
                    return;
                }
            }
        }
    }

    /// Steps until the walk ends, returns true if it was stopped by the bounce limit.
    fn run(&mut self, rng: &mut impl rand::Rng) -> bool {
        while self.state == WalkState::Traveling {
            if self.bounces >= self.settings.max_bounces.get() {
                self.state = WalkState::Absorbed;
                return true;
            }
            self.step(rng);
        }
        false
    }
}

/// Traces one photon from the light until it is absorbed or escapes, overwriting the
/// photon record.
///
/// The photon carries `light.power / photon_count`. Its initial direction is a uniform
/// point of the `[-1, 1]^3` cube, not normalized.
pub fn trace_photon(
    photon: &mut Photon,
    light: &PointLight,
    scene: &Scene,
    settings: &TransportSettings,
    photon_count: usize,
    rng: &mut impl rand::Rng,
) -> WalkSummary {
    photon.power = light.power / photon_count.max(1) as FloatType;
    if let Some(path) = photon.path.as_mut() {
        path.clear();
        path.push(light.position);
    }

    let direction = WorldVector::new(
        rng.random_range(-1.0..=1.0),
        rng.random_range(-1.0..=1.0),
        rng.random_range(-1.0..=1.0),
    );

    let mut walk = Walk {
        scene,
        settings,
        path: photon.path.as_mut(),
        ray: Ray::new(light.position, direction),
        exclude: None,
        state: WalkState::Traveling,
        bounces: 0,
        total_internal_reflections: 0,
    };

    let truncated = walk.run(rng);

    let summary = WalkSummary {
        state: walk.state,
        bounces: walk.bounces,
        truncated,
        total_internal_reflections: walk.total_internal_reflections,
    };
    let position = walk.ray.origin;

    photon.position = position;
    photon.hit = summary.state == WalkState::Absorbed;
    summary
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        geometry::Triangle,
        photon::PhotonMap,
        scene::{Material, SceneTriangle, test::square_at_z},
        util::Rgb,
    };

    use std::num::NonZeroUsize;

    use assert2::assert;
    use rand::{SeedableRng, rngs::SmallRng};

    fn settings() -> TransportSettings {
        TransportSettings::builder()
            .max_bounces(NonZeroUsize::new(1000).unwrap())
            .build()
    }

    fn light_at_origin() -> PointLight {
        PointLight::new(WorldPoint::origin(), Rgb::new(10.0, 10.0, 10.0))
    }

    /// Regular tetrahedron around the origin with the given material on all faces.
    fn tetrahedron(material: Material) -> Scene {
        let v = [
            WorldPoint::new(1.0, 1.0, 1.0),
            WorldPoint::new(1.0, -1.0, -1.0),
            WorldPoint::new(-1.0, 1.0, -1.0),
            WorldPoint::new(-1.0, -1.0, 1.0),
        ];
        let faces = [(0, 1, 2), (0, 3, 1), (0, 2, 3), (1, 3, 2)];
        Scene::new(
            faces
                .into_iter()
                .map(|(a, b, c)| {
                    SceneTriangle::new(
                        Triangle::new(v[a], v[b], v[c]),
                        Rgb::new(1.0, 1.0, 1.0),
                        material,
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn trace(
        scene: &Scene,
        settings: &TransportSettings,
        seed: u64,
        record_path: bool,
    ) -> (Photon, WalkSummary) {
        let mut map = PhotonMap::new(1, record_path);
        let photon = &mut map.photons_mut()[0];
        let mut rng = SmallRng::seed_from_u64(seed);
        let summary = trace_photon(photon, &light_at_origin(), scene, settings, 4, &mut rng);
        (photon.clone(), summary)
    }

    #[test]
    fn black_surface_absorbs_on_first_hit() {
        let scene = tetrahedron(Material::black());
        for seed in 0..100 {
            let (photon, summary) = trace(&scene, &settings(), seed, true);
            assert!(summary.state == WalkState::Absorbed);
            assert!(summary.bounces == 1);
            assert!(photon.hit);
            assert!(photon.power == Rgb::new(2.5, 2.5, 2.5));

            let path = photon.path.unwrap();
            assert!(path.len() == 2);
            assert!(path[0] == WorldPoint::origin());
            assert!(path[1] == photon.position);
        }
    }

    #[test]
    fn closed_lossless_enclosure_never_escapes() {
        let settings = TransportSettings::builder()
            .max_bounces(NonZeroUsize::new(200).unwrap())
            .build();
        let scene = tetrahedron(Material::new(0.6, 0.4, 0.0, 1.0));
        for seed in 0..200 {
            let (photon, summary) = trace(&scene, &settings, seed, false);
            assert!(summary.state == WalkState::Absorbed);
            assert!(summary.truncated);
            assert!(summary.bounces == 200);
            assert!(photon.hit);
        }
    }

    #[test]
    fn closed_enclosure_with_cosine_diffuse_never_escapes() {
        let settings = TransportSettings::builder()
            .max_bounces(NonZeroUsize::new(200).unwrap())
            .diffuse_model(DiffuseModel::CosineHemisphere)
            .build();
        let scene = tetrahedron(Material::diffuse(0.9));
        for seed in 0..200 {
            let (photon, summary) = trace(&scene, &settings, seed, false);
            assert!(summary.state == WalkState::Absorbed);
            assert!(photon.hit);
        }
    }

    #[test]
    fn empty_scene_escapes() {
        let (photon, summary) = trace(&Scene::default(), &settings(), 1, true);
        assert!(summary.state == WalkState::Escaped);
        assert!(summary.bounces == 0);
        assert!(!photon.hit);
        assert!(photon.position == WorldPoint::origin());
        assert!(photon.path == Some(vec![WorldPoint::origin()]));
    }

    /// Glass slab between z = 2 and z = 3, made of two squares with the same index.
    /// Anything passing through must come out parallel to the way it went in.
    #[test]
    fn slab_keeps_direction() {
        let glass = Material::new(0.0, 0.0, 1.0, 1.5);
        let mut triangles = square_at_z(2.0, glass).to_vec();
        triangles.extend(square_at_z(3.0, glass));
        let scene = Scene::new(triangles).unwrap();
        let settings = settings();

        let mut walk = Walk {
            scene: &scene,
            settings: &settings,
            path: None,
            ray: Ray::new(WorldPoint::origin(), WorldVector::new(0.1, -0.2, 1.0)),
            exclude: None,
            state: WalkState::Traveling,
            bounces: 0,
            total_internal_reflections: 0,
        };
        let mut rng = SmallRng::seed_from_u64(0);
        walk.step(&mut rng);

        assert!(walk.state == WalkState::Traveling);
        assert!((walk.ray.origin.z - 3.0).abs() < 1e-12);
        let expected = WorldVector::new(0.1, -0.2, 1.0).normalize();
        assert!((walk.ray.direction - expected).norm() < 1e-12);
        assert!(walk.total_internal_reflections == 0);

        // Inside the slab the photon was bent towards the normal
        let entry_x = 0.1 * 2.0;
        assert!(walk.ray.origin.x - entry_x < 0.1);

        walk.step(&mut rng);
        assert!(walk.state == WalkState::Escaped);
    }

    #[test]
    fn thin_sheet_without_exit_escapes() {
        let glass = Material::new(0.0, 0.0, 1.0, 1.5);
        let scene = Scene::new(square_at_z(2.0, glass).to_vec()).unwrap();
        let (photon, summary) = trace(&scene, &settings(), 3, false);
        assert!(summary.state == WalkState::Escaped);
        assert!(!photon.hit);
    }

    #[test]
    fn mirror_box_reflects_with_same_length() {
        let scene = tetrahedron(Material::mirror(1.0));
        let settings = settings();
        let mut walk = Walk {
            scene: &scene,
            settings: &settings,
            path: None,
            ray: Ray::new(WorldPoint::origin(), WorldVector::new(0.3, 0.2, 0.1)),
            exclude: None,
            state: WalkState::Traveling,
            bounces: 0,
            total_internal_reflections: 0,
        };
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..10 {
            walk.step(&mut rng);
            assert!(walk.state == WalkState::Traveling);
            let length = WorldVector::new(0.3, 0.2, 0.1).norm();
            assert!((walk.ray.direction.norm() - length).abs() < 1e-12);
        }
        assert!(walk.bounces == 10);
    }

    #[test]
    fn total_internal_reflection_policies() {
        // Exit surface tilted so that the ray inside hits it past the critical angle
        let glass = Material::new(0.0, 0.0, 1.0, 1.5);
        let entry = SceneTriangle::new(
            Triangle::new(
                WorldPoint::new(-10.0, -10.0, 1.0),
                WorldPoint::new(30.0, -10.0, 1.0),
                WorldPoint::new(-10.0, 30.0, 1.0),
            ),
            Rgb::new(1.0, 1.0, 1.0),
            glass,
        );
        // Plane through (0, 0, 2) with normal (1, 0, 1) / sqrt(2): 45 degrees to the ray
        let exit = SceneTriangle::new(
            Triangle::new(
                WorldPoint::new(-10.0, -10.0, 12.0),
                WorldPoint::new(30.0, -10.0, -28.0),
                WorldPoint::new(-10.0, 30.0, 12.0),
            ),
            Rgb::new(1.0, 1.0, 1.0),
            glass,
        );
        let scene = Scene::new(vec![entry, exit]).unwrap();

        // Reflected inside, the photon travels parallel to the entry surface and leaves
        for (policy, expected_state) in [
            (TirPolicy::Reflect, WalkState::Escaped),
            (TirPolicy::Absorb, WalkState::Absorbed),
        ] {
            let settings = TransportSettings::builder().tir_policy(policy).build();
            let mut walk = Walk {
                scene: &scene,
                settings: &settings,
                path: None,
                ray: Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0)),
                exclude: None,
                state: WalkState::Traveling,
                bounces: 0,
                total_internal_reflections: 0,
            };
            walk.step(&mut SmallRng::seed_from_u64(0));

            assert!(walk.total_internal_reflections == 1);
            assert!(walk.state == expected_state);
            assert!((walk.ray.origin - WorldPoint::new(0.0, 0.0, 2.0)).norm() < 1e-12);
            assert!(walk.ray.direction.iter().all(|x| x.is_finite()));
            if policy == TirPolicy::Reflect {
                assert!((walk.ray.direction - WorldVector::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
            }
        }
    }

    /// Glass entered at z = 1, a tilted face through (0, 0, 2) reflecting the ray
    /// towards -x and a side face at x = -1 that is hit head on.
    fn reflecting_prism() -> Scene {
        let glass = Material::new(0.0, 0.0, 1.0, 1.5);
        let white = Rgb::new(1.0, 1.0, 1.0);
        let plane = |a: WorldPoint, b: WorldPoint, c: WorldPoint| {
            SceneTriangle::new(Triangle::new(a, b, c), white, glass)
        };
        Scene::new(vec![
            plane(
                WorldPoint::new(-10.0, -10.0, 1.0),
                WorldPoint::new(30.0, -10.0, 1.0),
                WorldPoint::new(-10.0, 30.0, 1.0),
            ),
            plane(
                WorldPoint::new(-10.0, -10.0, 12.0),
                WorldPoint::new(30.0, -10.0, -28.0),
                WorldPoint::new(-10.0, 30.0, 12.0),
            ),
            plane(
                WorldPoint::new(-1.0, -10.0, -10.0),
                WorldPoint::new(-1.0, 30.0, -10.0),
                WorldPoint::new(-1.0, -10.0, 30.0),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn internal_reflection_finds_next_exit() {
        let scene = reflecting_prism();
        let settings = settings();
        let mut path = Vec::new();
        let mut walk = Walk {
            scene: &scene,
            settings: &settings,
            path: Some(&mut path),
            ray: Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0)),
            exclude: None,
            state: WalkState::Traveling,
            bounces: 0,
            total_internal_reflections: 0,
        };
        walk.step(&mut SmallRng::seed_from_u64(0));

        assert!(walk.state == WalkState::Traveling);
        assert!(walk.total_internal_reflections == 1);
        assert!(walk.bounces == 2);
        assert!((walk.ray.origin - WorldPoint::new(-1.0, 0.0, 2.0)).norm() < 1e-12);
        assert!((walk.ray.direction - WorldVector::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!(path.len() == 3);
    }

    #[test]
    fn bounce_limit_stops_internal_reflections() {
        let scene = reflecting_prism();
        let settings = TransportSettings::builder()
            .max_bounces(NonZeroUsize::new(2).unwrap())
            .build();
        let mut walk = Walk {
            scene: &scene,
            settings: &settings,
            path: None,
            ray: Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0)),
            exclude: None,
            state: WalkState::Traveling,
            bounces: 0,
            total_internal_reflections: 0,
        };

        let truncated = walk.run(&mut SmallRng::seed_from_u64(0));

        assert!(truncated);
        assert!(walk.state == WalkState::Absorbed);
        assert!(walk.bounces == 2);
        assert!(walk.total_internal_reflections == 1);
        assert!((walk.ray.origin - WorldPoint::new(0.0, 0.0, 2.0)).norm() < 1e-12);
    }

    /// Glass resting on a black surface: the photon crosses the glass and stops on the
    /// surface instead of passing through it.
    #[test]
    fn opaque_surface_behind_glass_is_hit() {
        let glass = Material::new(0.0, 0.0, 1.0, 1.5);
        let mut triangles = square_at_z(2.0, glass).to_vec();
        triangles.extend(square_at_z(3.0, Material::black()));
        let scene = Scene::new(triangles).unwrap();
        let settings = settings();
        let mut path = Vec::new();
        let mut walk = Walk {
            scene: &scene,
            settings: &settings,
            path: Some(&mut path),
            ray: Ray::new(WorldPoint::origin(), WorldVector::new(0.1, -0.2, 1.0)),
            exclude: None,
            state: WalkState::Traveling,
            bounces: 0,
            total_internal_reflections: 0,
        };

        let truncated = walk.run(&mut SmallRng::seed_from_u64(0));

        assert!(!truncated);
        assert!(walk.state == WalkState::Absorbed);
        assert!(walk.bounces == 2);
        assert!((walk.ray.origin.z - 3.0).abs() < 1e-12);
        assert!(path.len() == 2);
    }
}
