mod optics;
mod walk;

use std::{fmt::Display, num::NonZeroUsize, ops::Add};

use rand::{SeedableRng as _, rngs::SmallRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    light::PointLight,
    photon::PhotonMap,
    scene::Scene,
    util::Stats,
};

pub use optics::{diffuse_bounce, reflect, refract};
pub use walk::{WalkState, WalkSummary, trace_photon};

const DEFAULT_PHOTON_COUNT: NonZeroUsize = NonZeroUsize::new(100_000).unwrap();
const DEFAULT_MAX_BOUNCES: NonZeroUsize = NonZeroUsize::new(256).unwrap();

/// What to do when a photon can't leave a transparent object.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TirPolicy {
    /// Mirror the photon back inside.
    #[default]
    Reflect,
    /// End the walk where the reflection would happen.
    Absorb,
}

/// Direction model for the diffuse band of a material.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffuseModel {
    /// Same mirror bounce as the specular band.
    #[default]
    Mirror,
    /// Random cosine weighted direction around the normal.
    CosineHemisphere,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    #[builder(default = DEFAULT_PHOTON_COUNT)]
    pub photon_count: NonZeroUsize,
    /// Walks reaching this many surface interactions are stopped and count as absorbed.
    #[builder(default = DEFAULT_MAX_BOUNCES)]
    pub max_bounces: NonZeroUsize,
    #[builder(default)]
    pub record_paths: bool,
    #[builder(default)]
    pub seed: u64,
    #[builder(default)]
    pub tir_policy: TirPolicy,
    #[builder(default)]
    pub diffuse_model: DiffuseModel,
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings::builder().build()
    }
}

impl PhotonMap {
    /// Photon map sized and configured for a transport pass with these settings.
    pub fn for_settings(settings: &TransportSettings) -> PhotonMap {
        PhotonMap::new(settings.photon_count.get(), settings.record_paths)
    }
}

/// Counters collected over one pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PassStatistics {
    pub photons: usize,
    pub absorbed: usize,
    pub escaped: usize,
    /// Absorbed because of the bounce limit.
    pub truncated: usize,
    pub total_internal_reflections: usize,
    pub bounces: Stats,
}

impl From<WalkSummary> for PassStatistics {
    fn from(summary: WalkSummary) -> Self {
        PassStatistics {
            photons: 1,
            absorbed: usize::from(summary.state == WalkState::Absorbed),
            escaped: usize::from(summary.state == WalkState::Escaped),
            truncated: usize::from(summary.truncated),
            total_internal_reflections: summary.total_internal_reflections,
            bounces: Stats::new_single(summary.bounces),
        }
    }
}

impl Add for PassStatistics {
    type Output = PassStatistics;

    fn add(self, other: PassStatistics) -> PassStatistics {
        PassStatistics {
            photons: self.photons + other.photons,
            absorbed: self.absorbed + other.absorbed,
            escaped: self.escaped + other.escaped,
            truncated: self.truncated + other.truncated,
            total_internal_reflections: self.total_internal_reflections
                + other.total_internal_reflections,
            bounces: self.bounces + other.bounces,
        }
    }
}

impl Display for PassStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} photons, {} absorbed ({} truncated), {} escaped, {} TIR; bounces: {}",
            self.photons,
            self.absorbed,
            self.truncated,
            self.escaped,
            self.total_internal_reflections,
            self.bounces
        )
    }
}

/// Random generator of photon `index` within a pass.
/// The seed goes to the high half and the index to the low half of the generator seed.
fn photon_rng(seed: u64, index: usize) -> SmallRng {
    SmallRng::seed_from_u64(seed.rotate_left(32) ^ index as u64)
}

/// Runs one transport pass, overwriting every photon of the map.
///
/// Photons are traced in parallel, photon `i` drawing from its own generator seeded with
/// `(settings.seed, i)`, so the result depends only on the inputs and not on scheduling.
/// The light power is split across all photons of the map; `settings.photon_count` only
/// matters when allocating the map.
#[tracing::instrument(skip_all, fields(photon_count = photon_map.len(), seed = settings.seed))]
pub fn run_pass(
    photon_map: &mut PhotonMap,
    light: &PointLight,
    scene: &Scene,
    settings: &TransportSettings,
) -> PassStatistics {
    let photon_count = photon_map.len();
    let statistics = photon_map
        .photons_mut()
        .par_iter_mut()
        .enumerate()
        .map(|(index, photon)| {
            let mut rng = photon_rng(settings.seed, index);
            PassStatistics::from(trace_photon(
                photon,
                light,
                scene,
                settings,
                photon_count,
                &mut rng,
            ))
        })
        .reduce(PassStatistics::default, |a, b| a + b);

    if statistics.truncated > 0 {
        tracing::warn!(
            truncated = statistics.truncated,
            max_bounces = settings.max_bounces.get(),
            "some photons hit the bounce limit"
        );
    }
    tracing::debug!(%statistics, "transport pass finished");
    statistics
}
