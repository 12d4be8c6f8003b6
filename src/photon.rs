use crate::{
    geometry::WorldPoint,
    util::{Rgb, black},
};

/// A single photon's walk result.
#[derive(Clone, Debug, PartialEq)]
pub struct Photon {
    /// Where the photon came to rest, or the last surface it left if it escaped.
    pub position: WorldPoint,
    pub power: Rgb,
    /// True if the walk ended on a surface, false if the photon escaped the scene.
    pub hit: bool,
    /// Every visited point, starting at the light. Only kept when path recording is on.
    pub path: Option<Vec<WorldPoint>>,
}

impl Photon {
    fn new(record_path: bool) -> Self {
        Photon {
            position: WorldPoint::origin(),
            power: black(),
            hit: false,
            path: record_path.then(Vec::new),
        }
    }
}

/// Fixed size collection of photons, rewritten completely by every transport pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotonMap {
    photons: Vec<Photon>,
}

impl PhotonMap {
    pub fn new(photon_count: usize, record_paths: bool) -> Self {
        PhotonMap {
            photons: vec![Photon::new(record_paths); photon_count],
        }
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    pub fn records_paths(&self) -> bool {
        self.photons.first().is_some_and(|p| p.path.is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Photon> {
        self.photons.iter()
    }

    /// Photons that came to rest on a surface.
    pub fn hits(&self) -> impl Iterator<Item = &Photon> {
        self.photons.iter().filter(|p| p.hit)
    }

    pub(crate) fn photons_mut(&mut self) -> &mut [Photon] {
        &mut self.photons
    }
}

impl std::ops::Index<usize> for PhotonMap {
    type Output = Photon;

    fn index(&self, index: usize) -> &Photon {
        &self.photons[index]
    }
}
