use std::path::Path;

use image::{Rgba, RgbaImage};
use itertools::Itertools as _;

use crate::{
    camera::Camera,
    geometry::{FloatType, ScreenSize},
    photon::PhotonMap,
};

pub const PHOTON_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const PATH_COLOR: Rgba<u8> = Rgba([64, 64, 96, 255]);
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Samples per path segment when drawing bounce paths.
const SEGMENT_SAMPLES: usize = 256;

/// Image that photon maps get projected onto.
#[derive(Clone, Debug)]
pub struct Film {
    image: RgbaImage,
}

impl Film {
    pub fn new(resolution: ScreenSize) -> Film {
        Film {
            image: RgbaImage::from_pixel(resolution.x, resolution.y, BACKGROUND),
        }
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = BACKGROUND);
    }

    /// Marks the pixel of every absorbed photon.
    /// Returns the number of photons that landed in the image.
    pub fn expose(&mut self, photon_map: &PhotonMap, camera: &Camera) -> usize {
        let mut landed = 0;
        for p in photon_map
            .hits()
            .filter_map(|photon| camera.project(&photon.position))
        {
            if let Some(pixel) = self.image.get_pixel_mut_checked(p.x, p.y) {
                *pixel = PHOTON_COLOR;
                landed += 1;
            }
        }
        landed
    }

    /// Draws the recorded bounce paths as polylines. Does nothing if the map doesn't
    /// record paths.
    pub fn draw_paths(&mut self, photon_map: &PhotonMap, camera: &Camera, color: Rgba<u8>) {
        let segments = photon_map
            .iter()
            .filter_map(|photon| photon.path.as_ref())
            .flat_map(|path| path.iter().tuple_windows());

        for (a, b) in segments {
            for i in 0..=SEGMENT_SAMPLES {
                let point = a + (b - a) * (i as FloatType / SEGMENT_SAMPLES as FloatType);
                if let Some(p) = camera.project(&point) {
                    if let Some(pixel) = self.image.get_pixel_mut_checked(p.x, p.y) {
                        *pixel = color;
                    }
                }
            }
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }
}
