mod stats;

pub use stats::Stats;

use crate::geometry::FloatType;

/// Linear RGB triple, used both for surface reflectance and photon power.
pub type Rgb = rgb::RGB<FloatType>;

pub fn black() -> Rgb {
    Rgb::new(0.0, 0.0, 0.0)
}
