mod camera;
pub mod config;
mod film;
pub mod geometry;
mod light;
mod photon;
pub mod scene;
pub mod transport;
pub mod util;

pub use camera::Camera;
pub use config::Config;
pub use film::{Film, PATH_COLOR, PHOTON_COLOR};
pub use light::PointLight;
pub use photon::{Photon, PhotonMap};
pub use scene::Scene;
pub use transport::{PassStatistics, TransportSettings, run_pass};
