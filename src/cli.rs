use std::time::Instant;

use anyhow::Context as _;
use indicatif::ProgressBar;
use photonmap::{Config, Film, PATH_COLOR, PhotonMap, run_pass};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Loading config {}", path.to_string_lossy()))?,
        None => Config::default(),
    };
    let camera = config.camera()?;
    let scene = config.build_scene().context("Building scene")?;
    tracing::info!(triangles = scene.len(), "scene ready");

    let bar = ProgressBar::new_spinner();
    bar.set_message(format!("Tracing {} photons", config.transport.photon_count));
    bar.enable_steady_tick(std::time::Duration::from_millis(100));

    let start = Instant::now();
    let mut photon_map = PhotonMap::for_settings(&config.transport);
    let statistics = run_pass(&mut photon_map, &config.light, &scene, &config.transport);
    bar.finish_and_clear();
    tracing::info!(elapsed = ?start.elapsed(), "{statistics}");

    let mut film = Film::new(camera.get_resolution());
    if config.draw_paths {
        film.draw_paths(&photon_map, &camera, PATH_COLOR);
    }
    let landed = film.expose(&photon_map, &camera);
    tracing::info!(landed, "photons visible from the camera");

    film.save(&config.output)
        .with_context(|| format!("Saving image {}", config.output.display()))?;
    tracing::info!(path = %config.output.display(), "image saved");

    Ok(())
}
