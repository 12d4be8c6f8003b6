use std::path::PathBuf;

use anyhow::Context as _;
use eframe::{App, CreationContext, Frame, egui};
use egui::{CentralPanel, ColorImage, Image, Key, TextureOptions, TopBottomPanel};
use photonmap::{
    Camera, Config, Film, PATH_COLOR, PassStatistics, PhotonMap, PointLight, Scene,
    TransportSettings, geometry::WorldVector, run_pass,
};
use tracing_subscriber::EnvFilter;

/// Units per second
const MOVE_SPEED: f64 = 0.5;
/// Radians per second
const TURN_SPEED: f64 = 0.5;

pub struct PhotonmapGui {
    scene: Scene,
    settings: TransportSettings,
    light: PointLight,
    camera: Camera,
    draw_paths: bool,
    screenshot_path: PathBuf,

    photon_map: PhotonMap,
    statistics: PassStatistics,
    film: Film,
    texture: egui::TextureHandle,
}

impl PhotonmapGui {
    pub fn new(config: Config, cc: &CreationContext<'_>) -> anyhow::Result<Self> {
        let camera = config.camera()?;
        let scene = config.build_scene().context("Building scene")?;
        let mut photon_map = PhotonMap::for_settings(&config.transport);
        let statistics = run_pass(&mut photon_map, &config.light, &scene, &config.transport);

        let film = Film::new(camera.get_resolution());
        let texture = cc
            .egui_ctx
            .load_texture("photons", egui_image(&film), TextureOptions::NEAREST);

        let mut gui = PhotonmapGui {
            scene,
            settings: config.transport,
            light: config.light,
            camera,
            draw_paths: config.draw_paths,
            screenshot_path: config.output,

            photon_map,
            statistics,
            film,
            texture,
        };
        gui.develop();
        Ok(gui)
    }

    /// Redraws the film from the current photon map and uploads it.
    fn develop(&mut self) {
        self.film.clear();
        if self.draw_paths {
            self.film.draw_paths(&self.photon_map, &self.camera, PATH_COLOR);
        }
        self.film.expose(&self.photon_map, &self.camera);
        self.texture.set(egui_image(&self.film), TextureOptions::NEAREST);
    }

    /// Applies held keys, returns true if anything moved.
    fn handle_input(&mut self, ctx: &egui::Context) -> bool {
        let (dt, held) = ctx.input(|i| {
            let held = |key| i.key_down(key);
            (
                i.stable_dt as f64,
                [Key::W, Key::S, Key::A, Key::D, Key::Q, Key::E].map(held),
            )
        });
        let [forward, back, left, right, turn_left, turn_right] = held;
        if !held.contains(&true) {
            return false;
        }

        let step = dt * MOVE_SPEED;
        let axis = |positive: bool, negative: bool| (positive as i32 - negative as i32) as f64;
        let forward_step = axis(forward, back) * step;
        let right_step = axis(right, left) * step;

        self.camera.move_forward(forward_step);
        self.camera.strafe_right(right_step);
        self.camera.rotate(axis(turn_right, turn_left) * dt * TURN_SPEED);

        // The light follows the movement keys along the world axes
        let light_offset = WorldVector::new(right_step, 0.0, forward_step);
        if light_offset != WorldVector::zeros() {
            self.light.translate(&light_offset);
            self.statistics =
                run_pass(&mut self.photon_map, &self.light, &self.scene, &self.settings);
        }
        true
    }

    fn save_screenshot(&self) {
        match self.film.save(&self.screenshot_path) {
            Ok(()) => tracing::info!(path = %self.screenshot_path.display(), "screenshot saved"),
            Err(error) => tracing::error!(%error, "failed to save screenshot"),
        }
    }
}

impl App for PhotonmapGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if self.handle_input(ctx) {
            self.develop();
            ctx.request_repaint();
        }
        if ctx.input(|i| i.key_pressed(Key::P)) {
            self.save_screenshot();
        }

        TopBottomPanel::bottom("status").show(ctx, |ui| {
            let light = self.light.position;
            ui.label(format!(
                "{}    light {:.2} {:.2} {:.2}    WASD move, QE turn, P screenshot",
                self.statistics, light.x, light.y, light.z
            ));
        });
        CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.add(Image::from_texture(&self.texture).shrink_to_fit())
            })
        });
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Loading config {}", path.to_string_lossy()))?,
        None => Config::default(),
    };

    eframe::run_native(
        "Photonmap GUI",
        Default::default(),
        Box::new(move |cc| Ok(Box::new(PhotonmapGui::new(config, cc)?))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(())
}

fn egui_image(film: &Film) -> ColorImage {
    let image = film.image();
    ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.as_raw(),
    )
}
