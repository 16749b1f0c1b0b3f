//! The per-frame tick and the eframe window around it.

use std::time::Instant;

use eframe::egui;
use estimation::Estimator;
use log::{debug, info, warn};
use posecore::KinematicState;
use projection::{FieldGeometry, PixelRect, ViewTransform};
use telemetry::{ProducerHandle, SampleSource};

use crate::config::{AppConfig, RenderConfig};
use crate::field::FieldImage;
use crate::overlay::{FpsCounter, OverlayState};
use crate::render;
use crate::scene::{build_scene, Scene};

/// Poll, estimate and build the scene, once per tick.
///
/// Holds everything that survives between ticks: the estimator's previous
/// state, the current view transform and the overlay.
pub struct DisplayPipeline {
    source: Box<dyn SampleSource>,
    estimator: Estimator,
    geometry: FieldGeometry,
    render: RenderConfig,
    overlay: OverlayState,
    transform: ViewTransform,
    viewport: Option<PixelRect>,
    fps: FpsCounter,
    receiving: bool,
}

impl DisplayPipeline {
    pub fn new(config: &AppConfig, source: Box<dyn SampleSource>) -> Self {
        let geometry = config.field.geometry.clone();
        Self {
            source,
            estimator: Estimator::new(config.estimator.clone()),
            transform: ViewTransform::baseline(&geometry),
            geometry,
            render: config.render.clone(),
            overlay: OverlayState::new(config.render.overlay_visible),
            viewport: None,
            fps: FpsCounter::default(),
            receiving: false,
        }
    }

    /// Refit the field into `viewport`; returns whether the transform changed.
    pub fn resize(&mut self, viewport: PixelRect) -> bool {
        if self.viewport == Some(viewport) {
            return false;
        }
        self.viewport = Some(viewport);
        self.transform = ViewTransform::fit(&self.geometry, viewport);
        debug!(
            "Viewport {:.0}x{:.0}, scale {:.2} px/m",
            viewport.width, viewport.height, self.transform.scale
        );
        true
    }

    pub fn toggle_overlay(&mut self) {
        let visible = self.overlay.toggle();
        info!("Telemetry overlay {}", if visible { "shown" } else { "hidden" });
    }

    /// Run one tick. `frame_dt` is the wall time since the previous tick (s).
    pub fn tick(&mut self, frame_dt: f64) -> Scene {
        match self.source.poll() {
            Some(raw) => {
                if !self.receiving {
                    info!("Receiving pose telemetry");
                    self.receiving = true;
                }
                self.estimator.update(raw);
            }
            None if self.receiving => {
                warn!("Pose telemetry unavailable, holding last state");
                self.receiving = false;
            }
            None => {}
        }

        let state = self.estimator.current();
        self.overlay.refresh(state);
        self.overlay.set_fps(self.fps.tick(frame_dt));
        build_scene(&state, &self.transform, &self.geometry, &self.overlay, &self.render)
    }

    pub fn state(&self) -> KinematicState {
        self.estimator.current()
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }
}

/// eframe application: input, resize and painting around a [`DisplayPipeline`]
pub struct FieldDisplayApp {
    pipeline: DisplayPipeline,
    texture: egui::TextureHandle,
    last_frame: Instant,
    // Dropped with the app, which stops and joins the producer thread
    _producer: Option<ProducerHandle>,
}

impl FieldDisplayApp {
    pub fn new(
        ctx: &egui::Context,
        config: &AppConfig,
        field: &FieldImage,
        source: Box<dyn SampleSource>,
        producer: Option<ProducerHandle>,
    ) -> Self {
        let texture = ctx.load_texture("field", field.to_color_image(), egui::TextureOptions::LINEAR);
        Self {
            pipeline: DisplayPipeline::new(config, source),
            texture,
            last_frame: Instant::now(),
            _producer: producer,
        }
    }
}

impl eframe::App for FieldDisplayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (toggle, quit) = ctx.input(|i| (i.key_pressed(egui::Key::H), i.key_pressed(egui::Key::Escape)));
        if toggle {
            self.pipeline.toggle_overlay();
        }

        let now = Instant::now();
        let frame_dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                let r = response.rect;
                self.pipeline.resize(PixelRect::new(
                    r.min.x as f64,
                    r.min.y as f64,
                    r.width() as f64,
                    r.height() as f64,
                ));
                let scene = self.pipeline.tick(frame_dt);
                render::paint(&scene, &self.texture, &painter);
            });

        if quit {
            info!("Escape pressed, closing");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        ctx.request_repaint_after(self.pipeline.render_config().frame_interval());
    }
}
