// ui.rs - eframe front end

use std::time::Duration;

use conway_core::{SimulationConfig, patterns};
use eframe::egui;
use log::error;

use crate::config::AppConfig;
use crate::scene::{LifeScene, PreviewScene, Scene};
use crate::view::CellView;

pub struct ConwayApp {
    // `None` only while switching scenes
    scene: Option<Scene>,
    view: CellView,
    config: SimulationConfig,
    last_error: Option<String>,
}

impl ConwayApp {
    pub fn new(config: AppConfig) -> Self {
        let AppConfig { simulation, initial, live_color, dead_color } = config;
        let mut view = CellView::new(simulation.width, simulation.height, live_color, dead_color);
        view.load(initial);
        Self {
            scene: Some(Scene::Preview(PreviewScene::default())),
            view,
            config: simulation,
            last_error: None,
        }
    }

    fn switch_scene(&mut self) {
        let Some(scene) = self.scene.take() else { return };
        self.scene = Some(match scene.next(&self.config, &mut self.view) {
            Ok(next) => next,
            Err(err) => {
                error!("could not start simulation: {err}");
                self.last_error = Some(err.to_string());
                Scene::Preview(PreviewScene::default())
            }
        });
    }

    fn preview_controls(ui: &mut egui::Ui, preview: &mut PreviewScene, view: &mut CellView) {
        ui.horizontal(|ui| {
            if ui.button("▶ Start").clicked() {
                preview.start();
            }

            if ui.button("⏹ Clear").clicked() {
                view.clear();
            }

            if ui.button("🎲 Random").clicked() {
                preview.apply_random_pattern(view);
            }

            ui.separator();

            // Pattern dropdown
            ui.label("Pattern:");
            egui::ComboBox::from_id_source("pattern_selector")
                .selected_text(patterns::PATTERNS[preview.selected_pattern].name)
                .show_ui(ui, |ui| {
                    for (i, pattern) in patterns::PATTERNS.iter().enumerate() {
                        ui.selectable_value(&mut preview.selected_pattern, i, pattern.name);
                    }
                });

            if ui.button("Apply Pattern").clicked() {
                preview.apply_selected_pattern(view);
            }
        });
        ui.label("Click cells to toggle them, then press Start (or Enter).");
    }

    fn life_controls(ui: &mut egui::Ui, life: &mut LifeScene) {
        ui.horizontal(|ui| {
            let button_text = if life.simulation.is_running() { "⏸ Pause" } else { "▶ Resume" };
            if ui.button(button_text).clicked() {
                life.toggle_running();
            }

            if ui.button("⏮ Edit").clicked() {
                life.stop();
            }

            ui.separator();
            ui.label(format!("Generation: {}", life.simulation.generation()));
            if life.simulation.repeated() {
                ui.label("(repeating)");
            }
        });

        // Speed control
        ui.horizontal(|ui| {
            ui.label("Delay:");
            let mut delay_ms = life.simulation.config().generation_interval.as_millis() as u64;
            if ui.add(egui::Slider::new(&mut delay_ms, 0..=1000).suffix(" ms/gen")).changed() {
                life.simulation.set_generation_interval(Duration::from_millis(delay_ms));
            }
        });
        ui.label("Space pauses, Escape returns to the editor.");
    }
}

impl eframe::App for ConwayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let frame_dt = ctx.input(|i| Duration::from_secs_f32(i.stable_dt.max(0.0)));

        if let Some(scene) = self.scene.as_mut() {
            ctx.input(|i| scene.handle_input(i));
            scene.advance(frame_dt, &mut self.view);
        }
        if self.scene.as_ref().is_some_and(Scene::is_done) {
            self.switch_scene();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");

            match self.scene.as_mut() {
                Some(Scene::Preview(preview)) => Self::preview_controls(ui, preview, &mut self.view),
                Some(Scene::Life(life)) => Self::life_controls(ui, life),
                None => {}
            }

            if let Some(message) = &self.last_error {
                ui.colored_label(egui::Color32::LIGHT_RED, message);
            }

            ui.separator();

            // Show current colors
            ui.horizontal(|ui| {
                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.view.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.view.dead_color);
            });

            ui.separator();

            let clicked = self.view.draw(ui);
            if let (Some(pos), Some(Scene::Preview(_))) = (clicked, self.scene.as_ref()) {
                self.view.toggle_at(pos);
                self.last_error = None;
            }

            ui.separator();

            // Statistics
            let total = self.view.width() as usize * self.view.height() as usize;
            let live_cells = self.view.population();
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {live_cells}"));
                ui.label(format!("Dead cells: {}", total - live_cells));
                ui.label(format!("Population: {:.1}%", live_cells as f32 / total as f32 * 100.0));
            });
        });

        // Keep frames coming while a simulation runs
        if matches!(self.scene, Some(Scene::Life(_))) {
            ctx.request_repaint();
        }
    }
}
