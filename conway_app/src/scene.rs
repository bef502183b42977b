// scene.rs - Editor and simulation scenes
//
// The app is always in exactly one scene. Each answers the same three
// questions: what to do with input, how to advance a frame, and whether it
// wants to hand over to the next scene.

use std::time::Duration;

use conway_core::{Simulation, SimulationConfig, SimulationResult, patterns};
use egui::{InputState, Key};
use log::info;

use crate::view::CellView;

/// Editing the starting cells before a run.
#[derive(Default)]
pub struct PreviewScene {
    pub selected_pattern: usize,
    random_seed: u32,
    done: bool,
}

/// A running (or paused) simulation.
pub struct LifeScene {
    pub simulation: Simulation,
    done: bool,
}

pub enum Scene {
    Preview(PreviewScene),
    Life(LifeScene),
}

impl PreviewScene {
    /// Leave the editor and start a run.
    pub fn start(&mut self) {
        self.done = true;
    }

    pub fn apply_selected_pattern(&self, view: &mut CellView) {
        if let Some(pattern) = patterns::PATTERNS.get(self.selected_pattern) {
            view.load(pattern.centered(view.width(), view.height()));
        }
    }

    pub fn apply_random_pattern(&mut self, view: &mut CellView) {
        view.load(patterns::random_seed(view.width(), view.height(), self.random_seed));
        self.random_seed = self.random_seed.wrapping_add(1);
    }
}

impl LifeScene {
    pub fn new(config: SimulationConfig, view: &CellView) -> SimulationResult<Self> {
        let simulation = Simulation::new(config, view.initial_alive_cells())?;
        Ok(Self { simulation, done: false })
    }

    /// Go back to the editor.
    pub fn stop(&mut self) {
        self.done = true;
    }

    pub fn toggle_running(&mut self) {
        let running = !self.simulation.is_running();
        self.simulation.set_running(running);
    }
}

impl Scene {
    pub fn handle_input(&mut self, input: &InputState) {
        match self {
            Scene::Preview(preview) => {
                if input.key_pressed(Key::Enter) {
                    preview.start();
                }
            }
            Scene::Life(life) => {
                if input.key_pressed(Key::Space) {
                    life.toggle_running();
                }
                if input.key_pressed(Key::Escape) {
                    life.stop();
                }
            }
        }
    }

    pub fn advance(&mut self, frame_dt: Duration, view: &mut CellView) {
        match self {
            // the editor changes cells directly through the view
            Scene::Preview(_) => {}
            Scene::Life(life) => {
                life.simulation.advance(frame_dt, view);
            }
        }
    }

    pub fn is_done(&self) -> bool {
        match self {
            Scene::Preview(preview) => preview.done,
            Scene::Life(life) => life.done,
        }
    }

    /// The scene that follows a finished one. Dropping a `Life` scene joins
    /// its worker before the editor comes back.
    pub fn next(self, config: &SimulationConfig, view: &mut CellView) -> SimulationResult<Scene> {
        match self {
            Scene::Preview(_) => {
                let life = LifeScene::new(config.clone(), view)?;
                info!("run started with {} live cells", view.initial_alive_cells().len());
                Ok(Scene::Life(life))
            }
            Scene::Life(life) => {
                info!("run stopped at generation {}", life.simulation.generation());
                drop(life);
                view.reset_to_initial();
                Ok(Scene::Preview(PreviewScene::default()))
            }
        }
    }
}
