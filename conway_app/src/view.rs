// view.rs - Presentation side of the grid
//
// Keeps its own copy of what is on screen, updated only through the
// PresentationSink notifications (or by the editor before a run starts).

use std::collections::BTreeSet;

use conway_core::{Coord, PresentationSink};
use egui::{Color32, Rect, Sense, Stroke, Vec2};

const MAX_BOX_SIZE: f32 = 15.0;
const MIN_BOX_SIZE: f32 = 2.0;
const SPACING: f32 = 0.5;

pub struct CellView {
    width: i32,
    height: i32,
    cells: Vec<bool>,
    initial: BTreeSet<Coord>,
    pub live_color: Color32,
    pub dead_color: Color32,
}

impl CellView {
    pub fn new(width: i32, height: i32, live_color: Color32, dead_color: Color32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
            initial: BTreeSet::new(),
            live_color,
            dead_color,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, pos: Coord) -> Option<usize> {
        pos.is_inside(self.width, self.height)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn is_alive(&self, pos: Coord) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i])
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Cells the next run will start from.
    pub fn initial_alive_cells(&self) -> &BTreeSet<Coord> {
        &self.initial
    }

    /// Flip a cell in the editor. Out-of-range positions are ignored.
    pub fn toggle_at(&mut self, pos: Coord) {
        let Some(i) = self.index(pos) else { return };
        self.cells[i] = !self.cells[i];
        if self.cells[i] {
            self.initial.insert(pos);
        } else {
            self.initial.remove(&pos);
        }
    }

    /// Replace the editor contents with `seed`.
    pub fn load(&mut self, seed: BTreeSet<Coord>) {
        self.initial = seed.into_iter().filter(|p| p.is_inside(self.width, self.height)).collect();
        self.reset_to_initial();
    }

    pub fn clear(&mut self) {
        self.load(BTreeSet::new());
    }

    /// Show the starting cells again, dropping whatever a run changed.
    pub fn reset_to_initial(&mut self) {
        self.cells.fill(false);
        // `initial` only ever holds in-range cells
        let width = self.width as usize;
        for pos in &self.initial {
            self.cells[pos.y as usize * width + pos.x as usize] = true;
        }
    }

    /// Paint the grid; returns the cell under a click, if any.
    pub fn draw(&self, ui: &mut egui::Ui) -> Option<Coord> {
        let columns = self.width as f32;
        let rows = self.height as f32;
        let box_size = (ui.available_width() / columns - SPACING).clamp(MIN_BOX_SIZE, MAX_BOX_SIZE);
        let pitch = box_size + SPACING;

        let start_pos = ui.cursor().min;
        let total_size = Vec2::new(pitch * columns - SPACING, pitch * rows - SPACING);
        let (response, painter) = ui.allocate_painter(total_size, Sense::click());

        // Fill background
        painter.rect_filled(Rect::from_min_size(start_pos, total_size), 0.0, Color32::BLACK);

        for y in 0..self.height {
            for x in 0..self.width {
                let min = egui::pos2(start_pos.x + x as f32 * pitch, start_pos.y + y as f32 * pitch);
                let rect = Rect::from_min_size(min, Vec2::splat(box_size));
                let color = if self.is_alive(Coord::new(x, y)) { self.live_color } else { self.dead_color };
                painter.rect_filled(rect, 1.0, color);
                if box_size >= 6.0 {
                    painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));
                }
            }
        }

        if !response.clicked() {
            return None;
        }
        let pos = response.interact_pointer_pos()? - start_pos;
        let cell = Coord::new((pos.x / pitch).floor() as i32, (pos.y / pitch).floor() as i32);
        cell.is_inside(self.width, self.height).then_some(cell)
    }
}

impl PresentationSink for CellView {
    fn set_alive(&mut self, pos: Coord) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = true;
        }
    }

    fn set_dead(&mut self, pos: Coord) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = false;
        }
    }
}
