// grid.rs - Grid store for Conway's Game of Life
//
// The playing area is surrounded by a one cell deep ghost ring that is
// always dead, so the neighbour sum never needs a bounds check:
//
//   backing size = (width + 2) x (height + 2)
//   active area  = 0..width x 0..height  (stored at 1..=width, 1..=height)

use std::hash::{Hash, Hasher};

use crate::coord::Coord;

/// One cell, kept as a byte so neighbour counts are plain sums.
pub type Cell = u8;

pub const ALIVE: Cell = 1;
pub const DEAD: Cell = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-dead grid. Dimensions are checked by `Simulation::new`; here they
    /// only need to be positive.
    pub fn new(width: i32, height: i32) -> Self {
        debug_assert!(width > 0 && height > 0, "grid must be at least 1x1, got {width}x{height}");
        let len = (width as usize + 2) * (height as usize + 2);
        Self { width, height, cells: vec![DEAD; len] }
    }

    /// Grid with every coordinate of `seed` alive.
    pub fn with_seed<'a>(width: i32, height: i32, seed: impl IntoIterator<Item = &'a Coord>) -> Self {
        let mut grid = Self::new(width, height);
        grid.initialize(seed);
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, pos: Coord) -> usize {
        (pos.y + 1) as usize * (self.width + 2) as usize + (pos.x + 1) as usize
    }

    /// Read a cell. The ghost ring (`-1` and `width` / `height`) is readable.
    #[inline]
    pub fn cell_at(&self, pos: Coord) -> Cell {
        debug_assert!(
            pos.x >= -1 && pos.y >= -1 && pos.x <= self.width && pos.y <= self.height,
            "read at {pos} outside [-1, {}]x[-1, {}]",
            self.width,
            self.height
        );
        self.cells[self.index(pos)]
    }

    /// Mutable access to an active cell. The ghost ring is not writable.
    #[inline]
    pub fn cell_at_mut(&mut self, pos: Coord) -> &mut Cell {
        debug_assert!(
            pos.is_inside(self.width, self.height),
            "write at {pos} outside [0, {})x[0, {})",
            self.width,
            self.height
        );
        let index = self.index(pos);
        &mut self.cells[index]
    }

    pub fn is_alive(&self, pos: Coord) -> bool {
        self.cell_at(pos) == ALIVE
    }

    pub fn set(&mut self, pos: Coord, alive: bool) {
        *self.cell_at_mut(pos) = if alive { ALIVE } else { DEAD };
    }

    /// Clear everything (ghost ring included) and mark `seed` alive.
    pub fn initialize<'a>(&mut self, seed: impl IntoIterator<Item = &'a Coord>) {
        self.cells.fill(DEAD);
        for &pos in seed {
            *self.cell_at_mut(pos) = ALIVE;
        }
    }

    /// Number of live cells in the Moore neighbourhood of `pos`. `pos` must be
    /// an active cell; its neighbours may lie on the ghost ring.
    #[inline]
    pub fn count_at(&self, pos: Coord) -> u32 {
        pos.neighbors().iter().map(|&n| u32::from(self.cell_at(n))).sum()
    }

    /// Active coordinates in row-major order (y outer, x inner).
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    pub fn population(&self) -> usize {
        self.coords().filter(|&pos| self.is_alive(pos)).count()
    }

    pub fn alive_cells(&self) -> Vec<Coord> {
        self.coords().filter(|&pos| self.is_alive(pos)).collect()
    }

    /// Coordinates of the ghost ring, corners included.
    pub fn ghost_ring(&self) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width, self.height);
        let rows = (-1..=width).flat_map(move |x| [Coord::new(x, -1), Coord::new(x, height)]);
        let cols = (0..height).flat_map(move |y| [Coord::new(-1, y), Coord::new(width, y)]);
        rows.chain(cols)
    }

    pub fn ghost_ring_is_dead(&self) -> bool {
        self.ghost_ring().all(|pos| self.cell_at(pos) == DEAD)
    }

    /// Hash of dimensions and cell contents. The ghost ring is always dead so
    /// it does not change the result between generations.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.cells.hash(&mut hasher);
        hasher.finish()
    }
}
