// patterns.rs - Named seed patterns and a deterministic random seed

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::coord::Coord;

/// A seed shape as `(x, y)` offsets from its top-left corner.
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "Toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "Pulsar",
        cells: &[
            // Top half
            (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
            (0, 2), (5, 2), (7, 2), (12, 2),
            (0, 3), (5, 3), (7, 3), (12, 3),
            (0, 4), (5, 4), (7, 4), (12, 4),
            (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
            // Bottom half (mirrored)
            (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
            (0, 8), (5, 8), (7, 8), (12, 8),
            (0, 9), (5, 9), (7, 9), (12, 9),
            (0, 10), (5, 10), (7, 10), (12, 10),
            (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
        ],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
    Pattern {
        name: "Gosper Glider Gun",
        cells: &[
            (0, 4), (1, 4), (0, 5), (1, 5),
            (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
            (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
            (16, 6), (17, 5), (20, 2), (20, 3), (20, 4), (21, 2), (21, 3),
            (21, 4), (22, 1), (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
];

/// Case-insensitive lookup by name.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Pattern {
    /// Bounding box as `(width, height)`.
    pub fn size(&self) -> (i32, i32) {
        let w = self.cells.iter().map(|&(x, _)| x + 1).max().unwrap_or(0);
        let h = self.cells.iter().map(|&(_, y)| y + 1).max().unwrap_or(0);
        (w, h)
    }

    /// Cells shifted by `origin`. Cells falling outside the grid are dropped.
    pub fn placed_at(&self, origin: Coord, width: i32, height: i32) -> BTreeSet<Coord> {
        self.cells
            .iter()
            .map(|&(x, y)| Coord::new(origin.x + x, origin.y + y))
            .filter(|pos| pos.is_inside(width, height))
            .collect()
    }

    pub fn centered(&self, width: i32, height: i32) -> BTreeSet<Coord> {
        let (w, h) = self.size();
        let origin = Coord::new((width - w).max(0) / 2, (height - h).max(0) / 2);
        self.placed_at(origin, width, height)
    }
}

/// Roughly a third of the cells alive, reproducible for a given `seed_value`.
pub fn random_seed(width: i32, height: i32, seed_value: u32) -> BTreeSet<Coord> {
    // Simple pseudo-random generator
    let mut hasher = DefaultHasher::new();
    seed_value.hash(&mut hasher);
    let mut seed = hasher.finish();

    let mut alive = BTreeSet::new();
    for y in 0..height {
        for x in 0..width {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            if (seed >> 16) % 3 == 0 {
                alive.insert(Coord::new(x, y));
            }
        }
    }
    alive
}
