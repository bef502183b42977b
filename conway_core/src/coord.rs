// coord.rs - Cell coordinates

use std::fmt;

/// Position of a cell on the grid. `x` is the column, `y` the row.
///
/// Ordering is lexicographic, x major and y minor, so coordinates can be
/// used directly as `BTreeSet` / `BTreeMap` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The 8 Moore neighbours, row by row starting top-left.
    pub const fn neighbors(self) -> [Coord; 8] {
        let Coord { x, y } = self;
        [
            Coord::new(x - 1, y - 1), Coord::new(x, y - 1), Coord::new(x + 1, y - 1),
            Coord::new(x - 1, y),                           Coord::new(x + 1, y),
            Coord::new(x - 1, y + 1), Coord::new(x, y + 1), Coord::new(x + 1, y + 1),
        ]
    }

    /// True when `0 <= x < width` and `0 <= y < height`.
    pub const fn is_inside(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn ordering_is_x_major() {
        assert!(Coord::new(0, 9) < Coord::new(1, 0));
        assert!(Coord::new(1, 0) < Coord::new(1, 1));
        assert_eq!(Coord::new(2, 3).cmp(&Coord::new(2, 3)), std::cmp::Ordering::Equal);

        let set: BTreeSet<Coord> = [(1, 1), (0, 5), (1, 0)].into_iter().map(Coord::from).collect();
        let ordered: Vec<Coord> = set.into_iter().collect();
        assert_eq!(ordered, vec![Coord::new(0, 5), Coord::new(1, 0), Coord::new(1, 1)]);
    }

    #[test]
    fn neighbors_exclude_self() {
        let c = Coord::new(4, 4);
        let n = c.neighbors();
        assert!(!n.contains(&c));
        assert!(n.iter().all(|p| (p.x - c.x).abs() <= 1 && (p.y - c.y).abs() <= 1));
    }

    #[test]
    fn inside_checks_both_axes() {
        assert!(Coord::new(0, 0).is_inside(3, 2));
        assert!(Coord::new(2, 1).is_inside(3, 2));
        assert!(!Coord::new(3, 1).is_inside(3, 2));
        assert!(!Coord::new(0, -1).is_inside(3, 2));
    }
}
