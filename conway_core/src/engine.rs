// engine.rs - Generation engine
//
// Reads a grid snapshot and describes the next generation as a list of
// changed cells. Never mutates the grid it is given.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use crate::channel::Producer;
use crate::coord::Coord;
use crate::grid::Grid;

/// `true` means the cell became alive, `false` that it died.
pub type CellChange = (Coord, bool);

/// Every cell that changed in one generation, row-major.
pub type DiffBatch = Vec<CellChange>;

/// Wait between publish attempts when the channel is full.
pub const PUBLISH_BACKOFF: Duration = Duration::from_millis(1);

/// Survival / birth thresholds.
///
/// A live cell with fewer than `die_below` or more than `live_above`
/// neighbours dies; a dead cell with exactly `live_above` neighbours is born.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub die_below: u32,
    pub live_above: u32,
}

impl Rule {
    pub const CONWAY: Rule = Rule { die_below: 2, live_above: 3 };

    #[inline]
    pub fn next_state(self, alive: bool, count: u32) -> bool {
        match (alive, count) {
            (true, n) if n < self.die_below || n > self.live_above => false, // Death
            (false, n) if n == self.live_above => true,                      // Birth
            (state, _) => state,                                             // Unchanged
        }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule::CONWAY
    }
}

/// Append the changes of row `y` to `out`.
fn diff_row(grid: &Grid, rule: Rule, y: i32, out: &mut DiffBatch) {
    for x in 0..grid.width() {
        let pos = Coord::new(x, y);
        let alive = grid.is_alive(pos);
        let next = rule.next_state(alive, grid.count_at(pos));
        if next != alive {
            out.push((pos, next));
        }
    }
}

/// Diff between `grid` and its next generation.
pub fn compute_diff(grid: &Grid, rule: Rule) -> DiffBatch {
    let mut diff = DiffBatch::new();
    for y in 0..grid.height() {
        diff_row(grid, rule, y, &mut diff);
    }
    diff
}

/// Reference next generation, computed cell by cell into a fresh grid.
pub fn next_generation(grid: &Grid, rule: Rule) -> Grid {
    let mut next = Grid::new(grid.width(), grid.height());
    for pos in grid.coords() {
        next.set(pos, rule.next_state(grid.is_alive(pos), grid.count_at(pos)));
    }
    next
}

/// Write every change of `diff` into `grid`.
pub fn apply_diff(grid: &mut Grid, diff: &[CellChange]) {
    for &(pos, alive) in diff {
        grid.set(pos, alive);
    }
}

/// Worker side of one generation: compute the diff over `snapshot`, push it
/// into the channel (retrying while full) and hand the producer back.
pub async fn run_generation(
    snapshot: Arc<Grid>,
    rule: Rule,
    mut producer: Producer<DiffBatch>,
) -> Producer<DiffBatch> {
    let mut diff = DiffBatch::new();
    for y in 0..snapshot.height() {
        diff_row(&snapshot, rule, y, &mut diff);
        tokio::task::yield_now().await;
    }
    trace!("generation computed: {} changes", diff.len());

    let mut attempts = 0u32;
    while let Err(rejected) = producer.push(diff) {
        diff = rejected;
        attempts += 1;
        if attempts == 1 {
            debug!("diff channel full, backing off");
        }
        tokio::time::sleep(PUBLISH_BACKOFF).await;
    }
    if attempts > 0 {
        debug!("diff published after {attempts} retries");
    }
    producer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel;

    fn seeded(width: i32, height: i32, cells: &[(i32, i32)]) -> Grid {
        let seed: Vec<Coord> = cells.iter().copied().map(Coord::from).collect();
        Grid::with_seed(width, height, &seed)
    }

    fn change(x: i32, y: i32, alive: bool) -> CellChange {
        (Coord::new(x, y), alive)
    }

    #[test]
    fn conway_rule_table() {
        let rule = Rule::CONWAY;
        for n in 0..=8 {
            assert_eq!(rule.next_state(true, n), n == 2 || n == 3, "alive with {n}");
            assert_eq!(rule.next_state(false, n), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn custom_thresholds() {
        let rule = Rule { die_below: 1, live_above: 2 };
        assert!(rule.next_state(false, 2));
        assert!(!rule.next_state(false, 3));
        assert!(rule.next_state(true, 1));
        assert!(!rule.next_state(true, 3));
    }

    #[test]
    fn blinker_flips_and_back() {
        let mut grid = seeded(5, 5, &[(2, 1), (2, 2), (2, 3)]);

        let first = compute_diff(&grid, Rule::CONWAY);
        assert_eq!(
            first,
            vec![change(2, 1, false), change(1, 2, true), change(3, 2, true), change(2, 3, false)]
        );
        apply_diff(&mut grid, &first);

        let second = compute_diff(&grid, Rule::CONWAY);
        assert_eq!(
            second,
            vec![change(2, 1, true), change(1, 2, false), change(3, 2, false), change(2, 3, true)]
        );
        apply_diff(&mut grid, &second);
        assert_eq!(grid, seeded(5, 5, &[(2, 1), (2, 2), (2, 3)]));
    }

    #[test]
    fn empty_grid_never_changes() {
        let grid = Grid::new(8, 6);
        for _ in 0..5 {
            assert!(compute_diff(&grid, Rule::CONWAY).is_empty());
        }
    }

    #[test]
    fn block_is_a_still_life() {
        let grid = seeded(4, 4, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        assert!(compute_diff(&grid, Rule::CONWAY).is_empty());
    }

    #[test]
    fn diff_matches_reference_for_glider() {
        let mut grid = seeded(10, 10, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        for _ in 0..12 {
            let reference = next_generation(&grid, Rule::CONWAY);
            let diff = compute_diff(&grid, Rule::CONWAY);
            apply_diff(&mut grid, &diff);
            assert_eq!(grid, reference);
            assert!(grid.ghost_ring_is_dead());
        }
    }

    #[test]
    fn edge_cells_see_dead_border() {
        // a horizontal line on the top edge loses its ends and can only grow downwards
        let grid = seeded(3, 3, &[(0, 0), (1, 0), (2, 0)]);
        let diff = compute_diff(&grid, Rule::CONWAY);
        assert_eq!(diff, vec![change(0, 0, false), change(2, 0, false), change(1, 1, true)]);
    }

    #[test]
    fn run_generation_publishes_and_returns_producer() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        let (producer, mut consumer) = channel::bounded::<DiffBatch>(2);
        let grid = Arc::new(seeded(5, 5, &[(2, 1), (2, 2), (2, 3)]));

        let producer = runtime.block_on(run_generation(grid.clone(), Rule::CONWAY, producer));
        assert_eq!(consumer.pop(), Some(compute_diff(&grid, Rule::CONWAY)));
        assert_eq!(consumer.pop(), None);
        drop(producer);
    }

    #[test]
    fn run_generation_waits_for_room() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .expect("runtime");
        let (mut producer, mut consumer) = channel::bounded::<DiffBatch>(2);
        assert!(producer.push(vec![change(0, 0, true)]).is_ok());

        let grid = Arc::new(seeded(3, 3, &[(0, 0)]));
        let handle = runtime.spawn(run_generation(grid, Rule::CONWAY, producer));

        std::thread::sleep(Duration::from_millis(20));
        assert!(!handle.is_finished());
        assert_eq!(consumer.pop(), Some(vec![change(0, 0, true)]));

        let _producer = runtime.block_on(handle).expect("generation task");
        assert_eq!(consumer.pop(), Some(vec![change(0, 0, false)]));
    }
}
