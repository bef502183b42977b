// controller.rs - Simulation controller
//
// Driven once per render frame through `Simulation::advance`, which runs
// three steps in a fixed order:
//
// 1. drain: pop at most one diff batch, write it into the grid and
//    forward every change to the presentation sink;
// 2. reclaim: wait for the outstanding generation (if any) to finish
//    publishing and take the channel producer back from it;
// 3. dispatch: start the next generation over a snapshot of the grid.
//
// The worker only ever reads an `Arc<Grid>` snapshot, so drain can mutate
// the live grid while a generation is in flight. Dispatch waits until every
// published batch has been applied, which keeps each generation computed
// from the one before it.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};

use crate::channel::{self, Consumer, Producer};
use crate::coord::Coord;
use crate::engine::{self, DiffBatch, Rule};
use crate::error::{SimulationError, SimulationResult};
use crate::grid::Grid;
use crate::task_slot::TaskSlot;

/// Receives every cell change the controller applies. Coordinates are always
/// inside the grid. Implementations must not touch the grid.
pub trait PresentationSink {
    fn set_alive(&mut self, pos: Coord);
    fn set_dead(&mut self, pos: Coord);
}

/// Sink that ignores every change.
impl PresentationSink for () {
    fn set_alive(&mut self, _pos: Coord) {}
    fn set_dead(&mut self, _pos: Coord) {}
}

/// Recent generations kept for repeat detection.
const HISTORY_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub width: i32,
    pub height: i32,
    pub rule: Rule,
    /// Ring slots in the diff channel (one is always kept free).
    pub channel_capacity: usize,
    /// Minimum time between two dispatches. Zero means every frame.
    pub generation_interval: Duration,
    /// Pause once a generation repeats one of the recent ones.
    pub pause_on_repeat: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            rule: Rule::CONWAY,
            channel_capacity: 51,
            generation_interval: Duration::ZERO,
            pause_on_repeat: false,
        }
    }
}

/// What one call to [`Simulation::advance`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// A batch was drained and applied this frame.
    pub applied: bool,
    /// Cells changed by that batch.
    pub changes: usize,
    /// A computation finished and was reclaimed.
    pub reclaimed: bool,
    /// A new generation was handed to the worker.
    pub dispatched: bool,
}

pub struct Simulation {
    // Declared first so it is dropped first: the outstanding computation is
    // joined before the channel and grid are released.
    worker: TaskSlot<Producer<DiffBatch>>,
    /// Parked here while no computation holds it.
    producer: Option<Producer<DiffBatch>>,
    events: Consumer<DiffBatch>,
    grid: Grid,
    config: SimulationConfig,
    running: bool,
    since_dispatch: Duration,
    /// Batches pushed by reclaimed computations.
    published: u64,
    /// Batches drained and applied.
    generation: u64,
    population: usize,
    grid_history: [u64; HISTORY_LEN],
    history_count: usize,
    repeated: bool,
}

impl Simulation {
    /// Build a running simulation with every coordinate of `seed` alive.
    pub fn new<'a>(
        config: SimulationConfig,
        seed: impl IntoIterator<Item = &'a Coord>,
    ) -> SimulationResult<Self> {
        let SimulationConfig { width, height, channel_capacity, .. } = config;
        if width <= 0 || height <= 0 {
            return Err(SimulationError::InvalidDimensions { width, height });
        }
        if channel_capacity < 2 {
            return Err(SimulationError::InvalidCapacity(channel_capacity));
        }

        let seed: Vec<Coord> = seed.into_iter().copied().collect();
        if let Some(&pos) = seed.iter().find(|pos| !pos.is_inside(width, height)) {
            return Err(SimulationError::SeedOutOfBounds { pos, width, height });
        }

        let grid = Grid::with_seed(width, height, &seed);
        let (producer, events) = channel::bounded(channel_capacity);
        let worker = TaskSlot::new()?;
        let population = grid.population();

        info!("simulation {width}x{height} started with {population} live cells");

        Ok(Self {
            worker,
            producer: Some(producer),
            events,
            grid,
            config,
            running: true,
            since_dispatch: Duration::ZERO,
            published: 0,
            generation: 0,
            population,
            grid_history: [0; HISTORY_LEN],
            history_count: 0,
            repeated: false,
        })
    }

    /// Per-frame entry point: drain, reclaim, dispatch.
    pub fn advance(&mut self, frame_dt: Duration, sink: &mut impl PresentationSink) -> Tick {
        self.since_dispatch = self.since_dispatch.saturating_add(frame_dt);

        let mut tick = Tick::default();
        if let Some(changes) = self.drain(sink) {
            tick.applied = true;
            tick.changes = changes;
        }
        tick.reclaimed = self.reclaim();
        tick.dispatched = self.dispatch();
        tick
    }

    fn drain(&mut self, sink: &mut impl PresentationSink) -> Option<usize> {
        let batch = self.events.pop()?;
        for &(pos, alive) in &batch {
            self.grid.set(pos, alive);
            if alive {
                self.population += 1;
                sink.set_alive(pos);
            } else {
                self.population -= 1;
                sink.set_dead(pos);
            }
        }
        self.generation += 1;
        trace!("generation {} applied: {} changes", self.generation, batch.len());

        if self.check_for_repeat(batch.is_empty()) {
            self.repeated = true;
            if self.config.pause_on_repeat && self.running {
                info!("generation {} repeats a recent state, pausing", self.generation);
                self.running = false;
            }
        }
        Some(batch.len())
    }

    fn reclaim(&mut self) -> bool {
        match self.worker.reclaim() {
            Some(producer) => {
                self.producer = Some(producer);
                self.published += 1;
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self) -> bool {
        if !self.running || self.since_dispatch < self.config.generation_interval {
            return false;
        }
        if self.published != self.generation {
            // the last result is still in the channel; apply it first
            debug!("dispatch deferred: generation {} not applied yet", self.published);
            return false;
        }
        let Some(producer) = self.producer.take() else {
            return false;
        };

        let snapshot = Arc::new(self.grid.clone());
        self.worker.dispatch(engine::run_generation(snapshot, self.config.rule, producer));
        self.since_dispatch = Duration::ZERO;
        true
    }

    fn check_for_repeat(&mut self, unchanged: bool) -> bool {
        let current_hash = self.grid.fingerprint();
        let seen = unchanged || self.grid_history.iter().take(self.history_count).any(|&h| h == current_hash);
        self.grid_history[self.history_count % HISTORY_LEN] = current_hash;
        self.history_count += 1;
        seen
    }

    pub fn set_running(&mut self, running: bool) {
        if running && !self.running {
            self.history_count = 0;
            self.repeated = false;
        }
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_generation_interval(&mut self, interval: Duration) {
        self.config.generation_interval = interval;
    }

    /// Generations applied to the grid so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Live cells in the grid.
    pub fn population(&self) -> usize {
        self.population
    }

    /// Whether a recent generation repeated an earlier state.
    pub fn repeated(&self) -> bool {
        self.repeated
    }

    /// Computations dispatched but not yet reclaimed: never more than 1.
    pub fn outstanding(&self) -> usize {
        self.worker.outstanding()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("generation", &self.generation)
            .field("population", &self.population)
            .field("running", &self.running)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Cells(BTreeMap<Coord, bool>);

    impl PresentationSink for Cells {
        fn set_alive(&mut self, pos: Coord) {
            self.0.insert(pos, true);
        }
        fn set_dead(&mut self, pos: Coord) {
            self.0.insert(pos, false);
        }
    }

    fn blinker() -> Vec<Coord> {
        vec![Coord::new(2, 1), Coord::new(2, 2), Coord::new(2, 3)]
    }

    fn config(width: i32, height: i32) -> SimulationConfig {
        SimulationConfig { width, height, ..SimulationConfig::default() }
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(matches!(
            Simulation::new(config(0, 5), &[]),
            Err(SimulationError::InvalidDimensions { width: 0, height: 5 })
        ));
        assert!(matches!(
            Simulation::new(config(5, 5), &[Coord::new(5, 0)]),
            Err(SimulationError::SeedOutOfBounds { .. })
        ));
        let tiny = SimulationConfig { channel_capacity: 1, ..config(5, 5) };
        assert!(matches!(Simulation::new(tiny, &[]), Err(SimulationError::InvalidCapacity(1))));
    }

    #[test]
    fn first_frame_only_dispatches() {
        let mut sim = Simulation::new(config(5, 5), &blinker()).expect("simulation");
        let tick = sim.advance(Duration::from_millis(16), &mut ());
        assert_eq!(tick, Tick { dispatched: true, ..Tick::default() });
        assert_eq!(sim.outstanding(), 1);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn blinker_reaches_the_sink() {
        let mut sim = Simulation::new(config(5, 5), &blinker()).expect("simulation");
        let mut sink = Cells::default();
        while sim.generation() < 1 {
            sim.advance(Duration::ZERO, &mut sink);
        }
        let expected: BTreeMap<Coord, bool> = [
            (Coord::new(1, 2), true),
            (Coord::new(2, 1), false),
            (Coord::new(2, 3), false),
            (Coord::new(3, 2), true),
        ]
        .into_iter()
        .collect();
        assert_eq!(sink.0, expected);
        assert_eq!(sim.population(), 3);
        assert!(sim.grid().is_alive(Coord::new(1, 2)));
    }

    #[test]
    fn paused_simulation_does_not_dispatch() {
        let mut sim = Simulation::new(config(5, 5), &blinker()).expect("simulation");
        sim.set_running(false);
        for _ in 0..5 {
            let tick = sim.advance(Duration::from_millis(16), &mut ());
            assert!(!tick.dispatched);
        }
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.outstanding(), 0);
    }

    #[test]
    fn interval_limits_dispatch_rate() {
        let cfg = SimulationConfig { generation_interval: Duration::from_millis(100), ..config(5, 5) };
        let mut sim = Simulation::new(cfg, &blinker()).expect("simulation");
        let frame = Duration::from_millis(40);
        let dispatched: Vec<bool> = (0..6).map(|_| sim.advance(frame, &mut ()).dispatched).collect();
        // 40, 80, 120 -> dispatch, 40, 80, 120 -> dispatch
        assert_eq!(dispatched, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn pauses_on_repeat_when_asked() {
        let cfg = SimulationConfig { pause_on_repeat: true, ..config(5, 5) };
        let mut sim = Simulation::new(cfg, &blinker()).expect("simulation");
        for _ in 0..50 {
            sim.advance(Duration::ZERO, &mut ());
        }
        assert!(!sim.is_running());
        assert!(sim.repeated());
        // period two: the third state equals the first recorded one
        assert_eq!(sim.generation(), 3);
    }
}
