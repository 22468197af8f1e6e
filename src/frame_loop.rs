//! Frame-driven game loop.
//!
//! Rendering happens on every frame callback while rules run on a fixed tick
//! interval. At most one tick is evaluated per frame; dropped frames are not
//! caught up.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::game::{GameEngine, Snapshot, TickResult};
use crate::input::Direction;

/// What a frame callback should do.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FrameAction {
    /// Redraw the unchanged state.
    Render,
    /// Evaluate one tick, then redraw.
    TickAndRender,
}

/// Decides on each frame whether enough time has passed for a tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    interval: Duration,
    last_tick_at: Option<Instant>,
}

impl FrameTimer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick_at: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Forgets the last tick; the next frame only records its timestamp.
    pub fn reset(&mut self) {
        self.last_tick_at = None;
    }

    pub fn on_frame(&mut self, now: Instant) -> FrameAction {
        let last = *self.last_tick_at.get_or_insert(now);
        if now.saturating_duration_since(last) < self.interval {
            return FrameAction::Render;
        }

        // Backlog is dropped, not accumulated.
        self.last_tick_at = Some(now);
        FrameAction::TickAndRender
    }
}

/// Handle of one scheduled frame callback.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FrameId(pub u64);

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Requests one future frame callback.
    fn schedule(&mut self) -> FrameId;

    /// Cancels a previously requested frame. Unknown ids are ignored.
    fn cancel(&mut self, id: FrameId);
}

/// Couples an engine with a frame source and the tick cadence.
#[derive(Debug)]
pub struct GameLoop<S> {
    engine: GameEngine,
    timer: FrameTimer,
    scheduler: S,
    pending: Option<FrameId>,
}

impl<S: FrameScheduler> GameLoop<S> {
    #[must_use]
    pub fn new(engine: GameEngine, scheduler: S) -> Self {
        let timer = FrameTimer::new(engine.config().tick_interval);
        Self {
            engine,
            timer,
            scheduler,
            pending: None,
        }
    }

    /// Starts or restarts a round and schedules the first frame.
    pub fn start(&mut self) {
        self.stop();
        self.engine.initialize();
        self.timer.reset();
        self.schedule_next();
    }

    /// Cancels the scheduled frame, if any.
    pub fn stop(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
            debug!(frame = id.0, "frame loop stopped");
        }
    }

    /// Handles one frame callback.
    ///
    /// Returns `None` for frames that are no longer scheduled; otherwise
    /// returns the state to draw.
    pub fn on_frame(&mut self, id: FrameId, now: Instant) -> Option<Snapshot> {
        if self.pending != Some(id) {
            trace!(frame = id.0, "ignoring stale frame");
            return None;
        }
        self.schedule_next();

        if self.timer.on_frame(now) == FrameAction::Render {
            return Some(self.engine.snapshot());
        }

        match self.engine.tick() {
            TickResult::Continued(snapshot) => Some(snapshot),
            TickResult::Ended => {
                self.stop();
                Some(self.engine.snapshot())
            }
        }
    }

    /// Forwards a direction request to the engine.
    pub fn request_turn(&mut self, direction: Direction) {
        self.engine.request_turn(direction);
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    #[must_use]
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn schedule_next(&mut self) {
        self.pending = Some(self.scheduler.schedule());
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::config::{EngineConfig, GridSize};
    use crate::game::{GameEngine, GameStatus};
    use crate::input::Direction;
    use crate::snake::{Position, Snake};

    use super::{FrameAction, FrameId, FrameScheduler, FrameTimer, GameLoop};

    const TICK: Duration = Duration::from_millis(120);

    /// Records requests instead of waiting on a display.
    #[derive(Debug, Default)]
    struct ManualScheduler {
        next_id: u64,
        active: Vec<FrameId>,
        cancelled: Vec<FrameId>,
    }

    impl FrameScheduler for ManualScheduler {
        fn schedule(&mut self) -> FrameId {
            let id = FrameId(self.next_id);
            self.next_id += 1;
            self.active.push(id);
            id
        }

        fn cancel(&mut self, id: FrameId) {
            self.active.retain(|active| *active != id);
            self.cancelled.push(id);
        }
    }

    impl ManualScheduler {
        /// Fires the oldest active frame, as a display refresh would.
        fn fire(&mut self) -> Option<FrameId> {
            if self.active.is_empty() {
                None
            } else {
                Some(self.active.remove(0))
            }
        }
    }

    fn game_loop() -> GameLoop<ManualScheduler> {
        let engine = GameEngine::with_seed(
            EngineConfig {
                grid: GridSize {
                    width: 20,
                    height: 20,
                },
                tick_interval: TICK,
            },
            21,
        );
        GameLoop::new(engine, ManualScheduler::default())
    }

    fn run_frame(game: &mut GameLoop<ManualScheduler>, now: Instant) -> bool {
        let Some(id) = game.scheduler_mut().fire() else {
            return false;
        };
        game.on_frame(id, now).is_some()
    }

    #[test]
    fn timer_waits_for_full_interval() {
        let base = Instant::now();
        let mut timer = FrameTimer::new(TICK);

        assert_eq!(timer.on_frame(base), FrameAction::Render);
        assert_eq!(
            timer.on_frame(base + Duration::from_millis(119)),
            FrameAction::Render
        );
        assert_eq!(timer.on_frame(base + TICK), FrameAction::TickAndRender);
    }

    #[test]
    fn timer_never_catches_up() {
        let base = Instant::now();
        let mut timer = FrameTimer::new(TICK);
        timer.on_frame(base);

        let late = base + TICK * 10;
        assert_eq!(timer.on_frame(late), FrameAction::TickAndRender);
        assert_eq!(timer.on_frame(late), FrameAction::Render);
        assert_eq!(
            timer.on_frame(late + Duration::from_millis(60)),
            FrameAction::Render
        );
        assert_eq!(timer.on_frame(late + TICK), FrameAction::TickAndRender);
    }

    #[test]
    fn timer_reset_restarts_measurement() {
        let base = Instant::now();
        let mut timer = FrameTimer::new(TICK);
        timer.on_frame(base);

        timer.reset();

        assert_eq!(timer.on_frame(base + TICK * 3), FrameAction::Render);
    }

    #[test]
    fn start_schedules_exactly_one_frame() {
        let mut game = game_loop();

        game.start();

        assert!(game.is_scheduled());
        assert_eq!(game.scheduler().active.len(), 1);
        assert_eq!(game.engine().status(), GameStatus::Running);
    }

    #[test]
    fn restart_cancels_previous_frame() {
        let mut game = game_loop();
        game.start();
        let first = game.scheduler().active[0];

        game.start();

        assert_eq!(game.scheduler().cancelled, vec![first]);
        assert_eq!(game.scheduler().active.len(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut game = game_loop();
        game.start();

        game.stop();
        game.stop();

        assert!(!game.is_scheduled());
        assert_eq!(game.scheduler().cancelled.len(), 1);
        assert!(game.scheduler().active.is_empty());
    }

    #[test]
    fn stale_frame_is_ignored() {
        let mut game = game_loop();
        game.start();
        let stale = game.scheduler_mut().fire().expect("frame scheduled");
        game.start();

        assert!(game.on_frame(stale, Instant::now()).is_none());
        assert_eq!(game.scheduler().active.len(), 1);
    }

    #[test]
    fn frames_between_ticks_only_render() {
        let base = Instant::now();
        let mut game = game_loop();
        game.start();
        game.engine_mut().state.fruit = Some(Position { x: 0, y: 0 });

        for ms in [0, 16, 33, 50, 100] {
            assert!(run_frame(&mut game, base + Duration::from_millis(ms)));
        }
        assert_eq!(game.snapshot().snake, vec![Position { x: 10, y: 10 }]);

        assert!(run_frame(&mut game, base + TICK));
        assert_eq!(game.snapshot().snake, vec![Position { x: 11, y: 10 }]);
    }

    #[test]
    fn one_tick_per_frame_after_a_stall() {
        let base = Instant::now();
        let mut game = game_loop();
        game.start();
        game.engine_mut().state.fruit = Some(Position { x: 0, y: 0 });

        run_frame(&mut game, base);
        run_frame(&mut game, base + TICK * 5);

        assert_eq!(game.snapshot().snake, vec![Position { x: 11, y: 10 }]);
    }

    #[test]
    fn turn_is_applied_on_next_tick() {
        let base = Instant::now();
        let mut game = game_loop();
        game.start();
        game.engine_mut().state.fruit = Some(Position { x: 0, y: 0 });
        run_frame(&mut game, base);

        game.request_turn(Direction::Down);
        run_frame(&mut game, base + TICK);

        assert_eq!(game.snapshot().snake, vec![Position { x: 10, y: 11 }]);
    }

    #[test]
    fn game_over_stops_the_loop() {
        let base = Instant::now();
        let mut game = game_loop();
        game.start();
        game.engine_mut().state.snake = Snake::new(Position { x: 19, y: 3 });
        run_frame(&mut game, base);

        assert!(run_frame(&mut game, base + TICK));

        let snapshot = game.snapshot();
        assert!(!snapshot.running());
        assert!(!game.is_scheduled());
        assert!(game.scheduler().active.is_empty());
        assert!(!run_frame(&mut game, base + TICK * 2));
    }

    #[test]
    fn restart_after_game_over_runs_again() {
        let base = Instant::now();
        let mut game = game_loop();
        game.start();
        game.engine_mut().state.snake = Snake::new(Position { x: 19, y: 3 });
        run_frame(&mut game, base);
        run_frame(&mut game, base + TICK);

        game.start();

        assert!(game.is_scheduled());
        assert!(game.snapshot().running());
        assert_eq!(game.snapshot().score, 0);
    }
}
