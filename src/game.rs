use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::{EngineConfig, GridSize};
use crate::fruit::place_fruit;
use crate::input::{resolve_turn, Direction};
use crate::snake::{Position, Snake};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameStatus {
    NotStarted,
    Running,
    Ended,
}

/// Why a round ended. Only used for diagnostics and the game-over text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EndReason {
    BoundaryViolation,
    SelfCollision,
    /// The snake covers every cell, so no fruit can be placed.
    BoardFull,
}

/// Outcome of one rule evaluation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TickResult {
    Continued(Snapshot),
    Ended,
}

/// Read-only copy of the state handed to the renderer and UI.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snapshot {
    pub grid: GridSize,
    /// Head first.
    pub snake: Vec<Position>,
    pub fruit: Option<Position>,
    pub score: u32,
    pub status: GameStatus,
    pub end_reason: Option<EndReason>,
}

impl Snapshot {
    #[must_use]
    pub fn running(&self) -> bool {
        self.status == GameStatus::Running
    }
}

/// Complete mutable state for one round.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Direction applied on the last tick.
    pub direction: Direction,
    /// Latest requested direction, validated on the next tick.
    pub pending_direction: Direction,
    pub fruit: Option<Position>,
    pub score: u32,
    pub status: GameStatus,
    pub end_reason: Option<EndReason>,
}

/// Owns the board configuration, the random source and the round state.
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: EngineConfig,
    rng: StdRng,
    pub state: GameState,
}

impl GameEngine {
    /// Creates an engine seeded from system entropy.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible runs.
    #[must_use]
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, mut rng: StdRng) -> Self {
        let state = fresh_state(&mut rng, config.grid, GameStatus::NotStarted);
        Self { config, rng, state }
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.config.grid
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.status == GameStatus::Running
    }

    /// Replaces the round with a fresh running one.
    pub fn initialize(&mut self) {
        self.state = fresh_state(&mut self.rng, self.config.grid, GameStatus::Running);
        info!(
            width = self.config.grid.width,
            height = self.config.grid.height,
            fruit = ?self.state.fruit,
            "round started"
        );
    }

    /// Records a turn for the next tick. Last request before the tick wins.
    pub fn request_turn(&mut self, direction: Direction) {
        if !self.is_running() {
            return;
        }

        self.state.pending_direction = direction;
    }

    /// Advances the round by one rule evaluation.
    pub fn tick(&mut self) -> TickResult {
        if !self.is_running() {
            return TickResult::Ended;
        }

        let state = &mut self.state;
        state.direction = resolve_turn(state.direction, state.pending_direction);
        let new_head = state.snake.head().step(state.direction);

        if !new_head.is_within_bounds(self.config.grid) {
            return self.end(EndReason::BoundaryViolation);
        }

        // Checked against the full body, tail included.
        if state.snake.occupies(new_head) {
            return self.end(EndReason::SelfCollision);
        }

        let ate = state.fruit == Some(new_head);
        state.snake.advance(new_head, ate);

        if ate {
            state.score += 1;
            let snake = &state.snake;
            state.fruit = place_fruit(&mut self.rng, self.config.grid, |cell| {
                snake.occupies(cell)
            });
            debug!(score = state.score, len = state.snake.len(), "fruit eaten");

            if state.fruit.is_none() {
                return self.end(EndReason::BoardFull);
            }
        }

        TickResult::Continued(self.snapshot())
    }

    /// Returns a read-only copy of the current round.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.config.grid,
            snake: self.state.snake.segments().copied().collect(),
            fruit: self.state.fruit,
            score: self.state.score,
            status: self.state.status,
            end_reason: self.state.end_reason,
        }
    }

    fn end(&mut self, reason: EndReason) -> TickResult {
        self.state.status = GameStatus::Ended;
        self.state.end_reason = Some(reason);
        info!(?reason, score = self.state.score, "round ended");
        TickResult::Ended
    }
}

fn fresh_state(rng: &mut StdRng, grid: GridSize, status: GameStatus) -> GameState {
    let snake = Snake::new(grid.center());
    let fruit = place_fruit(rng, grid, |cell| snake.occupies(cell));

    GameState {
        snake,
        direction: Direction::Right,
        pending_direction: Direction::Right,
        fruit,
        score: 0,
        status,
        end_reason: None,
    }
}
