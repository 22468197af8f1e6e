use std::collections::{HashSet, VecDeque};

use crate::config::GridSize;
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns the neighbouring cell in `direction`, which may lie off the board.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Snake body, head first, with a cell index for constant-time lookups.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    cells: HashSet<Position>,
}

impl Snake {
    /// Creates a one-cell snake at `start`.
    #[must_use]
    pub fn new(start: Position) -> Self {
        Self {
            body: VecDeque::from([start]),
            cells: HashSet::from([start]),
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// Returns `None` for an empty body or one that visits a cell twice.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>) -> Option<Self> {
        let cells: HashSet<Position> = segments.iter().copied().collect();
        if segments.is_empty() || cells.len() != segments.len() {
            return None;
        }

        Some(Self {
            body: VecDeque::from(segments),
            cells,
        })
    }

    /// Moves the head onto `new_head`, dropping the tail unless `grow` is set.
    ///
    /// Callers check `occupies(new_head)` first; the body never repeats a cell.
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        debug_assert!(!self.cells.contains(&new_head));

        self.body.push_front(new_head);
        self.cells.insert(new_head);
        if !grow {
            if let Some(tail) = self.body.pop_back() {
                self.cells.remove(&tail);
            }
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the last segment.
    #[must_use]
    pub fn tail(&self) -> Position {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.cells.contains(&position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
