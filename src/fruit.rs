use rand::Rng;

use crate::config::GridSize;
use crate::snake::Position;

/// Returns every in-bounds cell for which `is_occupied` is false, row by row.
#[must_use]
pub fn free_cells<F>(bounds: GridSize, is_occupied: F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    let mut candidates = Vec::with_capacity(bounds.total_cells());

    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let position = Position { x, y };
            if !is_occupied(position) {
                candidates.push(position);
            }
        }
    }

    candidates
}

/// Random draws tried before scanning the whole board.
const SAMPLE_ATTEMPTS: usize = 64;

/// Picks a uniformly random free cell for the next fruit.
///
/// Draws random cells first and only enumerates the free cells when every
/// draw hits the snake. Returns `None` when every cell is occupied.
#[must_use]
pub fn place_fruit<R, F>(rng: &mut R, bounds: GridSize, is_occupied: F) -> Option<Position>
where
    R: Rng + ?Sized,
    F: Fn(Position) -> bool,
{
    if bounds.total_cells() == 0 {
        return None;
    }

    for _ in 0..SAMPLE_ATTEMPTS {
        let candidate = Position {
            x: rng.gen_range(0..i32::from(bounds.width)),
            y: rng.gen_range(0..i32::from(bounds.height)),
        };
        if !is_occupied(candidate) {
            return Some(candidate);
        }
    }

    let candidates = free_cells(bounds, is_occupied);
    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::GridSize;
    use crate::snake::{Position, Snake};

    use super::{free_cells, place_fruit};

    #[test]
    fn fruit_never_overlaps_snake() {
        let mut rng = StdRng::seed_from_u64(7);
        let snake = Snake::from_segments(vec![
            Position { x: 0, y: 0 },
            Position { x: 1, y: 0 },
            Position { x: 2, y: 0 },
        ])
        .expect("body is valid");
        let bounds = GridSize {
            width: 8,
            height: 6,
        };

        for _ in 0..100 {
            let fruit = place_fruit(&mut rng, bounds, |cell| snake.occupies(cell))
                .expect("board has free cells");
            assert!(!snake.occupies(fruit));
            assert!(fruit.is_within_bounds(bounds));
        }
    }

    #[test]
    fn last_free_cell_is_found() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = GridSize {
            width: 3,
            height: 3,
        };
        let hole = Position { x: 2, y: 1 };
        let occupied: HashSet<Position> = free_cells(bounds, |_| false)
            .into_iter()
            .filter(|cell| *cell != hole)
            .collect();

        for _ in 0..20 {
            assert_eq!(
                place_fruit(&mut rng, bounds, |cell| occupied.contains(&cell)),
                Some(hole)
            );
        }
    }

    #[test]
    fn sparse_large_board_places_fruit_without_a_full_scan() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = GridSize {
            width: 1000,
            height: 1000,
        };
        let lookups = Cell::new(0_usize);

        let fruit = place_fruit(&mut rng, bounds, |cell| {
            lookups.set(lookups.get() + 1);
            cell.y == 0
        })
        .expect("board has free cells");

        assert_ne!(fruit.y, 0);
        assert!(lookups.get() < bounds.total_cells());
    }

    #[test]
    fn full_board_yields_no_fruit() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = GridSize {
            width: 2,
            height: 2,
        };

        assert_eq!(place_fruit(&mut rng, bounds, |_| true), None);
    }

    #[test]
    fn free_cells_covers_empty_board() {
        let bounds = GridSize {
            width: 4,
            height: 3,
        };

        let cells = free_cells(bounds, |_| false);

        assert_eq!(cells.len(), bounds.total_cells());
        assert_eq!(cells.first(), Some(&Position { x: 0, y: 0 }));
        assert_eq!(cells.last(), Some(&Position { x: 3, y: 2 }));
    }
}
