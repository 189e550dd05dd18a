//! Reachability over maze grids.
//!
//! This module contains a breadth-first search over open cells. The generator relies on it to
//! assert that every goal can be reached, and it is also handy to walk a player to the goal.

use std::collections::VecDeque;

use crate::{
    grid::Grid,
    types::{Cell, Direction, Position},
};

/// Returns whether `to` can be reached from `from` moving only through open cells.
pub fn reachable(grid: &Grid, from: Position, to: Position) -> bool {
    route(grid, from, to).is_some()
}

/// Computes a shortest sequence of moves leading from `from` to `to`.
///
/// Walls block the search; every other cell is walkable. The search returns `None` when either
/// endpoint is a wall or lies outside the grid, or when no route exists.
pub fn route(grid: &Grid, from: Position, to: Position) -> Option<Vec<Direction>> {
    if !grid.get(from)?.is_open() || !grid.get(to)?.is_open() {
        return None;
    }

    let width = grid.width();
    let flat = |pos: Position| pos.row * width + pos.col;

    // Each visited cell remembers the step that entered it.
    let mut came_from: Vec<Option<(Position, Direction)>> = vec![None; width * grid.height()];
    let mut visited = vec![false; width * grid.height()];
    let mut queue = VecDeque::from([from]);
    if let Some(seen) = visited.get_mut(flat(from)) {
        *seen = true;
    }

    while let Some(current) = queue.pop_front() {
        if current == to {
            break;
        }

        for direction in Direction::ALL {
            let Some(next) = current.step(direction) else {
                continue;
            };
            if !grid.get(next).is_some_and(Cell::is_open) {
                continue;
            }
            let Some(seen) = visited.get_mut(flat(next)) else {
                continue;
            };
            if *seen {
                continue;
            }

            *seen = true;
            if let Some(entry) = came_from.get_mut(flat(next)) {
                *entry = Some((current, direction));
            }
            queue.push_back(next);
        }
    }

    if !visited.get(flat(to)).copied().unwrap_or_default() {
        return None;
    }

    let mut steps = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let (previous, direction) = came_from.get(flat(cursor)).copied().flatten()?;
        steps.push(direction);
        cursor = previous;
    }
    steps.reverse();

    Some(steps)
}
