//! Fog-of-war viewport for dark levels.
//!
//! This module contains the pure view transform applied to boards of dark levels. The viewport
//! copies the visible window out of the grid; it never touches the grid itself, so every request
//! derives a fresh view from the authoritative state.

use crate::{
    grid::Grid,
    types::{Cell, Position, ViewCell},
};

/// Visible window of a grid around the player.
///
/// This structure holds a copy of the cells inside the window together with the dimensions of
/// the underlying grid, so callers can either draw the window alone or draw the whole grid with
/// fog outside the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    /// Top-left corner of the window in grid coordinates.
    origin: Position,
    /// Number of visible columns.
    width: usize,
    /// Number of visible rows.
    height: usize,
    /// Width of the grid the window was cut from.
    grid_width: usize,
    /// Height of the grid the window was cut from.
    grid_height: usize,
    /// Visible cells in row-major order.
    cells: Vec<Cell>,
}

impl Viewport {
    /// Returns the top-left grid coordinate of the window.
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Returns the number of visible columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of visible rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the `(width, height)` of the grid behind the window.
    pub const fn grid_size(&self) -> (usize, usize) {
        (self.grid_width, self.grid_height)
    }

    /// Returns whether the grid coordinate `pos` lies inside the window.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.row >= self.origin.row
            && pos.row < self.origin.row + self.height
            && pos.col >= self.origin.col
            && pos.col < self.origin.col + self.width
    }

    /// Returns what the viewer sees at grid coordinate `pos`.
    ///
    /// Anything outside the window, including coordinates beyond the grid, is fog.
    pub fn get(&self, pos: Position) -> ViewCell {
        if !self.contains(pos) {
            return ViewCell::Fog;
        }

        let idx = (pos.row - self.origin.row) * self.width + (pos.col - self.origin.col);
        self.cells
            .get(idx)
            .copied()
            .map_or(ViewCell::Fog, ViewCell::Visible)
    }

    /// Iterates over the rows of the window alone.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }
}

/// Derives the window of side `size` centred on `player`.
///
/// The window spans rows `player.row - (size - 1) / 2` through `player.row + size / 2`
/// inclusive; columns follow the same rule. Odd sizes are therefore symmetric around the player and
/// even sizes reveal the extra row and column below and to the right. The window is clipped at
/// the grid edges, never wrapped or padded, so it shrinks near the border. A `size` of zero is
/// treated as one.
pub fn compute_viewport(grid: &Grid, player: Position, size: usize) -> Viewport {
    let size = size.max(1);
    let reach = (size - 1) / 2;

    let top = player.row.saturating_sub(reach);
    let left = player.col.saturating_sub(reach);
    let bottom = player
        .row
        .saturating_add(size - reach)
        .min(grid.height())
        .max(top);
    let right = player
        .col
        .saturating_add(size - reach)
        .min(grid.width())
        .max(left);

    let cells = (top..bottom)
        .flat_map(|row| (left..right).map(move |col| Position::new(row, col)))
        .map(|pos| grid.get(pos).unwrap_or(Cell::Wall))
        .collect();

    Viewport {
        origin: Position::new(top, left),
        width: right - left,
        height: bottom - top,
        grid_width: grid.width(),
        grid_height: grid.height(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{generator::generate_seeded, grid::tests::grid_from_ascii, types::Direction};

    /// A 9x9 maze with a long corridor around the border.
    fn ring_grid() -> Grid {
        grid_from_ascii(
            "
            #########
            #.......#
            #.#####.#
            #.#...#.#
            #.#.@.#.#
            #.#...#.#
            #.#####.#
            #......F#
            #########
            ",
        )
    }

    #[test]
    fn test_viewport_centred() {
        let grid = ring_grid();
        let view = compute_viewport(&grid, grid.player(), 5);

        assert_eq!(view.origin(), Position::new(2, 2));
        assert_eq!((view.width(), view.height()), (5, 5));
        assert_eq!(view.get(grid.player()), ViewCell::Visible(Cell::Player));
        assert_eq!(view.get(Position::new(2, 2)), ViewCell::Visible(Cell::Wall));
        assert_eq!(view.get(Position::new(1, 1)), ViewCell::Fog, "outside the window");
        assert_eq!(
            view.get(grid.goal()),
            ViewCell::Fog,
            "the goal is hidden even though it exists"
        );
    }

    #[test]
    fn test_viewport_clipped_at_corner() {
        let grid = ring_grid();
        let view = compute_viewport(&grid, Position::new(1, 1), 5);

        assert_eq!(view.origin(), Position::new(0, 0));
        assert_eq!((view.width(), view.height()), (4, 4), "one row and one column fall off");
        assert_eq!(view.rows().count(), 4);
        assert_eq!(view.get(Position::new(4, 4)), ViewCell::Fog);
    }

    #[test]
    fn test_viewport_clipped_at_far_corner() {
        let grid = ring_grid();
        let view = compute_viewport(&grid, grid.goal(), 5);

        assert_eq!(view.origin(), Position::new(5, 5));
        assert_eq!((view.width(), view.height()), (4, 4));
        assert_eq!(view.get(grid.goal()), ViewCell::Visible(Cell::Goal));
        assert_eq!(view.get(Position::new(9, 9)), ViewCell::Fog, "beyond the grid");
    }

    #[test]
    fn test_viewport_even_size_extends_down_right() {
        let grid = ring_grid();
        let view = compute_viewport(&grid, grid.player(), 4);

        assert_eq!(view.origin(), Position::new(3, 3));
        assert_eq!((view.width(), view.height()), (4, 4));
    }

    #[test]
    fn test_viewport_zero_size_shows_player_only() {
        let grid = ring_grid();
        let view = compute_viewport(&grid, grid.player(), 0);

        assert_eq!((view.width(), view.height()), (1, 1));
        assert_eq!(view.get(grid.player()), ViewCell::Visible(Cell::Player));
    }

    #[test]
    fn test_viewport_does_not_mutate_and_recentres() {
        let mut grid = ring_grid();
        let before = grid.clone();
        let first = compute_viewport(&grid, grid.player(), 3);
        assert_eq!(grid, before, "deriving a viewport must leave the grid untouched");

        let target = grid
            .player()
            .step(Direction::Right)
            .expect("the player is away from the left edge");
        grid.relocate_player(target);
        let second = compute_viewport(&grid, grid.player(), 3);

        assert_eq!(first.origin(), Position::new(3, 3));
        assert_eq!(second.origin(), Position::new(3, 4));
        assert_eq!(second.get(target), ViewCell::Visible(Cell::Player));
        assert_eq!(
            second.get(Position::new(4, 4)),
            ViewCell::Visible(Cell::Path),
            "the old player cell is shown as the path it now is"
        );
    }

    proptest! {
        #[test]
        fn prop_viewport_window_matches_grid(
            seed in any::<u64>(),
            half in 2_usize..10,
            size in 1_usize..9,
        ) {
            let side = half * 2 + 1;
            let grid = generate_seeded(side, side, seed).expect("generation should succeed");
            let player = grid.player();
            let view = compute_viewport(&grid, player, size);

            prop_assert!(view.width() <= size && view.height() <= size);
            prop_assert!(view.contains(player));
            for row in 0..side {
                for col in 0..side {
                    let pos = Position::new(row, col);
                    let seen = view.get(pos);
                    if view.contains(pos) {
                        let cell = grid.get(pos).expect("position is inside the grid");
                        prop_assert_eq!(seen, ViewCell::Visible(cell));
                    } else {
                        prop_assert_eq!(seen, ViewCell::Fog);
                    }
                }
            }
        }
    }
}
