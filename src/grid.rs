//! Maze grid container and its invariants.
//!
//! This module contains the [`Grid`] type, the authoritative rectangular array of cells behind
//! every session. A grid can only be built through a validating constructor, so any value of the
//! type holds exactly one player and exactly one goal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    pathfinding,
    types::{Cell, Position},
};

/// Smallest accepted side of a grid.
///
/// Anything narrower cannot hold a wall border around at least one walkable cell.
pub const MIN_SIDE: usize = 3;

/// Reasons a set of rows does not form a valid grid.
#[expect(
    clippy::module_name_repetitions,
    reason = "Reads better than a bare `Invalid` at call sites."
)]
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGrid {
    /// Fewer than [`MIN_SIDE`] rows or columns.
    #[error("grid is {width}x{height}, both sides must be at least {MIN_SIDE}")]
    TooSmall {
        /// Width of the first row.
        width: usize,
        /// Number of rows.
        height: usize,
    },
    /// A row whose length differs from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A flat buffer whose length does not match the requested dimensions.
    #[error("grid buffer holds {found} cells, expected {expected}")]
    Length {
        /// `width * height`.
        expected: usize,
        /// Actual buffer length.
        found: usize,
    },
    /// The grid does not hold exactly one player.
    #[error("grid holds {0} player cells, expected exactly one")]
    PlayerCount(usize),
    /// The grid does not hold exactly one goal.
    #[error("grid holds {0} goal cells, expected exactly one")]
    GoalCount(usize),
}

/// Rectangular maze grid.
///
/// This structure stores the cells flat in row-major order and caches the coordinates of the
/// player and the goal so that moves never have to scan the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Cell>>", try_from = "Vec<Vec<Cell>>")]
pub struct Grid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Cells in row-major order, `width * height` long.
    cells: Vec<Cell>,
    /// Cached coordinate of the single player cell.
    player: Position,
    /// Cached coordinate of the single goal cell.
    goal: Position,
}

impl Grid {
    /// Builds a grid from a flat row-major cell buffer.
    ///
    /// # Errors
    ///
    /// This function returns an error if the dimensions are below [`MIN_SIDE`], if the buffer
    /// length does not match them, or if the buffer does not hold exactly one player and one goal.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, InvalidGrid> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(InvalidGrid::TooSmall { width, height });
        }
        if let Some((row, found)) = cells
            .chunks(width)
            .map(<[Cell]>::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(InvalidGrid::Ragged {
                row,
                expected: width,
                found,
            });
        }
        if cells.len() != width * height {
            return Err(InvalidGrid::Length {
                expected: width * height,
                found: cells.len(),
            });
        }

        let positions_of = |target: Cell| {
            cells
                .iter()
                .enumerate()
                .filter(move |&(_, &cell)| cell == target)
                .map(move |(idx, _)| Position::new(idx / width, idx % width))
        };
        let players: Vec<Position> = positions_of(Cell::Player).collect();
        let goals: Vec<Position> = positions_of(Cell::Goal).collect();
        let ([player], [goal]) = (players.as_slice(), goals.as_slice()) else {
            return Err(if players.len() == 1 {
                InvalidGrid::GoalCount(goals.len())
            } else {
                InvalidGrid::PlayerCount(players.len())
            });
        };

        Ok(Self {
            width,
            height,
            player: *player,
            goal: *goal,
            cells,
        })
    }

    /// Returns the number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the coordinate of the player.
    pub const fn player(&self) -> Position {
        self.player
    }

    /// Returns the coordinate of the goal.
    pub const fn goal(&self) -> Position {
        self.goal
    }

    /// Returns whether `pos` lies inside the grid.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Returns the cell at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).and_then(|idx| self.cells.get(idx)).copied()
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Counts the cells carrying `target`.
    pub fn count(&self, target: Cell) -> usize {
        self.cells.iter().filter(|&&cell| cell == target).count()
    }

    /// Moves the player marker onto `to`, turning its previous cell back into a path.
    ///
    /// The caller is responsible for checking that `to` is an in-grid path cell; anything else
    /// would break the single-player invariant.
    pub(crate) fn relocate_player(&mut self, to: Position) {
        debug_assert_eq!(
            self.get(to),
            Some(Cell::Path),
            "the player may only be relocated onto a path cell"
        );

        let from = self.player;
        if let Some(cell) = self.index(from).and_then(|idx| self.cells.get_mut(idx)) {
            *cell = Cell::Path;
        }
        if let Some(cell) = self.index(to).and_then(|idx| self.cells.get_mut(idx)) {
            *cell = Cell::Player;
        }
        self.player = to;
    }

    /// Checks every structural invariant of a playable grid.
    ///
    /// # Panics
    ///
    /// This function panics if the grid holds anything but exactly one player and one goal, if
    /// the cached coordinates disagree with the cells, or if the goal cannot be reached from the
    /// player. Any of these is a bug in the generator or the movement code.
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.count(Cell::Player), 1, "grid must hold exactly one player");
        assert_eq!(self.count(Cell::Goal), 1, "grid must hold exactly one goal");
        assert_eq!(
            self.get(self.player),
            Some(Cell::Player),
            "cached player coordinate is stale"
        );
        assert_eq!(
            self.get(self.goal),
            Some(Cell::Goal),
            "cached goal coordinate is stale"
        );
        assert!(
            pathfinding::reachable(self, self.player, self.goal),
            "goal must be reachable from the player"
        );
    }

    /// Converts a coordinate into an index into the flat buffer.
    const fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row * self.width + pos.col)
        } else {
            None
        }
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.rows().map(<[Cell]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = InvalidGrid;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(InvalidGrid::Ragged {
                row,
                expected: width,
                found,
            });
        }

        Self::from_cells(width, height, rows.into_iter().flatten().collect())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.rows().enumerate() {
            if idx > 0 {
                writeln!(formatter)?;
            }
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    write!(formatter, " ")?;
                }
                write!(formatter, "{}", cell.tag())?;
            }
        }

        Ok(())
    }
}
