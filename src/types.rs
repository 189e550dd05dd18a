//! Type definitions shared by the maze engine: cells, directions, positions and player ids.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Single unit of a maze grid.
///
/// This enumeration holds the four tags a grid cell may carry. Durable storage writes each tag as
/// a single character, see [`Cell::tag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Cell {
    /// Impassable cell.
    Wall,
    /// Walkable cell.
    Path,
    /// Cell currently occupied by the player.
    Player,
    /// Cell the player must reach to finish the level.
    Goal,
}

impl Cell {
    /// Returns the character used for this cell in the state file.
    ///
    /// Walls and paths use the dark and light shade block characters, the player is `@` and the
    /// goal is `F`.
    pub const fn tag(self) -> char {
        match self {
            Self::Wall => '\u{2593}',
            Self::Path => '\u{2591}',
            Self::Player => '@',
            Self::Goal => 'F',
        }
    }

    /// Returns whether the player may step onto this cell.
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

impl From<Cell> for char {
    fn from(cell: Cell) -> Self {
        cell.tag()
    }
}

impl TryFrom<char> for Cell {
    type Error = UnknownCellTag;

    fn try_from(tag: char) -> Result<Self, Self::Error> {
        match tag {
            '\u{2593}' => Ok(Self::Wall),
            '\u{2591}' => Ok(Self::Path),
            '@' => Ok(Self::Player),
            'F' => Ok(Self::Goal),
            other => Err(UnknownCellTag(other)),
        }
    }
}

/// Character found in a stored grid that does not name any [`Cell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown cell tag {0:?}")]
pub struct UnknownCellTag(pub char);

/// Cell as seen through a viewport.
///
/// Dark levels only reveal a window around the player; everything else is reported as
/// [`ViewCell::Fog`] regardless of what the grid actually holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewCell {
    /// The real content of a cell inside the visible window.
    Visible(Cell),
    /// Opaque placeholder for any cell outside the visible window.
    Fog,
}

/// Movement direction requested by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// One row towards the top of the grid.
    Up,
    /// One row towards the bottom of the grid.
    Down,
    /// One column towards the left edge.
    Left,
    /// One column towards the right edge.
    Right,
}

impl Direction {
    /// Every direction, in the order used when a fixed iteration order is needed.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the `(row, column)` offset of this direction.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Self::Up),
            "down" | "d" => Ok(Self::Down),
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(ValidationError::UnknownDirection(input.to_owned())),
        }
    }
}

/// Zero-based coordinate inside a grid.
///
/// Rows grow downwards and columns grow to the right, so `(0, 0)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row index, counted from the top.
    pub row: usize,
    /// Column index, counted from the left.
    pub col: usize,
}

impl Position {
    /// Builds a position from a row and a column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the position one step away in `direction`.
    ///
    /// Only the lower bound is checked here; `None` means the step would leave the grid through
    /// the top or the left edge. Upper bounds are the grid's business.
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let (row_delta, col_delta) = direction.delta();
        let Some(row) = self.row.checked_add_signed(row_delta) else {
            return None;
        };
        let Some(col) = self.col.checked_add_signed(col_delta) else {
            return None;
        };

        Some(Self { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "({}, {})", self.row, self.col)
    }
}

/// Stable identifier of a player.
///
/// Chat platforms hand out numeric ids while the state file keys sessions by string, so the id is
/// kept in its string form and numeric ids convert into their decimal representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Builds a player id from anything string-like.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
