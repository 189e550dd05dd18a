//! Error taxonomy of the maze engine.
//!
//! Expected gameplay conditions (hitting a wall, stepping out of the grid) are not errors; they
//! are [`MoveOutcome`](crate::engine::MoveOutcome) values. Everything here is something the
//! caller has to present or act upon.

#![expect(
    clippy::module_name_repetitions,
    reason = "Error types read best with the Error suffix at the call site."
)]

use std::{io, path::PathBuf};

use crate::types::PlayerId;

/// Rejected input: sizes, directions or configuration values out of range.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A grid dimension is below the minimum of 3.
    #[error("maze size {width}x{height} is too small, both sides must be at least {min}")]
    TooSmall {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Smallest accepted side.
        min: usize,
    },
    /// A grid dimension is above the configured maximum.
    #[error("maze size {width}x{height} exceeds the maximum of {max_width}x{max_height}")]
    TooLarge {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Largest accepted width.
        max_width: usize,
        /// Largest accepted height.
        max_height: usize,
    },
    /// The dark-level viewport was configured with a side of zero.
    #[error("viewport size must be at least 1")]
    ZeroVisibility,
    /// The dark level was configured as zero; levels start at 1.
    #[error("dark level must be at least 1")]
    ZeroDarkLevel,
    /// The default size of a new game does not fit inside the configured maximum.
    #[error("default maze size {width}x{height} does not fit the configured limits")]
    DefaultExceedsMax {
        /// Default width.
        width: usize,
        /// Default height.
        height: usize,
    },
    /// A direction string that is none of up, down, left or right.
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),
}

/// Failure to read or write the durable state file.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The state file exists but could not be read.
    #[error("failed to read state file {path}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The state file or its temporary sibling could not be written or renamed.
    #[error("failed to write state file {path}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The state file is not a valid session mapping.
    #[error("state file {path} is malformed")]
    Malformed {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The session mapping could not be encoded.
    #[error("failed to encode sessions")]
    Encode(#[source] serde_json::Error),
    /// A stored session records dimensions that disagree with its grid.
    #[error("session of player {player} records {width}x{height} but its grid is {grid_width}x{grid_height}")]
    Inconsistent {
        /// Owner of the offending session.
        player: PlayerId,
        /// Recorded width.
        width: usize,
        /// Recorded height.
        height: usize,
        /// Actual grid width.
        grid_width: usize,
        /// Actual grid height.
        grid_height: usize,
    },
    /// A stored grid walls the player off from the goal.
    #[error("session of player {player} holds a maze whose goal cannot be reached")]
    Unreachable {
        /// Owner of the offending session.
        player: PlayerId,
    },
}

/// Rejected engine action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A game was started while the player already has one.
    #[error("player {0} already has an active maze")]
    AlreadyActive(PlayerId),
    /// A move, stop or query was issued without an active game.
    #[error("player {0} has no active maze")]
    NoActiveSession(PlayerId),
    /// The request carried invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
