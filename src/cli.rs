//! Command-line arguments of the terminal front end.

use std::path::PathBuf;

use clap::Parser;

use crate::{
    config::{
        EngineConfig, DEFAULT_DARK_LEVEL, DEFAULT_MAX_SIDE, DEFAULT_SIDE, DEFAULT_VISIBILITY,
    },
    types::PlayerId,
};

/// Play procedurally generated mazes in the terminal.
///
/// Progress is saved after every move, so a game can be continued after a restart.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file holding every saved game.
    #[arg(long, value_name = "PATH", default_value = "maze_games.json")]
    pub state_file: PathBuf,
    /// Identifier the local games are saved under.
    #[arg(long, value_name = "ID", default_value = "local")]
    pub player: String,
    /// Append log records to this file instead of discarding them.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// Columns of a new game's maze.
    #[arg(long, value_name = "COLUMNS", default_value_t = DEFAULT_SIDE)]
    pub width: usize,
    /// Rows of a new game's maze.
    #[arg(long, value_name = "ROWS", default_value_t = DEFAULT_SIDE)]
    pub height: usize,
    /// Largest number of columns a maze may grow to.
    #[arg(long, value_name = "COLUMNS", default_value_t = DEFAULT_MAX_SIDE)]
    pub max_width: usize,
    /// Largest number of rows a maze may grow to.
    #[arg(long, value_name = "ROWS", default_value_t = DEFAULT_MAX_SIDE)]
    pub max_height: usize,
    /// First level played in the dark.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value_t = DEFAULT_DARK_LEVEL,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub dark_level: u32,
    /// Side of the square visible around the player in the dark.
    #[arg(long, value_name = "CELLS", default_value_t = DEFAULT_VISIBILITY)]
    pub visibility: usize,
    /// Seed making every generated maze reproducible.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// Collects the engine settings out of the arguments.
    ///
    /// The result still has to pass [`EngineConfig::validate`].
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_width: self.width,
            default_height: self.height,
            max_width: self.max_width,
            max_height: self.max_height,
            dark_level: self.dark_level,
            visibility: self.visibility,
            seed: self.seed,
        }
    }

    /// Returns the id local games are saved under.
    pub fn player_id(&self) -> PlayerId {
        PlayerId::new(self.player.as_str())
    }
}
