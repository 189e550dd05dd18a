//! Movement rules, level progression and action dispatch.
//!
//! This module contains the pure [`apply_move`] rule and the [`Engine`], which ties the rule to
//! the shared [`Store`], the maze generator and the fog-of-war viewport. Every engine call takes
//! `&self` and may run concurrently with calls for other players.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    config::EngineConfig,
    error::{EngineError, ValidationError},
    generator::generate,
    grid::Grid,
    store::{Committed, GameSession, Store},
    types::{Cell, Direction, PlayerId, Position, ViewCell},
    visibility::{compute_viewport, Viewport},
};

/// Result of a single move attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The player stepped onto a path cell.
    Moved,
    /// The target cell is a wall; nothing changed.
    HitWall,
    /// The target lies outside the grid; nothing changed.
    OutOfBounds,
    /// The player reached the goal and the next level was generated.
    ReachedGoal,
}

impl MoveOutcome {
    /// Returns whether the move changed the session.
    pub const fn changes_state(self) -> bool {
        matches!(self, Self::Moved | Self::ReachedGoal)
    }
}

/// Applies one move to `session`.
///
/// Walls and the grid edge block the move and leave the session untouched. Stepping on a path
/// cell relocates the player and counts the move. Stepping on the goal advances the level, resets
/// the move counter and replaces the grid with a fresh one two cells larger on each side, capped
/// at the maximum of `limits`. `rng` is only drawn from on a level-up.
///
/// # Panics
///
/// This function panics if the session's grid is already broken, which cannot happen for
/// sessions built by the generator or loaded through [`crate::store::StateFile`].
pub fn apply_move<R: Rng>(
    session: &mut GameSession,
    direction: Direction,
    rng: &mut R,
    limits: &EngineConfig,
) -> MoveOutcome {
    let Some(target) = session.grid.player().step(direction) else {
        return MoveOutcome::OutOfBounds;
    };

    let outcome = match session.grid.get(target) {
        None => return MoveOutcome::OutOfBounds,
        Some(Cell::Wall) => return MoveOutcome::HitWall,
        Some(Cell::Goal) => {
            level_up(session, rng, limits);
            MoveOutcome::ReachedGoal
        }
        Some(Cell::Path | Cell::Player) => {
            session.grid.relocate_player(target);
            session.moves = session.moves.saturating_add(1);
            MoveOutcome::Moved
        }
    };

    if cfg!(debug_assertions) {
        session.grid.assert_invariants();
    }

    outcome
}

/// Moves `session` to the next level on a larger maze.
///
/// # Panics
///
/// This function panics if the grown size is rejected by the generator, which cannot happen
/// because grids are never smaller than the generator's minimum.
fn level_up<R: Rng>(session: &mut GameSession, rng: &mut R, limits: &EngineConfig) {
    let (width, height) = limits.next_size(session.width, session.height);
    let grid = generate(width, height, rng)
        .unwrap_or_else(|err| panic!("level-up size {width}x{height} was rejected: {err}"));

    session.level = session.level.saturating_add(1);
    session.moves = 0;
    session.width = grid.width();
    session.height = grid.height();
    session.grid = grid;
}

/// Reason a move did not happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockedMove {
    /// The target cell is a wall.
    HitWall,
    /// The target lies outside the grid.
    OutOfBounds,
}

/// Move outcome together with the session as it stands afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    /// What the move did.
    pub outcome: MoveOutcome,
    /// Copy of the session after the move.
    pub session: GameSession,
}

/// Something a player asked the engine to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Start a new game, optionally with an explicit `(width, height)`.
    Start {
        /// Requested size; the configured default when absent.
        size: Option<(usize, usize)>,
    },
    /// Move the player one cell.
    Move(Direction),
    /// End the game and discard the session.
    Stop,
    /// Show the board without changing anything.
    Board,
    /// Report progress without changing anything.
    Status,
}

/// An [`Action`] addressed to one player's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRequest {
    /// Player the action belongs to.
    pub player: PlayerId,
    /// What to do.
    pub action: Action,
}

impl ActionRequest {
    /// Addresses `action` to `player`.
    pub fn new<P: Into<PlayerId>>(player: P, action: Action) -> Self {
        Self {
            player: player.into(),
            action,
        }
    }
}

/// What the presentation layer should show in answer to an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Draw the board.
    Render(RenderRequest),
    /// Tell the player the move was blocked; the board did not change.
    Blocked(BlockedMove),
    /// Show the progress summary.
    Status(StatusReport),
}

/// Kind of screen a render belongs to.
///
/// The hint lets each front end pick its own wording; [`TitleHint::text`] carries the stock
/// titles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TitleHint {
    /// A game was just started.
    NewGame,
    /// The player moved.
    Moved,
    /// The player reached the goal and a new level begins.
    LevelComplete,
    /// The game was stopped; this is the final board.
    GameEnded,
    /// The board was requested without acting.
    Board,
}

impl TitleHint {
    /// Returns the stock title for this screen.
    pub const fn text(self) -> &'static str {
        match self {
            Self::NewGame | Self::Moved => "Maze Game",
            Self::LevelComplete => "\u{1f389} Level Complete!",
            Self::GameEnded => "\u{1f6d1} Game Ended",
            Self::Board => "\u{1f300} Maze Board",
        }
    }
}

/// Board as the player is allowed to see it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Board {
    /// The whole grid.
    Full(Grid),
    /// The window around the player on a dark level.
    Dark(Viewport),
}

impl Board {
    /// Returns the `(width, height)` of the underlying grid.
    pub const fn size(&self) -> (usize, usize) {
        match self {
            Self::Full(grid) => (grid.width(), grid.height()),
            Self::Dark(view) => view.grid_size(),
        }
    }

    /// Returns what the player sees at `pos`.
    pub fn view(&self, pos: Position) -> ViewCell {
        match self {
            Self::Full(grid) => grid.get(pos).map_or(ViewCell::Fog, ViewCell::Visible),
            Self::Dark(view) => view.get(pos),
        }
    }
}

/// Everything needed to draw a board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    /// Cells to draw.
    pub board: Board,
    /// Level of the session.
    pub level: u32,
    /// Moves made on the level.
    pub moves: u64,
    /// Kind of screen.
    pub title: TitleHint,
    /// Whether the board is fogged.
    pub dark: bool,
}

impl RenderRequest {
    /// Returns the full title line, with the dark-maze suffix when fogged.
    pub fn heading(&self) -> String {
        if self.dark {
            format!("{} \u{1f311} Dark Maze", self.title.text())
        } else {
            self.title.text().to_owned()
        }
    }
}

/// Progress summary of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusReport {
    /// Current level.
    pub level: u32,
    /// Moves made on the level.
    pub moves: u64,
    /// Width of the current maze.
    pub width: usize,
    /// Height of the current maze.
    pub height: usize,
}

impl From<&GameSession> for StatusReport {
    fn from(session: &GameSession) -> Self {
        Self {
            level: session.level,
            moves: session.moves,
            width: session.width,
            height: session.height,
        }
    }
}

/// Maze engine serving every player of one process.
#[derive(Debug)]
pub struct Engine {
    /// Limits and defaults.
    config: EngineConfig,
    /// Sessions and their durable mirror.
    store: Store,
    /// Master generator; only ever used to seed one generator per maze.
    seeder: Mutex<Pcg32>,
}

impl Engine {
    /// Creates an engine over `store`.
    ///
    /// The master generator is seeded from `config.seed` when set and from the thread-local
    /// generator otherwise.
    ///
    /// # Errors
    ///
    /// This function returns an error if `config` does not validate.
    pub fn new(config: EngineConfig, store: Store) -> Result<Self, ValidationError> {
        config.validate()?;
        let seeder = config
            .seed
            .map_or_else(|| Pcg32::from_rng(&mut rand::rng()), Pcg32::seed_from_u64);

        Ok(Self {
            config,
            store,
            seeder: Mutex::new(seeder),
        })
    }

    /// Returns the engine limits.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the session store.
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Starts a level-one game for `player`.
    ///
    /// # Errors
    ///
    /// This function returns [`EngineError::AlreadyActive`] if the player already has a game and
    /// [`EngineError::Validation`] if `size` is outside the configured range.
    pub fn start(
        &self,
        player: &PlayerId,
        size: Option<(usize, usize)>,
    ) -> Result<Committed<GameSession>, EngineError> {
        let (width, height) =
            size.unwrap_or((self.config.default_width, self.config.default_height));
        self.config.check_size(width, height)?;
        if self.store.contains(player) {
            return Err(EngineError::AlreadyActive(player.clone()));
        }

        let grid = generate(width, height, &mut self.maze_rng())?;
        let session = GameSession::new(grid);
        if self.store.insert_new(player.clone(), session.clone()).is_err() {
            return Err(EngineError::AlreadyActive(player.clone()));
        }
        log::info!("player {player} started a {width}x{height} maze");

        Ok(Committed::new(session, self.store.persist()))
    }

    /// Moves the player of `player` one cell in `direction`.
    ///
    /// Blocked moves are reported through [`MoveReport::outcome`] and are not saved.
    ///
    /// # Errors
    ///
    /// This function returns [`EngineError::NoActiveSession`] if the player has no game.
    pub fn move_player(
        &self,
        player: &PlayerId,
        direction: Direction,
    ) -> Result<Committed<MoveReport>, EngineError> {
        let slot = self
            .store
            .slot(player)
            .ok_or_else(|| EngineError::NoActiveSession(player.clone()))?;

        let report = {
            let mut guard = slot.lock();
            let session = guard
                .as_mut()
                .ok_or_else(|| EngineError::NoActiveSession(player.clone()))?;
            let outcome = apply_move(session, direction, &mut self.maze_rng(), &self.config);

            MoveReport {
                outcome,
                session: session.clone(),
            }
        };

        log::debug!("player {player} moved {direction:?}: {:?}", report.outcome);
        if !report.outcome.changes_state() {
            return Ok(Committed::unchanged(report));
        }
        if report.outcome == MoveOutcome::ReachedGoal {
            log::info!(
                "player {player} reached level {} on a {}x{} maze",
                report.session.level,
                report.session.width,
                report.session.height
            );
        }

        Ok(Committed::new(report, self.store.persist()))
    }

    /// Ends the game of `player` and returns its final state.
    ///
    /// # Errors
    ///
    /// This function returns [`EngineError::NoActiveSession`] if the player has no game.
    pub fn stop(&self, player: &PlayerId) -> Result<Committed<GameSession>, EngineError> {
        let removed = self.store.remove(player);
        let Some(session) = removed.value else {
            return Err(EngineError::NoActiveSession(player.clone()));
        };
        log::info!(
            "player {player} stopped at level {} after {} move(s)",
            session.level,
            session.moves
        );

        Ok(Committed::new(session, removed.durability))
    }

    /// Returns the board of `player` without changing anything.
    ///
    /// # Errors
    ///
    /// This function returns [`EngineError::NoActiveSession`] if the player has no game.
    pub fn board(&self, player: &PlayerId) -> Result<RenderRequest, EngineError> {
        let session = self.session(player)?;

        Ok(self.render(&session, TitleHint::Board))
    }

    /// Returns the progress of `player` without changing anything.
    ///
    /// # Errors
    ///
    /// This function returns [`EngineError::NoActiveSession`] if the player has no game.
    pub fn status(&self, player: &PlayerId) -> Result<StatusReport, EngineError> {
        self.session(player).map(|session| StatusReport::from(&session))
    }

    /// Dispatches `request` and describes what to show in answer.
    ///
    /// # Errors
    ///
    /// This function returns the error of the operation the action maps to.
    pub fn handle(&self, request: &ActionRequest) -> Result<Committed<Reply>, EngineError> {
        let player = &request.player;

        match request.action {
            Action::Start { size } => Ok(self
                .start(player, size)?
                .map(|session| Reply::Render(self.render(&session, TitleHint::NewGame)))),
            Action::Move(direction) => Ok(self.move_player(player, direction)?.map(|report| {
                match report.outcome {
                    MoveOutcome::Moved => {
                        Reply::Render(self.render(&report.session, TitleHint::Moved))
                    }
                    MoveOutcome::ReachedGoal => {
                        Reply::Render(self.render(&report.session, TitleHint::LevelComplete))
                    }
                    MoveOutcome::HitWall => Reply::Blocked(BlockedMove::HitWall),
                    MoveOutcome::OutOfBounds => Reply::Blocked(BlockedMove::OutOfBounds),
                }
            })),
            Action::Stop => Ok(self
                .stop(player)?
                .map(|session| Reply::Render(self.render(&session, TitleHint::GameEnded)))),
            Action::Board => Ok(Committed::unchanged(Reply::Render(self.board(player)?))),
            Action::Status => Ok(Committed::unchanged(Reply::Status(self.status(player)?))),
        }
    }

    /// Builds what `session` looks like to its player.
    pub fn render(&self, session: &GameSession, title: TitleHint) -> RenderRequest {
        let dark = self.config.is_dark(session.level);
        let board = if dark {
            Board::Dark(compute_viewport(
                &session.grid,
                session.grid.player(),
                self.config.visibility,
            ))
        } else {
            Board::Full(session.grid.clone())
        };

        RenderRequest {
            board,
            level: session.level,
            moves: session.moves,
            title,
            dark,
        }
    }

    /// Returns a copy of the session of `player`.
    fn session(&self, player: &PlayerId) -> Result<GameSession, EngineError> {
        self.store
            .get(player)
            .ok_or_else(|| EngineError::NoActiveSession(player.clone()))
    }

    /// Draws a fresh generator for one maze from the master generator.
    fn maze_rng(&self) -> Pcg32 {
        let seed: u64 = self.seeder.lock().random();

        Pcg32::seed_from_u64(seed)
    }
}
