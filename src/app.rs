//! Core application state of the terminal front end.

use std::io;

use color_eyre::eyre::Result;
use ratatui::DefaultTerminal;

use crate::{
    engine::{Action, ActionRequest, BlockedMove, Engine, RenderRequest, Reply},
    error::EngineError,
    events,
    types::PlayerId,
    ui,
};

/// Enumeration of available application screens.
///
/// This enumeration holds information about the current screen of the game. This is used to
/// determine which screen to render and what actions to take based on user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    /// Main menu screen of the game.
    ///
    /// This variant represents the main menu, carrying the item under the cursor.
    MainMenu(MenuItem),
    /// In-game maze screen.
    ///
    /// This variant represents the screen where the local player's maze is drawn and played.
    InGame,
}

/// Main menu navigation options.
///
/// This enumeration holds the different items in the main menu, in the order they are listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MenuItem {
    /// "New Game" menu option.
    ///
    /// This variant starts a fresh level-one game for the local player.
    NewGame,
    /// "Continue" menu option.
    ///
    /// This variant resumes the saved game of the local player.
    Continue,
    /// "Quit" menu option.
    Quit,
}

impl MenuItem {
    /// Every item, top to bottom.
    pub(crate) const ALL: [Self; 3] = [Self::NewGame, Self::Continue, Self::Quit];

    /// Returns the label shown in the menu.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::NewGame => "New Game",
            Self::Continue => "Continue",
            Self::Quit => "Quit",
        }
    }

    /// Returns the item below, staying on the last one.
    pub(crate) const fn next(self) -> Self {
        match self {
            Self::NewGame => Self::Continue,
            Self::Continue | Self::Quit => Self::Quit,
        }
    }

    /// Returns the item above, staying on the first one.
    pub(crate) const fn previous(self) -> Self {
        match self {
            Self::NewGame | Self::Continue => Self::NewGame,
            Self::Quit => Self::Continue,
        }
    }
}

/// Application state container for the maze game.
///
/// This structure holds the state of the application, which is to say the structure from which
/// Ratatui will render the game and Crossterm events will help writing to. The game itself lives
/// in the [`Engine`]; the application only keeps what the player was last shown.
#[derive(Debug)]
pub struct App {
    /// Application exit flag.
    ///
    /// This field indicates whether the application should exit. It is set to `true` when the user
    /// wants to quit the game but it starts off `false`.
    pub(crate) exit: bool,
    /// Current screen being displayed to the user.
    pub(crate) screen: Screen,
    /// Engine holding every saved game.
    pub(crate) engine: Engine,
    /// Identifier the local games are played under.
    pub(crate) player: PlayerId,
    /// Last board handed out by the engine.
    ///
    /// This field holds what the in-game screen draws. It is replaced whenever the engine answers
    /// with a new render and left alone when a move is blocked.
    pub(crate) board: Option<RenderRequest>,
    /// One-line message shown under the board or the menu.
    ///
    /// This field holds blocked moves, engine errors and failed saves. It is cleared by the next
    /// action that succeeds without anything to report.
    pub(crate) notice: Option<String>,
}

impl App {
    /// Creates the application over `engine`, playing as `player`.
    pub fn new(engine: Engine, player: PlayerId) -> Self {
        Self {
            exit: false,
            screen: Screen::MainMenu(MenuItem::NewGame),
            engine,
            player,
            board: None,
            notice: None,
        }
    }

    /// Runs the main loop of the application.
    ///
    /// This function handles user input and updates the application state. The loop continues until
    /// the exit condition is `true`, after which the function returns to the call site.
    ///
    /// # Errors
    ///
    /// This function returns terminal I/O errors and drawing failures.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal.try_draw(|frame| ui::draw(self, frame).map_err(io::Error::other))?;
            events::handle_events(self)?;
        }

        Ok(())
    }

    /// Sends `action` to the engine on behalf of the local player and records the answer.
    ///
    /// Returns whether the engine accepted the action.
    pub(crate) fn dispatch(&mut self, action: Action) -> bool {
        let request = ActionRequest::new(self.player.clone(), action);

        match self.engine.handle(&request) {
            Ok(committed) => {
                self.notice = committed
                    .durability
                    .as_ref()
                    .err()
                    .map(|err| format!("Progress not saved: {err}"));
                match committed.value {
                    Reply::Render(render) => self.board = Some(render),
                    Reply::Blocked(blocked) => {
                        self.notice = Some(blocked_message(blocked).to_owned());
                    }
                    Reply::Status(status) => {
                        self.notice = Some(format!(
                            "Level: {} | Moves: {} | Size: {}x{}",
                            status.level, status.moves, status.width, status.height
                        ));
                    }
                }
                true
            }
            Err(err) => {
                self.notice = Some(error_message(&err));
                false
            }
        }
    }
}

/// Returns the message shown for a move that did not happen.
const fn blocked_message(blocked: BlockedMove) -> &'static str {
    match blocked {
        BlockedMove::OutOfBounds => "Outside bounds!",
        BlockedMove::HitWall => "You hit a wall!",
    }
}

/// Returns the message shown for an action the engine refused.
fn error_message(err: &EngineError) -> String {
    match err {
        EngineError::AlreadyActive(_) => {
            "You have an active game, pick Continue or stop it with (x).".to_owned()
        }
        EngineError::NoActiveSession(_) => "No active game. Start one with New Game.".to_owned(),
        EngineError::Validation(_) => err.to_string(),
    }
}
