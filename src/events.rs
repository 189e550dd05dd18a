//! Event handling functions for user input and application state updates.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::{
    app::{MenuItem, Screen},
    engine::Action,
    types::Direction,
    App,
};

/// Handles input events and updates the application state accordingly.
///
/// This function polls for keyboard events and dispatches them to the handler of the current
/// screen. It uses a timeout to avoid blocking the UI.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key.code);
            }
        }
    }

    Ok(())
}

/// Routes a key press to the handler of the current screen.
pub(crate) fn handle_key(app: &mut App, code: KeyCode) {
    if code == KeyCode::Char('q') {
        app.exit = true;
        return;
    }

    match app.screen {
        Screen::MainMenu(item) => handle_menu_key(app, item, code),
        Screen::InGame => handle_game_key(app, code),
    }
}

/// Handles keys on the main menu.
///
/// `j` and `k` move the cursor, `l` selects the item under it. The arrow keys and Enter work as
/// well.
fn handle_menu_key(app: &mut App, item: MenuItem, code: KeyCode) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.screen = Screen::MainMenu(item.next()),
        KeyCode::Char('k') | KeyCode::Up => app.screen = Screen::MainMenu(item.previous()),
        KeyCode::Char('l') | KeyCode::Enter => select(app, item),
        _ => {}
    }
}

/// Acts on the selected menu item.
fn select(app: &mut App, item: MenuItem) {
    match item {
        MenuItem::NewGame => {
            if app.dispatch(Action::Start { size: None }) {
                app.screen = Screen::InGame;
            }
        }
        MenuItem::Continue => {
            if app.dispatch(Action::Board) {
                app.screen = Screen::InGame;
            }
        }
        MenuItem::Quit => app.exit = true,
    }
}

/// Handles keys on the in-game screen.
fn handle_game_key(app: &mut App, code: KeyCode) {
    if let Some(direction) = direction_for(code) {
        play(app, Action::Move(direction));
        return;
    }

    match code {
        KeyCode::Char('i') => play(app, Action::Status),
        KeyCode::Char('x') => {
            if app.dispatch(Action::Stop) {
                let summary = app.board.take().map(|board| {
                    format!(
                        "Game ended at level {} after {} move(s).",
                        board.level, board.moves
                    )
                });
                app.notice = app.notice.take().or(summary);
                app.screen = Screen::MainMenu(MenuItem::NewGame);
            }
        }
        KeyCode::Char('h') | KeyCode::Esc => {
            app.notice = None;
            app.screen = Screen::MainMenu(MenuItem::Continue);
        }
        _ => {}
    }
}

/// Sends an in-game action, falling back to the main menu when the game is gone.
fn play(app: &mut App, action: Action) {
    if !app.dispatch(action) {
        app.board = None;
        app.screen = Screen::MainMenu(MenuItem::NewGame);
    }
}

/// Maps the arrow keys and `w`/`a`/`s`/`d` onto move directions.
const fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}
