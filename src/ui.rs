//! User interface rendering functions for all application screens.

use std::rc::Rc;

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Clear,
    },
    Frame,
};

use crate::{
    app::{MenuItem, Screen},
    engine::RenderRequest,
    types::{Cell, Position, ViewCell},
    App,
};

/// Board cells sorted by how they are painted.
#[derive(Debug, Default)]
struct Layers {
    /// Wall cells, painted green.
    walls: Vec<(f64, f64)>,
    /// Hidden cells of a dark level, painted dark grey.
    fog: Vec<(f64, f64)>,
    /// The goal, painted red.
    goal: Vec<(f64, f64)>,
    /// The player, painted white.
    player: Vec<(f64, f64)>,
}

/// Updates the application UI based on the persistent state.
///
/// This function renders different screens based on the current state stored in the [`App`]
/// structure, dispatching to the appropriate rendering function for each screen type.
///
/// # Errors
///
/// This function may return errors from drawing operations or data conversion failures.
pub(crate) fn draw(app: &App, frame: &mut Frame) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => main_menu(frame, item, app.notice.as_deref()),
        Screen::InGame => in_game(app, frame)?,
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
///
/// This function renders a clear widget over the entire area of the frame to prepare for
/// rendering new content without artifacts from previous buffers rendered on the same frame.
pub(crate) fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Renders the bordered, centred box of a menu with `items` rows.
///
/// Returns one single-line area per row, top to bottom.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn init_menu(frame: &mut Frame, title: &str, items: u16) -> Rc<[Rect]> {
    let space = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Percentage(20),
        Constraint::Percentage(40),
    ])
    .split(frame.area())[1];
    let space = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(20),
        Constraint::Percentage(40),
    ])
    .split(space)[1];

    let layout = Layout::vertical([Constraint::Max(items.saturating_add(2))])
        .flex(Flex::Center)
        .split(space)[0];

    let block = Block::bordered()
        .title(title)
        .title_bottom("(j) down / (k) up / (l) select")
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(layout);

    frame.render_widget(block, layout);

    Layout::vertical(vec![Constraint::Max(1); items.into()]).split(inner_space)
}

/// Renders the main menu screen with navigation options.
///
/// This function displays the main menu with options for "New Game", "Continue", and "Quit". It
/// highlights the currently selected option and shows the pending notice, if any, on the last
/// line of the screen.
pub(crate) fn main_menu(frame: &mut Frame, item: MenuItem, notice: Option<&str>) {
    clear(frame);

    let rows = init_menu(frame, "Maze Game", 3);

    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    for (&row, entry) in rows.iter().zip(MenuItem::ALL) {
        let style = if entry == item {
            active_content_style
        } else {
            content_style
        };
        frame.render_widget(Line::styled(entry.label(), style).centered(), row);
    }

    if let Some(notice) = notice {
        let area = frame.area();
        let bottom = Rect {
            y: area.bottom().saturating_sub(1),
            height: area.height.min(1),
            ..area
        };
        frame.render_widget(notice_line(notice), bottom);
    }
}

/// Renders the in-game screen with the board of the local player.
///
/// This function draws the last board handed out by the engine on a [`Canvas`], with the heading
/// and progress on the surrounding border, the pending notice below it and the key bindings at
/// the bottom.
///
/// # Errors
///
/// This function may return errors if there is no board to draw or from coordinate conversion
/// operations.
pub(crate) fn in_game(app: &App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let render = app.board.as_ref().ok_or_eyre("no board to draw")?;
    let (columns, rows) = render.board.size();
    let columns = u16::try_from(columns)?;
    let rows = u16::try_from(rows)?;

    let overall_layout = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    let content_area = *overall_layout
        .first()
        .ok_or_eyre("failed to get board area from layout")?;
    let notice_area = *overall_layout
        .get(1)
        .ok_or_eyre("failed to get notice area from layout")?;
    let tooltip_area = *overall_layout
        .last()
        .ok_or_eyre("failed to get tooltip area from layout")?;

    let heading = Line::from(render.heading());
    let progress = Line::from(format!("Level: {} | Moves: {}", render.level, render.moves));
    let width = u16::try_from(heading.width().max(progress.width()))?.max(columns);

    let board_area = centred(content_area, width.saturating_add(2), rows.saturating_add(2))?;
    let block = Block::bordered()
        .title(heading)
        .title_bottom(progress)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Rounded);
    let space = block.inner(board_area);
    frame.render_widget(block, board_area);

    let painted = layers(render)?;
    let maze = Canvas::default()
        .x_bounds([
            (-rounded_div::i32(space.width.into(), 2)).into(),
            (rounded_div::i32(space.width.into(), 2)).into(),
        ])
        .y_bounds([
            (-rounded_div::i32(space.height.into(), 2)).into(),
            (rounded_div::i32(space.height.into(), 2)).into(),
        ])
        .marker(Marker::Block)
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &painted.walls,
                color: Color::Green,
            });
            ctx.draw(&Points {
                coords: &painted.fog,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &painted.goal,
                color: Color::Red,
            });
            ctx.draw(&Points {
                coords: &painted.player,
                color: Color::White,
            });
        });
    frame.render_widget(maze, space);

    if let Some(notice) = app.notice.as_deref() {
        frame.render_widget(notice_line(notice), notice_area);
    }

    let tooltip_block = Block::bordered()
        .title("(arrows/wasd) move / (i) status / (x) stop / (h) menu / (q) quit")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);
    frame.render_widget(tooltip_block, tooltip_area);

    Ok(())
}

/// Returns a `width` by `height` rectangle centred in `area`, shrunk to fit.
fn centred(area: Rect, width: u16, height: u16) -> Result<Rect> {
    let column = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(width),
        Constraint::Min(0),
    ])
    .split(area)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get board column from horizontal layout")?;

    Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .split(column)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get board space from vertical layout")
}

/// Styles a notice for the single line it is shown on.
fn notice_line(notice: &str) -> Line<'_> {
    Line::styled(notice, Style::default().fg(Color::Yellow)).centered()
}

/// Sorts every drawn cell of `render` into its paint layer, in canvas coordinates.
///
/// Path cells are left out; the canvas background shows through them.
fn layers(render: &RenderRequest) -> Result<Layers> {
    let (columns, rows) = render.board.size();
    let mut layers = Layers::default();

    for row in 0..rows {
        for col in 0..columns {
            let layer = match render.board.view(Position::new(row, col)) {
                ViewCell::Visible(Cell::Path) => continue,
                ViewCell::Visible(Cell::Wall) => &mut layers.walls,
                ViewCell::Visible(Cell::Goal) => &mut layers.goal,
                ViewCell::Visible(Cell::Player) => &mut layers.player,
                ViewCell::Fog => &mut layers.fog,
            };
            layer.push(to_screen(row, col, columns, rows)?);
        }
    }

    Ok(layers)
}

/// Maps a grid coordinate onto the canvas, whose origin sits in the centre of the board.
fn to_screen(row: usize, col: usize, columns: usize, rows: usize) -> Result<(f64, f64)> {
    let rows_n = f64::from(u16::try_from(rows)?);
    let cols_n = f64::from(u16::try_from(columns)?);

    // Row transformation: coordinate[i] = (n - 1) / 2 - i
    let screen_y = (rows_n - 1.) / 2. - f64::from(u16::try_from(row)?);

    // Column transformation: coordinate[i] = i - (n - 1) / 2
    let screen_x = f64::from(u16::try_from(col)?) - (cols_n - 1.) / 2.;

    Ok((screen_x, screen_y))
}
