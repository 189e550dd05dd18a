//! Random maze generation.
//!
//! This module contains a randomized backtracker carving corridors on the odd-coordinate lattice
//! of a wall-filled grid. The traversal keeps its own stack, so memory use is bounded by the grid
//! size no matter how large the mazes grow across levels.

use rand::{
    seq::{IndexedRandom as _, SliceRandom as _},
    Rng, SeedableRng as _,
};
use rand_pcg::Pcg32;

use crate::{
    error::ValidationError,
    grid::{Grid, MIN_SIDE},
    types::{Cell, Direction, Position},
};

/// Generates a maze of `width` columns by `height` rows.
///
/// The player starts on a random odd coordinate and the goal sits on a uniformly chosen path cell
/// other than the start. When the dimensions are odd the result is a perfect maze: every path
/// cell is reachable and there are no cycles.
///
/// Grids too narrow to carve a second cell (3x3, 3x4, 4x4 and the like) get their goal carved
/// right next to the start, through the outer wall if no interior cell is available.
///
/// # Errors
///
/// This function returns [`ValidationError::TooSmall`] if either side is below [`MIN_SIDE`].
/// Smaller sizes are rejected rather than clamped.
///
/// # Panics
///
/// This function panics if the finished grid breaks a structural invariant, which would be a bug
/// in the carving code.
pub fn generate<R: Rng>(
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Grid, ValidationError> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(ValidationError::TooSmall {
            width,
            height,
            min: MIN_SIDE,
        });
    }

    let mut carver = Carver::new(width, height);
    let start = Position::new(
        1 + 2 * rng.random_range(0..(height - 1) / 2),
        1 + 2 * rng.random_range(0..(width - 1) / 2),
    );
    carver.carve_from(start, rng);
    carver.set(start, Cell::Player);
    carver.place_goal(start, rng);

    Ok(carver.into_grid())
}

/// Generates a maze driven by a [`Pcg32`] seeded with `seed`.
///
/// The same seed and dimensions always produce the same grid.
///
/// # Errors
///
/// This function returns the same errors as [`generate`].
pub fn generate_seeded(width: usize, height: usize, seed: u64) -> Result<Grid, ValidationError> {
    generate(width, height, &mut Pcg32::seed_from_u64(seed))
}

/// Mutable cell buffer used while a maze is being carved.
struct Carver {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Cells in row-major order.
    cells: Vec<Cell>,
}

/// Pending work of one cell on the carving stack.
struct Frame {
    /// Cell being expanded.
    pos: Position,
    /// Shuffled directions to try from this cell.
    directions: [Direction; 4],
    /// Index of the next direction to try.
    next: usize,
}

impl Carver {
    /// Creates a buffer filled with walls.
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    /// Seals the buffer into a grid and checks its invariants.
    ///
    /// # Panics
    ///
    /// This function panics if the carved buffer is not a valid maze.
    fn into_grid(self) -> Grid {
        let grid = Grid::from_cells(self.width, self.height, self.cells)
            .unwrap_or_else(|err| panic!("carving produced an invalid grid: {err}"));
        grid.assert_invariants();

        grid
    }

    /// Returns the cell at `pos`, treating anything outside the buffer as a wall.
    fn get(&self, pos: Position) -> Cell {
        if pos.row >= self.height || pos.col >= self.width {
            return Cell::Wall;
        }

        self.cells
            .get(pos.row * self.width + pos.col)
            .copied()
            .unwrap_or(Cell::Wall)
    }

    /// Overwrites the cell at `pos`; positions outside the buffer are ignored.
    fn set(&mut self, pos: Position, cell: Cell) {
        if pos.row >= self.height || pos.col >= self.width {
            return;
        }

        if let Some(slot) = self.cells.get_mut(pos.row * self.width + pos.col) {
            *slot = cell;
        }
    }

    /// Returns whether `pos` lies strictly inside the outer wall.
    const fn is_interior(&self, pos: Position) -> bool {
        pos.row >= 1 && pos.row < self.height - 1 && pos.col >= 1 && pos.col < self.width - 1
    }

    /// Carves every lattice cell reachable from `start`.
    fn carve_from<R: Rng>(&mut self, start: Position, rng: &mut R) {
        self.set(start, Cell::Path);
        let mut stack = vec![Frame::new(start, rng)];

        while let Some(frame) = stack.last_mut() {
            let Some(&direction) = frame.directions.get(frame.next) else {
                let _ = stack.pop();
                continue;
            };
            frame.next += 1;
            let from = frame.pos;

            let Some(between) = from.step(direction) else {
                continue;
            };
            let Some(neighbour) = between.step(direction) else {
                continue;
            };
            if !self.is_interior(neighbour) || self.get(neighbour) != Cell::Wall {
                continue;
            }

            self.set(between, Cell::Path);
            self.set(neighbour, Cell::Path);
            stack.push(Frame::new(neighbour, rng));
        }
    }

    /// Marks the goal on a random path cell other than `start`.
    fn place_goal<R: Rng>(&mut self, start: Position, rng: &mut R) {
        let candidates: Vec<Position> = (1..self.height - 1)
            .flat_map(|row| (1..self.width - 1).map(move |col| Position::new(row, col)))
            .filter(|&pos| pos != start && self.get(pos) == Cell::Path)
            .collect();

        let goal = candidates
            .choose(rng)
            .copied()
            .unwrap_or_else(|| self.beside(start));
        self.set(goal, Cell::Goal);
    }

    /// Picks the cell next to `start` that becomes the goal on a degenerate grid.
    ///
    /// Interior neighbours win over border ones; within each group the order is right, down,
    /// left, up.
    fn beside(&self, start: Position) -> Position {
        let order = [
            Direction::Right,
            Direction::Down,
            Direction::Left,
            Direction::Up,
        ];
        let in_grid: Vec<Position> = order
            .into_iter()
            .filter_map(|direction| start.step(direction))
            .filter(|pos| pos.row < self.height && pos.col < self.width)
            .collect();

        in_grid
            .iter()
            .copied()
            .find(|&pos| self.is_interior(pos))
            .or_else(|| in_grid.first().copied())
            .unwrap_or(start)
    }
}

impl Frame {
    /// Creates a frame for `pos` with freshly shuffled directions.
    fn new<R: Rng>(pos: Position, rng: &mut R) -> Self {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);

        Self {
            pos,
            directions,
            next: 0,
        }
    }
}
