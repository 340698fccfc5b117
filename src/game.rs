use std::time::Duration;

use crate::board::LockedCells;
use crate::config::GameConfig;
use crate::geometry::BoardSize;
use crate::palette::{ColorCycle, ShapeColor};
use crate::provider::{PieceProvider, RandomPieceProvider};
use crate::scoring::{levels_gained, score_delta};
use crate::shape::{Shape, ShapeKind};
use crate::tick::{self, Spawner, TickOutcome};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    /// No session yet, or the last one was quit.
    Idle,
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    PieceSpawned(ShapeKind),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Unpaused,
    GameQuit,
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub shapes: Vec<Shape>,
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub state: GameState,
    config: GameConfig,
    soft_drop: bool,
    spawner: Spawner,
    events: Vec<GameEvent>,
}

impl Game {
    /// A game waiting to be started, with pieces drawn from the seeded random
    /// provider.
    pub fn new(config: GameConfig) -> Self {
        let provider = match config.seed {
            Some(seed) => RandomPieceProvider::seeded(seed),
            None => RandomPieceProvider::new(),
        };
        Self::with_provider(config, Box::new(provider))
    }

    pub fn with_provider(config: GameConfig, provider: Box<dyn PieceProvider>) -> Self {
        let spawner = Spawner::new(provider, ColorCycle::new(config.palette.clone()));
        Self {
            shapes: Vec::new(),
            score: 0,
            lines_cleared: 0,
            level: 1,
            state: GameState::Idle,
            config,
            soft_drop: false,
            spawner,
            events: Vec::new(),
        }
    }

    /// A game already in play on a prepared board.
    pub fn with_shapes(config: GameConfig, shapes: Vec<Shape>) -> Self {
        let mut game = Self::new(config);
        game.load_shapes(shapes);
        game
    }

    /// Replaces the board contents and puts the game in play.
    pub fn load_shapes(&mut self, shapes: Vec<Shape>) {
        assert!(
            shapes.iter().all(|shape| shape.board() == self.board()),
            "shapes must live on a {}x{} board",
            self.board().width,
            self.board().height
        );
        self.spawner.skip_past(&shapes);
        self.shapes = shapes;
        self.state = GameState::Playing;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> BoardSize {
        self.config.board
    }

    // ------------------------------------------------------------------------
    // Session control
    // ------------------------------------------------------------------------

    /// Starts a fresh session from `Idle` or `GameOver`.
    pub fn start(&mut self) -> bool {
        if matches!(self.state, GameState::Playing | GameState::Paused) {
            return false;
        }
        self.reset();
        self.state = GameState::Playing;
        self.events.push(GameEvent::GameStarted);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.state = GameState::Paused;
        self.soft_drop = false;
        self.events.push(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.state = GameState::Playing;
        self.events.push(GameEvent::Unpaused);
        true
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => {
                self.pause();
            }
            GameState::Paused => {
                self.resume();
            }
            GameState::Idle | GameState::GameOver => {
                // Nothing to pause
            }
        }
    }

    /// Abandons the session and discards the board.
    pub fn quit(&mut self) {
        self.reset();
        self.state = GameState::Idle;
        self.events.push(GameEvent::GameQuit);
    }

    fn reset(&mut self) {
        self.shapes.clear();
        self.score = 0;
        self.lines_cleared = 0;
        self.level = 1;
        self.soft_drop = false;
        self.spawner.reset();
        self.events.clear();
    }

    // ------------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------------

    /// Runs one simulation step. Does nothing unless the game is playing.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.state != GameState::Playing {
            return None;
        }

        let board = self.board();
        let outcome = tick::tick(board, &mut self.shapes, &mut self.spawner);

        if outcome.game_over {
            self.state = GameState::GameOver;
            self.soft_drop = false;
            self.events.push(GameEvent::GameOver);
            return Some(outcome);
        }

        if let Some(id) = outcome.spawned {
            if let Some(shape) = self.shapes.iter().find(|shape| shape.id() == id) {
                self.events.push(GameEvent::PieceSpawned(shape.kind()));
            }
        }
        for _ in &outcome.locked {
            self.events.push(GameEvent::PieceLocked);
        }
        if outcome.lines_cleared > 0 {
            self.add_score(outcome.lines_cleared);
        }

        Some(outcome)
    }

    /// Books `lines` cleared in one step: score at the current level, then
    /// level up if a threshold was crossed.
    pub fn add_score(&mut self, lines: u32) {
        self.score = self.score.saturating_add(score_delta(lines, self.level));

        let previous_total = self.lines_cleared;
        self.lines_cleared += lines;
        self.events.push(GameEvent::LinesCleared(lines));

        if levels_gained(previous_total, self.lines_cleared, self.config.lines_per_level) {
            self.level += 1;
            self.events.push(GameEvent::LevelUp(self.level));
        }
    }

    // ------------------------------------------------------------------------
    // Player intents
    // ------------------------------------------------------------------------

    pub fn move_left(&mut self) -> bool {
        let moved = self.steer(Shape::move_left);
        if moved {
            self.events.push(GameEvent::PieceMoved);
        }
        moved
    }

    pub fn move_right(&mut self) -> bool {
        let moved = self.steer(Shape::move_right);
        if moved {
            self.events.push(GameEvent::PieceMoved);
        }
        moved
    }

    pub fn rotate(&mut self) -> bool {
        let rotated = self.steer(Shape::rotate);
        if rotated {
            self.events.push(GameEvent::PieceRotated);
        }
        rotated
    }

    /// Applies `action` to every falling shape against the current locked
    /// cells. True if any shape accepted it.
    fn steer(&mut self, action: fn(&mut Shape, &LockedCells) -> bool) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let locked = self.locked_cells();
        let mut any = false;
        for shape in self.shapes.iter_mut().filter(|shape| !shape.is_locked()) {
            any |= action(shape, &locked);
        }
        any
    }

    pub fn begin_soft_drop(&mut self) {
        if self.state == GameState::Playing {
            self.soft_drop = true;
        }
    }

    pub fn end_soft_drop(&mut self) {
        self.soft_drop = false;
    }

    pub fn is_soft_dropping(&self) -> bool {
        self.soft_drop
    }

    // ------------------------------------------------------------------------
    // Timing
    // ------------------------------------------------------------------------

    /// Fall interval of the current level, ignoring soft drop.
    pub fn fall_interval_ms(&self) -> f64 {
        self.config.speed.interval_ms(self.level)
    }

    /// Time until the next tick is due.
    pub fn tick_interval(&self) -> Duration {
        let mut ms = self.fall_interval_ms();
        if self.soft_drop {
            ms *= self.config.soft_drop_factor;
        }
        Duration::from_secs_f64(ms / 1000.0)
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn locked_cells(&self) -> LockedCells {
        LockedCells::of_locked(self.board(), &self.shapes)
    }

    /// The most recently spawned shape that is still falling.
    pub fn active_shape(&self) -> Option<&Shape> {
        self.shapes.iter().rev().find(|shape| !shape.is_locked())
    }

    /// Board rows with the color of whichever shape covers each cell.
    pub fn render_grid(&self) -> Vec<Vec<Option<ShapeColor>>> {
        let board = self.board();
        let mut grid = vec![vec![None; board.width]; board.height];
        for shape in &self.shapes {
            for &cell in shape.cells() {
                grid[board.row_of(cell)][board.column_of(cell)] = Some(shape.color());
            }
        }
        grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_row_complete(&self, row: usize) -> bool {
        self.locked_cells().is_row_complete(row)
    }

    /// Count cells of any shape in a row
    pub fn filled_count_in_row(&self, row: usize) -> usize {
        let board = self.board();
        self.shapes
            .iter()
            .flat_map(|shape| shape.cells())
            .filter(|&&cell| board.row_of(cell) == row)
            .count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.shapes.iter().map(|shape| shape.cells().len()).sum()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::palette::DEFAULT_PALETTE;
    use crate::provider::SequencePieceProvider;
    use crate::shape::{Orientation, ShapeId};

    pub fn board() -> BoardSize {
        BoardSize::default()
    }

    pub fn locked_shape(id: u64, cells: Vec<usize>) -> Shape {
        let mut shape = Shape::with_cells(
            ShapeId(id),
            ShapeKind::O,
            Orientation::Fixed,
            board(),
            cells,
            DEFAULT_PALETTE[0],
        );
        shape.lock();
        shape
    }

    /// A locked shape covering a whole row.
    pub fn locked_row(id: u64, row: usize) -> Shape {
        locked_shape(id, board().row_cells(row).collect())
    }

    pub fn locked_row_with_gap(id: u64, row: usize, gap_column: usize) -> Shape {
        let board = board();
        let cells = board
            .row_cells(row)
            .filter(|&cell| board.column_of(cell) != gap_column)
            .collect();
        locked_shape(id, cells)
    }

    /// An unlocked square with its top-left cell at (row, column).
    pub fn square_at(id: u64, row: usize, column: usize) -> Shape {
        let board = board();
        let top_left = board.index(row, column);
        Shape::with_cells(
            ShapeId(id),
            ShapeKind::O,
            Orientation::Fixed,
            board,
            vec![top_left, top_left + 1, top_left + board.width, top_left + board.width + 1],
            DEFAULT_PALETTE[1],
        )
    }

    /// A started game on the default board drawing `pieces` in order.
    pub fn sequence_game(pieces: Vec<ShapeKind>) -> Game {
        let provider = Box::new(SequencePieceProvider::new(pieces));
        let mut game = Game::with_provider(GameConfig::default(), provider);
        game.start();
        game.take_events();
        game
    }

    pub fn game_with_shapes(shapes: Vec<Shape>) -> Game {
        let provider = Box::new(SequencePieceProvider::new(vec![ShapeKind::O]));
        let mut game = Game::with_provider(GameConfig::default(), provider);
        game.load_shapes(shapes);
        game
    }
}
