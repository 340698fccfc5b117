use crate::board::LockedCells;
use crate::clearing::clear_completed_lines;
use crate::geometry::BoardSize;
use crate::palette::ColorCycle;
use crate::provider::PieceProvider;
use crate::shape::{Shape, ShapeId};

// ============================================================================
// Phases
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Every shape has landed (or there are none): the next tick spawns.
    AwaitingSpawn,
    /// At least one shape is still falling.
    InPlay,
}

impl Phase {
    pub fn of(shapes: &[Shape]) -> Self {
        if shapes.iter().all(Shape::is_locked) {
            Phase::AwaitingSpawn
        } else {
            Phase::InPlay
        }
    }
}

// ============================================================================
// Spawner
// ============================================================================

/// Supplies new shapes: kind and spawn rotation from the provider, color
/// from the palette, and a fresh id.
pub struct Spawner {
    provider: Box<dyn PieceProvider>,
    colors: ColorCycle,
    next_id: u64,
}

impl Spawner {
    pub fn new(provider: Box<dyn PieceProvider>, colors: ColorCycle) -> Self {
        Self {
            provider,
            colors,
            next_id: 0,
        }
    }

    pub fn spawn(&mut self, board: BoardSize) -> Shape {
        let kind = self.provider.next_piece();
        let rotations = self.provider.spawn_rotations();
        let color = self.colors.next_color();
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        Shape::spawn(id, kind, board, color, rotations)
    }

    /// Ids continue above the largest id already on the board.
    pub(crate) fn skip_past(&mut self, shapes: &[Shape]) {
        if let Some(max) = shapes.iter().map(|shape| shape.id().0).max() {
            self.next_id = self.next_id.max(max + 1);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.colors.reset();
        self.next_id = 0;
    }
}

// ============================================================================
// Tick
// ============================================================================

/// What one simulation step changed.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TickOutcome {
    pub spawned: Option<ShapeId>,
    /// Shapes that landed this tick.
    pub locked: Vec<ShapeId>,
    pub lines_cleared: u32,
    /// The new shape overlapped locked cells. Terminal.
    pub game_over: bool,
}

/// Advances the board by one step.
///
/// With every shape landed a new shape spawns; if it would overlap locked
/// cells the step reports game over and leaves the collection untouched.
/// Otherwise every falling shape moves down one row, all of them against the
/// same snapshot of locked cells taken before the step. A shape that fell into
/// the cells of one that landed in the same step is put back and locked too.
/// Complete rows are cleared at the end of every step that did not end the
/// game.
pub fn tick(board: BoardSize, shapes: &mut Vec<Shape>, spawner: &mut Spawner) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    let locked = LockedCells::of_locked(board, shapes);

    match Phase::of(shapes) {
        Phase::AwaitingSpawn => {
            let shape = spawner.spawn(board);
            if locked.overlaps(shape.cells()) {
                outcome.game_over = true;
                return outcome;
            }
            outcome.spawned = Some(shape.id());
            shapes.push(shape);
        }
        Phase::InPlay => {
            let mut fallen = Vec::new();
            for (at, shape) in shapes.iter_mut().enumerate() {
                if shape.is_locked() {
                    continue;
                }
                let before = shape.clone();
                if shape.move_down(&locked) {
                    fallen.push((at, before));
                } else {
                    outcome.locked.push(shape.id());
                }
            }
            land_on_fresh_locks(board, shapes, fallen, &mut outcome.locked);
        }
    }

    outcome.lines_cleared = clear_completed_lines(board, shapes);
    outcome
}

/// Restores and locks every fallen shape that now overlaps a locked one,
/// until none does. Each restored shape can block the one above it in turn.
fn land_on_fresh_locks(
    board: BoardSize,
    shapes: &mut [Shape],
    mut fallen: Vec<(usize, Shape)>,
    landed: &mut Vec<ShapeId>,
) {
    loop {
        let locked = LockedCells::of_locked(board, shapes);
        let Some(position) = fallen
            .iter()
            .position(|(at, _)| locked.overlaps(shapes[*at].cells()))
        else {
            return;
        };
        let (at, mut before) = fallen.swap_remove(position);
        before.lock();
        landed.push(before.id());
        shapes[at] = before;
    }
}
