use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::shape::ShapeKind;

/// Upper bound (inclusive) of the random spawn rotation count.
pub const MAX_SPAWN_ROTATIONS: usize = 2;

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// Decides which shape spawns next and how it is turned when it appears.
pub trait PieceProvider {
    fn next_piece(&mut self) -> ShapeKind;

    /// Rotation steps applied to the shape just drawn.
    fn spawn_rotations(&mut self) -> usize {
        0
    }
}

/// Uniform random kinds with 0 to 2 spawn rotations, reproducible from a seed.
pub struct RandomPieceProvider {
    rng: ChaCha8Rng,
    seed: u64,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self::seeded(rand::thread_rng().gen())
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> ShapeKind {
        ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())]
    }

    fn spawn_rotations(&mut self) -> usize {
        self.rng.gen_range(0..=MAX_SPAWN_ROTATIONS)
    }
}

/// Replays a fixed list of kinds, cycling when it runs out. Never rotates at
/// spawn unless built with [`SequencePieceProvider::with_rotations`].
pub struct SequencePieceProvider {
    pieces: Vec<ShapeKind>,
    rotations: Vec<usize>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<ShapeKind>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self {
            pieces,
            rotations: Vec::new(),
            index: 0,
        }
    }

    /// Pairs each kind with its own spawn rotation count.
    pub fn with_rotations(pieces: Vec<(ShapeKind, usize)>) -> Self {
        let (pieces, rotations): (Vec<_>, Vec<_>) = pieces.into_iter().unzip();
        let mut provider = Self::new(pieces);
        provider.rotations = rotations;
        provider
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> ShapeKind {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }

    fn spawn_rotations(&mut self) -> usize {
        // Rotation of the piece drawn last.
        let drawn = self.index.saturating_sub(1);
        if self.rotations.is_empty() {
            0
        } else {
            self.rotations[drawn % self.rotations.len()]
        }
    }
}
