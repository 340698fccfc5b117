pub mod board;
pub mod clearing;
pub mod config;
pub mod game;
pub mod geometry;
pub mod palette;
pub mod provider;
pub mod scoring;
pub mod shape;
pub mod tick;

pub use board::LockedCells;
pub use clearing::{clear_completed_lines, complete_rows};
pub use config::{ConfigError, GameConfig, SpeedCurve};
pub use game::{Game, GameEvent, GameState};
pub use geometry::BoardSize;
pub use palette::{ColorCycle, ShapeColor};
pub use provider::{PieceProvider, RandomPieceProvider, SequencePieceProvider};
pub use scoring::{fall_interval_ms, levels_gained, score_delta};
pub use shape::{Orientation, Shape, ShapeId, ShapeKind};
pub use tick::{tick, Phase, Spawner, TickOutcome};
