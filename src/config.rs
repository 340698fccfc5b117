use std::fmt;

use crate::geometry::{BoardSize, MIN_BOARD_EDGE};
use crate::palette::{ShapeColor, DEFAULT_PALETTE};

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const LINES_PER_LEVEL: u32 = 1;
pub const SOFT_DROP_FACTOR: f64 = 0.30;

// Speed curve (in milliseconds)
pub const BASE_TICK_MS: f64 = 300.0;
pub const TICK_DROP_MS: f64 = 230.0;
pub const LEVEL_OF_MAX_SPEED: u32 = 29;
pub const MIN_TICK_MS: f64 = 100.0;

// ============================================================================
// Speed Curve
// ============================================================================

/// Fall interval as a logarithmically decreasing function of the level,
/// floored at `min_ms`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpeedCurve {
    pub base_ms: f64,
    pub drop_ms: f64,
    pub max_speed_level: u32,
    pub min_ms: f64,
}

impl SpeedCurve {
    /// Panics on level 0, where the curve is undefined.
    pub fn interval_ms(&self, level: u32) -> f64 {
        assert!(level >= 1, "levels start at 1");
        let slope = self.drop_ms / (self.max_speed_level as f64).ln();
        let interval = -slope * (level as f64).ln() + self.base_ms;
        interval.max(self.min_ms)
    }
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            base_ms: BASE_TICK_MS,
            drop_ms: TICK_DROP_MS,
            max_speed_level: LEVEL_OF_MAX_SPEED,
            min_ms: MIN_TICK_MS,
        }
    }
}

// ============================================================================
// Game Configuration
// ============================================================================

#[derive(Clone, PartialEq, Debug)]
pub struct GameConfig {
    pub board: BoardSize,
    pub lines_per_level: u32,
    pub speed: SpeedCurve,
    /// Multiplier applied to the fall interval while soft drop is held.
    pub soft_drop_factor: f64,
    pub palette: Vec<ShapeColor>,
    /// Seed of the piece generator; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardSize { width, height } = self.board;
        if width < MIN_BOARD_EDGE || height < MIN_BOARD_EDGE {
            return Err(ConfigError::BoardTooSmall { width, height });
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }
        let speed = &self.speed;
        if speed.max_speed_level < 2
            || !(speed.min_ms > 0.0)
            || !(speed.base_ms >= speed.min_ms)
            || !speed.drop_ms.is_finite()
        {
            return Err(ConfigError::InvalidSpeedCurve);
        }
        if !(self.soft_drop_factor > 0.0 && self.soft_drop_factor <= 1.0) {
            return Err(ConfigError::InvalidSoftDropFactor(self.soft_drop_factor));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            lines_per_level: LINES_PER_LEVEL,
            speed: SpeedCurve::default(),
            soft_drop_factor: SOFT_DROP_FACTOR,
            palette: DEFAULT_PALETTE.to_vec(),
            seed: None,
        }
    }
}

/// Parses `#RRGGBB` palette entries.
pub fn parse_palette<S: AsRef<str>>(entries: &[S]) -> Result<Vec<ShapeColor>, ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::EmptyPalette);
    }
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            ShapeColor::from_hex(entry).ok_or_else(|| ConfigError::InvalidColor(entry.to_string()))
        })
        .collect()
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Clone, PartialEq, Debug)]
pub enum ConfigError {
    BoardTooSmall { width: usize, height: usize },
    ZeroLinesPerLevel,
    InvalidSpeedCurve,
    InvalidSoftDropFactor(f64),
    EmptyPalette,
    InvalidColor(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BoardTooSmall { width, height } => write!(
                f,
                "board {width}x{height} is too small, both sides must be at least {MIN_BOARD_EDGE}"
            ),
            ConfigError::ZeroLinesPerLevel => write!(f, "lines per level must be at least 1"),
            ConfigError::InvalidSpeedCurve => write!(
                f,
                "speed curve needs a max-speed level of at least 2 and 0 < min <= base interval"
            ),
            ConfigError::InvalidSoftDropFactor(factor) => {
                write!(f, "soft drop factor {factor} is outside (0, 1]")
            }
            ConfigError::EmptyPalette => write!(f, "palette must hold at least one color"),
            ConfigError::InvalidColor(entry) => {
                write!(f, "palette entry {entry:?} is not a #RRGGBB color")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
