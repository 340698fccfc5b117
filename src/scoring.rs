use crate::config::SpeedCurve;

// ============================================================================
// Scoring
// ============================================================================

pub const SCORE_SINGLE: u32 = 40;
pub const SCORE_DOUBLE: u32 = 100;
pub const SCORE_TRIPLE: u32 = 300;
pub const SCORE_TETRIS: u32 = 1200;

/// Points for clearing `lines` rows in one step at `level`.
pub fn score_delta(lines: u32, level: u32) -> u32 {
    let base_score = match lines {
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        4 => SCORE_TETRIS,
        _ => 0,
    };
    base_score.saturating_mul(level)
}

// ============================================================================
// Leveling
// ============================================================================

/// Fall interval at `level` on the default speed curve.
///
/// Panics on level 0.
pub fn fall_interval_ms(level: u32) -> f64 {
    SpeedCurve::default().interval_ms(level)
}

/// Whether going from `previous_total` to `new_total` cleared lines crosses a
/// multiple of `lines_per_level`.
pub fn levels_gained(previous_total: u32, new_total: u32, lines_per_level: u32) -> bool {
    assert!(lines_per_level > 0, "lines per level must be positive");
    new_total / lines_per_level > previous_total / lines_per_level
}
