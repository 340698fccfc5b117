// ============================================================================
// Shape Colors
// ============================================================================

/// Display attribute of a shape. The engine never looks at it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ShapeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl std::fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

pub const DEFAULT_PALETTE: [ShapeColor; 3] = [
    ShapeColor::rgb(0x8E, 0x45, 0x85),
    ShapeColor::rgb(0x47, 0x8B, 0x59),
    ShapeColor::rgb(0x45, 0x59, 0x8E),
];

// ============================================================================
// Color Supply
// ============================================================================

/// Hands out palette colors round-robin.
#[derive(Clone, Debug)]
pub struct ColorCycle {
    colors: Vec<ShapeColor>,
    next: usize,
}

impl ColorCycle {
    pub fn new(colors: Vec<ShapeColor>) -> Self {
        assert!(!colors.is_empty(), "palette must hold at least one color");
        Self { colors, next: 0 }
    }

    pub fn next_color(&mut self) -> ShapeColor {
        if self.next == self.colors.len() {
            self.next = 0;
        }
        let color = self.colors[self.next];
        self.next += 1;
        color
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.to_vec())
    }
}
