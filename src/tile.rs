//! Tile: a power-of-two value and the colour pair derived from it.

/// Plain RGB triple so the engine does not depend on a rendering crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Background and foreground colour of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileColors {
    pub background: Rgb,
    pub foreground: Rgb,
}

/// Dark text on the light low tiles, light text once the tile turns saturated.
const DARK_FG: Rgb = Rgb(119, 110, 101);
const LIGHT_FG: Rgb = Rgb(249, 246, 242);

/// Background per exponent (index 1 = value 2, ... index 11 = value 2048).
const BACKGROUNDS: [Rgb; 12] = [
    Rgb(205, 193, 180), // unused (value 1)
    Rgb(238, 228, 218), // 2
    Rgb(236, 224, 200), // 4
    Rgb(243, 177, 121), // 8
    Rgb(245, 149, 99),  // 16
    Rgb(246, 124, 95),  // 32
    Rgb(246, 94, 59),   // 64
    Rgb(237, 207, 114), // 128
    Rgb(237, 204, 97),  // 256
    Rgb(237, 200, 80),  // 512
    Rgb(237, 197, 63),  // 1024
    Rgb(237, 194, 46),  // 2048
];

/// Anything past 2048.
const SUPER_BG: Rgb = Rgb(60, 58, 50);

/// A single numbered tile. Owned by exactly one grid cell (or by the falling piece before lock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    value: u32,
}

impl Tile {
    /// Panics unless `value` is a power of two >= 2.
    pub fn new(value: u32) -> Self {
        assert!(
            value >= 2 && value.is_power_of_two(),
            "tile value must be a power of two >= 2, got {value}"
        );
        Self { value }
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.value
    }

    /// Exponent of the value (2 -> 1, 4 -> 2, ...).
    #[inline]
    pub fn exponent(self) -> u32 {
        self.value.trailing_zeros()
    }

    /// The tile produced by merging two tiles of this value.
    pub fn doubled(self) -> Self {
        Self::new(self.value * 2)
    }

    pub fn colors(self) -> TileColors {
        let exp = self.exponent() as usize;
        let background = BACKGROUNDS.get(exp).copied().unwrap_or(SUPER_BG);
        let foreground = if self.value <= 4 { DARK_FG } else { LIGHT_FG };
        TileColors {
            background,
            foreground,
        }
    }
}
