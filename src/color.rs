//! Node coloring.
//!
//! Hue and saturation come from the root's palette slot, lightness from how
//! much of the node is wasted: fully wasted nodes are darkest, fully used
//! nodes lightest.

use std::fmt;

/// `(hue, saturation)` pairs, indexed by `id_hash % 4`.
pub const PALETTE: [(u16, u8); 4] = [(5, 51), (210, 61), (120, 40), (283, 41)];

pub const MIN_LIGHTNESS: f64 = 25.0;
pub const MAX_LIGHTNESS: f64 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: f64,
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue,
            self.saturation,
            self.lightness.round()
        )
    }
}

impl Hsl {
    /// Black on light backgrounds, white on dark ones.
    pub fn text_color(&self) -> &'static str {
        if self.lightness > 50.0 { "black" } else { "white" }
    }
}

/// Background color for a node with the given palette key and waste ratio.
pub fn node_color(id_hash: u32, waste_ratio: f64) -> Hsl {
    let (hue, saturation) = PALETTE[(id_hash % PALETTE.len() as u32) as usize];
    let used = 1.0 - waste_ratio.clamp(0.0, 1.0);
    Hsl {
        hue,
        saturation,
        lightness: MIN_LIGHTNESS + (MAX_LIGHTNESS - MIN_LIGHTNESS) * used,
    }
}
