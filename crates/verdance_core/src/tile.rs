//! # Tiles
//!
//! A tile is a terrain kind plus a nutrient level in `[0, 1]`.
//!
//! Only `Ground` and `Vegetated` take part in growth. Every other kind is
//! static for the simulator and acts, at most, as an effect source for its
//! neighbors.

use crate::error::{CoreError, CoreResult};

/// Number of tile kinds on the wire (`0..=7`).
pub const TILE_KIND_COUNT: usize = 8;

/// Terrain kind of a tile.
///
/// Discriminants are the wire values sent to viewers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TileKind {
    /// Bare soil, a growth candidate.
    #[default]
    Ground = 0,
    /// High mountain (rock).
    HighMountain = 1,
    /// Vegetated soil.
    Vegetated = 2,
    /// Mountain (rock).
    Mountain = 3,
    /// Open water.
    Water = 4,
    /// Contamination source (oil spout).
    Contamination = 5,
    /// Concrete.
    Concrete = 6,
    /// Lowlands.
    Lowlands = 7,
}

impl TileKind {
    /// All kinds in wire order.
    pub const ALL: [Self; TILE_KIND_COUNT] = [
        Self::Ground,
        Self::HighMountain,
        Self::Vegetated,
        Self::Mountain,
        Self::Water,
        Self::Contamination,
        Self::Concrete,
        Self::Lowlands,
    ];

    /// Converts from the wire value, `None` outside `0..=7`.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ground),
            1 => Some(Self::HighMountain),
            2 => Some(Self::Vegetated),
            3 => Some(Self::Mountain),
            4 => Some(Self::Water),
            5 => Some(Self::Contamination),
            6 => Some(Self::Concrete),
            7 => Some(Self::Lowlands),
            _ => None,
        }
    }

    /// Converts from an untrusted integer (e.g. a client edit).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKind`] outside `0..=7`.
    pub fn from_raw(value: i64) -> CoreResult<Self> {
        u8::try_from(value)
            .ok()
            .and_then(Self::from_u8)
            .ok_or(CoreError::InvalidKind(value))
    }

    /// Returns the wire value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the kind's position in [`TileKind::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Ground and vegetation carry a living nutrient level.
    #[inline]
    #[must_use]
    pub const fn is_growable(self) -> bool {
        matches!(self, Self::Ground | Self::Vegetated)
    }

    /// Water irrigates its neighborhood.
    #[inline]
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water)
    }

    /// Rock sterilizes its neighborhood.
    #[inline]
    #[must_use]
    pub const fn is_inorganic(self) -> bool {
        matches!(self, Self::Mountain | Self::HighMountain)
    }

    /// Contamination sources poison their immediate neighbors.
    #[inline]
    #[must_use]
    pub const fn is_contamination(self) -> bool {
        matches!(self, Self::Contamination)
    }
}

/// One cell of the world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tile {
    /// Terrain kind.
    pub kind: TileKind,
    /// Nutrient level, always in `[0, 1]`.
    pub nutrient: f64,
}

impl Tile {
    /// Creates a tile, clamping the nutrient into `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn new(kind: TileKind, nutrient: f64) -> Self {
        Self {
            kind,
            nutrient: nutrient.clamp(0.0, 1.0),
        }
    }

    /// Adds (or with a negative amount, removes) nutrient, keeping `[0, 1]`.
    #[inline]
    pub fn add_nutrient(&mut self, amount: f64) {
        self.nutrient = (self.nutrient + amount).clamp(0.0, 1.0);
    }
}
