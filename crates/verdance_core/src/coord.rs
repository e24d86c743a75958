//! # Coordinates and Coordinate Sets
//!
//! `CoordSet` is the index-set primitive of the simulator.
//!
//! ## Design
//!
//! - Dense slot table sized W x H: O(1) insert, remove, contains
//! - Member list for iteration: cost is proportional to members, never to
//!   the grid
//! - Deterministic iteration order (insertion order, perturbed only by
//!   swap-removal), so seeded runs replay exactly

/// A cell position on the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Coord {
    /// Creates a coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to another coordinate.
    #[inline]
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy {
            dx
        } else {
            dy
        }
    }
}

impl From<(u32, u32)> for Coord {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

/// Marker for an empty slot.
const EMPTY: u32 = 0;

/// A set of coordinates within a fixed W x H area.
#[derive(Clone, Debug)]
pub struct CoordSet {
    /// Area width.
    width: u32,
    /// Area height.
    height: u32,
    /// Per-cell slot: 0 when absent, otherwise member position + 1.
    slots: Vec<u32>,
    /// Members in iteration order.
    members: Vec<Coord>,
}

impl CoordSet {
    /// Creates an empty set covering a `width` x `height` area.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            slots: vec![EMPTY; width as usize * height as usize],
            members: Vec::new(),
        }
    }

    /// Slot index of a coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the area: a set is only ever
    /// fed coordinates of its own grid.
    #[inline]
    fn slot(&self, coord: Coord) -> usize {
        assert!(
            coord.x < self.width && coord.y < self.height,
            "coordinate ({}, {}) outside {}x{} set",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y as usize * self.width as usize + coord.x as usize
    }

    /// Inserts a coordinate. Returns `true` if it was not present.
    pub fn insert(&mut self, coord: Coord) -> bool {
        let slot = self.slot(coord);
        if self.slots[slot] != EMPTY {
            return false;
        }
        self.members.push(coord);
        self.slots[slot] = self.members.len() as u32;
        true
    }

    /// Removes a coordinate. Returns `true` if it was present.
    pub fn remove(&mut self, coord: Coord) -> bool {
        let slot = self.slot(coord);
        let position = self.slots[slot];
        if position == EMPTY {
            return false;
        }
        let index = position as usize - 1;
        self.members.swap_remove(index);
        self.slots[slot] = EMPTY;

        // The former last member now lives at `index`.
        if let Some(&moved) = self.members.get(index) {
            let moved_slot = self.slot(moved);
            self.slots[moved_slot] = position;
        }
        true
    }

    /// Inserts or removes so that membership equals `present`.
    #[inline]
    pub fn set(&mut self, coord: Coord, present: bool) {
        if present {
            self.insert(coord);
        } else {
            self.remove(coord);
        }
    }

    /// Returns whether the coordinate is a member.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.slots[self.slot(coord)] != EMPTY
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Removes every member. Cost is proportional to the member count.
    pub fn clear(&mut self) {
        for i in 0..self.members.len() {
            let slot = self.slot(self.members[i]);
            self.slots[slot] = EMPTY;
        }
        self.members.clear();
    }

    /// Iterates over members.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.members.iter().copied()
    }

    /// Members as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Coord] {
        &self.members
    }

    /// Area width this set covers.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Area height this set covers.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl PartialEq for CoordSet {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.len() == other.len()
            && self.iter().all(|coord| other.contains(coord))
    }
}

impl Eq for CoordSet {}
