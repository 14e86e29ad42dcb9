//! Sighting history for interrupted chases

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a target was last seen and which way it was moving around us.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Last known target position
    pub location: Vec2,
    /// Spin direction for the search sweep (+1 counter-clockwise, -1 clockwise)
    pub direction: i32,
}

impl Sighting {
    #[must_use]
    pub fn new(location: Vec2, direction: i32) -> Self {
        Self {
            location,
            direction,
        }
    }
}

/// LIFO stack of sightings, one per time a target slipped out of view.
///
/// Nested entries appear when a target is reacquired and lost again before
/// the earlier search finished. Most chases never go more than a few deep,
/// so the first entries live inline.
#[derive(Debug, Clone, Default)]
pub struct SightingStack {
    entries: SmallVec<[Sighting; 4]>,
}

impl SightingStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sighting: Sighting) {
        self.entries.push(sighting);
    }

    pub fn pop(&mut self) -> Option<Sighting> {
        self.entries.pop()
    }

    /// Most recent sighting
    #[must_use]
    pub fn peek(&self) -> Option<&Sighting> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Sighting> {
        self.entries.iter()
    }
}
