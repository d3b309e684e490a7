//! Circular per-degree reflectance map

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of slots in a radial map, one per degree.
pub const RADIAL_MAP_SLOTS: usize = 360;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reflectance samples of one full rotation, one slot per degree.
///
/// Slots never written in the current scan hold zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialMap {
    slots: Vec<u16>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RadialMap {
    pub fn new() -> Self {
        Self {
            slots: vec![0; RADIAL_MAP_SLOTS],
        }
    }

    /// Build a map from a full set of samples, returning `None` if the wrong number are given.
    pub fn from_slots(slots: Vec<u16>) -> Option<Self> {
        if slots.len() == RADIAL_MAP_SLOTS {
            Some(Self { slots })
        } else {
            None
        }
    }

    /// Value at a slot in `[0, 360)`.
    ///
    /// # Panics
    /// - If `slot` is out of range, use [`RadialMap::wrapped`] for circular lookups.
    pub fn get(&self, slot: usize) -> u16 {
        self.slots[slot]
    }

    /// Value at any signed index, wrapped around the circle.
    pub fn wrapped(&self, index: isize) -> u16 {
        self.slots[rem_euclid(index, RADIAL_MAP_SLOTS as isize) as usize]
    }

    /// Write a slot, ignoring slots outside of the map.
    pub fn set(&mut self, slot: usize, value: u16) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = value;
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = 0);
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.slots
    }
}

impl Default for RadialMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrapped_lookup() {
        let mut map = RadialMap::new();
        map.set(0, 10);
        map.set(359, 20);
        map.set(360, 30);

        assert_eq!(map.wrapped(0), 10);
        assert_eq!(map.wrapped(360), 10);
        assert_eq!(map.wrapped(-1), 20);
        assert_eq!(map.wrapped(-361), 20);
        assert_eq!(map.get(1), 0);

        map.clear();
        assert!(map.as_slice().iter().all(|&v| v == 0));

        assert!(RadialMap::from_slots(vec![0; 359]).is_none());
    }
}
