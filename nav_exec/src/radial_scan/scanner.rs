//! Sampling of the IR triple into the radial map during a scan rotation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{RadialMap, RadialScanParams, RADIAL_MAP_SLOTS};
use crate::eqpt::IrTriple;
use util::maths::int_mean;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Records IR samples into a [`RadialMap`] as the left wheel advances.
#[derive(Debug, Clone)]
pub struct RadialScanner {
    params: RadialScanParams,

    /// Last slot written in this scan.
    last_slot: Option<usize>,

    /// Number of slots written in this scan.
    num_samples: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RadialScanner {
    pub fn new(params: RadialScanParams) -> Self {
        Self {
            params,
            last_slot: None,
            num_samples: 0,
        }
    }

    /// Prepare for a new scan, clearing the map.
    pub fn begin(&mut self, map: &mut RadialMap) {
        map.clear();
        self.last_slot = None;
        self.num_samples = 0;
    }

    /// Sample the IR triple at the given left encoder count.
    ///
    /// A sample is only recorded when the count is an exact multiple of the stride, and at most
    /// once per slot while the count dwells on that multiple. Counts past the last slot of the map
    /// are ignored. Returns the slot written, if any.
    pub fn sample(
        &mut self, 
        left_ticks: u32, 
        ir: IrTriple, 
        map: &mut RadialMap
    ) -> Option<usize> {
        let stride = self.params.ticks_per_slot.max(1);

        if left_ticks % stride != 0 {
            return None;
        }

        let slot = (left_ticks / stride) as usize;
        if slot >= RADIAL_MAP_SLOTS || self.last_slot == Some(slot) {
            return None;
        }

        let value = int_mean(&[ir[0] as u32, ir[1] as u32, ir[2] as u32]) as u16;
        map.set(slot, value);

        trace!("Scan slot {}: {} ({:?})", slot, value, ir);

        self.last_slot = Some(slot);
        self.num_samples += 1;

        Some(slot)
    }

    /// Number of slots written since the scan began.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_full_scan_sampling() {
        let mut scanner = RadialScanner::new(RadialScanParams::default());
        let mut map = RadialMap::new();
        scanner.begin(&mut map);

        let mut written = Vec::new();

        for ticks in 0..=3600u32 {
            let ir = [ticks as u16, 3000, 0];
            if let Some(slot) = scanner.sample(ticks, ir, &mut map) {
                written.push(slot);
            }
        }

        // One write per multiple of 10, none overlapping, 3600 itself is out of the map
        assert_eq!(written.len(), 360);
        assert_eq!(written, (0..360).collect::<Vec<_>>());
        assert_eq!(scanner.num_samples(), 360);

        assert_eq!(map.get(0), 1000);
        assert_eq!(map.get(90), (900 + 3000) / 3);
        assert_eq!(map.get(359), (3590 + 3000) / 3);
    }

    #[test]
    fn test_dwelling_and_restart() {
        let mut scanner = RadialScanner::new(RadialScanParams::default());
        let mut map = RadialMap::new();
        scanner.begin(&mut map);

        // The count can stay on a multiple for a few cycles, only the first one is recorded
        assert_eq!(scanner.sample(20, [1500; 3], &mut map), Some(2));
        assert_eq!(scanner.sample(20, [2500; 3], &mut map), None);
        assert_eq!(scanner.sample(21, [2500; 3], &mut map), None);
        assert_eq!(map.get(2), 1500);

        scanner.begin(&mut map);
        assert_eq!(map.get(2), 0);
        assert_eq!(scanner.num_samples(), 0);
        assert_eq!(scanner.sample(20, [2500; 3], &mut map), Some(2));
    }
}
