//! Parameters for the radial scanner and heading selection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::RADIAL_MAP_SLOTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the [`RadialScanner`](super::RadialScanner).
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RadialScanParams {
    /// Number of left encoder ticks between two recorded slots.
    pub ticks_per_slot: u32,
}

/// Parameters for [`select_heading`](super::select_heading).
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadingParams {
    /// Number of slots either side of a candidate averaged to form its neighbourhood.
    pub window_half_width: usize,

    /// Reflectance a candidate must exceed to be counted as a peak.
    pub peak_floor: u16,

    /// Inclusive range of headings considered behind the vehicle, which are never selected.
    ///
    /// Units: degrees
    pub rearward_arc_deg: [u16; 2],

    /// Heading adopted if no peak is found outside the rearward arc.
    ///
    /// Units: degrees
    pub default_heading_deg: u16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RadialScanParams {
    fn default() -> Self {
        Self {
            ticks_per_slot: 10,
        }
    }
}

impl Default for HeadingParams {
    fn default() -> Self {
        Self {
            window_half_width: 5,
            peak_floor: 1500,
            rearward_arc_deg: [150, 210],
            default_heading_deg: 180,
        }
    }
}

impl RadialScanParams {
    pub fn are_valid(&self) -> Result<(), String> {
        if self.ticks_per_slot == 0 {
            return Err("scan.ticks_per_slot must be non-zero".into());
        }

        Ok(())
    }
}

impl HeadingParams {
    pub fn are_valid(&self) -> Result<(), String> {
        if self.window_half_width == 0 || 2 * self.window_half_width >= RADIAL_MAP_SLOTS {
            return Err(format!(
                "heading.window_half_width must be in [1, {}), found {}",
                RADIAL_MAP_SLOTS / 2, self.window_half_width
            ));
        }

        if self.rearward_arc_deg[0] > self.rearward_arc_deg[1] {
            return Err(format!(
                "heading.rearward_arc_deg must be ascending, found {:?}",
                self.rearward_arc_deg
            ));
        }

        if self.default_heading_deg as usize >= RADIAL_MAP_SLOTS {
            return Err(format!(
                "heading.default_heading_deg must be below {}, found {}",
                RADIAL_MAP_SLOTS, self.default_heading_deg
            ));
        }

        Ok(())
    }

    /// Returns true if the heading lies in the rearward arc.
    pub fn is_rearward(&self, heading_deg: u16) -> bool {
        heading_deg >= self.rearward_arc_deg[0] && heading_deg <= self.rearward_arc_deg[1]
    }
}
