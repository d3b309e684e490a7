//! Heading selection from a completed radial map

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};

use super::{HeadingParams, RadialMap, RADIAL_MAP_SLOTS};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find all peaks of the map, in ascending slot order.
///
/// A slot is a peak if its value exceeds the mean of the `window_half_width` slots before it, the
/// mean of the same number of slots after it, and the peak floor. The window wraps around the
/// circle, so every slot is considered.
pub fn find_peaks(map: &RadialMap, params: &HeadingParams) -> Vec<usize> {
    // Sized for the worst case of every slot being a peak
    let mut peaks = Vec::with_capacity(RADIAL_MAP_SLOTS);
    let half = params.window_half_width as isize;

    for i in 0..RADIAL_MAP_SLOTS {
        let centre = i as isize;
        let value = map.get(i) as u32;

        let before = neighbourhood_mean(map, centre - half, centre);
        let after = neighbourhood_mean(map, centre + 1, centre + half + 1);

        if value > before && value > after && value > params.peak_floor as u32 {
            debug!("Radial map peak of {} at {} deg", value, i);
            peaks.push(i);
        }
    }

    peaks
}

/// Select a new heading from the completed map.
///
/// Peaks inside the rearward arc are discarded, and the strongest of the others is chosen, the
/// earliest one winning a tie. If there is no such peak the default heading is returned.
///
/// Units: degrees, [0, 360)
pub fn select_heading(map: &RadialMap, params: &HeadingParams) -> u16 {
    let mut best: Option<(u16, u16)> = None;

    for slot in find_peaks(map, params) {
        let heading = slot as u16;

        if params.is_rearward(heading) {
            continue;
        }

        let value = map.get(slot);
        match best {
            Some((_, best_value)) if value <= best_value => (),
            _ => best = Some((heading, value)),
        }
    }

    match best {
        Some((heading, value)) => {
            info!("Selected heading {} deg (reflectance {})", heading, value);
            heading
        }
        None => {
            info!(
                "No usable peak in the radial map, defaulting to {} deg", 
                params.default_heading_deg
            );
            params.default_heading_deg
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Integer mean of the wrapped slots in `[start, end)`.
fn neighbourhood_mean(map: &RadialMap, start: isize, end: isize) -> u32 {
    let sum: u32 = (start..end).map(|i| map.wrapped(i) as u32).sum();
    sum / (end - start).max(1) as u32
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
