//! # Radial scan module
//!
//! Builds a radial reflectance map while the vehicle turns a full circle on the spot, and picks a
//! new heading from the peaks of that map.
//!
//! The map is indexed in degrees of the scan rotation, clockwise from the heading the vehicle had
//! when the scan started.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod heading;
mod params;
mod radial_map;
mod scanner;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use heading::*;
pub use params::*;
pub use radial_map::*;
pub use scanner::*;
