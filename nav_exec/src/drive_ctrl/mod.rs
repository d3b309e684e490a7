//! # Drive control module
//!
//! Converts differential drive demands from the navigation manager into per-wheel duty cycle and
//! direction outputs, and closes the loop on the wheel encoders for rotations and blocking drives.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod geometry;
mod params;
mod rotation;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use geometry::*;
pub use params::*;
pub use state::*;

use crate::eqpt::EqptError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Invalid drive parameters: {0}")]
    InvalidParams(String),

    #[error("Could not write the wheel outputs: {0}")]
    Actuator(#[from] EqptError),
}
