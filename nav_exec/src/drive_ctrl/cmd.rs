//! Commands passed into DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::eqpt::WheelDirection;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A continuous steering demand.
///
/// The resulting wheel duty cycles are:
/// - left: `base_duty - k * correction - nudge_duty`
/// - right: `base_duty + k * correction + nudge_duty`
///
/// where `k` is the steering gain of the drive parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SteerCmd {
    /// Duty cycle both wheels run at with no correction.
    pub base_duty: f64,

    /// Proportional steering correction, a positive value steers left.
    ///
    /// Units: line position units
    pub correction: f64,

    /// Fixed differential added on top of the proportional term, a positive value steers left.
    pub nudge_duty: f64,
}

/// Output demand for a single wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WheelDemand {
    pub duty: u16,
    pub direction: WheelDirection,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to the drive subsystem.
///
/// Commands are created by the navigation manager each cycle or on a state transition and are
/// consumed immediately.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum MotionCommand {
    /// Continuous steering, only applied while movement is enabled.
    Steer(SteerCmd),

    /// Rotate on the spot by a signed angle, positive clockwise.
    ///
    /// Units: degrees
    RotateBy(i32),

    /// Rotate on the spot to an absolute heading in the frame of the last scan, taking the
    /// shortest direction.
    ///
    /// Units: degrees, [0, 360)
    RotateTo(u16),

    /// Rotate on the spot clockwise until both wheels have travelled the given number of ticks.
    RotateTicks(u32),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelDemand {
    pub const STOPPED: WheelDemand = WheelDemand {
        duty: 0,
        direction: WheelDirection::Forward
    };

    pub fn new(duty: u16, direction: WheelDirection) -> Self {
        Self { duty, direction }
    }
}

impl Default for WheelDemand {
    fn default() -> Self {
        Self::STOPPED
    }
}
