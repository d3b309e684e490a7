//! # NavMgr parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use super::NavMgrError;
use crate::drive_ctrl::DriveCtrlParams;
use crate::radial_scan::{HeadingParams, RadialScanParams, RADIAL_MAP_SLOTS};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the navigation manager and the modules it owns.
///
/// Any missing value takes the default of the reference vehicle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavMgrParams {
    // ---- STEERING ----

    /// Duty cycle of both wheels while following the line with no correction.
    pub base_duty: f64,

    /// Line position reported when the line is centred under the array.
    pub line_target: i32,

    /// Initial value of the microphone baselines.
    pub mic_seed: f64,

    /// Amount a microphone must exceed its baseline by to count as a nudge.
    pub mic_margin: i32,

    /// Steering differential applied when a front microphone detects a nudge.
    pub front_nudge_duty: f64,

    /// Duty cycle added to both wheels when the rear microphone detects a nudge.
    pub rear_boost_duty: f64,

    // ---- OFF-ROAD DETECTION ----

    /// Initial value of the IR baselines.
    pub ir_seed: f64,

    /// Amount every IR channel must drop below its baseline by to count as off the line.
    pub ir_margin: f64,

    /// Absolute reading every IR channel must be below to confirm the vehicle is off the line.
    pub ir_lower_threshold: u16,

    /// Exclusive range of line positions in which the line position is unresolved, i.e. the
    /// array cannot tell which side the line went.
    pub centred_band: [i32; 2],

    /// Time the IR channels must stay below their baselines before a scan is started.
    ///
    /// Units: seconds
    pub offroad_grace_s: f64,

    /// Time after a new heading is adopted during which off-road detection is suppressed.
    ///
    /// Units: seconds
    pub reacquire_grace_s: f64,

    // ---- BLOCKAGE ----

    /// Obstacle distance below which the vehicle is blocked.
    ///
    /// Units: meters
    pub blockage_tolerance_m: f64,

    /// Minimum time between two reads of the distance sensor.
    ///
    /// Units: seconds
    pub distance_poll_period_s: f64,

    // ---- DIAGNOSTICS ----

    /// Save every completed radial map and its selected heading into the session.
    pub archive_scans: bool,

    // ---- MODULES ----

    pub drive: DriveCtrlParams,

    pub scan: RadialScanParams,

    pub heading: HeadingParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavMgrParams {
    fn default() -> Self {
        Self {
            base_duty: 120.0,
            line_target: 1000,
            mic_seed: 200.0,
            mic_margin: 30,
            front_nudge_duty: 150.0,
            rear_boost_duty: 200.0,
            ir_seed: 1500.0,
            ir_margin: 100.0,
            ir_lower_threshold: 1250,
            centred_band: [850, 1150],
            offroad_grace_s: 0.1,
            reacquire_grace_s: 1.0,
            blockage_tolerance_m: 0.15,
            distance_poll_period_s: 0.1,
            archive_scans: true,
            drive: DriveCtrlParams::default(),
            scan: RadialScanParams::default(),
            heading: HeadingParams::default(),
        }
    }
}

impl NavMgrParams {
    /// Check the parameters, including those of the owned modules.
    pub fn are_valid(&self) -> Result<(), NavMgrError> {
        let non_negative = [
            ("offroad_grace_s", self.offroad_grace_s),
            ("reacquire_grace_s", self.reacquire_grace_s),
            ("blockage_tolerance_m", self.blockage_tolerance_m),
            ("distance_poll_period_s", self.distance_poll_period_s),
            ("mic_seed", self.mic_seed),
            ("ir_seed", self.ir_seed),
        ];

        for (name, value) in non_negative.iter() {
            if !(*value >= 0.0) || !value.is_finite() {
                return Err(NavMgrError::InvalidParams(format!(
                    "{} must be a non-negative number, found {}", name, value
                )));
            }
        }

        if self.centred_band[0] >= self.centred_band[1] {
            return Err(NavMgrError::InvalidParams(format!(
                "centred_band must be ascending, found {:?}", self.centred_band
            )));
        }

        self.scan.are_valid().map_err(NavMgrError::InvalidParams)?;
        self.heading.are_valid().map_err(NavMgrError::InvalidParams)?;
        self.drive.are_valid()?;

        // One calibration rotation must map onto the whole radial map
        let scan_ticks = self.scan.ticks_per_slot as u64 * RADIAL_MAP_SLOTS as u64;
        if scan_ticks != self.drive.calibration_rotation_ticks as u64 {
            return Err(NavMgrError::InvalidParams(format!(
                "scan.ticks_per_slot ({}) times {} slots must equal \
                 drive.calibration_rotation_ticks ({})",
                self.scan.ticks_per_slot, RADIAL_MAP_SLOTS, self.drive.calibration_rotation_ticks
            )));
        }

        Ok(())
    }
}
