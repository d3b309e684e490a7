//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::DriveCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
///
/// The defaults are the values of the reference vehicle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveCtrlParams {

    // ---- GEOMETRY ----

    /// Encoder ticks per revolution of the motor shaft, before the gearbox.
    pub ticks_per_motor_rev: f64,

    /// Gearbox reduction ratio between the motor shaft and the wheel.
    pub gear_ratio: f64,

    /// Diameter of the drive wheels.
    ///
    /// Units: millimeters
    pub wheel_diameter_mm: f64,

    /// Distance between the two drive wheels.
    ///
    /// Units: millimeters
    pub axle_width_mm: f64,

    // ---- OUTPUTS ----

    /// Highest duty cycle accepted by the actuators.
    pub max_duty: u16,

    /// Duty cycle used by both wheels while rotating on the spot.
    pub rotate_duty: u16,

    /// Duty cycle used by both wheels during a blocking drive.
    pub drive_duty: u16,

    // ---- CONTROL ----

    /// Proportional gain `k` applied to the steering correction.
    pub steer_k_p: f64,

    /// Duty cycle added to the lagging wheel (and removed from the leading one) per tick of
    /// imbalance during a rotation.
    pub rotate_balance_gain: f64,

    /// Tick target of the calibration rotation, chosen so a full turn splits into an even number
    /// of scan samples.
    pub calibration_rotation_ticks: u32,

    /// Sleep between encoder polls in the synchronous waits.
    ///
    /// Units: milliseconds
    pub busy_wait_poll_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveCtrlParams {
    fn default() -> Self {
        Self {
            ticks_per_motor_rev: 48.0,
            gear_ratio: 74.85,
            wheel_diameter_mm: 80.0,
            axle_width_mm: 160.0,
            max_duty: 255,
            rotate_duty: 90,
            drive_duty: 90,
            steer_k_p: 0.3,
            rotate_balance_gain: 1.0,
            calibration_rotation_ticks: 3600,
            busy_wait_poll_ms: 5,
        }
    }
}

impl DriveCtrlParams {
    /// Check the parameters describe a physically possible vehicle.
    pub fn are_valid(&self) -> Result<(), DriveCtrlError> {
        let positive = [
            ("ticks_per_motor_rev", self.ticks_per_motor_rev),
            ("gear_ratio", self.gear_ratio),
            ("wheel_diameter_mm", self.wheel_diameter_mm),
            ("axle_width_mm", self.axle_width_mm),
        ];

        for (name, value) in positive.iter() {
            if !(*value > 0.0) || !value.is_finite() {
                return Err(DriveCtrlError::InvalidParams(format!(
                    "{} must be positive, found {}", name, value
                )));
            }
        }

        if self.max_duty == 0 {
            return Err(DriveCtrlError::InvalidParams(
                "max_duty must be non-zero".into()
            ));
        }

        if self.rotate_duty > self.max_duty || self.drive_duty > self.max_duty {
            return Err(DriveCtrlError::InvalidParams(format!(
                "rotate_duty ({}) and drive_duty ({}) must not exceed max_duty ({})",
                self.rotate_duty, self.drive_duty, self.max_duty
            )));
        }

        if self.steer_k_p < 0.0 || self.rotate_balance_gain < 0.0 {
            return Err(DriveCtrlError::InvalidParams(
                "Gains must not be negative".into()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(DriveCtrlParams::default().are_valid().is_ok());

        let p = DriveCtrlParams { wheel_diameter_mm: 0.0, ..Default::default() };
        assert!(p.are_valid().is_err());

        let p = DriveCtrlParams { rotate_duty: 300, ..Default::default() };
        assert!(p.are_valid().is_err());

        let p = DriveCtrlParams { steer_k_p: -0.1, ..Default::default() };
        assert!(p.are_valid().is_err());
    }
}
