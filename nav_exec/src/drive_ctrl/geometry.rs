//! Vehicle geometry conversions between angles, distances, and encoder ticks

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use super::DriveCtrlParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ratios derived from the physical constants of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Encoder ticks per revolution of a wheel (after the gearbox).
    pub ticks_per_wheel_rev: f64,

    /// Units: millimeters
    pub wheel_circumference_mm: f64,

    /// Number of wheel revolutions in one circuit of the vehicle's turning circle, which has
    /// the axle as its diameter.
    pub wheel_revs_per_vehicle_rev: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Geometry {
    pub fn from_params(params: &DriveCtrlParams) -> Self {
        let wheel_circumference_mm = PI * params.wheel_diameter_mm;
        let vehicle_circumference_mm = PI * params.axle_width_mm;

        Self {
            ticks_per_wheel_rev: params.ticks_per_motor_rev * params.gear_ratio,
            wheel_circumference_mm,
            wheel_revs_per_vehicle_rev: vehicle_circumference_mm / wheel_circumference_mm,
        }
    }

    /// Number of ticks each wheel must travel to rotate the vehicle by `angle_deg`.
    ///
    /// `|angle| * ticks_per_wheel_rev / 360 * wheel_revs_per_vehicle_rev / 2`, truncated.
    pub fn ticks_for_angle(&self, angle_deg: i32) -> u32 {
        let ticks = (angle_deg as f64).abs() 
            * self.ticks_per_wheel_rev / 360.0
            * self.wheel_revs_per_vehicle_rev / 2.0;

        ticks as u32
    }

    /// Number of ticks the wheels must travel to drive `distance_mm` in a straight line.
    pub fn ticks_for_distance(&self, distance_mm: i32) -> u32 {
        let ticks = (distance_mm as f64).abs()
            * self.ticks_per_wheel_rev
            / self.wheel_circumference_mm;

        ticks as u32
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_geometry() {
        let geom = Geometry::from_params(&DriveCtrlParams::default());

        // 48 ticks * 74.85 gearbox
        assert!((geom.ticks_per_wheel_rev - 3592.8).abs() < 1e-9);
        // 160 mm axle over 80 mm wheels
        assert!((geom.wheel_revs_per_vehicle_rev - 2.0).abs() < 1e-9);

        assert_eq!(geom.ticks_for_angle(90), 898);
        assert_eq!(geom.ticks_for_angle(-90), 898);
        assert_eq!(geom.ticks_for_angle(360), 3592);
        assert_eq!(geom.ticks_for_angle(0), 0);

        // Just short of one wheel circumference (251.3 mm)
        assert_eq!(geom.ticks_for_distance(251), 3588);
        assert_eq!(geom.ticks_for_distance(-100), 1429);
    }
}
