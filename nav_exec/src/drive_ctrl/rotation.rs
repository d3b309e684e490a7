//! Encoder-bounded rotations on the spot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use super::{DriveCtrl, DriveCtrlError, Rotation, WheelDemand};
use crate::eqpt::{Actuators, Sensors, Side, WheelDirection};
use util::maths::to_signed_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Wheel directions of a clockwise (positive) rotation.
const CLOCKWISE: [WheelDirection; 2] = [WheelDirection::Forward, WheelDirection::Reverse];

/// Wheel directions of an anticlockwise (negative) rotation.
const ANTICLOCKWISE: [WheelDirection; 2] = [WheelDirection::Reverse, WheelDirection::Forward];

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A> DriveCtrl<A>
where
    A: Actuators
{
    /// Start rotating on the spot by `angle_deg`, positive clockwise.
    ///
    /// The encoders are reset before the motors are armed. Any rotation already in progress is
    /// replaced.
    pub fn begin_timed_rotation<S: Sensors>(
        &mut self, 
        angle_deg: i32, 
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        let target_ticks = self.geometry.ticks_for_angle(angle_deg);
        let directions = if angle_deg < 0 { ANTICLOCKWISE } else { CLOCKWISE };

        info!("Rotating by {} deg ({} ticks)", angle_deg, target_ticks);

        self.begin_rotation(target_ticks, directions, sensors)
    }

    /// Start the full clockwise turn used by the radial scan.
    pub fn begin_calibration_rotation<S: Sensors>(
        &mut self, 
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        info!(
            "Starting calibration rotation ({} ticks)", 
            self.params.calibration_rotation_ticks
        );

        self.begin_rotation(self.params.calibration_rotation_ticks, CLOCKWISE, sensors)
    }

    /// Start rotating to an absolute heading in `[0, 360)`, taking the shorter way round.
    pub fn rotate_to_angle<S: Sensors>(
        &mut self, 
        heading_deg: u16, 
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        let angle_deg = to_signed_deg(heading_deg as i32);

        debug!("Heading {} deg is a rotation of {} deg", heading_deg, angle_deg);

        self.begin_timed_rotation(angle_deg, sensors)
    }

    /// Arm both motors for a rotation of `target_ticks` in the given directions.
    pub(crate) fn begin_rotation<S: Sensors>(
        &mut self,
        target_ticks: u32,
        directions: [WheelDirection; 2],
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        sensors.reset_encoder_ticks();

        self.rotation = Some(Rotation {
            target_ticks,
            directions,
            done: [false; 2],
        });

        let duty = self.params.rotate_duty;
        self.write_output(Side::Left, WheelDemand::new(duty, directions[0]))?;
        self.write_output(Side::Right, WheelDemand::new(duty, directions[1]))?;

        Ok(())
    }

    /// Advance the rotation in progress given this cycle's encoder snapshot.
    ///
    /// The duty of each wheel is biased by the tick imbalance so the lagging wheel catches up.
    /// A wheel that has reached the target is halted and stays halted. Returns `true` exactly
    /// once, on the call in which the second wheel reaches the target, after which the rotation
    /// is cleared. Returns `false` if no rotation is in progress.
    pub fn step_rotation(
        &mut self, 
        left_ticks: u32, 
        right_ticks: u32
    ) -> Result<bool, DriveCtrlError> {
        let mut rotation = match self.rotation {
            Some(r) => r,
            None => return Ok(false)
        };

        let diff = left_ticks as f64 - right_ticks as f64;
        let bias = self.params.rotate_balance_gain * diff;
        let rotate_duty = self.params.rotate_duty as f64;

        let balanced = [
            self.clamp_duty(rotate_duty - bias),
            self.clamp_duty(rotate_duty + bias),
        ];

        let ticks = [left_ticks, right_ticks];

        for &side in [Side::Left, Side::Right].iter() {
            let i = side.index();

            if ticks[i] >= rotation.target_ticks {
                rotation.done[i] = true;
            }

            let demand = if rotation.done[i] {
                WheelDemand::new(0, WheelDirection::Halted)
            } else {
                WheelDemand::new(balanced[i], rotation.directions[i])
            };
            self.write_output(side, demand)?;
        }

        if rotation.done[0] && rotation.done[1] {
            debug!(
                "Rotation complete at {}/{} ticks (target {})", 
                left_ticks, right_ticks, rotation.target_ticks
            );
            self.rotation = None;
            Ok(true)
        } else {
            self.rotation = Some(rotation);
            Ok(false)
        }
    }

    /// Block until the rotation in progress completes. Returns immediately if there is none.
    pub fn idle_while_rotating<S: Sensors>(
        &mut self, 
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        while self.rotation.is_some() {
            let left = sensors.read_encoder_ticks(Side::Left);
            let right = sensors.read_encoder_ticks(Side::Right);

            if self.step_rotation(left, right)? {
                break;
            }

            self.busy_wait_pause();
        }

        Ok(())
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }

    /// Tick target of the rotation in progress, 0 if none.
    pub fn tick_target(&self) -> u32 {
        self.rotation.map(|r| r.target_ticks).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
