//! # embedded-hal motor driver
//!
//! [`Actuators`] implementation for a dual H-bridge driven by one PWM channel and one direction
//! pin per wheel.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::{digital::v2::OutputPin, PwmPin};
use log::trace;
use util::maths::lin_map;

use super::{Actuators, EqptError, Side, WheelDirection};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single motor channel of the H-bridge.
pub struct HalMotor<P, D> {
    pwm: P,
    dir: D,
}

/// Both drive motors of the vehicle.
pub struct HalDriveTrain<P, D> {
    left: HalMotor<P, D>,
    right: HalMotor<P, D>,

    /// Top of the logical duty range used by the navigation software, mapped onto the PWM
    /// channel's own maximum duty.
    max_duty: u16,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<P, D> HalMotor<P, D>
where
    P: PwmPin<Duty = u16>,
    D: OutputPin,
    D::Error: std::fmt::Debug,
{
    /// Create the motor channel, enabling its PWM output at zero duty.
    pub fn new(mut pwm: P, dir: D) -> Self {
        pwm.set_duty(0);
        pwm.enable();

        Self { pwm, dir }
    }

    fn set(
        &mut self,
        side: Side,
        logical_duty: u16,
        max_duty: u16,
        direction: WheelDirection,
    ) -> Result<(), EqptError> {
        // A high direction pin drives the wheel forward, halted wheels are parked high too
        let dir_result = match direction {
            WheelDirection::Forward | WheelDirection::Halted => self.dir.set_high(),
            WheelDirection::Reverse => self.dir.set_low(),
        };
        dir_result.map_err(|e| EqptError::DirectionPin(side, format!("{:?}", e)))?;

        let hw_duty = if max_duty == 0 {
            0
        } else {
            lin_map(
                (0f64, max_duty as f64),
                (0f64, self.pwm.get_max_duty() as f64),
                logical_duty as f64,
            )
            .round() as u16
        };

        trace!("{:?} motor: duty {} ({} hw), {:?}", side, logical_duty, hw_duty, direction);

        self.pwm.set_duty(hw_duty);

        Ok(())
    }
}

impl<P, D> HalDriveTrain<P, D>
where
    P: PwmPin<Duty = u16>,
    D: OutputPin,
    D::Error: std::fmt::Debug,
{
    pub fn new(left: HalMotor<P, D>, right: HalMotor<P, D>, max_duty: u16) -> Self {
        Self {
            left,
            right,
            max_duty,
        }
    }
}

impl<P, D> Actuators for HalDriveTrain<P, D>
where
    P: PwmPin<Duty = u16>,
    D: OutputPin,
    D::Error: std::fmt::Debug,
{
    fn set_wheel_output(
        &mut self,
        side: Side,
        duty: u16,
        direction: WheelDirection,
    ) -> Result<(), EqptError> {
        if duty > self.max_duty {
            return Err(EqptError::DutyOutOfRange {
                duty,
                max_duty: self.max_duty,
            });
        }

        let max_duty = self.max_duty;
        let motor = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };

        motor.set(side, duty, max_duty, direction)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakePwm {
        duty: Rc<Cell<u16>>,
        enabled: Rc<Cell<bool>>,
    }

    struct FakePin {
        high: Rc<Cell<bool>>,
        broken: bool,
    }

    impl PwmPin for FakePwm {
        type Duty = u16;

        fn disable(&mut self) {
            self.enabled.set(false)
        }

        fn enable(&mut self) {
            self.enabled.set(true)
        }

        fn get_duty(&self) -> u16 {
            self.duty.get()
        }

        fn get_max_duty(&self) -> u16 {
            1000
        }

        fn set_duty(&mut self, duty: u16) {
            self.duty.set(duty)
        }
    }

    impl OutputPin for FakePin {
        type Error = &'static str;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err("pin fault");
            }
            self.high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err("pin fault");
            }
            self.high.set(true);
            Ok(())
        }
    }

    #[test]
    fn test_hal_drive_train() {
        let left_duty = Rc::new(Cell::new(0));
        let left_enabled = Rc::new(Cell::new(false));
        let left_high = Rc::new(Cell::new(false));
        let right_high = Rc::new(Cell::new(false));

        let left = HalMotor::new(
            FakePwm {
                duty: left_duty.clone(),
                enabled: left_enabled.clone(),
            },
            FakePin {
                high: left_high.clone(),
                broken: false,
            },
        );
        let right = HalMotor::new(
            FakePwm::default(),
            FakePin {
                high: right_high.clone(),
                broken: true,
            },
        );

        let mut drive = HalDriveTrain::new(left, right, 255);
        assert!(left_enabled.get());

        // Logical duty is scaled onto the pin's range
        drive
            .set_wheel_output(Side::Left, 255, WheelDirection::Forward)
            .unwrap();
        assert_eq!(left_duty.get(), 1000);
        assert!(left_high.get());

        drive
            .set_wheel_output(Side::Left, 51, WheelDirection::Reverse)
            .unwrap();
        assert_eq!(left_duty.get(), 200);
        assert!(!left_high.get());

        drive
            .set_wheel_output(Side::Left, 0, WheelDirection::Halted)
            .unwrap();
        assert_eq!(left_duty.get(), 0);
        assert!(left_high.get());

        // Out of range duty and pin faults are reported, not swallowed
        assert!(matches!(
            drive.set_wheel_output(Side::Left, 256, WheelDirection::Forward),
            Err(EqptError::DutyOutOfRange { duty: 256, max_duty: 255 })
        ));
        assert!(matches!(
            drive.set_wheel_output(Side::Right, 10, WheelDirection::Forward),
            Err(EqptError::DirectionPin(Side::Right, _))
        ));
        assert!(!right_high.get());
    }
}
