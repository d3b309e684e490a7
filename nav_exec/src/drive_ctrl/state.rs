//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;
use std::thread;
use std::time::Duration;

// Internal
use super::{
    DriveCtrlError, DriveCtrlParams, Geometry, MotionCommand, SteerCmd, WheelDemand
};
use crate::eqpt::{Actuators, Sensors, Side, WheelDirection};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
///
/// Owns the actuators of the vehicle. Encoders are read through the [`Sensors`] passed into the
/// encoder-bounded maneuvers.
pub struct DriveCtrl<A> {
    pub(crate) params: DriveCtrlParams,

    pub(crate) geometry: Geometry,

    pub(crate) actuators: A,

    /// Global movement gate, only continuous steering respects it.
    pub(crate) movement_enabled: bool,

    /// The rotation in progress, if any.
    pub(crate) rotation: Option<Rotation>,

    /// Last demand written to each wheel, indexed by [`Side::index`].
    pub(crate) outputs: [WheelDemand; 2],
}

/// An encoder-bounded rotation on the spot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rotation {
    /// Number of ticks each wheel must travel.
    pub target_ticks: u32,

    /// Direction of each wheel, indexed by [`Side::index`].
    pub directions: [WheelDirection; 2],

    /// Latched once each wheel has been seen at or past the target.
    pub done: [bool; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A> DriveCtrl<A>
where
    A: Actuators
{
    /// Create a new drive controller, with movement disabled.
    pub fn new(params: DriveCtrlParams, actuators: A) -> Result<Self, DriveCtrlError> {
        params.are_valid()?;

        Ok(Self {
            geometry: Geometry::from_params(&params),
            params,
            actuators,
            movement_enabled: false,
            rotation: None,
            outputs: [WheelDemand::STOPPED; 2],
        })
    }

    /// Replace the parameters, for example after loading them from file.
    pub fn set_params(&mut self, params: DriveCtrlParams) -> Result<(), DriveCtrlError> {
        params.are_valid()?;

        self.geometry = Geometry::from_params(&params);
        self.params = params;

        Ok(())
    }

    pub fn params(&self) -> &DriveCtrlParams {
        &self.params
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    /// Last demand written to each wheel, indexed by [`Side::index`].
    pub fn outputs(&self) -> [WheelDemand; 2] {
        self.outputs
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    /// Open the movement gate.
    pub fn enable(&mut self) {
        if !self.movement_enabled {
            debug!("Movement enabled");
        }
        self.movement_enabled = true;
    }

    /// Close the movement gate and force both wheel outputs to zero.
    ///
    /// Calling this while already disabled writes the zero outputs again and has no other effect.
    pub fn disable(&mut self) -> Result<(), DriveCtrlError> {
        if self.movement_enabled {
            debug!("Movement disabled");
        }
        self.movement_enabled = false;

        for &side in [Side::Left, Side::Right].iter() {
            let direction = self.outputs[side.index()].direction;
            self.write_output(side, WheelDemand::new(0, direction))?;
        }

        Ok(())
    }

    /// Execute a motion command.
    ///
    /// Steering is applied immediately (if movement is enabled), rotations are started and must
    /// be completed by calling [`DriveCtrl::step_rotation`] every cycle.
    pub fn exec<S: Sensors>(
        &mut self, 
        cmd: MotionCommand, 
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        match cmd {
            MotionCommand::Steer(steer) => self.set_stance_speed(&steer).map(|_| ()),
            MotionCommand::RotateBy(angle_deg) => self.begin_timed_rotation(angle_deg, sensors),
            MotionCommand::RotateTo(heading_deg) => self.rotate_to_angle(heading_deg, sensors),
            MotionCommand::RotateTicks(ticks) => self.begin_rotation(
                ticks,
                [WheelDirection::Forward, WheelDirection::Reverse],
                sensors
            ),
        }
    }

    /// Apply a continuous steering demand.
    ///
    /// Both duty cycles are clamped to `[0, max_duty]`. Returns the demands written, or `None` if
    /// movement is disabled and nothing was written.
    pub fn set_stance_speed(
        &mut self, 
        cmd: &SteerCmd
    ) -> Result<Option<[WheelDemand; 2]>, DriveCtrlError> {
        let differential = self.params.steer_k_p * cmd.correction + cmd.nudge_duty;

        let demands = [
            WheelDemand::new(
                self.clamp_duty(cmd.base_duty - differential), 
                WheelDirection::Forward
            ),
            WheelDemand::new(
                self.clamp_duty(cmd.base_duty + differential), 
                WheelDirection::Forward
            ),
        ];

        if !self.movement_enabled {
            return Ok(None);
        }

        self.write_output(Side::Left, demands[0])?;
        self.write_output(Side::Right, demands[1])?;

        Ok(Some(demands))
    }

    /// Drive in a straight line for the given distance, blocking until the left wheel has
    /// travelled far enough. A negative distance drives in reverse.
    ///
    /// This ignores the movement gate and must only be used for short maneuvers outside of the
    /// reactive loop.
    pub fn drive_blocking<S: Sensors>(
        &mut self, 
        distance_mm: i32, 
        sensors: &mut S
    ) -> Result<(), DriveCtrlError> {
        // Reset before arming the motors so no tick of this drive is lost
        sensors.reset_encoder_ticks();

        let direction = if distance_mm > 0 {
            WheelDirection::Forward
        } else {
            WheelDirection::Reverse
        };
        let target_ticks = self.geometry.ticks_for_distance(distance_mm);

        info!(
            "Blocking drive of {} mm ({} ticks)", 
            distance_mm, target_ticks
        );

        let demand = WheelDemand::new(self.params.drive_duty, direction);
        self.write_output(Side::Left, demand)?;
        self.write_output(Side::Right, demand)?;

        while sensors.read_encoder_ticks(Side::Left) < target_ticks {
            self.busy_wait_pause();
        }

        self.write_output(Side::Left, WheelDemand::new(0, direction))?;
        self.write_output(Side::Right, WheelDemand::new(0, direction))?;

        debug!("Blocking drive complete");

        Ok(())
    }

    /// Write a demand to one wheel and remember it.
    pub(crate) fn write_output(
        &mut self, 
        side: Side, 
        demand: WheelDemand
    ) -> Result<(), DriveCtrlError> {
        trace!("{:?} wheel demand: {:?}", side, demand);

        self.actuators.set_wheel_output(side, demand.duty, demand.direction)?;
        self.outputs[side.index()] = demand;

        Ok(())
    }

    /// Clamp a computed duty cycle into the actuator range.
    pub(crate) fn clamp_duty(&self, duty: f64) -> u16 {
        duty.max(0.0).min(self.params.max_duty as f64) as u16
    }

    /// Yield between encoder polls of a synchronous wait.
    pub(crate) fn busy_wait_pause(&self) {
        if self.params.busy_wait_poll_ms > 0 {
            thread::sleep(Duration::from_millis(self.params.busy_wait_poll_ms));
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::sim::{SimVehicle, SimActuators};

    fn test_params() -> DriveCtrlParams {
        DriveCtrlParams {
            busy_wait_poll_ms: 0,
            ..Default::default()
        }
    }

    fn new_ctrl(sim: &SimVehicle) -> DriveCtrl<SimActuators> {
        DriveCtrl::new(test_params(), sim.actuators()).unwrap()
    }

    #[test]
    fn test_stance_speed() {
        let sim = SimVehicle::default();
        let mut ctrl = new_ctrl(&sim);

        let cmd = SteerCmd { base_duty: 120.0, correction: 100.0, nudge_duty: 0.0 };

        // Nothing is written while disabled
        assert_eq!(ctrl.set_stance_speed(&cmd).unwrap(), None);
        assert_eq!(sim.world().num_output_writes, 0);

        ctrl.enable();
        let dems = ctrl.set_stance_speed(&cmd).unwrap().unwrap();
        assert_eq!(dems[0], WheelDemand::new(90, WheelDirection::Forward));
        assert_eq!(dems[1], WheelDemand::new(150, WheelDirection::Forward));
        assert_eq!(sim.world().outputs[0], (90, WheelDirection::Forward));
        assert_eq!(sim.world().outputs[1], (150, WheelDirection::Forward));

        // Outputs are clamped into the duty range
        let cmd = SteerCmd { base_duty: 320.0, correction: 0.0, nudge_duty: 150.0 };
        let dems = ctrl.set_stance_speed(&cmd).unwrap().unwrap();
        assert_eq!(dems[0].duty, 170);
        assert_eq!(dems[1].duty, 255);

        let cmd = SteerCmd { base_duty: 0.0, correction: 0.0, nudge_duty: -150.0 };
        let dems = ctrl.set_stance_speed(&cmd).unwrap().unwrap();
        assert_eq!(dems[0].duty, 150);
        assert_eq!(dems[1].duty, 0);
    }

    #[test]
    fn test_disable() {
        let sim = SimVehicle::default();
        let mut ctrl = new_ctrl(&sim);

        ctrl.enable();
        ctrl.set_stance_speed(&SteerCmd { base_duty: 120.0, ..Default::default() }).unwrap();
        assert!(ctrl.is_movement_enabled());

        ctrl.disable().unwrap();
        assert!(!ctrl.is_movement_enabled());
        assert_eq!(sim.world().outputs[0].0, 0);
        assert_eq!(sim.world().outputs[1].0, 0);

        // Idempotent
        ctrl.disable().unwrap();
        assert!(!ctrl.is_movement_enabled());
        assert_eq!(ctrl.outputs(), [WheelDemand::STOPPED; 2]);
    }

    #[test]
    fn test_drive_blocking() {
        let sim = SimVehicle::default();
        let mut ctrl = new_ctrl(&sim);
        let mut sensors = sim.sensors();

        // Leftover ticks from a previous maneuver are cleared first
        sim.world().encoders.increment(Side::Left);

        ctrl.drive_blocking(-100, &mut sensors).unwrap();

        // The sampled count reached 1429, the wheel moved once more before it was stopped
        assert_eq!(sim.world().encoders.ticks(Side::Left), 1430);
        assert_eq!(sim.world().outputs[0], (0, WheelDirection::Reverse));
        assert_eq!(sim.world().outputs[1], (0, WheelDirection::Reverse));

        // Runs regardless of the movement gate
        assert!(!ctrl.is_movement_enabled());
    }

    #[test]
    fn test_exec() {
        let sim = SimVehicle::default();
        let mut ctrl = new_ctrl(&sim);
        let mut sensors = sim.sensors();

        let steer = MotionCommand::Steer(SteerCmd {
            base_duty: 120.0,
            correction: -100.0,
            nudge_duty: 0.0,
        });

        // Steering respects the movement gate
        ctrl.exec(steer, &mut sensors).unwrap();
        assert_eq!(sim.world().num_output_writes, 0);

        ctrl.enable();
        ctrl.exec(steer, &mut sensors).unwrap();
        assert_eq!(sim.world().outputs[0], (150, WheelDirection::Forward));
        assert_eq!(sim.world().outputs[1], (90, WheelDirection::Forward));
        assert!(!ctrl.is_rotating());

        ctrl.exec(MotionCommand::RotateBy(-90), &mut sensors).unwrap();
        assert_eq!(ctrl.tick_target(), 898);
        assert_eq!(sim.world().outputs[0].1, WheelDirection::Reverse);
        assert_eq!(sim.world().outputs[1].1, WheelDirection::Forward);

        // 90 deg is clockwise
        ctrl.exec(MotionCommand::RotateTo(90), &mut sensors).unwrap();
        assert_eq!(ctrl.tick_target(), 898);
        assert_eq!(sim.world().outputs[0].1, WheelDirection::Forward);
        assert_eq!(sim.world().outputs[1].1, WheelDirection::Reverse);

        sim.world().encoders.increment(Side::Left);
        ctrl.exec(MotionCommand::RotateTicks(40), &mut sensors).unwrap();
        assert_eq!(ctrl.tick_target(), 40);
        assert_eq!(sim.world().encoders.ticks(Side::Left), 0);
        assert_eq!(sim.world().outputs[0], (90, WheelDirection::Forward));
        assert_eq!(sim.world().outputs[1], (90, WheelDirection::Reverse));

        ctrl.idle_while_rotating(&mut sensors).unwrap();
        assert!(!ctrl.is_rotating());
        assert!(sim.world().encoders.ticks(Side::Right) >= 40);
    }
}
