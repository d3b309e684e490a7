//! # Simulated vehicle
//!
//! A minimal vehicle model implementing both [`Sensors`] and [`Actuators`] over one shared world.
//! It is used by the executable when no hardware layer is present, and by the navigation tests.
//!
//! The model is deliberately crude:
//! - The encoders advance by one tick for each driven wheel every time the left encoder is
//!   sampled, standing in for the edge handlers. A wheel is driven if it has a non-zero duty and
//!   is not halted.
//! - While the wheels turn in opposite directions the IR triple reports the radial reflectance
//!   profile (if one is set) at the slot matching the left encoder count, otherwise it reports the
//!   fixed `ir` reading.
//! - All other readings are whatever the owner last set in the world.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;

use super::{Actuators, EncoderState, EqptError, IrTriple, MicTriple, Sensors, Side, WheelDirection};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the simulated vehicle and its surroundings.
#[derive(Debug)]
pub struct SimWorld {
    /// Encoder counters, shared the same way a hardware edge handler would share them.
    pub encoders: Arc<EncoderState>,

    /// Last output written to each wheel, indexed by [`Side::index`].
    pub outputs: [(u16, WheelDirection); 2],

    /// Number of writes made to the actuators.
    pub num_output_writes: u64,

    pub line_position: i32,
    pub ir: IrTriple,
    pub mic: MicTriple,
    pub distance_m: f64,

    /// Reflectance seen at each slot of a turn on the spot.
    pub radial_profile: Option<Vec<u16>>,

    /// Number of left encoder ticks per slot of the radial profile.
    pub ticks_per_slot: u32,

    /// If set every Nth tick of the right wheel is lost, simulating slip.
    pub right_slip_every: Option<u32>,
}

/// Handle on the simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    world: Rc<RefCell<SimWorld>>,

    /// Number of ticks the right wheel should have made, counting slipped ones.
    right_tick_attempts: Rc<Cell<u32>>,
}

/// [`Sensors`] view of a [`SimVehicle`].
#[derive(Debug, Clone)]
pub struct SimSensors {
    world: Rc<RefCell<SimWorld>>,
    right_tick_attempts: Rc<Cell<u32>>,
}

/// [`Actuators`] view of a [`SimVehicle`].
#[derive(Debug, Clone)]
pub struct SimActuators {
    world: Rc<RefCell<SimWorld>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimWorld {
    fn default() -> Self {
        Self {
            encoders: Arc::new(EncoderState::new()),
            outputs: [(0, WheelDirection::Forward); 2],
            num_output_writes: 0,
            line_position: 1000,
            ir: [2000; 3],
            mic: [200; 3],
            distance_m: 1.0,
            radial_profile: None,
            ticks_per_slot: 10,
            right_slip_every: None,
        }
    }
}

impl SimWorld {
    /// True if the wheel on the given side is currently being driven.
    pub fn is_driven(&self, side: Side) -> bool {
        let (duty, dir) = self.outputs[side.index()];
        duty > 0 && dir != WheelDirection::Halted
    }

    /// True if the wheels are being driven in opposite directions.
    pub fn is_turning(&self) -> bool {
        let (_, left_dir) = self.outputs[Side::Left.index()];
        let (_, right_dir) = self.outputs[Side::Right.index()];

        matches!(
            (left_dir, right_dir),
            (WheelDirection::Forward, WheelDirection::Reverse)
                | (WheelDirection::Reverse, WheelDirection::Forward)
        )
    }

    fn advance_encoders(&self, right_tick_attempts: &Cell<u32>) {
        if self.is_driven(Side::Left) {
            self.encoders.increment(Side::Left);
        }

        if self.is_driven(Side::Right) {
            let attempts = right_tick_attempts.get() + 1;
            right_tick_attempts.set(attempts);

            let slipped = match self.right_slip_every {
                Some(n) if n > 0 => attempts % n == 0,
                _ => false,
            };

            if !slipped {
                self.encoders.increment(Side::Right);
            }
        }
    }
}

impl SimVehicle {
    pub fn new(world: SimWorld) -> Self {
        Self {
            world: Rc::new(RefCell::new(world)),
            right_tick_attempts: Rc::new(Cell::new(0)),
        }
    }

    pub fn sensors(&self) -> SimSensors {
        SimSensors {
            world: self.world.clone(),
            right_tick_attempts: self.right_tick_attempts.clone(),
        }
    }

    pub fn actuators(&self) -> SimActuators {
        SimActuators {
            world: self.world.clone(),
        }
    }

    /// Borrow the world, for example to check the wheel outputs.
    pub fn world(&self) -> Ref<SimWorld> {
        self.world.borrow()
    }

    /// Mutably borrow the world, for example to change a sensor reading.
    pub fn world_mut(&self) -> RefMut<SimWorld> {
        self.world.borrow_mut()
    }
}

impl Default for SimVehicle {
    fn default() -> Self {
        Self::new(SimWorld::default())
    }
}

impl Sensors for SimSensors {
    fn read_line_position(&mut self) -> i32 {
        self.world.borrow().line_position
    }

    fn read_ir_triple(&mut self) -> IrTriple {
        let world = self.world.borrow();

        match world.radial_profile {
            Some(ref profile) if world.is_turning() && !profile.is_empty() => {
                let left = world.encoders.ticks(Side::Left);
                let slot = (left / world.ticks_per_slot.max(1)) as usize % profile.len();
                [profile[slot]; 3]
            }
            _ => world.ir,
        }
    }

    fn read_mic_triple(&mut self) -> MicTriple {
        self.world.borrow().mic
    }

    fn read_distance_m(&mut self) -> f64 {
        self.world.borrow().distance_m
    }

    fn read_encoder_ticks(&mut self, side: Side) -> u32 {
        let world = self.world.borrow();
        let ticks = world.encoders.ticks(side);

        if side == Side::Left {
            world.advance_encoders(&self.right_tick_attempts);
        }

        ticks
    }

    fn reset_encoder_ticks(&mut self) {
        self.world.borrow().encoders.reset();
    }
}

impl Actuators for SimActuators {
    fn set_wheel_output(
        &mut self,
        side: Side,
        duty: u16,
        direction: WheelDirection,
    ) -> Result<(), EqptError> {
        let mut world = self.world.borrow_mut();
        world.outputs[side.index()] = (duty, direction);
        world.num_output_writes += 1;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_encoders() {
        let sim = SimVehicle::default();
        let mut sensors = sim.sensors();
        let mut actuators = sim.actuators();

        // Nothing driven, nothing counted
        assert_eq!(sensors.read_encoder_ticks(Side::Left), 0);
        assert_eq!(sensors.read_encoder_ticks(Side::Left), 0);

        actuators
            .set_wheel_output(Side::Left, 90, WheelDirection::Forward)
            .unwrap();
        actuators
            .set_wheel_output(Side::Right, 90, WheelDirection::Reverse)
            .unwrap();

        // Reads return the count before advancing
        assert_eq!(sensors.read_encoder_ticks(Side::Left), 0);
        assert_eq!(sensors.read_encoder_ticks(Side::Right), 1);
        assert_eq!(sensors.read_encoder_ticks(Side::Left), 1);
        assert_eq!(sensors.read_encoder_ticks(Side::Right), 2);

        // Halted wheels stop counting
        actuators
            .set_wheel_output(Side::Right, 0, WheelDirection::Halted)
            .unwrap();
        sensors.read_encoder_ticks(Side::Left);
        assert_eq!(sensors.read_encoder_ticks(Side::Right), 2);

        sensors.reset_encoder_ticks();
        assert_eq!(sim.world().encoders.ticks(Side::Left), 0);
    }

    #[test]
    fn test_sim_slip_and_profile() {
        let mut profile = vec![500u16; 360];
        profile[2] = 1800;

        let sim = SimVehicle::new(SimWorld {
            radial_profile: Some(profile),
            right_slip_every: Some(4),
            ..Default::default()
        });
        let mut sensors = sim.sensors();
        let mut actuators = sim.actuators();

        // Not turning, the fixed reading is reported
        assert_eq!(sensors.read_ir_triple(), [2000; 3]);

        actuators
            .set_wheel_output(Side::Left, 90, WheelDirection::Forward)
            .unwrap();
        actuators
            .set_wheel_output(Side::Right, 90, WheelDirection::Reverse)
            .unwrap();

        for _ in 0..20 {
            sensors.read_encoder_ticks(Side::Left);
        }

        assert_eq!(sim.world().encoders.ticks(Side::Left), 20);
        assert_eq!(sim.world().encoders.ticks(Side::Right), 15);
        assert_eq!(sensors.read_ir_triple(), [1800; 3]);
    }
}
