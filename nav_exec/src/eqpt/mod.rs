//! # Equipment interfaces
//!
//! The navigation core does not talk to hardware directly. Everything it needs from the vehicle is
//! expressed through the [`Sensors`] and [`Actuators`] traits defined here, which are implemented
//! by the hardware adaptation layer of a particular robot (or by [`sim::SimVehicle`]).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod encoder;
pub mod hal;
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use encoder::EncoderState;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of channels in the IR reflectance and microphone arrays.
pub const NUM_CHANNELS: usize = 3;

/// Index of the front right microphone in a [`MicTriple`].
pub const MIC_FRONT_RIGHT: usize = 0;

/// Index of the rear microphone in a [`MicTriple`].
pub const MIC_REAR: usize = 1;

/// Index of the front left microphone in a [`MicTriple`].
pub const MIC_FRONT_LEFT: usize = 2;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Raw readings from the three IR reflectance channels.
pub type IrTriple = [u16; NUM_CHANNELS];

/// Raw readings from the three microphones, ordered clockwise starting at the front right.
pub type MicTriple = [u16; NUM_CHANNELS];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Side of the vehicle a wheel is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Direction demand for a single wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDirection {
    Forward,
    Reverse,

    /// Neutral state a wheel is put into once it has completed its part of a rotation.
    Halted,
}

/// Errors raised by the equipment layer.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Could not set the {0:?} direction pin: {1}")]
    DirectionPin(Side, String),

    #[error("Duty cycle {duty} is above the maximum of {max_duty}")]
    DutyOutOfRange { duty: u16, max_duty: u16 },
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Sensor acquisition provided by the hardware adaptation layer.
///
/// Reads never fail: an implementation which cannot acquire a new value shall return the last
/// (possibly stale) one.
pub trait Sensors {
    /// Position of the line under the reflectance array, 1000 when centred under the middle
    /// sensor.
    fn read_line_position(&mut self) -> i32;

    /// Raw readings of the three IR reflectance channels.
    fn read_ir_triple(&mut self) -> IrTriple;

    /// Raw readings of the three microphones.
    fn read_mic_triple(&mut self) -> MicTriple;

    /// Distance to the nearest obstacle ahead of the vehicle.
    ///
    /// Units: meters
    fn read_distance_m(&mut self) -> f64;

    /// Snapshot of the encoder tick counter for one wheel.
    ///
    /// The counter is incremented asynchronously, two reads in the same cycle may differ.
    fn read_encoder_ticks(&mut self, side: Side) -> u32;

    /// Reset both encoder tick counters to zero.
    fn reset_encoder_ticks(&mut self);
}

/// Wheel actuation provided by the hardware adaptation layer.
pub trait Actuators {
    /// Set the duty cycle and direction of one wheel.
    ///
    /// `duty` is in the logical range `[0, max_duty]` of the drive parameters.
    fn set_wheel_output(
        &mut self,
        side: Side,
        duty: u16,
        direction: WheelDirection,
    ) -> Result<(), EqptError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Side {
    /// Index of this side in per-wheel arrays.
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}
