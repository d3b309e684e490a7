//! # Navigation library.
//!
//! This library allows the executable, benchmarks, and any hardware adaptation crate to access the
//! navigation core of the line rover.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive control module - converts steering and rotation commands into wheel outputs
pub mod drive_ctrl;

/// Equipment interfaces - sensor and actuator traits, motor driver, and the simulated vehicle
pub mod eqpt;

/// Moving average filter - adaptive baselines for the microphones and IR channels
pub mod filter;

/// Navigation manager - the line following state machine
pub mod nav_mgr;

/// Navigation executable parameters
pub mod params;

/// Radial scan module - builds the radial reflectance map and selects a new heading from it
pub mod radial_scan;
