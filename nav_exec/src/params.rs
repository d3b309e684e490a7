//! # Navigation Executable Parameters
//!
//! This module provides parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::eqpt::{IrTriple, MicTriple};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NavExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of consecutive cycle overruns after which the executable stops.
    pub max_consec_cycle_overruns: u64,

    /// Scenario played on the simulated vehicle.
    pub sim: SimScenarioParams,
}

/// Scripted surroundings of the simulated vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct SimScenarioParams {
    /// Line position reported while following the line.
    pub line_position: i32,

    /// IR readings while over the line.
    pub ir_on_line: IrTriple,

    /// IR readings once the line has been lost.
    pub ir_off_line: IrTriple,

    /// Ambient microphone readings.
    pub mic: MicTriple,

    /// Distance to the nearest obstacle when nothing is in the way.
    ///
    /// Units: meters
    pub clear_distance_m: f64,

    /// Cycle on which the line is lost, if at all.
    pub offroad_at_cycle: Option<u64>,

    /// Heading, in the frame of the scan, at which the line can be found again.
    ///
    /// Units: degrees
    pub line_heading_deg: u16,

    /// Cycles `[start, end)` during which an obstacle is in front of the vehicle.
    pub blocked_cycles: Option<[u64; 2]>,

    /// Distance to the obstacle while blocked.
    ///
    /// Units: meters
    pub blocked_distance_m: f64,

    /// Every Nth tick of the right wheel is lost, if set.
    pub right_slip_every: Option<u32>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavExecParams {
    /// Check the parameters can be used to run the executable.
    pub fn are_valid(&self) -> Result<(), String> {
        if !(self.cycle_period_s > 0.0) || !self.cycle_period_s.is_finite() {
            return Err(format!(
                "cycle_period_s must be a positive number, found {}",
                self.cycle_period_s
            ));
        }

        self.sim.are_valid()
    }
}

impl SimScenarioParams {
    pub fn are_valid(&self) -> Result<(), String> {
        for (name, value) in [
            ("sim.clear_distance_m", self.clear_distance_m),
            ("sim.blocked_distance_m", self.blocked_distance_m),
        ]
        .iter()
        {
            if !(*value >= 0.0) || !value.is_finite() {
                return Err(format!("{} must be a non-negative number, found {}", name, value));
            }
        }

        if let Some([start, end]) = self.blocked_cycles {
            if start > end {
                return Err(format!(
                    "sim.blocked_cycles must be ascending, found [{}, {}]",
                    start, end
                ));
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn shipped_params() -> NavExecParams {
        toml::from_str(include_str!("../../params/nav_exec.toml")).unwrap()
    }

    #[test]
    fn test_shipped_params() {
        let params = shipped_params();

        assert_eq!(params.cycle_period_s, 0.01);
        assert_eq!(params.sim.line_heading_deg, 60);
        assert!(params.are_valid().is_ok());
    }

    #[test]
    fn test_cycle_period_validation() {
        for &period in [0.0, -0.01, std::f64::NAN, std::f64::INFINITY].iter() {
            let params = NavExecParams {
                cycle_period_s: period,
                ..shipped_params()
            };
            assert!(params.are_valid().is_err(), "period {} accepted", period);
        }
    }

    #[test]
    fn test_sim_validation() {
        let mut params = shipped_params();
        params.sim.blocked_cycles = Some([1200, 1000]);
        assert!(params.are_valid().is_err());

        let mut params = shipped_params();
        params.sim.blocked_distance_m = -0.1;
        assert!(params.are_valid().is_err());
    }
}
