//! # Simulation scenario
//!
//! Plays a scripted sequence of events on the simulated vehicle: the line is lost on a given cycle
//! and found again along a given heading, and an obstacle may block the vehicle for a while.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use nav_lib::{
    eqpt::sim::{SimVehicle, SimWorld},
    nav_mgr::NavState,
    params::SimScenarioParams,
    radial_scan::RADIAL_MAP_SLOTS,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Reflectance of the floor around the vehicle during a scan.
const FLOOR_REFLECTANCE: u16 = 400;

/// Reflectance of the line during a scan.
const LINE_REFLECTANCE: u16 = 2200;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimScenario {
    params: SimScenarioParams,

    vehicle: SimVehicle,

    /// True while the vehicle is off the line.
    offroad: bool,

    last_state: NavState,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimScenario {
    pub fn new(params: SimScenarioParams) -> Self {
        let mut profile = vec![FLOOR_REFLECTANCE; RADIAL_MAP_SLOTS];
        profile[params.line_heading_deg as usize % RADIAL_MAP_SLOTS] = LINE_REFLECTANCE;

        let vehicle = SimVehicle::new(SimWorld {
            line_position: params.line_position,
            ir: params.ir_on_line,
            mic: params.mic,
            distance_m: params.clear_distance_m,
            radial_profile: Some(profile),
            right_slip_every: params.right_slip_every,
            ..Default::default()
        });

        Self {
            params,
            vehicle,
            offroad: false,
            last_state: NavState::Normal,
        }
    }

    pub fn vehicle(&self) -> &SimVehicle {
        &self.vehicle
    }

    /// Update the surroundings of the vehicle for a new cycle.
    pub fn update(&mut self, cycle: u64, state: NavState) {
        let mut world = self.vehicle.world_mut();

        if self.params.offroad_at_cycle == Some(cycle) {
            info!("Scenario: line lost on cycle {}", cycle);
            world.ir = self.params.ir_off_line;
            self.offroad = true;
        }

        // Back on the line once the scan has turned the vehicle to the new heading
        if self.offroad && self.last_state == NavState::Sensing && state == NavState::Normal {
            info!("Scenario: line found on cycle {}", cycle);
            world.ir = self.params.ir_on_line;
            self.offroad = false;
        }

        world.distance_m = match self.params.blocked_cycles {
            Some([start, end]) if cycle >= start && cycle < end => self.params.blocked_distance_m,
            _ => self.params.clear_distance_m,
        };

        self.last_state = state;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nav_lib::eqpt::{Sensors, Side};

    fn test_params() -> SimScenarioParams {
        SimScenarioParams {
            line_position: 1000,
            ir_on_line: [2000; 3],
            ir_off_line: [1000; 3],
            mic: [200; 3],
            clear_distance_m: 1.0,
            offroad_at_cycle: Some(5),
            line_heading_deg: 60,
            blocked_cycles: Some([10, 12]),
            blocked_distance_m: 0.1,
            right_slip_every: Some(3),
        }
    }

    #[test]
    fn test_scenario_world() {
        let scenario = SimScenario::new(test_params());
        let world = scenario.vehicle().world();

        assert_eq!(world.line_position, 1000);
        assert_eq!(world.ir, [2000; 3]);
        assert_eq!(world.right_slip_every, Some(3));
        assert_eq!(world.ticks_per_slot, 10);

        let profile = world.radial_profile.as_ref().unwrap();
        assert_eq!(profile.len(), RADIAL_MAP_SLOTS);
        assert_eq!(profile[60], LINE_REFLECTANCE);
        assert_eq!(profile[61], FLOOR_REFLECTANCE);
    }

    #[test]
    fn test_scenario_events() {
        let mut scenario = SimScenario::new(test_params());
        let vehicle = scenario.vehicle().clone();
        let mut sensors = vehicle.sensors();

        scenario.update(4, NavState::Normal);
        assert_eq!(sensors.read_ir_triple(), [2000; 3]);

        // Line lost
        scenario.update(5, NavState::Normal);
        assert_eq!(sensors.read_ir_triple(), [1000; 3]);

        // Still lost while scanning
        scenario.update(6, NavState::Sensing);
        assert_eq!(sensors.read_ir_triple(), [1000; 3]);

        // Found again once the scan hands back to line following
        scenario.update(7, NavState::Normal);
        assert_eq!(sensors.read_ir_triple(), [2000; 3]);

        // Blocked for cycles 10 and 11 only
        scenario.update(9, NavState::Normal);
        assert_eq!(sensors.read_distance_m(), 1.0);
        scenario.update(10, NavState::Normal);
        assert_eq!(sensors.read_distance_m(), 0.1);
        scenario.update(11, NavState::Blocked);
        assert_eq!(sensors.read_distance_m(), 0.1);
        scenario.update(12, NavState::Blocked);
        assert_eq!(sensors.read_distance_m(), 1.0);

        assert_eq!(sensors.read_encoder_ticks(Side::Left), 0);
    }
}
