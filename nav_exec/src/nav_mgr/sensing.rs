//! # [`NavState::Sensing`] processing
//!
//! Steps the calibration rotation while sampling the radial map, then selects and turns to a new
//! heading.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use serde::Serialize;

use super::{InputData, NavMgr, NavMgrError, NavState};
use crate::drive_ctrl::MotionCommand;
use crate::eqpt::{Actuators, Sensors, Side};
use crate::radial_scan::{select_heading, RadialMap};
use util::session;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A completed scan, as saved into the session.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRecord {
    /// Index of the scan in this session.
    pub scan: u64,

    /// Units: seconds
    pub time_s: f64,

    /// Heading selected from the map.
    ///
    /// Units: degrees
    pub heading_deg: u16,

    pub map: RadialMap,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S, A> NavMgr<S, A>
where
    S: Sensors,
    A: Actuators,
{
    /// Returns the new heading on the cycle in which the scan completes.
    pub(crate) fn step_sensing(
        &mut self,
        input_data: &InputData,
    ) -> Result<Option<u16>, NavMgrError> {
        // One left read per cycle, shared by the rotation and the scanner
        let left_ticks = self.sensors.read_encoder_ticks(Side::Left);
        let right_ticks = self.sensors.read_encoder_ticks(Side::Right);
        let ir = self.sensors.read_ir_triple();

        self.report.left_ticks = Some(left_ticks);
        self.report.right_ticks = Some(right_ticks);

        let ctx = &mut self.ctx;
        let map = ctx.radial_map.get_or_insert_with(RadialMap::new);
        self.report.scan_slot = ctx.scanner.sample(left_ticks, ir, map);

        if !self.drive.step_rotation(left_ticks, right_ticks)? {
            return Ok(None);
        }

        let map = self.ctx.radial_map.take().unwrap_or_default();
        let num_samples = self.ctx.scanner.num_samples();
        if num_samples != map.as_slice().len() {
            warn!("Radial scan finished with {} samples", num_samples);
        }

        let heading_deg = select_heading(&map, &self.params.heading);

        // Give the vehicle time to find the line along the new heading
        self.ctx.reacquire_until_s = input_data.time_s + self.params.reacquire_grace_s;
        self.ctx.offroad_since_s = None;
        self.ctx.last_heading_deg = Some(heading_deg);
        self.ctx.num_scans += 1;

        if self.params.archive_scans && session::is_initialised() {
            session::save(
                format!("nav_mgr/scans/scan_{:04}.json", self.ctx.num_scans),
                ScanRecord {
                    scan: self.ctx.num_scans,
                    time_s: input_data.time_s,
                    heading_deg,
                    map,
                },
            );
        }

        self.drive.exec(MotionCommand::RotateTo(heading_deg), &mut self.sensors)?;
        self.drive.idle_while_rotating(&mut self.sensors)?;
        self.drive.enable();

        self.update_state(NavState::Normal);

        Ok(Some(heading_deg))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::sim::{SimVehicle, SimWorld};
    use crate::nav_mgr::test::{instant_params, new_mgr};

    #[test]
    fn test_scan_sets_reacquire_grace() {
        let mut profile = vec![400u16; 360];
        profile[45] = 1800;
        profile[275] = 1800;

        let sim = SimVehicle::new(SimWorld {
            radial_profile: Some(profile),
            ..Default::default()
        });
        let params = crate::nav_mgr::NavMgrParams {
            reacquire_grace_s: 1.0,
            ..instant_params()
        };
        let mut mgr = new_mgr(&sim, params);

        mgr.begin_scan().unwrap();

        let mut heading = None;
        for _ in 0..5000 {
            if let Some(h) = mgr.step_sensing(&InputData { time_s: 10.0 }).unwrap() {
                heading = Some(h);
                break;
            }
        }

        // Equal peaks, the earliest one wins
        assert_eq!(heading, Some(45));
        assert_eq!(mgr.state(), NavState::Normal);
        assert_eq!(mgr.ctx.reacquire_until_s, 11.0);
        assert_eq!(mgr.ctx.scanner.num_samples(), 360);

        // Off-road detection is held off until the grace expires
        assert!(!mgr.detect_offroad(1000, [1000; 3], 10.5));
        assert!(mgr.detect_offroad(1000, [1000; 3], 11.0));
    }

    #[test]
    fn test_scan_record_json() {
        let mut map = RadialMap::new();
        map.set(1, 1800);

        let record = ScanRecord {
            scan: 3,
            time_s: 1.5,
            heading_deg: 1,
            map,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["scan"], 3);
        assert_eq!(json["heading_deg"], 1);
        assert_eq!(json["map"]["slots"].as_array().unwrap().len(), 360);
        assert_eq!(json["map"]["slots"][1], 1800);
    }
}
