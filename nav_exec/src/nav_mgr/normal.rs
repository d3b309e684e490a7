//! # [`NavState::Normal`] processing
//!
//! Line following, steered by the line position with microphone nudges on top, and detection of
//! the vehicle leaving the line.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use serde::Serialize;

use super::{InputData, NavMgr, NavMgrError, NavState};
use crate::drive_ctrl::{MotionCommand, SteerCmd};
use crate::eqpt::{
    Actuators, IrTriple, MicTriple, Sensors, MIC_FRONT_LEFT, MIC_FRONT_RIGHT, MIC_REAR,
    NUM_CHANNELS,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A nudge detected by one of the microphones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MicNudge {
    /// Bumped on the front right, steer left.
    FrontRight,

    /// Bumped from behind, speed up.
    Rear,

    /// Bumped on the front left, steer right.
    FrontLeft,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S, A> NavMgr<S, A>
where
    S: Sensors,
    A: Actuators,
{
    pub(crate) fn step_normal(&mut self, input_data: &InputData) -> Result<(), NavMgrError> {
        let line_position = self.sensors.read_line_position();
        let ir = self.sensors.read_ir_triple();

        self.report.line_position = Some(line_position);

        if self.detect_offroad(line_position, ir, input_data.time_s) {
            self.report.offroad_detected = true;
            self.begin_scan()?;
            return Ok(());
        }

        let mic = self.sensors.read_mic_triple();
        let (cmd, nudge) = self.steer_cmd(line_position, mic);
        self.report.mic_nudge = nudge;

        self.drive.exec(MotionCommand::Steer(cmd), &mut self.sensors)?;

        Ok(())
    }

    /// Compute the steering command for this cycle.
    ///
    /// The microphone baselines are updated before the comparison. Only the first microphone
    /// over its baseline (front right, rear, front left) nudges the vehicle.
    pub(crate) fn steer_cmd(
        &mut self,
        line_position: i32,
        mic: MicTriple,
    ) -> (SteerCmd, Option<MicNudge>) {
        let baselines = self.ctx.mic_baselines.update(mic);
        let margin = self.params.mic_margin as i64;

        let over = |i: usize| mic[i] as i64 > baselines[i] as i64 + margin;

        let mut cmd = SteerCmd {
            base_duty: self.params.base_duty,
            correction: (self.params.line_target - line_position) as f64,
            nudge_duty: 0.0,
        };

        let nudge = if over(MIC_FRONT_RIGHT) {
            cmd.nudge_duty = self.params.front_nudge_duty;
            Some(MicNudge::FrontRight)
        } else if over(MIC_REAR) {
            cmd.base_duty += self.params.rear_boost_duty;
            Some(MicNudge::Rear)
        } else if over(MIC_FRONT_LEFT) {
            cmd.nudge_duty = -self.params.front_nudge_duty;
            Some(MicNudge::FrontLeft)
        } else {
            None
        };

        if let Some(n) = nudge {
            debug!("{:?} nudge detected (mics {:?}, baselines {:?})", n, mic, baselines);
        }

        (cmd, nudge)
    }

    /// Update the IR baselines and decide if the vehicle has left the line.
    ///
    /// All IR channels must have been below their baselines for the off-road grace period, the
    /// re-acquisition grace must have expired, the line position must be in the unresolved centre
    /// band, and every channel must be below the absolute lower threshold.
    pub(crate) fn detect_offroad(
        &mut self,
        line_position: i32,
        ir: IrTriple,
        time_s: f64,
    ) -> bool {
        let baselines = self.ctx.ir_baselines.update(ir);

        let below_baseline = (0..NUM_CHANNELS)
            .all(|i| ir[i] as f64 + self.params.ir_margin < baselines[i]);

        if !below_baseline {
            self.ctx.offroad_since_s = None;
            return false;
        }

        let since_s = *self.ctx.offroad_since_s.get_or_insert(time_s);

        if time_s - since_s < self.params.offroad_grace_s
            || time_s < self.ctx.reacquire_until_s
        {
            return false;
        }

        let band = self.params.centred_band;
        let centred = line_position > band[0] && line_position < band[1];
        let dark = ir.iter().all(|&v| v < self.params.ir_lower_threshold);

        if centred && dark {
            debug!(
                "Off-road: IR {:?} (baselines {:?}), line position {}",
                ir, baselines, line_position
            );
        }

        centred && dark
    }

    /// Leave the line and start the calibration rotation of a radial scan.
    pub(crate) fn begin_scan(&mut self) -> Result<(), NavMgrError> {
        info!("Line lost, starting radial scan");

        self.update_state(NavState::Sensing);
        self.drive.disable()?;
        self.sensors.reset_encoder_ticks();

        let mut map = self.ctx.radial_map.take().unwrap_or_default();
        self.ctx.scanner.begin(&mut map);
        self.ctx.radial_map = Some(map);

        self.drive.begin_calibration_rotation(&mut self.sensors)?;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::sim::SimVehicle;
    use crate::nav_mgr::test::{instant_params, new_mgr};
    use crate::nav_mgr::NavMgrParams;

    #[test]
    fn test_steering_law() {
        let sim = SimVehicle::default();
        let mut mgr = new_mgr(&sim, instant_params());

        // Line to the left of centre
        let (cmd, nudge) = mgr.steer_cmd(900, [200; 3]);
        assert_eq!(nudge, None);
        assert_eq!(cmd.base_duty, 120.0);
        assert_eq!(cmd.correction, 100.0);
        assert_eq!(cmd.nudge_duty, 0.0);

        // Margin is exclusive, baseline 200 + 30
        let (_, nudge) = mgr.steer_cmd(1000, [230, 200, 200]);
        assert_eq!(nudge, None);

        let (cmd, nudge) = mgr.steer_cmd(1000, [260, 200, 200]);
        assert_eq!(nudge, Some(MicNudge::FrontRight));
        assert_eq!(cmd.nudge_duty, 150.0);

        let (cmd, nudge) = mgr.steer_cmd(1000, [200, 260, 200]);
        assert_eq!(nudge, Some(MicNudge::Rear));
        assert_eq!(cmd.base_duty, 320.0);
        assert_eq!(cmd.nudge_duty, 0.0);

        let (cmd, nudge) = mgr.steer_cmd(1000, [200, 200, 260]);
        assert_eq!(nudge, Some(MicNudge::FrontLeft));
        assert_eq!(cmd.nudge_duty, -150.0);

        // Front right takes priority
        let (_, nudge) = mgr.steer_cmd(1000, [300, 300, 300]);
        assert_eq!(nudge, Some(MicNudge::FrontRight));
    }

    #[test]
    fn test_nudge_written_to_wheels() {
        let sim = SimVehicle::default();
        let mut mgr = new_mgr(&sim, instant_params());

        sim.world_mut().mic = [200, 200, 400];
        mgr.step_normal(&InputData { time_s: 0.0 }).unwrap();

        // Steering right: left wheel faster
        assert_eq!(sim.world().outputs[0].0, 255);
        assert_eq!(sim.world().outputs[1].0, 0);
        assert_eq!(mgr.report.mic_nudge, Some(MicNudge::FrontLeft));

        // Nothing is written while movement is disabled
        mgr.drive.disable().unwrap();
        sim.world_mut().mic = [200; 3];
        mgr.step_normal(&InputData { time_s: 0.01 }).unwrap();
        assert_eq!(sim.world().outputs[0].0, 0);
    }

    #[test]
    fn test_offroad_grace() {
        let sim = SimVehicle::default();
        let params = NavMgrParams {
            offroad_grace_s: 0.1,
            ..instant_params()
        };
        let mut mgr = new_mgr(&sim, params);

        let dark = [1000; 3];

        // Must stay dark for the whole grace period
        assert!(!mgr.detect_offroad(1000, dark, 1.0));
        assert!(!mgr.detect_offroad(1000, dark, 1.05));
        assert!(mgr.detect_offroad(1000, dark, 1.1));

        // Seeing the line again restarts the grace period
        assert!(!mgr.detect_offroad(1000, [2000; 3], 1.2));
        assert!(!mgr.detect_offroad(1000, dark, 1.3));
        assert!(mgr.detect_offroad(1000, dark, 1.45));
    }

    #[test]
    fn test_offroad_conditions() {
        let sim = SimVehicle::default();
        let mut mgr = new_mgr(&sim, instant_params());

        // Line position at an edge of the array, the line went off to one side
        assert!(!mgr.detect_offroad(850, [1000; 3], 0.0));
        assert!(!mgr.detect_offroad(1150, [1000; 3], 0.0));
        assert!(mgr.detect_offroad(851, [1000; 3], 0.0));

        // One channel still reads the line
        assert!(!mgr.detect_offroad(1000, [1000, 1300, 1000], 0.0));

        // Below the baselines, but not dark enough
        assert!(!mgr.detect_offroad(1000, [1260; 3], 0.0));

        // Suppressed while re-acquiring
        mgr.ctx.reacquire_until_s = 5.0;
        assert!(!mgr.detect_offroad(1000, [1000; 3], 4.9));
        assert!(mgr.detect_offroad(1000, [1000; 3], 5.0));
    }
}
