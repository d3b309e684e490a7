//! # [`NavState::Blocked`] handling

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};

use super::{NavMgr, NavMgrError, NavState};
use crate::eqpt::{Actuators, Sensors};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S, A> NavMgr<S, A>
where
    S: Sensors,
    A: Actuators,
{
    /// Enter or leave the blocked state given a new distance reading.
    ///
    /// Entering stops the vehicle. Leaving restores the movement gate to what it was before the
    /// blockage and resumes the previous state, so a scan interrupted by an obstacle carries on
    /// where it stopped.
    pub(crate) fn handle_blockage(&mut self, distance_m: f64) -> Result<(), NavMgrError> {
        let tolerance_m = self.params.blockage_tolerance_m;

        match self.state {
            NavState::Blocked => {
                if distance_m > tolerance_m {
                    info!("Blockage cleared ({:.3} m)", distance_m);

                    if self.ctx.movement_before_block {
                        self.drive.enable();
                    }
                    self.revert_state();
                }
            }
            _ => {
                if distance_m < tolerance_m {
                    warn!("Blockage detected at {:.3} m, stopping", distance_m);

                    self.ctx.movement_before_block = self.drive.is_movement_enabled();
                    self.drive.disable()?;
                    self.update_state(NavState::Blocked);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::sim::SimVehicle;
    use crate::nav_mgr::test::{instant_params, new_mgr};

    #[test]
    fn test_handle_blockage() {
        let sim = SimVehicle::default();
        let mut mgr = new_mgr(&sim, instant_params());

        // At the tolerance is neither blocked nor clear
        mgr.handle_blockage(0.15).unwrap();
        assert_eq!(mgr.state(), NavState::Normal);

        mgr.handle_blockage(0.1).unwrap();
        assert_eq!(mgr.state(), NavState::Blocked);
        assert_eq!(mgr.previous_state(), Some(NavState::Normal));
        assert!(!mgr.drive().is_movement_enabled());

        mgr.handle_blockage(0.15).unwrap();
        assert_eq!(mgr.state(), NavState::Blocked);

        mgr.handle_blockage(0.2).unwrap();
        assert_eq!(mgr.state(), NavState::Normal);
        assert_eq!(mgr.previous_state(), None);
        assert!(mgr.drive().is_movement_enabled());
    }
}
