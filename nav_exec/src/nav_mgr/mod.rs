//! # NavMgr module
//!
//! This module implements the [`NavMgr`] state machine, which orchestrates line following,
//! re-acquisition of a lost line, and blockage handling. The machine has three states:
//!
//! - `Normal` - Follow the line, steering on the line position and on microphone nudges.
//! - `Sensing` - The line has been lost, turn a full circle recording a radial reflectance map,
//!   then turn to the best heading in that map.
//! - `Blocked` - An obstacle is in front of the vehicle, movement is stopped until it clears.
//!
//! A single previous state is remembered so that the machine can resume where it was once a
//! blockage clears.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod blocked;
mod normal;
mod params;
mod sensing;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use serde::Serialize;

pub use normal::MicNudge;
pub use params::NavMgrParams;
pub use sensing::ScanRecord;

use crate::drive_ctrl::{DriveCtrl, DriveCtrlError};
use crate::eqpt::{Actuators, Sensors};
use crate::filter::TripleBaseline;
use crate::radial_scan::{RadialMap, RadialScanner};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation Manager
///
/// Owns the sensors, the drive controller, and all navigation state of the vehicle.
pub struct NavMgr<S, A> {
    pub(crate) params: NavMgrParams,

    state: NavState,

    /// State to resume once the current one is left through [`NavMgr::revert_state`].
    previous: Option<NavState>,

    pub(crate) ctx: NavCtx,

    pub(crate) drive: DriveCtrl<A>,

    pub(crate) sensors: S,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Navigation context, the data which persists across all states.
#[derive(Debug, Clone)]
pub struct NavCtx {
    /// Adaptive baselines of the microphones, indexed as the mic triple.
    pub mic_baselines: TripleBaseline,

    /// Adaptive baselines of the IR channels.
    pub ir_baselines: TripleBaseline,

    /// Time at which all IR channels first dropped below their baselines, if they are still
    /// below.
    pub offroad_since_s: Option<f64>,

    /// Off-road detection is suppressed until this time.
    pub reacquire_until_s: f64,

    /// Time of the next distance sensor read.
    pub next_distance_poll_s: f64,

    /// Whether movement was enabled when the current blockage started.
    pub movement_before_block: bool,

    /// Map of the scan in progress, only present in `Sensing`.
    pub radial_map: Option<RadialMap>,

    pub scanner: RadialScanner,

    /// Heading selected by the most recent scan.
    pub last_heading_deg: Option<u16>,

    /// Number of scans completed.
    pub num_scans: u64,
}

/// Input data to the navigation manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Time of this cycle.
    ///
    /// Units: seconds, from any fixed epoch
    pub time_s: f64,
}

/// Output of one navigation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    /// State at the end of the cycle.
    pub state: NavState,

    /// Heading adopted in this cycle, if a scan completed.
    pub new_heading_deg: Option<u16>,
}

/// Status report for NavMgr processing, archived once per cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub time_s: f64,
    pub state: NavState,
    pub previous_state: Option<NavState>,
    pub movement_enabled: bool,

    pub line_position: Option<i32>,
    pub mic_nudge: Option<MicNudge>,
    pub offroad_detected: bool,
    pub distance_m: Option<f64>,

    pub left_duty: u16,
    pub right_duty: u16,

    pub left_ticks: Option<u32>,
    pub right_ticks: Option<u32>,
    pub scan_slot: Option<usize>,
    pub new_heading_deg: Option<u16>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// States of the navigation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavState {
    Normal,
    Sensing,
    Blocked,
}

/// Errors that can occur in the navigation manager.
#[derive(Debug, thiserror::Error)]
pub enum NavMgrError {
    #[error("Failed to load NavMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid NavMgr parameters: {0}")]
    InvalidParams(String),

    #[error("Could not create the NavMgr archives: {0}")]
    ArchiveInitError(ArchiveError),

    #[error("Error in DriveCtrl: {0}")]
    DriveCtrl(#[from] DriveCtrlError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavState {
    fn default() -> Self {
        NavState::Normal
    }
}

impl NavCtx {
    fn new(params: &NavMgrParams) -> Self {
        Self {
            mic_baselines: TripleBaseline::new(params.mic_seed),
            ir_baselines: TripleBaseline::new(params.ir_seed),
            offroad_since_s: None,
            reacquire_until_s: 0.0,
            next_distance_poll_s: 0.0,
            movement_before_block: false,
            radial_map: None,
            scanner: RadialScanner::new(params.scan),
            last_heading_deg: None,
            num_scans: 0,
        }
    }
}

impl<S, A> NavMgr<S, A>
where
    S: Sensors,
    A: Actuators,
{
    /// Create a new manager with the default parameters, in `Normal` with movement enabled.
    pub fn new(sensors: S, actuators: A) -> Result<Self, NavMgrError> {
        Self::with_params(NavMgrParams::default(), sensors, actuators)
    }

    /// Create a new manager with the given parameters, in `Normal` with movement enabled.
    pub fn with_params(
        params: NavMgrParams,
        sensors: S,
        actuators: A,
    ) -> Result<Self, NavMgrError> {
        params.are_valid()?;

        let mut drive = DriveCtrl::new(params.drive.clone(), actuators)?;
        drive.enable();

        Ok(Self {
            ctx: NavCtx::new(&params),
            params,
            state: NavState::Normal,
            previous: None,
            drive,
            sensors,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        })
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn previous_state(&self) -> Option<NavState> {
        self.previous
    }

    pub fn params(&self) -> &NavMgrParams {
        &self.params
    }

    pub fn ctx(&self) -> &NavCtx {
        &self.ctx
    }

    pub fn drive(&self) -> &DriveCtrl<A> {
        &self.drive
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// Run a blocking straight drive, outside of the cyclic processing.
    pub fn drive_blocking(&mut self, distance_mm: i32) -> Result<(), NavMgrError> {
        self.drive
            .drive_blocking(distance_mm, &mut self.sensors)
            .map_err(NavMgrError::from)
    }

    /// Move into a new state, remembering the current one.
    pub(crate) fn update_state(&mut self, new_state: NavState) {
        info!("NavMgr state change: {:?} -> {:?}", self.state, new_state);

        self.previous = Some(self.state);
        self.state = new_state;
    }

    /// Move back into the remembered state, or `Normal` if there is none.
    pub(crate) fn revert_state(&mut self) {
        let new_state = self.previous.take().unwrap_or(NavState::Normal);

        info!("NavMgr reverting: {:?} -> {:?}", self.state, new_state);

        self.state = new_state;
    }
}

impl<S, A> State for NavMgr<S, A>
where
    S: Sensors,
    A: Actuators,
{
    type InitData = &'static str;
    type InitError = NavMgrError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = NavMgrError;

    /// Initialise the NavMgr module.
    ///
    /// Expected init data is the path to the parameter file. Navigation state is reset.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: NavMgrParams =
            util::params::load(init_data).map_err(NavMgrError::ParamLoadError)?;
        params.are_valid()?;

        self.drive.set_params(params.drive.clone())?;
        self.drive.enable();

        self.ctx = NavCtx::new(&params);
        self.params = params;
        self.state = NavState::Normal;
        self.previous = None;

        self.arch_report = Archiver::from_path(session, "nav_mgr/status_report.csv")
            .map_err(NavMgrError::ArchiveInitError)?;

        Ok(())
    }

    /// Perform one cycle of navigation.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport {
            time_s: input_data.time_s,
            ..Default::default()
        };

        // The distance sensor is slow, so only poll it periodically, but in every state so that a
        // blockage during a scan is caught too.
        if input_data.time_s >= self.ctx.next_distance_poll_s {
            self.ctx.next_distance_poll_s = input_data.time_s + self.params.distance_poll_period_s;

            let distance_m = self.sensors.read_distance_m();
            self.report.distance_m = Some(distance_m);

            self.handle_blockage(distance_m)?;
        }

        let mut output = OutputData::default();

        match self.state {
            NavState::Normal => self.step_normal(input_data)?,
            NavState::Sensing => output.new_heading_deg = self.step_sensing(input_data)?,
            NavState::Blocked => (),
        }

        output.state = self.state;

        let [left, right] = self.drive.outputs();
        self.report.state = self.state;
        self.report.previous_state = self.previous;
        self.report.movement_enabled = self.drive.is_movement_enabled();
        self.report.left_duty = left.duty;
        self.report.right_duty = right.duty;
        self.report.new_heading_deg = output.new_heading_deg;

        Ok((output, self.report))
    }
}

impl<S, A> Archived for NavMgr<S, A> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
