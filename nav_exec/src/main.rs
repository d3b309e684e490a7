//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging, and parameters
//!     - Build the vehicle's equipment layer
//!     - Initialise the navigation manager
//!     - Optionally perform a blocking test drive
//!     - Main loop, one cooperative cycle at a fixed period:
//!         - Update the simulated surroundings
//!         - Navigation processing
//!         - Archiving
//!
//! # Modules
//!
//! All cyclic modules (e.g. `nav_mgr`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod scenario;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use nav_lib::{
    nav_mgr::{InputData, NavMgr},
    params::NavExecParams,
};
use scenario::SimScenario;
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Line rover navigation executable
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec")]
struct Opt {
    /// Stop after this many cycles, run until killed if not given
    #[structopt(long)]
    cycles: Option<u64>,

    /// Drive this far in a straight line before entering the main loop
    ///
    /// Units: millimeters, negative to reverse
    #[structopt(long, allow_hyphen_values = true)]
    drive_test_mm: Option<i32>,

    /// Minimum log level, at least info
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, keeping the per-sample scan trace out of the log
    logger_init(
        opt.log_level,
        &[("nav_lib::radial_scan::scanner", LevelFilter::Debug)],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Line Rover Navigation Executable\n");
    info!("Running on: {}", host::target_description());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load exec params")?;
    exec_params
        .are_valid()
        .map_err(|e| eyre!("Invalid exec params: {}", e))?;

    info!("Exec parameters loaded");

    // ---- INITIALISE EQUIPMENT ----

    let mut scenario = SimScenario::new(exec_params.sim.clone());
    let vehicle = scenario.vehicle().clone();

    info!("Simulated vehicle initialised");

    // ---- INITIALISE MODULES ----

    let mut nav_mgr = NavMgr::new(vehicle.sensors(), vehicle.actuators())
        .wrap_err("Failed to create NavMgr")?;
    nav_mgr
        .init("nav_mgr.toml", &session)
        .wrap_err("Failed to initialise NavMgr")?;

    info!("NavMgr initialised");

    if let Some(distance_mm) = opt.drive_test_mm {
        info!("Performing a {} mm test drive", distance_mm);
        nav_mgr
            .drive_blocking(distance_mm)
            .wrap_err("Test drive failed")?;
    }

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut num_cycles: u64 = 0;
    let mut num_consec_cycle_overruns: u64 = 0;

    loop {
        if let Some(max_cycles) = opt.cycles {
            if num_cycles >= max_cycles {
                info!("Completed {} cycles", num_cycles);
                break;
            }
        }

        // Get the current time
        let cycle_start_instant = Instant::now();

        // ---- SIMULATION ----

        scenario.update(num_cycles, nav_mgr.state());

        // ---- NAVIGATION PROCESSING ----

        let input = InputData {
            time_s: session::get_elapsed_seconds(),
        };

        match nav_mgr.proc(&input) {
            Ok((output, _)) => {
                if let Some(heading_deg) = output.new_heading_deg {
                    info!("New heading adopted: {} deg", heading_deg);
                }
            }
            Err(e) => warn!("Error during NavMgr processing: {}", e),
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = nav_mgr.write() {
            warn!("Could not archive NavMgr: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                num_consec_cycle_overruns += 1;

                if num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    session.exit();
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}
