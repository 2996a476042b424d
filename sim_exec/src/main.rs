//! Main simulator executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Pose control processing
//!         - Robot model integration
//!         - Archiving
//!
//! Telecommands come from a timed script, whose timestamps are compared
//! against simulated time, and optionally from a single command given on the
//! command line which is executed before the first cycle.
//!
//! # Modules
//!
//! All modules (e.g. `robot`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::tc::Tc;
use sim_lib::{
    grid_map::GridMap,
    params::SimExecParams,
    pose_ctrl::PoseCtrl,
    robot::RobotState,
    sim_loop::{SimError, SimLoop},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::{StructOpt, clap::AppSettings};

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
    script_interpreter::{ScriptInterpreter, PendingTcs},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Grid robot simulator
#[derive(Debug, StructOpt)]
#[structopt(name = "sim_exec", global_setting = AppSettings::AllowNegativeNumbers)]
struct Args {
    /// Timed telecommand script to run
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Parameter file for the executable, relative to the params directory
    #[structopt(short, long, default_value = "sim_exec.toml")]
    params: String,

    /// Minimum log level, one of info, debug or trace
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Telecommand to execute before the first cycle
    #[structopt(subcommand)]
    tc: Option<Tc>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "sim_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Grid Robot Simulator Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let params: SimExecParams = util::params::load_or_default(&args.params)
        .wrap_err("Could not load exec params")?;

    if !(params.cycle_period_s > 0.0) || !params.cycle_period_s.is_finite() {
        return Err(eyre!(
            "The cycle period must be positive, found {} s", params.cycle_period_s
        ));
    }

    info!("Exec parameters loaded");
    debug!("{:#?}", params);

    // ---- INITIALISE TC SOURCE ----

    let mut script = match args.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path)
                .wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(si)
        }
        None => {
            info!("No script provided\n");
            None
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut robot = RobotState::default();
    robot.init("robot.toml", &session)
        .wrap_err("Failed to initialise the robot model")?;
    info!("Robot init complete");

    let mut pose_ctrl = PoseCtrl::default();
    pose_ctrl.init("pose_ctrl.toml", &session)
        .wrap_err("Failed to initialise PoseCtrl")?;
    info!("PoseCtrl init complete");

    let map = match params.map_file {
        Some(ref map_file) => {
            let path = host::sw_root_path(&[map_file.as_str()])
                .wrap_err("Could not find the software root")?;

            Some(GridMap::load(&path)
                .wrap_err_with(|| format!("Failed to load the map from {:?}", path))?)
        }
        None => {
            info!("No map file given, map commands will be rejected");
            None
        }
    };

    let mut sim = SimLoop::new(&params, robot, pose_ctrl, map)
        .wrap_err("Failed to initialise the simulation loop")?;

    sim.init_archive(&session)
        .wrap_err("Failed to create the trajectory archive")?;

    info!("Module initialisation complete\n");

    // ---- INITIAL TC ----

    let mut num_plans = 0usize;

    if let Some(ref tc) = args.tc {
        exec_tc(&mut sim, tc);
        save_plans(&mut sim, &mut num_plans);
    }

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);
    let mut end_of_script = script.is_none();

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- TELECOMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_tcs(sim.sim_time_s()) {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        exec_tc(&mut sim, tc);
                    }
                }
                PendingTcs::EndOfScript => {
                    if !end_of_script {
                        info!("End of TC script reached, waiting for motion to complete");
                        end_of_script = true;
                    }
                }
            }
        }

        save_plans(&mut sim, &mut num_plans);

        // ---- EXIT CONDITIONS ----

        if end_of_script && sim.is_motion_complete() {
            info!("Motion complete, stopping");
            break;
        }

        if sim.sim_time_s() >= params.max_duration_s {
            warn!(
                "Maximum simulation duration of {:.02} s reached, stopping",
                params.max_duration_s
            );
            break;
        }

        // ---- SIMULATION ----

        let output = sim.step();

        trace!(
            "Render pose: ({:.3}, {:.3}, {:.3})",
            output.render.x_m,
            output.render.y_m,
            output.render.theta_rad
        );

        // ---- WRITE ARCHIVES ----

        if let Err(e) = sim.write() {
            warn!("Could not archive the simulation state: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        if params.real_time {
            let cycle_dur = Instant::now() - cycle_start_instant;

            // Get sleep duration
            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                )
            }
        }
    }

    // ---- SHUTDOWN ----

    let pose = sim.robot().pose();
    info!(
        "Final pose after {:.02} s ({} cycles): ({:.3}, {:.3}, {:.3})",
        sim.sim_time_s(),
        sim.num_cycles(),
        pose.x_m,
        pose.y_m,
        pose.theta_rad
    );

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Execute a telecommand, reporting any failure.
///
/// A TC which can't be executed doesn't stop the simulation.
fn exec_tc(sim: &mut SimLoop, tc: &Tc) {
    match sim.exec_tc(tc) {
        Ok(()) => (),
        Err(e @ SimError::GoalUnreachable { .. }) => error!("{}", e),
        Err(e) => warn!("Could not execute {:?}: {}", tc, e)
    }
}

/// Save any planning results into the session.
fn save_plans(sim: &mut SimLoop, num_plans: &mut usize) {
    for plan in sim.take_plans() {
        session::save_with_timestamp(format!("plans/path_{}.json", num_plans), plan);
        *num_plans += 1;
    }
}
