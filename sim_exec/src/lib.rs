//! # Simulator library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the simulator crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - global state of the simulator executable
pub mod data_store;

/// Grid map - cell connectivity, cost field and path planning
pub mod grid_map;

/// Executable parameters
pub mod params;

/// Pose control - drives the robot to target poses
pub mod pose_ctrl;

/// Robot model - differential drive kinematics and the lift
pub mod robot;

/// Simulation loop - fixed step orchestration of the other modules
pub mod sim_loop;

/// Telecommand processor - applies TCs to the data store
pub mod tc_processor;
