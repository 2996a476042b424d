//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the simulator: the
//! telecommands accepted by the simulation loop and the telemetry it produces.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Telemetry records produced by the simulator
pub mod tm;
