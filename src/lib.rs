//! Town-scale microgrid power distribution simulator.

/// Command-line parsing for the binary.
pub mod cli;
pub mod clustering;
pub mod config;
pub mod devices;
pub mod error;
/// Households, buildings, critical facilities, and their microgrids.
pub mod grid;
pub mod ids;
/// Meter log records and exports.
pub mod io;
pub mod runner;
/// Simulation engine, allocation, and hooks.
pub mod sim;
