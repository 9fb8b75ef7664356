/// Per-consumer supply decisions.
pub mod allocation;
/// Simulation clock for tick management.
pub mod clock;
pub mod engine;
/// Coordinator and reporter extension points.
pub mod hooks;
pub mod init;
pub mod report;
pub mod types;
