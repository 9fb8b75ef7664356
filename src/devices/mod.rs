//! Device models owned by grid entities: batteries, meters, and demand.

/// Energy storage with a minimum-reserve policy.
pub mod battery;
/// Per-second demand profiles.
pub mod demand;
/// Append-only smart meters.
pub mod meter;
pub mod types;

pub use battery::{Battery, BatteryKind, BatteryProfile};
pub use demand::DemandProfile;
pub use meter::SmartMeter;
pub use types::{Consumer, ConsumerParts};
