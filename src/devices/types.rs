//! Common types and traits for battery-owning consumers.

use super::battery::Battery;
use super::demand::DemandProfile;
use super::meter::SmartMeter;

/// Mutable view of a consumer's state, split so the allocation engine can
/// touch the battery and meters at the same time.
pub struct ConsumerParts<'a> {
    pub battery: &'a mut Battery,
    /// Meter that records draws from the grid.
    pub inbound: &'a mut SmartMeter,
    /// Meter that records surplus fed back out, when the consumer has one.
    pub outbound: Option<&'a mut SmartMeter>,
    /// Cumulative energy consumed.
    pub consumed: &'a mut f64,
}

/// An entity with its own battery whose demand is resolved every tick.
///
/// Implemented by households and apartments so the allocation decision tree
/// is written once.
pub trait Consumer {
    /// Entity id, unique within its kind.
    fn id(&self) -> u64;

    /// Demand profile driving this consumer's per-tick need.
    fn demand(&self) -> &DemandProfile;

    fn battery(&self) -> &Battery;

    /// Cumulative energy consumed so far.
    fn consumed(&self) -> f64;

    /// Splits the consumer into independently borrowable parts.
    fn parts(&mut self) -> ConsumerParts<'_>;

    /// Human-readable type name for diagnostics.
    fn consumer_type(&self) -> &'static str;
}
