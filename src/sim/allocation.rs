//! Per-consumer supply decisions for one tick.
//!
//! A consumer at or below its reserve first tries the microgrid's local loop,
//! then the central utility battery. A consumer above its reserve always
//! serves itself. Every consumer then trickle-charges, and a full battery
//! credits its outbound meter.

use tracing::debug;

use crate::devices::{Battery, Consumer};
use crate::grid::{CriticalFacility, LocalLoop};
use crate::ids::RecordIds;
use crate::io::records::MeterState;

use super::types::{SimConfig, TickSummary};

/// Where a consumer's demand was served from in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supply {
    LocalLoop,
    OwnBattery,
    /// Critical microgrid battery.
    SharedBattery,
    Central,
    Shortfall,
}

/// Outcome of one allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub supply: Supply,
    /// Energy actually handed to the consumer.
    pub delivered: f64,
    /// Energy credited to the outbound side because the battery was full.
    pub surplus_credit: f64,
}

impl Allocation {
    /// Folds this allocation into a tick summary.
    pub fn tally(&self, summary: &mut TickSummary) {
        match self.supply {
            Supply::LocalLoop => summary.local_loop_draws += 1,
            Supply::OwnBattery => summary.own_battery_draws += 1,
            Supply::SharedBattery => summary.shared_battery_draws += 1,
            Supply::Central => summary.central_draws += 1,
            Supply::Shortfall => summary.shortfalls += 1,
        }
        summary.total_consumed += self.delivered;
    }
}

/// Resolves one tick of demand for a battery-owning consumer.
///
/// `power_needed` is the energy required over the whole tick. The central
/// battery is depleted by `power_needed / (central.drain_rate * tick)`, so it
/// releases exactly `power_needed` unless it runs dry.
pub fn allocate<C: Consumer>(
    consumer: &mut C,
    power_needed: f64,
    local_loop: &mut LocalLoop,
    central: &mut Battery,
    config: &SimConfig,
    time: u32,
    ids: &mut RecordIds,
) -> Allocation {
    let tick = config.tick_seconds;
    let id = consumer.id();
    let kind = consumer.consumer_type();
    let parts = consumer.parts();

    let (supply, delivered) = if parts.battery.is_above_reserve() {
        let ratio = parts.battery.ratio_for(power_needed, tick);
        (Supply::OwnBattery, parts.battery.deplete(ratio, tick))
    } else if local_loop.has_extra_power() {
        local_loop.consume(power_needed);
        (Supply::LocalLoop, power_needed)
    } else if !central.is_empty() {
        let ratio = central.ratio_for(power_needed, tick);
        let delivered = central.deplete(ratio, tick);
        parts.inbound.add_through(delivered);
        (Supply::Central, delivered)
    } else {
        debug!(consumer = id, kind, time, power_needed, "no supply available");
        (Supply::Shortfall, 0.0)
    };

    update_connection(parts.inbound, supply, time, ids);
    *parts.consumed += delivered;

    parts.battery.charge(config.trickle_ratio, tick);

    let mut surplus_credit = 0.0;
    if parts.battery.is_full() {
        surplus_credit = parts.battery.drain_rate();
        if let Some(outbound) = parts.outbound {
            outbound.add_through(surplus_credit);
        }
        if config.share_surplus {
            local_loop.add(surplus_credit);
        }
    }

    Allocation {
        supply,
        delivered,
        surplus_credit,
    }
}

/// Resolves one tick of demand for a critical facility.
///
/// Order: local loop, then the critical microgrid battery while above its
/// reserve, then the central battery.
#[expect(clippy::too_many_arguments)]
pub fn allocate_critical(
    facility: &mut CriticalFacility,
    power_needed: f64,
    battery: &mut Battery,
    local_loop: &mut LocalLoop,
    central: &mut Battery,
    config: &SimConfig,
    time: u32,
    ids: &mut RecordIds,
) -> Allocation {
    let tick = config.tick_seconds;

    let (supply, delivered) = if local_loop.has_extra_power() {
        local_loop.consume(power_needed);
        (Supply::LocalLoop, power_needed)
    } else if battery.is_above_reserve() {
        let ratio = battery.ratio_for(power_needed, tick);
        (Supply::SharedBattery, battery.deplete(ratio, tick))
    } else if !central.is_empty() {
        let ratio = central.ratio_for(power_needed, tick);
        let delivered = central.deplete(ratio, tick);
        facility.meter_mut().add_through(delivered);
        (Supply::Central, delivered)
    } else {
        debug!(facility = %facility.kind(), time, power_needed, "no supply available");
        (Supply::Shortfall, 0.0)
    };

    update_connection(facility.meter_mut(), supply, time, ids);
    facility.add_consumed(delivered);

    Allocation {
        supply,
        delivered,
        surplus_credit: 0.0,
    }
}

/// Disconnects the meter on a shortfall and reconnects it on the next supply.
fn update_connection(
    meter: &mut crate::devices::SmartMeter,
    supply: Supply,
    time: u32,
    ids: &mut RecordIds,
) {
    if supply == Supply::Shortfall {
        meter.transition(MeterState::DisconnectedFromPowerNet, time, ids);
    } else if meter.state() == MeterState::DisconnectedFromPowerNet {
        meter.transition(MeterState::RunningOnPowerNet, time, ids);
    }
}
