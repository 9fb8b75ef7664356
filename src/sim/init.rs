//! Start-of-run assignment of demand profiles and battery levels.

use rand::Rng;

use crate::config::{BatteryConfig, DemandConfig};
use crate::devices::{Battery, Consumer, DemandProfile};
use crate::grid::Grid;

/// Demand profile for the consumer at global position `index`.
///
/// Every `high_use_every`-th consumer, starting with the first, draws in the
/// high band; the rest draw in the low band.
pub fn demand_for(index: usize, demand: &DemandConfig) -> DemandProfile {
    if demand.high_use_every > 0 && index % demand.high_use_every == 0 {
        DemandProfile::Uniform {
            low: demand.high_min,
            high: demand.high_max,
        }
    } else {
        DemandProfile::Uniform {
            low: demand.low_min,
            high: demand.low_max,
        }
    }
}

/// Seeds a battery uniformly within `[reserve, reserve + band]`, capped at full.
pub fn seed_level<R: Rng>(battery: &mut Battery, band: f64, rng: &mut R) {
    let reserve = battery.reserve();
    let ratio = if band > 0.0 {
        rng.random_range(reserve..=reserve + band)
    } else {
        reserve
    };
    battery.set_level(ratio);
}

/// Assigns demand profiles and seeds the level of every household and apartment battery.
///
/// Households are numbered across microgrids in grid order; apartments are
/// numbered separately in building order.
pub fn initialize<R: Rng>(
    grid: &mut Grid,
    demand: &DemandConfig,
    batteries: &BatteryConfig,
    rng: &mut R,
) {
    for (index, house) in grid.households_mut().enumerate() {
        house.set_demand(demand_for(index, demand));
        seed_level(house.battery_mut(), batteries.seed_band, rng);
    }

    let apartments = grid
        .buildings_mut()
        .buildings_mut()
        .iter_mut()
        .flat_map(|b| b.apartments_mut().iter_mut());
    for (index, apartment) in apartments.enumerate() {
        apartment.set_demand(demand_for(index, demand));
        seed_level(apartment.battery_mut(), batteries.seed_band, rng);
    }

    let at_or_above = grid
        .households()
        .filter(|h| h.battery().level_normalized() >= h.battery().reserve())
        .count();
    tracing::debug!(
        households = grid.household_count(),
        at_or_above,
        "household batteries seeded"
    );
}
