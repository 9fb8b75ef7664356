//! Grid topology: households, buildings, and critical facilities grouped into microgrids.
//!
//! The topology is fixed once built; only batteries, loops, and meters change
//! during a run.

/// Hospital, fire station, and police station.
pub mod critical;
/// Households, apartments, and buildings.
pub mod household;
/// Microgrids and their local loops.
pub mod microgrid;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::clustering::{ClusterError, ClusterInput};
use crate::config::{BatteryConfig, DemandConfig, TopologyConfig};
use crate::devices::{Battery, BatteryKind, Consumer, DemandProfile, SmartMeter};
use crate::ids::EntityIds;

pub use critical::{CriticalFacility, UnitType};
pub use household::{Apartment, Building, Household, Location};
pub use microgrid::{
    BuildingsMicrogrid, CriticalMicrogrid, HousesMicrogrid, LocalLoop, MicrogridKind,
};

/// Every microgrid in the simulated town.
#[derive(Debug, Clone)]
pub struct Grid {
    house_microgrids: Vec<HousesMicrogrid>,
    buildings: BuildingsMicrogrid,
    critical: CriticalMicrogrid,
}

impl Grid {
    pub fn new(
        house_microgrids: Vec<HousesMicrogrid>,
        buildings: BuildingsMicrogrid,
        critical: CriticalMicrogrid,
    ) -> Self {
        Self {
            house_microgrids,
            buildings,
            critical,
        }
    }

    /// Builds the grid from clustering output.
    ///
    /// Each household battery picks its reserve threshold from
    /// `batteries.household_reserves`; shared batteries start at
    /// `batteries.microgrid_initial_level`.
    ///
    /// # Errors
    ///
    /// Returns a `ClusterError` if a cluster does not hold exactly ten locations.
    pub fn build<R: Rng>(
        clusters: &ClusterInput,
        topology: &TopologyConfig,
        batteries: &BatteryConfig,
        demand: &DemandConfig,
        ids: &mut EntityIds,
        rng: &mut R,
    ) -> Result<Self, ClusterError> {
        let mut house_microgrids = Vec::with_capacity(clusters.len());
        for (index, locations) in clusters.clusters().iter().enumerate() {
            let households: Vec<Household> = locations
                .iter()
                .map(|&location| {
                    let battery = household_battery(batteries, rng);
                    Household::new(
                        ids.households.next_id(),
                        location,
                        SmartMeter::new(ids.meters.next_id()),
                        SmartMeter::new(ids.meters.next_id()),
                        battery,
                    )
                })
                .collect();
            let households = households
                .try_into()
                .map_err(|rest: Vec<Household>| ClusterError::WrongSize {
                    index,
                    len: rest.len(),
                })?;
            house_microgrids.push(HousesMicrogrid::new(
                households,
                shared_battery(BatteryKind::Microgrid, batteries),
            ));
        }

        let buildings = std::array::from_fn(|_| {
            let apartments = (0..topology.apartments_per_building)
                .map(|_| {
                    Apartment::new(
                        ids.apartments.next_id(),
                        SmartMeter::new(ids.meters.next_id()),
                        household_battery(batteries, rng),
                    )
                })
                .collect();
            Building::new(ids.buildings.next_id(), apartments)
        });
        let buildings =
            BuildingsMicrogrid::new(buildings, shared_battery(BatteryKind::Microgrid, batteries));

        let members = UnitType::ALL.map(|kind| {
            CriticalFacility::new(
                kind,
                SmartMeter::new(ids.meters.next_id()),
                DemandProfile::Fixed(demand.critical_rate),
            )
        });
        let critical = CriticalMicrogrid::new(
            members,
            shared_battery(BatteryKind::CriticalMicrogrid, batteries),
        );

        Ok(Self::new(house_microgrids, buildings, critical))
    }

    pub fn house_microgrids(&self) -> &[HousesMicrogrid] {
        &self.house_microgrids
    }

    pub fn house_microgrids_mut(&mut self) -> &mut [HousesMicrogrid] {
        &mut self.house_microgrids
    }

    pub fn buildings(&self) -> &BuildingsMicrogrid {
        &self.buildings
    }

    pub fn buildings_mut(&mut self) -> &mut BuildingsMicrogrid {
        &mut self.buildings
    }

    pub fn critical(&self) -> &CriticalMicrogrid {
        &self.critical
    }

    pub fn critical_mut(&mut self) -> &mut CriticalMicrogrid {
        &mut self.critical
    }

    /// Households in microgrid order.
    pub fn households(&self) -> impl Iterator<Item = &Household> {
        self.house_microgrids.iter().flat_map(|m| m.households())
    }

    pub fn households_mut(&mut self) -> impl Iterator<Item = &mut Household> {
        self.house_microgrids
            .iter_mut()
            .flat_map(|m| m.households_mut().iter_mut())
    }

    pub fn household_count(&self) -> usize {
        self.house_microgrids.len() * microgrid::HOUSES_PER_MICROGRID
    }

    /// Cumulative consumption of every household, in microgrid order.
    pub fn household_consumption(&self) -> Vec<f64> {
        self.households().map(Consumer::consumed).collect()
    }

    /// Every smart meter: household in/out pairs, then apartments, then critical facilities.
    pub fn meters(&self) -> Vec<&SmartMeter> {
        let mut meters = Vec::new();
        for house in self.households() {
            meters.push(house.meter_in());
            meters.push(house.meter_out());
        }
        for building in self.buildings.buildings() {
            meters.extend(building.apartments().iter().map(Apartment::meter));
        }
        meters.extend(self.critical.members().iter().map(CriticalFacility::meter));
        meters
    }

    /// Runs `f` on every smart meter in the grid.
    pub fn for_each_meter_mut(&mut self, mut f: impl FnMut(&mut SmartMeter)) {
        for house in self.households_mut() {
            f(house.meter_in_mut());
            f(house.meter_out_mut());
        }
        for building in self.buildings.buildings_mut() {
            for apartment in building.apartments_mut() {
                f(apartment.meter_mut());
            }
        }
        let (members, _, _) = self.critical.split_mut();
        for member in members {
            f(member.meter_mut());
        }
    }
}

fn household_battery<R: Rng>(batteries: &BatteryConfig, rng: &mut R) -> Battery {
    let reserve = batteries
        .household_reserves
        .choose(rng)
        .copied()
        .unwrap_or(0.5);
    Battery::new(BatteryKind::Household, batteries.household_profile(reserve))
}

fn shared_battery(kind: BatteryKind, batteries: &BatteryConfig) -> Battery {
    let profile = match kind {
        BatteryKind::CriticalMicrogrid => batteries.critical_profile(),
        _ => batteries.microgrid_profile(),
    };
    let mut battery = Battery::new(kind, profile);
    battery.set_level(batteries.microgrid_initial_level);
    battery
}
