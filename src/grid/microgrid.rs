//! Microgrids: fixed groups of consumers sharing a surplus pool and a battery.

use std::fmt;

use crate::devices::Battery;

use super::critical::CriticalFacility;
use super::household::{Building, Household};

/// Households per houses-microgrid.
pub const HOUSES_PER_MICROGRID: usize = 10;

/// Buildings per buildings-microgrid.
pub const BUILDINGS_PER_MICROGRID: usize = 3;

/// A microgrid's instantaneous surplus counter.
///
/// `consume` is unconditional and may drive the pool negative; callers check
/// [`LocalLoop::has_extra_power`] immediately before consuming.
#[derive(Debug, Clone, Default)]
pub struct LocalLoop {
    flowing: f64,
}

impl LocalLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed surplus; positive means energy is available.
    pub fn flowing(&self) -> f64 {
        self.flowing
    }

    pub fn add(&mut self, amount: f64) {
        self.flowing += amount;
    }

    pub fn consume(&mut self, amount: f64) {
        self.flowing -= amount;
    }

    pub fn has_extra_power(&self) -> bool {
        self.flowing > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MicrogridKind {
    Houses = 1,
    Buildings = 2,
    Critical = 3,
}

/// Ten clustered households with a shared battery and local loop.
#[derive(Debug, Clone)]
pub struct HousesMicrogrid {
    households: [Household; HOUSES_PER_MICROGRID],
    battery: Battery,
    local_loop: LocalLoop,
}

impl HousesMicrogrid {
    pub fn new(households: [Household; HOUSES_PER_MICROGRID], battery: Battery) -> Self {
        Self {
            households,
            battery,
            local_loop: LocalLoop::new(),
        }
    }

    pub fn kind(&self) -> MicrogridKind {
        MicrogridKind::Houses
    }

    pub fn households(&self) -> &[Household] {
        &self.households
    }

    pub fn households_mut(&mut self) -> &mut [Household] {
        &mut self.households
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn local_loop(&self) -> &LocalLoop {
        &self.local_loop
    }

    pub fn local_loop_mut(&mut self) -> &mut LocalLoop {
        &mut self.local_loop
    }

    /// Households together with the loop they share, borrowed disjointly.
    pub fn split_mut(&mut self) -> (&mut [Household], &mut LocalLoop) {
        (&mut self.households, &mut self.local_loop)
    }
}

impl fmt::Display for HousesMicrogrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::devices::Consumer;

        let ids: Vec<String> = self.households.iter().map(|h| h.id().to_string()).collect();
        write!(f, "<{}>", ids.join(", "))
    }
}

/// Three apartment buildings with a shared battery and local loop.
#[derive(Debug, Clone)]
pub struct BuildingsMicrogrid {
    buildings: [Building; BUILDINGS_PER_MICROGRID],
    battery: Battery,
    local_loop: LocalLoop,
}

impl BuildingsMicrogrid {
    pub fn new(buildings: [Building; BUILDINGS_PER_MICROGRID], battery: Battery) -> Self {
        Self {
            buildings,
            battery,
            local_loop: LocalLoop::new(),
        }
    }

    pub fn kind(&self) -> MicrogridKind {
        MicrogridKind::Buildings
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn buildings_mut(&mut self) -> &mut [Building] {
        &mut self.buildings
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn local_loop(&self) -> &LocalLoop {
        &self.local_loop
    }

    pub fn local_loop_mut(&mut self) -> &mut LocalLoop {
        &mut self.local_loop
    }

    pub fn split_mut(&mut self) -> (&mut [Building], &mut LocalLoop) {
        (&mut self.buildings, &mut self.local_loop)
    }
}

impl fmt::Display for BuildingsMicrogrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.buildings.iter().map(|b| b.id().to_string()).collect();
        write!(f, "BuildingsMicrogrid<{}>", ids.join(", "))
    }
}

/// Hospital, fire station, and police station on a high-reserve battery.
#[derive(Debug, Clone)]
pub struct CriticalMicrogrid {
    members: [CriticalFacility; 3],
    battery: Battery,
    local_loop: LocalLoop,
}

impl CriticalMicrogrid {
    pub fn new(members: [CriticalFacility; 3], battery: Battery) -> Self {
        Self {
            members,
            battery,
            local_loop: LocalLoop::new(),
        }
    }

    pub fn kind(&self) -> MicrogridKind {
        MicrogridKind::Critical
    }

    pub fn members(&self) -> &[CriticalFacility] {
        &self.members
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn local_loop(&self) -> &LocalLoop {
        &self.local_loop
    }

    pub fn local_loop_mut(&mut self) -> &mut LocalLoop {
        &mut self.local_loop
    }

    /// Members, shared battery, and loop, borrowed disjointly.
    pub fn split_mut(&mut self) -> (&mut [CriticalFacility], &mut Battery, &mut LocalLoop) {
        (&mut self.members, &mut self.battery, &mut self.local_loop)
    }
}
