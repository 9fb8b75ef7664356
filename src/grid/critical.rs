use std::fmt;

use crate::devices::{DemandProfile, SmartMeter};

/// Kind of critical facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    Hospital = 0,
    FireStation = 1,
    PoliceStation = 2,
}

impl UnitType {
    /// Every facility kind, in the order the critical microgrid holds them.
    pub const ALL: [UnitType; 3] = [Self::Hospital, Self::FireStation, Self::PoliceStation];
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hospital => "HOSPITAL",
            Self::FireStation => "FIRE_STATION",
            Self::PoliceStation => "POLICE_STATION",
        };
        f.write_str(name)
    }
}

/// Critical facility with no battery of its own; it draws from the critical microgrid.
#[derive(Debug, Clone)]
pub struct CriticalFacility {
    kind: UnitType,
    meter: SmartMeter,
    demand: DemandProfile,
    consumed: f64,
}

impl CriticalFacility {
    pub fn new(kind: UnitType, meter: SmartMeter, demand: DemandProfile) -> Self {
        Self {
            kind,
            meter,
            demand,
            consumed: 0.0,
        }
    }

    pub fn kind(&self) -> UnitType {
        self.kind
    }

    pub fn meter(&self) -> &SmartMeter {
        &self.meter
    }

    pub fn meter_mut(&mut self) -> &mut SmartMeter {
        &mut self.meter
    }

    pub fn demand(&self) -> &DemandProfile {
        &self.demand
    }

    pub fn consumed(&self) -> f64 {
        self.consumed
    }

    pub fn add_consumed(&mut self, energy: f64) {
        self.consumed += energy;
    }
}
