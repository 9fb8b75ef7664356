//! Residential consumers: households, apartments, and the buildings holding them.

use serde::{Deserialize, Serialize};

use crate::devices::{Battery, Consumer, ConsumerParts, DemandProfile, SmartMeter};

/// Planar position of a household, as produced by the clustering step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Detached house with a private battery and separate in/out meters.
#[derive(Debug, Clone)]
pub struct Household {
    id: u64,
    location: Location,
    meter_in: SmartMeter,
    meter_out: SmartMeter,
    battery: Battery,
    demand: DemandProfile,
    consumed: f64,
}

impl Household {
    pub fn new(
        id: u64,
        location: Location,
        meter_in: SmartMeter,
        meter_out: SmartMeter,
        battery: Battery,
    ) -> Self {
        Self {
            id,
            location,
            meter_in,
            meter_out,
            battery,
            demand: DemandProfile::default(),
            consumed: 0.0,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn meter_in(&self) -> &SmartMeter {
        &self.meter_in
    }

    pub fn meter_out(&self) -> &SmartMeter {
        &self.meter_out
    }

    pub fn meter_in_mut(&mut self) -> &mut SmartMeter {
        &mut self.meter_in
    }

    pub fn meter_out_mut(&mut self) -> &mut SmartMeter {
        &mut self.meter_out
    }

    pub fn battery_mut(&mut self) -> &mut Battery {
        &mut self.battery
    }

    pub fn set_demand(&mut self, demand: DemandProfile) {
        self.demand = demand;
    }
}

impl Consumer for Household {
    fn id(&self) -> u64 {
        self.id
    }

    fn demand(&self) -> &DemandProfile {
        &self.demand
    }

    fn battery(&self) -> &Battery {
        &self.battery
    }

    fn consumed(&self) -> f64 {
        self.consumed
    }

    fn parts(&mut self) -> ConsumerParts<'_> {
        ConsumerParts {
            battery: &mut self.battery,
            inbound: &mut self.meter_in,
            outbound: Some(&mut self.meter_out),
            consumed: &mut self.consumed,
        }
    }

    fn consumer_type(&self) -> &'static str {
        "Household"
    }
}

/// Flat inside a building: one meter, one private battery.
#[derive(Debug, Clone)]
pub struct Apartment {
    id: u64,
    meter: SmartMeter,
    battery: Battery,
    demand: DemandProfile,
    consumed: f64,
}

impl Apartment {
    pub fn new(id: u64, meter: SmartMeter, battery: Battery) -> Self {
        Self {
            id,
            meter,
            battery,
            demand: DemandProfile::default(),
            consumed: 0.0,
        }
    }

    pub fn meter(&self) -> &SmartMeter {
        &self.meter
    }

    pub fn meter_mut(&mut self) -> &mut SmartMeter {
        &mut self.meter
    }

    pub fn battery_mut(&mut self) -> &mut Battery {
        &mut self.battery
    }

    pub fn set_demand(&mut self, demand: DemandProfile) {
        self.demand = demand;
    }
}

impl Consumer for Apartment {
    fn id(&self) -> u64 {
        self.id
    }

    fn demand(&self) -> &DemandProfile {
        &self.demand
    }

    fn battery(&self) -> &Battery {
        &self.battery
    }

    fn consumed(&self) -> f64 {
        self.consumed
    }

    fn parts(&mut self) -> ConsumerParts<'_> {
        ConsumerParts {
            battery: &mut self.battery,
            inbound: &mut self.meter,
            outbound: None,
            consumed: &mut self.consumed,
        }
    }

    fn consumer_type(&self) -> &'static str {
        "Apartment"
    }
}

/// Multi-unit building; apartment order is fixed at construction.
#[derive(Debug, Clone)]
pub struct Building {
    id: u64,
    apartments: Vec<Apartment>,
}

impl Building {
    pub fn new(id: u64, apartments: Vec<Apartment>) -> Self {
        Self { id, apartments }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn apartments(&self) -> &[Apartment] {
        &self.apartments
    }

    pub fn apartments_mut(&mut self) -> &mut [Apartment] {
        &mut self.apartments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{BatteryKind, BatteryProfile};

    fn battery() -> Battery {
        Battery::new(BatteryKind::Household, BatteryProfile::household(0.5))
    }

    #[test]
    fn household_parts_expose_both_meters() {
        let mut house = Household::new(
            3,
            Location::new(1.0, 2.0),
            SmartMeter::new(10),
            SmartMeter::new(11),
            battery(),
        );
        let parts = house.parts();
        assert_eq!(parts.inbound.id(), 10);
        assert_eq!(parts.outbound.map(|m| m.id()), Some(11));
        *parts.consumed += 5.0;
        assert_eq!(house.consumed(), 5.0);
        assert_eq!(house.consumer_type(), "Household");
    }

    #[test]
    fn apartment_has_no_outbound_meter() {
        let mut apartment = Apartment::new(0, SmartMeter::new(4), battery());
        assert!(apartment.parts().outbound.is_none());
    }

    #[test]
    fn location_finiteness() {
        assert!(Location::new(1.0, -3.0).is_finite());
        assert!(!Location::new(f64::NAN, 0.0).is_finite());
    }
}
