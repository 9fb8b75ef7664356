//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use microgrid_sim::clustering::ClusterInput;
use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::devices::{Battery, BatteryKind, BatteryProfile, Consumer, DemandProfile};
use microgrid_sim::grid::Grid;
use microgrid_sim::ids::EntityIds;
use microgrid_sim::sim::engine::Engine;
use microgrid_sim::sim::hooks::{Coordinator, LogReporter, NoopCoordinator, Reporter};
use microgrid_sim::sim::report::ConsumptionReport;
use microgrid_sim::sim::types::SimConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Baseline scenario shrunk to `microgrids` houses-microgrids, no apartments, and `horizon` seconds.
pub fn small_scenario(microgrids: usize, horizon: u32) -> ScenarioConfig {
    let mut scenario = ScenarioConfig::baseline();
    scenario.topology.house_microgrids = microgrids;
    scenario.topology.apartments_per_building = 0;
    scenario.simulation.horizon_seconds = horizon;
    scenario
}

/// Grid whose household batteries sit exactly at their reserve with a fixed demand of `rate`.
pub fn reserve_grid(microgrids: usize, rate: f64) -> (Grid, StdRng) {
    let scenario = small_scenario(microgrids, 15);
    let mut rng = StdRng::seed_from_u64(scenario.simulation.seed);
    let clusters = ClusterInput::scatter(microgrids, &mut rng);
    let mut grid = Grid::build(
        &clusters,
        &scenario.topology,
        &scenario.battery,
        &scenario.demand,
        &mut EntityIds::default(),
        &mut rng,
    )
    .expect("scattered clusters are valid");
    for house in grid.households_mut() {
        let reserve = house.battery().reserve();
        house.battery_mut().set_level(reserve);
        house.set_demand(DemandProfile::Fixed(rate));
    }
    (grid, rng)
}

/// Central utility battery at `level` (normalized).
pub fn central(level: f64) -> Battery {
    let mut battery = Battery::new(BatteryKind::CentralUtility, BatteryProfile::central());
    battery.set_level(level);
    battery
}

/// Engine over `grid` with 15 s ticks and the given horizon, using no-op hooks.
pub fn engine(
    grid: Grid,
    rng: StdRng,
    central_level: f64,
    horizon: u32,
) -> Engine<NoopCoordinator, LogReporter> {
    Engine::new(
        SimConfig::new(15, horizon),
        grid,
        central(central_level),
        NoopCoordinator,
        LogReporter,
        rng,
    )
}

/// Coordinator that remembers when it was called.
#[derive(Debug, Default)]
pub struct CountingCoordinator {
    pub times: Vec<u32>,
}

impl Coordinator for CountingCoordinator {
    fn coordinate(&mut self, time: u32, _grid: &Grid) {
        self.times.push(time);
    }
}

/// Reporter that keeps every report it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub reports: Vec<(u32, ConsumptionReport)>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, time: u32, report: &ConsumptionReport, consumption: &[f64]) {
        assert_eq!(report.households, consumption.len());
        self.reports.push((time, report.clone()));
    }
}
