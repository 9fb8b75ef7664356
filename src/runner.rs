//! Scenario-driven construction of a ready-to-run engine.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::clustering::ClusterInput;
use crate::config::ScenarioConfig;
use crate::devices::{Battery, BatteryKind};
use crate::error::SimError;
use crate::grid::Grid;
use crate::ids::EntityIds;
use crate::sim::engine::Engine;
use crate::sim::hooks::{Coordinator, Reporter};
use crate::sim::init::initialize;
use crate::sim::report::ConsumptionReport;
use crate::sim::types::{SimConfig, TickSummary};

/// Everything a finished run leaves behind.
pub struct SimulationResult {
    pub summaries: Vec<TickSummary>,
    pub report: ConsumptionReport,
    pub grid: Grid,
    /// Central utility battery level at the end of the run.
    pub central_level: f64,
}

/// Central utility battery at the scenario's starting level.
pub fn central_battery(scenario: &ScenarioConfig) -> Battery {
    let mut central = Battery::new(
        BatteryKind::CentralUtility,
        scenario.battery.central_profile(),
    );
    central.set_level(scenario.battery.central_initial_level);
    central
}

/// Validates the scenario, builds and initializes the grid, and wraps it in an engine.
///
/// Without `clusters`, household locations are scattered using the scenario
/// seed. All randomness in the run flows from `scenario.simulation.seed`.
///
/// # Errors
///
/// Returns `SimError::Config` listing every validation failure, or
/// `SimError::Clustering` if the clusters cannot form microgrids.
pub fn build_engine<C: Coordinator, R: Reporter>(
    scenario: &ScenarioConfig,
    clusters: Option<ClusterInput>,
    coordinator: C,
    reporter: R,
) -> Result<Engine<C, R>, SimError> {
    let errors = scenario.validate();
    if !errors.is_empty() {
        return Err(SimError::Config(errors));
    }

    let mut rng = StdRng::seed_from_u64(scenario.simulation.seed);
    let clusters = match clusters {
        Some(clusters) => clusters,
        None => ClusterInput::scatter(scenario.topology.house_microgrids, &mut rng),
    };

    let mut ids = EntityIds::default();
    let mut grid = Grid::build(
        &clusters,
        &scenario.topology,
        &scenario.battery,
        &scenario.demand,
        &mut ids,
        &mut rng,
    )?;
    initialize(&mut grid, &scenario.demand, &scenario.battery, &mut rng);
    info!(
        microgrids = grid.house_microgrids().len(),
        households = ids.households.issued(),
        apartments = ids.apartments.issued(),
        meters = ids.meters.issued(),
        seed = scenario.simulation.seed,
        "grid built"
    );

    Ok(Engine::new(
        SimConfig::from_scenario(scenario),
        grid,
        central_battery(scenario),
        coordinator,
        reporter,
        rng,
    ))
}

/// Builds an engine, runs it to the horizon, and returns the results.
///
/// # Errors
///
/// Returns a `SimError` if the engine cannot be built.
pub fn run_scenario<C: Coordinator, R: Reporter>(
    scenario: &ScenarioConfig,
    clusters: Option<ClusterInput>,
    coordinator: C,
    reporter: R,
) -> Result<SimulationResult, SimError> {
    let mut engine = build_engine(scenario, clusters, coordinator, reporter)?;
    let summaries = engine.run();
    let report = engine.report();
    let central_level = engine.central().level();
    Ok(SimulationResult {
        summaries,
        report,
        grid: engine.into_grid(),
        central_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hooks::{LogReporter, NoopCoordinator};

    fn small() -> ScenarioConfig {
        let mut scenario = ScenarioConfig::baseline();
        scenario.topology.house_microgrids = 2;
        scenario.topology.apartments_per_building = 2;
        scenario.simulation.horizon_seconds = 300;
        scenario
    }

    #[test]
    fn invalid_scenario_is_rejected_before_building() {
        let mut scenario = small();
        scenario.simulation.tick_seconds = 0;
        let result = build_engine(&scenario, None, NoopCoordinator, LogReporter);
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn non_finite_battery_values_fail_cleanly() {
        let patches: [fn(&mut ScenarioConfig); 4] = [
            |s| s.battery.capacity = f64::NAN,
            |s| s.battery.household_drain = f64::NAN,
            |s| s.battery.central_drain = f64::INFINITY,
            |s| s.demand.low_max = f64::INFINITY,
        ];
        for patch in patches {
            let mut scenario = small();
            patch(&mut scenario);
            let result = build_engine(&scenario, None, NoopCoordinator, LogReporter);
            assert!(matches!(result, Err(SimError::Config(_))));
        }
    }

    #[test]
    fn central_battery_starts_at_configured_level() {
        let mut scenario = small();
        scenario.battery.central_initial_level = 0.5;
        let central = central_battery(&scenario);
        assert_eq!(central.level_normalized(), 0.5);
        assert_eq!(central.kind(), BatteryKind::CentralUtility);
    }

    #[test]
    fn run_produces_one_summary_per_tick() {
        let result = run_scenario(&small(), None, NoopCoordinator, LogReporter);
        let result = result.expect("small scenario runs");
        assert_eq!(result.summaries.len(), 20);
        assert_eq!(result.report.households, 20);
        assert!(result.report.total > 0.0);
    }
}
