//! Simulation engine that advances the grid tick by tick.

use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::devices::{Battery, Consumer};
use crate::grid::Grid;
use crate::ids::RecordIds;
use crate::io::records::RecordType;

use super::allocation::{allocate, allocate_critical};
use super::clock::Clock;
use super::hooks::{Coordinator, Reporter};
use super::report::ConsumptionReport;
use super::types::{SimConfig, TickSummary};

/// Simulation engine owning the grid, the central utility battery, and the hooks.
///
/// Generic over `C: Coordinator` and `R: Reporter` for static dispatch.
/// Owns the run's random stream and record id sequences, so two engines
/// built from the same inputs produce identical logs.
pub struct Engine<C: Coordinator, R: Reporter> {
    config: SimConfig,
    grid: Grid,
    central: Battery,
    coordinator: C,
    reporter: R,
    rng: StdRng,
    ids: RecordIds,
}

impl<C: Coordinator, R: Reporter> Engine<C, R> {
    /// Creates an engine and powers on every meter at time zero.
    ///
    /// # Arguments
    ///
    /// * `config` - Timing and policy parameters
    /// * `grid` - Initialized grid (demand assigned, batteries seeded)
    /// * `central` - Central utility battery, already at its starting level
    /// * `coordinator` - Between-tick coordination policy
    /// * `reporter` - Periodic consumption report sink
    /// * `rng` - Random stream for demand draws
    pub fn new(
        config: SimConfig,
        mut grid: Grid,
        central: Battery,
        coordinator: C,
        reporter: R,
        rng: StdRng,
    ) -> Self {
        let mut ids = RecordIds::default();
        let lossy = config.lossy_aggregation;
        grid.for_each_meter_mut(|meter| meter.power_on(lossy, 0, &mut ids));
        Self {
            config,
            grid,
            central,
            coordinator,
            reporter,
            rng,
            ids,
        }
    }

    /// Executes the tick starting at `time` and returns its summary.
    ///
    /// Reports fire before the tick when `time` is on the report cadence;
    /// coordination fires after it when `time + tick` is on the coordination
    /// cadence.
    pub fn step(&mut self, time: u32) -> TickSummary {
        let tick = self.config.tick_seconds;

        if on_cadence(time, self.config.report_period_seconds) {
            let consumption = self.grid.household_consumption();
            let report = ConsumptionReport::from_consumption(&consumption);
            self.reporter.report(time, &report, &consumption);
        }

        // 1. Pre-allocation readings
        for house in self.grid.households_mut() {
            let stored = house.battery().level();
            let meter = house.meter_in_mut();
            meter.record_history(RecordType::PowerStored, time, stored, &mut self.ids);
            meter.record_through(time, &mut self.ids);
        }

        let mut summary = TickSummary::new(time);

        // 2. Households
        for microgrid in self.grid.house_microgrids_mut() {
            let (houses, local_loop) = microgrid.split_mut();
            for house in houses {
                let needed = house.demand().power_needed(time, tick, &mut self.rng);
                allocate(
                    house,
                    needed,
                    local_loop,
                    &mut self.central,
                    &self.config,
                    time,
                    &mut self.ids,
                )
                .tally(&mut summary);
            }
        }

        // 3. Apartments
        let (buildings, local_loop) = self.grid.buildings_mut().split_mut();
        for building in buildings {
            for apartment in building.apartments_mut() {
                let needed = apartment.demand().power_needed(time, tick, &mut self.rng);
                allocate(
                    apartment,
                    needed,
                    local_loop,
                    &mut self.central,
                    &self.config,
                    time,
                    &mut self.ids,
                )
                .tally(&mut summary);
            }
        }

        // 4. Critical facilities
        let (members, battery, local_loop) = self.grid.critical_mut().split_mut();
        for facility in members {
            let needed = facility.demand().power_needed(time, tick, &mut self.rng);
            allocate_critical(
                facility,
                needed,
                battery,
                local_loop,
                &mut self.central,
                &self.config,
                time,
                &mut self.ids,
            )
            .tally(&mut summary);
        }

        // 5. Post-allocation readings
        for house in self.grid.households_mut() {
            house.meter_out_mut().record_through(time, &mut self.ids);
        }

        summary.central_level = self.central.level();
        if summary.shortfalls > 0 {
            warn!(time, shortfalls = summary.shortfalls, "consumers without supply");
        }

        let next = time.saturating_add(tick);
        if on_cadence(next, self.config.coordination_period_seconds) {
            self.coordinator.coordinate(next, &self.grid);
        }

        summary
    }

    /// Executes every tick up to the horizon and returns the summaries.
    pub fn run(&mut self) -> Vec<TickSummary> {
        let mut clock = Clock::new(self.config.tick_seconds, self.config.horizon_seconds);
        info!(
            ticks = clock.total_ticks(),
            households = self.grid.household_count(),
            "simulation started"
        );
        let mut summaries = Vec::with_capacity(clock.total_ticks());
        clock.run(|time| summaries.push(self.step(time)));

        let shortfalls: usize = summaries.iter().map(|s| s.shortfalls).sum();
        info!(
            ticks = summaries.len(),
            shortfalls,
            central_level = self.central.level(),
            history_logs = self.ids.history.issued(),
            event_logs = self.ids.events.issued(),
            "simulation finished"
        );
        summaries
    }

    /// Statistics over current household consumption.
    pub fn report(&self) -> ConsumptionReport {
        ConsumptionReport::from_consumption(&self.grid.household_consumption())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the central utility battery.
    pub fn central(&self) -> &Battery {
        &self.central
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &C {
        &self.coordinator
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Record id sequences; `issued()` counts the logs written so far.
    pub fn record_ids(&self) -> &RecordIds {
        &self.ids
    }

    /// Consumes the engine, returning the grid for export.
    pub fn into_grid(self) -> Grid {
        self.grid
    }
}

fn on_cadence(time: u32, period: u32) -> bool {
    period > 0 && time % period == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatteryConfig, DemandConfig, TopologyConfig};
    use crate::clustering::ClusterInput;
    use crate::devices::{BatteryKind, BatteryProfile, DemandProfile};
    use crate::ids::EntityIds;
    use crate::sim::hooks::{LogReporter, NoopCoordinator};
    use rand::SeedableRng;

    fn engine(central_level: f64) -> Engine<NoopCoordinator, LogReporter> {
        engine_with(SimConfig::new(15, 60), central_level)
    }

    fn engine_with(
        config: SimConfig,
        central_level: f64,
    ) -> Engine<NoopCoordinator, LogReporter> {
        let mut rng = StdRng::seed_from_u64(1);
        let clusters = ClusterInput::scatter(1, &mut rng);
        let topology = TopologyConfig {
            house_microgrids: 1,
            apartments_per_building: 0,
        };
        let mut grid = Grid::build(
            &clusters,
            &topology,
            &BatteryConfig::default(),
            &DemandConfig::default(),
            &mut EntityIds::default(),
            &mut rng,
        )
        .expect("valid clusters");
        for house in grid.households_mut() {
            let reserve = house.battery().reserve();
            house.battery_mut().set_level(reserve);
            house.set_demand(DemandProfile::Fixed(1.0));
        }
        let mut central = Battery::new(BatteryKind::CentralUtility, BatteryProfile::central());
        central.set_level(central_level);
        Engine::new(
            config,
            grid,
            central,
            NoopCoordinator,
            LogReporter,
            rng,
        )
    }

    #[test]
    fn meters_start_on_the_power_net() {
        let e = engine(1.0);
        // 20 household meters + 3 critical meters, two events each
        assert_eq!(e.record_ids().events.issued(), 46);
    }

    #[test]
    fn lossy_meters_stamp_every_reading() {
        let config = SimConfig {
            lossy_aggregation: true,
            ..SimConfig::new(15, 60)
        };
        let mut e = engine_with(config, 1.0);
        // Initialized, AggregatingData, RunningOnPowerNet for each of 23 meters
        assert_eq!(e.record_ids().events.issued(), 69);
        e.step(0);
        for house in e.grid().households() {
            assert!(house.meter_in().is_lossy());
            assert!(house.meter_in().history_logs().iter().all(|l| l.lossy_aggregation));
            assert!(house.meter_out().history_logs().iter().all(|l| l.lossy_aggregation));
        }
    }

    #[test]
    fn one_tick_writes_three_readings_per_household() {
        let mut e = engine(1.0);
        e.step(0);
        assert_eq!(e.record_ids().history.issued(), 30);
        for house in e.grid().households() {
            assert_eq!(house.meter_in().history_logs().len(), 2);
            assert_eq!(house.meter_out().history_logs().len(), 1);
        }
    }

    #[test]
    fn households_at_reserve_draw_from_central() {
        let mut e = engine(1.0);
        let s = e.step(0);
        assert_eq!(s.central_draws, 10);
        assert_eq!(s.shared_battery_draws, 3);
        assert!((s.total_consumed - (150.0 + 45.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_central_means_shortfalls() {
        let mut e = engine(0.0);
        let s = e.step(0);
        assert_eq!(s.shortfalls, 10);
        assert_eq!(s.central_level, 0.0);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn shortfalls_warn_once_per_tick() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let summary = tracing::subscriber::with_default(subscriber, || engine(0.0).step(0));

        assert_eq!(summary.shortfalls, 10);
        let bytes = captured.0.lock().expect("capture lock").clone();
        let text = String::from_utf8(bytes).expect("utf-8 log output");
        assert_eq!(text.matches("consumers without supply").count(), 1);
        assert!(text.contains("shortfalls=10"));
        // per-consumer lines stay below the warn level
        assert!(!text.contains("no supply available"));
    }

    #[test]
    fn run_covers_the_horizon() {
        let mut e = engine(1.0);
        let summaries = e.run();
        let times: Vec<u32> = summaries.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0, 15, 30, 45]);
        assert_eq!(e.report().households, 10);
    }

    #[test]
    fn cadence_helper() {
        assert!(on_cadence(0, 30));
        assert!(on_cadence(60, 30));
        assert!(!on_cadence(45, 30));
        assert!(!on_cadence(0, 0));
    }
}
