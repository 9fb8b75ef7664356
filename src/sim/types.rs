//! Core simulation types: run timing and per-tick summaries.

use std::fmt;

use crate::config::ScenarioConfig;

/// Timing and policy parameters the engine reads every tick.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(15, 86_400);
/// assert_eq!(cfg.total_ticks(), 5_760);
/// assert!(cfg.share_surplus);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Duration of one tick, in seconds.
    pub tick_seconds: u32,
    /// End of the simulated window, in seconds (exclusive).
    pub horizon_seconds: u32,
    /// Coordinator cadence; checked against the time after each tick.
    pub coordination_period_seconds: u32,
    /// Reporter cadence; checked against the time before each tick.
    pub report_period_seconds: u32,
    /// Fraction of a battery's drain rate trickled back in every tick.
    pub trickle_ratio: f64,
    /// Whether full batteries feed their microgrid's local loop.
    pub share_surplus: bool,
    /// Whether meters aggregate readings lossily from power-on.
    pub lossy_aggregation: bool,
}

impl SimConfig {
    /// Creates a configuration with default cadences and trickle ratio.
    ///
    /// # Panics
    ///
    /// Panics if `tick_seconds` is zero.
    pub fn new(tick_seconds: u32, horizon_seconds: u32) -> Self {
        assert!(tick_seconds > 0, "tick_seconds must be > 0");
        Self {
            tick_seconds,
            horizon_seconds,
            coordination_period_seconds: 30,
            report_period_seconds: 3_600,
            trickle_ratio: 0.2,
            share_surplus: true,
            lossy_aggregation: false,
        }
    }

    /// Engine parameters from a validated scenario.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        let sim = &scenario.simulation;
        Self {
            coordination_period_seconds: sim.coordination_period_seconds,
            report_period_seconds: sim.report_period_seconds,
            trickle_ratio: scenario.battery.trickle_ratio,
            share_surplus: sim.share_surplus,
            lossy_aggregation: sim.lossy_aggregation,
            ..Self::new(sim.tick_seconds, sim.horizon_seconds)
        }
    }

    pub fn total_ticks(&self) -> usize {
        self.horizon_seconds.div_ceil(self.tick_seconds) as usize
    }
}

/// Aggregate outcome of one tick across every consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Start time of the tick, in seconds.
    pub time: u32,
    /// Consumers served from their microgrid's local loop.
    pub local_loop_draws: usize,
    /// Consumers served from their own battery.
    pub own_battery_draws: usize,
    /// Critical facilities served from the critical microgrid battery.
    pub shared_battery_draws: usize,
    /// Consumers served from the central utility battery.
    pub central_draws: usize,
    /// Consumers left without supply.
    pub shortfalls: usize,
    /// Central battery level after the tick.
    pub central_level: f64,
    /// Energy delivered during the tick.
    pub total_consumed: f64,
}

impl TickSummary {
    pub fn new(time: u32) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Number of consumers allocated this tick.
    pub fn consumers(&self) -> usize {
        self.local_loop_draws
            + self.own_battery_draws
            + self.shared_battery_draws
            + self.central_draws
            + self.shortfalls
    }
}

impl fmt::Display for TickSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>6}s | loop={:>5} own={:>5} shared={:>2} central={:>5} short={:>5} \
             | consumed={:>10.2}  central_level={:.2}",
            self.time,
            self.local_loop_draws,
            self.own_battery_draws,
            self.shared_battery_draws,
            self.central_draws,
            self.shortfalls,
            self.total_consumed,
            self.central_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_config_basic() {
        let cfg = SimConfig::new(15, 60);
        assert_eq!(cfg.total_ticks(), 4);
        assert_eq!(cfg.coordination_period_seconds, 30);
        assert_eq!(cfg.report_period_seconds, 3_600);
        assert_eq!(cfg.trickle_ratio, 0.2);
    }

    #[test]
    fn sim_config_from_scenario() {
        let mut scenario = ScenarioConfig::default();
        scenario.simulation.tick_seconds = 30;
        scenario.simulation.share_surplus = false;
        scenario.battery.trickle_ratio = 0.1;
        scenario.simulation.lossy_aggregation = true;
        let cfg = SimConfig::from_scenario(&scenario);
        assert_eq!(cfg.tick_seconds, 30);
        assert_eq!(cfg.total_ticks(), 2_880);
        assert!(!cfg.share_surplus);
        assert_eq!(cfg.trickle_ratio, 0.1);
        assert!(cfg.lossy_aggregation);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_tick_panics() {
        SimConfig::new(0, 10);
    }

    #[test]
    fn summary_counts_consumers() {
        let s = TickSummary {
            local_loop_draws: 1,
            own_battery_draws: 5,
            shared_battery_draws: 1,
            central_draws: 2,
            shortfalls: 3,
            ..TickSummary::new(15)
        };
        assert_eq!(s.consumers(), 12);
        assert!(format!("{s}").contains("short=    3"));
    }
}
