//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::devices::battery::{AVERAGE_PER_SECOND_USE, CAPACITY};
use crate::devices::BatteryProfile;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Timing, seeding, and hook periods.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Grid size.
    #[serde(default)]
    pub topology: TopologyConfig,
    /// Demand profile assignment.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Battery parameters per kind.
    #[serde(default)]
    pub battery: BatteryConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Duration of one tick in seconds (must be > 0).
    pub tick_seconds: u32,
    /// End of the simulated horizon in seconds (must be >= tick_seconds).
    pub horizon_seconds: u32,
    /// Master random seed.
    pub seed: u64,
    /// Coordination hook fires when the advanced time is a multiple of this.
    pub coordination_period_seconds: u32,
    /// Reporting hook fires when the tick start time is a multiple of this.
    pub report_period_seconds: u32,
    /// Feed a full battery's surplus into its microgrid's local loop.
    pub share_surplus: bool,
    /// Stamp every meter reading as lossily aggregated.
    pub lossy_aggregation: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 15,
            horizon_seconds: 24 * 60 * 60,
            seed: 42,
            coordination_period_seconds: 30,
            report_period_seconds: 60 * 60,
            share_surplus: true,
            lossy_aggregation: false,
        }
    }
}

/// Grid size parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopologyConfig {
    /// Number of houses-microgrids synthesized when no cluster file is given.
    pub house_microgrids: usize,
    /// Apartments in each of the three buildings.
    pub apartments_per_building: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            house_microgrids: 10,
            apartments_per_building: 100,
        }
    }
}

/// Demand profile assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Every n-th household gets the elevated profile (must be > 0).
    pub high_use_every: usize,
    /// Elevated profile lower bound (multiple of average use).
    pub high_min: f64,
    /// Elevated profile upper bound.
    pub high_max: f64,
    /// Low profile lower bound.
    pub low_min: f64,
    /// Low profile upper bound.
    pub low_max: f64,
    /// Fixed rate of each critical facility.
    pub critical_rate: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            high_use_every: 10,
            high_min: 1.5,
            high_max: 3.0,
            low_min: 0.8,
            low_max: 1.0,
            critical_rate: AVERAGE_PER_SECOND_USE,
        }
    }
}

/// Battery parameters per kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Capacity of every battery.
    pub capacity: f64,
    /// Household battery drain rate.
    pub household_drain: f64,
    /// Reserve thresholds a household battery picks from at construction.
    pub household_reserves: Vec<f64>,
    /// Width of the initial-level band above a household's reserve.
    pub seed_band: f64,
    /// Shared microgrid battery drain rate.
    pub microgrid_drain: f64,
    /// Shared microgrid battery reserve.
    pub microgrid_reserve: f64,
    /// Initial normalized level of shared microgrid batteries.
    pub microgrid_initial_level: f64,
    /// Critical microgrid battery drain rate.
    pub critical_drain: f64,
    /// Critical microgrid battery reserve.
    pub critical_reserve: f64,
    /// Central utility drain rate.
    pub central_drain: f64,
    /// Initial normalized level of the central utility battery.
    pub central_initial_level: f64,
    /// Per-tick trickle charge ratio applied to every consumer battery.
    pub trickle_ratio: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        let microgrid = BatteryProfile::microgrid();
        let critical = BatteryProfile::critical();
        Self {
            capacity: CAPACITY,
            household_drain: AVERAGE_PER_SECOND_USE,
            household_reserves: vec![0.75, 0.5, 0.25],
            seed_band: 0.25,
            microgrid_drain: microgrid.drain_rate,
            microgrid_reserve: microgrid.reserve,
            microgrid_initial_level: 1.0,
            critical_drain: critical.drain_rate,
            critical_reserve: critical.reserve,
            central_drain: BatteryProfile::central().drain_rate,
            central_initial_level: 1.0,
            trickle_ratio: 0.2,
        }
    }
}

impl BatteryConfig {
    pub fn household_profile(&self, reserve: f64) -> BatteryProfile {
        BatteryProfile {
            capacity: self.capacity,
            drain_rate: self.household_drain,
            reserve,
        }
    }

    pub fn microgrid_profile(&self) -> BatteryProfile {
        BatteryProfile {
            capacity: self.capacity,
            drain_rate: self.microgrid_drain,
            reserve: self.microgrid_reserve,
        }
    }

    pub fn critical_profile(&self) -> BatteryProfile {
        BatteryProfile {
            capacity: self.capacity,
            drain_rate: self.critical_drain,
            reserve: self.critical_reserve,
        }
    }

    pub fn central_profile(&self) -> BatteryProfile {
        BatteryProfile {
            capacity: self.capacity,
            drain_rate: self.central_drain,
            reserve: 0.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.tick_seconds"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: ten houses-microgrids over one day.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the town preset: 800 houses-microgrids (8 000 households).
    pub fn town() -> Self {
        Self {
            topology: TopologyConfig {
                house_microgrids: 800,
                ..TopologyConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the blackout preset: the central utility starts empty.
    pub fn blackout() -> Self {
        Self {
            battery: BatteryConfig {
                central_initial_level: 0.0,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "town", "blackout"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "town" => Ok(Self::town()),
            "blackout" => Ok(Self::blackout()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.tick_seconds == 0 {
            errors.push(ConfigError::new("simulation.tick_seconds", "must be > 0"));
        }
        if s.horizon_seconds < s.tick_seconds {
            errors.push(ConfigError::new(
                "simulation.horizon_seconds",
                "must be >= simulation.tick_seconds",
            ));
        }
        if s.coordination_period_seconds == 0 {
            errors.push(ConfigError::new(
                "simulation.coordination_period_seconds",
                "must be > 0",
            ));
        }
        if s.report_period_seconds == 0 {
            errors.push(ConfigError::new(
                "simulation.report_period_seconds",
                "must be > 0",
            ));
        }

        if self.topology.house_microgrids == 0 {
            errors.push(ConfigError::new("topology.house_microgrids", "must be > 0"));
        }

        let d = &self.demand;
        if d.high_use_every == 0 {
            errors.push(ConfigError::new("demand.high_use_every", "must be > 0"));
        }
        if !(0.0 <= d.high_min && d.high_min <= d.high_max) {
            errors.push(ConfigError::new(
                "demand.high_min",
                "must satisfy 0 <= high_min <= high_max",
            ));
        }
        if !(0.0 <= d.low_min && d.low_min <= d.low_max) {
            errors.push(ConfigError::new(
                "demand.low_min",
                "must satisfy 0 <= low_min <= low_max",
            ));
        }
        if d.critical_rate < 0.0 {
            errors.push(ConfigError::new("demand.critical_rate", "must be >= 0"));
        }

        let b = &self.battery;
        if b.capacity <= 0.0 {
            errors.push(ConfigError::new("battery.capacity", "must be > 0"));
        }
        for (field, drain) in [
            ("battery.household_drain", b.household_drain),
            ("battery.microgrid_drain", b.microgrid_drain),
            ("battery.critical_drain", b.critical_drain),
            ("battery.central_drain", b.central_drain),
        ] {
            if drain <= 0.0 {
                errors.push(ConfigError::new(field, "must be > 0"));
            }
        }
        if b.household_reserves.is_empty() {
            errors.push(ConfigError::new(
                "battery.household_reserves",
                "must not be empty",
            ));
        }
        if b.household_reserves.iter().any(|r| !(0.0..=1.0).contains(r)) {
            errors.push(ConfigError::new(
                "battery.household_reserves",
                "every value must be in [0.0, 1.0]",
            ));
        }
        for (field, ratio) in [
            ("battery.seed_band", b.seed_band),
            ("battery.microgrid_reserve", b.microgrid_reserve),
            ("battery.microgrid_initial_level", b.microgrid_initial_level),
            ("battery.critical_reserve", b.critical_reserve),
            ("battery.central_initial_level", b.central_initial_level),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if b.trickle_ratio < 0.0 {
            errors.push(ConfigError::new("battery.trickle_ratio", "must be >= 0"));
        }

        // NaN and infinities slip past every ordered comparison above
        for (field, value) in [
            ("demand.high_min", d.high_min),
            ("demand.high_max", d.high_max),
            ("demand.low_min", d.low_min),
            ("demand.low_max", d.low_max),
            ("demand.critical_rate", d.critical_rate),
            ("battery.capacity", b.capacity),
            ("battery.household_drain", b.household_drain),
            ("battery.microgrid_drain", b.microgrid_drain),
            ("battery.critical_drain", b.critical_drain),
            ("battery.central_drain", b.central_drain),
            ("battery.seed_band", b.seed_band),
            ("battery.trickle_ratio", b.trickle_ratio),
        ] {
            if !value.is_finite() {
                errors.push(ConfigError::new(field, "must be a finite number"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
tick_seconds = 30
horizon_seconds = 3600
seed = 99
coordination_period_seconds = 60
report_period_seconds = 600
share_surplus = false

[topology]
house_microgrids = 4
apartments_per_building = 2

[demand]
high_use_every = 5
high_min = 2.0
high_max = 4.0
low_min = 0.5
low_max = 1.0
critical_rate = 3.0

[battery]
household_reserves = [0.5]
central_initial_level = 0.5
trickle_ratio = 0.1
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.tick_seconds), Some(30));
        assert_eq!(cfg.as_ref().map(|c| c.topology.house_microgrids), Some(4));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.share_surplus), Some(false));
        assert_eq!(
            cfg.as_ref().map(|c| c.battery.household_reserves.clone()),
            Some(vec![0.5])
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
tick_seconds = 15
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 7
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(7));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.tick_seconds), Some(15));
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity), Some(CAPACITY));
    }

    #[test]
    fn validation_catches_zero_tick() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.tick_seconds = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.tick_seconds"));
    }

    #[test]
    fn validation_catches_bad_reserve() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.household_reserves = vec![0.5, 1.2];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.household_reserves"));
    }

    #[test]
    fn validation_catches_inverted_demand_band() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.demand.low_min = 2.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demand.low_min"));
    }

    #[test]
    fn validation_catches_non_finite() {
        let toml = r#"
[demand]
low_max = inf

[battery]
capacity = nan
household_drain = nan
central_drain = inf
trickle_ratio = nan
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "non-finite floats are valid TOML: {:?}", cfg.err());
        let errors = cfg.map(|c| c.validate()).unwrap_or_default();
        for field in [
            "demand.low_max",
            "battery.capacity",
            "battery.household_drain",
            "battery.central_drain",
            "battery.trickle_ratio",
        ] {
            assert!(
                errors.iter().any(|e| e.field == field),
                "{field} should be rejected: {errors:?}"
            );
        }
    }

    #[test]
    fn infinite_band_bound_is_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.demand.high_max = f64::INFINITY;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demand.high_max"));
    }

    #[test]
    fn blackout_starts_with_empty_utility() {
        assert_eq!(ScenarioConfig::blackout().battery.central_initial_level, 0.0);
        assert_eq!(ScenarioConfig::town().topology.house_microgrids, 800);
    }

    #[test]
    fn profiles_follow_config() {
        let b = BatteryConfig::default();
        assert_eq!(b.central_profile(), BatteryProfile::central());
        assert_eq!(b.critical_profile(), BatteryProfile::critical());
        assert_eq!(b.microgrid_profile(), BatteryProfile::microgrid());
        assert_eq!(b.household_profile(0.25), BatteryProfile::household(0.25));
    }
}
