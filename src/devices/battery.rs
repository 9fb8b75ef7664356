/// Energy capacity shared by every battery: one unit per second for a full day.
pub const CAPACITY: f64 = 24.0 * 60.0 * 60.0;

/// Average consumption of one household in energy units per second.
pub const AVERAGE_PER_SECOND_USE: f64 = 1.0;

/// Which role a battery plays in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryKind {
    /// Private battery of a household or apartment.
    Household,
    /// Shared battery of a houses or buildings microgrid.
    Microgrid,
    /// Shared battery of the critical-facilities microgrid.
    CriticalMicrogrid,
    /// Backing battery of the central utility.
    CentralUtility,
}

/// Static parameters of a battery.
///
/// The four battery kinds only differ in these values, so they share a single
/// [`Battery`] type instead of a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryProfile {
    /// Maximum stored energy.
    pub capacity: f64,
    /// Energy moved per second by a charge/deplete ratio of `1.0`.
    pub drain_rate: f64,
    /// Normalized level at or below which the owner stops self-supplying.
    pub reserve: f64,
}

impl BatteryProfile {
    /// Household battery with the given reserve threshold and standard drain.
    pub fn household(reserve: f64) -> Self {
        Self {
            capacity: CAPACITY,
            drain_rate: AVERAGE_PER_SECOND_USE,
            reserve,
        }
    }

    /// Shared microgrid battery; drains at half rate so it lasts twice as long.
    pub fn microgrid() -> Self {
        Self {
            capacity: CAPACITY,
            drain_rate: AVERAGE_PER_SECOND_USE * 0.5,
            reserve: 0.5,
        }
    }

    /// Critical-microgrid battery: half drain rate, high reserve.
    pub fn critical() -> Self {
        Self {
            capacity: CAPACITY,
            drain_rate: AVERAGE_PER_SECOND_USE * 0.5,
            reserve: 0.75,
        }
    }

    /// Central utility battery: very high drain rate, available until empty.
    pub fn central() -> Self {
        Self {
            capacity: CAPACITY,
            drain_rate: AVERAGE_PER_SECOND_USE * 8000.0 / 12.0,
            reserve: 0.0,
        }
    }
}

/// Scalar energy store with a minimum-reserve policy.
///
/// `level` always stays within `[0, capacity]`: [`Battery::charge`] and
/// [`Battery::deplete`] clamp instead of overflowing.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::battery::{Battery, BatteryKind, BatteryProfile};
///
/// let mut battery = Battery::new(BatteryKind::Household, BatteryProfile::household(0.5));
/// battery.set_level(0.5);
/// battery.deplete(2.0, 15);
/// assert_eq!(battery.level(), 43_200.0 - 30.0);
/// ```
#[derive(Debug, Clone)]
pub struct Battery {
    kind: BatteryKind,
    profile: BatteryProfile,
    level: f64,
}

impl Battery {
    /// Creates an empty battery.
    ///
    /// # Panics
    ///
    /// Panics if capacity or drain rate is not positive, or reserve is outside `[0, 1]`.
    pub fn new(kind: BatteryKind, profile: BatteryProfile) -> Self {
        assert!(profile.capacity > 0.0);
        assert!(profile.drain_rate > 0.0);
        assert!((0.0..=1.0).contains(&profile.reserve));

        Self {
            kind,
            profile,
            level: 0.0,
        }
    }

    pub fn kind(&self) -> BatteryKind {
        self.kind
    }

    pub fn profile(&self) -> &BatteryProfile {
        &self.profile
    }

    pub fn capacity(&self) -> f64 {
        self.profile.capacity
    }

    pub fn drain_rate(&self) -> f64 {
        self.profile.drain_rate
    }

    /// Normalized minimum-reserve threshold.
    pub fn reserve(&self) -> f64 {
        self.profile.reserve
    }

    /// Stored energy.
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_full(&self) -> bool {
        self.level == self.profile.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0.0
    }

    /// Stored energy as a fraction of capacity, in `[0, 1]`.
    pub fn level_normalized(&self) -> f64 {
        self.level / self.profile.capacity
    }

    /// Returns `true` when the normalized level is strictly above the reserve.
    pub fn is_above_reserve(&self) -> bool {
        self.level_normalized() > self.profile.reserve
    }

    /// Sets the level to `ratio * capacity`, with `ratio` clamped to `[0, 1]`.
    pub fn set_level(&mut self, ratio: f64) {
        self.level = ratio.clamp(0.0, 1.0) * self.profile.capacity;
    }

    /// Adds `ratio * drain_rate * seconds`, clamped to capacity.
    ///
    /// Returns the energy actually stored.
    pub fn charge(&mut self, ratio: f64, seconds: u32) -> f64 {
        let requested = ratio * self.profile.drain_rate * f64::from(seconds);
        let before = self.level;
        self.level = (before + requested).clamp(0.0, self.profile.capacity);
        self.level - before
    }

    /// Removes `ratio * drain_rate * seconds`, clamped at zero.
    ///
    /// Returns the energy actually released.
    pub fn deplete(&mut self, ratio: f64, seconds: u32) -> f64 {
        let requested = ratio * self.profile.drain_rate * f64::from(seconds);
        let before = self.level;
        self.level = (before - requested).clamp(0.0, self.profile.capacity);
        before - self.level
    }

    /// Ratio that makes [`Battery::deplete`] release exactly `energy` over `seconds`.
    pub fn ratio_for(&self, energy: f64, seconds: u32) -> f64 {
        if seconds == 0 {
            return 0.0;
        }
        energy / (self.profile.drain_rate * f64::from(seconds))
    }
}
