use rand::Rng;

/// Per-second power demand of a consumer.
///
/// `Uniform` draws a fresh rate on every call, so consumption jitters tick to
/// tick around the profile's band.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::demand::DemandProfile;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let profile = DemandProfile::Uniform { low: 0.8, high: 1.0 };
/// let rate = profile.rate(0, &mut rng);
/// assert!((0.8..=1.0).contains(&rate));
/// assert_eq!(DemandProfile::Fixed(1.0).power_needed(0, 15, &mut rng), 15.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemandProfile {
    /// Constant rate.
    Fixed(f64),
    /// Rate drawn uniformly from `[low, high]` on every call.
    Uniform { low: f64, high: f64 },
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self::Fixed(super::battery::AVERAGE_PER_SECOND_USE)
    }
}

impl DemandProfile {
    /// Demand rate in energy units per second at `time`.
    pub fn rate<R: Rng>(&self, _time: u32, rng: &mut R) -> f64 {
        match *self {
            Self::Fixed(rate) => rate.max(0.0),
            Self::Uniform { low, high } if low < high => rng.random_range(low..high).max(0.0),
            Self::Uniform { low, .. } => low.max(0.0),
        }
    }

    /// Energy needed over a tick of `seconds` starting at `time`.
    pub fn power_needed<R: Rng>(&self, time: u32, seconds: u32, rng: &mut R) -> f64 {
        self.rate(time, rng) * f64::from(seconds)
    }
}
