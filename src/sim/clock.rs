/// A simulation clock that advances simulated seconds in fixed ticks.
///
/// Yields the start time of every tick in `[0, horizon)`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(15, 60);
/// let mut times = Vec::new();
///
/// clock.run(|t| times.push(t));
/// assert_eq!(times, vec![0, 15, 30, 45]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Start time of the next tick, in seconds.
    current: u32,
    /// Duration of one tick, in seconds.
    tick_seconds: u32,
    /// End of the simulated window, exclusive.
    horizon: u32,
}

impl Clock {
    /// Creates a clock at time zero.
    ///
    /// # Panics
    ///
    /// Panics if `tick_seconds` is zero.
    pub fn new(tick_seconds: u32, horizon: u32) -> Self {
        assert!(tick_seconds > 0, "tick_seconds must be > 0");
        Self {
            current: 0,
            tick_seconds,
            horizon,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(time)` - Start time of the tick just taken
    /// * `None` - If the horizon has been reached
    pub fn tick(&mut self) -> Option<u32> {
        if self.current < self.horizon {
            let time = self.current;
            self.current = self.current.saturating_add(self.tick_seconds);
            Some(time)
        } else {
            None
        }
    }

    /// Current simulated time: the start of the next tick.
    pub fn now(&self) -> u32 {
        self.current
    }

    pub fn tick_seconds(&self) -> u32 {
        self.tick_seconds
    }

    /// Number of ticks a fresh clock yields.
    pub fn total_ticks(&self) -> usize {
        self.horizon.div_ceil(self.tick_seconds) as usize
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(u32)) {
        while let Some(time) = self.tick() {
            f(time);
        }
    }
}
