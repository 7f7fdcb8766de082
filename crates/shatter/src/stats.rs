//! Per-tick statistics.

/// What happened during one session tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Tick number.
    pub tick: u64,
    /// Entities created (perimeter spawns and fragments).
    pub spawned: u32,
    /// Entities that went through the destruction protocol.
    pub destroyed: u32,
    /// Of `spawned`, how many were fragments.
    pub fragments: u32,
    /// Effects started.
    pub effects_started: u32,
    /// Events published on the bus.
    pub events_published: u32,
    /// Subscriber failures recorded by the bus.
    pub handler_failures: u32,
    /// Active population at the end of the tick.
    pub population: u32,
}

/// Accumulated tick statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStatsAccumulator {
    /// Ticks recorded.
    pub ticks_recorded: u64,
    /// Total entities spawned.
    pub spawned: u64,
    /// Total entities destroyed.
    pub destroyed: u64,
    /// Total fragments spawned.
    pub fragments: u64,
    /// Total events published.
    pub events_published: u64,
    /// Total handler failures.
    pub handler_failures: u64,
    /// Highest end-of-tick population.
    pub peak_population: u32,
}

impl TickStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks_recorded: 0,
            spawned: 0,
            destroyed: 0,
            fragments: 0,
            events_published: 0,
            handler_failures: 0,
            peak_population: 0,
        }
    }

    /// Records one tick.
    pub fn record(&mut self, stats: TickStats) {
        self.ticks_recorded += 1;
        self.spawned += u64::from(stats.spawned);
        self.destroyed += u64::from(stats.destroyed);
        self.fragments += u64::from(stats.fragments);
        self.events_published += u64::from(stats.events_published);
        self.handler_failures += u64::from(stats.handler_failures);
        self.peak_population = self.peak_population.max(stats.population);
    }

    /// Average events per tick.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_events_per_tick(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        self.events_published as f64 / self.ticks_recorded as f64
    }
}

impl Default for TickStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
