use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::agents::Population;
use crate::bootstrap::bootstrap;
use crate::config::{DEFAULT_DAYS, SimulationConfig};
use crate::error::Result;
use crate::inflation::InflationDrift;
use crate::rules::TradingRules;
use crate::simulation::{DailySeries, DayStats, advance_day};

/// A running market: owns the population and the random stream for the
/// whole run, and hands them to each trading day in turn.
#[derive(Debug, Clone)]
pub struct Market {
    day: u64,
    /// Length of a full run, as configured.
    days: usize,
    population: Population,
    rules: TradingRules,
    inflation: Option<InflationDrift>,
    rng: StdRng,
}

impl Market {
    pub fn new(
        population: Population,
        rules: TradingRules,
        inflation: Option<InflationDrift>,
        seed: u64,
    ) -> Result<Self> {
        rules.validate()?;
        if let Some(drift) = &inflation {
            drift.validate()?;
        }
        Ok(Self {
            day: 0,
            days: DEFAULT_DAYS,
            population,
            rules,
            inflation,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    /// Bootstrap a population from the config and seed one stream for both
    /// the bootstrap and the trading days that follow.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let population = bootstrap(&config.population, &mut rng)?;
        Ok(Self {
            day: 0,
            days: config.days,
            population,
            rules: config.rules,
            inflation: config.inflation,
            rng,
        })
    }

    /// Number of days simulated so far.
    pub fn day(&self) -> u64 {
        self.day
    }

    /// Configured run length used by [`Market::run_configured`].
    pub fn configured_days(&self) -> usize {
        self.days
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn rules(&self) -> &TradingRules {
        &self.rules
    }

    pub fn inflation(&self) -> Option<&InflationDrift> {
        self.inflation.as_ref()
    }

    /// Simulate the next day.
    pub fn step(&mut self) -> DayStats {
        let stats = advance_day(
            self.day,
            &mut self.population,
            self.inflation.as_ref(),
            &self.rules,
            &mut self.rng,
        );
        self.day += 1;
        stats
    }

    /// Simulate `days` more days. The series covers only those days.
    pub fn run(&mut self, days: usize) -> DailySeries {
        let mut series = DailySeries::with_capacity(days);
        for _ in 0..days {
            let stats = self.step();
            series.push(&stats);
        }
        series
    }

    /// Simulate the configured number of days.
    pub fn run_configured(&mut self) -> DailySeries {
        self.run(self.days)
    }
}
