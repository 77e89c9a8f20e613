use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::bootstrap::PopulationSpec;
use crate::error::Result;
use crate::inflation::InflationDrift;
use crate::rules::TradingRules;

pub const DEFAULT_DAYS: usize = 180;
pub const DEFAULT_SEED: u64 = 42;

/// Everything needed to reproduce a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct SimulationConfig {
    pub days: usize,
    pub seed: u64,
    /// Daily inflation drift; `None` skips the inflation step entirely.
    pub inflation: Option<InflationDrift>,
    pub rules: TradingRules,
    pub population: PopulationSpec,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            seed: DEFAULT_SEED,
            inflation: Some(InflationDrift::default()),
            rules: TradingRules::default(),
            population: PopulationSpec::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON config. Omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rules.validate()?;
        if let Some(drift) = &self.inflation {
            drift.validate()?;
        }
        self.population.validate()
    }
}
