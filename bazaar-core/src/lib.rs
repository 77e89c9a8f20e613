use wasm_bindgen::prelude::*;

pub mod agents;
pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod inflation;
pub mod market;
pub mod rules;
pub mod simulation;
pub mod snapshot;
pub mod types;

pub use agents::*;
pub use bootstrap::*;
pub use config::*;
pub use engine::*;
pub use error::MarketError;
pub use inflation::*;
pub use market::*;
pub use rules::*;
pub use simulation::*;
pub use snapshot::*;
pub use types::*;

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API - Simulation
// ============================================================================

#[wasm_bindgen]
pub struct Simulation {
    market: Market,
    history: DailySeries,
}

#[wasm_bindgen]
impl Simulation {
    #[wasm_bindgen(constructor)]
    pub fn new(config: SimulationConfig) -> Result<Simulation, JsError> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Ok(Self {
            market: Market::from_config(&config)?,
            history: DailySeries::default(),
        })
    }

    /// Create a simulation from a JSON config; omitted fields take defaults
    #[wasm_bindgen]
    pub fn from_json(json: &str) -> Result<Simulation, JsError> {
        Self::new(SimulationConfig::from_json(json)?)
    }

    /// Create a simulation with the default 105-seller / 104-buyer market
    #[wasm_bindgen]
    pub fn with_default_scenario() -> Result<Simulation, JsError> {
        Self::new(SimulationConfig::default())
    }

    /// Advance the simulation by one trading day
    #[wasm_bindgen]
    pub fn advance_day(&mut self) -> DayStats {
        let stats = self.market.step();
        self.history.push(&stats);
        stats
    }

    /// Advance by `days` trading days and return the series for just those days
    #[wasm_bindgen]
    pub fn run(&mut self, days: usize) -> Result<JsValue, JsError> {
        let series = self.record_run(days);
        Ok(serde_wasm_bindgen::to_value(&series)?)
    }

    /// Run the day count the simulation was configured with
    #[wasm_bindgen]
    pub fn run_configured(&mut self) -> Result<JsValue, JsError> {
        let series = self.record_run(self.market.configured_days());
        Ok(serde_wasm_bindgen::to_value(&series)?)
    }

    /// Get the number of completed trading days
    #[wasm_bindgen]
    pub fn get_day(&self) -> u64 {
        self.market.day()
    }

    /// Get every agent's current state for rendering
    #[wasm_bindgen]
    pub fn get_agents_snapshot(&self) -> AgentsSnapshot {
        AgentsSnapshot::capture(self.market.day(), self.market.population())
    }

    /// Full history of daily aggregates since construction
    #[wasm_bindgen]
    pub fn get_history(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.history)?)
    }

    /// Average price per day for plotting; NaN marks days without trades
    #[wasm_bindgen]
    pub fn average_prices(&self) -> js_sys::Float64Array {
        let prices: Vec<f64> = self
            .history
            .average_price
            .iter()
            .map(|p| p.unwrap_or(f64::NAN))
            .collect();
        js_sys::Float64Array::from(prices.as_slice())
    }
}

impl Simulation {
    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn history(&self) -> &DailySeries {
        &self.history
    }

    fn record_run(&mut self, days: usize) -> DailySeries {
        let series = self.market.run(days);
        self.history.extend(&series);
        series
    }
}
