//! Instrument Registry
//!
//! Maps instrument keys to the base price and volatility used when
//! synthesizing chart data. Unknown keys degrade to a generic instrument.

use std::collections::HashMap;

use market_core::Instrument;

pub const FALLBACK_BASE_PRICE: f64 = 100.0;
pub const FALLBACK_VOLATILITY: f64 = 2.0;

/// Static catalog of instruments
#[derive(Debug, Clone)]
pub struct InstrumentRegistry {
    instruments: HashMap<String, Instrument>,
}

impl InstrumentRegistry {
    /// Registry preloaded with the built-in instruments
    pub fn new() -> Self {
        Self::from_instruments(Self::builtin_instruments())
    }

    pub fn from_instruments(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: instruments
                .into_iter()
                .map(|i| (i.key.clone(), i))
                .collect(),
        }
    }

    /// Get all built-in instruments
    pub fn builtin_instruments() -> Vec<Instrument> {
        vec![
            Instrument::new("BTC/USD", "Bitcoin", 52000.0, 1000.0),
            Instrument::new("GOLD", "Gold", 2024.0, 10.0),
            Instrument::new("AAPL", "Apple", 180.0, 2.0),
            Instrument::new("OIL", "Oil", 78.0, 1.0),
            Instrument::new("EUR/USD", "EUR/USD", 1.0845, 0.002),
            Instrument::new("NATGAS", "Natural Gas", 1.642, 0.05),
            Instrument::new("XAU/USD", "Gold Spot", 2024.0, 10.0),
            Instrument::new("CL/USD", "Crude Oil", 78.0, 1.0),
            Instrument::new("NG/USD", "Natural Gas Spot", 1.642, 0.05),
        ]
    }

    /// Look up an instrument, falling back to a generic one for unknown keys
    pub fn lookup(&self, key: &str) -> Instrument {
        match self.instruments.get(key) {
            Some(instrument) => instrument.clone(),
            None => {
                tracing::debug!(key, "Unknown instrument, using fallback parameters");
                Self::fallback(key)
            }
        }
    }

    pub fn fallback(key: &str) -> Instrument {
        Instrument::new(key, key, FALLBACK_BASE_PRICE, FALLBACK_VOLATILITY)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.instruments.contains_key(key)
    }

    /// Sorted instrument keys
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.instruments.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
