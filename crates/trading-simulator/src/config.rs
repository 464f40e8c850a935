use anyhow::{Context, Result};
use market_core::Interval;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

const MAX_SERIES_LENGTH: usize = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    // Chart contents
    pub instrument: String,        // asset id, e.g. "BTC/USD" or "GOLD"
    pub interval: Interval,        // 1MIN
    pub series_length: usize,      // 100 candles
    pub seed: Option<u64>,         // fixed seed for reproducible runs

    // Chart container
    pub chart_width: u32,          // 800 px
    pub chart_height: u32,         // 400 px

    // Refresh timer
    pub refresh_seconds: u64,      // 0 = disabled
    pub refresh_ticks: u32,        // ticks before exiting

    // Challenge mode
    pub future_candles: usize,     // 0 = plain chart
    pub reveal_future: bool,

    // Scripted events
    pub script: Option<PathBuf>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            instrument: "BTC/USD".to_string(),
            interval: Interval::Minute1,
            series_length: 100,
            seed: None,
            chart_width: 800,
            chart_height: 400,
            refresh_seconds: 0,
            refresh_ticks: 3,
            future_candles: 0,
            reveal_future: false,
            script: None,
        }
    }
}

impl SimulatorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            instrument: get("SIM_INSTRUMENT", "BTC/USD"),
            interval: get("SIM_INTERVAL", "1MIN")
                .parse()
                .context("SIM_INTERVAL must be one of 1MIN, 5MIN, 10MIN, 30MIN, 1H, 1D, 1W, 1M")?,
            series_length: get("SIM_SERIES_LENGTH", "100")
                .parse()
                .context("SIM_SERIES_LENGTH must be a positive integer")?,
            seed: lookup("SIM_SEED")
                .filter(|s| !s.is_empty())
                .map(|s| s.parse())
                .transpose()
                .context("SIM_SEED must be an unsigned integer")?,
            chart_width: get("SIM_CHART_WIDTH", "800")
                .parse()
                .context("SIM_CHART_WIDTH must be a positive integer")?,
            chart_height: get("SIM_CHART_HEIGHT", "400")
                .parse()
                .context("SIM_CHART_HEIGHT must be a positive integer")?,
            refresh_seconds: get("SIM_REFRESH_SECONDS", "0")
                .parse()
                .context("SIM_REFRESH_SECONDS must be an unsigned integer")?,
            refresh_ticks: get("SIM_REFRESH_TICKS", "3")
                .parse()
                .context("SIM_REFRESH_TICKS must be an unsigned integer")?,
            future_candles: get("SIM_FUTURE_CANDLES", "0")
                .parse()
                .context("SIM_FUTURE_CANDLES must be an unsigned integer")?,
            reveal_future: get("SIM_REVEAL_FUTURE", "false")
                .parse()
                .context("SIM_REVEAL_FUTURE must be true or false")?,
            script: lookup("SIM_SCRIPT")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.instrument.trim().is_empty() {
            anyhow::bail!("SIM_INSTRUMENT must not be empty");
        }
        if self.series_length == 0 || self.series_length > MAX_SERIES_LENGTH {
            anyhow::bail!(
                "SIM_SERIES_LENGTH must be between 1 and {}, got {}",
                MAX_SERIES_LENGTH,
                self.series_length
            );
        }
        if self.future_candles > MAX_SERIES_LENGTH {
            anyhow::bail!(
                "SIM_FUTURE_CANDLES must be at most {}, got {}",
                MAX_SERIES_LENGTH,
                self.future_candles
            );
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            anyhow::bail!(
                "Chart size must be positive, got {}x{}",
                self.chart_width,
                self.chart_height
            );
        }
        Ok(())
    }

    pub fn challenge_mode(&self) -> bool {
        self.future_candles > 0
    }
}
