//! Series Generator
//!
//! Random walk with a bounded per-candle range. Each candle's close seeds
//! the next candle's open, so consecutive candles connect. The walk is a
//! pure function of the instrument, the shape parameters, "now" and the
//! random source.

use chrono::{DateTime, Utc};
use market_core::{Candle, ChallengeSeries, Instrument, Interval, Series};
use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

pub const DEFAULT_SERIES_LENGTH: usize = 100;

/// Lowest price a candle may reach, as a fraction of the instrument's base price
pub const PRICE_FLOOR_RATIO: f64 = 1e-4;

/// Shape of a generated series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub length: usize,
    pub step_minutes: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_SERIES_LENGTH,
            step_minutes: 1,
        }
    }
}

impl GeneratorConfig {
    pub fn from_interval(interval: Interval, length: usize) -> Self {
        Self {
            length,
            step_minutes: interval.to_minutes(),
        }
    }
}

/// Generator bound to one series shape
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesGenerator {
    pub config: GeneratorConfig,
}

impl SeriesGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn generate<S: RandomSource + ?Sized>(
        &self,
        instrument: &Instrument,
        now: DateTime<Utc>,
        random: &mut S,
    ) -> Series {
        generate(
            instrument,
            self.config.length,
            self.config.step_minutes,
            now,
            random,
        )
    }

    /// `config.length` past candles ending at `now`, followed by `future_len` more
    pub fn generate_challenge<S: RandomSource + ?Sized>(
        &self,
        instrument: &Instrument,
        future_len: usize,
        now: DateTime<Utc>,
        random: &mut S,
    ) -> ChallengeSeries {
        generate_challenge(
            instrument,
            self.config.length,
            future_len,
            self.config.step_minutes,
            now,
            random,
        )
    }
}

/// Generate `length` candles spaced `step_minutes` apart, the newest at `now`.
/// A zero step is treated as one minute.
pub fn generate<S: RandomSource + ?Sized>(
    instrument: &Instrument,
    length: usize,
    step_minutes: u32,
    now: DateTime<Utc>,
    random: &mut S,
) -> Series {
    random_walk(instrument, length, step_minutes, now.timestamp(), random)
}

/// Generate one continuous walk split at `now`: `past_len` candles ending at
/// `now`, then `future_len` candles after it.
pub fn generate_challenge<S: RandomSource + ?Sized>(
    instrument: &Instrument,
    past_len: usize,
    future_len: usize,
    step_minutes: u32,
    now: DateTime<Utc>,
    random: &mut S,
) -> ChallengeSeries {
    let step_minutes = step_minutes.max(1);
    let newest = now.timestamp() + future_len as i64 * step_seconds(step_minutes);
    let walk = random_walk(instrument, past_len + future_len, step_minutes, newest, random);
    let (past, future) = walk.split_off(past_len);
    ChallengeSeries::new(past, future)
}

fn step_seconds(step_minutes: u32) -> i64 {
    i64::from(step_minutes) * 60
}

fn random_walk<S: RandomSource + ?Sized>(
    instrument: &Instrument,
    length: usize,
    step_minutes: u32,
    newest_time: i64,
    random: &mut S,
) -> Series {
    // Candle times must be strictly increasing
    let step_minutes = step_minutes.max(1);
    let step = step_seconds(step_minutes);
    let floor = (instrument.base_price * PRICE_FLOOR_RATIO).max(f64::MIN_POSITIVE);
    let mut base_price = instrument.base_price.max(floor);
    let mut candles = Vec::with_capacity(length);

    for i in (0..length).rev() {
        let time = newest_time - i as i64 * step;
        let candle = next_candle(base_price, instrument.volatility, floor, time, random);
        base_price = candle.close;
        candles.push(candle);
    }

    tracing::debug!(
        symbol = %instrument.key,
        length,
        step_minutes,
        last_close = ?candles.last().map(|c| c.close),
        "Generated series"
    );

    Series::new(&instrument.key, step_minutes, candles)
}

/// Three draws per candle: open jitter, upper range, lower range.
fn next_candle<S: RandomSource + ?Sized>(
    base_price: f64,
    volatility: f64,
    floor: f64,
    time: i64,
    random: &mut S,
) -> Candle {
    let open = (base_price + (random.unit() - 0.5) * volatility).max(floor);
    let high = open + random.unit() * volatility;
    let low = (open - random.unit() * volatility).max(floor);
    let close = (high + low) / 2.0;

    // Keep the body inside the wick range whatever the draws were.
    let high = high.max(open).max(close);
    let low = low.min(open).min(close);

    Candle::new(time, open, high, low, close)
}
