use serde::{Deserialize, Serialize};

/// A tradable symbol with the parameters used to synthesize its prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub key: String,
    pub name: String,
    pub base_price: f64,
    /// Price units, not a percentage
    pub volatility: f64,
}

impl Instrument {
    pub fn new(key: &str, name: &str, base_price: f64, volatility: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            base_price,
            volatility,
        }
    }
}

/// One OHLC sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix seconds
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// `low <= min(open, close)` and `max(open, close) <= high`
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Ordered candle sequence for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub step_minutes: u32,
    candles: Vec<Candle>,
}

impl Series {
    /// Candles must already be ascending by time.
    pub fn new(symbol: &str, step_minutes: u32, candles: Vec<Candle>) -> Self {
        debug_assert!(candles.windows(2).all(|w| w[0].time < w[1].time));
        Self {
            symbol: symbol.to_string(),
            step_minutes,
            candles,
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn max_high(&self) -> Option<f64> {
        max_high(&self.candles)
    }

    pub fn split_off(mut self, at: usize) -> (Series, Series) {
        let at = at.min(self.candles.len());
        let tail = self.candles.split_off(at);
        let future = Series::new(&self.symbol, self.step_minutes, tail);
        (self, future)
    }
}

/// Highest high over a candle slice, `None` when empty
pub fn max_high(candles: &[Candle]) -> Option<f64> {
    candles.iter().map(|c| c.high).reduce(f64::max)
}

/// Generation tag of the chart's series. Lines remember the version they
/// were derived from so that late interaction can be matched against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SeriesVersion(pub u64);

impl SeriesVersion {
    pub fn next(self) -> Self {
        SeriesVersion(self.0 + 1)
    }
}

impl std::fmt::Display for SeriesVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    CurrentTime,
    TakeProfit,
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineKind::CurrentTime => write!(f, "current_time"),
            LineKind::TakeProfit => write!(f, "take_profit"),
        }
    }
}

/// Horizontal annotation over a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLine {
    pub price: f64,
    pub kind: LineKind,
    pub draggable: bool,
    pub series_version: SeriesVersion,
}

impl PriceLine {
    pub fn current_time(price: f64, series_version: SeriesVersion) -> Self {
        Self {
            price,
            kind: LineKind::CurrentTime,
            draggable: false,
            series_version,
        }
    }

    pub fn take_profit(price: f64, series_version: SeriesVersion) -> Self {
        Self {
            price,
            kind: LineKind::TakeProfit,
            draggable: true,
            series_version,
        }
    }

    pub fn with_price(self, price: f64) -> Self {
        Self { price, ..self }
    }
}

/// Both annotation lines of one series. Lines only ever exist in pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSet {
    pub current_time: PriceLine,
    pub take_profit: PriceLine,
}

impl LineSet {
    pub fn version(&self) -> SeriesVersion {
        self.take_profit.series_version
    }
}

/// A series split at "now" into the visible past and a hidden future
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSeries {
    pub past: Series,
    pub future: Series,
    pub reveal_future: bool,
}

impl ChallengeSeries {
    pub fn new(past: Series, future: Series) -> Self {
        Self {
            past,
            future,
            reveal_future: false,
        }
    }

    /// Candles the chart should show right now.
    pub fn visible_candles(&self) -> Vec<Candle> {
        let mut candles = self.past.candles().to_vec();
        if self.reveal_future {
            candles.extend_from_slice(self.future.candles());
        }
        candles
    }
}
