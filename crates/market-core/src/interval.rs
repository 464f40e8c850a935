use serde::{Deserialize, Serialize};

use crate::MarketError;

/// Candle spacing offered on the trading screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1MIN")]
    Minute1,
    #[serde(rename = "5MIN")]
    Minute5,
    #[serde(rename = "10MIN")]
    Minute10,
    #[serde(rename = "30MIN")]
    Minute30,
    #[serde(rename = "1H")]
    Hour1,
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "1W")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Interval {
    /// Every interval, in the order the interval bar shows them.
    pub const ALL: [Interval; 8] = [
        Interval::Minute1,
        Interval::Minute5,
        Interval::Minute10,
        Interval::Minute30,
        Interval::Hour1,
        Interval::Day1,
        Interval::Week1,
        Interval::Month1,
    ];

    pub fn to_minutes(&self) -> u32 {
        match self {
            Interval::Minute1 => 1,
            Interval::Minute5 => 5,
            Interval::Minute10 => 10,
            Interval::Minute30 => 30,
            Interval::Hour1 => 60,
            Interval::Day1 => 1440,
            Interval::Week1 => 10080,
            Interval::Month1 => 43200,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1MIN",
            Interval::Minute5 => "5MIN",
            Interval::Minute10 => "10MIN",
            Interval::Minute30 => "30MIN",
            Interval::Hour1 => "1H",
            Interval::Day1 => "1D",
            Interval::Week1 => "1W",
            Interval::Month1 => "1M",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Interval {
    type Err = MarketError;

    // "1M" is a month; minutes always carry the MIN suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Interval::ALL
            .into_iter()
            .find(|interval| interval.label() == upper)
            .ok_or_else(|| MarketError::InvalidInterval(s.to_string()))
    }
}
