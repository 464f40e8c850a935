//! Current lines of the chart and the series generation they belong to.

use market_core::{ChallengeSeries, LineSet, MarketError, PriceLine, Series, SeriesVersion};

use crate::challenge::derive_challenge_lines;
use crate::lines::{derive_lines, on_drag};

/// Result of delivering a drag to the book
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The take-profit line moved
    Applied(PriceLine),
    /// The drag targeted a line of a superseded series
    Stale {
        line_version: SeriesVersion,
        current: SeriesVersion,
    },
    /// No lines exist yet
    NoLines,
    /// The price was NaN or infinite
    Rejected { price: f64 },
}

/// Owns the line pair of the current series.
///
/// Every replacement bumps the version, so a drag carrying an older version
/// can never touch the lines of a newer series.
#[derive(Debug, Clone, Default)]
pub struct AnnotationBook {
    version: SeriesVersion,
    lines: Option<LineSet>,
}

impl AnnotationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> SeriesVersion {
        self.version
    }

    pub fn lines(&self) -> Option<&LineSet> {
        self.lines.as_ref()
    }

    /// Discard the current lines and derive fresh ones for `series`.
    /// An empty series leaves the book with no lines.
    pub fn replace(&mut self, series: &Series) -> Result<&LineSet, MarketError> {
        self.version = self.version.next();
        let derived = derive_lines(series, self.version);
        self.store(derived)
    }

    pub fn replace_challenge(
        &mut self,
        challenge: &ChallengeSeries,
    ) -> Result<&LineSet, MarketError> {
        self.version = self.version.next();
        let derived = derive_challenge_lines(challenge, self.version);
        self.store(derived)
    }

    pub fn clear(&mut self) {
        self.version = self.version.next();
        self.lines = None;
    }

    fn store(&mut self, derived: Result<LineSet, MarketError>) -> Result<&LineSet, MarketError> {
        match derived {
            Ok(lines) => {
                tracing::debug!(
                    version = %self.version,
                    current_time = lines.current_time.price,
                    take_profit = lines.take_profit.price,
                    "Lines replaced"
                );
                Ok(&*self.lines.insert(lines))
            }
            Err(e) => {
                self.lines = None;
                Err(e)
            }
        }
    }

    /// Move the take-profit line of series `version` to `price`.
    pub fn apply_drag(&mut self, version: SeriesVersion, price: f64) -> DragOutcome {
        if !price.is_finite() {
            return DragOutcome::Rejected { price };
        }

        let current = self.version;
        let Some(lines) = self.lines.as_mut() else {
            return DragOutcome::NoLines;
        };

        if version != current {
            tracing::debug!(line_version = %version, current = %current, "Dropping stale drag");
            return DragOutcome::Stale {
                line_version: version,
                current,
            };
        }

        lines.take_profit = on_drag(lines.take_profit, price);
        DragOutcome::Applied(lines.take_profit)
    }
}
