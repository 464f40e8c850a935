use market_core::{ChallengeSeries, LineSet, MarketError, PriceLine, SeriesVersion};

use crate::lines::take_profit_price;

/// Lines for a challenge chart.
///
/// The current-time marker stays on the last past close even when the
/// future is revealed; the take-profit line follows whatever is visible.
pub fn derive_challenge_lines(
    challenge: &ChallengeSeries,
    version: SeriesVersion,
) -> Result<LineSet, MarketError> {
    let last_past = challenge.past.last().ok_or(MarketError::EmptySeries)?;
    let take_profit =
        take_profit_price(&challenge.visible_candles()).ok_or(MarketError::EmptySeries)?;

    Ok(LineSet {
        current_time: PriceLine::current_time(last_past.close, version),
        take_profit: PriceLine::take_profit(take_profit, version),
    })
}
