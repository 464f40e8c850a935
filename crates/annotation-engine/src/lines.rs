use market_core::{max_high, Candle, LineSet, MarketError, PriceLine, Series, SeriesVersion};

/// Distance of the default take-profit below the highest high, in price units
pub const TAKE_PROFIT_OFFSET: f64 = 1.0;

/// Derive both lines for a series.
///
/// The current-time marker sits at the last close; the take-profit line
/// starts one price unit under the highest high of the series.
pub fn derive_lines(series: &Series, version: SeriesVersion) -> Result<LineSet, MarketError> {
    let last = series.last().ok_or(MarketError::EmptySeries)?;
    let take_profit = take_profit_price(series.candles()).ok_or(MarketError::EmptySeries)?;

    Ok(LineSet {
        current_time: PriceLine::current_time(last.close, version),
        take_profit: PriceLine::take_profit(take_profit, version),
    })
}

/// Default take-profit price over a candle slice
pub fn take_profit_price(candles: &[Candle]) -> Option<f64> {
    max_high(candles).map(|high| high - TAKE_PROFIT_OFFSET)
}

/// Move a draggable line to `new_price`.
///
/// The price is not clamped to the candle range: a take-profit target may be
/// set anywhere. Lines that are not draggable come back unchanged.
pub fn on_drag(line: PriceLine, new_price: f64) -> PriceLine {
    if !line.draggable {
        tracing::debug!(kind = %line.kind, "Ignoring drag on a fixed line");
        return line;
    }
    line.with_price(new_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use market_core::LineKind;

    fn series(candles: Vec<Candle>) -> Series {
        Series::new("TEST", 1, candles)
    }

    #[test]
    fn test_single_candle_lines() {
        let s = series(vec![Candle::new(0, 10.0, 12.0, 9.0, 11.0)]);
        let lines = derive_lines(&s, SeriesVersion(1)).unwrap();

        assert_eq!(lines.current_time.price, 11.0);
        assert_eq!(lines.take_profit.price, 11.0);
        assert_eq!(lines.current_time.kind, LineKind::CurrentTime);
        assert!(!lines.current_time.draggable);
        assert!(lines.take_profit.draggable);
        assert_eq!(lines.version(), SeriesVersion(1));
    }

    #[test]
    fn test_take_profit_uses_highest_high_anywhere() {
        let s = series(vec![
            Candle::new(0, 10.0, 30.5, 9.0, 11.0),
            Candle::new(60, 11.0, 13.0, 10.0, 12.0),
            Candle::new(120, 12.0, 14.0, 11.0, 13.5),
        ]);
        let lines = derive_lines(&s, SeriesVersion(2)).unwrap();

        assert_relative_eq!(lines.take_profit.price, 29.5);
        assert_eq!(lines.current_time.price, 13.5);
    }

    #[test]
    fn test_empty_series_fails() {
        let err = derive_lines(&series(Vec::new()), SeriesVersion(1)).unwrap_err();
        assert_eq!(err, MarketError::EmptySeries);
    }

    #[test]
    fn test_drag_is_unclamped() {
        let tp = PriceLine::take_profit(11.0, SeriesVersion(1));
        assert_eq!(on_drag(tp, 1_000_000.0).price, 1_000_000.0);
        assert_eq!(on_drag(tp, -5.0).price, -5.0);
    }

    #[test]
    fn test_drag_replay_is_idempotent() {
        let tp = PriceLine::take_profit(11.0, SeriesVersion(4));
        let once = on_drag(tp, 15.25);
        let twice = on_drag(on_drag(tp, 15.25), 15.25);
        assert_eq!(once, twice);
        assert_eq!(once.series_version, SeriesVersion(4));
    }

    #[test]
    fn test_drag_leaves_fixed_line_alone() {
        let marker = PriceLine::current_time(11.0, SeriesVersion(1));
        assert_eq!(on_drag(marker, 20.0), marker);
    }
}
