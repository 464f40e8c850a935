use market_core::Candle;
use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::style::{ChartOptions, LineOptions};

/// Renderer-issued id of a drawn price line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineHandle(pub u64);

impl std::fmt::Display for LineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line#{}", self.0)
    }
}

/// Candlestick renderer the adapter draws on.
///
/// Drags on subscribed lines are not delivered through this trait; the host
/// forwards them as `(handle, price)` events to [`crate::ChartAdapter::on_line_dragged`].
pub trait RenderSurface {
    /// Whether the chart container exists and can take calls
    fn is_attached(&self) -> bool;

    /// Apply layout, theme and size
    fn configure(&mut self, options: &ChartOptions) -> Result<(), SurfaceError>;

    /// Replace the candlestick data
    fn set_series(&mut self, candles: &[Candle]) -> Result<(), SurfaceError>;

    fn create_price_line(&mut self, options: &LineOptions) -> Result<LineHandle, SurfaceError>;

    fn remove_price_line(&mut self, handle: LineHandle) -> Result<(), SurfaceError>;

    /// Fit the time axis to the data
    fn fit_to_content(&mut self) -> Result<(), SurfaceError>;

    /// Ask the renderer to report drags of this line
    fn subscribe_line_dragged(&mut self, handle: LineHandle) -> Result<(), SurfaceError>;

    fn relayout_width(&mut self, width: u32) -> Result<(), SurfaceError>;
}
