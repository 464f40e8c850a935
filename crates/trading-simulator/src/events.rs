use chart_adapter::{DragRelay, LineHandle, PublishOutcome, SurfaceError};
use market_core::{Interval, SeriesVersion};
use serde::{Deserialize, Serialize};

/// Discrete input to a chart session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartEvent {
    /// Asset tile clicked
    SelectInstrument { key: String },
    /// Interval button clicked
    SelectInterval { interval: Interval },
    /// Chart container mounted
    Mount { width: u32 },
    /// Chart container unmounted
    Unmount,
    /// Chart container width changed
    Resize { width: u32 },
    /// Renderer reported a drag of a price line
    LineDragged { handle: LineHandle, price: f64 },
    /// Drag of whatever take-profit line is currently drawn
    DragTakeProfit { price: f64 },
    /// Refresh timer fired
    Refresh,
    /// Show or hide the future part of a challenge chart
    RevealFuture { reveal: bool },
}

/// What a session did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// A new series replaced the old one
    Regenerated {
        version: SeriesVersion,
        publish: PublishOutcome,
    },
    /// A generation result arrived after a newer one was requested
    Superseded,
    Mounted(PublishOutcome),
    Unmounted,
    Resized(PublishOutcome),
    Dragged(DragRelay),
    /// Nothing to do
    Unchanged,
    /// The renderer failed; series and lines are untouched
    SurfaceFailed(SurfaceError),
}
