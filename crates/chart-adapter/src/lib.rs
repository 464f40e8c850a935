//! Chart Adapter
//!
//! Binds generated series and their annotation lines to a candlestick
//! renderer, and relays renderer drag and resize events back.

pub mod adapter;
pub mod error;
pub mod recording;
pub mod style;
pub mod surface;

pub use adapter::{ChartAdapter, DragRelay, PublishOutcome};
pub use error::SurfaceError;
pub use recording::{RecordingSurface, SurfaceCall, SurfaceSnapshot};
pub use style::{ChartOptions, ChartTheme, LineOptions, LineStyle};
pub use surface::{LineHandle, RenderSurface};
