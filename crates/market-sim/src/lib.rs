//! Market Simulator
//!
//! Static instrument catalog and the synthetic OHLC random walk that feeds
//! the practice chart.

pub mod catalog;
pub mod generator;
pub mod random;
pub mod registry;

pub use catalog::{AssetCatalog, AssetTile};
pub use generator::{generate, generate_challenge, GeneratorConfig, SeriesGenerator};
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use registry::{InstrumentRegistry, FALLBACK_BASE_PRICE, FALLBACK_VOLATILITY};
