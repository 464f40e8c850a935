pub mod error;
pub mod interval;
pub mod types;

pub use error::*;
pub use interval::*;
pub use types::*;
