use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Cannot annotate an empty series")]
    EmptySeries,

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}
