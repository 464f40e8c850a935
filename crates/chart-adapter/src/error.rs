use thiserror::Error;

use crate::surface::LineHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Chart container is not attached")]
    NotAttached,

    #[error("Unknown price line handle: {0}")]
    UnknownHandle(LineHandle),

    #[error("Renderer error: {0}")]
    Backend(String),
}
