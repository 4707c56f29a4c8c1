//! Error types for the Unicorn HAT Mini hardware library.

use crate::matrix::LinkSide;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the matrix.
#[derive(Error, Debug)]
pub enum Error {
    /// Pixel coordinate outside the 17x7 surface.
    #[error("invalid pixel: ({x},{y})")]
    InvalidPixel { x: i32, y: i32 },

    /// Argument rejected before touching the hardware (colour component,
    /// rotation, brightness, letter position, payload slice).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing a frame to one of the SPI links failed.
    #[error("transfer to {link} link failed: {source}")]
    Transfer {
        link: LinkSide,
        #[source]
        source: std::io::Error,
    },

    /// Opening or configuring a spidev node failed.
    #[error("failed to open SPI link at {path}: {source}")]
    LinkOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}
