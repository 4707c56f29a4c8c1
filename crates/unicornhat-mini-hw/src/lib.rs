//! Unicorn HAT Mini Hardware Library
//!
//! Drives the 17x7 RGB LED matrix of the Pimoroni Unicorn HAT Mini. The
//! matrix is split across two Holtek HT16D35 controllers, each reached over
//! its own SPI chip-select; this crate maps logical pixels onto the two
//! controllers' display RAM and frames the command stream for both links.

pub mod error;
pub mod glyph;
pub mod matrix;
pub mod orientation;
pub mod transport;

pub use error::{Error, Result};
pub use glyph::{Font5x7, Glyph, GlyphSource};
pub use matrix::{Color, Framebuffer, Rgb, ScrollHandle, ScrollOptions, UnicornHatMini};
pub use orientation::{Orientation, Rotation};
pub use transport::{MemoryTransport, Transport};

#[cfg(target_os = "linux")]
pub use transport::SpiTransport;

/// Matrix dimensions (columns are x, rows are y).
pub const COLS: usize = 17;
pub const ROWS: usize = 7;

/// Number of logical pixels.
pub const NUM_PIXELS: usize = COLS * ROWS;

/// Display RAM bytes sent to one controller (28 columns x 8 rows).
pub const LINK_PAYLOAD_SIZE: usize = 28 * 8;

/// Combined physical buffer covering both controllers.
pub const BUFFER_SIZE: usize = LINK_PAYLOAD_SIZE * 2;

/// Default spidev nodes for the two chip-selects.
pub const LEFT_LINK_PATH: &str = "/dev/spidev0.0";
pub const RIGHT_LINK_PATH: &str = "/dev/spidev0.1";
