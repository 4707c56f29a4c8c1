//! LED matrix module.
//!
//! Provides control over the 17x7 RGB matrix driven by two HT16D35
//! controllers over SPI.

mod device;
mod scroll;

pub mod framebuffer;
pub mod lut;
pub mod protocol;

pub use device::UnicornHatMini;
pub use framebuffer::{Color, Framebuffer, Rgb};
pub use protocol::{Command, LinkSide};
pub use scroll::{ScrollHandle, ScrollOptions};
