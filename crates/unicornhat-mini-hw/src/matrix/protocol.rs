//! HT16D35 command encoding and link framing.
//!
//! Every command is a single opcode byte followed by zero to four data
//! bytes. Display RAM writes append the payload for one controller. Both
//! controllers always receive the same command; only the payload differs,
//! and it is cut out of the combined buffer at the link's base offset.

use crate::{Error, Result, LINK_PAYLOAD_SIZE};

/// HT16D35 opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Reset all registers to their power-on values.
    SoftReset = 0xCC,
    /// Global brightness, 0..=63.
    GlobalBrightness = 0x37,
    /// COM output enable mask.
    ComPinCtrl = 0x41,
    /// ROW output enable mask.
    RowPinCtrl = 0x42,
    /// Write display RAM from the given address.
    WriteDisplay = 0x80,
    /// Read display RAM.
    ReadDisplay = 0x81,
    /// Oscillator and display enable.
    SystemCtrl = 0x35,
    /// Hardware scroll control.
    ScrollCtrl = 0x20,
}

/// Header for a display RAM write starting at address 0.
pub const WRITE_DISPLAY_HEADER: [u8; 2] = [Command::WriteDisplay as u8, 0x00];

/// Brightness sent by the power-on sequence.
pub const INITIAL_BRIGHTNESS: u8 = 0x01;

/// Highest global brightness level.
pub const MAX_BRIGHTNESS_LEVEL: u8 = 63;

/// SYSTEM_CTRL values.
pub const SYSTEM_OFF: u8 = 0x00;
pub const SYSTEM_ON: u8 = 0x03;

/// One of the two SPI links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    /// Chip-select 0, columns 0 to 8.
    Left,
    /// Chip-select 1, columns 9 to 16.
    Right,
}

impl LinkSide {
    /// Both links in transmit order.
    pub const ALL: [LinkSide; 2] = [LinkSide::Left, LinkSide::Right];

    /// Start of this link's payload within the combined buffer.
    pub fn base_offset(&self) -> usize {
        match self {
            LinkSide::Left => 0,
            LinkSide::Right => LINK_PAYLOAD_SIZE,
        }
    }
}

impl std::fmt::Display for LinkSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkSide::Left => write!(f, "left"),
            LinkSide::Right => write!(f, "right"),
        }
    }
}

/// Builds the SOFT_RESET command.
pub fn build_soft_reset() -> Vec<u8> {
    vec![Command::SoftReset as u8]
}

/// Builds a GLOBAL_BRIGHTNESS command.
pub fn build_brightness(level: u8) -> Vec<u8> {
    vec![
        Command::GlobalBrightness as u8,
        level.min(MAX_BRIGHTNESS_LEVEL),
    ]
}

/// Builds a SCROLL_CTRL command.
pub fn build_scroll_ctrl(value: u8) -> Vec<u8> {
    vec![Command::ScrollCtrl as u8, value]
}

/// Builds a SYSTEM_CTRL command.
pub fn build_system_ctrl(value: u8) -> Vec<u8> {
    vec![Command::SystemCtrl as u8, value]
}

/// Builds a COM_PIN_CTRL command.
pub fn build_com_pin_ctrl(mask: u8) -> Vec<u8> {
    vec![Command::ComPinCtrl as u8, mask]
}

/// Builds a ROW_PIN_CTRL command.
pub fn build_row_pin_ctrl(mask: [u8; 4]) -> Vec<u8> {
    let mut command = vec![Command::RowPinCtrl as u8];
    command.extend_from_slice(&mask);
    command
}

/// Converts a 0.0..=1.0 brightness into the controller's 0..=63 level.
pub fn brightness_level(brightness: f32) -> u8 {
    (f32::from(MAX_BRIGHTNESS_LEVEL) * brightness.clamp(0.0, 1.0)).round() as u8
}

/// Frames a command for both links.
///
/// Without a payload both frames are the bare command. With one, each frame
/// is the command followed by `length` bytes of `buffer` starting at that
/// link's base offset.
pub fn split_frames(command: &[u8], payload: Option<(&[u8], usize)>) -> Result<[Vec<u8>; 2]> {
    let frame = |side: LinkSide| -> Result<Vec<u8>> {
        let mut bytes = command.to_vec();
        if let Some((buffer, length)) = payload {
            let start = side.base_offset();
            let slice = buffer.get(start..start + length).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "payload {}..{} exceeds {}-byte buffer",
                    start,
                    start + length,
                    buffer.len()
                ))
            })?;
            bytes.extend_from_slice(slice);
        }
        Ok(bytes)
    };

    Ok([frame(LinkSide::Left)?, frame(LinkSide::Right)?])
}
