//! Byte transports for the two controller links.

use std::io;
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use crate::{Error, Result};

/// A write-only byte channel to one controller.
pub trait Transport {
    /// Writes one complete frame.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Default SPI clock for the HT16D35.
pub const DEFAULT_SPI_SPEED_HZ: u32 = 600_000;

/// SPI link backed by a Linux spidev node.
#[cfg(target_os = "linux")]
pub struct SpiTransport {
    device: spidev::Spidev,
}

#[cfg(target_os = "linux")]
impl SpiTransport {
    /// Opens and configures a spidev node (mode 0, 8 bits per word).
    pub fn open(path: &str, speed_hz: u32) -> Result<Self> {
        use spidev::{SpiModeFlags, Spidev, SpidevOptions};

        let link_open = |source| Error::LinkOpen {
            path: path.to_string(),
            source,
        };

        let mut device = Spidev::open(path).map_err(link_open)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        device.configure(&options).map_err(link_open)?;

        tracing::info!("SPI link opened at {} ({} Hz)", path, speed_hz);

        Ok(Self { device })
    }
}

#[cfg(target_os = "linux")]
impl Transport for SpiTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut self.device, bytes)
    }
}

/// In-memory transport that records every frame.
///
/// Clones share the same record, so a test can keep one clone while the
/// driver owns the other.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    fail: Arc<Mutex<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every frame written so far.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// Returns the most recent frame.
    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }

    /// Forgets all recorded frames.
    pub fn reset(&self) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.clear();
        }
    }

    /// Makes subsequent writes fail with `BrokenPipe`.
    pub fn set_failing(&self, fail: bool) {
        if let Ok(mut flag) = self.fail.lock() {
            *flag = fail;
        }
    }
}

impl Transport for MemoryTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail.lock().map(|f| *f).unwrap_or(false) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link down"));
        }
        self.frames
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "frame log poisoned"))?
            .push(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_transport_records() {
        let transport = MemoryTransport::new();
        let mut writer = transport.clone();
        writer.write(&[0xCC]).unwrap();
        writer.write(&[0x37, 0x01]).unwrap();
        assert_eq!(transport.frames(), vec![vec![0xCC], vec![0x37, 0x01]]);
        assert_eq!(transport.last_frame(), Some(vec![0x37, 0x01]));

        transport.reset();
        assert!(transport.frames().is_empty());
    }

    #[test]
    fn test_memory_transport_failure() {
        let transport = MemoryTransport::new();
        let mut writer = transport.clone();
        transport.set_failing(true);
        assert!(writer.write(&[0xCC]).is_err());
        assert!(transport.frames().is_empty());
    }

    // Hardware tests are skipped by default
    #[cfg(target_os = "linux")]
    #[test]
    #[ignore]
    fn test_spi_open() {
        let link = SpiTransport::open(crate::LEFT_LINK_PATH, DEFAULT_SPI_SPEED_HZ);
        assert!(link.is_ok());
    }
}
