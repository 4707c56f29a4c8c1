//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use unicornhat_mini_hw::{Transport, UnicornHatMini, LEFT_LINK_PATH, RIGHT_LINK_PATH};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// SPI link configuration
    #[serde(default)]
    pub links: LinkConfig,

    /// Render settings applied after the links are opened
    #[serde(default)]
    pub display: DisplayConfig,

    /// Text scroll defaults
    #[serde(default)]
    pub scroll: ScrollConfig,
}

/// SPI link configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// spidev node for the left controller
    #[serde(default = "default_left")]
    pub left: String,

    /// spidev node for the right controller
    #[serde(default = "default_right")]
    pub right: String,

    /// SPI clock in Hz
    #[serde(default = "default_speed")]
    pub speed_hz: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
            speed_hz: default_speed(),
        }
    }
}

/// Render settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Rotation in degrees (0, 90, 180, 270)
    #[serde(default)]
    pub rotation: u16,

    /// Mirror the x axis
    #[serde(default)]
    pub flip_x: bool,

    /// Mirror the y axis
    #[serde(default)]
    pub flip_y: bool,

    /// Global brightness (0.0-1.0)
    #[serde(default = "default_brightness")]
    pub brightness: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: 0,
            flip_x: false,
            flip_y: false,
            brightness: default_brightness(),
        }
    }
}

/// Text scroll defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrollConfig {
    /// Delay between frames in milliseconds
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
        }
    }
}

// Default value functions
fn default_left() -> String {
    LEFT_LINK_PATH.to_string()
}

fn default_right() -> String {
    RIGHT_LINK_PATH.to_string()
}

fn default_speed() -> u32 {
    unicornhat_mini_hw::transport::DEFAULT_SPI_SPEED_HZ
}

fn default_brightness() -> f32 {
    0.5
}

fn default_interval() -> u64 {
    100
}

impl Config {
    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Applies the render settings to an opened display.
    pub fn apply<T: Transport>(&self, display: &mut UnicornHatMini<T>) -> Result<()> {
        display
            .set_rotation(self.display.rotation)
            .context("Invalid display.rotation")?;
        if self.display.flip_x != display.flip_x() {
            display.toggle_flip_x();
        }
        if self.display.flip_y != display.flip_y() {
            display.toggle_flip_y();
        }
        display
            .set_brightness(self.display.brightness)
            .context("Failed to apply display.brightness")?;
        Ok(())
    }
}
