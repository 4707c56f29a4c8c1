//! Logical pixel grid and the physical display RAM image.

use std::str::FromStr;

use super::lut;
use crate::orientation::{storage_offset, Orientation};
use crate::{Error, Result, BUFFER_SIZE, COLS, NUM_PIXELS, ROWS};

/// A stored pixel: three 6-bit channel values as the controllers take them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Reduces 8-bit channels to the 6-bit depth of the controllers.
    #[inline]
    pub fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self::new(r >> 2, g >> 2, b >> 2)
    }
}

/// An 8-bit RGB colour as supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from untyped numeric components.
    ///
    /// Each component must be a whole number in 0..=255.
    pub fn from_components(r: f64, g: f64, b: f64) -> Result<Self> {
        Ok(Self::new(
            channel("r", r)?,
            channel("g", g)?,
            channel("b", b)?,
        ))
    }
}

fn channel(name: &str, value: f64) -> Result<u8> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::invalid_argument(format!(
            "{} must be an integer (got {})",
            name, value
        )));
    }
    if !(0.0..=255.0).contains(&value) {
        return Err(Error::invalid_argument(format!(
            "{} must be between 0 and 255 (got {})",
            name, value
        )));
    }
    Ok(value as u8)
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `#rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let invalid = || Error::invalid_argument(format!("invalid hex colour: {}", s));
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
            return Ok(Color::new(r, g, b));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(Error::invalid_argument(format!(
                "colour must be r,g,b or #rrggbb (got {})",
                s
            )));
        }
        let mut components = [0.0f64; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| Error::invalid_argument(format!("invalid colour component: {}", part)))?;
        }
        Color::from_components(components[0], components[1], components[2])
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Frame buffer for the 17x7 matrix.
///
/// Holds the logical grid as written through the API and the 448-byte
/// display RAM image produced by the last [`render`](Framebuffer::render).
#[derive(Clone)]
pub struct Framebuffer {
    /// Stored pixels, indexed by [`storage_offset`].
    pixels: [Rgb; NUM_PIXELS],
    /// Display RAM for both controllers, left half first.
    buffer: [u8; BUFFER_SIZE],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Creates a new framebuffer with every pixel off.
    pub fn new() -> Self {
        Self {
            pixels: [Rgb::default(); NUM_PIXELS],
            buffer: [0; BUFFER_SIZE],
        }
    }

    /// Sets a pixel from 8-bit channels.
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) -> Result<()> {
        let offset = storage_offset(x, y)?;
        self.pixels[offset] = Rgb::from_rgb888(r, g, b);
        Ok(())
    }

    /// Gets the stored (6-bit) value of a pixel.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Rgb> {
        Ok(self.pixels[storage_offset(x, y)?])
    }

    /// Turns a single pixel off.
    pub fn clear_pixel(&mut self, x: i32, y: i32) -> Result<()> {
        self.set_pixel(x, y, 0, 0, 0)
    }

    /// Sets every pixel to the same colour.
    pub fn set_all(&mut self, r: u8, g: u8, b: u8) {
        for x in 0..COLS as i32 {
            for y in 0..ROWS as i32 {
                // in range by construction
                let _ = self.set_pixel(x, y, r, g, b);
            }
        }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.set_all(0, 0, 0);
    }

    /// Returns the logical grid, indexed by [`storage_offset`].
    pub fn pixels(&self) -> &[Rgb; NUM_PIXELS] {
        &self.pixels
    }

    /// Returns the display RAM image from the last render.
    pub fn buffer(&self) -> &[u8; BUFFER_SIZE] {
        &self.buffer
    }

    /// Rebuilds the display RAM image from the logical grid.
    pub fn render(&mut self, orientation: &Orientation) -> Result<()> {
        let mut buffer = [0u8; BUFFER_SIZE];

        for x in 0..COLS as i32 {
            for y in 0..ROWS as i32 {
                let pixel = self.pixels[storage_offset(x, y)?];
                let [ir, ig, ib] = lut::lookup(orientation.resolve_position(x, y)?);
                buffer[ir] = pixel.r;
                buffer[ig] = pixel.g;
                buffer[ib] = pixel.b;
            }
        }

        self.buffer = buffer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Rotation;

    #[test]
    fn test_set_get_round_trip() {
        let mut fb = Framebuffer::new();
        for value in 0..=255u8 {
            fb.set_pixel(3, 4, value, 255 - value, value / 2).unwrap();
            assert_eq!(
                fb.get_pixel(3, 4).unwrap(),
                Rgb::new(value >> 2, (255 - value) >> 2, (value / 2) >> 2)
            );
        }
    }

    #[test]
    fn test_set_all() {
        let mut fb = Framebuffer::new();
        fb.set_all(10, 20, 30);
        for x in 0..COLS as i32 {
            for y in 0..ROWS as i32 {
                assert_eq!(fb.get_pixel(x, y).unwrap(), Rgb::new(2, 5, 7));
            }
        }
    }

    #[test]
    fn test_invalid_pixel() {
        let mut fb = Framebuffer::new();
        assert!(matches!(
            fb.set_pixel(17, 0, 0, 0, 0),
            Err(Error::InvalidPixel { x: 17, y: 0 })
        ));
        assert!(matches!(
            fb.get_pixel(-1, 3),
            Err(Error::InvalidPixel { x: -1, y: 3 })
        ));
        assert!(fb.clear_pixel(0, 7).is_err());
    }

    #[test]
    fn test_clear_pixel() {
        let mut fb = Framebuffer::new();
        fb.set_all(255, 255, 255);
        fb.clear_pixel(5, 5).unwrap();
        assert_eq!(fb.get_pixel(5, 5).unwrap(), Rgb::default());
        assert_eq!(fb.get_pixel(5, 4).unwrap(), Rgb::new(63, 63, 63));
    }

    #[test]
    fn test_render_cleared_is_zero() {
        let mut fb = Framebuffer::new();
        fb.set_all(255, 128, 64);
        fb.render(&Orientation::default()).unwrap();
        assert!(fb.buffer().iter().any(|&b| b != 0));

        fb.clear();
        fb.render(&Orientation::default()).unwrap();
        assert_eq!(fb.buffer().len(), BUFFER_SIZE);
        assert!(fb.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_render_places_channels() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(0, 0, 4, 8, 12).unwrap();
        fb.render(&Orientation::default()).unwrap();

        let [ir, ig, ib] = lut::lookup(0);
        assert_eq!(fb.buffer()[ir], 1);
        assert_eq!(fb.buffer()[ig], 2);
        assert_eq!(fb.buffer()[ib], 3);
        assert_eq!(fb.buffer().iter().filter(|&&b| b != 0).count(), 3);
    }

    #[test]
    fn test_render_follows_orientation() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(0, 0, 255, 0, 0).unwrap();
        fb.render(&Orientation::new(Rotation::Deg180, false, false))
            .unwrap();

        // (0, 0) rotated by 180 degrees lands on (16, 6)
        let [ir, _, _] = lut::lookup(16 * ROWS + 6);
        assert_eq!(fb.buffer()[ir], 63);
        assert_eq!(fb.get_pixel(0, 0).unwrap(), Rgb::new(63, 0, 0));
    }

    #[test]
    fn test_color_from_components() {
        assert_eq!(
            Color::from_components(10.0, 20.0, 30.0).unwrap(),
            Color::new(10, 20, 30)
        );
        assert!(matches!(
            Color::from_components(1.5, 0.0, 0.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(Color::from_components(0.0, 256.0, 0.0).is_err());
        assert!(Color::from_components(0.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::new(255, 0, 0));
        assert_eq!("10, 20, 30".parse::<Color>().unwrap(), Color::new(10, 20, 30));
        assert!(matches!(
            "1.5,0,0".parse::<Color>(),
            Err(Error::InvalidArgument(_))
        ));
        assert!("#12345".parse::<Color>().is_err());
        assert!("red".parse::<Color>().is_err());
        assert_eq!(Color::new(1, 2, 255).to_string(), "#0102ff");
    }
}
