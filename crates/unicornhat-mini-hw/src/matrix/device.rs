//! Display driver for the dual-controller matrix.

use tracing::{debug, info};

use super::framebuffer::{Color, Framebuffer, Rgb};
use super::protocol::{
    brightness_level, build_brightness, build_com_pin_ctrl, build_row_pin_ctrl,
    build_scroll_ctrl, build_soft_reset, build_system_ctrl, split_frames, LinkSide,
    INITIAL_BRIGHTNESS, SYSTEM_OFF, SYSTEM_ON, WRITE_DISPLAY_HEADER,
};
use crate::glyph::{Font5x7, GlyphSource, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::orientation::{Orientation, Rotation};
use crate::transport::Transport;
use crate::{Error, Result, BUFFER_SIZE, COLS, LINK_PAYLOAD_SIZE, NUM_PIXELS, ROWS};

#[cfg(target_os = "linux")]
use crate::transport::{SpiTransport, DEFAULT_SPI_SPEED_HZ};

/// Horizontal distance between letter slots (glyph plus one blank column).
pub(crate) const LETTER_PITCH: i32 = GLYPH_WIDTH as i32 + 1;

/// Number of letter slots; the last one only shows while scrolling.
pub(crate) const LETTER_SLOTS: u8 = 4;

/// Unicorn HAT Mini driver.
///
/// Owns the logical grid, the render settings and both links. Every
/// command goes to the left link first, then the right one.
pub struct UnicornHatMini<T: Transport> {
    links: [T; 2],
    framebuffer: Framebuffer,
    orientation: Orientation,
    brightness: f32,
    glyphs: Box<dyn GlyphSource + Send + Sync>,
}

#[cfg(target_os = "linux")]
impl UnicornHatMini<SpiTransport> {
    /// Opens both chip-selects at their default paths.
    pub fn open() -> Result<Self> {
        Self::open_paths(
            crate::LEFT_LINK_PATH,
            crate::RIGHT_LINK_PATH,
            DEFAULT_SPI_SPEED_HZ,
        )
    }

    /// Opens both chip-selects at explicit spidev paths.
    pub fn open_paths(left: &str, right: &str, speed_hz: u32) -> Result<Self> {
        let left = SpiTransport::open(left, speed_hz)?;
        let right = SpiTransport::open(right, speed_hz)?;
        Self::new(left, right)
    }
}

impl<T: Transport> UnicornHatMini<T> {
    /// Takes ownership of both links and runs the power-on sequence.
    pub fn new(left: T, right: T) -> Result<Self> {
        let mut display = Self {
            links: [left, right],
            framebuffer: Framebuffer::new(),
            orientation: Orientation::default(),
            brightness: 1.0,
            glyphs: Box::new(Font5x7::new()),
        };
        display.initialize()?;
        Ok(display)
    }

    /// Replaces the glyph source used for letters and scrolling.
    pub fn with_glyphs(mut self, glyphs: impl GlyphSource + Send + Sync + 'static) -> Self {
        self.glyphs = Box::new(glyphs);
        self
    }

    fn initialize(&mut self) -> Result<()> {
        let blank = [0u8; BUFFER_SIZE];

        self.transmit(&build_soft_reset(), None)?;
        self.transmit(&build_brightness(INITIAL_BRIGHTNESS), None)?;
        self.transmit(&build_scroll_ctrl(0x00), None)?;
        self.transmit(&build_system_ctrl(SYSTEM_OFF), None)?;
        self.transmit(&WRITE_DISPLAY_HEADER, Some(&blank))?;
        self.transmit(&build_com_pin_ctrl(0xFF), None)?;
        self.transmit(&build_row_pin_ctrl([0xFF; 4]), None)?;
        self.transmit(&build_system_ctrl(SYSTEM_ON), None)?;

        info!("Matrix initialized on both links");
        Ok(())
    }

    /// Frames `command` for both links and writes left, then right.
    fn transmit(&mut self, command: &[u8], payload: Option<&[u8; BUFFER_SIZE]>) -> Result<()> {
        Self::transmit_on(&mut self.links, command, payload)
    }

    fn transmit_on(
        links: &mut [T; 2],
        command: &[u8],
        payload: Option<&[u8; BUFFER_SIZE]>,
    ) -> Result<()> {
        let frames = split_frames(
            command,
            payload.map(|buffer| (&buffer[..], LINK_PAYLOAD_SIZE)),
        )?;

        for ((side, link), frame) in LinkSide::ALL.into_iter().zip(links.iter_mut()).zip(frames) {
            link.write(&frame)
                .map_err(|source| Error::Transfer { link: side, source })?;
            debug!(
                "Sent {} bytes to {} link (command {:02X?})",
                frame.len(),
                side,
                command
            );
        }
        Ok(())
    }

    /// Sets a pixel from 8-bit channels.
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) -> Result<()> {
        self.framebuffer.set_pixel(x, y, r, g, b)
    }

    /// Gets the stored (6-bit) value of a pixel.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Rgb> {
        self.framebuffer.get_pixel(x, y)
    }

    /// Turns a single pixel off.
    pub fn clear_pixel(&mut self, x: i32, y: i32) -> Result<()> {
        self.framebuffer.clear_pixel(x, y)
    }

    /// Sets every pixel to the same colour.
    pub fn set_all(&mut self, r: u8, g: u8, b: u8) {
        self.framebuffer.set_all(r, g, b);
    }

    /// Turns every pixel off. Takes effect on the next [`show`](Self::show).
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Returns the logical grid, indexed column by column.
    pub fn pixels(&self) -> &[Rgb; NUM_PIXELS] {
        self.framebuffer.pixels()
    }

    /// Returns the display RAM image sent by the last [`show`](Self::show).
    pub fn physical_buffer(&self) -> &[u8; BUFFER_SIZE] {
        self.framebuffer.buffer()
    }

    /// Renders the grid and sends it to both controllers, followed by the
    /// current brightness.
    pub fn show(&mut self) -> Result<()> {
        self.framebuffer.render(&self.orientation)?;
        Self::transmit_on(
            &mut self.links,
            &WRITE_DISPLAY_HEADER,
            Some(self.framebuffer.buffer()),
        )?;
        self.transmit(&build_brightness(brightness_level(self.brightness)), None)
    }

    /// Sets the rotation in degrees (0, 90, 180 or 270).
    pub fn set_rotation(&mut self, degrees: u16) -> Result<()> {
        self.orientation.rotation = Rotation::try_from(degrees)?;
        debug!("Rotation set to {}", self.orientation.rotation);
        Ok(())
    }

    /// Returns the rotation in degrees.
    pub fn rotation(&self) -> u16 {
        self.orientation.rotation.degrees()
    }

    /// Mirrors the x axis (toggle).
    pub fn toggle_flip_x(&mut self) {
        self.orientation.flip_x = !self.orientation.flip_x;
        debug!("flip_x = {}", self.orientation.flip_x);
    }

    /// Mirrors the y axis (toggle).
    pub fn toggle_flip_y(&mut self) {
        self.orientation.flip_y = !self.orientation.flip_y;
        debug!("flip_y = {}", self.orientation.flip_y);
    }

    pub fn flip_x(&self) -> bool {
        self.orientation.flip_x
    }

    pub fn flip_y(&self) -> bool {
        self.orientation.flip_y
    }

    /// Returns the full render settings.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Sets the global brightness (0.0 to 1.0) and sends it immediately.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&brightness) {
            return Err(Error::invalid_argument(format!(
                "brightness must be between 0.0 and 1.0 (got {})",
                brightness
            )));
        }
        self.brightness = brightness;
        self.transmit(&build_brightness(brightness_level(brightness)), None)
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Draws a letter into one of the four letter slots, shifted left by
    /// `scroll_out` columns.
    ///
    /// Lit glyph pixels are painted with `color`, or with the glyph
    /// gradient when `None`; unlit ones are cleared. Columns that fall off
    /// the matrix are skipped. Characters without a glyph clear their cell.
    pub fn set_letter(
        &mut self,
        ch: char,
        position: u8,
        scroll_out: i32,
        color: Option<Color>,
    ) -> Result<()> {
        if !(1..=LETTER_SLOTS).contains(&position) {
            return Err(Error::invalid_argument(format!(
                "letter position must be one of 1, 2, 3, 4 (got {})",
                position
            )));
        }

        let glyph = self.glyphs.glyph(ch);
        let x_offset = (i32::from(position) - 1) * LETTER_PITCH - scroll_out;

        for gx in 0..GLYPH_WIDTH {
            let x = gx as i32 + x_offset;
            if !(0..COLS as i32).contains(&x) {
                continue;
            }
            for gy in 0..GLYPH_HEIGHT {
                let lit = glyph.map(|g| g.is_lit(gx, gy)).unwrap_or(false);
                if lit {
                    let paint = color.unwrap_or_else(|| gradient(gx, gy));
                    self.set_pixel(x, gy as i32, paint.r, paint.g, paint.b)?;
                } else {
                    self.clear_pixel(x, gy as i32)?;
                }
            }
        }
        Ok(())
    }

    /// Fills the grid with a diagonal rainbow.
    pub fn set_rainbow(&mut self) {
        for x in 0..COLS {
            for y in 0..ROWS {
                let paint = gradient(x, y);
                // in range by construction
                let _ = self
                    .framebuffer
                    .set_pixel(x as i32, y as i32, paint.r, paint.g, paint.b);
            }
        }
    }
}

/// Colour ramp: red grows along x, green along y, blue falls with green.
fn gradient(x: usize, y: usize) -> Color {
    let r = (x * 255 / COLS) as u8;
    let g = (y * 255 / ROWS) as u8;
    Color::new(r, g, 200u8.saturating_sub(g))
}
