//! 5x7 glyph bitmaps for text rendering.

use std::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X7, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

/// Glyph dimensions.
pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;

/// A 5x7 bitmap, row-major, `true` = lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    rows: [[bool; GLYPH_WIDTH]; GLYPH_HEIGHT],
}

impl Glyph {
    pub fn from_rows(rows: [[bool; GLYPH_WIDTH]; GLYPH_HEIGHT]) -> Self {
        Self { rows }
    }

    /// Returns whether the pixel at column `x`, row `y` is lit.
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }
}

/// Lookup from character to bitmap.
pub trait GlyphSource {
    /// Returns the bitmap for `ch`, or `None` when the font lacks it.
    fn glyph(&self, ch: char) -> Option<Glyph>;
}

/// Printable ASCII from embedded-graphics' 5x7 mono font.
pub struct Font5x7 {
    glyphs: Vec<Glyph>,
}

const FIRST_CHAR: char = ' ';
const LAST_CHAR: char = '~';

impl Default for Font5x7 {
    fn default() -> Self {
        Self::new()
    }
}

impl Font5x7 {
    /// Rasterises every printable ASCII character once.
    pub fn new() -> Self {
        let style = MonoTextStyle::new(&FONT_5X7, BinaryColor::On);
        let glyphs = (FIRST_CHAR..=LAST_CHAR)
            .map(|ch| {
                let mut canvas = GlyphCanvas::default();
                let mut utf8 = [0u8; 4];
                let text = ch.encode_utf8(&mut utf8);
                let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top)
                    .draw(&mut canvas);
                canvas.glyph
            })
            .collect();
        Self { glyphs }
    }
}

impl GlyphSource for Font5x7 {
    fn glyph(&self, ch: char) -> Option<Glyph> {
        if !(FIRST_CHAR..=LAST_CHAR).contains(&ch) {
            return None;
        }
        self.glyphs
            .get(ch as usize - FIRST_CHAR as usize)
            .copied()
    }
}

/// Draw target covering exactly one glyph cell.
#[derive(Default)]
struct GlyphCanvas {
    glyph: Glyph,
}

impl OriginDimensions for GlyphCanvas {
    fn size(&self) -> Size {
        Size::new(GLYPH_WIDTH as u32, GLYPH_HEIGHT as u32)
    }
}

impl DrawTarget for GlyphCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if x < GLYPH_WIDTH && y < GLYPH_HEIGHT {
                    self.glyph.rows[y][x] = color.is_on();
                }
            }
        }
        Ok(())
    }
}
