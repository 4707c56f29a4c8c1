//! Display orientation support.
//!
//! The controllers have no notion of rotation; every orientation is applied
//! in software when the logical grid is rendered into display RAM. Rotating
//! a 17x7 surface by 90 or 270 degrees cannot map it onto itself, so those
//! rotations pin out-of-range coordinates to the nearest edge (see
//! [`crop_offset`]). The edge pixels repeat rather than failing.

use crate::{Error, Result, COLS, ROWS};
use std::str::FromStr;

/// Clockwise rotation of the logical surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Returns the rotation in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = Error;

    fn try_from(degrees: u16) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(Error::invalid_argument(format!(
                "rotation must be one of 0, 90, 180, 270 (got {})",
                degrees
            ))),
        }
    }
}

impl FromStr for Rotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let degrees: u16 = s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_argument(format!("invalid rotation: {}", s)))?;
        Rotation::try_from(degrees)
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Rotation and mirroring applied when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub rotation: Rotation,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Orientation {
    pub fn new(rotation: Rotation, flip_x: bool, flip_y: bool) -> Self {
        Self {
            rotation,
            flip_x,
            flip_y,
        }
    }

    /// Maps a logical coordinate to its canonical display index, the index
    /// into the channel LUT.
    pub fn resolve_position(&self, x: i32, y: i32) -> Result<usize> {
        check_bounds(x, y)?;

        let cols = COLS as i32;
        let rows = ROWS as i32;

        let mut flip_x = self.flip_x;
        let mut flip_y = self.flip_y;

        let (mut xx, mut yy) = match self.rotation {
            Rotation::Deg0 => (x, y),
            // 180 degrees is both mirrors at once
            Rotation::Deg180 => {
                flip_x = !flip_x;
                flip_y = !flip_y;
                (x, y)
            }
            Rotation::Deg90 => crop_offset(y, rows - x),
            Rotation::Deg270 => crop_offset(cols - y, x),
        };

        if flip_x {
            xx = cols - 1 - xx;
        }
        if flip_y {
            yy = rows - 1 - yy;
        }

        Ok(xx as usize * ROWS + yy as usize)
    }
}

/// Pins a coordinate into the surface: values past an edge become that edge.
pub fn crop_offset(x: i32, y: i32) -> (i32, i32) {
    (x.clamp(0, COLS as i32 - 1), y.clamp(0, ROWS as i32 - 1))
}

/// Index of a pixel in the unrotated logical grid (column-major, 7 per column).
pub fn storage_offset(x: i32, y: i32) -> Result<usize> {
    check_bounds(x, y)?;
    Ok(x as usize * ROWS + y as usize)
}

fn check_bounds(x: i32, y: i32) -> Result<()> {
    if x < 0 || y < 0 || x >= COLS as i32 || y >= ROWS as i32 {
        return Err(Error::InvalidPixel { x, y });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_coords() -> impl Iterator<Item = (i32, i32)> {
        (0..COLS as i32).flat_map(|x| (0..ROWS as i32).map(move |y| (x, y)))
    }

    #[test]
    fn test_rotation_try_from() {
        assert_eq!(Rotation::try_from(0).unwrap(), Rotation::Deg0);
        assert_eq!(Rotation::try_from(90).unwrap(), Rotation::Deg90);
        assert_eq!(Rotation::try_from(270).unwrap().degrees(), 270);
        assert!(matches!(
            Rotation::try_from(45),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rotation_from_str() {
        assert_eq!("180".parse::<Rotation>().unwrap(), Rotation::Deg180);
        assert!("upside-down".parse::<Rotation>().is_err());
        assert!("45".parse::<Rotation>().is_err());
    }

    #[test]
    fn test_storage_offset_is_injective() {
        let offsets: HashSet<usize> = all_coords()
            .map(|(x, y)| storage_offset(x, y).unwrap())
            .collect();
        assert_eq!(offsets.len(), crate::NUM_PIXELS);
        assert!(offsets.iter().all(|&o| o < crate::NUM_PIXELS));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            storage_offset(17, 0),
            Err(Error::InvalidPixel { x: 17, y: 0 })
        ));
        assert!(matches!(
            storage_offset(-1, 3),
            Err(Error::InvalidPixel { x: -1, y: 3 })
        ));
        let orientation = Orientation::new(Rotation::Deg90, false, false);
        assert!(orientation.resolve_position(0, 7).is_err());
    }

    #[test]
    fn test_identity() {
        let orientation = Orientation::default();
        for (x, y) in all_coords() {
            assert_eq!(
                orientation.resolve_position(x, y).unwrap(),
                storage_offset(x, y).unwrap()
            );
        }
    }

    #[test]
    fn test_rotate_180_matches_inverted_flips() {
        for (fx, fy) in [(false, false), (true, false), (false, true), (true, true)] {
            let rotated = Orientation::new(Rotation::Deg180, fx, fy);
            let flipped = Orientation::new(Rotation::Deg0, !fx, !fy);
            for (x, y) in all_coords() {
                assert_eq!(
                    rotated.resolve_position(x, y).unwrap(),
                    flipped.resolve_position(x, y).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_flips() {
        let flip_x = Orientation::new(Rotation::Deg0, true, false);
        assert_eq!(flip_x.resolve_position(0, 0).unwrap(), 16 * ROWS);
        let flip_y = Orientation::new(Rotation::Deg0, false, true);
        assert_eq!(flip_y.resolve_position(0, 0).unwrap(), 6);
    }

    #[test]
    fn test_quarter_turns_clamp() {
        for rotation in [Rotation::Deg90, Rotation::Deg270] {
            for (fx, fy) in [(false, false), (true, true)] {
                let orientation = Orientation::new(rotation, fx, fy);
                for (x, y) in all_coords() {
                    let index = orientation.resolve_position(x, y).unwrap();
                    assert!(index < crate::NUM_PIXELS);
                }
            }
        }
    }

    #[test]
    fn test_rotate_90_mapping() {
        let orientation = Orientation::new(Rotation::Deg90, false, false);
        // (0, 0) -> (0, 7) -> cropped to (0, 6)
        assert_eq!(orientation.resolve_position(0, 0).unwrap(), 6);
        // (3, 2) -> (2, 4)
        assert_eq!(orientation.resolve_position(3, 2).unwrap(), 2 * ROWS + 4);
        // (16, 6) -> (6, -9) -> cropped to (6, 0)
        assert_eq!(orientation.resolve_position(16, 6).unwrap(), 6 * ROWS);
    }

    #[test]
    fn test_rotate_270_mapping() {
        let orientation = Orientation::new(Rotation::Deg270, false, false);
        // (0, 0) -> (17, 0) -> cropped to (16, 0)
        assert_eq!(orientation.resolve_position(0, 0).unwrap(), 16 * ROWS);
        // (4, 3) -> (14, 4)
        assert_eq!(orientation.resolve_position(4, 3).unwrap(), 14 * ROWS + 4);
        // (12, 1) -> (16, 12) -> cropped to (16, 6)
        assert_eq!(orientation.resolve_position(12, 1).unwrap(), 16 * ROWS + 6);
    }

    #[test]
    fn test_crop_offset() {
        assert_eq!(crop_offset(17, 7), (16, 6));
        assert_eq!(crop_offset(-3, -1), (0, 0));
        assert_eq!(crop_offset(5, 3), (5, 3));
    }
}
