use macroquad::prelude::*;
use std::f32::consts::FRAC_PI_2;

pub const FLIP_H: u32 = 0x8000_0000; // bit 31
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits (bit 28 is free)

/// A packed 32-bit global tile identifier, split into its parts.
///
/// `rotation` is in radians, `scale` components are always +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedGid {
    pub id: u32,
    pub rotation: f32,
    pub scale: Vec2,
}

impl DecodedGid {
    #[inline]
    pub fn flipped_both(&self) -> bool {
        self.scale.x < 0.0 && self.scale.y < 0.0
    }
}

/// Split a packed GID into the raw tile id plus its flip/rotation descriptor.
///
/// The three most significant bits are the horizontal, vertical and
/// diagonal flip flags of the Tiled format. The mapping of the eight flag
/// combinations to rotation and scale follows the Tiled convention:
///
/// | H | V | D | rotation | scale.x | scale.y |
/// |---|---|---|----------|---------|---------|
/// | 0 | 0 | 0 |     0    |   +1    |   +1    |
/// | 1 | 0 | 0 |     0    |   -1    |   +1    |
/// | 0 | 1 | 0 |     0    |   +1    |   -1    |
/// | 0 | 0 | 1 |   +90°   |   +1    |   -1    |
/// | 1 | 1 | 0 |     0    |   -1    |   -1    |
/// | 1 | 0 | 1 |   +90°   |   +1    |   +1    |
/// | 0 | 1 | 1 |   -90°   |   +1    |   +1    |
/// | 1 | 1 | 1 |   -90°   |   +1    |   -1    |
#[inline]
pub fn decode(gid: u32) -> DecodedGid {
    let h = (gid & FLIP_H) != 0;
    let v = (gid & FLIP_V) != 0;
    let d = (gid & FLIP_D) != 0;

    let (rotation, sx, sy) = match (h, v, d) {
        (false, false, false) => (0.0, 1.0, 1.0),
        (true, false, false) => (0.0, -1.0, 1.0),
        (false, true, false) => (0.0, 1.0, -1.0),
        (false, false, true) => (FRAC_PI_2, 1.0, -1.0),
        (true, true, false) => (0.0, -1.0, -1.0),
        (true, false, true) => (FRAC_PI_2, 1.0, 1.0),
        (false, true, true) => (-FRAC_PI_2, 1.0, 1.0),
        (true, true, true) => (-FRAC_PI_2, 1.0, -1.0),
    };

    DecodedGid {
        id: gid & GID_MASK,
        rotation,
        scale: vec2(sx, sy),
    }
}
