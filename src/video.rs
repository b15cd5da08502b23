//! Pure payload math for the graphics hardware: color packing and sprite
//! attribute words. Nothing here touches the encoder; these values are fed
//! to it by callers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Memory-mapped cells observed on the "batman" board. Hardware convention
/// only; the encoder writes to whatever address it is given.
pub mod regs {
    /// GPIO input port.
    pub const GPIO_IN: u16 = 0x3d01;
    /// UP key bit in [`GPIO_IN`].
    pub const GPIO_IN_UP: u16 = 0x8000;
    /// Palette table base (256 entries).
    pub const PALETTE_BASE: u16 = 0x2b00;
    /// Sprite attribute table base (4 words per sprite).
    pub const SPRITE_TABLE: u16 = 0x2c00;
    /// Sprite tile segment register, in units of 0x40 words.
    pub const SPRITE_SEGMENT: u16 = 0x2822;
    /// Sprite enable register.
    pub const SPRITE_ENABLE: u16 = 0x2842;
    /// The hardware reads the code entry address from this cell.
    pub const RESET_VECTOR: u32 = 0xfff7;
    /// Board identification words checked by the boot mask ROM.
    pub const BOARD_IDENT: [(u32, u16); 2] = [(0x5ce1, 0x42c2), (0x5ce2, 0x5e42)];
}

/// Sprite extent selector, shared by width and height fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteSize {
    S8 = 0,
    S16 = 1,
    S32 = 2,
    S64 = 3,
}

impl SpriteSize {
    pub fn pixels(self) -> u16 {
        8 << (self as u16)
    }
}

/// Bits-per-pixel selector for sprite tile data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteColors {
    Bpp2 = 0,
    Bpp4 = 1,
    Bpp6 = 2,
    Bpp8 = 3,
}

impl SpriteColors {
    pub fn bits_per_pixel(self) -> u16 {
        2 + 2 * (self as u16)
    }
}

bitflags! {
    /// Optional sprite attribute bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct SpriteFlags: u16 {
        const XFLIP = 0x0004;
        const YFLIP = 0x0008;
        const BLEND = 0x4000;
    }
}

/// Pack a sprite attribute word: `(depth << 12) | (w << 6) | (h << 4) | nc`
/// plus any flag bits.
pub fn sprite_attr(
    depth: u16,
    w: SpriteSize,
    h: SpriteSize,
    nc: SpriteColors,
    flags: SpriteFlags,
) -> u16 {
    ((depth & 0x3) << 12) | ((w as u16) << 6) | ((h as u16) << 4) | nc as u16 | flags.bits()
}

/// Words of tile data one sprite occupies.
pub fn sprite_words(w: SpriteSize, h: SpriteSize, nc: SpriteColors) -> u16 {
    w.pixels() * h.pixels() * nc.bits_per_pixel() / 16
}

/// Map RGBA8888 to the hardware color format: channels squeezed from
/// [0x00,0xFF] to [0x00,0x1F] and packed 5:5:5, with the inverted alpha
/// high bit folded into bit 15.
pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u16 {
    (u16::from(r >> 3) << 10)
        | (u16::from(g >> 3) << 5)
        | u16::from(b >> 3)
        | (u16::from(!a) & 0x80) << 8
}
