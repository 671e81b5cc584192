use bitflags::bitflags;

/// The four LCD controller modes, in STAT bit encoding.
///
/// Only these four values are ever assigned to the STAT mode bits; the raw
/// two-bit field exists solely at the register read boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    DataTransfer = 3,
}

impl Mode {
    /// STAT mode-bit encoding of this mode.
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// LCDC (0xFF40) control bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Lcdc: u8 {
        const LCD_ENABLE = 0b1000_0000;
        const WINDOW_MAP = 0b0100_0000;
        const WINDOW_ENABLE = 0b0010_0000;
        /// Tile addressing mode: set = unsigned indices from 0x8000.
        const TILE_DATA_MODE = 0b0001_0000;
        const BG_MAP = 0b0000_1000;
        /// Set = 8x16 sprites.
        const SPRITE_SIZE = 0b0000_0100;
        const SPRITE_ENABLE = 0b0000_0010;
        const BG_ENABLE = 0b0000_0001;
    }
}

bitflags! {
    /// The four writable STAT (0xFF41) interrupt check-enable bits.
    ///
    /// The remaining STAT bits (mode, comparison flag, bit 7) are
    /// hardware-controlled and live outside this set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StatCheck: u8 {
        const COMPARE = 0b0100_0000;
        const OAM_SEARCH = 0b0010_0000;
        const VBLANK = 0b0001_0000;
        const HBLANK = 0b0000_1000;
    }
}

/// A DMG shade palette register (BGP/OBP0/OBP1): four 2-bit shades packed
/// into one byte, shade for color code `n` in bits `2n..2n+2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette(pub u8);

impl Palette {
    /// Map a 2-bit color code through the palette.
    #[inline]
    pub fn shade(self, code: u8) -> u8 {
        (self.0 >> (code * 2)) & 0x03
    }
}
