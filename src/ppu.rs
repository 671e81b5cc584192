use crate::interrupts::InterruptLine;
use crate::registers::{Lcdc, Mode, Palette, StatCheck};
use crate::tiles::TileCache;

#[cfg(feature = "ppu-trace")]
macro_rules! ppu_trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*);
    };
}
#[cfg(not(feature = "ppu-trace"))]
macro_rules! ppu_trace {
    ($($arg:tt)*) => {};
}

// Screen resolution of the DMG LCD
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

// Logical size of the background map export
pub const BG_MAP_WIDTH: usize = 256;
pub const BG_MAP_HEIGHT: usize = 256;

// Tileset export: 384 tiles laid out 16 across
pub const TILESET_WIDTH: usize = 128;
pub const TILESET_HEIGHT: usize = 192;

// Internal memory sizes
const VRAM_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;

// VRAM layout
const TILE_DATA_END: u16 = 0x1800;
const MAP_0_BASE: usize = 0x1800;
const MAP_1_BASE: usize = 0x1C00;
const MAP_WIDTH_TILES: usize = 32;
const TILESET_WIDTH_TILES: usize = 16;

// Mode durations in ticks. One scanline is OAM search + data transfer +
// hblank = 114 ticks; the SCX offsets below shift ticks between data
// transfer and hblank without changing that total.
const OAM_SEARCH_TICKS: u16 = 21;
const DATA_TRANSFER_TICKS: u16 = 43;
const HBLANK_TICKS: u16 = 50;
const VBLANK_LINE_TICKS: u16 = 114;

/// Counter value loaded when software disables the LCD; timing resumes from
/// here once it is re-enabled.
const REENABLE_DELAY_TICKS: u16 = 115;

/// Fine-scroll fetch delay by SCX mod 8.
const SCX_TICK_OFFSETS: [u16; 8] = [0, 1, 1, 1, 1, 2, 2, 2];

// Sprite limits
const MAX_LINE_SPRITES: usize = 10;
const TOTAL_SPRITES: usize = 40;

// OAM attribute bits
const SPRITE_BG_PRIORITY: u8 = 0x80;
const SPRITE_FLIP_Y: u8 = 0x40;
const SPRITE_FLIP_X: u8 = 0x20;
const SPRITE_PALETTE: u8 = 0x10;

const LAST_LINE: u8 = 153;

/// The window is visible only while WX - 7 stays at or below this column.
const WINDOW_X_MAX: i32 = 166;

/// Sentinel color code the display export emits while the LCD is disabled.
pub const LCD_OFF_CODE: u8 = 4;

const SHADES: [u32; 5] = [0xF5F5_F5F5, 0xAAAA_AAAA, 0x5555_5555, 0x0101_0101, 0x0000_0000];
const INVALID_SHADE: u32 = 0x00FF_00FF;

/// Resolve a color code to a 32-bit shade. Codes 0-3 are the DMG grays,
/// [`LCD_OFF_CODE`] is the blank-panel shade, and anything else degrades to
/// a fixed fallback color.
#[inline]
pub fn shade_argb(code: u8) -> u32 {
    SHADES
        .get(code as usize)
        .copied()
        .unwrap_or(INVALID_SHADE)
}

/// A sprite latched from OAM for the current scanline, with its position
/// already translated to screen coordinates.
#[derive(Copy, Clone, Default)]
struct Sprite {
    x: i16,
    y: i16,
    tile: u8,
    flags: u8,
    oam_index: usize,
}

/// The DMG pixel-processing unit.
///
/// Owns VRAM, OAM, the register bank, and the display buffer. The external
/// driver calls [`Ppu::tick`] once per elapsed hardware cycle and routes
/// bus accesses through the register/VRAM/OAM entry points; `offset`
/// arguments are local to the PPU's own address spaces (the bus dispatcher
/// translates from 0x8000/0xFE00-relative machine addresses).
pub struct Ppu {
    pub vram: [u8; VRAM_SIZE],
    pub oam: [u8; OAM_SIZE],
    tile_cache: TileCache,

    lcdc: Lcdc,
    stat_check: StatCheck,
    compare_flag: bool,
    mode: Mode,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: Palette,
    obp0: Palette,
    obp1: Palette,
    wy: u8,
    wx: u8,

    /// Internal window line counter
    window_line: u8,
    /// Ticks remaining in the current mode
    count: u16,

    /// Palette-mapped 2-bit codes for the most recently rendered lines
    display_buffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Latched sprites for the current scanline
    line_sprites: [Sprite; MAX_LINE_SPRITES],
    sprite_count: usize,
    frame_counter: u64,
}

impl Ppu {
    /// Create a PPU in the documented post-bootrom power-on state.
    pub fn new() -> Self {
        Self {
            vram: [0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
            tile_cache: TileCache::new(),
            lcdc: Lcdc::from_bits_truncate(0x91),
            stat_check: StatCheck::empty(),
            compare_flag: false,
            mode: Mode::OamSearch,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: Palette(0xFC),
            obp0: Palette(0xFF),
            obp1: Palette(0xFF),
            wy: 0,
            wx: 0,
            window_line: 0,
            count: 80,
            display_buffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            line_sprites: [Sprite::default(); MAX_LINE_SPRITES],
            sprite_count: 0,
            frame_counter: 0,
        }
    }

    /// Advance the PPU by one tick.
    ///
    /// Interrupt requests raised by this tick are ORed into `irq`; the PPU
    /// never clears bits there. Does nothing while the LCD is disabled.
    pub fn tick(&mut self, irq: &mut InterruptLine) {
        if !self.lcdc.contains(Lcdc::LCD_ENABLE) {
            return;
        }

        self.count -= 1;

        // The hblank STAT signal fires one tick before data transfer ends.
        if self.count == 1
            && self.mode == Mode::DataTransfer
            && self.stat_check.contains(StatCheck::HBLANK)
        {
            irq.request_lcd_stat();
        }

        if self.count != 0 {
            return;
        }

        match self.mode {
            Mode::HBlank => {
                self.ly += 1;
                if self.ly < SCREEN_HEIGHT as u8 {
                    self.enter_oam_search(irq);
                } else {
                    self.enter_vblank(irq);
                }
                self.compare_line(irq);
            }
            Mode::VBlank => {
                self.ly += 1;
                if self.ly > LAST_LINE {
                    self.ly = 0;
                    self.frame_counter = self.frame_counter.wrapping_add(1);
                    ppu_trace!("frame {} complete", self.frame_counter);
                    self.enter_oam_search(irq);
                } else {
                    self.count += VBLANK_LINE_TICKS;
                }
                self.compare_line(irq);
            }
            Mode::OamSearch => {
                self.latch_line_sprites();
                self.enter_data_transfer();
            }
            Mode::DataTransfer => {
                self.render_scanline();
                self.enter_hblank();
            }
        }
    }

    fn enter_hblank(&mut self) {
        self.mode = Mode::HBlank;
        self.count += HBLANK_TICKS - SCX_TICK_OFFSETS[self.scx as usize % 8];
        ppu_trace!("enter hblank ly={}", self.ly);
    }

    fn enter_vblank(&mut self, irq: &mut InterruptLine) {
        self.mode = Mode::VBlank;
        self.count += VBLANK_LINE_TICKS;
        self.window_line = 0;

        irq.request_vblank();
        // Hardware quirk: the OAM-search check bit also raises the STAT
        // line at vblank entry.
        if self
            .stat_check
            .intersects(StatCheck::VBLANK | StatCheck::OAM_SEARCH)
        {
            irq.request_lcd_stat();
        }
        ppu_trace!("enter vblank");
    }

    fn enter_oam_search(&mut self, irq: &mut InterruptLine) {
        self.mode = Mode::OamSearch;
        self.count += OAM_SEARCH_TICKS;
        if self.stat_check.contains(StatCheck::OAM_SEARCH) {
            irq.request_lcd_stat();
        }
        ppu_trace!("enter oam search ly={}", self.ly);
    }

    fn enter_data_transfer(&mut self) {
        self.mode = Mode::DataTransfer;
        self.count += DATA_TRANSFER_TICKS + SCX_TICK_OFFSETS[self.scx as usize % 8];
    }

    /// Update the LY=LYC comparison flag after an LY change.
    fn compare_line(&mut self, irq: &mut InterruptLine) {
        self.compare_flag = self.ly == self.lyc;
        if self.compare_flag && self.stat_check.contains(StatCheck::COMPARE) {
            irq.request_lcd_stat();
        }
    }

    /// Current LCD mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current value of the internal window line counter.
    pub fn window_line(&self) -> u8 {
        self.window_line
    }

    /// Number of frames completed since power-on.
    pub fn frames(&self) -> u64 {
        self.frame_counter
    }

    /// Palette-mapped 2-bit codes of the most recently rendered lines,
    /// row-major.
    pub fn display_buffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.display_buffer
    }

    pub fn read_reg(&self, addr: u16) -> u8 {
        match addr {
            0xFF40 => self.lcdc.bits(),
            0xFF41 => {
                0x80 | self.stat_check.bits()
                    | (u8::from(self.compare_flag) << 2)
                    | self.mode.bits()
            }
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp.0,
            0xFF48 => self.obp0.0,
            0xFF49 => self.obp1.0,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            _ => 0xFF,
        }
    }

    pub fn write_reg(&mut self, addr: u16, val: u8) {
        match addr {
            0xFF40 => {
                let new = Lcdc::from_bits_truncate(val);
                if !new.contains(Lcdc::LCD_ENABLE) {
                    if self.lcdc.contains(Lcdc::LCD_ENABLE) {
                        log::trace!("lcd disabled");
                    }
                    self.ly = 0;
                    self.count = REENABLE_DELAY_TICKS;
                    self.mode = Mode::HBlank;
                } else if !self.lcdc.contains(Lcdc::LCD_ENABLE) {
                    log::trace!("lcd enabled");
                }
                self.lcdc = new;
            }
            // Only the four check-enable bits are writable; mode bits and
            // the comparison flag are hardware-controlled.
            0xFF41 => self.stat_check = StatCheck::from_bits_truncate(val),
            0xFF42 => self.scy = val,
            0xFF43 => self.scx = val,
            0xFF44 => {} // LY is read-only
            0xFF45 => self.lyc = val,
            0xFF47 => self.bgp = Palette(val),
            0xFF48 => self.obp0 = Palette(val),
            0xFF49 => self.obp1 = Palette(val),
            0xFF4A => self.wy = val,
            0xFF4B => self.wx = val,
            _ => {}
        }
    }

    pub fn read_vram(&self, offset: u16) -> u8 {
        self.vram[offset as usize]
    }

    /// Write a VRAM byte, keeping the tile cache consistent when the byte
    /// lands in the tile-data region.
    pub fn write_vram(&mut self, offset: u16, value: u8) {
        self.vram[offset as usize] = value;
        if offset < TILE_DATA_END {
            self.tile_cache.vram_written(&self.vram, offset);
        }
    }

    pub fn read_oam(&self, offset: u16) -> u8 {
        self.oam[offset as usize]
    }

    /// Write an OAM byte. The renderer owns OAM during OAM search and data
    /// transfer, so writes in those modes are dropped.
    pub fn write_oam(&mut self, offset: u16, value: u8) {
        if matches!(self.mode, Mode::OamSearch | Mode::DataTransfer) {
            return;
        }
        self.oam[offset as usize] = value;
    }

    /// Map raw background/window tile index through the current addressing
    /// mode. In signed mode, indices below 128 select the upper tile block.
    fn resolve_tile_index(&self, raw: u8) -> usize {
        if self.lcdc.contains(Lcdc::TILE_DATA_MODE) || raw >= 128 {
            raw as usize
        } else {
            raw as usize + 256
        }
    }

    /// Color code at a wrapped background-map position.
    fn map_pixel(&self, map_base: usize, col: u8, row: u8) -> u8 {
        let map_index = map_base + col as usize / 8 + row as usize / 8 * MAP_WIDTH_TILES;
        let tile = self.resolve_tile_index(self.vram[map_index]);
        self.tile_cache.pixel(tile, row as usize % 8, col as usize % 8)
    }

    /// Render one row of the display buffer: background, then window, then
    /// sprites.
    fn render_scanline(&mut self) {
        let ly = self.ly as usize;

        if self.lcdc.contains(Lcdc::BG_ENABLE) {
            self.render_background(ly);
        }

        if self.lcdc.contains(Lcdc::WINDOW_ENABLE)
            && self.wy <= self.ly
            && i32::from(self.wx) - 7 <= WINDOW_X_MAX
        {
            self.render_window(ly);
            // The counter advances on every window-eligible line, even when
            // the wrapped left edge leaves no visible columns.
            self.window_line = self.window_line.wrapping_add(1);
        }

        if self.lcdc.contains(Lcdc::SPRITE_ENABLE) {
            self.render_sprites(ly);
        }
    }

    fn render_background(&mut self, ly: usize) {
        let map_base = if self.lcdc.contains(Lcdc::BG_MAP) {
            MAP_1_BASE
        } else {
            MAP_0_BASE
        };
        let row = self.scy.wrapping_add(self.ly);
        for x in 0..SCREEN_WIDTH {
            let col = self.scx.wrapping_add(x as u8);
            let code = self.map_pixel(map_base, col, row);
            self.display_buffer[ly * SCREEN_WIDTH + x] = self.bgp.shade(code);
        }
    }

    fn render_window(&mut self, ly: usize) {
        let map_base = if self.lcdc.contains(Lcdc::WINDOW_MAP) {
            MAP_1_BASE
        } else {
            MAP_0_BASE
        };
        let left = self.wx.wrapping_sub(7);
        let row = self.window_line;
        for x in left as usize..SCREEN_WIDTH {
            let col = x as u8 - left;
            let code = self.map_pixel(map_base, col, row);
            self.display_buffer[ly * SCREEN_WIDTH + x] = self.bgp.shade(code);
        }
    }

    /// Collect up to 10 sprites covering the current scanline, in OAM
    /// order, then stable-sort them ascending by X for draw priority.
    fn latch_line_sprites(&mut self) {
        let height: i16 = if self.lcdc.contains(Lcdc::SPRITE_SIZE) {
            16
        } else {
            8
        };
        self.sprite_count = 0;
        for i in 0..TOTAL_SPRITES {
            if self.sprite_count == MAX_LINE_SPRITES {
                break;
            }
            let base = i * 4;
            let y = self.oam[base] as i16 - 16;
            let ly = i16::from(self.ly);
            if ly >= y && ly < y + height {
                self.line_sprites[self.sprite_count] = Sprite {
                    x: self.oam[base + 1] as i16 - 8,
                    y,
                    tile: self.oam[base + 2],
                    flags: self.oam[base + 3],
                    oam_index: i,
                };
                self.sprite_count += 1;
            }
        }
        // Equal X keeps OAM order
        self.line_sprites[..self.sprite_count].sort_by_key(|s| (s.x, s.oam_index));
    }

    /// Composite the latched sprites back-to-front (highest X first) so the
    /// lowest-X sprite wins overlaps.
    fn render_sprites(&mut self, ly: usize) {
        let height: i16 = if self.lcdc.contains(Lcdc::SPRITE_SIZE) {
            16
        } else {
            8
        };
        let sprites = self.line_sprites;
        for s in sprites[..self.sprite_count].iter().rev() {
            let mut tile = s.tile as usize;
            if height == 16 {
                tile &= !1;
            }
            let mut line = i16::from(self.ly) - s.y;
            if s.flags & SPRITE_FLIP_Y != 0 {
                line = height - 1 - line;
            }
            // 8x16 sprites use the odd tile for their lower half
            if line >= 8 {
                tile += 1;
                line -= 8;
            }
            let row = line as usize & 0x7;

            for col in 0..8i16 {
                let sx = s.x + col;
                if !(0..SCREEN_WIDTH as i16).contains(&sx) {
                    continue;
                }
                let fetch_col = if s.flags & SPRITE_FLIP_X != 0 {
                    7 - col
                } else {
                    col
                } as usize;
                let code = self.tile_cache.pixel(tile, row, fetch_col);
                // Color 0 is transparent
                if code == 0 {
                    continue;
                }
                let idx = ly * SCREEN_WIDTH + sx as usize;
                if s.flags & SPRITE_BG_PRIORITY != 0 && self.display_buffer[idx] != 0 {
                    continue;
                }
                let palette = if s.flags & SPRITE_PALETTE != 0 {
                    self.obp1
                } else {
                    self.obp0
                };
                self.display_buffer[idx] = palette.shade(code);
            }
        }
    }

    /// Export the visible 160x144 framebuffer as 32-bit shades, row-major.
    ///
    /// Emits the LCD-off shade for every pixel while the LCD is disabled.
    /// Stops early if `out` fills up; returns the number of pixels written.
    pub fn display_pixels(&self, out: &mut [u32]) -> usize {
        let lcd_on = self.lcdc.contains(Lcdc::LCD_ENABLE);
        let count = (SCREEN_WIDTH * SCREEN_HEIGHT).min(out.len());
        for (i, px) in out[..count].iter_mut().enumerate() {
            *px = if lcd_on {
                shade_argb(self.display_buffer[i])
            } else {
                shade_argb(LCD_OFF_CODE)
            };
        }
        count
    }

    /// Export the full 256x256 background map (first map bank, current tile
    /// addressing mode) as 32-bit shades, row-major. Stops early if `out`
    /// fills up; returns the number of pixels written.
    pub fn background_pixels(&self, out: &mut [u32]) -> usize {
        let count = (BG_MAP_WIDTH * BG_MAP_HEIGHT).min(out.len());
        for (i, px) in out[..count].iter_mut().enumerate() {
            let x = i % BG_MAP_WIDTH;
            let y = i / BG_MAP_WIDTH;
            let map_index = MAP_0_BASE + x / 8 + y / 8 * MAP_WIDTH_TILES;
            let tile = self.resolve_tile_index(self.vram[map_index]);
            *px = shade_argb(self.tile_cache.pixel(tile, y % 8, x % 8));
        }
        count
    }

    /// Export the raw 384-tile tileset as a 128x192 sheet of 32-bit shades,
    /// row-major. Stops early if `out` fills up; returns the number of
    /// pixels written.
    pub fn tileset_pixels(&self, out: &mut [u32]) -> usize {
        let count = (TILESET_WIDTH * TILESET_HEIGHT).min(out.len());
        for (i, px) in out[..count].iter_mut().enumerate() {
            let x = i % TILESET_WIDTH;
            let y = i / TILESET_WIDTH;
            let tile = y / 8 * TILESET_WIDTH_TILES + x / 8;
            *px = shade_argb(self.tile_cache.pixel(tile, y % 8, x % 8));
        }
        count
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
