#![allow(dead_code)]

use dmg_ppu::{InterruptLine, Mode, Ppu};

/// Write one tile's 16 VRAM bytes from 8 (lo, hi) row pairs.
pub fn write_tile(ppu: &mut Ppu, tile: u16, rows: [(u8, u8); 8]) {
    for (i, (lo, hi)) in rows.into_iter().enumerate() {
        ppu.write_vram(tile * 16 + i as u16 * 2, lo);
        ppu.write_vram(tile * 16 + i as u16 * 2 + 1, hi);
    }
}

/// Fill a tile with a single solid color code (0-3).
pub fn write_solid_tile(ppu: &mut Ppu, tile: u16, code: u8) {
    let lo = if code & 1 != 0 { 0xFF } else { 0x00 };
    let hi = if code & 2 != 0 { 0xFF } else { 0x00 };
    write_tile(ppu, tile, [(lo, hi); 8]);
}

/// Set one OAM entry. Pokes the array directly to sidestep the mode-based
/// write guard; the raw Y/X values are hardware-encoded (Y+16, X+8).
pub fn write_sprite(ppu: &mut Ppu, index: usize, y: u8, x: u8, tile: u8, flags: u8) {
    ppu.oam[index * 4] = y;
    ppu.oam[index * 4 + 1] = x;
    ppu.oam[index * 4 + 2] = tile;
    ppu.oam[index * 4 + 3] = flags;
}

/// Tick until the PPU reports `target` mode.
pub fn tick_until(ppu: &mut Ppu, irq: &mut InterruptLine, target: Mode) {
    for _ in 0..200_000 {
        ppu.tick(irq);
        if ppu.mode() == target {
            return;
        }
    }
    panic!("mode {target:?} never reached");
}

/// Tick until `line` has just been rendered (hblank entered with LY == line).
pub fn render_line(ppu: &mut Ppu, irq: &mut InterruptLine, line: u8) {
    for _ in 0..200_000 {
        ppu.tick(irq);
        if ppu.mode() == Mode::HBlank && ppu.read_reg(0xFF44) == line {
            return;
        }
    }
    panic!("line {line} never rendered");
}

/// One rendered display row as a slice of palette-mapped codes.
pub fn display_row(ppu: &Ppu, line: usize) -> &[u8] {
    &ppu.display_buffer()[line * dmg_ppu::SCREEN_WIDTH..(line + 1) * dmg_ppu::SCREEN_WIDTH]
}
