//! Decoded tile cache.
//!
//! VRAM stores each 8x8 tile as 16 bytes, two per row: the low byte holds
//! bit 0 of every pixel's color code and the high byte holds bit 1, most
//! significant bit first across the row. Decoding that on every pixel fetch
//! is wasteful, so the cache keeps every tile in 1-byte-per-pixel form and
//! re-decodes exactly the affected row whenever tile data is written.

/// Number of tiles covered by the tile-data region (0x0000..0x1800).
pub const TILE_COUNT: usize = 384;
/// Raw bytes per tile in VRAM.
pub const BYTES_PER_TILE: usize = 16;
/// Raw bytes per tile row in VRAM.
pub const BYTES_PER_ROW: usize = 2;
/// Tile edge length in pixels.
pub const TILE_SIZE: usize = 8;

/// One decoded tile: 8 rows of 8 color codes (0-3).
pub type Tile = [[u8; TILE_SIZE]; TILE_SIZE];

/// Decode one tile row from its two governing bytes.
///
/// `lo` contributes bit 0 and `hi` bit 1 of each code; pixel 0 comes from
/// bit 7 of both bytes.
#[inline]
pub fn decode_row(lo: u8, hi: u8) -> [u8; TILE_SIZE] {
    let mut row = [0; TILE_SIZE];
    for (pixel, code) in row.iter_mut().enumerate() {
        let mask = 1 << (7 - pixel);
        let bit0 = u8::from(lo & mask != 0);
        let bit1 = u8::from(hi & mask != 0);
        *code = bit1 << 1 | bit0;
    }
    row
}

/// Decoded form of the VRAM tile-data region.
///
/// Invariant: every cached row equals `decode_row` of its two VRAM bytes.
/// The cache holds no state of its own; [`TileCache::vram_written`] keeps it
/// consistent as writes land.
pub struct TileCache {
    tiles: [Tile; TILE_COUNT],
}

impl TileCache {
    pub fn new() -> Self {
        Self {
            tiles: [[[0; TILE_SIZE]; TILE_SIZE]; TILE_COUNT],
        }
    }

    /// Re-decode the one tile row governed by the VRAM byte at `offset`.
    ///
    /// `offset` must lie within the tile-data region; the caller passes the
    /// surrounding VRAM so the row's other byte can be fetched.
    pub fn vram_written(&mut self, vram: &[u8], offset: u16) {
        let base = (offset & !1) as usize;
        let lo = vram[base];
        let hi = vram[base + 1];

        let tile = offset as usize / BYTES_PER_TILE;
        let row = (offset as usize % BYTES_PER_TILE) / BYTES_PER_ROW;
        self.tiles[tile][row] = decode_row(lo, hi);
    }

    /// Color code of one pixel of a cached tile.
    #[inline]
    pub fn pixel(&self, tile: usize, row: usize, col: usize) -> u8 {
        self.tiles[tile][row][col]
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}
