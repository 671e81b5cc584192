//! Cycle-driven Game Boy (DMG) PPU core.
//!
//! This crate contains the video subsystem of a DMG emulator: the LCD mode
//! state machine, scanline renderer, sprite compositor, register bank, and
//! the decoded tile cache. The surrounding machine (CPU, DMA, timer, bus
//! dispatcher) lives elsewhere and drives the PPU one tick at a time via
//! [`ppu::Ppu::tick`], sharing an [`interrupts::InterruptLine`] with it.

/// Shared interrupt-request lines raised by the PPU.
pub mod interrupts;

/// Pixel Processing Unit: timing, rendering, memory, exports.
pub mod ppu;

/// Register bank types: LCD control, status, modes, palettes.
pub mod registers;

/// Decoded 2bpp tile cache kept consistent with VRAM.
pub mod tiles;

pub use interrupts::InterruptLine;
pub use ppu::{Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use registers::Mode;
