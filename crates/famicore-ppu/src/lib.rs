//! Ricoh 2C02 PPU core for the famicore NES emulator.
//!
//! Dot-clocked rendering: background shift registers fed by the 8-dot
//! tile fetch cadence, a per-scanline sprite cache with sprite 0 hit
//! and overflow detection, the v/t/x/w scroll register file, and the
//! CPU-visible register set with its open-bus quirks. Pattern table
//! accesses go through caller-supplied closures so cartridge CHR
//! banking stays outside this crate.
//!
//! Output is a 256x240 ARGB8888 framebuffer; one frame completes when
//! the scanline counter wraps from 260 back to the pre-render line.

mod background;
pub mod palette;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod timing;

pub use background::Background;
pub use ppu::{Mirroring, Ppu, FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH};
pub use registers::{PpuCtrl, PpuMask, PpuStatus, SpriteAttributes};
pub use scroll::Scroll;
pub use sprites::{ScanlineSprites, SpritePixel};
pub use timing::Timing;
