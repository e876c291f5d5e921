//! Cartridge, iNES parsing and mappers for the famicore NES emulator.
//!
//! # Supported mappers
//!
//! | Mapper | Name | Banking |
//! |--------|-------|---------|
//! | 0 | NROM  | none (16 KiB PRG mirrored, or flat 32 KiB) |
//! | 1 | MMC1  | serial shift register; 16/32 KiB PRG, 4/8 KiB CHR, mirroring control |
//! | 2 | UxROM | switchable 16 KiB low bank, fixed last bank |
//!
//! The [`Cartridge`] owns every buffer (PRG ROM, CHR ROM/RAM, PRG RAM);
//! the [`Mapper`] variant holds only banking registers. Dispatch is a
//! `match`, not virtual calls, so the mapper never needs a back-pointer
//! into the cartridge.
//!
//! # Example
//!
//! ```no_run
//! use famicore_mappers::{Cartridge, Rom};
//!
//! let data = std::fs::read("game.nes").expect("read ROM");
//! let rom = Rom::load(&data).expect("parse ROM");
//! let cart = Cartridge::from_rom(rom).expect("supported mapper");
//! let reset_lo = cart.cpu_read(0xFFFC);
//! ```

mod cartridge;
mod mapper;
mod mmc1;
mod rom;
mod uxrom;

pub use cartridge::Cartridge;
pub use mapper::{Mapper, Mirroring};
pub use mmc1::Mmc1;
pub use rom::{Rom, RomError, RomHeader};
pub use uxrom::Uxrom;

/// Mapper numbers this crate implements.
#[must_use]
pub fn supported_mappers() -> &'static [u16] {
    &[0, 1, 2]
}
