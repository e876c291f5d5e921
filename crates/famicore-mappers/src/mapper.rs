//! Mapper variants.
//!
//! Mappers are a tagged variant rather than trait objects: each variant
//! holds only its banking registers and computes offsets into buffers
//! owned by the [`crate::Cartridge`]. Dispatch is a `match` in the
//! cartridge's read/write entry points.

use crate::mmc1::Mmc1;
use crate::uxrom::Uxrom;

/// Nametable mirroring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mirroring {
    /// Horizontal mirroring: NT0=NT1, NT2=NT3.
    #[default]
    Horizontal,
    /// Vertical mirroring: NT0=NT2, NT1=NT3.
    Vertical,
    /// Single screen, first 1 KiB bank.
    SingleScreenLower,
    /// Single screen, second 1 KiB bank.
    SingleScreenUpper,
    /// Four independent nametables. This core falls back to vertical.
    FourScreen,
}

/// Cartridge banking logic, one variant per supported iNES mapper.
#[derive(Debug, Clone)]
pub enum Mapper {
    /// Mapper 0: no banking; 16 KiB PRG mirrors across the window.
    Nrom,
    /// Mapper 2: switchable 16 KiB low bank, fixed last bank.
    Uxrom(Uxrom),
    /// Mapper 1: serial shift register, PRG/CHR banking, mirroring control.
    Mmc1(Mmc1),
}

impl Mapper {
    /// iNES mapper number.
    #[must_use]
    pub fn number(&self) -> u16 {
        match self {
            Self::Nrom => 0,
            Self::Mmc1(_) => 1,
            Self::Uxrom(_) => 2,
        }
    }

    /// Human-readable mapper name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nrom => "NROM",
            Self::Mmc1(_) => "MMC1",
            Self::Uxrom(_) => "UxROM",
        }
    }

    /// Return banking registers to their power-on state.
    pub fn reset(&mut self) {
        match self {
            Self::Nrom => {}
            Self::Uxrom(state) => *state = Uxrom::new(),
            Self::Mmc1(state) => *state = Mmc1::new(),
        }
    }
}
