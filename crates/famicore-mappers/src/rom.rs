//! iNES 1.0 and minimal NES 2.0 ROM image parsing.
//!
//! ```text
//! Byte 0-3:  "NES\x1A"
//! Byte 4:    PRG-ROM units of 16 KiB (LSB in NES 2.0)
//! Byte 5:    CHR-ROM units of 8 KiB (LSB in NES 2.0)
//! Byte 6:    flags6  - mirroring, battery, trainer, four-screen, mapper low
//! Byte 7:    flags7  - mapper mid; bits 2-3 == 0b10 marks NES 2.0
//! Byte 8:    flags8  - iNES: PRG-RAM units; NES 2.0: mapper high nibble
//! Byte 9:    flags9  - NES 2.0: PRG/CHR size MSB nibbles
//! Byte 10:   flags10 - NES 2.0: PRG-RAM / PRG-NVRAM shift counts
//! ```
//!
//! A 512-byte trainer, when flagged, sits between the header and PRG
//! ROM and is skipped. The NES 2.0 exponent-multiplier size encoding
//! (MSB nibble 0xF) is rejected.

use crate::mapper::Mirroring;

/// Errors surfaced while parsing a ROM image. These are the only
/// recoverable errors in the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RomError {
    /// The file does not start with "NES\x1A".
    #[error("not an iNES image (bad magic {0:02X?})")]
    BadMagic([u8; 4]),

    /// Header, trainer, PRG or CHR data extends past end of file.
    #[error("ROM image truncated: need {expected} bytes, have {actual}")]
    Truncated {
        /// Bytes the header promised.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// NES 2.0 construct this core does not accept.
    #[error("unsupported NES 2.0 header: {0}")]
    UnsupportedHeader(&'static str),

    /// Mapper number with no implementation here.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),

    /// Allocation for PRG/CHR/PRG-RAM buffers failed.
    #[error("out of memory while loading ROM")]
    OutOfMemory,
}

/// Parsed 16-byte header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    /// PRG-ROM size in bytes (16 KiB granular, never zero).
    pub prg_rom_size: usize,
    /// CHR-ROM size in bytes (8 KiB granular; zero means CHR-RAM).
    pub chr_rom_size: usize,
    /// PRG-RAM size in bytes (8 KiB floor).
    pub prg_ram_size: usize,
    /// Mapper number (8-bit for iNES 1.0, up to 12-bit for NES 2.0).
    pub mapper: u16,
    /// Hardware nametable mirroring.
    pub mirroring: Mirroring,
    /// Battery-backed PRG RAM present.
    pub has_battery: bool,
    /// 512-byte trainer precedes PRG ROM.
    pub has_trainer: bool,
    /// Header carries the NES 2.0 signature.
    pub is_nes2: bool,
}

impl RomHeader {
    const MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

    /// Parse the 16-byte header.
    pub fn parse(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < 16 {
            return Err(RomError::Truncated {
                expected: 16,
                actual: data.len(),
            });
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != Self::MAGIC {
            return Err(RomError::BadMagic(magic));
        }

        let flags6 = data[6];
        let flags7 = data[7];
        let flags8 = data[8];
        let flags9 = data[9];
        let flags10 = data[10];

        let is_nes2 = flags7 & 0x0C == 0x08;

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mapper_low = u16::from((flags6 >> 4) | (flags7 & 0xF0));

        let (mapper, prg_rom_size, chr_rom_size, prg_ram_size) = if is_nes2 {
            let prg_msb = usize::from(flags9 & 0x0F);
            let chr_msb = usize::from((flags9 >> 4) & 0x0F);
            if prg_msb == 0x0F || chr_msb == 0x0F {
                return Err(RomError::UnsupportedHeader(
                    "exponent-multiplier ROM size encoding",
                ));
            }

            let prg_units = usize::from(data[4]) | (prg_msb << 8);
            let chr_units = usize::from(data[5]) | (chr_msb << 8);

            let mapper = mapper_low | (u16::from(flags8 & 0xF0) << 4);

            // flags10 nibbles: size = 64 << n, n == 0 means absent.
            // Floor at 8 KiB; plenty of early carts assume work RAM.
            let ram_shift = flags10 & 0x0F;
            let nvram_shift = (flags10 >> 4) & 0x0F;
            let ram = if ram_shift == 0 { 0 } else { 64usize << ram_shift };
            let nvram = if nvram_shift == 0 {
                0
            } else {
                64usize << nvram_shift
            };
            let prg_ram = (ram + nvram).max(8 * 1024);

            (mapper, prg_units * 16 * 1024, chr_units * 8 * 1024, prg_ram)
        } else {
            let prg_ram_units = usize::from(flags8);
            let prg_ram = if prg_ram_units == 0 {
                8 * 1024
            } else {
                prg_ram_units * 8 * 1024
            };
            (
                mapper_low,
                usize::from(data[4]) * 16 * 1024,
                usize::from(data[5]) * 8 * 1024,
                prg_ram,
            )
        };

        if prg_rom_size == 0 {
            return Err(RomError::UnsupportedHeader("zero PRG-ROM size"));
        }

        Ok(Self {
            prg_rom_size,
            chr_rom_size,
            prg_ram_size,
            mapper,
            mirroring,
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
            is_nes2,
        })
    }
}

/// A parsed ROM image: header plus owned PRG/CHR buffers. The trainer,
/// when present, is skipped during the copy.
#[derive(Debug, Clone)]
pub struct Rom {
    /// Header information.
    pub header: RomHeader,
    /// PRG-ROM contents.
    pub prg_rom: Vec<u8>,
    /// CHR-ROM contents; empty when the cartridge uses CHR-RAM.
    pub chr_rom: Vec<u8>,
}

impl Rom {
    /// Parse a complete ROM file.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        let header = RomHeader::parse(data)?;

        let mut offset = 16;
        if header.has_trainer {
            offset += 512;
        }

        let prg_end = offset + header.prg_rom_size;
        let chr_end = prg_end + header.chr_rom_size;
        if data.len() < chr_end {
            return Err(RomError::Truncated {
                expected: chr_end,
                actual: data.len(),
            });
        }

        let prg_rom = copy_region(&data[offset..prg_end])?;
        let chr_rom = copy_region(&data[prg_end..chr_end])?;

        log::debug!(
            "parsed ROM: mapper {}, PRG {} KiB, CHR {} KiB, {:?} mirroring{}",
            header.mapper,
            header.prg_rom_size / 1024,
            header.chr_rom_size / 1024,
            header.mirroring,
            if header.has_battery { ", battery" } else { "" },
        );

        Ok(Self {
            header,
            prg_rom,
            chr_rom,
        })
    }
}

/// Copy a slice into a fresh buffer, surfacing allocation failure as a
/// load error instead of aborting.
pub(crate) fn copy_region(src: &[u8]) -> Result<Vec<u8>, RomError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len())
        .map_err(|_| RomError::OutOfMemory)?;
    buf.extend_from_slice(src);
    Ok(buf)
}

/// Allocate a zero-filled buffer (CHR-RAM, PRG-RAM), surfacing
/// allocation failure as a load error.
pub(crate) fn zeroed_region(len: usize) -> Result<Vec<u8>, RomError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| RomError::OutOfMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}
