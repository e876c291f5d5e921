//! Cartridge: ROM/RAM buffers plus mapper dispatch.
//!
//! The cartridge owns PRG ROM, CHR (ROM or RAM) and PRG RAM; the mapper
//! variant only holds banking registers and computes offsets. CPU reads
//! return `None` for addresses the cartridge does not drive so the bus
//! can float them to open bus.

use crate::mapper::{Mapper, Mirroring};
use crate::mmc1::Mmc1;
use crate::rom::{zeroed_region, Rom, RomError};
use crate::uxrom::Uxrom;

/// A loaded cartridge bound to its mapper.
#[derive(Debug, Clone)]
pub struct Cartridge {
    /// PRG ROM, 16 KiB granular, immutable after load.
    prg_rom: Vec<u8>,
    /// CHR storage: ROM from the image, or 8 KiB of zeroed RAM.
    chr: Vec<u8>,
    /// Whether `chr` is RAM (writable).
    chr_is_ram: bool,
    /// PRG RAM at $6000-$7FFF.
    prg_ram: Vec<u8>,
    /// Hardware mirroring from the header.
    mirroring: Mirroring,
    /// Battery-backed PRG RAM flag.
    has_battery: bool,
    /// Banking state.
    mapper: Mapper,
}

impl Cartridge {
    /// Build a cartridge from a parsed ROM image.
    pub fn from_rom(rom: Rom) -> Result<Self, RomError> {
        let mapper = match rom.header.mapper {
            0 => Mapper::Nrom,
            1 => Mapper::Mmc1(Mmc1::new()),
            2 => Mapper::Uxrom(Uxrom::new()),
            n => return Err(RomError::UnsupportedMapper(n)),
        };

        let chr_is_ram = rom.chr_rom.is_empty();
        let chr = if chr_is_ram {
            zeroed_region(8 * 1024)?
        } else {
            rom.chr_rom
        };

        let prg_ram = zeroed_region(rom.header.prg_ram_size.max(8 * 1024))?;

        Ok(Self {
            prg_rom: rom.prg_rom,
            chr,
            chr_is_ram,
            prg_ram,
            mirroring: rom.header.mirroring,
            has_battery: rom.header.has_battery,
            mapper,
        })
    }

    /// CPU read in $4020-$FFFF. `None` means the cartridge does not
    /// drive the bus at this address.
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        match (&self.mapper, addr) {
            (Mapper::Nrom, 0x6000..=0x7FFF) => Some(self.read_prg_ram(addr)),
            (Mapper::Nrom, 0x8000..=0xFFFF) => {
                let offset = usize::from(addr - 0x8000) % self.prg_rom.len().max(1);
                Some(self.prg_rom[offset])
            }
            (Mapper::Uxrom(state), 0x8000..=0xFFFF) => {
                let offset = state.prg_offset(addr, self.prg_rom.len()) % self.prg_rom.len().max(1);
                Some(self.prg_rom[offset])
            }
            (Mapper::Mmc1(state), 0x6000..=0x7FFF) => {
                if state.prg_ram_enabled() {
                    Some(self.read_prg_ram(addr))
                } else {
                    None
                }
            }
            (Mapper::Mmc1(state), 0x8000..=0xFFFF) => {
                let offset = state.prg_offset(addr, self.prg_rom.len()) % self.prg_rom.len().max(1);
                Some(self.prg_rom[offset])
            }
            _ => None,
        }
    }

    /// CPU write in $4020-$FFFF. Writes to ROM space act on the
    /// mapper's registers; everything else is dropped.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => {
                let writable = match &self.mapper {
                    Mapper::Nrom => true,
                    Mapper::Mmc1(state) => state.prg_ram_enabled(),
                    Mapper::Uxrom(_) => false,
                };
                if writable {
                    self.write_prg_ram(addr, value);
                }
            }
            0x8000..=0xFFFF => match &mut self.mapper {
                Mapper::Nrom => {}
                Mapper::Uxrom(state) => state.bank = value,
                Mapper::Mmc1(state) => state.write(addr, value),
            },
            _ => {}
        }
    }

    /// PPU read in $0000-$1FFF (pattern tables).
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> u8 {
        let offset = self.chr_offset(addr);
        self.chr.get(offset).copied().unwrap_or(0)
    }

    /// PPU write in $0000-$1FFF. Only lands when CHR is RAM.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        if !self.chr_is_ram {
            return;
        }
        let offset = self.chr_offset(addr);
        if let Some(byte) = self.chr.get_mut(offset) {
            *byte = value;
        }
    }

    fn chr_offset(&self, addr: u16) -> usize {
        match &self.mapper {
            Mapper::Nrom | Mapper::Uxrom(_) => usize::from(addr & 0x1FFF),
            Mapper::Mmc1(state) => {
                state.chr_offset(addr, self.chr.len()) % self.chr.len().max(1)
            }
        }
    }

    fn read_prg_ram(&self, addr: u16) -> u8 {
        let offset = usize::from(addr - 0x6000) % self.prg_ram.len().max(1);
        self.prg_ram[offset]
    }

    fn write_prg_ram(&mut self, addr: u16, value: u8) {
        let len = self.prg_ram.len().max(1);
        let offset = usize::from(addr - 0x6000) % len;
        if let Some(byte) = self.prg_ram.get_mut(offset) {
            *byte = value;
        }
    }

    /// Current nametable mirroring. MMC1 overrides the header.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        match &self.mapper {
            Mapper::Mmc1(state) => state.mirroring(),
            _ => self.mirroring,
        }
    }

    /// Reset banking state (PRG RAM and CHR RAM survive, as on hardware).
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    /// iNES mapper number.
    #[must_use]
    pub fn mapper_number(&self) -> u16 {
        self.mapper.number()
    }

    /// Mapper name for logs and UIs.
    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    /// Whether PRG RAM is battery backed.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    /// Battery-backed PRG RAM contents, for the host to persist.
    #[must_use]
    pub fn battery_ram(&self) -> Option<&[u8]> {
        if self.has_battery {
            Some(&self.prg_ram)
        } else {
            None
        }
    }

    /// Restore previously persisted PRG RAM.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.prg_ram.len());
        self.prg_ram[..len].copy_from_slice(&data[..len]);
    }
}
