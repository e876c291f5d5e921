//! The assembled console.
//!
//! [`Console`] owns the CPU and the bus and drives the cycle ratio: for
//! every CPU cycle an instruction retires, the bus ticks the PPU three
//! dots and the APU once. The PPU's NMI and the APU's frame IRQ are
//! forwarded to the CPU at instruction boundaries, and a pending OAM
//! DMA is drained before the next instruction while the other devices
//! keep running.

use crate::bus::NesBus;
use famicore_cpu::Cpu;
use famicore_mappers::{Cartridge, Rom, RomError};

/// NTSC timing constants.
pub mod timing {
    /// Master clock (NTSC).
    pub const MASTER_CLOCK: u32 = 21_477_272;
    /// CPU clock: master / 12.
    pub const CPU_CLOCK: u32 = MASTER_CLOCK / 12;
    /// PPU dot clock: master / 4.
    pub const PPU_CLOCK: u32 = MASTER_CLOCK / 4;
    /// PPU dots per scanline.
    pub const DOTS_PER_SCANLINE: u16 = 341;
    /// Scanlines per frame, pre-render included.
    pub const SCANLINES_PER_FRAME: u16 = 262;
    /// Approximate CPU cycles per frame.
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
}

/// Console-level error.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// ROM loading failed.
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
}

/// A complete NES.
pub struct Console {
    cpu: Cpu,
    bus: NesBus,
    frame_count: u64,
}

impl Console {
    /// A zeroed system with no cartridge. Loads float to open bus until
    /// [`Console::load_rom`] attaches one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: NesBus::new(),
            frame_count: 0,
        }
    }

    /// Parse a ROM image and attach its cartridge to the bus and PPU.
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), ConsoleError> {
        let rom = Rom::load(data)?;
        let cart = Cartridge::from_rom(rom)?;
        log::info!(
            "loaded cartridge: mapper {} ({})",
            cart.mapper_number(),
            cart.mapper_name()
        );
        self.bus.attach_cart(cart);
        Ok(())
    }

    /// Reset the whole machine: RAM zeroed, devices reset, CPU PC
    /// reloaded from the reset vector, framebuffer black.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.frame_count = 0;
    }

    /// Update the per-frame controller snapshot.
    pub fn set_input(&mut self, p1: u8, p2: u8) {
        self.bus.set_input(p1, p2);
    }

    /// Run one CPU instruction (or drain a pending DMA) and advance the
    /// PPU and APU to match. Returns the CPU cycles consumed.
    pub fn step(&mut self) -> u32 {
        // A $4014 write stalls the CPU while the transfer runs; the
        // rest of the machine keeps clocking.
        if self.bus.dma_pending() {
            let stall = self.bus.run_oam_dma();
            for _ in 0..stall {
                self.bus.tick();
            }
            self.cpu.cycles += u64::from(stall);
            return stall;
        }

        // Interrupts latch at instruction boundaries.
        if self.bus.ppu.poll_nmi() {
            self.cpu.request_nmi();
        }
        self.cpu.set_irq(self.bus.irq_line());

        let cycles = u32::from(self.cpu.step(&mut self.bus));
        for _ in 0..cycles {
            self.bus.tick();
        }
        cycles
    }

    /// Run until the PPU completes the current frame.
    pub fn run_frame(&mut self) {
        loop {
            self.step();
            if self.bus.ppu.take_frame_complete() {
                break;
            }
        }
        self.frame_count += 1;
    }

    /// The PPU's 256x240 ARGB8888 framebuffer, row major.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.bus.ppu.framebuffer()
    }

    /// Frames completed since reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total CPU cycles executed since reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// CPU accessor for tests and debuggers.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable CPU accessor.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Bus accessor.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// Mutable bus accessor.
    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }

    /// Loaded mapper number, if a cartridge is attached.
    #[must_use]
    pub fn mapper_number(&self) -> Option<u16> {
        self.bus.cart.as_ref().map(Cartridge::mapper_number)
    }

    /// Battery-backed PRG RAM, for hosts that persist saves.
    #[must_use]
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.bus.cart.as_ref().and_then(Cartridge::battery_ram)
    }

    /// Restore previously persisted PRG RAM.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        if let Some(cart) = self.bus.cart.as_mut() {
            cart.load_battery_ram(data);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
