//! System bus.
//!
//! Routes CPU accesses to RAM, PPU registers, APU/IO registers,
//! controllers and the cartridge, keeps the open-bus latch, and drives
//! OAM DMA and the per-cycle device clocks (three PPU dots and one APU
//! tick per CPU cycle).
//!
//! ```text
//! $0000-$1FFF  2 KiB RAM, mirrored every 2 KiB
//! $2000-$3FFF  PPU registers, mirrored every 8
//! $4000-$4013  APU channel registers (write only)
//! $4014        OAM DMA trigger (write only)
//! $4015        APU status / channel enables
//! $4016        controller strobe / port 1 data
//! $4017        APU frame counter / port 2 data
//! $4018-$401F  open bus
//! $4020-$FFFF  cartridge
//! ```

use crate::input::Controller;
use famicore_apu::Apu;
use famicore_cpu::Bus;
use famicore_mappers::{Cartridge, Mirroring as CartMirroring};
use famicore_ppu::{Mirroring as PpuMirroring, Ppu};

/// The NES system bus.
pub struct NesBus {
    /// Internal RAM, mirrored through $1FFF.
    ram: [u8; 2048],
    /// Picture processing unit.
    pub ppu: Ppu,
    /// Audio processing unit.
    pub apu: Apu,
    /// Attached cartridge, if a ROM has been loaded.
    pub cart: Option<Cartridge>,
    controller1: Controller,
    controller2: Controller,
    /// Last value driven on the data bus.
    open_bus: u8,
    /// Page latched by a $4014 write, pending DMA.
    dma_page: Option<u8>,
    /// CPU cycles ticked; parity decides the DMA stall length.
    cpu_cycles: u64,
}

impl NesBus {
    /// Empty bus: no cartridge, devices at power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(),
            apu: Apu::new(),
            cart: None,
            controller1: Controller::new(),
            controller2: Controller::new(),
            open_bus: 0,
            dma_page: None,
            cpu_cycles: 0,
        }
    }

    /// Attach a cartridge, replacing any previous one.
    pub fn attach_cart(&mut self, cart: Cartridge) {
        self.cart = Some(cart);
        self.sync_mirroring();
    }

    /// Reset RAM, devices, controllers, DMA and counters. The cartridge
    /// keeps its RAM contents but rewinds its banking registers.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ppu.reset();
        self.apu.reset();
        if let Some(cart) = &mut self.cart {
            cart.reset();
        }
        self.controller1.reset();
        self.controller2.reset();
        self.open_bus = 0;
        self.dma_page = None;
        self.cpu_cycles = 0;
        self.sync_mirroring();
    }

    /// Update the controller snapshots (bit 0 = A .. bit 7 = Right).
    pub fn set_input(&mut self, p1: u8, p2: u8) {
        self.controller1.set_buttons(p1);
        self.controller2.set_buttons(p2);
    }

    /// Controller 1 accessor for hosts that press single buttons.
    pub fn controller1_mut(&mut self) -> &mut Controller {
        &mut self.controller1
    }

    /// Controller 2 accessor.
    pub fn controller2_mut(&mut self) -> &mut Controller {
        &mut self.controller2
    }

    /// Advance the rest of the machine by one CPU cycle: three PPU dots
    /// and one APU tick.
    pub fn tick(&mut self) {
        self.sync_mirroring();
        let cart = &self.cart;
        let mut read_chr = |addr: u16| cart.as_ref().map_or(0, |c| c.ppu_read(addr));
        for _ in 0..3 {
            self.ppu.tick(&mut read_chr);
        }
        self.apu.tick();
        self.cpu_cycles += 1;
    }

    /// Whether a $4014 write is waiting to be serviced.
    #[must_use]
    pub fn dma_pending(&self) -> bool {
        self.dma_page.is_some()
    }

    /// Service a pending OAM DMA: 256 reads through the normal CPU read
    /// path into OAM at OAMADDR. Returns the stall in CPU cycles (513
    /// on even parity, 514 on odd), or 0 when nothing was pending.
    pub fn run_oam_dma(&mut self) -> u32 {
        let Some(page) = self.dma_page.take() else {
            return 0;
        };

        let base = u16::from(page) << 8;
        for offset in 0..256_u16 {
            let value = Bus::read(self, base.wrapping_add(offset));
            self.ppu.oam_dma_write(value);
        }

        if self.cpu_cycles % 2 == 0 {
            513
        } else {
            514
        }
    }

    /// Frame IRQ line level (APU only; the supported mappers have none).
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.apu.irq_pending()
    }

    /// CPU cycles ticked since reset.
    #[must_use]
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    /// Last value on the data bus.
    #[must_use]
    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }

    /// Side-effect-free read for debuggers: MMIO answers from the latch
    /// instead of the device.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x4014 => self.open_bus,
            0x4015 => self.apu.peek_status(self.open_bus),
            0x4016..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self
                .cart
                .as_ref()
                .and_then(|c| c.cpu_read(addr))
                .unwrap_or(self.open_bus),
        }
    }

    /// Point the PPU's nametable decoding at the cartridge's current
    /// mirroring. Four-screen falls back to vertical in this core.
    fn sync_mirroring(&mut self) {
        let Some(cart) = &self.cart else {
            return;
        };
        let mode = match cart.mirroring() {
            CartMirroring::Horizontal => PpuMirroring::Horizontal,
            CartMirroring::Vertical | CartMirroring::FourScreen => PpuMirroring::Vertical,
            CartMirroring::SingleScreenLower => PpuMirroring::SingleScreenLower,
            CartMirroring::SingleScreenUpper => PpuMirroring::SingleScreenUpper,
        };
        self.ppu.set_mirroring(mode);
    }
}

impl Default for NesBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],

            0x2000..=0x3FFF => {
                self.sync_mirroring();
                let open_bus = self.open_bus;
                let cart = &self.cart;
                self.ppu.read_register(addr, open_bus, |a| {
                    cart.as_ref().map_or(0, |c| c.ppu_read(a))
                })
            }

            // Write-only APU registers and the DMA trigger float.
            0x4000..=0x4014 => self.open_bus,

            0x4015 => self.apu.read_status(self.open_bus),
            0x4016 => (self.open_bus & 0xFE) | self.controller1.read(),
            0x4017 => (self.open_bus & 0xFE) | self.controller2.read(),

            0x4018..=0x401F => self.open_bus,

            0x4020..=0xFFFF => match &self.cart {
                Some(cart) => cart.cpu_read(addr).unwrap_or(self.open_bus),
                None => self.open_bus,
            },
        };

        self.open_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;

        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)] = value,

            0x2000..=0x3FFF => {
                self.sync_mirroring();
                let cart = &mut self.cart;
                self.ppu.write_register(addr, value, |a, v| {
                    if let Some(c) = cart.as_mut() {
                        c.ppu_write(a, v);
                    }
                });
            }

            0x4000..=0x4013 => self.apu.write(addr, value),
            0x4014 => self.dma_page = Some(value),
            0x4015 => self.apu.write(addr, value),
            0x4016 => {
                self.controller1.write_strobe(value);
                self.controller2.write_strobe(value);
            }
            0x4017 => self.apu.write(addr, value),

            0x4018..=0x401F => {}

            0x4020..=0xFFFF => {
                if let Some(cart) = &mut self.cart {
                    cart.cpu_write(addr, value);
                }
            }
        }
    }
}
