//! famicore-core - the assembled NES.
//!
//! Integrates the CPU, PPU, APU and cartridge behind a single
//! [`Console`] with a small host-facing surface:
//!
//! ```no_run
//! use famicore_core::Console;
//!
//! let data = std::fs::read("game.nes").expect("read ROM");
//! let mut console = Console::new();
//! console.load_rom(&data).expect("load ROM");
//! console.reset();
//!
//! loop {
//!     console.set_input(0, 0);
//!     console.run_frame();
//!     let _pixels: &[u32] = console.framebuffer(); // 256x240 ARGB8888
//! }
//! ```
//!
//! Scheduling is single-threaded cooperative stepping: each CPU
//! instruction retires, then the bus ticks the PPU three dots and the
//! APU once per consumed cycle. OAM DMA stalls the CPU for 513/514
//! cycles while the other devices keep running.

mod bus;
mod console;
mod input;

pub use bus::NesBus;
pub use console::{timing, Console, ConsoleError};
pub use input::{Button, Controller};

// Re-export the device crates' main types for hosts.
pub use famicore_apu::Apu;
pub use famicore_cpu::{Bus, Cpu, Status};
pub use famicore_mappers::{Cartridge, Mirroring, Rom, RomError, RomHeader};
pub use famicore_ppu::{Ppu, FRAME_HEIGHT, FRAME_WIDTH};

/// Screen geometry.
pub mod screen {
    /// Width in pixels.
    pub const WIDTH: usize = 256;
    /// Height in pixels.
    pub const HEIGHT: usize = 240;
    /// Pixels per frame.
    pub const PIXELS: usize = WIDTH * HEIGHT;
}
