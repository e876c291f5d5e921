//! 2A03 APU frame sequencer and pulse channels for the famicore NES
//! emulator.
//!
//! The CPU-visible surface of the APU: register decode for
//! $4000-$4013/$4015/$4017, the 4- and 5-step frame counter with its
//! IRQ, pulse envelope/timer/duty state, and the four length counters
//! behind the status register. Sample-accurate mixing is a host
//! concern; [`Apu::pulse_outputs`] exposes the raw channel levels.

mod apu;
mod envelope;
mod frame_counter;
mod length_counter;
mod pulse;

pub use apu::Apu;
pub use envelope::Envelope;
pub use frame_counter::{FrameClocks, FrameCounter, FrameMode};
pub use length_counter::LengthCounter;
pub use pulse::Pulse;
