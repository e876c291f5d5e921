//! CPU status register (P) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! ```
//!
//! Bit U always reads as 1. Bit B only exists on the stack: PHP/BRK push
//! it set, IRQ/NMI push it clear, and pulls discard it.

use bitflags::bitflags;

bitflags! {
    /// CPU status register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable (masks IRQ, not NMI).
        const I = 1 << 2;
        /// Decimal mode. Settable, but ADC/SBC ignore it on the 2A03.
        const D = 1 << 3;
        /// Break. Only meaningful in the stacked copy of P.
        const B = 1 << 4;
        /// Unused; always reads as 1.
        const U = 1 << 5;
        /// Overflow (signed).
        const V = 1 << 6;
        /// Negative (bit 7 of the last result).
        const N = 1 << 7;
    }
}

impl Status {
    /// Power-on / reset value: I and U set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Create the power-on status.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Update Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Byte pushed to the stack. U is forced on; B depends on whether the
    /// push came from software (PHP/BRK) or an interrupt sequence.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, software: bool) -> u8 {
        let mut bits = self.bits() | Self::U.bits();
        if software {
            bits |= Self::B.bits();
        }
        bits
    }

    /// Rebuild the register from a byte pulled off the stack: B is
    /// discarded and U forced on.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
