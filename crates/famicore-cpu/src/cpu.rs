//! 6502 CPU core.
//!
//! Instruction-stepped execution: [`Cpu::step`] runs exactly one
//! instruction (or one interrupt sequence) against a [`Bus`] and reports
//! the cycles it consumed. Reads and writes land at retirement, which is
//! the documented deviation from sub-instruction bus timing.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::{Mnemonic, OPCODE_TABLE};
use crate::status::Status;
use crate::vectors;

/// Resolved instruction operand.
#[derive(Debug, Clone, Copy)]
enum Operand {
    /// Implied: no operand.
    None,
    /// The accumulator itself.
    Accumulator,
    /// An effective memory address (also carries branch targets).
    Address(u16),
}

/// NES 6502 CPU (decimal mode absent, as on the 2A03).
#[derive(Debug)]
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer into $0100-$01FF.
    pub sp: u8,
    /// Status register.
    pub status: Status,
    /// Total cycles executed since reset.
    pub cycles: u64,
    /// Edge-triggered NMI latch; cleared when serviced.
    nmi_pending: bool,
    /// Level-sensitive IRQ line; masked by the I flag.
    irq_pending: bool,
    /// Set when a halt opcode was executed in strict mode.
    jammed: bool,
    /// When true, halt opcodes jam the CPU instead of acting as NOPs.
    strict_illegal: bool,
}

impl Cpu {
    /// Create a CPU in power-on state. `pc` is only meaningful after
    /// [`Cpu::reset`] loads it from the reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::POWER_ON,
            cycles: 0,
            nmi_pending: false,
            irq_pending: false,
            jammed: false,
            strict_illegal: false,
        }
    }

    /// Reset: SP=$FD, I set, PC loaded from $FFFC/$FFFD, counters and
    /// interrupt latches cleared.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.sp = 0xFD;
        self.status = Status::POWER_ON;
        self.pc = bus.read_u16(vectors::RESET);
        self.cycles = 0;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.jammed = false;
    }

    /// Latch an NMI. Edge-triggered: it fires once, before the next
    /// instruction.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drive the IRQ line. Level-sensitive: a still-asserted line
    /// re-raises after service.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_pending = asserted;
    }

    /// Whether an IRQ is currently pending.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Whether the CPU hit a halt opcode in strict mode.
    #[must_use]
    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    /// Select whether halt opcodes jam (true) or act as NOPs (false).
    pub fn set_strict_illegal(&mut self, strict: bool) {
        self.strict_illegal = strict;
    }

    /// Execute one instruction or interrupt sequence; returns the cycles
    /// consumed. A jammed CPU burns one cycle per call so the rest of
    /// the machine keeps advancing.
    pub fn step(&mut self, bus: &mut impl Bus) -> u8 {
        if self.jammed {
            self.cycles += 1;
            return 1;
        }

        // NMI wins over IRQ; both are sampled at instruction boundaries.
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.interrupt(bus, vectors::NMI);
        }
        if self.irq_pending && !self.status.contains(Status::I) {
            self.irq_pending = false;
            return self.interrupt(bus, vectors::IRQ);
        }

        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        let info = &OPCODE_TABLE[opcode as usize];
        let (operand, page_crossed) = self.resolve(bus, info.mode);

        let mut cycles = info.cycles;
        if info.page_cycle && page_crossed {
            cycles += 1;
        }
        cycles += self.execute(bus, info.mnemonic, operand);

        self.cycles += u64::from(cycles);
        cycles
    }

    /// Service an interrupt: push PC and P (B clear, U set), set I, load
    /// the vector. Seven cycles.
    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) -> u8 {
        self.push_u16(bus, self.pc);
        self.push(bus, self.status.to_stack_byte(false));
        self.status.insert(Status::I);
        self.pc = bus.read_u16(vector);
        self.cycles += 7;
        7
    }

    // ---------------------------------------------------------------
    // Operand resolution
    // ---------------------------------------------------------------

    fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = u16::from(self.fetch(bus));
        let hi = u16::from(self.fetch(bus));
        (hi << 8) | lo
    }

    /// Resolve the operand for a mode. Returns the operand and whether
    /// indexing crossed a page boundary.
    fn resolve(&mut self, bus: &mut impl Bus, mode: AddrMode) -> (Operand, bool) {
        match mode {
            AddrMode::Imp => (Operand::None, false),
            AddrMode::Acc => (Operand::Accumulator, false),
            AddrMode::Imm => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (Operand::Address(addr), false)
            }
            AddrMode::Zp0 => {
                let addr = u16::from(self.fetch(bus));
                (Operand::Address(addr), false)
            }
            AddrMode::Zpx => {
                let addr = u16::from(self.fetch(bus).wrapping_add(self.x));
                (Operand::Address(addr), false)
            }
            AddrMode::Zpy => {
                let addr = u16::from(self.fetch(bus).wrapping_add(self.y));
                (Operand::Address(addr), false)
            }
            AddrMode::Rel => {
                let offset = self.fetch(bus) as i8;
                let target = self.pc.wrapping_add(offset as u16);
                (Operand::Address(target), false)
            }
            AddrMode::Abs => {
                let addr = self.fetch_u16(bus);
                (Operand::Address(addr), false)
            }
            AddrMode::Abx => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.x));
                (Operand::Address(addr), page_crossed(base, addr))
            }
            AddrMode::Aby => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.y));
                (Operand::Address(addr), page_crossed(base, addr))
            }
            AddrMode::Ind => {
                let ptr = self.fetch_u16(bus);
                (Operand::Address(bus.read_u16_wrapped(ptr)), false)
            }
            AddrMode::Idx => {
                let ptr = self.fetch(bus).wrapping_add(self.x);
                let lo = u16::from(bus.read(u16::from(ptr)));
                let hi = u16::from(bus.read(u16::from(ptr.wrapping_add(1))));
                (Operand::Address((hi << 8) | lo), false)
            }
            AddrMode::Idy => {
                let ptr = self.fetch(bus);
                let lo = u16::from(bus.read(u16::from(ptr)));
                let hi = u16::from(bus.read(u16::from(ptr.wrapping_add(1))));
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(u16::from(self.y));
                (Operand::Address(addr), page_crossed(base, addr))
            }
        }
    }

    fn load(&mut self, bus: &mut impl Bus, operand: Operand) -> u8 {
        match operand {
            Operand::Address(addr) => bus.read(addr),
            Operand::Accumulator => self.a,
            Operand::None => 0,
        }
    }

    /// Read-modify-write against memory or the accumulator.
    fn modify(
        &mut self,
        bus: &mut impl Bus,
        operand: Operand,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) {
        match operand {
            Operand::Accumulator => {
                let value = self.a;
                let result = f(self, value);
                self.a = result;
            }
            Operand::Address(addr) => {
                let value = bus.read(addr);
                let result = f(self, value);
                bus.write(addr, result);
            }
            Operand::None => {}
        }
    }

    // ---------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------

    /// Execute a decoded instruction. Returns extra cycles beyond the
    /// table's base count (branches only).
    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, bus: &mut impl Bus, mnemonic: Mnemonic, operand: Operand) -> u8 {
        match mnemonic {
            // Loads and stores
            Mnemonic::Lda => {
                self.a = self.load(bus, operand);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ldx => {
                self.x = self.load(bus, operand);
                self.status.set_zn(self.x);
            }
            Mnemonic::Ldy => {
                self.y = self.load(bus, operand);
                self.status.set_zn(self.y);
            }
            Mnemonic::Sta => self.store(bus, operand, self.a),
            Mnemonic::Stx => self.store(bus, operand, self.x),
            Mnemonic::Sty => self.store(bus, operand, self.y),

            // Transfers
            Mnemonic::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Mnemonic::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Mnemonic::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Mnemonic::Txs => self.sp = self.x,

            // Stack
            Mnemonic::Pha => self.push(bus, self.a),
            Mnemonic::Php => self.push(bus, self.status.to_stack_byte(true)),
            Mnemonic::Pla => {
                self.a = self.pop(bus);
                self.status.set_zn(self.a);
            }
            Mnemonic::Plp => {
                let value = self.pop(bus);
                self.status = Status::from_stack_byte(value);
            }

            // Logic
            Mnemonic::And => {
                let value = self.load(bus, operand);
                self.a &= value;
                self.status.set_zn(self.a);
            }
            Mnemonic::Ora => {
                let value = self.load(bus, operand);
                self.a |= value;
                self.status.set_zn(self.a);
            }
            Mnemonic::Eor => {
                let value = self.load(bus, operand);
                self.a ^= value;
                self.status.set_zn(self.a);
            }
            Mnemonic::Bit => {
                let value = self.load(bus, operand);
                self.status.set(Status::Z, self.a & value == 0);
                self.status.set(Status::V, value & 0x40 != 0);
                self.status.set(Status::N, value & 0x80 != 0);
            }

            // Arithmetic
            Mnemonic::Adc => {
                let value = self.load(bus, operand);
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = self.load(bus, operand);
                self.adc(!value);
            }
            Mnemonic::Cmp => {
                let value = self.load(bus, operand);
                self.compare(self.a, value);
            }
            Mnemonic::Cpx => {
                let value = self.load(bus, operand);
                self.compare(self.x, value);
            }
            Mnemonic::Cpy => {
                let value = self.load(bus, operand);
                self.compare(self.y, value);
            }

            // Increments and decrements
            Mnemonic::Inc => self.modify(bus, operand, |cpu, v| {
                let r = v.wrapping_add(1);
                cpu.status.set_zn(r);
                r
            }),
            Mnemonic::Dec => self.modify(bus, operand, |cpu, v| {
                let r = v.wrapping_sub(1);
                cpu.status.set_zn(r);
                r
            }),
            Mnemonic::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Mnemonic::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }

            // Shifts and rotates
            Mnemonic::Asl => self.modify(bus, operand, |cpu, v| {
                cpu.status.set(Status::C, v & 0x80 != 0);
                let r = v << 1;
                cpu.status.set_zn(r);
                r
            }),
            Mnemonic::Lsr => self.modify(bus, operand, |cpu, v| {
                cpu.status.set(Status::C, v & 0x01 != 0);
                let r = v >> 1;
                cpu.status.set_zn(r);
                r
            }),
            Mnemonic::Rol => self.modify(bus, operand, |cpu, v| {
                let carry_in = u8::from(cpu.status.contains(Status::C));
                cpu.status.set(Status::C, v & 0x80 != 0);
                let r = (v << 1) | carry_in;
                cpu.status.set_zn(r);
                r
            }),
            Mnemonic::Ror => self.modify(bus, operand, |cpu, v| {
                let carry_in = u8::from(cpu.status.contains(Status::C));
                cpu.status.set(Status::C, v & 0x01 != 0);
                let r = (v >> 1) | (carry_in << 7);
                cpu.status.set_zn(r);
                r
            }),

            // Jumps and subroutines
            Mnemonic::Jmp => {
                if let Operand::Address(addr) = operand {
                    self.pc = addr;
                }
            }
            Mnemonic::Jsr => {
                if let Operand::Address(addr) = operand {
                    self.push_u16(bus, self.pc.wrapping_sub(1));
                    self.pc = addr;
                }
            }
            Mnemonic::Rts => {
                self.pc = self.pop_u16(bus).wrapping_add(1);
            }

            // Interrupt-related
            Mnemonic::Brk => {
                // Padding byte after the opcode is skipped: BRK pushes PC+2.
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(bus, self.pc);
                self.push(bus, self.status.to_stack_byte(true));
                self.status.insert(Status::I);
                self.pc = bus.read_u16(vectors::IRQ);
            }
            Mnemonic::Rti => {
                let value = self.pop(bus);
                self.status = Status::from_stack_byte(value);
                self.pc = self.pop_u16(bus);
            }

            // Branches
            Mnemonic::Bcc => return self.branch(operand, !self.status.contains(Status::C)),
            Mnemonic::Bcs => return self.branch(operand, self.status.contains(Status::C)),
            Mnemonic::Bne => return self.branch(operand, !self.status.contains(Status::Z)),
            Mnemonic::Beq => return self.branch(operand, self.status.contains(Status::Z)),
            Mnemonic::Bpl => return self.branch(operand, !self.status.contains(Status::N)),
            Mnemonic::Bmi => return self.branch(operand, self.status.contains(Status::N)),
            Mnemonic::Bvc => return self.branch(operand, !self.status.contains(Status::V)),
            Mnemonic::Bvs => return self.branch(operand, self.status.contains(Status::V)),

            // Flag operations
            Mnemonic::Clc => self.status.remove(Status::C),
            Mnemonic::Sec => self.status.insert(Status::C),
            Mnemonic::Cli => self.status.remove(Status::I),
            Mnemonic::Sei => self.status.insert(Status::I),
            Mnemonic::Clv => self.status.remove(Status::V),
            Mnemonic::Cld => self.status.remove(Status::D),
            Mnemonic::Sed => self.status.insert(Status::D),

            Mnemonic::Nop => {}
            Mnemonic::Jam => {
                if self.strict_illegal {
                    log::warn!("CPU jammed by halt opcode at ${:04X}", self.pc.wrapping_sub(1));
                    self.jammed = true;
                }
            }
        }
        0
    }

    fn store(&mut self, bus: &mut impl Bus, operand: Operand, value: u8) {
        if let Operand::Address(addr) = operand {
            bus.write(addr, value);
        }
    }

    /// Taken branches cost one extra cycle, two when the target sits on
    /// a different page than the next instruction.
    fn branch(&mut self, operand: Operand, taken: bool) -> u8 {
        let Operand::Address(target) = operand else {
            return 0;
        };
        if !taken {
            return 0;
        }
        let extra = if page_crossed(self.pc, target) { 2 } else { 1 };
        self.pc = target;
        extra
    }

    /// ADC without decimal mode. SBC routes through here with the
    /// operand inverted.
    fn adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;

        self.status.set(Status::C, sum > 0xFF);
        self.status
            .set(Status::V, (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0);
        self.a = result;
        self.status.set_zn(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::C, register >= value);
        self.status.set_zn(register.wrapping_sub(value));
    }

    // ---------------------------------------------------------------
    // Stack
    // ---------------------------------------------------------------

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.sp))
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, (value & 0xFF) as u8);
    }

    fn pop_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = u16::from(self.pop(bus));
        let hi = u16::from(self.pop(bus));
        (hi << 8) | lo
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn page_crossed(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}
