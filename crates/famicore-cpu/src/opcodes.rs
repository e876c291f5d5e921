//! Opcode decode table.
//!
//! The 6502's 256 opcode slots decode to a mnemonic, an addressing mode
//! and a base cycle count. Undefined slots become multi-byte NOPs with a
//! cycle cost of 2; the twelve halt slots decode to [`Mnemonic::Jam`].

use crate::addressing::AddrMode;

/// Instruction mnemonics: the 56 official operations plus the NOP
/// stand-in for undefined slots and the jam marker for halt opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // the mnemonics are their own documentation
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
    Tsx, Txa, Txs, Tya,
    /// Halt opcode ($02 and friends).
    Jam,
}

/// One decoded opcode slot.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// Operation to perform.
    pub mnemonic: Mnemonic,
    /// How the operand is fetched.
    pub mode: AddrMode,
    /// Base cycle count.
    pub cycles: u8,
    /// Whether a page crossing during indexing costs one extra cycle.
    pub page_cycle: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
        page_cycle: false,
    }
}

/// Read instruction whose indexed forms pay the page-cross cycle.
const fn opp(mnemonic: Mnemonic, mode: AddrMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
        page_cycle: true,
    }
}

/// Undefined slot: behaves as a NOP of the given length, cycle cost 2.
const fn nop(mode: AddrMode) -> OpcodeInfo {
    op(Mnemonic::Nop, mode, 2)
}

const fn jam() -> OpcodeInfo {
    op(Mnemonic::Jam, AddrMode::Imp, 2)
}

use AddrMode::{Abs, Abx, Aby, Acc, Idx, Idy, Imm, Imp, Ind, Rel, Zp0, Zpx, Zpy};
use Mnemonic::{
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx,
    Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
};

/// Decode table indexed by opcode byte.
#[rustfmt::skip]
pub static OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00
    op(Brk, Imp, 7), op(Ora, Idx, 6), jam(),           nop(Idx),
    nop(Zp0),        op(Ora, Zp0, 3), op(Asl, Zp0, 5), nop(Zp0),
    op(Php, Imp, 3), op(Ora, Imm, 2), op(Asl, Acc, 2), nop(Imm),
    nop(Abs),        op(Ora, Abs, 4), op(Asl, Abs, 6), nop(Abs),
    // 0x10
    op(Bpl, Rel, 2), opp(Ora, Idy, 5), jam(),           nop(Idy),
    nop(Zpx),        op(Ora, Zpx, 4),  op(Asl, Zpx, 6), nop(Zpx),
    op(Clc, Imp, 2), opp(Ora, Aby, 4), nop(Imp),        nop(Aby),
    nop(Abx),        opp(Ora, Abx, 4), op(Asl, Abx, 7), nop(Abx),
    // 0x20
    op(Jsr, Abs, 6), op(And, Idx, 6), jam(),           nop(Idx),
    op(Bit, Zp0, 3), op(And, Zp0, 3), op(Rol, Zp0, 5), nop(Zp0),
    op(Plp, Imp, 4), op(And, Imm, 2), op(Rol, Acc, 2), nop(Imm),
    op(Bit, Abs, 4), op(And, Abs, 4), op(Rol, Abs, 6), nop(Abs),
    // 0x30
    op(Bmi, Rel, 2), opp(And, Idy, 5), jam(),           nop(Idy),
    nop(Zpx),        op(And, Zpx, 4),  op(Rol, Zpx, 6), nop(Zpx),
    op(Sec, Imp, 2), opp(And, Aby, 4), nop(Imp),        nop(Aby),
    nop(Abx),        opp(And, Abx, 4), op(Rol, Abx, 7), nop(Abx),
    // 0x40
    op(Rti, Imp, 6), op(Eor, Idx, 6), jam(),           nop(Idx),
    nop(Zp0),        op(Eor, Zp0, 3), op(Lsr, Zp0, 5), nop(Zp0),
    op(Pha, Imp, 3), op(Eor, Imm, 2), op(Lsr, Acc, 2), nop(Imm),
    op(Jmp, Abs, 3), op(Eor, Abs, 4), op(Lsr, Abs, 6), nop(Abs),
    // 0x50
    op(Bvc, Rel, 2), opp(Eor, Idy, 5), jam(),           nop(Idy),
    nop(Zpx),        op(Eor, Zpx, 4),  op(Lsr, Zpx, 6), nop(Zpx),
    op(Cli, Imp, 2), opp(Eor, Aby, 4), nop(Imp),        nop(Aby),
    nop(Abx),        opp(Eor, Abx, 4), op(Lsr, Abx, 7), nop(Abx),
    // 0x60
    op(Rts, Imp, 6), op(Adc, Idx, 6), jam(),           nop(Idx),
    nop(Zp0),        op(Adc, Zp0, 3), op(Ror, Zp0, 5), nop(Zp0),
    op(Pla, Imp, 4), op(Adc, Imm, 2), op(Ror, Acc, 2), nop(Imm),
    op(Jmp, Ind, 5), op(Adc, Abs, 4), op(Ror, Abs, 6), nop(Abs),
    // 0x70
    op(Bvs, Rel, 2), opp(Adc, Idy, 5), jam(),           nop(Idy),
    nop(Zpx),        op(Adc, Zpx, 4),  op(Ror, Zpx, 6), nop(Zpx),
    op(Sei, Imp, 2), opp(Adc, Aby, 4), nop(Imp),        nop(Aby),
    nop(Abx),        opp(Adc, Abx, 4), op(Ror, Abx, 7), nop(Abx),
    // 0x80
    nop(Imm),        op(Sta, Idx, 6), nop(Imm),        nop(Idx),
    op(Sty, Zp0, 3), op(Sta, Zp0, 3), op(Stx, Zp0, 3), nop(Zp0),
    op(Dey, Imp, 2), nop(Imm),        op(Txa, Imp, 2), nop(Imm),
    op(Sty, Abs, 4), op(Sta, Abs, 4), op(Stx, Abs, 4), nop(Abs),
    // 0x90
    op(Bcc, Rel, 2), op(Sta, Idy, 6), jam(),           nop(Idy),
    op(Sty, Zpx, 4), op(Sta, Zpx, 4), op(Stx, Zpy, 4), nop(Zpy),
    op(Tya, Imp, 2), op(Sta, Aby, 5), op(Txs, Imp, 2), nop(Aby),
    nop(Abx),        op(Sta, Abx, 5), nop(Aby),        nop(Aby),
    // 0xA0
    op(Ldy, Imm, 2), op(Lda, Idx, 6), op(Ldx, Imm, 2), nop(Idx),
    op(Ldy, Zp0, 3), op(Lda, Zp0, 3), op(Ldx, Zp0, 3), nop(Zp0),
    op(Tay, Imp, 2), op(Lda, Imm, 2), op(Tax, Imp, 2), nop(Imm),
    op(Ldy, Abs, 4), op(Lda, Abs, 4), op(Ldx, Abs, 4), nop(Abs),
    // 0xB0
    op(Bcs, Rel, 2),  opp(Lda, Idy, 5), jam(),            nop(Idy),
    op(Ldy, Zpx, 4),  op(Lda, Zpx, 4),  op(Ldx, Zpy, 4),  nop(Zpy),
    op(Clv, Imp, 2),  opp(Lda, Aby, 4), op(Tsx, Imp, 2),  nop(Aby),
    opp(Ldy, Abx, 4), opp(Lda, Abx, 4), opp(Ldx, Aby, 4), nop(Aby),
    // 0xC0
    op(Cpy, Imm, 2), op(Cmp, Idx, 6), nop(Imm),        nop(Idx),
    op(Cpy, Zp0, 3), op(Cmp, Zp0, 3), op(Dec, Zp0, 5), nop(Zp0),
    op(Iny, Imp, 2), op(Cmp, Imm, 2), op(Dex, Imp, 2), nop(Imm),
    op(Cpy, Abs, 4), op(Cmp, Abs, 4), op(Dec, Abs, 6), nop(Abs),
    // 0xD0
    op(Bne, Rel, 2), opp(Cmp, Idy, 5), jam(),           nop(Idy),
    nop(Zpx),        op(Cmp, Zpx, 4),  op(Dec, Zpx, 6), nop(Zpx),
    op(Cld, Imp, 2), opp(Cmp, Aby, 4), nop(Imp),        nop(Aby),
    nop(Abx),        opp(Cmp, Abx, 4), op(Dec, Abx, 7), nop(Abx),
    // 0xE0
    op(Cpx, Imm, 2), op(Sbc, Idx, 6), nop(Imm),        nop(Idx),
    op(Cpx, Zp0, 3), op(Sbc, Zp0, 3), op(Inc, Zp0, 5), nop(Zp0),
    op(Inx, Imp, 2), op(Sbc, Imm, 2), nop(Imp),        nop(Imm),
    op(Cpx, Abs, 4), op(Sbc, Abs, 4), op(Inc, Abs, 6), nop(Abs),
    // 0xF0
    op(Beq, Rel, 2), opp(Sbc, Idy, 5), jam(),           nop(Idy),
    nop(Zpx),        op(Sbc, Zpx, 4),  op(Inc, Zpx, 6), nop(Zpx),
    op(Sed, Imp, 2), opp(Sbc, Aby, 4), nop(Imp),        nop(Aby),
    nop(Abx),        opp(Sbc, Abx, 4), op(Inc, Abx, 7), nop(Abx),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_spot_checks() {
        assert!(matches!(OPCODE_TABLE[0xA9].mnemonic, Mnemonic::Lda));
        assert_eq!(OPCODE_TABLE[0xA9].mode, AddrMode::Imm);
        assert_eq!(OPCODE_TABLE[0xA9].cycles, 2);

        assert!(matches!(OPCODE_TABLE[0x4C].mnemonic, Mnemonic::Jmp));
        assert_eq!(OPCODE_TABLE[0x4C].mode, AddrMode::Abs);
        assert!(matches!(OPCODE_TABLE[0x6C].mnemonic, Mnemonic::Jmp));
        assert_eq!(OPCODE_TABLE[0x6C].mode, AddrMode::Ind);

        assert!(matches!(OPCODE_TABLE[0x00].mnemonic, Mnemonic::Brk));
        assert_eq!(OPCODE_TABLE[0x00].cycles, 7);
    }

    #[test]
    fn page_penalty_only_on_indexed_reads() {
        // LDA abs,X pays the penalty; STA abs,X does not.
        assert!(OPCODE_TABLE[0xBD].page_cycle);
        assert!(!OPCODE_TABLE[0x9D].page_cycle);
        assert_eq!(OPCODE_TABLE[0x9D].cycles, 5);
    }

    #[test]
    fn undefined_slots_are_two_cycle_nops() {
        for slot in [0x04u8, 0x0C, 0x1A, 0x80, 0xFC] {
            let info = &OPCODE_TABLE[slot as usize];
            assert!(matches!(info.mnemonic, Mnemonic::Nop), "slot {slot:02X}");
            assert_eq!(info.cycles, 2);
        }
    }

    #[test]
    fn halt_slots_decode_to_jam() {
        for slot in [0x02u8, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert!(matches!(OPCODE_TABLE[slot as usize].mnemonic, Mnemonic::Jam));
        }
    }
}
