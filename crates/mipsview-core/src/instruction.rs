//! Just enough MIPS decoding to drive step-over, step-out and
//! load/store following. Full disassembly is the host's job.

use crate::{address::VirtualAddress, target::Reg};

const OP_SPECIAL: u32 = 0x00;
const OP_REGIMM: u32 = 0x01;
const OP_J: u32 = 0x02;
const OP_JAL: u32 = 0x03;
const OP_BEQ: u32 = 0x04;
const OP_BNE: u32 = 0x05;
const OP_BLEZ: u32 = 0x06;
const OP_BGTZ: u32 = 0x07;

const FUNCT_JR: u32 = 0x08;
const FUNCT_JALR: u32 = 0x09;

// REGIMM `rt` values for the linking branches.
const RT_BLTZAL: u32 = 0x10;
const RT_BGEZAL: u32 = 0x11;

/// One raw instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction(pub u32);

impl Instruction {
    #[inline]
    pub fn op(self) -> u32 {
        self.0 >> 26
    }

    #[inline]
    pub fn rs(self) -> Reg {
        Reg::gpr(self.0 >> 21)
    }

    #[inline]
    pub fn rt_field(self) -> u32 {
        (self.0 >> 16) & 0x1F
    }

    #[inline]
    pub fn funct(self) -> u32 {
        self.0 & 0x3F
    }

    /// Sign-extended 16-bit immediate.
    #[inline]
    pub fn simm16(self) -> u32 {
        self.0 as u16 as i16 as i32 as u32
    }

    /// Jumps and branches that write a return address.
    pub fn is_call(self) -> bool {
        match self.op() {
            OP_JAL => true,
            OP_SPECIAL => self.funct() == FUNCT_JALR,
            OP_REGIMM => matches!(self.rt_field(), RT_BLTZAL | RT_BGEZAL),
            _ => false,
        }
    }

    /// Any control transfer with a delay slot.
    pub fn is_branch(self) -> bool {
        match self.op() {
            OP_REGIMM | OP_J | OP_JAL | OP_BEQ | OP_BNE | OP_BLEZ | OP_BGTZ => true,
            OP_SPECIAL => matches!(self.funct(), FUNCT_JR | FUNCT_JALR),
            _ => false,
        }
    }

    /// `jr $ra`.
    pub fn is_return(self) -> bool {
        self.op() == OP_SPECIAL && self.funct() == FUNCT_JR && self.rs() == Reg::Ra
    }

    pub fn is_load_store(self) -> bool {
        matches!(
            self.op(),
            0x20..=0x26 | 0x28..=0x2B | 0x2E | 0x32 | 0x3A
        )
    }

    /// Address a load/store would access, given the register file.
    /// `None` for anything that is not a memory access.
    pub fn effective_address(self, read_reg: impl Fn(Reg) -> u32) -> Option<VirtualAddress> {
        if !self.is_load_store() {
            return None;
        }
        Some(read_reg(self.rs()).wrapping_add(self.simm16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // jal 0x80010000
    const JAL: u32 = 0x0C00_4000;
    // jalr $ra, $t0
    const JALR: u32 = 0x0100_F809;
    // bgezal $a0, +4
    const BGEZAL: u32 = 0x0491_0004;
    // jr $ra
    const JR_RA: u32 = 0x03E0_0008;
    // jr $t0
    const JR_T0: u32 = 0x0100_0008;
    // beq $zero, $zero, -1
    const BEQ: u32 = 0x1000_FFFF;
    // addiu $sp, $sp, -24
    const ADDIU: u32 = 0x27BD_FFE8;
    // lw $a0, -8($sp)
    const LW: u32 = 0x8FA4_FFF8;
    // sb $t1, 16($a1)
    const SB: u32 = 0xA0A9_0010;
    // nop
    const NOP: u32 = 0;

    #[test]
    fn calls_are_linking_transfers() {
        assert!(Instruction(JAL).is_call());
        assert!(Instruction(JALR).is_call());
        assert!(Instruction(BGEZAL).is_call());
        assert!(!Instruction(JR_RA).is_call());
        assert!(!Instruction(BEQ).is_call());
        assert!(!Instruction(NOP).is_call());
    }

    #[test]
    fn branches_cover_every_transfer() {
        for bits in [JAL, JALR, BGEZAL, JR_RA, JR_T0, BEQ] {
            assert!(Instruction(bits).is_branch(), "{bits:08X}");
        }
        for bits in [ADDIU, LW, SB, NOP] {
            assert!(!Instruction(bits).is_branch(), "{bits:08X}");
        }
    }

    #[test]
    fn only_jr_ra_returns() {
        assert!(Instruction(JR_RA).is_return());
        assert!(!Instruction(JR_T0).is_return());
        assert!(!Instruction(JALR).is_return());
    }

    #[test]
    fn effective_address_is_base_plus_signed_offset() {
        let regs = |reg: Reg| match reg {
            Reg::Sp => 0x801F_FF00,
            Reg::A1 => 0x1F80_0000,
            _ => 0,
        };
        assert_eq!(Instruction(LW).effective_address(regs), Some(0x801F_FEF8));
        assert_eq!(Instruction(SB).effective_address(regs), Some(0x1F80_0010));
        assert_eq!(Instruction(ADDIU).effective_address(regs), None);
        assert_eq!(Instruction(JAL).effective_address(regs), None);
    }
}
