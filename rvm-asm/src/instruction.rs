//! Pure decoding and textual rendering of a single instruction.
//!
//! Both the execution engine and the disassembler sweep read instructions
//! through [`decode`]; neither touches raw memory bytes directly.

use crate::opcode::{ControlFlowClass, InvalidOpcode, Opcode, SysCall, SysOperand};
use std::convert::TryFrom;

/// The failure mode of [`decode`]: the leading byte names no opcode.
pub type DecodeError = InvalidOpcode;

/// The operand carried past `opcode`/`reg_d`/`reg_s`, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extra {
    /// No further operand byte.
    None,
    /// A single immediate byte (the `$imm8` forms, and `sys`'s sub-code).
    Imm8(u8),
    /// A big-endian 16-bit immediate or address.
    Imm16(u16),
    /// A bare register index (opcodes `0x07`/`0x08`'s third register),
    /// masked to 4 bits.
    Reg(u8),
}

/// A fully decoded instruction: opcode, register nibbles, trailing operand,
/// and encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The opcode.
    pub opcode: Opcode,
    /// High nibble of byte 1.
    pub reg_d: u8,
    /// Low nibble of byte 1.
    pub reg_s: u8,
    /// Trailing operand bytes, if the opcode has any.
    pub extra: Extra,
    /// Encoded length in bytes: 2, 3, or 4.
    pub len: u8,
}

/// Decodes an instruction from 4 consecutive bytes starting at `pc`.
///
/// Callers must zero-pad bytes that lie past the end of the image (§4.2);
/// this function never reads memory itself and is pure and total over its
/// input besides the `Err` case for an undefined leading byte.
pub fn decode(bytes: [u8; 4]) -> Result<Instruction, DecodeError> {
    let opcode = Opcode::try_from(bytes[0])?;
    let reg_d = bytes[1] >> 4;
    let reg_s = bytes[1] & 0x0F;
    let len = opcode.len();

    use Opcode::*;
    let extra = match opcode {
        MovRegImm8 | MovMemPairImm8 | CmpRegImm8 | PushImm8 | Sys | MulRegImm8 | DivRegImm8
        | ModRegImm8 => Extra::Imm8(bytes[2]),

        // The third register index is a nibble, like `reg_d`/`reg_s`; mask
        // it so a stray high nibble in a malformed image can never select
        // outside the 16-register file (§7: bad bytes must not crash the
        // interpreter) or render as more than the single hex digit §6
        // requires.
        MovMemPairReg | MovRegMemPair => Extra::Reg(bytes[2] & 0x0F),

        MovMemImmReg | MovRegMemImm | MovPairImm16 | Jmp | Jz | Jnz | Call => {
            Extra::Imm16(u16::from_be_bytes([bytes[2], bytes[3]]))
        }

        _ => Extra::None,
    };

    Ok(Instruction { opcode, reg_d, reg_s, extra, len })
}

/// Renders an instruction as assembly text, per §6's formatting rules:
/// zero-padded hex addresses/immediates, lowercase single-hex-digit
/// register names.
///
/// Returns `None` only for a `sys` instruction whose sub-code is outside
/// `0x00..=0x07` — the disassembler then treats the instruction's bytes as
/// undecoded (§9).
pub fn render(instr: &Instruction) -> Option<String> {
    let d = instr.reg_d;
    let s = instr.reg_s;

    let text = match (instr.opcode, instr.extra) {
        (Opcode::Nop, _) => "nop".to_string(),
        (Opcode::MovRegReg, _) => format!("mov r{d:x}, r{s:x}"),
        (Opcode::MovRegImm8, Extra::Imm8(imm)) => format!("mov r{d:x}, ${imm:02X}"),
        (Opcode::MovMemImmReg, Extra::Imm16(addr)) => format!("mov [${addr:04X}], r{s:x}"),
        (Opcode::MovRegMemImm, Extra::Imm16(addr)) => format!("mov r{d:x}, [${addr:04X}]"),
        (Opcode::MovPairImm16, Extra::Imm16(imm)) => format!("mov r{d:x}:r{s:x}, ${imm:04X}"),
        (Opcode::MovMemPairImm8, Extra::Imm8(imm)) => format!("mov [r{d:x}:r{s:x}], ${imm:02X}"),
        (Opcode::MovMemPairReg, Extra::Reg(c)) => format!("mov [r{d:x}:r{s:x}], r{c:x}"),
        (Opcode::MovRegMemPair, Extra::Reg(c)) => format!("mov r{c:x}, [r{d:x}:r{s:x}]"),
        (Opcode::Hlt, _) => "hlt".to_string(),
        (Opcode::Add, _) => format!("add r{d:x}, r{s:x}"),
        (Opcode::Sub, _) => format!("sub r{d:x}, r{s:x}"),
        (Opcode::Inc, _) => format!("inc r{d:x}"),
        (Opcode::Dec, _) => format!("dec r{d:x}"),
        (Opcode::CmpRegReg, _) => format!("cmp r{d:x}, r{s:x}"),
        (Opcode::CmpRegImm8, Extra::Imm8(imm)) => format!("cmp r{d:x}, ${imm:02X}"),
        (Opcode::Jmp, Extra::Imm16(addr)) => format!("jmp ${addr:04X}"),
        (Opcode::Jz, Extra::Imm16(addr)) => format!("jz ${addr:04X}"),
        (Opcode::Jnz, Extra::Imm16(addr)) => format!("jnz ${addr:04X}"),
        (Opcode::JmpPair, _) => format!("jmp r{d:x}:r{s:x}"),
        (Opcode::JzPair, _) => format!("jz r{d:x}:r{s:x}"),
        (Opcode::JnzPair, _) => format!("jnz r{d:x}:r{s:x}"),
        (Opcode::Call, Extra::Imm16(addr)) => format!("call ${addr:04X}"),
        (Opcode::CallPair, _) => format!("call r{d:x}:r{s:x}"),
        (Opcode::Ret, _) => "ret".to_string(),
        (Opcode::PushReg, _) => format!("push r{s:x}"),
        (Opcode::PopReg, _) => format!("pop r{d:x}"),
        (Opcode::PushImm8, Extra::Imm8(imm)) => format!("push ${imm:02X}"),
        (Opcode::And, _) => format!("and r{d:x}, r{s:x}"),
        (Opcode::Or, _) => format!("or r{d:x}, r{s:x}"),
        (Opcode::Xor, _) => format!("xor r{d:x}, r{s:x}"),
        (Opcode::MulRegReg, _) => format!("mul r{d:x}, r{s:x}"),
        (Opcode::Sys, Extra::Imm8(sub)) => return render_sys(d, s, sub),
        (Opcode::DivRegReg, _) => format!("div r{d:x}, r{s:x}"),
        (Opcode::MulRegImm8, Extra::Imm8(imm)) => format!("mul r{d:x}, ${imm:02X}"),
        (Opcode::DivRegImm8, Extra::Imm8(imm)) => format!("div r{d:x}, ${imm:02X}"),
        (Opcode::ModRegReg, _) => format!("mod r{d:x}, r{s:x}"),
        (Opcode::ModRegImm8, Extra::Imm8(imm)) => format!("mod r{d:x}, ${imm:02X}"),
        // Every reachable (opcode, extra) shape above is exhaustive for the
        // way `decode` builds `Extra`; this arm only exists because the
        // compiler can't see that correlation.
        _ => unreachable!("decode() never pairs {:?} with {:?}", instr.opcode, instr.extra),
    };

    Some(text)
}

fn render_sys(reg_d: u8, reg_s: u8, sub: u8) -> Option<String> {
    let call = SysCall::try_from(sub).ok()?;
    Some(match call.operand {
        SysOperand::Stack => format!("sys ${sub:02X}"),
        SysOperand::RegisterPair => format!("sys r{reg_d:x}:r{reg_s:x}, ${sub:02X}"),
    })
}

/// Re-exported for callers that only need the class of an already-decoded
/// instruction without re-matching on `Opcode` themselves.
pub fn class(instr: &Instruction) -> ControlFlowClass {
    instr.opcode.class()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_s1_arithmetic_image() {
        let i0 = decode([0x02, 0x10, 0x05, 0x00]).unwrap();
        assert_eq!(i0.opcode, Opcode::MovRegImm8);
        assert_eq!(i0.reg_d, 1);
        assert_eq!(i0.extra, Extra::Imm8(0x05));
        assert_eq!(i0.len, 3);

        let i1 = decode([0x0A, 0x12, 0x00, 0x00]).unwrap();
        assert_eq!(i1.opcode, Opcode::Add);
        assert_eq!(i1.reg_d, 1);
        assert_eq!(i1.reg_s, 2);
        assert_eq!(i1.len, 2);
    }

    #[test]
    fn renders_register_pair_mov_lowercase_hex() {
        let instr = decode([0x05, 0x12, 0x34, 0x56]).unwrap();
        assert_eq!(render(&instr).as_deref(), Some("mov r1:r2, $3456"));
    }

    #[test]
    fn third_register_operand_is_masked_to_a_nibble() {
        // `07 10 20`: `mov [r1:r0], rc` with a malformed `c` byte of 0x20.
        let instr = decode([0x07, 0x10, 0x20, 0x00]).unwrap();
        assert_eq!(instr.extra, Extra::Reg(0x00));
        assert_eq!(render(&instr).as_deref(), Some("mov [r1:r0], r0"));
    }

    #[test]
    fn renders_sys_stack_and_register_pair_forms() {
        let pop_stdout = decode([0x20, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(render(&pop_stdout).as_deref(), Some("sys $00"));

        let addr_form = decode([0x20, 0x12, 0x02, 0x00]).unwrap();
        assert_eq!(render(&addr_form).as_deref(), Some("sys r1:r2, $02"));
    }

    #[test]
    fn sys_with_unknown_subcode_does_not_render() {
        let instr = decode([0x20, 0x00, 0x99, 0x00]).unwrap();
        assert_eq!(render(&instr), None);
    }

    #[test]
    fn invalid_leading_byte_is_rejected() {
        assert_eq!(decode([0xFE, 0x00, 0x00, 0x00]), Err(InvalidOpcode(0xFE)));
    }

    #[test]
    fn s3_image_decodes_and_renders_as_specified() {
        // `jmp $0006` at address 0.
        let jmp = decode([0x10, 0x00, 0x00, 0x06]).unwrap();
        assert_eq!(render(&jmp).as_deref(), Some("jmp $0006"));
        assert_eq!(jmp.len, 4);

        // `nop` at address 6 and 8 (bytes 0x00 0x00 repeated).
        let nop = decode([0x00, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(render(&nop).as_deref(), Some("nop"));
        assert_eq!(nop.len, 2);
    }
}
