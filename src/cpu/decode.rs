//! Instruction decoder for the LS-8.
//!
//! An instruction is 1 to 3 bytes: the opcode, then up to two operand bytes.
//! The opcode byte is laid out `AABCDDDD`:
//! - `AA`: number of operand bytes (0-2)
//! - `B`: set for instructions handled by the ALU
//! - `C`: set for instructions that write the PC directly
//! - `DDDD`: instruction identifier
//!
//! The layout explains the byte values below; decoding matches whole bytes
//! against the table, so the fields are never picked apart at runtime.

use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Decoded LS-8 instruction.
///
/// Register operands are carried as validated [`Reg`] indices, so executing
/// a decoded instruction never has to re-check them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ==================== Arithmetic ====================

    /// Add: `reg[a] = reg[a] + reg[b]` (8-bit wrapping)
    Add { a: Reg, b: Reg },

    /// Multiply: `reg[a] = reg[a] * reg[b]` (8-bit wrapping)
    Mul { a: Reg, b: Reg },

    /// Compare `reg[a]` to `reg[b]` and set the flag register.
    Cmp { a: Reg, b: Reg },

    // ==================== Data & Output ====================

    /// Load immediate: `reg[r] = value`
    Ldi { reg: Reg, value: u8 },

    /// Print the register's value, in decimal, to the output buffer.
    Prn { reg: Reg },

    // ==================== Stack ====================

    /// Push: `SP -= 1; mem[SP] = reg[r]`
    Push { reg: Reg },

    /// Pop: `reg[r] = mem[SP]; SP += 1`
    Pop { reg: Reg },

    // ==================== Control Flow ====================

    /// Call: push the address of the next instruction, then `PC = reg[r]`
    Call { reg: Reg },

    /// Return: `PC = mem[SP]; SP += 1`
    Ret,

    /// Unconditional jump: `PC = reg[r]`
    Jmp { reg: Reg },

    /// Jump if the flag is Equal, otherwise fall through.
    Jeq { reg: Reg },

    /// Jump if the flag is anything but Equal, otherwise fall through.
    Jne { reg: Reg },

    /// Halt execution.
    Hlt,
}

impl Instruction {
    /// Encoded length in bytes: opcode plus operands.
    ///
    /// For PC-setting instructions this is the fall-through distance, not an
    /// automatic advance; JEQ/JNE add it only when the branch is not taken,
    /// and CALL pushes `pc + 2` as the return address.
    pub const fn size(&self) -> u8 {
        match self {
            Instruction::Hlt | Instruction::Ret => 1,

            Instruction::Prn { .. }
            | Instruction::Push { .. }
            | Instruction::Pop { .. }
            | Instruction::Call { .. }
            | Instruction::Jmp { .. }
            | Instruction::Jeq { .. }
            | Instruction::Jne { .. } => 2,

            Instruction::Add { .. }
            | Instruction::Mul { .. }
            | Instruction::Cmp { .. }
            | Instruction::Ldi { .. } => 3,
        }
    }
}

/// Opcode byte values, per the `AABCDDDD` layout.
struct Opcode;

impl Opcode {
    const HLT: u8 = 0b0000_0001;
    const LDI: u8 = 0b1000_0010;
    const PRN: u8 = 0b0100_0111;
    const ADD: u8 = 0b1010_0000;
    const MUL: u8 = 0b1010_0010;
    const PUSH: u8 = 0b0100_0101;
    const POP: u8 = 0b0100_0110;
    const CALL: u8 = 0b0101_0000;
    const RET: u8 = 0b0001_0001;
    const CMP: u8 = 0b1010_0111;
    const JMP: u8 = 0b0101_0100;
    const JEQ: u8 = 0b0101_0101;
    const JNE: u8 = 0b0101_0110;
}

/// Decode the 3-byte fetch window at the PC.
///
/// Instructions shorter than 3 bytes ignore the trailing window bytes, so a
/// HLT at the last cell of memory decodes fine regardless of what wraps in
/// behind it.
pub fn decode(window: [u8; 3]) -> Result<Instruction, DecodeError> {
    let [opcode, op1, op2] = window;

    let instruction = match opcode {
        Opcode::HLT => Instruction::Hlt,
        Opcode::LDI => Instruction::Ldi { reg: reg(op1)?, value: op2 },
        Opcode::PRN => Instruction::Prn { reg: reg(op1)? },
        Opcode::ADD => Instruction::Add { a: reg(op1)?, b: reg(op2)? },
        Opcode::MUL => Instruction::Mul { a: reg(op1)?, b: reg(op2)? },
        Opcode::PUSH => Instruction::Push { reg: reg(op1)? },
        Opcode::POP => Instruction::Pop { reg: reg(op1)? },
        Opcode::CALL => Instruction::Call { reg: reg(op1)? },
        Opcode::RET => Instruction::Ret,
        Opcode::CMP => Instruction::Cmp { a: reg(op1)?, b: reg(op2)? },
        Opcode::JMP => Instruction::Jmp { reg: reg(op1)? },
        Opcode::JEQ => Instruction::Jeq { reg: reg(op1)? },
        Opcode::JNE => Instruction::Jne { reg: reg(op1)? },
        _ => return Err(DecodeError::UnknownOpcode(opcode)),
    };

    Ok(instruction)
}

/// Validate a register operand byte.
fn reg(operand: u8) -> Result<Reg, DecodeError> {
    Reg::new(operand).ok_or(DecodeError::InvalidRegister(operand))
}

/// Encode an instruction back to its byte sequence.
pub fn encode(instr: &Instruction) -> Vec<u8> {
    match instr {
        Instruction::Hlt => vec![Opcode::HLT],
        Instruction::Ldi { reg, value } => vec![Opcode::LDI, reg.number(), *value],
        Instruction::Prn { reg } => vec![Opcode::PRN, reg.number()],
        Instruction::Add { a, b } => vec![Opcode::ADD, a.number(), b.number()],
        Instruction::Mul { a, b } => vec![Opcode::MUL, a.number(), b.number()],
        Instruction::Push { reg } => vec![Opcode::PUSH, reg.number()],
        Instruction::Pop { reg } => vec![Opcode::POP, reg.number()],
        Instruction::Call { reg } => vec![Opcode::CALL, reg.number()],
        Instruction::Ret => vec![Opcode::RET],
        Instruction::Cmp { a, b } => vec![Opcode::CMP, a.number(), b.number()],
        Instruction::Jmp { reg } => vec![Opcode::JMP, reg.number()],
        Instruction::Jeq { reg } => vec![Opcode::JEQ, reg.number()],
        Instruction::Jne { reg } => vec![Opcode::JNE, reg.number()],
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("unknown opcode {0:#04x} ({0:#010b})")]
    UnknownOpcode(u8),

    #[error("invalid register operand {0} (valid registers are R0-R7)")]
    InvalidRegister(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: u8) -> Reg {
        Reg::new(n).unwrap()
    }

    #[test]
    fn test_decode_hlt() {
        let instr = decode([0b0000_0001, 0, 0]).unwrap();
        assert_eq!(instr, Instruction::Hlt);
    }

    #[test]
    fn test_decode_hlt_ignores_trailing_bytes() {
        // Whatever sits after a 1-byte instruction is not part of it.
        let instr = decode([0b0000_0001, 0xFF, 0xFF]).unwrap();
        assert_eq!(instr, Instruction::Hlt);
    }

    #[test]
    fn test_decode_ldi() {
        let instr = decode([0b1000_0010, 0b0000_0000, 0b0000_1000]).unwrap();
        assert_eq!(instr, Instruction::Ldi { reg: r(0), value: 8 });
    }

    #[test]
    fn test_decode_two_register_ops() {
        let instr = decode([0b1010_0010, 0, 1]).unwrap();
        assert_eq!(instr, Instruction::Mul { a: r(0), b: r(1) });

        let instr = decode([0b1010_0111, 3, 4]).unwrap();
        assert_eq!(instr, Instruction::Cmp { a: r(3), b: r(4) });
    }

    #[test]
    fn test_decode_unknown_opcode() {
        // 0x00 is not an instruction; zeroed memory must not execute.
        let err = decode([0x00, 0, 0]).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownOpcode(0x00)));

        let err = decode([0b1111_1111, 0, 0]).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownOpcode(0xFF)));
    }

    #[test]
    fn test_decode_invalid_register() {
        let err = decode([0b0100_0111, 8, 0]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidRegister(8)));

        // Second operand of a two-register instruction is validated too.
        let err = decode([0b1010_0000, 0, 200]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidRegister(200)));
    }

    #[test]
    fn test_encode_matches_size() {
        let cases = [
            Instruction::Hlt,
            Instruction::Ret,
            Instruction::Prn { reg: r(0) },
            Instruction::Call { reg: r(1) },
            Instruction::Ldi { reg: r(2), value: 0xFE },
            Instruction::Add { a: r(0), b: r(1) },
        ];

        for instr in cases {
            assert_eq!(encode(&instr).len(), instr.size() as usize);
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let cases = [
            Instruction::Ldi { reg: r(7), value: 0xF4 },
            Instruction::Jeq { reg: r(2) },
            Instruction::Push { reg: r(6) },
            Instruction::Cmp { a: r(5), b: r(0) },
        ];

        for instr in cases {
            let mut window = [0u8; 3];
            let bytes = encode(&instr);
            window[..bytes.len()].copy_from_slice(&bytes);
            assert_eq!(decode(window).unwrap(), instr);
        }
    }
}
