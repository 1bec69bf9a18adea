//! Disassembler for LS-8 programs.
//!
//! Converts binary program images back to readable assembly.

use crate::cpu::decode::{decode, Instruction};

/// Disassemble a single instruction window to text.
pub fn disassemble_instruction(window: [u8; 3]) -> String {
    match decode(window) {
        Ok(decoded) => format_instruction(&decoded),
        Err(_) => format!("??? ; {:#04X}", window[0]),
    }
}

/// Disassemble a program image.
///
/// Instructions take one to three bytes, so the sweep advances by each
/// decoded instruction's size. Bytes that do not decode become `DB` lines.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; ----------------\n\n");

    let mut addr = 0usize;
    while addr < bytes.len() {
        let window = [
            bytes[addr],
            bytes.get(addr + 1).copied().unwrap_or(0),
            bytes.get(addr + 2).copied().unwrap_or(0),
        ];

        match decode(window) {
            Ok(instr) => {
                let size = instr.size() as usize;
                let end = (addr + size).min(bytes.len());
                let raw: Vec<String> =
                    bytes[addr..end].iter().map(|b| format!("{:02X}", b)).collect();
                output.push_str(&format!(
                    "{:02X}: {:<12} ; {}\n",
                    addr,
                    format_instruction(&instr),
                    raw.join(" ")
                ));
                addr += size;
            }
            Err(_) => {
                output.push_str(&format!("{:02X}: DB {:#04X}\n", addr, bytes[addr]));
                addr += 1;
            }
        }
    }

    output
}

/// Format a decoded instruction as assembly text.
fn format_instruction(instr: &Instruction) -> String {
    match instr {
        // Arithmetic
        Instruction::Add { a, b } => format!("ADD {},{}", a, b),
        Instruction::Mul { a, b } => format!("MUL {},{}", a, b),
        Instruction::Cmp { a, b } => format!("CMP {},{}", a, b),

        // Transfer
        Instruction::Ldi { reg, value } => format!("LDI {},{}", reg, value),
        Instruction::Prn { reg } => format!("PRN {}", reg),

        // Stack
        Instruction::Push { reg } => format!("PUSH {}", reg),
        Instruction::Pop { reg } => format!("POP {}", reg),

        // Control
        Instruction::Call { reg } => format!("CALL {}", reg),
        Instruction::Ret => "RET".to_string(),
        Instruction::Jmp { reg } => format!("JMP {}", reg),
        Instruction::Jeq { reg } => format!("JEQ {}", reg),
        Instruction::Jne { reg } => format!("JNE {}", reg),
        Instruction::Hlt => "HLT".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::encode;
    use crate::cpu::registers::Reg;

    fn r(n: u8) -> Reg {
        Reg::new(n).unwrap()
    }

    #[test]
    fn test_disassemble_hlt() {
        let bytes = encode(&Instruction::Hlt);
        let result = disassemble_instruction([bytes[0], 0, 0]);
        assert_eq!(result, "HLT");
    }

    #[test]
    fn test_disassemble_ldi() {
        let bytes = encode(&Instruction::Ldi { reg: r(0), value: 8 });
        let result = disassemble_instruction([bytes[0], bytes[1], bytes[2]]);
        assert_eq!(result, "LDI R0,8");
    }

    #[test]
    fn test_disassemble_unknown() {
        let result = disassemble_instruction([0x00, 0, 0]);
        assert!(result.contains("???"));
    }

    #[test]
    fn test_disassemble_program() {
        // print8: LDI R0,8 / PRN R0 / HLT
        let bytes = [0b10000010, 0, 8, 0b01000111, 0, 0b00000001];
        let listing = disassemble(&bytes);

        assert!(listing.contains("00: LDI R0,8"));
        assert!(listing.contains("03: PRN R0"));
        assert!(listing.contains("05: HLT"));
    }

    #[test]
    fn test_disassemble_data_bytes() {
        // 0x00 never decodes, so it comes out as data.
        let listing = disassemble(&[0x00, 0xFF]);

        assert!(listing.contains("00: DB 0x00"));
        assert!(listing.contains("01: DB 0xFF"));
    }

    #[test]
    fn test_disassemble_addresses_are_hex() {
        // Sixteen 1-byte RETs push the next address past 0x0F.
        let bytes = vec![0b00010001; 17];
        let listing = disassemble(&bytes);

        assert!(listing.contains("0F: RET"));
        assert!(listing.contains("10: RET"));
    }
}
