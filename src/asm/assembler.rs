//! Simple assembler for LS-8 programs.
//!
//! Syntax:
//! ```text
//! ; Comment (# also works)
//! LOOP:           ; Define a label
//!     LDI R0,10   ; Load an immediate into a register
//!     LDI R1,LOOP ; Labels resolve to their byte address
//!     CMP R0,R2
//!     JEQ R1      ; Jumps take the target from a register
//!     HLT
//!
//!     ORG 0x40    ; Zero-fill up to an address
//!     DB 42       ; Define a data byte
//! ```

use crate::cpu::decode::{encode, Instruction};
use crate::cpu::registers::Reg;
use std::collections::HashMap;
use thiserror::Error;

/// Assemble source code to program bytes.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// A parsed value operand: either a literal byte or a label reference
/// to be patched in pass 2.
enum Value {
    Literal(u8),
    Label(String),
}

/// The assembler state.
struct Assembler {
    /// Symbol table (label -> byte address).
    symbols: HashMap<String, usize>,
    /// Pending references (byte index, label, source line).
    pending: Vec<(usize, String, usize)>,
    /// Output bytes.
    output: Vec<u8>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            pending: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        // Pass 1: Collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Pass 2: Resolve forward references
        self.resolve_references()?;

        Ok(self.output.clone())
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments
        let line = match line.find(|c| c == ';' || c == '#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if !label.is_empty() {
                self.symbols.insert(label, self.output.len());
            }

            // Process rest of line if any
            let rest = line[colon_idx + 1..].trim();
            if !rest.is_empty() {
                return self.process_instruction(rest, line_num);
            }
            return Ok(());
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(());
        }

        let mnemonic = parts[0].to_uppercase();
        // Operands may be separated by commas, whitespace, or both
        let operands: Vec<String> = parts[1..]
            .join(" ")
            .split(',')
            .flat_map(|s| s.split_whitespace())
            .map(|s| s.to_string())
            .collect();

        match mnemonic.as_str() {
            // Directives
            "ORG" => {
                let operand = self.required(&operands, 0, "ORG requires an address", line_num)?;
                let addr = match self.parse_value(&operand, line_num)? {
                    Value::Literal(addr) => addr as usize,
                    Value::Label(_) => {
                        return Err(AssemblerError::SyntaxError {
                            line: line_num,
                            message: "ORG requires a numeric address".into(),
                        })
                    }
                };
                if addr < self.output.len() {
                    return Err(AssemblerError::SyntaxError {
                        line: line_num,
                        message: format!(
                            "ORG {:#04X} is behind the current address {:#04X}",
                            addr,
                            self.output.len()
                        ),
                    });
                }
                self.output.resize(addr, 0);
            }

            "DB" | "DAT" => {
                let operand = self.required(&operands, 0, "DB requires a value", line_num)?;
                match self.parse_value(&operand, line_num)? {
                    Value::Literal(byte) => self.output.push(byte),
                    Value::Label(label) => {
                        self.pending.push((self.output.len(), label, line_num));
                        self.output.push(0);
                    }
                }
            }

            // Instructions
            _ => {
                let instr = self.parse_instruction(&mnemonic, &operands, line_num)?;
                self.output.extend_from_slice(&encode(&instr));
            }
        }

        Ok(())
    }

    fn parse_instruction(
        &mut self,
        mnemonic: &str,
        operands: &[String],
        line_num: usize,
    ) -> Result<Instruction, AssemblerError> {
        let instr = match mnemonic {
            // Arithmetic
            "ADD" => Instruction::Add {
                a: self.reg_at(operands, 0, mnemonic, line_num)?,
                b: self.reg_at(operands, 1, mnemonic, line_num)?,
            },
            "MUL" => Instruction::Mul {
                a: self.reg_at(operands, 0, mnemonic, line_num)?,
                b: self.reg_at(operands, 1, mnemonic, line_num)?,
            },
            "CMP" => Instruction::Cmp {
                a: self.reg_at(operands, 0, mnemonic, line_num)?,
                b: self.reg_at(operands, 1, mnemonic, line_num)?,
            },

            // Data transfer
            "LDI" => {
                let reg = self.reg_at(operands, 0, mnemonic, line_num)?;
                let raw = self.required(operands, 1, "LDI requires a value", line_num)?;
                let value = match self.parse_value(&raw, line_num)? {
                    Value::Literal(v) => v,
                    Value::Label(label) => {
                        // The value is the third byte of this instruction
                        self.pending.push((self.output.len() + 2, label, line_num));
                        0
                    }
                };
                Instruction::Ldi { reg, value }
            }
            "PRN" => Instruction::Prn {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },

            // Stack
            "PUSH" => Instruction::Push {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },
            "POP" => Instruction::Pop {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },

            // Control flow
            "CALL" => Instruction::Call {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },
            "RET" => Instruction::Ret,
            "JMP" => Instruction::Jmp {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },
            "JEQ" => Instruction::Jeq {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },
            "JNE" => Instruction::Jne {
                reg: self.reg_at(operands, 0, mnemonic, line_num)?,
            },
            "HLT" | "HALT" => Instruction::Hlt,

            _ => {
                return Err(AssemblerError::UnknownMnemonic {
                    line: line_num,
                    mnemonic: mnemonic.to_string(),
                })
            }
        };

        Ok(instr)
    }

    fn required(
        &self,
        operands: &[String],
        idx: usize,
        message: &str,
        line_num: usize,
    ) -> Result<String, AssemblerError> {
        operands
            .get(idx)
            .cloned()
            .ok_or_else(|| AssemblerError::SyntaxError {
                line: line_num,
                message: message.to_string(),
            })
    }

    fn reg_at(
        &self,
        operands: &[String],
        idx: usize,
        mnemonic: &str,
        line_num: usize,
    ) -> Result<Reg, AssemblerError> {
        let operand = operands.get(idx).ok_or_else(|| AssemblerError::SyntaxError {
            line: line_num,
            message: format!("{} requires a register operand", mnemonic),
        })?;
        self.parse_register(operand, line_num)
    }

    fn parse_register(&self, operand: &str, line_num: usize) -> Result<Reg, AssemblerError> {
        operand
            .to_uppercase()
            .strip_prefix('R')
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Reg::new)
            .ok_or_else(|| AssemblerError::SyntaxError {
                line: line_num,
                message: format!("expected a register R0-R7, found {:?}", operand),
            })
    }

    fn parse_value(&self, operand: &str, line_num: usize) -> Result<Value, AssemblerError> {
        let operand = operand.trim();

        // Check for hex literal
        if let Some(hex) = operand.strip_prefix("0x").or_else(|| operand.strip_prefix("0X")) {
            let value = i32::from_str_radix(hex, 16).map_err(|_| AssemblerError::SyntaxError {
                line: line_num,
                message: "invalid hex literal".into(),
            })?;
            return self.check_range(value, line_num).map(Value::Literal);
        }

        // Check for binary literal
        if let Some(bin) = operand.strip_prefix("0b").or_else(|| operand.strip_prefix("0B")) {
            let value = i32::from_str_radix(bin, 2).map_err(|_| AssemblerError::SyntaxError {
                line: line_num,
                message: "invalid binary literal".into(),
            })?;
            return self.check_range(value, line_num).map(Value::Literal);
        }

        // Check for decimal number
        if let Ok(value) = operand.parse::<i32>() {
            return self.check_range(value, line_num).map(Value::Literal);
        }

        // Must be a label reference - resolved in pass 2
        Ok(Value::Label(operand.to_uppercase()))
    }

    fn check_range(&self, value: i32, line_num: usize) -> Result<u8, AssemblerError> {
        u8::try_from(value).map_err(|_| AssemblerError::ValueOutOfRange {
            line: line_num,
            value,
        })
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = *self
                .symbols
                .get(label)
                .ok_or_else(|| AssemblerError::UndefinedLabel {
                    line: *line_num,
                    label: label.clone(),
                })?;

            if addr > u8::MAX as usize {
                return Err(AssemblerError::ValueOutOfRange {
                    line: *line_num,
                    value: addr as i32,
                });
            }

            self.output[*out_idx] = addr as u8;
        }
        Ok(())
    }
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_print8() {
        let source = r#"
            ; Print the number 8
            LDI R0,8
            PRN R0
            HLT
        "#;

        let result = assemble(source).unwrap();
        assert_eq!(result, vec![0b10000010, 0, 8, 0b01000111, 0, 0b00000001]);
    }

    #[test]
    fn test_assemble_two_register_ops() {
        let result = assemble("MUL R0,R1\nADD R2, R3\nCMP R4 R5\n").unwrap();
        assert_eq!(
            result,
            vec![0b10100010, 0, 1, 0b10100000, 2, 3, 0b10100111, 4, 5]
        );
    }

    #[test]
    fn test_assemble_forward_label() {
        let source = r#"
            LDI R1,END
            JMP R1
            PRN R0
        END:
            HLT
        "#;

        let result = assemble(source).unwrap();
        // LDI(3) + JMP(2) + PRN(2) puts END at byte 7.
        assert_eq!(result[2], 7);
        assert_eq!(result[7], 0b00000001);
    }

    #[test]
    fn test_assemble_backward_label() {
        let source = r#"
        START:
            LDI R0,START
            HLT
        "#;

        let result = assemble(source).unwrap();
        assert_eq!(result[2], 0);
    }

    #[test]
    fn test_assemble_label_with_code_on_same_line() {
        let result = assemble("END: HLT\n").unwrap();
        assert_eq!(result, vec![0b00000001]);
    }

    #[test]
    fn test_assemble_undefined_label() {
        let err = assemble("LDI R0,NOWHERE\nHLT\n").unwrap_err();
        match err {
            AssemblerError::UndefinedLabel { line, label } => {
                assert_eq!(line, 1);
                assert_eq!(label, "NOWHERE");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_assemble_unknown_mnemonic() {
        let err = assemble("FLY R0\n").unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::UnknownMnemonic { line: 1, .. }
        ));
    }

    #[test]
    fn test_assemble_bad_register() {
        let err = assemble("ADD R0,R9\n").unwrap_err();
        assert!(matches!(err, AssemblerError::SyntaxError { line: 1, .. }));
    }

    #[test]
    fn test_assemble_missing_operand() {
        let err = assemble("LDI R0\n").unwrap_err();
        assert!(matches!(err, AssemblerError::SyntaxError { line: 1, .. }));
    }

    #[test]
    fn test_assemble_value_out_of_range() {
        let err = assemble("LDI R0,300\n").unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::ValueOutOfRange { line: 1, value: 300 }
        ));
    }

    #[test]
    fn test_assemble_hex_and_binary_literals() {
        let result = assemble("LDI R0,0x2A\nLDI R1,0b1010\n").unwrap();
        assert_eq!(result[2], 42);
        assert_eq!(result[5], 10);
    }

    #[test]
    fn test_assemble_org_and_db() {
        let source = r#"
            ORG 5
            DB 7
        "#;

        let result = assemble(source).unwrap();
        assert_eq!(result.len(), 6);
        assert_eq!(&result[..5], &[0, 0, 0, 0, 0]);
        assert_eq!(result[5], 7);
    }

    #[test]
    fn test_assemble_org_backwards_fails() {
        let err = assemble("HLT\nORG 0\n").unwrap_err();
        assert!(matches!(err, AssemblerError::SyntaxError { line: 2, .. }));
    }

    #[test]
    fn test_assemble_comment_styles() {
        let result = assemble("LDI R0,1 ; semicolon\nLDI R1,2 # hash\n# full line\n").unwrap();
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn test_assemble_case_insensitive() {
        let result = assemble("ldi r0,8\nprn r0\nhlt\n").unwrap();
        assert_eq!(result, vec![0b10000010, 0, 8, 0b01000111, 0, 0b00000001]);
    }

    #[test]
    fn test_assemble_call_subroutine() {
        let source = r#"
            LDI R1,DOUBLE
            LDI R0,21
            CALL R1
            PRN R0
            HLT
        DOUBLE:
            ADD R0,R0
            RET
        "#;

        let result = assemble(source).unwrap();
        // LDI(3) + LDI(3) + CALL(2) + PRN(2) + HLT(1) puts DOUBLE at 11.
        assert_eq!(result[2], 11);
        assert_eq!(result[11], 0b10100000);
    }
}
