//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::cpu::{Cpu, MEMORY_SIZE, NUM_REGISTERS};
use crate::asm::assembler::assemble;
use crate::asm::disasm::{disassemble, disassemble_instruction};
use crate::asm::image::parse_image;
use crate::cpu::decode::encode;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    program: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            program: Vec::new(),
        }
    }

    /// Load a program from assembly source code. Returns the byte count.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let bytes = assemble(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(bytes)
    }

    /// Load a program from `.ls8` image text (one binary byte per line).
    /// Returns the byte count.
    #[wasm_bindgen]
    pub fn load_image(&mut self, source: &str) -> Result<usize, JsError> {
        let image = parse_image(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(image.bytes)
    }

    fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<usize, JsError> {
        let len = bytes.len();
        self.program = bytes;
        self.cpu.reset();
        self.cpu.load_program(&self.program)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(len)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is not running"));
        }

        let instr = self.cpu.step()
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        let bytes = encode(&instr);
        let window = [
            bytes[0],
            bytes.get(1).copied().unwrap_or(0),
            bytes.get(2).copied().unwrap_or(0),
        ];
        Ok(disassemble_instruction(window))
    }

    /// Run until halt or max cycles.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> u64 {
        let _ = self.cpu.run_limited(max_cycles as u64);
        self.cpu.cycles
    }

    /// Reset CPU to initial state with the loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
        if !self.program.is_empty() {
            let _ = self.cpu.load_program(&self.program);
        }
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.regs.pc
    }

    /// Get stack pointer (register R7).
    #[wasm_bindgen]
    pub fn sp(&self) -> u8 {
        self.cpu.regs.sp()
    }

    /// Get a register value (0 for out-of-range indexes).
    #[wasm_bindgen]
    pub fn register(&self, index: usize) -> u8 {
        if index < NUM_REGISTERS {
            self.cpu.regs.get(index)
        } else {
            0
        }
    }

    /// Get the comparison flag as a string ("-", "E", "L", or "G").
    #[wasm_bindgen]
    pub fn flag(&self) -> String {
        format!("{}", self.cpu.regs.flag)
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Values printed by PRN so far, without draining them.
    #[wasm_bindgen]
    pub fn output(&self) -> Vec<u8> {
        self.cpu.output().to_vec()
    }

    /// Drain and return the values printed by PRN.
    #[wasm_bindgen]
    pub fn take_output(&mut self) -> Vec<u8> {
        self.cpu.take_output()
    }

    /// Get the memory byte at an address (0 for out-of-range addresses).
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: usize) -> u8 {
        if addr < MEMORY_SIZE {
            self.cpu.mem.read(addr as u8)
        } else {
            0
        }
    }

    /// Get all memory as an array of bytes.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> Vec<u8> {
        (0..MEMORY_SIZE).map(|i| self.cpu.mem.read(i as u8)).collect()
    }

    /// Get registers as a JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> String {
        let regs: Vec<u8> = (0..NUM_REGISTERS).map(|i| self.cpu.regs.get(i)).collect();
        serde_json::json!({
            "r": regs,
            "pc": self.cpu.regs.pc,
            "sp": self.cpu.regs.sp(),
            "flag": format!("{}", self.cpu.regs.flag),
            "state": format!("{:?}", self.cpu.state),
            "cycles": self.cpu.cycles,
        })
        .to_string()
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the program bytes.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<Vec<u8>, JsError> {
    assemble(source).map_err(|e| JsError::new(&format!("{}", e)))
}

/// Disassemble program bytes into a listing.
#[wasm_bindgen]
pub fn wasm_disassemble(bytes: &[u8]) -> String {
    disassemble(bytes)
}
