//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::alu::{self, AluOp};
use crate::cpu::decode::{self, DecodeError, Instruction};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::NUM_REGISTERS;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT instruction).
    Halted,
    /// CPU stopped on an undecodable instruction.
    Error,
}

/// The LS-8 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling).
    pub cycles: u64,
    /// Values emitted by PRN, not yet drained by a front end.
    output: Vec<u8>,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU in its power-on state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Running,
            cycles: 0,
            output: Vec::new(),
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.output.clear();
        self.last_instr = None;
    }

    /// Load a program into memory at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed, or an error. An
    /// undecodable byte puts the CPU into the `Error` state; further
    /// calls fail with `NotRunning`.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        // Fetch a full instruction window at the PC.
        let window = self.mem.window(self.regs.pc);

        // Decode. On failure the machine cannot know how far to
        // advance, so execution stops here.
        let instr = match decode::decode(window) {
            Ok(instr) => instr,
            Err(e) => {
                self.state = CpuState::Error;
                return Err(e.into());
            }
        };

        // Execute (each instruction performs its own PC update)
        self.execute(instr);

        // Update state
        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a decoded instruction, including its PC update.
    fn execute(&mut self, instr: Instruction) {
        let pc = self.regs.pc;

        match instr {
            // ==================== Arithmetic ====================

            Instruction::Add { a, b } => {
                alu::apply(&mut self.regs, AluOp::Add, a, b);
                self.regs.pc = pc.wrapping_add(3);
            }

            Instruction::Mul { a, b } => {
                alu::apply(&mut self.regs, AluOp::Mul, a, b);
                self.regs.pc = pc.wrapping_add(3);
            }

            Instruction::Cmp { a, b } => {
                alu::apply(&mut self.regs, AluOp::Cmp, a, b);
                self.regs.pc = pc.wrapping_add(3);
            }

            // ==================== Data Transfer ====================

            Instruction::Ldi { reg, value } => {
                self.regs[reg] = value;
                self.regs.pc = pc.wrapping_add(3);
            }

            Instruction::Prn { reg } => {
                self.output.push(self.regs[reg]);
                self.regs.pc = pc.wrapping_add(2);
            }

            // ==================== Stack ====================

            Instruction::Push { reg } => {
                self.push(self.regs[reg]);
                self.regs.pc = pc.wrapping_add(2);
            }

            Instruction::Pop { reg } => {
                let value = self.pop();
                self.regs[reg] = value;
                self.regs.pc = pc.wrapping_add(2);
            }

            // ==================== Control Flow ====================

            Instruction::Call { reg } => {
                // The return address is the byte after this instruction.
                self.push(pc.wrapping_add(2));
                self.regs.pc = self.regs[reg];
            }

            Instruction::Ret => {
                self.regs.pc = self.pop();
            }

            Instruction::Jmp { reg } => {
                self.regs.pc = self.regs[reg];
            }

            Instruction::Jeq { reg } => {
                if self.regs.flag.is_equal() {
                    self.regs.pc = self.regs[reg];
                } else {
                    self.regs.pc = pc.wrapping_add(2);
                }
            }

            Instruction::Jne { reg } => {
                if !self.regs.flag.is_equal() {
                    self.regs.pc = self.regs[reg];
                } else {
                    self.regs.pc = pc.wrapping_add(2);
                }
            }

            Instruction::Hlt => {
                self.state = CpuState::Halted;
                self.regs.pc = pc.wrapping_add(1);
            }
        }
    }

    /// Push a byte: decrement SP, then store at the new SP.
    fn push(&mut self, value: u8) {
        let sp = self.regs.sp().wrapping_sub(1);
        self.regs.set_sp(sp);
        self.mem.write(sp, value);
    }

    /// Pop a byte: read at SP, then increment SP.
    fn pop(&mut self) -> u8 {
        let sp = self.regs.sp();
        let value = self.mem.read(sp);
        self.regs.set_sp(sp.wrapping_add(1));
        value
    }

    /// Values emitted by PRN since the last drain, oldest first.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Drain the PRN output buffer.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// One diagnostic line for the current cycle: the PC, the three-byte
    /// fetch window, and all eight registers, as two-digit uppercase hex.
    pub fn trace(&self) -> String {
        let window = self.mem.window(self.regs.pc);
        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.regs.pc, window[0], window[1], window[2]
        );
        for i in 0..NUM_REGISTERS {
            line.push_str(&format!(" {:02X}", self.regs.get(i)));
        }
        line
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("pending_output", &self.output.len())
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("decode error: {0}")]
    DecodeError(#[from] DecodeError),
}
