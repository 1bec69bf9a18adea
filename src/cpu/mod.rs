//! CPU emulation for the LS-8 computer.
//!
//! This module implements the complete LS-8 architecture:
//! - 256 bytes of RAM
//! - 8 general-purpose registers, with R7 doubling as the stack pointer
//! - an 8-bit program counter and a comparison flag
//! - a 13-instruction set with register-addressed operands

pub mod memory;
pub mod registers;
pub mod alu;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Flag, Reg, Registers, NUM_REGISTERS, STACK_INIT};
pub use alu::AluOp;
pub use decode::{DecodeError, Instruction};
pub use execute::{Cpu, CpuError, CpuState};
