//! # LS-8 Emulator
//!
//! An emulator of the LS-8, an 8-bit educational microcomputer with
//! 256 bytes of RAM, eight general-purpose registers, and a small
//! instruction set covering arithmetic, a stack, subroutine calls, and
//! conditional jumps.

pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Flag, Instruction, Memory, Reg, Registers};
pub use asm::{assemble, disassemble, AssemblerError, ImageFile, load_image, save_image};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
