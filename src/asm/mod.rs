//! Assembler and disassembler for LS-8 programs.
//!
//! This module provides:
//! - A simple two-pass assembler (text -> program bytes)
//! - A disassembler (program bytes -> readable text)
//! - The `.ls8` image file format (one binary byte per line)

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, AssemblerError};
pub use disasm::{disassemble, disassemble_instruction};
pub use image::{load_image, parse_image, save_image, ImageError, ImageFile};
