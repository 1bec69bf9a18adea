//! LS-8 memory subsystem.
//!
//! The LS-8 has 256 byte-sized cells holding both the loaded program and the
//! downward-growing stack. Addresses are `u8`, so every address a program can
//! produce names a valid cell; address arithmetic wraps modulo 256.

use serde::{Serialize, Deserialize};

/// The number of memory cells in the LS-8.
pub const MEMORY_SIZE: usize = 256;

/// LS-8 memory: 256 byte cells.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read the cell at `addr`.
    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    /// Write the cell at `addr`.
    #[inline]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Read the three bytes starting at `addr`, wrapping at the top of
    /// memory. This is the fetch window the decoder and the trace line see:
    /// opcode, first operand, second operand.
    #[inline]
    pub fn window(&self, addr: u8) -> [u8; 3] {
        [
            self.read(addr),
            self.read(addr.wrapping_add(1)),
            self.read(addr.wrapping_add(2)),
        ]
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Load a program into memory starting at the given address.
    ///
    /// The length is validated before anything is written, so a failed load
    /// leaves memory untouched.
    pub fn load_program(&mut self, start_addr: u8, program: &[u8]) -> Result<(), MemoryError> {
        let start = start_addr as usize;
        if start + program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available: MEMORY_SIZE - start,
            });
        }

        self.cells[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Program is too large to fit in memory.
    ProgramTooLarge { size: usize, available: usize },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProgramTooLarge { size, available } => {
                write!(f, "program size {} exceeds available space {}", size, available)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();

        mem.write(10, 0x42);
        assert_eq!(mem.read(10), 0x42);
        assert_eq!(mem.read(11), 0);
    }

    #[test]
    fn test_every_address_is_valid() {
        let mut mem = Memory::new();

        mem.write(0x00, 1);
        mem.write(0xFF, 2);
        assert_eq!(mem.read(0x00), 1);
        assert_eq!(mem.read(0xFF), 2);
    }

    #[test]
    fn test_window_wraps_at_top() {
        let mut mem = Memory::new();
        mem.write(0xFF, 0xAA);
        mem.write(0x00, 0xBB);
        mem.write(0x01, 0xCC);

        assert_eq!(mem.window(0xFF), [0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();

        mem.load_program(0, &[1, 2, 3]).unwrap();

        assert_eq!(mem.read(0), 1);
        assert_eq!(mem.read(1), 2);
        assert_eq!(mem.read(2), 3);
    }

    #[test]
    fn test_load_program_exact_fit() {
        let mut mem = Memory::new();
        let program = vec![0x01; MEMORY_SIZE];

        assert!(mem.load_program(0, &program).is_ok());
        assert_eq!(mem.read(0xFF), 0x01);
    }

    #[test]
    fn test_load_program_too_large() {
        let mut mem = Memory::new();
        let program = vec![0x01; MEMORY_SIZE + 1];

        let err = mem.load_program(0, &program).unwrap_err();
        assert_eq!(
            err,
            MemoryError::ProgramTooLarge {
                size: MEMORY_SIZE + 1,
                available: MEMORY_SIZE,
            }
        );
        // Nothing was written
        assert_eq!(mem.read(0), 0);
    }

    #[test]
    fn test_load_program_offset_overflow() {
        let mut mem = Memory::new();
        let program = vec![0x01; 16];

        assert!(mem.load_program(0xF8, &program).is_err());
    }

    #[test]
    fn test_clear() {
        let mut mem = Memory::new();
        mem.write(5, 99);

        mem.clear();

        assert_eq!(mem.read(5), 0);
    }
}
