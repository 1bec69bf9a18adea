//! LS-8 CPU registers.
//!
//! The LS-8 has:
//! - R0..R6: general-purpose 8-bit registers
//! - R7: general-purpose, but reserved by convention as the stack pointer
//! - PC: 8-bit program counter
//! - FL: flag register holding the result of the last CMP

use serde::{Serialize, Deserialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of general-purpose registers.
pub const NUM_REGISTERS: usize = 8;

/// Index of the register conventionally used as the stack pointer.
pub const SP: usize = 7;

/// Initial stack pointer value. The stack grows downward from here;
/// the bytes above 0xF4 are reserved by the LS-8 memory map.
pub const STACK_INIT: u8 = 0xF4;

/// A validated register index (0-7).
///
/// Constructed from instruction operand bytes at decode time, so execution
/// can index the register file without a bounds check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reg(u8);

impl Reg {
    /// The stack pointer register, R7.
    pub const SP: Reg = Reg(SP as u8);

    /// Create a register index, rejecting operand bytes outside 0-7.
    #[inline]
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_REGISTERS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The raw operand byte.
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// The index into the register file.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// The flag register.
///
/// CMP leaves exactly one of `Equal`, `Less`, or `Greater`. `Unset` is the
/// power-on state, before any CMP has run; conditional jumps treat it as
/// not-equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flag {
    /// No CMP has executed yet.
    #[default]
    Unset,
    /// Last CMP operands were equal.
    Equal,
    /// Last CMP left operand was less than the right.
    Less,
    /// Last CMP left operand was greater than the right.
    Greater,
}

impl Flag {
    /// True when the last comparison found its operands equal.
    ///
    /// This is the exact condition JEQ tests; JNE tests its negation, so
    /// `Unset`, `Less`, and `Greater` all count as not-equal.
    #[inline]
    pub fn is_equal(self) -> bool {
        self == Flag::Equal
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flag::Unset => "-",
            Flag::Equal => "E",
            Flag::Less => "L",
            Flag::Greater => "G",
        };
        f.write_str(s)
    }
}

/// The LS-8 register file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registers {
    /// R0..R7. R7 doubles as the stack pointer.
    r: [u8; NUM_REGISTERS],

    /// Program counter: address of the next instruction byte to fetch.
    pub pc: u8,

    /// Flag register, written by CMP and read by JEQ/JNE.
    pub flag: Flag,
}

impl Registers {
    /// Create a register file in the power-on state: everything zero except
    /// R7, which starts at the top of the stack region.
    pub fn new() -> Self {
        let mut r = [0; NUM_REGISTERS];
        r[SP] = STACK_INIT;
        Self {
            r,
            pc: 0,
            flag: Flag::Unset,
        }
    }

    /// Reset all registers to the power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a register by raw index (0-7).
    ///
    /// # Panics
    /// Panics if `index` is out of range. Decoded instructions carry [`Reg`]
    /// and never hit this; the raw form is for front ends (trace, TUI, wasm).
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        assert!(index < NUM_REGISTERS, "register index {} out of range (0-7)", index);
        self.r[index]
    }

    /// Write a register by raw index (0-7).
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        assert!(index < NUM_REGISTERS, "register index {} out of range (0-7)", index);
        self.r[index] = value;
    }

    /// Current stack pointer (the value of R7).
    #[inline]
    pub fn sp(&self) -> u8 {
        self.r[SP]
    }

    /// Move the stack pointer. All address arithmetic wraps modulo 256,
    /// matching the 8-bit address bus.
    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.r[SP] = value;
    }
}

impl Index<Reg> for Registers {
    type Output = u8;

    #[inline]
    fn index(&self, reg: Reg) -> &u8 {
        &self.r[reg.index()]
    }
}

impl IndexMut<Reg> for Registers {
    #[inline]
    fn index_mut(&mut self, reg: Reg) -> &mut u8 {
        &mut self.r[reg.index()]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let regs = Registers::new();

        for i in 0..SP {
            assert_eq!(regs.get(i), 0);
        }
        assert_eq!(regs.sp(), STACK_INIT);
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.flag, Flag::Unset);
    }

    #[test]
    fn test_reg_validation() {
        for i in 0..8 {
            assert!(Reg::new(i).is_some());
        }
        assert!(Reg::new(8).is_none());
        assert!(Reg::new(0xFF).is_none());
    }

    #[test]
    fn test_reg_indexing() {
        let mut regs = Registers::new();
        let r3 = Reg::new(3).unwrap();

        regs[r3] = 0xAB;
        assert_eq!(regs[r3], 0xAB);
        assert_eq!(regs.get(3), 0xAB);
    }

    #[test]
    fn test_sp_is_r7() {
        let mut regs = Registers::new();

        regs.set_sp(0xF0);
        assert_eq!(regs.get(SP), 0xF0);
        assert_eq!(regs[Reg::SP], 0xF0);

        regs[Reg::SP] = 0xE0;
        assert_eq!(regs.sp(), 0xE0);
    }

    #[test]
    fn test_flag_equality_test() {
        assert!(Flag::Equal.is_equal());
        assert!(!Flag::Unset.is_equal());
        assert!(!Flag::Less.is_equal());
        assert!(!Flag::Greater.is_equal());
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.set(0, 42);
        regs.pc = 0x33;
        regs.flag = Flag::Greater;

        regs.reset();

        assert_eq!(regs.get(0), 0);
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.flag, Flag::Unset);
        assert_eq!(regs.sp(), STACK_INIT);
    }
}
