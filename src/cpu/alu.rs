//! Arithmetic/logic unit for the LS-8.
//!
//! ADD and MUL accumulate into their first operand register with explicit
//! 8-bit wraparound. CMP writes the flag register and leaves the register
//! file alone. The operation set is a closed enum, so there is no
//! "unsupported operation" path to fail on.

use crate::cpu::registers::{Flag, Reg, Registers};
use std::cmp::Ordering;

/// The operations the ALU can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// `reg[a] = reg[a] + reg[b]` (mod 256)
    Add,
    /// `reg[a] = reg[a] * reg[b]` (mod 256)
    Mul,
    /// Compare `reg[a]` to `reg[b]` and set the flag register.
    Cmp,
}

/// Apply an ALU operation to the register file.
///
/// Only register `a` (for ADD/MUL) or the flag (for CMP) is written;
/// register `b` is never modified.
pub fn apply(regs: &mut Registers, op: AluOp, a: Reg, b: Reg) {
    match op {
        AluOp::Add => regs[a] = regs[a].wrapping_add(regs[b]),
        AluOp::Mul => regs[a] = regs[a].wrapping_mul(regs[b]),
        AluOp::Cmp => {
            regs.flag = match regs[a].cmp(&regs[b]) {
                Ordering::Equal => Flag::Equal,
                Ordering::Less => Flag::Less,
                Ordering::Greater => Flag::Greater,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn regs_with(a: u8, b: u8) -> (Registers, Reg, Reg) {
        let mut regs = Registers::new();
        let ra = Reg::new(0).unwrap();
        let rb = Reg::new(1).unwrap();
        regs[ra] = a;
        regs[rb] = b;
        (regs, ra, rb)
    }

    #[test]
    fn test_add() {
        let (mut regs, ra, rb) = regs_with(2, 3);

        apply(&mut regs, AluOp::Add, ra, rb);

        assert_eq!(regs[ra], 5);
        assert_eq!(regs[rb], 3);
    }

    #[test]
    fn test_add_wraps_at_256() {
        let (mut regs, ra, rb) = regs_with(250, 10);

        apply(&mut regs, AluOp::Add, ra, rb);

        assert_eq!(regs[ra], 4);
    }

    #[test]
    fn test_mul() {
        let (mut regs, ra, rb) = regs_with(8, 9);

        apply(&mut regs, AluOp::Mul, ra, rb);

        assert_eq!(regs[ra], 72);
        assert_eq!(regs[rb], 9);
    }

    #[test]
    fn test_mul_wraps_at_256() {
        let (mut regs, ra, rb) = regs_with(16, 16);

        apply(&mut regs, AluOp::Mul, ra, rb);

        assert_eq!(regs[ra], 0);
    }

    #[test]
    fn test_add_same_register_doubles() {
        let mut regs = Registers::new();
        let r2 = Reg::new(2).unwrap();
        regs[r2] = 21;

        apply(&mut regs, AluOp::Add, r2, r2);

        assert_eq!(regs[r2], 42);
    }

    #[test]
    fn test_cmp_trichotomy() {
        let (mut regs, ra, rb) = regs_with(5, 5);
        apply(&mut regs, AluOp::Cmp, ra, rb);
        assert_eq!(regs.flag, Flag::Equal);

        let (mut regs, ra, rb) = regs_with(3, 5);
        apply(&mut regs, AluOp::Cmp, ra, rb);
        assert_eq!(regs.flag, Flag::Less);

        let (mut regs, ra, rb) = regs_with(5, 3);
        apply(&mut regs, AluOp::Cmp, ra, rb);
        assert_eq!(regs.flag, Flag::Greater);
    }

    #[test]
    fn test_cmp_overwrites_previous_flag() {
        let (mut regs, ra, rb) = regs_with(1, 2);

        apply(&mut regs, AluOp::Cmp, ra, rb);
        assert_eq!(regs.flag, Flag::Less);

        regs[ra] = 2;
        apply(&mut regs, AluOp::Cmp, ra, rb);
        assert_eq!(regs.flag, Flag::Equal);
    }

    #[test]
    fn test_cmp_leaves_registers_alone() {
        let (mut regs, ra, rb) = regs_with(7, 9);

        apply(&mut regs, AluOp::Cmp, ra, rb);

        assert_eq!(regs[ra], 7);
        assert_eq!(regs[rb], 9);
    }

    proptest! {
        #[test]
        fn prop_add_is_wrapping_add(a in any::<u8>(), b in any::<u8>()) {
            let (mut regs, ra, rb) = regs_with(a, b);
            apply(&mut regs, AluOp::Add, ra, rb);
            prop_assert_eq!(regs[ra], a.wrapping_add(b));
            prop_assert_eq!(regs[rb], b);
        }

        #[test]
        fn prop_mul_is_wrapping_mul(a in any::<u8>(), b in any::<u8>()) {
            let (mut regs, ra, rb) = regs_with(a, b);
            apply(&mut regs, AluOp::Mul, ra, rb);
            prop_assert_eq!(regs[ra], a.wrapping_mul(b));
            prop_assert_eq!(regs[rb], b);
        }

        #[test]
        fn prop_cmp_matches_ordering(a in any::<u8>(), b in any::<u8>()) {
            let (mut regs, ra, rb) = regs_with(a, b);
            apply(&mut regs, AluOp::Cmp, ra, rb);
            let expected = match a.cmp(&b) {
                Ordering::Equal => Flag::Equal,
                Ordering::Less => Flag::Less,
                Ordering::Greater => Flag::Greater,
            };
            prop_assert_eq!(regs.flag, expected);
        }
    }
}
