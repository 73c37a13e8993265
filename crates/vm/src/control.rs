/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::ea::{load, store};
use crate::{Interpreter, Status};
use mc64k_vm_isa::opcode::{
    DyadicCondition, MonadicCondition, OpCode, Width, dyadic_condition, monadic_condition,
};

#[inline]
fn is_monadic_met(condition: MonadicCondition, value: f64) -> bool {
    match condition {
        MonadicCondition::Zero => value == 0.0,
        MonadicCondition::NonZero => value != 0.0,
        MonadicCondition::Minus => value < 0.0,
        MonadicCondition::Plus => value > 0.0,
    }
}

#[inline]
const fn is_monadic_met_int(condition: MonadicCondition, value: i64) -> bool {
    match condition {
        MonadicCondition::Zero => value == 0,
        MonadicCondition::NonZero => value != 0,
        MonadicCondition::Minus => value < 0,
        MonadicCondition::Plus => value > 0,
    }
}

#[inline]
fn is_dyadic_met<T: PartialOrd>(condition: DyadicCondition, first: T, second: T) -> bool {
    match condition {
        DyadicCondition::Lt | DyadicCondition::Lo => first < second,
        DyadicCondition::Le | DyadicCondition::Ls => first <= second,
        DyadicCondition::Eq => first == second,
        DyadicCondition::Ge | DyadicCondition::Hs => first >= second,
        DyadicCondition::Gt | DyadicCondition::Hi => first > second,
        DyadicCondition::Ne => first != second,
    }
}

const fn is_unsigned(condition: DyadicCondition) -> bool {
    matches!(
        condition,
        DyadicCondition::Lo | DyadicCondition::Ls | DyadicCondition::Hs | DyadicCondition::Hi
    )
}

/// Tests the operand at `address`, read at `width`. Integers are sign extended.
///
/// # Safety
/// `address` must be readable for `width.size()` bytes.
unsafe fn test_monadic(condition: MonadicCondition, width: Width, address: *const u8) -> bool {
    unsafe {
        match width {
            Width::Byte => is_monadic_met_int(condition, i64::from(load::<i8>(address))),
            Width::Word => is_monadic_met_int(condition, i64::from(load::<i16>(address))),
            Width::Long => is_monadic_met_int(condition, i64::from(load::<i32>(address))),
            Width::Quad => is_monadic_met_int(condition, load::<i64>(address)),
            Width::Single => is_monadic_met(condition, f64::from(load::<f32>(address))),
            Width::Double => is_monadic_met(condition, load::<f64>(address)),
        }
    }
}

/// Compares `first` against `second` at `width`, unsigned for the Lo/Ls/Hs/Hi conditions.
///
/// # Safety
/// Both addresses must be readable for `width.size()` bytes.
unsafe fn test_dyadic(
    condition: DyadicCondition,
    width: Width,
    first: *const u8,
    second: *const u8,
) -> bool {
    unsafe {
        if is_unsigned(condition) {
            return match width {
                Width::Byte => is_dyadic_met(condition, load::<u8>(first), load::<u8>(second)),
                Width::Word => is_dyadic_met(condition, load::<u16>(first), load::<u16>(second)),
                Width::Long => is_dyadic_met(condition, load::<u32>(first), load::<u32>(second)),
                _ => is_dyadic_met(condition, load::<u64>(first), load::<u64>(second)),
            };
        }
        match width {
            Width::Byte => is_dyadic_met(condition, load::<i8>(first), load::<i8>(second)),
            Width::Word => is_dyadic_met(condition, load::<i16>(first), load::<i16>(second)),
            Width::Long => is_dyadic_met(condition, load::<i32>(first), load::<i32>(second)),
            Width::Quad => is_dyadic_met(condition, load::<i64>(first), load::<i64>(second)),
            Width::Single => is_dyadic_met(condition, load::<f32>(first), load::<f32>(second)),
            Width::Double => is_dyadic_met(condition, load::<f64>(first), load::<f64>(second)),
        }
    }
}

impl Interpreter {
    /// The opcode byte of the instruction being executed.
    #[inline]
    fn current_opcode(&self) -> u8 {
        unsafe { *self.pc.sub(1) }
    }

    /// Register operand of a register optimised branch. Float widths select the FPR bank.
    #[inline]
    fn branch_register(&mut self, index: u8, width: Width) -> *mut u8 {
        if width.is_float() {
            self.registers.fpr_mut(index).as_mut_ptr()
        } else {
            self.registers.gpr_mut(index).as_mut_ptr()
        }
    }

    #[inline]
    pub(crate) fn execute_bra_b(&mut self) {
        let displacement = self.fetch_i8();
        self.branch(i32::from(displacement));
    }

    #[inline]
    pub(crate) fn execute_bra(&mut self) {
        let displacement = self.fetch_i32();
        self.branch(displacement);
    }

    #[inline]
    pub(crate) fn execute_bsr_b(&mut self) {
        let displacement = self.fetch_i8();
        self.push_return_address();
        self.branch(i32::from(displacement));
    }

    #[inline]
    pub(crate) fn execute_bsr(&mut self) {
        let displacement = self.fetch_i32();
        self.push_return_address();
        self.branch(displacement);
    }

    pub(crate) fn execute_jmp(&mut self) {
        self.operation_size = 8;
        if let Some(target) = self.decode_destination_operand() {
            self.pc = target;
        }
    }

    pub(crate) fn execute_jsr(&mut self) {
        self.operation_size = 8;
        if let Some(target) = self.decode_destination_operand() {
            self.push_return_address();
            self.pc = target;
        }
    }

    /// Returning from the outermost frame completes the run without touching the stack.
    pub(crate) fn execute_rts(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
        if self.call_depth == 0 {
            self.status = Status::Completed;
        } else {
            self.pop_return_address();
        }
    }

    pub(crate) fn execute_stop(&mut self) {
        self.status = Status::CaughtFire;
    }

    /// `Bcc ea, d32`, the condition and width come from the opcode.
    pub(crate) fn execute_monadic_branch(&mut self) {
        let index = self.current_opcode() - OpCode::BizB as u8;
        let Some((condition, width)) = monadic_condition(index) else {
            self.status = Status::UnimplementedOpcode;
            return;
        };

        self.operation_size = width.size();
        let Some(operand) = self.decode_destination_operand() else {
            return;
        };
        let displacement = self.fetch_i32();

        if unsafe { test_monadic(condition, width, operand) } {
            self.branch(displacement);
        }
    }

    /// `Bcc first, second, d32` branches when `first <cc> second`.
    pub(crate) fn execute_dyadic_branch(&mut self) {
        let index = self.current_opcode() - OpCode::BltB as u8;
        let Some((condition, width)) = dyadic_condition(index) else {
            self.status = Status::UnimplementedOpcode;
            return;
        };

        self.operation_size = width.size();
        let Some(first) = self.decode_destination_operand() else {
            return;
        };
        let Some(second) = self.decode_source_operand() else {
            return;
        };
        let displacement = self.fetch_i32();

        if unsafe { test_dyadic(condition, width, first, second) } {
            self.branch(displacement);
        }
    }

    /// `BBS`/`BBC value, bit, d32`. The bit number is a byte, masked to the value width.
    pub(crate) fn execute_bit_branch(&mut self) {
        let index = self.current_opcode() - OpCode::BbsB as u8;
        let branch_if_set = index < 4;
        let width = match index % 4 {
            0 => Width::Byte,
            1 => Width::Word,
            2 => Width::Long,
            _ => Width::Quad,
        };

        self.operation_size = width.size();
        let Some(value) = self.decode_destination_operand() else {
            return;
        };
        self.operation_size = 1;
        let Some(bit) = self.decode_source_operand() else {
            return;
        };
        let displacement = self.fetch_i32();

        let (value, bit) = unsafe {
            let value = match width {
                Width::Byte => u64::from(load::<u8>(value)),
                Width::Word => u64::from(load::<u16>(value)),
                Width::Long => u64::from(load::<u32>(value)),
                _ => load::<u64>(value),
            };
            (value, u32::from(load::<u8>(bit)) & (width.size() as u32 * 8 - 1))
        };

        if ((value >> bit) & 1 == 1) == branch_if_set {
            self.branch(displacement);
        }
    }

    /// Decrements a 32-bit operand and branches while the result is non zero.
    pub(crate) fn execute_dbnz(&mut self) {
        self.operation_size = 4;
        let Some(counter) = self.decode_destination_operand() else {
            return;
        };
        let displacement = self.fetch_i32();

        let value = unsafe {
            let value = load::<u32>(counter).wrapping_sub(1);
            store::<u32>(counter, value);
            value
        };
        if value != 0 {
            self.branch(displacement);
        }
    }

    #[inline]
    pub(crate) fn execute_r_dbnz(&mut self) {
        let register = self.fetch_u8();
        let displacement = self.fetch_i32();

        let counter = self.registers.gpr_mut(register);
        let value = counter.u32().wrapping_sub(1);
        counter.set_u32(value);
        if value != 0 {
            self.branch(displacement);
        }
    }

    /// `R_BMC reg, cond, d32` with a monadic condition index.
    pub(crate) fn execute_r_bmc(&mut self) {
        let register = self.fetch_u8();
        let index = self.fetch_u8();
        let displacement = self.fetch_i32();

        let Some((condition, width)) = monadic_condition(index) else {
            self.status = Status::UnimplementedOpcode;
            return;
        };

        let operand = self.branch_register(register, width);
        if unsafe { test_monadic(condition, width, operand) } {
            self.branch(displacement);
        }
    }

    /// `R2R_BDC pair, cond, d32`. The first operand is the low nibble register.
    pub(crate) fn execute_r2r_bdc(&mut self) {
        let pair = self.fetch_u8();
        let index = self.fetch_u8();
        let displacement = self.fetch_i32();

        let Some((condition, width)) = dyadic_condition(index) else {
            self.status = Status::UnimplementedOpcode;
            return;
        };

        let first = self.branch_register(pair & 0x0F, width);
        let second = self.branch_register(pair >> 4, width);
        if unsafe { test_dyadic(condition, width, first, second) } {
            self.branch(displacement);
        }
    }
}
