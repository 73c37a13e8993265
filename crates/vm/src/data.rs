/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::ea::{load, store};
use crate::{Interpreter, Status};
use mc64k_vm_isa::ea::EaFamily;

/// `dst = src` at a fixed width.
macro_rules! move_handler {
    ($name:ident, $ty:ty) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$ty>();
            let Some(dst) = self.decode_destination_operand() else {
                return;
            };
            let Some(src) = self.decode_source_operand() else {
                return;
            };
            unsafe { store::<$ty>(dst, load::<$ty>(src)) };
        }
    };
}

/// Conversion between widths. The destination is decoded at its own width before the source.
macro_rules! convert_handler {
    ($name:ident, $dst:ty, $src:ty) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$dst>();
            let Some(dst) = self.decode_destination_operand() else {
                return;
            };
            self.operation_size = size_of::<$src>();
            let Some(src) = self.decode_source_operand() else {
                return;
            };
            unsafe { store::<$dst>(dst, load::<$src>(src) as $dst) };
        }
    };
}

const GPR_MASK_BITS: u32 = 0x0000_FFFF;
const FPR_MASK_SHIFT: u32 = 16;

impl Interpreter {
    move_handler!(execute_move_b, u8);
    move_handler!(execute_move_w, u16);
    move_handler!(execute_move_l, u32);
    move_handler!(execute_move_q, u64);
    move_handler!(execute_fmove_s, f32);
    move_handler!(execute_fmove_d, f64);

    convert_handler!(execute_fmovel_s, f32, i32);
    convert_handler!(execute_fmoveq_s, f32, i64);
    convert_handler!(execute_fmovel_d, f64, i32);
    convert_handler!(execute_fmoveq_d, f64, i64);

    // float to integer truncates toward zero and saturates
    convert_handler!(execute_fmoves_l, i32, f32);
    convert_handler!(execute_fmoves_q, i64, f32);
    convert_handler!(execute_fmoved_l, i32, f64);
    convert_handler!(execute_fmoved_q, i64, f64);

    convert_handler!(execute_fmoves_d, f64, f32);
    convert_handler!(execute_fmoved_s, f32, f64);

    /// `LEA dst, src` stores the address of `src` in `dst`.
    pub(crate) fn execute_lea(&mut self) {
        self.operation_size = 8;
        let Some(dst) = self.decode_destination_operand() else {
            return;
        };
        let Some(src) = self.decode_source_operand() else {
            return;
        };
        unsafe { store::<u64>(dst, src.expose_provenance() as u64) };
    }

    /// Reads the mode byte and mask of a register list instruction.
    /// Only the stepping families can address a register list.
    fn fetch_register_list(&mut self) -> Option<(u8, u32)> {
        let mode = self.fetch_u8();
        if !EaFamily::from_mode(mode).is_stepping() {
            tracing::debug!(mode, "register list needs an increment or decrement mode");
            self.status = Status::UnimplementedEAMode;
            return None;
        }
        let mask = self.fetch_u32();
        self.operation_size = 8;
        Some((mode, mask))
    }

    /// Stores the registers selected by `mask`, highest register first.
    fn save_registers(&mut self, mode: u8, mask: u16, float_bank: bool) {
        for index in (0..16u8).rev() {
            if mask & (1 << index) == 0 {
                continue;
            }
            let value = if float_bank {
                self.registers.fpr(index).bits()
            } else {
                self.registers.gpr(index).u64()
            };
            let Some(address) = self.decode_mode(mode, 0) else {
                return;
            };
            unsafe { store::<u64>(address, value) };
        }
    }

    /// Loads the registers selected by `mask`, lowest register first.
    fn restore_registers(&mut self, mode: u8, mask: u16, float_bank: bool) {
        for index in 0..16u8 {
            if mask & (1 << index) == 0 {
                continue;
            }
            let Some(address) = self.decode_mode(mode, 0) else {
                return;
            };
            let value = unsafe { load::<u64>(address) };
            if float_bank {
                self.registers.fpr_mut(index).set_bits(value);
            } else {
                self.registers.gpr_mut(index).set_u64(value);
            }
        }
    }

    pub(crate) fn execute_savem(&mut self) {
        if let Some((mode, mask)) = self.fetch_register_list() {
            self.save_registers(mode, (mask & GPR_MASK_BITS) as u16, false);
        }
    }

    pub(crate) fn execute_loadm(&mut self) {
        if let Some((mode, mask)) = self.fetch_register_list() {
            self.restore_registers(mode, (mask & GPR_MASK_BITS) as u16, false);
        }
    }

    pub(crate) fn execute_fsavem(&mut self) {
        if let Some((mode, mask)) = self.fetch_register_list() {
            self.save_registers(mode, (mask >> FPR_MASK_SHIFT) as u16, true);
        }
    }

    pub(crate) fn execute_floadm(&mut self) {
        if let Some((mode, mask)) = self.fetch_register_list() {
            self.restore_registers(mode, (mask >> FPR_MASK_SHIFT) as u16, true);
        }
    }
}
