/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
//! Register to register instructions. They read a single pair byte (source in the high
//! nibble, destination in the low nibble), never touch the effective address decoder
//! and never change the status.

use crate::Interpreter;

macro_rules! r2r_gpr {
    ($name:ident, $get:ident, $set:ident, |$dst:ident, $src:ident| $body:expr) => {
        #[inline]
        pub(crate) fn $name(&mut self) {
            let (src, dst) = self.register_pair();
            let $src = self.registers.gpr(src).$get();
            let $dst = self.registers.gpr(dst).$get();
            self.registers.gpr_mut(dst).$set($body);
        }
    };
}

macro_rules! r2r_fpr {
    ($name:ident, $get:ident, $set:ident, |$dst:ident, $src:ident| $body:expr) => {
        #[inline]
        pub(crate) fn $name(&mut self) {
            let (src, dst) = self.register_pair();
            let $src = self.registers.fpr(src).$get();
            let $dst = self.registers.fpr(dst).$get();
            self.registers.fpr_mut(dst).$set($body);
        }
    };
}

impl Interpreter {
    /// Returns `(source, destination)`.
    #[inline]
    fn register_pair(&mut self) -> (u8, u8) {
        let pair = self.fetch_u8();
        (pair >> 4, pair & 0x0F)
    }

    r2r_gpr!(execute_r2r_move_l, u32, set_u32, |_d, s| s);
    r2r_gpr!(execute_r2r_move_q, u64, set_u64, |_d, s| s);
    r2r_fpr!(execute_r2r_fmove_s, f32, set_f32, |_d, s| s);
    r2r_fpr!(execute_r2r_fmove_d, f64, set_f64, |_d, s| s);

    r2r_gpr!(execute_r2r_and_q, u64, set_u64, |d, s| d & s);
    r2r_gpr!(execute_r2r_or_q, u64, set_u64, |d, s| d | s);
    r2r_gpr!(execute_r2r_eor_q, u64, set_u64, |d, s| d ^ s);

    r2r_gpr!(execute_r2r_add_l, u32, set_u32, |d, s| d.wrapping_add(s));
    r2r_gpr!(execute_r2r_add_q, u64, set_u64, |d, s| d.wrapping_add(s));
    r2r_gpr!(execute_r2r_sub_l, u32, set_u32, |d, s| d.wrapping_sub(s));
    r2r_gpr!(execute_r2r_sub_q, u64, set_u64, |d, s| d.wrapping_sub(s));
    r2r_gpr!(execute_r2r_muls_q, i64, set_i64, |d, s| d.wrapping_mul(s));

    r2r_fpr!(execute_r2r_fadd_d, f64, set_f64, |d, s| d + s);
    r2r_fpr!(execute_r2r_fsub_d, f64, set_f64, |d, s| d - s);
    r2r_fpr!(execute_r2r_fmul_d, f64, set_f64, |d, s| d * s);
}
