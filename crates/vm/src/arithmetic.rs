/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::Interpreter;
use crate::ea::{load, store};

/// Sign extends the low part of an operand in place.
macro_rules! extend_handler {
    ($name:ident, $to:ty, $from:ty) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$to>();
            let Some(address) = self.decode_destination_operand() else {
                return;
            };
            unsafe { store::<$to>(address, <$to>::from(load::<$from>(address))) };
        }
    };
}

impl Interpreter {
    extend_handler!(execute_extb_w, i16, i8);
    extend_handler!(execute_extb_l, i32, i8);
    extend_handler!(execute_extb_q, i64, i8);
    extend_handler!(execute_extw_l, i32, i16);
    extend_handler!(execute_extw_q, i64, i16);
    extend_handler!(execute_extl_q, i64, i32);

    monadic_handler!(execute_neg_b, i8, |v| v.wrapping_neg());
    monadic_handler!(execute_neg_w, i16, |v| v.wrapping_neg());
    monadic_handler!(execute_neg_l, i32, |v| v.wrapping_neg());
    monadic_handler!(execute_neg_q, i64, |v| v.wrapping_neg());
    monadic_handler!(execute_fneg_s, f32, |v| -v);
    monadic_handler!(execute_fneg_d, f64, |v| -v);

    dyadic_handler!(execute_add_b, u8, |d, s| d.wrapping_add(s));
    dyadic_handler!(execute_add_w, u16, |d, s| d.wrapping_add(s));
    dyadic_handler!(execute_add_l, u32, |d, s| d.wrapping_add(s));
    dyadic_handler!(execute_add_q, u64, |d, s| d.wrapping_add(s));
    dyadic_handler!(execute_fadd_s, f32, |d, s| d + s);
    dyadic_handler!(execute_fadd_d, f64, |d, s| d + s);

    dyadic_handler!(execute_sub_b, u8, |d, s| d.wrapping_sub(s));
    dyadic_handler!(execute_sub_w, u16, |d, s| d.wrapping_sub(s));
    dyadic_handler!(execute_sub_l, u32, |d, s| d.wrapping_sub(s));
    dyadic_handler!(execute_sub_q, u64, |d, s| d.wrapping_sub(s));
    dyadic_handler!(execute_fsub_s, f32, |d, s| d - s);
    dyadic_handler!(execute_fsub_d, f64, |d, s| d - s);

    dyadic_handler!(execute_muls_l, i32, |d, s| d.wrapping_mul(s));
    dyadic_handler!(execute_muls_q, i64, |d, s| d.wrapping_mul(s));
    dyadic_handler!(execute_mulu_l, u32, |d, s| d.wrapping_mul(s));
    dyadic_handler!(execute_mulu_q, u64, |d, s| d.wrapping_mul(s));
    dyadic_handler!(execute_fmul_s, f32, |d, s| d * s);
    dyadic_handler!(execute_fmul_d, f64, |d, s| d * s);

    division_handler!(execute_divs_l, i32, wrapping_div);
    division_handler!(execute_divs_q, i64, wrapping_div);
    division_handler!(execute_divu_l, u32, wrapping_div);
    division_handler!(execute_divu_q, u64, wrapping_div);
    dyadic_handler!(execute_fdiv_s, f32, |d, s| d / s);
    dyadic_handler!(execute_fdiv_d, f64, |d, s| d / s);

    division_handler!(execute_mods_l, i32, wrapping_rem);
    division_handler!(execute_mods_q, i64, wrapping_rem);
    division_handler!(execute_modu_l, u32, wrapping_rem);
    division_handler!(execute_modu_q, u64, wrapping_rem);
    dyadic_handler!(execute_fmod_s, f32, |d, s| d % s);
    dyadic_handler!(execute_fmod_d, f64, |d, s| d % s);

    unary_handler!(execute_fsqrt_s, f32, |s| s.sqrt());
    unary_handler!(execute_fsqrt_d, f64, |s| s.sqrt());
    unary_handler!(execute_fsin_s, f32, |s| s.sin());
    unary_handler!(execute_fsin_d, f64, |s| s.sin());
    unary_handler!(execute_fcos_s, f32, |s| s.cos());
    unary_handler!(execute_fcos_d, f64, |s| s.cos());
    unary_handler!(execute_ftan_s, f32, |s| s.tan());
    unary_handler!(execute_ftan_d, f64, |s| s.tan());
    unary_handler!(execute_fasin_s, f32, |s| s.asin());
    unary_handler!(execute_fasin_d, f64, |s| s.asin());
    unary_handler!(execute_facos_s, f32, |s| s.acos());
    unary_handler!(execute_facos_d, f64, |s| s.acos());
    unary_handler!(execute_fatan_s, f32, |s| s.atan());
    unary_handler!(execute_fatan_d, f64, |s| s.atan());
    unary_handler!(execute_fetox_s, f32, |s| s.exp());
    unary_handler!(execute_fetox_d, f64, |s| s.exp());
    unary_handler!(execute_flogn_s, f32, |s| s.ln());
    unary_handler!(execute_flogn_d, f64, |s| s.ln());
    unary_handler!(execute_flog2_s, f32, |s| s.log2());
    unary_handler!(execute_flog2_d, f64, |s| s.log2());
    unary_handler!(execute_ftwotox_s, f32, |s| s.exp2());
    unary_handler!(execute_ftwotox_d, f64, |s| s.exp2());
}
