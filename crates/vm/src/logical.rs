/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::Interpreter;

impl Interpreter {
    dyadic_handler!(execute_and_b, u8, |d, s| d & s);
    dyadic_handler!(execute_and_w, u16, |d, s| d & s);
    dyadic_handler!(execute_and_l, u32, |d, s| d & s);
    dyadic_handler!(execute_and_q, u64, |d, s| d & s);

    dyadic_handler!(execute_or_b, u8, |d, s| d | s);
    dyadic_handler!(execute_or_w, u16, |d, s| d | s);
    dyadic_handler!(execute_or_l, u32, |d, s| d | s);
    dyadic_handler!(execute_or_q, u64, |d, s| d | s);

    dyadic_handler!(execute_eor_b, u8, |d, s| d ^ s);
    dyadic_handler!(execute_eor_w, u16, |d, s| d ^ s);
    dyadic_handler!(execute_eor_l, u32, |d, s| d ^ s);
    dyadic_handler!(execute_eor_q, u64, |d, s| d ^ s);

    monadic_handler!(execute_not_b, u8, |v| !v);
    monadic_handler!(execute_not_w, u16, |v| !v);
    monadic_handler!(execute_not_l, u32, |v| !v);
    monadic_handler!(execute_not_q, u64, |v| !v);

    shift_handler!(execute_lsl_b, u8, |v, n| v << n);
    shift_handler!(execute_lsl_w, u16, |v, n| v << n);
    shift_handler!(execute_lsl_l, u32, |v, n| v << n);
    shift_handler!(execute_lsl_q, u64, |v, n| v << n);

    shift_handler!(execute_lsr_b, u8, |v, n| v >> n);
    shift_handler!(execute_lsr_w, u16, |v, n| v >> n);
    shift_handler!(execute_lsr_l, u32, |v, n| v >> n);
    shift_handler!(execute_lsr_q, u64, |v, n| v >> n);

    shift_handler!(execute_asl_b, i8, |v, n| v << n);
    shift_handler!(execute_asl_w, i16, |v, n| v << n);
    shift_handler!(execute_asl_l, i32, |v, n| v << n);
    shift_handler!(execute_asl_q, i64, |v, n| v << n);

    shift_handler!(execute_asr_b, i8, |v, n| v >> n);
    shift_handler!(execute_asr_w, i16, |v, n| v >> n);
    shift_handler!(execute_asr_l, i32, |v, n| v >> n);
    shift_handler!(execute_asr_q, i64, |v, n| v >> n);

    shift_handler!(execute_rol_b, u8, |v, n| v.rotate_left(n));
    shift_handler!(execute_rol_w, u16, |v, n| v.rotate_left(n));
    shift_handler!(execute_rol_l, u32, |v, n| v.rotate_left(n));
    shift_handler!(execute_rol_q, u64, |v, n| v.rotate_left(n));

    shift_handler!(execute_ror_b, u8, |v, n| v.rotate_right(n));
    shift_handler!(execute_ror_w, u16, |v, n| v.rotate_right(n));
    shift_handler!(execute_ror_l, u32, |v, n| v.rotate_right(n));
    shift_handler!(execute_ror_q, u64, |v, n| v.rotate_right(n));

    shift_handler!(execute_bclr_b, u8, |v, n| v & !(1u8 << n));
    shift_handler!(execute_bclr_w, u16, |v, n| v & !(1u16 << n));
    shift_handler!(execute_bclr_l, u32, |v, n| v & !(1u32 << n));
    shift_handler!(execute_bclr_q, u64, |v, n| v & !(1u64 << n));

    shift_handler!(execute_bset_b, u8, |v, n| v | (1u8 << n));
    shift_handler!(execute_bset_w, u16, |v, n| v | (1u16 << n));
    shift_handler!(execute_bset_l, u32, |v, n| v | (1u32 << n));
    shift_handler!(execute_bset_q, u64, |v, n| v | (1u64 << n));

    // index of the lowest set bit, -1 for zero
    unary_handler!(execute_bfffo, i64, |s| if s == 0 {
        -1
    } else {
        i64::from(s.trailing_zeros())
    });

    unary_handler!(execute_bfcnt, u64, |s| u64::from(s.count_ones()));
}
