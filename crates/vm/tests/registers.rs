/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm::prelude::*;

#[test]
fn register_indices_wrap() {
    let mut registers = RegisterFile::default();
    for index in 0..16u8 {
        registers.gpr_mut(index).set_u64(u64::from(index) * 3);
        for k in 1..16u8 {
            let alias = index.wrapping_add(16 * k);
            assert!(std::ptr::eq(registers.gpr(index), registers.gpr(alias)));
            assert!(std::ptr::eq(registers.fpr(index), registers.fpr(alias)));
        }
        assert_eq!(registers.gpr(index + 16).u64(), u64::from(index) * 3);
    }
}

#[test]
fn views_alias_the_same_bits() {
    let mut register = Register::default();
    register.set_f32(1.0);
    assert_eq!(register.u32(), 0x3F80_0000);

    register.set_u64(0);
    register.set_f64(-2.5);
    assert_eq!(register.u64(), (-2.5f64).to_bits());

    let mut float = FloatRegister::default();
    float.set_f64(0.5);
    assert_eq!(float.bits(), 0.5f64.to_bits());
}

#[test]
fn narrow_writes_keep_the_remaining_bytes() {
    let mut register = Register::default();
    register.set_u64(0x1122_3344_5566_7788);
    register.set_u8(0xFF);
    assert_eq!(register.u64() & !0xFF, 0x1122_3344_5566_7700);
    assert_eq!(register.u8(), 0xFF);

    register.set_i16(-1);
    assert_eq!(register.u16(), 0xFFFF);
    assert_eq!(register.i32() >> 16, 0x5566);
}

#[test]
fn pointer_view() {
    let data = [7u8, 8, 9];
    let mut register = Register::default();
    register.set_ptr(data.as_ptr());
    assert_eq!(register.ptr().cast_const(), data.as_ptr());
    assert_eq!(unsafe { *register.ptr().add(2) }, 9);
}
