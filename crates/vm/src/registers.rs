/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm_isa::{FPR_COUNT, FPR_MASK, GPR_COUNT, GPR_MASK};
use std::fmt::{Debug, Formatter};
use std::ptr;

macro_rules! typed_view {
    ($get:ident, $set:ident, $ty:ty) => {
        #[inline]
        #[must_use]
        pub fn $get(&self) -> $ty {
            // Safety: the slot is eight bytes and every view is at most eight bytes
            unsafe { ptr::read_unaligned(self.bytes.as_ptr().cast::<$ty>()) }
        }

        /// Overwrites only the bytes covered by this view.
        #[inline]
        pub fn $set(&mut self, value: $ty) {
            unsafe { ptr::write_unaligned(self.bytes.as_mut_ptr().cast::<$ty>(), value) }
        }
    };
}

/// General purpose register. All views alias the same eight bytes in host byte order,
/// so a narrow write leaves the remaining bytes untouched.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
#[repr(C, align(8))]
pub struct Register {
    bytes: [u8; 8],
}

impl Register {
    typed_view!(u8, set_u8, u8);
    typed_view!(i8, set_i8, i8);
    typed_view!(u16, set_u16, u16);
    typed_view!(i16, set_i16, i16);
    typed_view!(u32, set_u32, u32);
    typed_view!(i32, set_i32, i32);
    typed_view!(u64, set_u64, u64);
    typed_view!(i64, set_i64, i64);
    typed_view!(f32, set_f32, f32);
    typed_view!(f64, set_f64, f64);

    /// The register value as an address.
    #[inline]
    #[must_use]
    pub fn ptr(&self) -> *mut u8 {
        ptr::with_exposed_provenance_mut(self.u64() as usize)
    }

    #[inline]
    pub fn set_ptr<T>(&mut self, pointer: *const T) {
        self.set_u64(pointer.expose_provenance() as u64);
    }

    /// Reads a NUL terminated string at the address held by the register.
    ///
    /// # Safety
    /// The register must point at a readable, NUL terminated byte sequence.
    #[must_use]
    pub unsafe fn c_str(&self) -> &std::ffi::CStr {
        unsafe { std::ffi::CStr::from_ptr(self.ptr().cast_const().cast()) }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }
}

impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:016X}", self.u64())
    }
}

/// Floating point register, a single or double precision view over eight bytes.
#[derive(Copy, Clone, Default, PartialEq)]
#[repr(C, align(8))]
pub struct FloatRegister {
    bytes: [u8; 8],
}

impl FloatRegister {
    typed_view!(f32, set_f32, f32);
    typed_view!(f64, set_f64, f64);
    typed_view!(bits, set_bits, u64);

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }
}

impl Debug for FloatRegister {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.f64())
    }
}

/// The two register banks. Indices wrap, so any `u8` selects a register.
#[derive(Debug, Default, Clone)]
pub struct RegisterFile {
    gpr: [Register; GPR_COUNT],
    fpr: [FloatRegister; FPR_COUNT],
}

impl RegisterFile {
    #[inline]
    #[must_use]
    pub const fn gpr(&self, index: u8) -> &Register {
        &self.gpr[(index & GPR_MASK) as usize]
    }

    #[inline]
    pub const fn gpr_mut(&mut self, index: u8) -> &mut Register {
        &mut self.gpr[(index & GPR_MASK) as usize]
    }

    #[inline]
    #[must_use]
    pub const fn fpr(&self, index: u8) -> &FloatRegister {
        &self.fpr[(index & FPR_MASK) as usize]
    }

    #[inline]
    pub const fn fpr_mut(&mut self, index: u8) -> &mut FloatRegister {
        &mut self.fpr[(index & FPR_MASK) as usize]
    }

    #[must_use]
    pub const fn gprs(&self) -> &[Register; GPR_COUNT] {
        &self.gpr
    }

    #[must_use]
    pub const fn fprs(&self) -> &[FloatRegister; FPR_COUNT] {
        &self.fpr
    }
}
