/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */

/// `dst = dst OP src`. The destination operand is decoded before the source.
macro_rules! dyadic_handler {
    ($name:ident, $ty:ty, |$dst:ident, $src:ident| $body:expr) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$ty>();
            let Some(dst_address) = self.decode_destination_operand() else {
                return;
            };
            let Some(src_address) = self.decode_source_operand() else {
                return;
            };
            unsafe {
                let $dst: $ty = $crate::ea::load(dst_address);
                let $src: $ty = $crate::ea::load(src_address);
                $crate::ea::store::<$ty>(dst_address, $body);
            }
        }
    };
}

/// `dst = f(src)`, for operations whose source and destination share a width.
macro_rules! unary_handler {
    ($name:ident, $ty:ty, |$src:ident| $body:expr) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$ty>();
            let Some(dst_address) = self.decode_destination_operand() else {
                return;
            };
            let Some(src_address) = self.decode_source_operand() else {
                return;
            };
            unsafe {
                let $src: $ty = $crate::ea::load(src_address);
                $crate::ea::store::<$ty>(dst_address, $body);
            }
        }
    };
}

/// Single operand, modified in place.
macro_rules! monadic_handler {
    ($name:ident, $ty:ty, |$value:ident| $body:expr) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$ty>();
            let Some(address) = self.decode_destination_operand() else {
                return;
            };
            unsafe {
                let $value: $ty = $crate::ea::load(address);
                $crate::ea::store::<$ty>(address, $body);
            }
        }
    };
}

/// `dst = dst OP count` where count is a byte operand masked to the width of `dst`.
macro_rules! shift_handler {
    ($name:ident, $ty:ty, |$value:ident, $count:ident| $body:expr) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$ty>();
            let Some(dst_address) = self.decode_destination_operand() else {
                return;
            };
            self.operation_size = 1;
            let Some(count_address) = self.decode_source_operand() else {
                return;
            };
            unsafe {
                let $value: $ty = $crate::ea::load(dst_address);
                let $count: u32 =
                    u32::from($crate::ea::load::<u8>(count_address)) & (<$ty>::BITS - 1);
                $crate::ea::store::<$ty>(dst_address, $body);
            }
        }
    };
}

/// Integer division and remainder. A zero divisor leaves the destination untouched.
macro_rules! division_handler {
    ($name:ident, $ty:ty, $operation:ident) => {
        pub(crate) fn $name(&mut self) {
            self.operation_size = size_of::<$ty>();
            let Some(dst_address) = self.decode_destination_operand() else {
                return;
            };
            let Some(src_address) = self.decode_source_operand() else {
                return;
            };
            unsafe {
                let divisor: $ty = $crate::ea::load(src_address);
                if divisor == 0 {
                    self.status = $crate::Status::DivideByZero;
                    return;
                }
                let dividend: $ty = $crate::ea::load(dst_address);
                $crate::ea::store::<$ty>(dst_address, dividend.$operation(divisor));
            }
        }
    };
}
