/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::{Interpreter, Status};
use mc64k_vm_isa::ea::{
    EaFamily, INDEX_SCALE_MASK, IndexWidth, LOW_NIBBLE, OtherMode, SAME_AS_DESTINATION,
};
use std::ptr;

/// Reads a `T` from an effective address.
///
/// # Safety
/// `address` must be valid for reads of `size_of::<T>()` bytes.
#[inline]
pub(crate) unsafe fn load<T: Copy>(address: *const u8) -> T {
    unsafe { ptr::read_unaligned(address.cast::<T>()) }
}

/// # Safety
/// `address` must be valid for writes of `size_of::<T>()` bytes.
#[inline]
pub(crate) unsafe fn store<T: Copy>(address: *mut u8, value: T) {
    unsafe { ptr::write_unaligned(address.cast::<T>(), value) }
}

const DESTINATION_SLOT: usize = 0;
const SOURCE_SLOT: usize = 1;

impl Interpreter {
    /// Decodes the first (destination) operand at the current program counter and remembers
    /// it for a following same-as-destination source. A destination never resolves to the
    /// one remembered from an earlier instruction.
    ///
    /// Returns `None` and sets `UnimplementedEAMode` for modes without an implementation.
    pub fn decode_destination_operand(&mut self) -> Option<*mut u8> {
        self.destination = ptr::null_mut();
        let mode = self.fetch_u8();
        let address = self.decode_mode(mode, DESTINATION_SLOT)?;
        self.destination = address;
        Some(address)
    }

    /// Decodes the second (source) operand at the current program counter.
    pub fn decode_source_operand(&mut self) -> Option<*mut u8> {
        let mode = self.fetch_u8();
        self.decode_mode(mode, SOURCE_SLOT)
    }

    /// Resolves a mode byte whose extension bytes, if any, follow at the program counter.
    /// Immediates are written to the scratch slot `slot` so two operands can be live at once.
    pub(crate) fn decode_mode(&mut self, mode: u8, slot: usize) -> Option<*mut u8> {
        let register = mode & LOW_NIBBLE;
        let size = self.operation_size;

        let address = match EaFamily::from_mode(mode) {
            EaFamily::RegisterDirect => self.registers.gpr_mut(register).as_mut_ptr(),
            EaFamily::FloatRegisterDirect => self.registers.fpr_mut(register).as_mut_ptr(),
            EaFamily::RegisterIndirect => self.registers.gpr(register).ptr(),
            EaFamily::PostIncrement => {
                let reg = self.registers.gpr_mut(register);
                let address = reg.ptr();
                reg.set_ptr(address.wrapping_add(size));
                address
            }
            EaFamily::PostDecrement => {
                let reg = self.registers.gpr_mut(register);
                let address = reg.ptr();
                reg.set_ptr(address.wrapping_sub(size));
                address
            }
            EaFamily::PreIncrement => {
                let reg = self.registers.gpr_mut(register);
                let address = reg.ptr().wrapping_add(size);
                reg.set_ptr(address);
                address
            }
            EaFamily::PreDecrement => {
                let reg = self.registers.gpr_mut(register);
                let address = reg.ptr().wrapping_sub(size);
                reg.set_ptr(address);
                address
            }
            EaFamily::IndirectDisplacement => {
                let displacement = self.fetch_i32();
                self.registers
                    .gpr(register)
                    .ptr()
                    .wrapping_offset(displacement as isize)
            }
            EaFamily::Indexed => self.decode_indexed(register),
            EaFamily::IndexedDisplacement => {
                let indexed = self.decode_indexed(register);
                let displacement = self.fetch_i32();
                indexed.wrapping_offset(displacement as isize)
            }
            EaFamily::Other => self.decode_other(register, slot),
            EaFamily::SameAsDestination if mode == SAME_AS_DESTINATION => {
                if self.destination.is_null() {
                    return self.unimplemented_ea_mode(mode);
                }
                self.destination
            }
            EaFamily::PcIndexed
            | EaFamily::PcIndexedDisplacement
            | EaFamily::SameAsDestination
            | EaFamily::Reserved0
            | EaFamily::Reserved1 => return self.unimplemented_ea_mode(mode),
        };

        Some(address)
    }

    fn decode_indexed(&mut self, submode: u8) -> *mut u8 {
        let pair = self.fetch_u8();
        let index = self.registers.gpr(pair >> 4);
        let value: i64 = match IndexWidth::from_submode(submode) {
            IndexWidth::Byte => i64::from(index.i8()),
            IndexWidth::Word => i64::from(index.i16()),
            IndexWidth::Long => i64::from(index.i32()),
            IndexWidth::Quad => index.i64(),
        };
        let offset = value.wrapping_shl(u32::from(submode & INDEX_SCALE_MASK));

        self.registers
            .gpr(pair & LOW_NIBBLE)
            .ptr()
            .wrapping_offset(offset as isize)
    }

    fn decode_other(&mut self, submode: u8, slot: usize) -> *mut u8 {
        let value = match OtherMode::from_submode(submode) {
            OtherMode::SmallInteger(value) => u64::from(value),
            OtherMode::ImmediateByte => i64::from(self.fetch_i8()) as u64,
            OtherMode::ImmediateWord => i64::from(self.fetch_i16()) as u64,
            OtherMode::ImmediateLong => i64::from(self.fetch_i32()) as u64,
            OtherMode::ImmediateQuad | OtherMode::ImmediateDouble => self.fetch_u64(),
            OtherMode::ImmediateSingle => {
                // the single occupies the first four bytes of the slot
                let mut bytes = [0u8; 8];
                bytes[..4].copy_from_slice(&self.fetch_u32().to_ne_bytes());
                u64::from_ne_bytes(bytes)
            }
            OtherMode::PcDisplacement => {
                // writable only when the program counter came from a mutable buffer
                let displacement = self.fetch_i32();
                return self.pc.wrapping_offset(displacement as isize).cast_mut();
            }
        };

        self.immediate[slot] = value;
        ptr::addr_of_mut!(self.immediate[slot]).cast::<u8>()
    }

    #[cold]
    fn unimplemented_ea_mode(&mut self, mode: u8) -> Option<*mut u8> {
        tracing::debug!(mode, pc = ?self.pc, "unimplemented effective address mode");
        self.status = Status::UnimplementedEAMode;
        None
    }
}
