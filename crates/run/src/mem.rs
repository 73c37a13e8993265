/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm::prelude::*;
use std::alloc::{self, Layout};
use std::ptr;
use tracing::trace;

pub const ALLOCATE: u8 = 0;
pub const FREE: u8 = 1;

// every block starts with its total size so it can be freed from the pointer alone
const HEADER_SIZE: usize = 8;
const BLOCK_ALIGNMENT: usize = 8;

/// Zero filled block of `size` bytes, or null if it can not be allocated.
#[must_use]
pub fn allocate(size: u64) -> *mut u8 {
    let Some(total) = usize::try_from(size)
        .ok()
        .and_then(|size| size.checked_add(HEADER_SIZE))
    else {
        return ptr::null_mut();
    };
    let Ok(layout) = Layout::from_size_align(total, BLOCK_ALIGNMENT) else {
        return ptr::null_mut();
    };

    unsafe {
        let base = alloc::alloc_zeroed(layout);
        if base.is_null() {
            return base;
        }
        base.cast::<usize>().write(total);
        base.add(HEADER_SIZE)
    }
}

/// Releases a block from [`allocate`]. Null is ignored.
///
/// # Safety
/// `block` must be null or come from [`allocate`] and not have been released before.
pub unsafe fn release(block: *mut u8) {
    if block.is_null() {
        return;
    }
    unsafe {
        let base = block.sub(HEADER_SIZE);
        let total = base.cast::<usize>().read();
        alloc::dealloc(base, Layout::from_size_align_unchecked(total, BLOCK_ALIGNMENT));
    }
}

/// `ALLOCATE` takes the size in `r0` and returns the block in `r8`, `FREE` releases `r8`.
pub fn mem_vector(interpreter: &mut Interpreter, function: u8) -> Status {
    let registers = interpreter.registers_mut();
    match function {
        ALLOCATE => {
            let size = registers.gpr(0).u64();
            let block = allocate(size);
            trace!(size, ?block, "allocate");
            registers.gpr_mut(8).set_ptr(block);
        }
        FREE => {
            let block = registers.gpr(8).ptr();
            trace!(?block, "free");
            unsafe { release(block) };
            registers.gpr_mut(8).set_ptr(ptr::null::<u8>());
        }
        _ => return Status::UnknownHostCall,
    }
    Status::Initialised
}
