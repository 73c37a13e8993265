/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::MachineError;
use std::alloc;

pub const STACK_ALIGNMENT: usize = 8;

/// Machine stack. Zero filled on creation, grows down from [`Stack::top`].
pub struct Stack {
    memory: *mut u8,
    layout: alloc::Layout,
}

impl Stack {
    pub fn new(requested_size: usize) -> Result<Self, MachineError> {
        let size = requested_size.next_multiple_of(STACK_ALIGNMENT).max(STACK_ALIGNMENT);
        let layout = alloc::Layout::from_size_align(size, STACK_ALIGNMENT)
            .map_err(|_| MachineError::OutOfMemory { requested: size })?;

        let memory = unsafe { alloc::alloc_zeroed(layout) };
        if memory.is_null() {
            return Err(MachineError::OutOfMemory { requested: size });
        }

        Ok(Self { memory, layout })
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.layout.size()
    }

    #[must_use]
    pub const fn base(&self) -> *mut u8 {
        self.memory
    }

    /// One past the highest stack byte, the initial stack pointer.
    #[must_use]
    pub fn top(&self) -> *mut u8 {
        self.memory.wrapping_add(self.layout.size())
    }

    #[must_use]
    pub fn contains(&self, address: *const u8) -> bool {
        let address = address.addr();
        address >= self.memory.addr() && address <= self.top().addr()
    }

    /// Bytes from `from` up to the top of the stack, or an empty slice if `from` is outside.
    #[must_use]
    pub fn live_bytes(&self, from: *const u8) -> &[u8] {
        if !self.contains(from) {
            return &[];
        }
        let offset = from.addr() - self.memory.addr();
        unsafe {
            std::slice::from_raw_parts(self.memory.add(offset), self.layout.size() - offset)
        }
    }
}

impl Drop for Stack {
    fn drop(&mut self) {
        unsafe {
            alloc::dealloc(self.memory, self.layout);
        }
    }
}
