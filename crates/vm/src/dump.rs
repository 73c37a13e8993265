/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::Interpreter;
use mc64k_vm_isa::{FPR_COUNT, GPR_COUNT, STACK_POINTER};
use std::io::{self, Write};

/// Number of bytes of the stack shown by [`Interpreter::dump_state`].
pub const STACK_DUMP_SIZE: usize = 64;

impl Interpreter {
    /// Writes the status, program counter, call depth, both register banks and the
    /// top of the stack.
    pub fn dump_state(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "status: {} ({:?})", self.status, self.status)?;
        writeln!(out, "pc: {:p}", self.pc)?;
        writeln!(out, "call depth: {}", self.call_depth)?;

        for index in 0..GPR_COUNT as u8 {
            let register = self.registers.gpr(index);
            writeln!(out, "r{index:<2}: 0x{:016X} {}", register.u64(), register.i64())?;
        }

        for index in 0..FPR_COUNT as u8 {
            let register = self.registers.fpr(index);
            writeln!(out, "fp{index:<2}: {:e} (0x{:016X})", register.f64(), register.bits())?;
        }

        let stack_pointer = self.registers.gpr(STACK_POINTER).ptr();
        let live = self.stack.live_bytes(stack_pointer);
        let shown = &live[..live.len().min(STACK_DUMP_SIZE)];
        writeln!(
            out,
            "stack: {} of {} bytes in use",
            live.len(),
            self.stack.size()
        )?;
        if !shown.is_empty() {
            writeln!(out, "{}", hexify::format_hex(shown))?;
        }

        Ok(())
    }
}
