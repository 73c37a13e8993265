/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::Interpreter;
use mc64k_vm_isa::MARK_REGISTER;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic nanoseconds since the first call in this process.
#[must_use]
pub fn nanotime() -> u64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    u64::try_from(epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Elapsed time and instruction count of one timed invocation.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct RunTiming {
    pub nanoseconds: u64,
    pub instructions: u64,
}

impl RunTiming {
    /// Millions of instructions per second. Zero when nothing was measured.
    #[must_use]
    pub fn mips(&self) -> f64 {
        if self.nanoseconds == 0 {
            return 0.0;
        }
        // instructions per microsecond
        self.instructions as f64 * 1_000.0 / self.nanoseconds as f64
    }
}

impl Display for RunTiming {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} instructions in {} ns, {:.2} MIPS",
            self.instructions,
            self.nanoseconds,
            self.mips()
        )
    }
}

impl Interpreter {
    #[inline]
    pub(crate) fn execute_mark(&mut self) {
        self.registers.gpr_mut(MARK_REGISTER).set_u64(nanotime());
    }
}
