/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
pub mod chunk;
pub mod ea;
pub mod opcode;
pub mod prelude;
pub mod version;

/// Number of general purpose registers. Register indices wrap with [`GPR_MASK`].
pub const GPR_COUNT: usize = 16;
pub const GPR_MASK: u8 = (GPR_COUNT - 1) as u8;

/// Number of floating point registers. Register indices wrap with [`FPR_MASK`].
pub const FPR_COUNT: usize = 16;
pub const FPR_MASK: u8 = (FPR_COUNT - 1) as u8;

/// `r15` is the stack pointer by convention.
pub const STACK_POINTER: u8 = 15;

/// `MARK` writes its timestamp here.
pub const MARK_REGISTER: u8 = 14;

/// Hard limit of the host call vector table (the vector index is a single byte).
pub const MAX_HOST_VECTORS: usize = 256;

/// Host call ABI: integer parameters and return values.
pub const ABI_INT_REGISTERS: [u8; 3] = [0, 1, 2];
/// Host call ABI: pointer parameters and return values.
pub const ABI_PTR_REGISTERS: [u8; 3] = [8, 9, 10];
/// Host call ABI: floating point parameters and return values (FPR indices).
pub const ABI_FLOAT_REGISTERS: [u8; 3] = [0, 1, 2];
