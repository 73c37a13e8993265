/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
pub use crate::{
    Interpreter, InterpreterSetup, MachineError, Stats, Status,
    host::HostVector,
    registers::{FloatRegister, Register, RegisterFile},
    timing::{RunTiming, nanotime},
};
