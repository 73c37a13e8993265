/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm::prelude::*;
use std::io::Write;
use tracing::trace;

/// Sub-functions of the IO vector. Integers are read from `r0`, floats from `fp0` and
/// strings from the pointer in `r8`.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoFunction {
    PrintString,
    PrintByte,
    PrintWord,
    PrintLong,
    PrintQuad,
    PrintSingle,
    PrintDouble,
    Newline,
}

impl TryFrom<u8> for IoFunction {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::PrintString,
            1 => Self::PrintByte,
            2 => Self::PrintWord,
            3 => Self::PrintLong,
            4 => Self::PrintQuad,
            5 => Self::PrintSingle,
            6 => Self::PrintDouble,
            7 => Self::Newline,
            _ => return Err(value),
        })
    }
}

/// Text the IO sub-function `function` prints for the current registers.
#[must_use]
pub fn format_io(registers: &RegisterFile, function: IoFunction) -> String {
    match function {
        IoFunction::PrintString => {
            let string = registers.gpr(8);
            if string.ptr().is_null() {
                "(null)".to_string()
            } else {
                // byte code hands over NUL terminated strings in r8
                unsafe { string.c_str() }.to_string_lossy().into_owned()
            }
        }
        IoFunction::PrintByte => registers.gpr(0).i8().to_string(),
        IoFunction::PrintWord => registers.gpr(0).i16().to_string(),
        IoFunction::PrintLong => registers.gpr(0).i32().to_string(),
        IoFunction::PrintQuad => registers.gpr(0).i64().to_string(),
        IoFunction::PrintSingle => registers.fpr(0).f32().to_string(),
        IoFunction::PrintDouble => registers.fpr(0).f64().to_string(),
        IoFunction::Newline => "\n".to_string(),
    }
}

pub fn io_vector(interpreter: &mut Interpreter, function: u8) -> Status {
    let Ok(function) = IoFunction::try_from(function) else {
        trace!(function, "unknown io function");
        return Status::UnknownHostCall;
    };

    let text = format_io(interpreter.registers(), function);
    let mut out = std::io::stdout().lock();
    if out.write_all(text.as_bytes()).and_then(|()| out.flush()).is_err() {
        return Status::CaughtFire;
    }

    Status::Initialised
}
