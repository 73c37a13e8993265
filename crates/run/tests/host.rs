/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_run::io::{IoFunction, format_io};
use mc64k_run::mem::{ALLOCATE, FREE};
use mc64k_run::{ENTRY_POINT, HOST_NAME, HOST_VERSION, IO_VECTOR, MEM_VECTOR, standard_test_host};
use mc64k_runtime::prelude::*;
use mc64k_vm_instr_build::{Ea, InstructionBuilder};
use mc64k_vm_isa::opcode::OpCode;
use mc64k_vm_isa::version::SemanticVersion;
use tempfile::TempDir;

#[test_log::test]
fn io_formats_each_width() {
    let mut registers = RegisterFile::default();
    registers.gpr_mut(0).set_i64(-1);
    registers.fpr_mut(0).set_f64(2.5);

    assert_eq!(format_io(&registers, IoFunction::PrintByte), "-1");
    assert_eq!(format_io(&registers, IoFunction::PrintQuad), "-1");
    assert_eq!(format_io(&registers, IoFunction::PrintDouble), "2.5");
    assert_eq!(format_io(&registers, IoFunction::Newline), "\n");

    registers.gpr_mut(0).set_u64(0x0001_0000_0000_0102);
    assert_eq!(format_io(&registers, IoFunction::PrintWord), "258");
    assert_eq!(format_io(&registers, IoFunction::PrintLong), "258");

    registers.fpr_mut(0).set_f32(0.5);
    assert_eq!(format_io(&registers, IoFunction::PrintSingle), "0.5");
}

#[test_log::test]
fn io_prints_the_string_in_r8() {
    let text = c"hello";
    let mut registers = RegisterFile::default();
    assert_eq!(format_io(&registers, IoFunction::PrintString), "(null)");

    registers.gpr_mut(8).set_ptr(text.as_ptr());
    assert_eq!(format_io(&registers, IoFunction::PrintString), "hello");
}

#[test_log::test]
fn unknown_io_function() {
    assert!(IoFunction::try_from(8).is_err());
}

#[test_log::test]
fn memory_blocks_are_usable_and_released() {
    let mut builder = InstructionBuilder::new();
    builder.move_q(Ea::Reg(0), Ea::int(32));
    builder.hcf(MEM_VECTOR, ALLOCATE);
    builder.move_q(Ea::Displacement { base: 8, displacement: 24 }, Ea::int(42));
    builder.move_q(Ea::Reg(1), Ea::Displacement { base: 8, displacement: 24 });
    builder.move_q(Ea::Reg(2), Ea::Indirect(8));
    builder.hcf(MEM_VECTOR, FREE);
    builder.rts();
    let code = builder.build();

    let host = standard_test_host();
    let mut interpreter = Interpreter::new(&InterpreterSetup::default()).expect("interpreter");
    interpreter
        .install_host_vectors(host.vectors())
        .expect("two vectors");

    assert_eq!(interpreter.execute(&code), Status::Completed);
    assert_eq!(interpreter.registers().gpr(1).u64(), 42);
    assert_eq!(interpreter.registers().gpr(2).u64(), 0);
    assert!(interpreter.registers().gpr(8).ptr().is_null());
}

#[test_log::test]
fn unknown_mem_function_stops_the_run() {
    let mut builder = InstructionBuilder::new();
    builder.hcf(MEM_VECTOR, 7);
    builder.rts();
    let code = builder.build();

    let host = standard_test_host();
    let mut interpreter = Interpreter::new(&InterpreterSetup::default()).expect("interpreter");
    interpreter
        .install_host_vectors(host.vectors())
        .expect("two vectors");

    assert_eq!(interpreter.execute(&code), Status::UnknownHostCall);
}

#[test_log::test]
fn runs_main_from_an_object_file() {
    let mut builder = InstructionBuilder::new();
    let loop_start = builder.create_label();
    builder.move_q(Ea::Reg(0), Ea::int(3));
    builder.move_q(Ea::Reg(1), Ea::int(0));
    builder.bind(loop_start);
    builder.r2r(OpCode::R2rAddQ, 0, 1);
    builder.r_dbnz(0, loop_start);
    builder.move_q(Ea::Reg(0), Ea::Reg(1));
    builder.hcf(IO_VECTOR, IoFunction::PrintQuad as u8);
    builder.hcf(IO_VECTOR, IoFunction::Newline as u8);
    builder.rts();
    let code = builder.build();

    let target = TargetInfo::executable("sum", SemanticVersion::new(0, 1, 0), HOST_NAME, HOST_VERSION);
    let mut writer = ObjectWriter::new(target, code);
    writer.export(ENTRY_POINT, 0, AccessFlags::EXECUTE);

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("sum.mc64k");
    writer.write_to(&path).expect("write");

    let host = standard_test_host();
    let mut runtime = Runtime::new(&host, &path, &InterpreterSetup::default()).expect("runtime");
    assert_eq!(runtime.invoke(ENTRY_POINT).expect("main"), Status::Completed);
    assert_eq!(runtime.interpreter().registers().gpr(1).u64(), 6);
}
