/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_runtime::prelude::*;
use mc64k_vm_instr_build::{Ea, InstructionBuilder};
use mc64k_vm_isa::version::SemanticVersion;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

const HOST_NAME: &str = "Runtime Test Host";
const HOST_VERSION: SemanticVersion = SemanticVersion::new(2, 0, 1);

static SEEN_R0: AtomicU64 = AtomicU64::new(0);
static HOST_COUNTER: u64 = 0;

fn record_r0(interpreter: &mut Interpreter, _function: u8) -> Status {
    SEEN_R0.store(interpreter.registers().gpr(0).u64(), Ordering::SeqCst);
    Status::Initialised
}

fn host_with_vectors(vectors: Vec<HostVector>) -> HostDefinition {
    let exports = [Symbol::new(
        "counter",
        std::ptr::addr_of!(HOST_COUNTER).cast(),
        AccessFlags::READ,
    )]
    .into_iter()
    .collect();
    let imports = [Symbol::unresolved("main", AccessFlags::EXECUTE)]
        .into_iter()
        .collect();
    HostDefinition::new(HOST_NAME, HOST_VERSION, vectors, exports, imports)
}

fn host() -> HostDefinition {
    host_with_vectors(vec![record_r0 as HostVector])
}

/// `move.l #5, r0 ; hcf 0, 0 ; stop` exported as `main`, plus `other` returning at once.
fn write_program(dir: &TempDir, main_name: &str) -> PathBuf {
    let mut builder = InstructionBuilder::new();
    builder.move_l(Ea::Reg(0), Ea::int(5));
    builder.hcf(0, 0);
    builder.stop();
    let other = builder.position() as u32;
    builder.rts();
    let code = builder.build();

    let target = TargetInfo::executable(
        "program",
        SemanticVersion::new(1, 0, 0),
        HOST_NAME,
        SemanticVersion::new(2, 0, 0),
    );
    let mut writer = ObjectWriter::new(target, code);
    writer
        .export(main_name, 0, AccessFlags::EXECUTE)
        .export("other", other, AccessFlags::EXECUTE)
        .import("counter", AccessFlags::READ);

    let path = dir.path().join("program.mc64k");
    writer.write_to(&path).expect("write object file");
    path
}

#[test_log::test]
fn runs_the_host_entry_point() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "main");
    let host = host();

    let mut runtime = Runtime::new(&host, &path, &InterpreterSetup::default()).expect("runtime");
    let status = runtime.invoke("main").expect("main exists");

    assert_eq!(status, Status::CaughtFire);
    assert_eq!(SEEN_R0.load(Ordering::SeqCst), 5);
    assert_eq!(runtime.interpreter().registers().gpr(0).u64(), 5);
}

#[test_log::test]
fn module_imports_point_at_host_exports() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "main");
    let host = host();

    let runtime = Runtime::new(&host, &path, &InterpreterSetup::default()).expect("runtime");
    let counter = runtime
        .executable()
        .imports()
        .find("counter", AccessFlags::READ)
        .expect("imported");
    assert_eq!(counter.address(), std::ptr::addr_of!(HOST_COUNTER).cast::<u8>());
}

#[test_log::test]
fn only_host_imports_can_be_invoked() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "main");
    let host = host();

    let mut runtime = Runtime::new(&host, &path, &InterpreterSetup::default()).expect("runtime");
    assert!(matches!(
        runtime.invoke("other"),
        Err(RuntimeError::MissingEntryPoint(name)) if name == "other"
    ));
}

#[test_log::test]
fn missing_module_export_fails_to_link() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "start");
    let host = host();

    assert!(matches!(
        Runtime::new(&host, &path, &InterpreterSetup::default()),
        Err(RuntimeError::Link(LinkError::Unresolved { .. }))
    ));
}

#[test_log::test]
fn incompatible_host_fails_to_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "main");
    let host = HostDefinition::new(
        HOST_NAME,
        SemanticVersion::new(3, 0, 0),
        vec![],
        SymbolSet::new(),
        SymbolSet::new(),
    );

    assert!(matches!(
        Runtime::new(&host, &path, &InterpreterSetup::default()),
        Err(RuntimeError::Load(_))
    ));
}

#[test_log::test]
fn too_many_vectors_is_a_machine_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "main");
    let host = host_with_vectors(vec![record_r0 as HostVector; 300]);

    assert!(matches!(
        Runtime::new(&host, &path, &InterpreterSetup::default()),
        Err(RuntimeError::Machine(MachineError::TooManyHostVectors { count: 300 }))
    ));
}

#[test_log::test]
fn timed_invocation_counts_instructions() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "main");
    let host = host();
    let setup = InterpreterSetup {
        stats_enabled: true,
        ..InterpreterSetup::default()
    };

    let mut runtime = Runtime::new(&host, &path, &setup).expect("runtime");
    let (status, timing) = runtime.invoke_timed("main").expect("main exists");
    assert_eq!(status, Status::CaughtFire);
    assert_eq!(timing.instructions, 3);

    let (_, again) = runtime.invoke_timed("main").expect("main exists");
    assert_eq!(again.instructions, 3);
    assert_eq!(runtime.interpreter().stats().opcodes_executed, 6);
}
