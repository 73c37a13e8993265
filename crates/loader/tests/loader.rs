/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_loader::prelude::*;
use mc64k_loader::{LinkError, ObjectReader};
use mc64k_vm_isa::chunk::{ChunkId, FILE_MAGIC, aligned_size};
use mc64k_vm_isa::version::SemanticVersion;
use std::path::Path;
use tempfile::TempDir;

const HOST_NAME: &str = "Test Host";
const HOST_VERSION: SemanticVersion = SemanticVersion::new(1, 2, 0);

static HOST_DATA: [u8; 4] = [1, 2, 3, 4];

fn host() -> HostDefinition {
    let exports = [
        Symbol::new("data", HOST_DATA.as_ptr(), AccessFlags::READ | AccessFlags::WRITE),
        Symbol::new("code", HOST_DATA.as_ptr(), AccessFlags::READ),
    ]
    .into_iter()
    .collect();
    let imports = [Symbol::unresolved("main", AccessFlags::EXECUTE)]
        .into_iter()
        .collect();
    HostDefinition::new(HOST_NAME, HOST_VERSION, vec![], exports, imports)
}

fn program() -> Vec<u8> {
    vec![0x08, 0x07, 0x07, 0x08, 0x07]
}

fn writer(target: TargetInfo) -> ObjectWriter {
    let mut writer = ObjectWriter::new(target, program());
    writer
        .export("main", 0, AccessFlags::READ | AccessFlags::EXECUTE)
        .export("helper", 3, AccessFlags::EXECUTE)
        .import("data", AccessFlags::READ);
    writer
}

fn executable_target(host_version: SemanticVersion, host_name: &str) -> TargetInfo {
    TargetInfo::executable("demo", SemanticVersion::new(0, 1, 0), host_name, host_version)
}

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write object file");
    path
}

/// Lays out raw chunk bodies the way the object format does, without any validation.
fn raw_object(chunks: &[(ChunkId, Vec<u8>)]) -> Vec<u8> {
    let mut offset = 8 + 16 + chunks.len() * 16;
    let mut manifest = Vec::new();
    for (id, body) in chunks {
        manifest.extend_from_slice(&id.0.to_le_bytes());
        manifest.extend_from_slice(&(offset as i64).to_le_bytes());
        offset += 16 + aligned_size(body.len());
    }

    let mut out = FILE_MAGIC.to_vec();
    for (id, body) in std::iter::once(&(ChunkId::MANIFEST, manifest)).chain(chunks) {
        out.extend_from_slice(&id.0.to_le_bytes());
        out.extend_from_slice(&(body.len() as i64).to_le_bytes());
        out.extend_from_slice(body);
        out.resize(out.len() + aligned_size(body.len()) - body.len(), 0);
    }
    out
}

fn load(path: &Path) -> Result<Executable, LoadError> {
    Executable::load(path, &host())
}

#[test_log::test]
fn loads_a_well_formed_executable() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("demo.mc64k");
    writer(executable_target(HOST_VERSION, HOST_NAME))
        .write_to(&path)
        .expect("write");

    let executable = load(&path).expect("loads");
    assert_eq!(executable.bytecode(), program().as_slice());
    assert_eq!(executable.target().name(), "demo");
    assert_eq!(executable.exports().len(), 2);
    assert_eq!(executable.imports().len(), 1);

    let main = executable.entry_point("main").expect("main is executable");
    assert_eq!(main, executable.bytecode().as_ptr());
    let helper = executable.entry_point("helper").expect("helper is executable");
    assert_eq!(helper, unsafe { executable.bytecode().as_ptr().add(3) });

    let import = executable.imports().iter().next().expect("one import");
    assert_eq!(import.identifier(), "data");
    assert!(!import.is_resolved());
}

#[test_log::test]
fn manifest_lists_every_chunk() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = writer(executable_target(HOST_VERSION, HOST_NAME)).to_bytes();
    let path = write(&dir, "demo.mc64k", &bytes);

    let mut reader = ObjectReader::open(&path).expect("opens");
    let ids: Vec<ChunkId> = reader.manifest().iter().map(|entry| entry.chunk).collect();
    for required in ChunkId::REQUIRED {
        assert!(ids.contains(&required), "{required} missing");
    }

    let chunk = reader.read_chunk(ChunkId::BYTECODE).expect("byte code");
    assert_eq!(chunk.length, 5);
    assert_eq!(chunk.data.len(), 8);
    assert_eq!(chunk.body(), program().as_slice());
}

#[test_log::test]
fn missing_file_is_a_load_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = load(&dir.path().join("nothing.mc64k")).expect_err("no file");
    assert!(err.issue.starts_with("could not open"));
    assert_eq!(err.chunk_id, None);
}

#[test_log::test]
fn bad_magic_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let mut bytes = writer(executable_target(HOST_VERSION, HOST_NAME)).to_bytes();
    bytes[7] = b'Y';
    let path = write(&dir, "bad.mc64k", &bytes);

    let err = load(&path).expect_err("bad magic");
    assert!(err.issue.contains("magic"));
    assert_eq!(err.chunk_id, None);
}

#[test_log::test]
fn truncated_manifest_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = writer(executable_target(HOST_VERSION, HOST_NAME)).to_bytes();
    let path = write(&dir, "short.mc64k", &bytes[..40]);

    let err = load(&path).expect_err("truncated");
    assert_eq!(err.chunk(), Some(ChunkId::MANIFEST));
}

#[test_log::test]
fn partial_manifest_entry_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let mut bytes = FILE_MAGIC.to_vec();
    bytes.extend_from_slice(&ChunkId::MANIFEST.0.to_le_bytes());
    bytes.extend_from_slice(&20i64.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 24]);
    let path = write(&dir, "ragged.mc64k", &bytes);

    let err = load(&path).expect_err("ragged manifest");
    assert_eq!(err.chunk(), Some(ChunkId::MANIFEST));
    assert!(err.to_string().contains("whole number of entries"));
}

#[test_log::test]
fn missing_chunk_names_the_chunk() {
    let dir = TempDir::new().expect("temp dir");
    let mut target = Vec::new();
    target.extend_from_slice(&0u32.to_le_bytes());
    target.extend_from_slice(&1u32.to_le_bytes());
    target.extend_from_slice(&SemanticVersion::new(0, 1, 0).packed().to_le_bytes());
    target.extend_from_slice(b"lib\0");

    let bytes = raw_object(&[
        (ChunkId::TARGET, target),
        (ChunkId::BYTECODE, program()),
        (ChunkId::EXPORTS, 0u32.to_le_bytes().to_vec()),
    ]);
    let path = write(&dir, "partial.mc64k", &bytes);

    let err = load(&path).expect_err("no import chunk");
    assert_eq!(err.chunk(), Some(ChunkId::IMPORTS));
    assert!(err.to_string().contains("Imported"));
}

#[test_log::test]
fn newer_host_requirement_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("newer.mc64k");
    writer(executable_target(SemanticVersion::new(1, 3, 0), HOST_NAME))
        .write_to(&path)
        .expect("write");

    let err = load(&path).expect_err("host too old");
    assert_eq!(err.chunk(), Some(ChunkId::TARGET));
}

#[test_log::test]
fn other_major_version_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("major.mc64k");
    writer(executable_target(SemanticVersion::new(0, 9, 0), HOST_NAME))
        .write_to(&path)
        .expect("write");

    assert!(load(&path).is_err());
}

#[test_log::test]
fn older_minor_requirement_is_accepted() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("older.mc64k");
    writer(executable_target(SemanticVersion::new(1, 1, 7), HOST_NAME))
        .write_to(&path)
        .expect("write");

    assert!(load(&path).is_ok());
}

#[test_log::test]
fn host_name_must_match() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("name.mc64k");
    writer(executable_target(HOST_VERSION, "Other Host"))
        .write_to(&path)
        .expect("write");

    let err = load(&path).expect_err("wrong host");
    assert!(err.issue.contains("Other Host"));
}

#[test_log::test]
fn library_targets_skip_host_validation() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("lib.mc64k");
    writer(TargetInfo::library("lib", SemanticVersion::new(7, 0, 0)))
        .write_to(&path)
        .expect("write");

    let executable = load(&path).expect("libraries load anywhere");
    assert!(!executable.target().is_executable());
    assert_eq!(executable.target().host_requirement(), None);
}

#[test_log::test]
fn export_offset_outside_the_byte_code_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let mut writer = ObjectWriter::new(executable_target(HOST_VERSION, HOST_NAME), program());
    writer.export("main", 5, AccessFlags::EXECUTE);
    let path = write(&dir, "offset.mc64k", &writer.to_bytes());

    let err = load(&path).expect_err("offset out of range");
    assert_eq!(err.chunk(), Some(ChunkId::EXPORTS));
}

#[test_log::test]
fn symbol_records_accept_a_bare_flags_byte() {
    let dir = TempDir::new().expect("temp dir");
    let mut target = Vec::new();
    executable_target_bytes(&mut target);

    let mut imports = 3u32.to_le_bytes().to_vec();
    imports.extend_from_slice(b"data\x01");
    imports.extend_from_slice(b"code\0\x01");
    imports.extend_from_slice(b"data\x00");

    let bytes = raw_object(&[
        (ChunkId::TARGET, target),
        (ChunkId::BYTECODE, program()),
        (ChunkId::EXPORTS, 0u32.to_le_bytes().to_vec()),
        (ChunkId::IMPORTS, imports),
    ]);
    let path = write(&dir, "bare.mc64k", &bytes);

    let executable = load(&path).expect("loads");
    let records: Vec<(&str, AccessFlags)> = executable
        .imports()
        .iter()
        .map(|symbol| (symbol.identifier(), symbol.access()))
        .collect();
    assert_eq!(
        records,
        [
            ("data", AccessFlags::READ),
            ("code", AccessFlags::READ),
            ("data", AccessFlags::empty()),
        ]
    );
}

fn executable_target_bytes(out: &mut Vec<u8>) {
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&SemanticVersion::new(0, 1, 0).packed().to_le_bytes());
    out.extend_from_slice(&HOST_VERSION.packed().to_le_bytes());
    out.extend_from_slice(b"demo\0");
    out.extend_from_slice(HOST_NAME.as_bytes());
    out.push(0);
}

#[test_log::test]
fn linking_copies_the_provider_address() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("link.mc64k");
    writer(executable_target(HOST_VERSION, HOST_NAME))
        .write_to(&path)
        .expect("write");

    let host = host();
    let mut executable = Executable::load(&path, &host).expect("loads");
    executable.link_imports(&host).expect("data is exported");

    let import = executable.imports().iter().next().expect("one import");
    assert!(import.is_resolved());
    assert_eq!(import.address(), HOST_DATA.as_ptr());

    let host_imports = executable
        .resolve_host_imports(&host)
        .expect("main is exported");
    let main = host_imports.find("main", AccessFlags::EXECUTE).expect("main");
    assert_eq!(main.address(), executable.bytecode().as_ptr());
}

#[test_log::test]
fn linking_requires_a_superset_of_the_requested_flags() {
    let provider: SymbolSet = [Symbol::new("code", HOST_DATA.as_ptr(), AccessFlags::READ)]
        .into_iter()
        .collect();
    let mut consumer: SymbolSet = [Symbol::unresolved(
        "code",
        AccessFlags::READ | AccessFlags::EXECUTE,
    )]
    .into_iter()
    .collect();

    assert_eq!(
        consumer.link_against(&provider),
        Err(LinkError::Unresolved {
            identifier: "code".to_string(),
            requested: AccessFlags::READ | AccessFlags::EXECUTE,
        })
    );
}

#[test_log::test]
fn linking_stops_at_the_first_unresolved_symbol() {
    let provider: SymbolSet = [Symbol::new("b", HOST_DATA.as_ptr(), AccessFlags::all())]
        .into_iter()
        .collect();
    let mut consumer: SymbolSet = [
        Symbol::unresolved("a", AccessFlags::READ),
        Symbol::unresolved("b", AccessFlags::READ),
    ]
    .into_iter()
    .collect();

    assert!(consumer.link_against(&provider).is_err());
    assert!(consumer.iter().all(|symbol| !symbol.is_resolved()));
}

#[test_log::test]
fn host_without_the_entry_point_export_fails_to_link() {
    let dir = TempDir::new().expect("temp dir");
    let mut writer = ObjectWriter::new(executable_target(HOST_VERSION, HOST_NAME), program());
    writer.export("main", 0, AccessFlags::READ);
    let path = write(&dir, "noexec.mc64k", &writer.to_bytes());

    let host = host();
    let executable = Executable::load(&path, &host).expect("loads");
    assert!(matches!(
        executable.resolve_host_imports(&host),
        Err(LinkError::Unresolved { ref identifier, .. }) if identifier == "main"
    ));
}

#[test_log::test]
fn errors_render_the_chunk_name() {
    let err = LoadError::in_chunk("demo.mc64k", "bad", ChunkId::BYTECODE);
    assert_eq!(err.to_string(), "demo.mc64k: bad (chunk ByteCode)");
    assert_eq!(
        LoadError::new("demo.mc64k", "gone").to_string(),
        "demo.mc64k: gone"
    );
    assert_eq!(
        format!("{}", AccessFlags::READ | AccessFlags::EXECUTE),
        "r-x"
    );
}
