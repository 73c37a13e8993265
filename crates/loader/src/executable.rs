/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::error::{LinkError, LoadError};
use crate::host::HostDefinition;
use crate::reader::ObjectReader;
use crate::symbol::{AccessFlags, Symbol, SymbolSet, parse_records};
use crate::target::{TargetInfo, read_u32};
use mc64k_vm_isa::chunk::ChunkId;
use std::path::Path;
use tracing::info;

/// A loaded object file. Owns its byte code, exported symbols point into it.
#[derive(Debug)]
pub struct Executable {
    file_name: String,
    target: TargetInfo,
    bytecode: Box<[u8]>,
    bytecode_length: usize,
    exports: SymbolSet,
    imports: SymbolSet,
}

impl Executable {
    /// Reads the object file at `path` and checks that `host` can run it.
    ///
    /// Either every chunk is read and valid, or an error is returned and nothing is kept.
    pub fn load(path: &Path, host: &HostDefinition) -> Result<Self, LoadError> {
        let mut reader = ObjectReader::open(path)?;
        let file_name = reader.file_name().to_owned();

        let target_chunk = reader.read_chunk(ChunkId::TARGET)?;
        let target = TargetInfo::parse(target_chunk.body())
            .map_err(|issue| LoadError::in_chunk(&file_name, issue, ChunkId::TARGET))?;
        target
            .check_host(host.name(), host.version())
            .map_err(|issue| LoadError::in_chunk(&file_name, issue, ChunkId::TARGET))?;

        let imports_chunk = reader.read_chunk(ChunkId::IMPORTS)?;
        let exports_chunk = reader.read_chunk(ChunkId::EXPORTS)?;
        let bytecode_chunk = reader.read_chunk(ChunkId::BYTECODE)?;
        drop(reader);

        let bytecode_length = bytecode_chunk.length;
        let bytecode = bytecode_chunk.data.into_boxed_slice();

        let imports = parse_imports(imports_chunk.body())
            .map_err(|issue| LoadError::in_chunk(&file_name, issue, ChunkId::IMPORTS))?;
        let exports = parse_exports(exports_chunk.body(), &bytecode[..bytecode_length])
            .map_err(|issue| LoadError::in_chunk(&file_name, issue, ChunkId::EXPORTS))?;

        info!(
            file = %file_name,
            target = target.name(),
            bytecode = bytecode_length,
            imports = imports.len(),
            exports = exports.len(),
            "executable loaded"
        );

        Ok(Self {
            file_name,
            target,
            bytecode,
            bytecode_length,
            exports,
            imports,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn target(&self) -> &TargetInfo {
        &self.target
    }

    #[must_use]
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode[..self.bytecode_length]
    }

    #[must_use]
    pub const fn exports(&self) -> &SymbolSet {
        &self.exports
    }

    #[must_use]
    pub const fn imports(&self) -> &SymbolSet {
        &self.imports
    }

    /// Resolves the module's imports against the symbols `host` exports.
    pub fn link_imports(&mut self, host: &HostDefinition) -> Result<(), LinkError> {
        self.imports.link_against(host.exports())
    }

    /// Resolves a copy of the host's imports against what this module exports.
    pub fn resolve_host_imports(&self, host: &HostDefinition) -> Result<SymbolSet, LinkError> {
        let mut imports = host.imports().clone();
        imports.link_against(&self.exports)?;
        Ok(imports)
    }

    /// Address of an exported symbol that can be executed.
    ///
    /// The byte code is read-only once loaded; programs run from it must not write
    /// through PC-relative destinations.
    #[must_use]
    pub fn entry_point(&self, identifier: &str) -> Option<*const u8> {
        self.exports
            .find(identifier, AccessFlags::EXECUTE)
            .map(Symbol::address)
    }
}

fn parse_imports(body: &[u8]) -> Result<SymbolSet, String> {
    let mut cursor = 0;
    let count = read_u32(body, &mut cursor)? as usize;
    let records = parse_records(&body[cursor..], count)?;

    Ok(records
        .into_iter()
        .map(|(name, access)| Symbol::unresolved(name, access))
        .collect())
}

/// Export records carry byte code offsets, stored ahead of the name records.
fn parse_exports(body: &[u8], bytecode: &[u8]) -> Result<SymbolSet, String> {
    let mut cursor = 0;
    let count = read_u32(body, &mut cursor)? as usize;

    let mut offsets = Vec::with_capacity(count.min(body.len() / 4));
    for _ in 0..count {
        offsets.push(read_u32(body, &mut cursor)? as usize);
    }

    let records = parse_records(&body[cursor..], count)?;

    offsets
        .into_iter()
        .zip(records)
        .map(|(offset, (name, access))| {
            if offset >= bytecode.len() {
                return Err(format!(
                    "export `{name}` at offset {offset} is outside {} bytes of byte code",
                    bytecode.len()
                ));
            }
            Ok(Symbol::new(name, bytecode[offset..].as_ptr(), access))
        })
        .collect()
}
