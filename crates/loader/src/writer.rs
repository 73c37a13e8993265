/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::reader::{CHUNK_HEADER_SIZE, MANIFEST_ENTRY_SIZE};
use crate::symbol::{AccessFlags, write_record};
use crate::target::TargetInfo;
use mc64k_vm_isa::chunk::{ChunkId, FILE_MAGIC, aligned_size};
use std::io;
use std::path::Path;
use tracing::debug;

/// Produces object files in the layout [`crate::Executable::load`] reads: the file magic,
/// the manifest, then the target, byte code, export and import chunks.
pub struct ObjectWriter {
    target: TargetInfo,
    bytecode: Vec<u8>,
    exports: Vec<(String, u32, AccessFlags)>,
    imports: Vec<(String, AccessFlags)>,
}

impl ObjectWriter {
    #[must_use]
    pub const fn new(target: TargetInfo, bytecode: Vec<u8>) -> Self {
        Self {
            target,
            bytecode,
            exports: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Exports `name` at byte code `offset`.
    pub fn export(&mut self, name: impl Into<String>, offset: u32, access: AccessFlags) -> &mut Self {
        self.exports.push((name.into(), offset, access));
        self
    }

    pub fn import(&mut self, name: impl Into<String>, access: AccessFlags) -> &mut Self {
        self.imports.push((name.into(), access));
        self
    }

    fn chunk_bodies(&self) -> [(ChunkId, Vec<u8>); 4] {
        let mut target = Vec::new();
        self.target.encode(&mut target);

        let mut exports = Vec::new();
        exports.extend_from_slice(&(self.exports.len() as u32).to_le_bytes());
        for (_, offset, _) in &self.exports {
            exports.extend_from_slice(&offset.to_le_bytes());
        }
        for (name, _, access) in &self.exports {
            write_record(&mut exports, name, *access);
        }

        let mut imports = Vec::new();
        imports.extend_from_slice(&(self.imports.len() as u32).to_le_bytes());
        for (name, access) in &self.imports {
            write_record(&mut imports, name, *access);
        }

        [
            (ChunkId::TARGET, target),
            (ChunkId::BYTECODE, self.bytecode.clone()),
            (ChunkId::EXPORTS, exports),
            (ChunkId::IMPORTS, imports),
        ]
    }

    /// # Panics
    /// If a symbol name can not be encoded.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let bodies = self.chunk_bodies();

        let manifest_length = bodies.len() * MANIFEST_ENTRY_SIZE;
        let mut offset = FILE_MAGIC.len() + CHUNK_HEADER_SIZE + aligned_size(manifest_length);

        let mut manifest = Vec::with_capacity(manifest_length);
        for (id, body) in &bodies {
            manifest.extend_from_slice(&id.0.to_le_bytes());
            manifest.extend_from_slice(&(offset as i64).to_le_bytes());
            offset += CHUNK_HEADER_SIZE + aligned_size(body.len());
        }

        let mut out = Vec::with_capacity(offset);
        out.extend_from_slice(&FILE_MAGIC);
        write_chunk(&mut out, ChunkId::MANIFEST, &manifest);
        for (id, body) in &bodies {
            write_chunk(&mut out, *id, body);
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let bytes = self.to_bytes();
        debug!(path = %path.display(), size = bytes.len(), "writing object file");
        std::fs::write(path, bytes)
    }
}

fn write_chunk(out: &mut Vec<u8>, id: ChunkId, body: &[u8]) {
    out.extend_from_slice(&id.0.to_le_bytes());
    out.extend_from_slice(&(body.len() as i64).to_le_bytes());
    out.extend_from_slice(body);
    out.resize(out.len() + aligned_size(body.len()) - body.len(), 0);
}
