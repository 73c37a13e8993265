/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::error::LoadError;
use mc64k_vm_isa::chunk::{ChunkId, FILE_MAGIC, aligned_size};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

pub(crate) const CHUNK_HEADER_SIZE: usize = 16;
pub(crate) const MANIFEST_ENTRY_SIZE: usize = 16;

/// Where a chunk starts in the file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ManifestEntry {
    pub chunk: ChunkId,
    pub offset: i64,
}

/// A chunk body read from disk. The buffer is padded to the chunk alignment, `length`
/// is the length stored in the chunk header.
#[derive(Debug)]
pub struct Chunk {
    pub id: ChunkId,
    pub length: usize,
    pub data: Vec<u8>,
}

impl Chunk {
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.data[..self.length]
    }
}

/// An open object file with its manifest loaded. The file handle is released when the
/// reader is dropped, whether or not loading succeeded.
pub struct ObjectReader {
    file_name: String,
    file: File,
    file_size: u64,
    manifest: Vec<ManifestEntry>,
}

impl ObjectReader {
    /// Opens `path`, checks the file magic and reads the manifest.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let file_name = path.display().to_string();
        let file = File::open(path)
            .map_err(|err| LoadError::new(&file_name, format!("could not open: {err}")))?;
        let file_size = file
            .metadata()
            .map_err(|err| LoadError::new(&file_name, format!("could not stat: {err}")))?
            .len();

        let mut reader = Self {
            file_name,
            file,
            file_size,
            manifest: Vec::new(),
        };

        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic, None)?;
        if magic != FILE_MAGIC {
            return Err(LoadError::new(
                &reader.file_name,
                "not an object file (bad magic)",
            ));
        }

        let (id, length) = reader.read_chunk_header(None)?;
        if id != ChunkId::MANIFEST {
            return Err(LoadError::in_chunk(
                &reader.file_name,
                "expected the manifest after the file magic",
                id,
            ));
        }

        if length % MANIFEST_ENTRY_SIZE != 0 {
            return Err(LoadError::in_chunk(
                &reader.file_name,
                format!("manifest length {length} is not a whole number of entries"),
                ChunkId::MANIFEST,
            ));
        }

        let mut body = vec![0u8; aligned_size(length)];
        reader.read_exact(&mut body, Some(ChunkId::MANIFEST))?;

        reader.manifest = body[..length]
            .chunks_exact(MANIFEST_ENTRY_SIZE)
            .map(|entry| {
                let mut id = [0u8; 8];
                let mut offset = [0u8; 8];
                id.copy_from_slice(&entry[..8]);
                offset.copy_from_slice(&entry[8..]);
                ManifestEntry {
                    chunk: ChunkId(u64::from_le_bytes(id)),
                    offset: i64::from_le_bytes(offset),
                }
            })
            .collect();

        debug!(
            file = %reader.file_name,
            entries = reader.manifest.len(),
            "manifest read"
        );

        Ok(reader)
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    /// Finds `id` in the manifest and reads its body.
    pub fn read_chunk(&mut self, id: ChunkId) -> Result<Chunk, LoadError> {
        let Some(entry) = self.manifest.iter().find(|entry| entry.chunk == id).copied() else {
            return Err(LoadError::in_chunk(
                &self.file_name,
                "chunk missing from manifest",
                id,
            ));
        };

        let offset = u64::try_from(entry.offset)
            .map_err(|_| LoadError::in_chunk(&self.file_name, "negative chunk offset", id))?;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|err| LoadError::in_chunk(&self.file_name, format!("seek failed: {err}"), id))?;

        let (found, length) = self.read_chunk_header(Some(id))?;
        if found != id {
            return Err(LoadError::in_chunk(
                &self.file_name,
                format!("manifest points at chunk {found}"),
                id,
            ));
        }

        let mut data = vec![0u8; aligned_size(length)];
        self.read_exact(&mut data, Some(id))?;

        debug!(chunk = %id, offset, length, "chunk read");

        Ok(Chunk { id, length, data })
    }

    fn read_chunk_header(&mut self, expected: Option<ChunkId>) -> Result<(ChunkId, usize), LoadError> {
        let mut header = [0u8; CHUNK_HEADER_SIZE];
        self.read_exact(&mut header, expected)?;

        let mut id = [0u8; 8];
        let mut length = [0u8; 8];
        id.copy_from_slice(&header[..8]);
        length.copy_from_slice(&header[8..]);
        let id = ChunkId(u64::from_le_bytes(id));
        let length = i64::from_le_bytes(length);

        let chunk = expected.unwrap_or(id);
        let length = u64::try_from(length)
            .ok()
            .filter(|&length| length <= self.file_size)
            .ok_or_else(|| {
                LoadError::in_chunk(&self.file_name, format!("invalid chunk length {length}"), chunk)
            })?;

        Ok((id, length as usize))
    }

    fn read_exact(&mut self, buffer: &mut [u8], chunk: Option<ChunkId>) -> Result<(), LoadError> {
        self.file.read_exact(buffer).map_err(|err| LoadError {
            file_name: self.file_name.clone(),
            issue: format!("read failed: {err}"),
            chunk_id: chunk.map(|id| id.0),
        })
    }
}
