/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use std::fmt::{Display, Formatter};

/// Eight byte file magic at offset zero.
pub const FILE_MAGIC: [u8; 8] = *b"MC64000X";

/// Byte alignment of every chunk body on disk.
pub const CHUNK_ALIGNMENT: usize = 8;

/// Chunk identifier, eight ASCII bytes read as a little endian `u64`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ChunkId(pub u64);

impl ChunkId {
    pub const MANIFEST: Self = Self::from_tag(*b"Manifest");
    pub const TARGET: Self = Self::from_tag(*b"TrgtInfo");
    pub const BYTECODE: Self = Self::from_tag(*b"ByteCode");
    pub const EXPORTS: Self = Self::from_tag(*b"Exported");
    pub const IMPORTS: Self = Self::from_tag(*b"Imported");

    /// Chunks a loadable image must list in its manifest.
    pub const REQUIRED: [Self; 4] = [Self::TARGET, Self::BYTECODE, Self::EXPORTS, Self::IMPORTS];

    #[must_use]
    pub const fn from_tag(tag: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(tag))
    }

    #[must_use]
    pub const fn tag(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl Display for ChunkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = self.tag();
        if tag.iter().all(u8::is_ascii_graphic) {
            // all bytes are ascii, so this is valid utf8
            write!(f, "{}", String::from_utf8_lossy(&tag))
        } else {
            write!(f, "0x{:016X}", self.0)
        }
    }
}

/// Rounds a chunk body length up to the on-disk alignment.
#[must_use]
pub const fn aligned_size(size: usize) -> usize {
    (size + CHUNK_ALIGNMENT - 1) & !(CHUNK_ALIGNMENT - 1)
}
