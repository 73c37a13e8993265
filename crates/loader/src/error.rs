/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::symbol::AccessFlags;
use mc64k_vm_isa::chunk::ChunkId;
use thiserror::Error;

/// Anything that stops an object file from becoming an [`crate::Executable`].
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{file_name}: {issue}{}", chunk_suffix(.chunk_id))]
pub struct LoadError {
    pub file_name: String,
    pub issue: String,
    pub chunk_id: Option<u64>,
}

fn chunk_suffix(chunk_id: &Option<u64>) -> String {
    chunk_id.map_or_else(String::new, |id| format!(" (chunk {})", ChunkId(id)))
}

impl LoadError {
    pub fn new(file_name: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            issue: issue.into(),
            chunk_id: None,
        }
    }

    pub fn in_chunk(file_name: impl Into<String>, issue: impl Into<String>, chunk: ChunkId) -> Self {
        Self {
            file_name: file_name.into(),
            issue: issue.into(),
            chunk_id: Some(chunk.0),
        }
    }

    #[must_use]
    pub fn chunk(&self) -> Option<ChunkId> {
        self.chunk_id.map(ChunkId)
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum LinkError {
    #[error("unresolved symbol `{identifier}` (requires {requested})")]
    Unresolved {
        identifier: String,
        requested: AccessFlags,
    },
}
