/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
pub mod io;
pub mod mem;

use mc64k_loader::{AccessFlags, HostDefinition, Symbol, SymbolSet};
use mc64k_vm::host::HostVector;
use mc64k_vm_isa::version::SemanticVersion;

pub const HOST_NAME: &str = "Standard Test Host";
pub const HOST_VERSION: SemanticVersion = SemanticVersion::new(1, 0, 0);

/// The one entry point the host runs.
pub const ENTRY_POINT: &str = "main";

pub const IO_VECTOR: u8 = 0;
pub const MEM_VECTOR: u8 = 1;

/// Host definition with the IO and MEM vectors. Exports nothing and imports `main`.
#[must_use]
pub fn standard_test_host() -> HostDefinition {
    let vectors: Vec<HostVector> = vec![io::io_vector, mem::mem_vector];
    let imports = [Symbol::unresolved(ENTRY_POINT, AccessFlags::EXECUTE)]
        .into_iter()
        .collect();

    HostDefinition::new(HOST_NAME, HOST_VERSION, vectors, SymbolSet::new(), imports)
}
