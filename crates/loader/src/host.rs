/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::symbol::SymbolSet;
use mc64k_vm::host::HostVector;
use mc64k_vm_isa::version::SemanticVersion;

/// Everything a native application offers to, and expects from, the byte code it runs.
/// Built once at startup and only read afterwards.
pub struct HostDefinition {
    name: String,
    version: SemanticVersion,
    vectors: Vec<HostVector>,
    exports: SymbolSet,
    imports: SymbolSet,
}

impl HostDefinition {
    pub fn new(
        name: impl Into<String>,
        version: SemanticVersion,
        vectors: Vec<HostVector>,
        exports: SymbolSet,
        imports: SymbolSet,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            vectors,
            exports,
            imports,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn version(&self) -> SemanticVersion {
        self.version
    }

    #[must_use]
    pub fn vectors(&self) -> &[HostVector] {
        &self.vectors
    }

    /// Symbols the host provides to byte code.
    #[must_use]
    pub const fn exports(&self) -> &SymbolSet {
        &self.exports
    }

    /// Symbols the host needs from byte code, such as its entry points.
    #[must_use]
    pub const fn imports(&self) -> &SymbolSet {
        &self.imports
    }
}
