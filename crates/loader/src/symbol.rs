/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::error::LinkError;
use bitflags::bitflags;
use std::fmt::{Display, Formatter};
use std::ptr;
use tracing::{error, trace};

bitflags! {
    /// What a symbol may be used for. An import is only satisfied by an export
    /// that grants at least the requested flags.
    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct AccessFlags: u8 {
        const READ = 0b001;
        const WRITE = 0b010;
        const EXECUTE = 0b100;
    }
}

/// Largest byte value a record's flags byte can hold. Symbol names never use these bytes.
pub(crate) const FLAGS_MAX: u8 = AccessFlags::all().bits();

impl Display for AccessFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let letter = |flag: Self, c: char| if self.contains(flag) { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            letter(Self::READ, 'r'),
            letter(Self::WRITE, 'w'),
            letter(Self::EXECUTE, 'x')
        )
    }
}

/// A named address. Imports start out unresolved (null) and get their address from
/// [`SymbolSet::link_against`].
#[derive(Debug, Clone)]
pub struct Symbol {
    identifier: String,
    address: *const u8,
    access: AccessFlags,
}

impl Symbol {
    pub fn unresolved(identifier: impl Into<String>, access: AccessFlags) -> Self {
        Self::new(identifier, ptr::null(), access)
    }

    pub fn new(identifier: impl Into<String>, address: *const u8, access: AccessFlags) -> Self {
        Self {
            identifier: identifier.into(),
            address,
            access,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub const fn address(&self) -> *const u8 {
        self.address
    }

    #[must_use]
    pub const fn access(&self) -> AccessFlags {
        self.access
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.address.is_null()
    }

    /// True if this symbol is called `identifier` and grants every flag in `requested`.
    #[must_use]
    pub fn provides(&self, identifier: &str, requested: AccessFlags) -> bool {
        self.identifier == identifier && self.access.contains(requested)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
}

impl SymbolSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// First symbol named `identifier` that grants at least `requested`.
    #[must_use]
    pub fn find(&self, identifier: &str, requested: AccessFlags) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|symbol| symbol.provides(identifier, requested))
    }

    /// Resolves every symbol in this set against `provider`, copying the provider's
    /// address into each one. Stops at the first symbol that can not be matched.
    pub fn link_against(&mut self, provider: &Self) -> Result<(), LinkError> {
        for symbol in &mut self.symbols {
            let Some(found) = provider.find(&symbol.identifier, symbol.access) else {
                error!(
                    identifier = %symbol.identifier,
                    requested = %symbol.access,
                    "unresolved symbol"
                );
                return Err(LinkError::Unresolved {
                    identifier: symbol.identifier.clone(),
                    requested: symbol.access,
                });
            };
            trace!(
                identifier = %symbol.identifier,
                address = ?found.address,
                access = %found.access,
                "resolved"
            );
            symbol.address = found.address;
        }
        Ok(())
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Reads `count` `{name, flags}` records.
///
/// A name runs until the first byte that fits in the flags mask. Names are written
/// NUL terminated ahead of the flags byte, but a bare flags byte directly after the
/// name is accepted as well.
pub(crate) fn parse_records(
    mut bytes: &[u8],
    count: usize,
) -> Result<Vec<(String, AccessFlags)>, String> {
    let mut records = Vec::with_capacity(count);

    for index in 0..count {
        let Some(length) = bytes.iter().position(|&byte| byte <= FLAGS_MAX) else {
            return Err(format!("symbol record {index} is truncated"));
        };
        if length == 0 {
            return Err(format!("symbol record {index} has an empty name"));
        }
        let name = std::str::from_utf8(&bytes[..length])
            .map_err(|_| format!("symbol record {index} is not valid utf-8"))?;

        let mut rest = &bytes[length..];
        if rest[0] == 0 && rest.get(1).is_some_and(|&next| next <= FLAGS_MAX) {
            rest = &rest[1..];
        }
        let access = AccessFlags::from_bits_truncate(rest[0]);
        bytes = &rest[1..];

        trace!(name, %access, "symbol record");
        records.push((name.to_owned(), access));
    }

    Ok(records)
}

/// # Panics
/// If a name is empty or contains a byte that could be read as a flags byte.
pub(crate) fn write_record(out: &mut Vec<u8>, name: &str, access: AccessFlags) {
    assert!(
        !name.is_empty() && name.bytes().all(|byte| byte > FLAGS_MAX),
        "symbol name {name:?} can not be encoded"
    );
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.push(access.bits());
}
