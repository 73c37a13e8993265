/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use std::fmt::{Display, Formatter};

const MAJOR_BITS: u32 = 12;
const MINOR_BITS: u32 = 10;
const PATCH_BITS: u32 = 10;

const MAJOR_MAX: u16 = (1 << MAJOR_BITS) - 1;
const MINOR_MAX: u16 = (1 << MINOR_BITS) - 1;
const PATCH_MAX: u16 = (1 << PATCH_BITS) - 1;

/// Version packed into 32 bits as 12 bits major, 10 bits minor and 10 bits patch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SemanticVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl SemanticVersion {
    /// Values are truncated to their field widths.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major: major & MAJOR_MAX,
            minor: minor & MINOR_MAX,
            patch: patch & PATCH_MAX,
        }
    }

    #[must_use]
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            major: (packed >> (MINOR_BITS + PATCH_BITS)) as u16 & MAJOR_MAX,
            minor: (packed >> PATCH_BITS) as u16 & MINOR_MAX,
            patch: packed as u16 & PATCH_MAX,
        }
    }

    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.major as u32) << (MINOR_BITS + PATCH_BITS))
            | ((self.minor as u32) << PATCH_BITS)
            | self.patch as u32
    }

    /// A provider at `self` satisfies a requirement of `required` if the major
    /// versions match and `(minor, patch)` is at least the required pair.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self.major == required.major && (self.minor, self.patch) >= (required.minor, required.patch)
    }
}

impl Display for SemanticVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
