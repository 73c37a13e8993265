/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
mod error;
mod executable;
mod host;
pub mod prelude;
mod reader;
mod symbol;
mod target;
mod writer;

pub use error::{LinkError, LoadError};
pub use executable::Executable;
pub use host::HostDefinition;
pub use reader::{Chunk, ManifestEntry, ObjectReader};
pub use symbol::{AccessFlags, Symbol, SymbolSet};
pub use target::TargetInfo;
pub use writer::ObjectWriter;
