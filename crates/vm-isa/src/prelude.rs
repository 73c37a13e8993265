/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
pub use crate::{
    chunk::ChunkId,
    ea::{EaFamily, IndexWidth, OtherMode},
    opcode::{DyadicCondition, MonadicCondition, OpCode, Width},
    version::SemanticVersion,
};
