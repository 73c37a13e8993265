/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
pub use crate::{Runtime, RuntimeError};

pub use mc64k_loader::prelude::*;
pub use mc64k_vm::prelude::*;
