/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::{Interpreter, MachineError, Status};
use mc64k_vm_isa::MAX_HOST_VECTORS;
use tracing::trace;

/// Native function reached through `HCF vector, function`.
///
/// The second argument is the sub-function byte. The returned status decides how the
/// interpreter continues:
/// - `Initialised` resumes right after the `HCF` operands, whatever the vector did to the
///   program counter.
/// - anything else becomes the interpreter status, so `Running` continues from the
///   current program counter and a terminal status stops the run.
pub type HostVector = fn(&mut Interpreter, u8) -> Status;

impl Interpreter {
    /// Replaces the host vector table.
    pub fn install_host_vectors(&mut self, vectors: &[HostVector]) -> Result<(), MachineError> {
        if vectors.len() > MAX_HOST_VECTORS {
            return Err(MachineError::TooManyHostVectors {
                count: vectors.len(),
            });
        }
        self.host_vectors.clear();
        self.host_vectors.extend_from_slice(vectors);
        Ok(())
    }

    #[must_use]
    pub fn host_vector_count(&self) -> usize {
        self.host_vectors.len()
    }

    pub(crate) fn execute_hcf(&mut self) {
        let vector = self.fetch_u8();
        let function = self.fetch_u8();
        let resume_pc = self.pc;

        let Some(&host_vector) = self.host_vectors.get(vector as usize) else {
            trace!(vector, function, "unknown host call");
            self.status = Status::UnknownHostCall;
            return;
        };

        if self.stats_enabled {
            self.stats.host_calls += 1;
        }

        let returned = host_vector(self, function);
        trace!(vector, function, status = %returned, "host call");

        if returned == Status::Initialised {
            self.pc = resume_pc;
            self.status = Status::Running;
        } else {
            self.status = returned;
        }
    }
}
