/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
pub mod prelude;

use mc64k_loader::{AccessFlags, Executable, HostDefinition, LinkError, LoadError, SymbolSet};
use mc64k_vm::timing::{RunTiming, nanotime};
use mc64k_vm::{Interpreter, InterpreterSetup, MachineError, Status};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error("no entry point named `{0}`")]
    MissingEntryPoint(String),
}

/// An executable linked against a host, with an interpreter ready to run it.
pub struct Runtime<'a> {
    host: &'a HostDefinition,
    executable: Executable,
    entry_points: SymbolSet,
    interpreter: Interpreter,
}

impl<'a> Runtime<'a> {
    /// Loads the object file at `path`, links it both ways against `host` and creates an
    /// interpreter with the host's call vectors installed.
    pub fn new(
        host: &'a HostDefinition,
        path: &Path,
        setup: &InterpreterSetup,
    ) -> Result<Self, RuntimeError> {
        let mut executable = Executable::load(path, host)?;
        executable.link_imports(host)?;
        let entry_points = executable.resolve_host_imports(host)?;

        let mut interpreter = Interpreter::new(setup)?;
        interpreter.install_host_vectors(host.vectors())?;

        info!(
            host = host.name(),
            version = %host.version(),
            file = executable.file_name(),
            vectors = host.vectors().len(),
            "runtime ready"
        );

        Ok(Self {
            host,
            executable,
            entry_points,
            interpreter,
        })
    }

    #[must_use]
    pub const fn host(&self) -> &HostDefinition {
        self.host
    }

    #[must_use]
    pub const fn executable(&self) -> &Executable {
        &self.executable
    }

    #[must_use]
    pub const fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub const fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Runs the entry point `name` from a fresh stack and returns the final status.
    /// `name` must be one of the host's imports.
    pub fn invoke(&mut self, name: &str) -> Result<Status, RuntimeError> {
        let entry = self
            .entry_points
            .find(name, AccessFlags::EXECUTE)
            .map(|symbol| symbol.address())
            .ok_or_else(|| RuntimeError::MissingEntryPoint(name.to_string()))?;

        self.interpreter.reset_stack_pointer();
        let status = self.interpreter.invoke(entry);
        debug!(name, %status, "invoked");

        Ok(status)
    }

    /// Like [`Self::invoke`], also measuring the elapsed time. The instruction count is
    /// only collected when the interpreter was created with statistics enabled.
    pub fn invoke_timed(&mut self, name: &str) -> Result<(Status, RunTiming), RuntimeError> {
        let instructions_before = self.interpreter.stats().opcodes_executed;
        let start = nanotime();
        let status = self.invoke(name)?;
        let nanoseconds = nanotime() - start;

        let timing = RunTiming {
            nanoseconds,
            instructions: self.interpreter.stats().opcodes_executed - instructions_before,
        };
        debug!(name, %timing, "timed invocation");

        Ok((status, timing))
    }
}
