/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use crate::registers::RegisterFile;
use crate::stack::Stack;
use mc64k_vm_isa::STACK_POINTER;
use mc64k_vm_isa::opcode::OpCode;
use std::fmt::{Display, Formatter};
use std::ptr;
use thiserror::Error;
use tracing::debug;

#[macro_use]
mod macros;

mod arithmetic;
mod control;
mod data;
pub mod dump;
mod ea;
mod fast;
pub mod host;
mod logical;
pub mod prelude;
pub mod registers;
pub mod stack;
pub mod timing;

/// Machine state. `Running` is the only state in which the dispatch loop keeps fetching.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Status {
    Uninitialised,
    Initialised,
    Running,
    Completed,
    CaughtFire,
    UnimplementedOpcode,
    UnimplementedEAMode,
    UnknownHostCall,
    InvalidEntrypoint,
    DivideByZero,
}

impl Status {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Uninitialised | Self::Initialised | Self::Running)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialised => "uninitialised",
            Self::Initialised => "initialised",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::CaughtFire => "caught fire",
            Self::UnimplementedOpcode => "unimplemented opcode",
            Self::UnimplementedEAMode => "unimplemented effective address mode",
            Self::UnknownHostCall => "unknown host call",
            Self::InvalidEntrypoint => "invalid entry point",
            Self::DivideByZero => "divide by zero",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum MachineError {
    #[error("could not allocate {requested} bytes of machine stack")]
    OutOfMemory { requested: usize },

    #[error("{count} host vectors exceeds the limit of {max}", max = mc64k_vm_isa::MAX_HOST_VECTORS)]
    TooManyHostVectors { count: usize },
}

#[derive(Debug, Clone)]
pub struct InterpreterSetup {
    pub stack_size: usize,
    pub stats_enabled: bool,
}

impl Default for InterpreterSetup {
    fn default() -> Self {
        Self {
            stack_size: 64 * 1024,
            stats_enabled: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub opcodes_executed: u64,
    pub host_calls: u64,
    pub max_call_depth: u32,
}

type HandlerFn = fn(&mut Interpreter);

/// `Fast` handlers can not change the status, so the loop skips the status check after them.
#[derive(Copy, Clone)]
enum Handler {
    Checked(HandlerFn),
    Fast(HandlerFn),
}

pub struct Interpreter {
    registers: RegisterFile,
    pc: *const u8,
    status: Status,
    call_depth: u32,

    // current operand width in bytes, read by the effective address decoder
    operation_size: usize,
    destination: *mut u8,
    immediate: [u64; 2],

    stack: Stack,
    host_vectors: Vec<host::HostVector>,
    handlers: [Handler; 256],

    stats_enabled: bool,
    stats: Stats,
}

impl Interpreter {
    pub fn new(setup: &InterpreterSetup) -> Result<Self, MachineError> {
        let stack = Stack::new(setup.stack_size)?;

        let mut interpreter = Self {
            registers: RegisterFile::default(),
            pc: ptr::null(),
            status: Status::Uninitialised,
            call_depth: 0,
            operation_size: 8,
            destination: ptr::null_mut(),
            immediate: [0; 2],
            stack,
            host_vectors: Vec::new(),
            handlers: [const { Handler::Checked(Self::execute_unimplemented) }; 256],
            stats_enabled: setup.stats_enabled,
            stats: Stats::default(),
        };

        interpreter.install_handlers();
        interpreter.reset_stack_pointer();
        interpreter.status = Status::Initialised;

        debug!(
            stack_size = interpreter.stack.size(),
            stats = setup.stats_enabled,
            "interpreter created"
        );

        Ok(interpreter)
    }

    fn install(&mut self, opcode: OpCode, handler: HandlerFn) {
        self.handlers[opcode as usize] = if opcode.is_fast_path() {
            Handler::Fast(handler)
        } else {
            Handler::Checked(handler)
        };
    }

    fn install_range(&mut self, first: OpCode, last: OpCode, handler: HandlerFn) {
        for value in first as u8..=last as u8 {
            if let Ok(opcode) = OpCode::try_from(value) {
                self.install(opcode, handler);
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn install_handlers(&mut self) {
        // Control
        self.install(OpCode::Hcf, Self::execute_hcf);
        self.install(OpCode::BraB, Self::execute_bra_b);
        self.install(OpCode::Bra, Self::execute_bra);
        self.install(OpCode::BsrB, Self::execute_bsr_b);
        self.install(OpCode::Bsr, Self::execute_bsr);
        self.install(OpCode::Jmp, Self::execute_jmp);
        self.install(OpCode::Jsr, Self::execute_jsr);
        self.install(OpCode::Rts, Self::execute_rts);
        self.install(OpCode::Stop, Self::execute_stop);

        // Conditional branches decode their condition from the opcode byte
        self.install_range(OpCode::BizB, OpCode::FbplD, Self::execute_monadic_branch);
        self.install_range(OpCode::BltB, OpCode::BhiQ, Self::execute_dyadic_branch);
        self.install_range(OpCode::BbsB, OpCode::BbcQ, Self::execute_bit_branch);
        self.install(OpCode::Dbnz, Self::execute_dbnz);
        self.install(OpCode::RDbnz, Self::execute_r_dbnz);
        self.install(OpCode::RBmc, Self::execute_r_bmc);
        self.install(OpCode::R2rBdc, Self::execute_r2r_bdc);

        // Data movement
        self.install(OpCode::MoveB, Self::execute_move_b);
        self.install(OpCode::MoveW, Self::execute_move_w);
        self.install(OpCode::MoveL, Self::execute_move_l);
        self.install(OpCode::MoveQ, Self::execute_move_q);
        self.install(OpCode::FmoveS, Self::execute_fmove_s);
        self.install(OpCode::FmoveD, Self::execute_fmove_d);
        self.install(OpCode::FmovelS, Self::execute_fmovel_s);
        self.install(OpCode::FmoveqS, Self::execute_fmoveq_s);
        self.install(OpCode::FmovelD, Self::execute_fmovel_d);
        self.install(OpCode::FmoveqD, Self::execute_fmoveq_d);
        self.install(OpCode::FmovesL, Self::execute_fmoves_l);
        self.install(OpCode::FmovesQ, Self::execute_fmoves_q);
        self.install(OpCode::FmovedL, Self::execute_fmoved_l);
        self.install(OpCode::FmovedQ, Self::execute_fmoved_q);
        self.install(OpCode::FmovesD, Self::execute_fmoves_d);
        self.install(OpCode::FmovedS, Self::execute_fmoved_s);
        self.install(OpCode::Lea, Self::execute_lea);
        self.install(OpCode::Savem, Self::execute_savem);
        self.install(OpCode::Loadm, Self::execute_loadm);
        self.install(OpCode::Fsavem, Self::execute_fsavem);
        self.install(OpCode::Floadm, Self::execute_floadm);

        // Logical
        self.install(OpCode::AndB, Self::execute_and_b);
        self.install(OpCode::AndW, Self::execute_and_w);
        self.install(OpCode::AndL, Self::execute_and_l);
        self.install(OpCode::AndQ, Self::execute_and_q);
        self.install(OpCode::OrB, Self::execute_or_b);
        self.install(OpCode::OrW, Self::execute_or_w);
        self.install(OpCode::OrL, Self::execute_or_l);
        self.install(OpCode::OrQ, Self::execute_or_q);
        self.install(OpCode::EorB, Self::execute_eor_b);
        self.install(OpCode::EorW, Self::execute_eor_w);
        self.install(OpCode::EorL, Self::execute_eor_l);
        self.install(OpCode::EorQ, Self::execute_eor_q);
        self.install(OpCode::NotB, Self::execute_not_b);
        self.install(OpCode::NotW, Self::execute_not_w);
        self.install(OpCode::NotL, Self::execute_not_l);
        self.install(OpCode::NotQ, Self::execute_not_q);
        self.install(OpCode::LslB, Self::execute_lsl_b);
        self.install(OpCode::LslW, Self::execute_lsl_w);
        self.install(OpCode::LslL, Self::execute_lsl_l);
        self.install(OpCode::LslQ, Self::execute_lsl_q);
        self.install(OpCode::LsrB, Self::execute_lsr_b);
        self.install(OpCode::LsrW, Self::execute_lsr_w);
        self.install(OpCode::LsrL, Self::execute_lsr_l);
        self.install(OpCode::LsrQ, Self::execute_lsr_q);
        self.install(OpCode::AslB, Self::execute_asl_b);
        self.install(OpCode::AslW, Self::execute_asl_w);
        self.install(OpCode::AslL, Self::execute_asl_l);
        self.install(OpCode::AslQ, Self::execute_asl_q);
        self.install(OpCode::AsrB, Self::execute_asr_b);
        self.install(OpCode::AsrW, Self::execute_asr_w);
        self.install(OpCode::AsrL, Self::execute_asr_l);
        self.install(OpCode::AsrQ, Self::execute_asr_q);
        self.install(OpCode::RolB, Self::execute_rol_b);
        self.install(OpCode::RolW, Self::execute_rol_w);
        self.install(OpCode::RolL, Self::execute_rol_l);
        self.install(OpCode::RolQ, Self::execute_rol_q);
        self.install(OpCode::RorB, Self::execute_ror_b);
        self.install(OpCode::RorW, Self::execute_ror_w);
        self.install(OpCode::RorL, Self::execute_ror_l);
        self.install(OpCode::RorQ, Self::execute_ror_q);
        self.install(OpCode::BclrB, Self::execute_bclr_b);
        self.install(OpCode::BclrW, Self::execute_bclr_w);
        self.install(OpCode::BclrL, Self::execute_bclr_l);
        self.install(OpCode::BclrQ, Self::execute_bclr_q);
        self.install(OpCode::BsetB, Self::execute_bset_b);
        self.install(OpCode::BsetW, Self::execute_bset_w);
        self.install(OpCode::BsetL, Self::execute_bset_l);
        self.install(OpCode::BsetQ, Self::execute_bset_q);

        // Bit fields. The remaining field opcodes stay on execute_unimplemented.
        self.install(OpCode::Bfffo, Self::execute_bfffo);
        self.install(OpCode::Bfcnt, Self::execute_bfcnt);

        // Arithmetic
        self.install(OpCode::ExtbW, Self::execute_extb_w);
        self.install(OpCode::ExtbL, Self::execute_extb_l);
        self.install(OpCode::ExtbQ, Self::execute_extb_q);
        self.install(OpCode::ExtwL, Self::execute_extw_l);
        self.install(OpCode::ExtwQ, Self::execute_extw_q);
        self.install(OpCode::ExtlQ, Self::execute_extl_q);
        self.install(OpCode::NegB, Self::execute_neg_b);
        self.install(OpCode::NegW, Self::execute_neg_w);
        self.install(OpCode::NegL, Self::execute_neg_l);
        self.install(OpCode::NegQ, Self::execute_neg_q);
        self.install(OpCode::FnegS, Self::execute_fneg_s);
        self.install(OpCode::FnegD, Self::execute_fneg_d);
        self.install(OpCode::AddB, Self::execute_add_b);
        self.install(OpCode::AddW, Self::execute_add_w);
        self.install(OpCode::AddL, Self::execute_add_l);
        self.install(OpCode::AddQ, Self::execute_add_q);
        self.install(OpCode::FaddS, Self::execute_fadd_s);
        self.install(OpCode::FaddD, Self::execute_fadd_d);
        self.install(OpCode::SubB, Self::execute_sub_b);
        self.install(OpCode::SubW, Self::execute_sub_w);
        self.install(OpCode::SubL, Self::execute_sub_l);
        self.install(OpCode::SubQ, Self::execute_sub_q);
        self.install(OpCode::FsubS, Self::execute_fsub_s);
        self.install(OpCode::FsubD, Self::execute_fsub_d);
        self.install(OpCode::MulsL, Self::execute_muls_l);
        self.install(OpCode::MulsQ, Self::execute_muls_q);
        self.install(OpCode::MuluL, Self::execute_mulu_l);
        self.install(OpCode::MuluQ, Self::execute_mulu_q);
        self.install(OpCode::FmulS, Self::execute_fmul_s);
        self.install(OpCode::FmulD, Self::execute_fmul_d);
        self.install(OpCode::DivsL, Self::execute_divs_l);
        self.install(OpCode::DivsQ, Self::execute_divs_q);
        self.install(OpCode::DivuL, Self::execute_divu_l);
        self.install(OpCode::DivuQ, Self::execute_divu_q);
        self.install(OpCode::FdivS, Self::execute_fdiv_s);
        self.install(OpCode::FdivD, Self::execute_fdiv_d);
        self.install(OpCode::ModsL, Self::execute_mods_l);
        self.install(OpCode::ModsQ, Self::execute_mods_q);
        self.install(OpCode::ModuL, Self::execute_modu_l);
        self.install(OpCode::ModuQ, Self::execute_modu_q);
        self.install(OpCode::FmodS, Self::execute_fmod_s);
        self.install(OpCode::FmodD, Self::execute_fmod_d);

        // Float math
        self.install(OpCode::FsqrtS, Self::execute_fsqrt_s);
        self.install(OpCode::FsqrtD, Self::execute_fsqrt_d);
        self.install(OpCode::FsinS, Self::execute_fsin_s);
        self.install(OpCode::FsinD, Self::execute_fsin_d);
        self.install(OpCode::FcosS, Self::execute_fcos_s);
        self.install(OpCode::FcosD, Self::execute_fcos_d);
        self.install(OpCode::FtanS, Self::execute_ftan_s);
        self.install(OpCode::FtanD, Self::execute_ftan_d);
        self.install(OpCode::FasinS, Self::execute_fasin_s);
        self.install(OpCode::FasinD, Self::execute_fasin_d);
        self.install(OpCode::FacosS, Self::execute_facos_s);
        self.install(OpCode::FacosD, Self::execute_facos_d);
        self.install(OpCode::FatanS, Self::execute_fatan_s);
        self.install(OpCode::FatanD, Self::execute_fatan_d);
        self.install(OpCode::FetoxS, Self::execute_fetox_s);
        self.install(OpCode::FetoxD, Self::execute_fetox_d);
        self.install(OpCode::FlognS, Self::execute_flogn_s);
        self.install(OpCode::FlognD, Self::execute_flogn_d);
        self.install(OpCode::Flog2S, Self::execute_flog2_s);
        self.install(OpCode::Flog2D, Self::execute_flog2_d);
        self.install(OpCode::FtwotoxS, Self::execute_ftwotox_s);
        self.install(OpCode::FtwotoxD, Self::execute_ftwotox_d);

        // Register to register fast path
        self.install(OpCode::R2rMoveL, Self::execute_r2r_move_l);
        self.install(OpCode::R2rMoveQ, Self::execute_r2r_move_q);
        self.install(OpCode::R2rFmoveS, Self::execute_r2r_fmove_s);
        self.install(OpCode::R2rFmoveD, Self::execute_r2r_fmove_d);
        self.install(OpCode::R2rAndQ, Self::execute_r2r_and_q);
        self.install(OpCode::R2rOrQ, Self::execute_r2r_or_q);
        self.install(OpCode::R2rEorQ, Self::execute_r2r_eor_q);
        self.install(OpCode::R2rAddL, Self::execute_r2r_add_l);
        self.install(OpCode::R2rAddQ, Self::execute_r2r_add_q);
        self.install(OpCode::R2rSubL, Self::execute_r2r_sub_l);
        self.install(OpCode::R2rSubQ, Self::execute_r2r_sub_q);
        self.install(OpCode::R2rMulsQ, Self::execute_r2r_muls_q);
        self.install(OpCode::R2rFaddD, Self::execute_r2r_fadd_d);
        self.install(OpCode::R2rFsubD, Self::execute_r2r_fsub_d);
        self.install(OpCode::R2rFmulD, Self::execute_r2r_fmul_d);

        self.install(OpCode::Mark, Self::execute_mark);
    }

    /// Runs from the current program counter until the status leaves `Running`.
    ///
    /// A null program counter is a no-op. The call depth is reset to one for the duration
    /// of the run and restored afterwards, so a host vector can run a nested invocation
    /// without disturbing the outer one. The register file is shared with the outer run.
    pub fn run(&mut self) -> Status {
        if self.pc.is_null() {
            return self.status;
        }

        let outer_call_depth = self.call_depth;
        self.status = Status::Running;
        self.call_depth = 1;

        debug!(pc = ?self.pc, outer_call_depth, "run");

        loop {
            #[cfg(feature = "debug_vm")]
            self.trace_opcode();

            let opcode = self.fetch_u8();
            // operands are only valid for the instruction that decoded them
            self.destination = ptr::null_mut();

            if self.stats_enabled {
                self.stats.opcodes_executed += 1;
            }

            match self.handlers[opcode as usize] {
                Handler::Fast(handler) => handler(self),
                Handler::Checked(handler) => {
                    handler(self);
                    if self.status != Status::Running {
                        break;
                    }
                }
            }
        }

        debug!(status = %self.status, pc = ?self.pc, "run finished");

        self.call_depth = outer_call_depth;
        self.status
    }

    /// Sets the program counter to `entry` and runs. A null entry fails with `InvalidEntrypoint`.
    pub fn invoke(&mut self, entry: *const u8) -> Status {
        if entry.is_null() {
            self.status = Status::InvalidEntrypoint;
            return self.status;
        }
        self.pc = entry;
        self.run()
    }

    /// Runs `code` from its first byte. The slice must contain every byte the program reaches.
    ///
    /// `code` is only borrowed for reading, so the program must not write through a
    /// PC-relative destination. Code that writes into its own buffer is run with
    /// [`Interpreter::invoke`] on a pointer taken from a mutable buffer.
    pub fn execute(&mut self, code: &[u8]) -> Status {
        self.invoke(code.as_ptr())
    }

    #[cfg(feature = "debug_vm")]
    fn trace_opcode(&self) {
        let value = unsafe { *self.pc };
        match OpCode::try_from(value) {
            Ok(opcode) => tracing::trace!(pc = ?self.pc, %opcode, "fetch"),
            Err(err) => tracing::trace!(pc = ?self.pc, %err, "fetch"),
        }
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub const fn program_counter(&self) -> *const u8 {
        self.pc
    }

    pub const fn set_program_counter(&mut self, pc: *const u8) {
        self.pc = pc;
    }

    #[must_use]
    pub const fn call_depth(&self) -> u32 {
        self.call_depth
    }

    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub const fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    #[must_use]
    pub const fn stack(&self) -> &Stack {
        &self.stack
    }

    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// Points `r15` at the top of the machine stack.
    pub fn reset_stack_pointer(&mut self) {
        let top = self.stack.top();
        self.registers.gpr_mut(STACK_POINTER).set_ptr(top);
    }

    /// Width in bytes the effective address decoder uses for increments and decrements.
    pub const fn set_operation_size(&mut self, size: usize) {
        self.operation_size = size;
    }

    #[inline]
    fn fetch_array<const N: usize>(&mut self) -> [u8; N] {
        unsafe {
            let bytes = ptr::read_unaligned(self.pc.cast::<[u8; N]>());
            self.pc = self.pc.add(N);
            bytes
        }
    }

    #[inline]
    fn fetch_u8(&mut self) -> u8 {
        unsafe {
            let value = *self.pc;
            self.pc = self.pc.add(1);
            value
        }
    }

    #[inline]
    fn fetch_i8(&mut self) -> i8 {
        self.fetch_u8() as i8
    }

    #[inline]
    fn fetch_i16(&mut self) -> i16 {
        i16::from_le_bytes(self.fetch_array())
    }

    #[inline]
    fn fetch_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.fetch_array())
    }

    #[inline]
    fn fetch_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.fetch_array())
    }

    #[inline]
    fn fetch_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.fetch_array())
    }

    /// Displacements are relative to the end of the instruction.
    #[inline]
    const fn branch(&mut self, displacement: i32) {
        self.pc = self.pc.wrapping_offset(displacement as isize);
    }

    #[inline]
    fn push_return_address(&mut self) {
        let return_address = self.pc;
        let stack_pointer = self.registers.gpr_mut(STACK_POINTER);
        let slot = stack_pointer.ptr().wrapping_sub(size_of::<u64>());
        stack_pointer.set_ptr(slot);
        unsafe {
            ea::store::<u64>(slot, return_address.expose_provenance() as u64);
        }

        self.call_depth += 1;
        if self.stats_enabled && self.call_depth > self.stats.max_call_depth {
            self.stats.max_call_depth = self.call_depth;
        }
    }

    #[inline]
    fn pop_return_address(&mut self) {
        let stack_pointer = self.registers.gpr_mut(STACK_POINTER);
        let slot = stack_pointer.ptr();
        stack_pointer.set_ptr(slot.wrapping_add(size_of::<u64>()));
        let address = unsafe { ea::load::<u64>(slot) };
        self.pc = ptr::with_exposed_provenance(address as usize);
    }

    fn execute_unimplemented(&mut self) {
        let value = unsafe { *self.pc.sub(1) };
        debug!(opcode = value, pc = ?self.pc, "no handler for opcode");
        self.status = Status::UnimplementedOpcode;
    }
}
