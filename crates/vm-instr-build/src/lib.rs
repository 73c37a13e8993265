/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm_isa::ea::{EaFamily, IndexWidth, OtherMode, SAME_AS_DESTINATION, index_submode};
use mc64k_vm_isa::opcode::OpCode;
use tracing::trace;

/// Operand encoding. Register numbers are masked to four bits when encoded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Ea {
    Reg(u8),
    FReg(u8),
    Indirect(u8),
    PostInc(u8),
    PostDec(u8),
    PreInc(u8),
    PreDec(u8),
    Displacement {
        base: u8,
        displacement: i32,
    },
    Indexed {
        base: u8,
        index: u8,
        width: IndexWidth,
        scale_shift: u8,
    },
    IndexedDisplacement {
        base: u8,
        index: u8,
        width: IndexWidth,
        scale_shift: u8,
        displacement: i32,
    },
    /// Integer 0-8 stored in the mode byte.
    Small(u8),
    ImmByte(i8),
    ImmWord(i16),
    ImmLong(i32),
    ImmQuad(i64),
    ImmSingle(f32),
    ImmDouble(f64),
    /// Address relative to the end of the displacement.
    PcDisplacement(i32),
    SameAsDestination,
}

impl Ea {
    /// The shortest immediate encoding of `value`.
    #[must_use]
    pub fn int(value: i64) -> Self {
        if (0..=i64::from(mc64k_vm_isa::ea::SMALL_INTEGER_MAX)).contains(&value) {
            Self::Small(value as u8)
        } else if let Ok(byte) = i8::try_from(value) {
            Self::ImmByte(byte)
        } else if let Ok(word) = i16::try_from(value) {
            Self::ImmWord(word)
        } else if let Ok(long) = i32::try_from(value) {
            Self::ImmLong(long)
        } else {
            Self::ImmQuad(value)
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Reg(reg) => out.push(EaFamily::RegisterDirect.mode(reg)),
            Self::FReg(reg) => out.push(EaFamily::FloatRegisterDirect.mode(reg)),
            Self::Indirect(reg) => out.push(EaFamily::RegisterIndirect.mode(reg)),
            Self::PostInc(reg) => out.push(EaFamily::PostIncrement.mode(reg)),
            Self::PostDec(reg) => out.push(EaFamily::PostDecrement.mode(reg)),
            Self::PreInc(reg) => out.push(EaFamily::PreIncrement.mode(reg)),
            Self::PreDec(reg) => out.push(EaFamily::PreDecrement.mode(reg)),
            Self::Displacement { base, displacement } => {
                out.push(EaFamily::IndirectDisplacement.mode(base));
                out.extend_from_slice(&displacement.to_le_bytes());
            }
            Self::Indexed {
                base,
                index,
                width,
                scale_shift,
            } => {
                out.push(EaFamily::Indexed.mode(index_submode(width, scale_shift)));
                out.push(register_pair(index, base));
            }
            Self::IndexedDisplacement {
                base,
                index,
                width,
                scale_shift,
                displacement,
            } => {
                out.push(EaFamily::IndexedDisplacement.mode(index_submode(width, scale_shift)));
                out.push(register_pair(index, base));
                out.extend_from_slice(&displacement.to_le_bytes());
            }
            Self::Small(value) => {
                assert!(
                    value <= mc64k_vm_isa::ea::SMALL_INTEGER_MAX,
                    "small integer out of range"
                );
                out.push(EaFamily::Other.mode(OtherMode::SmallInteger(value).submode()));
            }
            Self::ImmByte(value) => {
                out.push(EaFamily::Other.mode(OtherMode::ImmediateByte.submode()));
                out.extend_from_slice(&value.to_le_bytes());
            }
            Self::ImmWord(value) => {
                out.push(EaFamily::Other.mode(OtherMode::ImmediateWord.submode()));
                out.extend_from_slice(&value.to_le_bytes());
            }
            Self::ImmLong(value) => {
                out.push(EaFamily::Other.mode(OtherMode::ImmediateLong.submode()));
                out.extend_from_slice(&value.to_le_bytes());
            }
            Self::ImmQuad(value) => {
                out.push(EaFamily::Other.mode(OtherMode::ImmediateQuad.submode()));
                out.extend_from_slice(&value.to_le_bytes());
            }
            Self::ImmSingle(value) => {
                out.push(EaFamily::Other.mode(OtherMode::ImmediateSingle.submode()));
                out.extend_from_slice(&value.to_bits().to_le_bytes());
            }
            Self::ImmDouble(value) => {
                out.push(EaFamily::Other.mode(OtherMode::ImmediateDouble.submode()));
                out.extend_from_slice(&value.to_bits().to_le_bytes());
            }
            Self::PcDisplacement(displacement) => {
                out.push(EaFamily::Other.mode(OtherMode::PcDisplacement.submode()));
                out.extend_from_slice(&displacement.to_le_bytes());
            }
            Self::SameAsDestination => out.push(SAME_AS_DESTINATION),
        }
    }
}

/// `high << 4 | low`.
#[must_use]
pub const fn register_pair(high: u8, low: u8) -> u8 {
    ((high & 0x0F) << 4) | (low & 0x0F)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Label(usize);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum DisplacementWidth {
    Short,
    Long,
}

/// A displacement field waiting for its label to be bound.
#[derive(Debug, Copy, Clone)]
pub struct PatchPosition {
    offset: usize,
    width: DisplacementWidth,
    label: Label,
}

impl PatchPosition {
    /// Displacements are relative to the end of the field, which ends the instruction.
    const fn end(&self) -> usize {
        self.offset
            + match self.width {
                DisplacementWidth::Short => 1,
                DisplacementWidth::Long => 4,
            }
    }
}

/// Appends encoded instructions to a byte vector. Branch targets are labels that can be
/// bound before or after the branch, all displacements are patched in [`Self::build`].
#[derive(Default)]
pub struct InstructionBuilder {
    code: Vec<u8>,
    labels: Vec<Option<usize>>,
    patches: Vec<PatchPosition>,
}

impl InstructionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.code.len()
    }

    pub fn create_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// # Panics
    /// If the label is already bound.
    pub fn bind(&mut self, label: Label) {
        let slot = &mut self.labels[label.0];
        assert!(slot.is_none(), "label {label:?} bound twice");
        *slot = Some(self.code.len());
    }

    /// Creates a label bound to the current position.
    pub fn here(&mut self) -> Label {
        let label = self.create_label();
        self.bind(label);
        label
    }

    #[must_use]
    pub fn label_offset(&self, label: Label) -> Option<usize> {
        self.labels.get(label.0).copied().flatten()
    }

    fn op(&mut self, opcode: OpCode) {
        trace!(offset = self.code.len(), %opcode, "emit");
        self.code.push(opcode as u8);
    }

    fn ea(&mut self, ea: Ea) {
        ea.encode(&mut self.code);
    }

    fn displacement(&mut self, label: Label, width: DisplacementWidth) {
        self.patches.push(PatchPosition {
            offset: self.code.len(),
            width,
            label,
        });
        match width {
            DisplacementWidth::Short => self.code.push(0),
            DisplacementWidth::Long => self.code.extend_from_slice(&[0; 4]),
        }
    }

    pub fn bytes(&mut self, data: &[u8]) {
        self.code.extend_from_slice(data);
    }

    pub fn hcf(&mut self, vector: u8, function: u8) {
        self.op(OpCode::Hcf);
        self.code.push(vector);
        self.code.push(function);
    }

    pub fn bra_b(&mut self, target: Label) {
        self.op(OpCode::BraB);
        self.displacement(target, DisplacementWidth::Short);
    }

    pub fn bra(&mut self, target: Label) {
        self.op(OpCode::Bra);
        self.displacement(target, DisplacementWidth::Long);
    }

    pub fn bsr_b(&mut self, target: Label) {
        self.op(OpCode::BsrB);
        self.displacement(target, DisplacementWidth::Short);
    }

    pub fn bsr(&mut self, target: Label) {
        self.op(OpCode::Bsr);
        self.displacement(target, DisplacementWidth::Long);
    }

    pub fn jmp(&mut self, target: Ea) {
        self.op(OpCode::Jmp);
        self.ea(target);
    }

    pub fn jsr(&mut self, target: Ea) {
        self.op(OpCode::Jsr);
        self.ea(target);
    }

    pub fn rts(&mut self) {
        self.op(OpCode::Rts);
    }

    pub fn stop(&mut self) {
        self.op(OpCode::Stop);
    }

    pub fn mark(&mut self) {
        self.op(OpCode::Mark);
    }

    /// # Panics
    /// If `opcode` is not a compare-to-zero branch.
    pub fn branch_monadic(&mut self, opcode: OpCode, operand: Ea, target: Label) {
        assert!(opcode.monadic_branch().is_some(), "{opcode} is not a monadic branch");
        self.op(opcode);
        self.ea(operand);
        self.displacement(target, DisplacementWidth::Long);
    }

    /// Branches when `first <cc> second`.
    ///
    /// # Panics
    /// If `opcode` is not a two operand branch.
    pub fn branch_dyadic(&mut self, opcode: OpCode, first: Ea, second: Ea, target: Label) {
        assert!(opcode.dyadic_branch().is_some(), "{opcode} is not a dyadic branch");
        self.op(opcode);
        self.ea(first);
        self.ea(second);
        self.displacement(target, DisplacementWidth::Long);
    }

    /// # Panics
    /// If `opcode` is not one of the `BBS`/`BBC` opcodes.
    pub fn branch_bit(&mut self, opcode: OpCode, value: Ea, bit: Ea, target: Label) {
        assert!(
            (OpCode::BbsB as u8..=OpCode::BbcQ as u8).contains(&(opcode as u8)),
            "{opcode} is not a bit branch"
        );
        self.op(opcode);
        self.ea(value);
        self.ea(bit);
        self.displacement(target, DisplacementWidth::Long);
    }

    pub fn dbnz(&mut self, counter: Ea, target: Label) {
        self.op(OpCode::Dbnz);
        self.ea(counter);
        self.displacement(target, DisplacementWidth::Long);
    }

    pub fn r_dbnz(&mut self, register: u8, target: Label) {
        self.op(OpCode::RDbnz);
        self.code.push(register);
        self.displacement(target, DisplacementWidth::Long);
    }

    /// Register form of the monadic branch `condition`, for example `OpCode::BizL`.
    ///
    /// # Panics
    /// If `condition` is not a monadic branch.
    pub fn r_bmc(&mut self, register: u8, condition: OpCode, target: Label) {
        let index = condition
            .monadic_branch()
            .and(condition.condition_index())
            .unwrap_or_else(|| panic!("{condition} is not a monadic branch"));
        self.op(OpCode::RBmc);
        self.code.push(register);
        self.code.push(index);
        self.displacement(target, DisplacementWidth::Long);
    }

    /// Register form of the dyadic branch `condition`, branching when `first <cc> second`.
    ///
    /// # Panics
    /// If `condition` is not a dyadic branch.
    pub fn r2r_bdc(&mut self, first: u8, second: u8, condition: OpCode, target: Label) {
        let index = condition
            .dyadic_branch()
            .and(condition.condition_index())
            .unwrap_or_else(|| panic!("{condition} is not a dyadic branch"));
        self.op(OpCode::R2rBdc);
        self.code.push(register_pair(second, first));
        self.code.push(index);
        self.displacement(target, DisplacementWidth::Long);
    }

    /// Two operand instruction, `dst = dst OP src`.
    pub fn dyadic(&mut self, opcode: OpCode, dst: Ea, src: Ea) {
        self.op(opcode);
        self.ea(dst);
        self.ea(src);
    }

    /// Single operand instruction, modified in place.
    pub fn monadic(&mut self, opcode: OpCode, operand: Ea) {
        self.op(opcode);
        self.ea(operand);
    }

    pub fn move_l(&mut self, dst: Ea, src: Ea) {
        self.dyadic(OpCode::MoveL, dst, src);
    }

    pub fn move_q(&mut self, dst: Ea, src: Ea) {
        self.dyadic(OpCode::MoveQ, dst, src);
    }

    pub fn lea(&mut self, dst: Ea, src: Ea) {
        self.dyadic(OpCode::Lea, dst, src);
    }

    /// `SAVEM`, `LOADM`, `FSAVEM` or `FLOADM`. GPRs use mask bits 0-15, FPRs bits 16-31.
    pub fn register_list(&mut self, opcode: OpCode, operand: Ea, mask: u32) {
        self.op(opcode);
        self.ea(operand);
        self.code.extend_from_slice(&mask.to_le_bytes());
    }

    /// Fast path instruction, `dst = dst OP src` on registers.
    pub fn r2r(&mut self, opcode: OpCode, src: u8, dst: u8) {
        self.op(opcode);
        self.code.push(register_pair(src, dst));
    }

    /// Patches every displacement and returns the code.
    ///
    /// # Panics
    /// If a referenced label was never bound or a short displacement is out of range.
    #[must_use]
    pub fn build(mut self) -> Vec<u8> {
        for patch in &self.patches {
            let target = self.labels[patch.label.0]
                .unwrap_or_else(|| panic!("label {:?} is never bound", patch.label));
            let displacement = target as i64 - patch.end() as i64;
            match patch.width {
                DisplacementWidth::Short => {
                    let short = i8::try_from(displacement).unwrap_or_else(|_| {
                        panic!("displacement {displacement} does not fit in a byte")
                    });
                    self.code[patch.offset] = short as u8;
                }
                DisplacementWidth::Long => {
                    let long = i32::try_from(displacement).unwrap_or_else(|_| {
                        panic!("displacement {displacement} does not fit in 32 bits")
                    });
                    self.code[patch.offset..patch.end()].copy_from_slice(&long.to_le_bytes());
                }
            }
        }
        self.code
    }
}
