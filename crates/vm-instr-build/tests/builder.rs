/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm_instr_build::{Ea, InstructionBuilder, register_pair};
use mc64k_vm_isa::ea::IndexWidth;
use mc64k_vm_isa::opcode::OpCode;

#[test_log::test]
fn move_with_small_immediate() {
    let mut builder = InstructionBuilder::new();
    builder.move_l(Ea::Reg(0), Ea::int(5));
    builder.hcf(0, 0);
    builder.stop();

    assert_eq!(
        builder.build(),
        vec![OpCode::MoveL as u8, 0x00, 0xC5, OpCode::Hcf as u8, 0, 0, OpCode::Stop as u8]
    );
}

#[test_log::test]
fn shortest_integer_immediates() {
    assert_eq!(Ea::int(8), Ea::Small(8));
    assert_eq!(Ea::int(9), Ea::ImmByte(9));
    assert_eq!(Ea::int(-1), Ea::ImmByte(-1));
    assert_eq!(Ea::int(300), Ea::ImmWord(300));
    assert_eq!(Ea::int(70_000), Ea::ImmLong(70_000));
    assert_eq!(Ea::int(1 << 40), Ea::ImmQuad(1 << 40));
}

#[test_log::test]
fn operand_encodings() {
    let mut out = Vec::new();
    Ea::ImmWord(-2).encode(&mut out);
    assert_eq!(out, vec![0xCA, 0xFE, 0xFF]);

    out.clear();
    Ea::Displacement {
        base: 3,
        displacement: -8,
    }
    .encode(&mut out);
    assert_eq!(out, vec![0x73, 0xF8, 0xFF, 0xFF, 0xFF]);

    out.clear();
    Ea::Indexed {
        base: 8,
        index: 1,
        width: IndexWidth::Quad,
        scale_shift: 3,
    }
    .encode(&mut out);
    assert_eq!(out, vec![0x8F, 0x18]);

    out.clear();
    Ea::SameAsDestination.encode(&mut out);
    assert_eq!(out, vec![0xD0]);
}

#[test_log::test]
fn forward_and_backward_labels() {
    let mut builder = InstructionBuilder::new();
    let top = builder.here();
    let done = builder.create_label();
    builder.bra_b(done); // 0..2
    builder.bra(top); // 2..7
    builder.bind(done);
    builder.rts();

    let code = builder.build();
    // bra.b ends at 2, target 7
    assert_eq!(code[1] as i8, 5);
    // bra ends at 7, target 0
    assert_eq!(i32::from_le_bytes([code[3], code[4], code[5], code[6]]), -7);
}

#[test_log::test]
fn register_branch_condition_bytes() {
    let mut builder = InstructionBuilder::new();
    let target = builder.here();
    builder.r_bmc(2, OpCode::BnzL, target);
    builder.r2r_bdc(1, 4, OpCode::BltQ, target);

    let code = builder.build();
    assert_eq!(&code[..3], &[OpCode::RBmc as u8, 2, 8]);
    assert_eq!(&code[7..10], &[OpCode::R2rBdc as u8, register_pair(4, 1), 3]);
}

#[test]
#[should_panic(expected = "is not a monadic branch")]
fn rejects_wrong_branch_kind() {
    let mut builder = InstructionBuilder::new();
    let target = builder.here();
    builder.branch_monadic(OpCode::BeqL, Ea::Reg(0), target);
}
