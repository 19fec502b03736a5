//! Curated encodings checked against the Intel opcode maps.

use std::ops::ControlFlow;

use ia32dis_core::register::x86;
use ia32dis_core::{
    BranchKind, FloatOp, Instruction, InstructionKind, Operand, Register, RtlOperation, Symbol,
    SymbolTable,
};
use ia32dis_disasm::{DecoderConfig, Disassembler, Ia32Disassembler};

fn decode(bytes: &[u8]) -> Instruction {
    let decoded = Ia32Disassembler::new()
        .decode_instruction(bytes, 0x1000)
        .expect("decodes");
    assert_eq!(decoded.size, decoded.instruction.size);
    decoded.instruction
}

fn text(bytes: &[u8]) -> String {
    decode(bytes).to_string()
}

#[test]
fn add_register_register() {
    let insn = decode(&[0x00, 0xC1]);
    assert_eq!(insn.mnemonic, "addb");
    assert_eq!(insn.kind, InstructionKind::Arithmetic(RtlOperation::Add));
    assert_eq!(insn.size, 2);
    // ModR/M 0xC1: reg = 0 (al) is the source, rm = 1 (cl) the destination.
    assert_eq!(insn.operands, [Operand::reg(x86::CL), Operand::reg(x86::AL)]);
    assert_eq!(insn.to_string(), "addb %al,%cl");
}

#[test]
fn alu_rows_carry_operations() {
    let cases: &[(&[u8], &str, InstructionKind)] = &[
        (&[0x01, 0xD8], "addl %ebx,%eax", InstructionKind::Arithmetic(RtlOperation::Add)),
        (&[0x09, 0xD8], "orl %ebx,%eax", InstructionKind::Logical(RtlOperation::Or)),
        (&[0x11, 0xD8], "adcl %ebx,%eax", InstructionKind::Arithmetic(RtlOperation::AddWithCarry)),
        (&[0x19, 0xD8], "sbbl %ebx,%eax", InstructionKind::Arithmetic(RtlOperation::SubWithBorrow)),
        (&[0x21, 0xD8], "andl %ebx,%eax", InstructionKind::Logical(RtlOperation::And)),
        (&[0x29, 0xD8], "subl %ebx,%eax", InstructionKind::Arithmetic(RtlOperation::Sub)),
        (&[0x31, 0xD8], "xorl %ebx,%eax", InstructionKind::Logical(RtlOperation::Xor)),
        (&[0x39, 0xD8], "cmpl %ebx,%eax", InstructionKind::Arithmetic(RtlOperation::Compare)),
    ];
    for (bytes, expected, kind) in cases {
        let insn = decode(bytes);
        assert_eq!(&insn.to_string(), expected);
        assert_eq!(&insn.kind, kind, "{expected}");
    }
}

#[test]
fn accumulator_immediates() {
    assert_eq!(text(&[0x04, 0x7F]), "addb $0x7f,%al");
    assert_eq!(text(&[0x05, 0x78, 0x56, 0x34, 0x12]), "addl $0x12345678,%eax");
    assert_eq!(text(&[0x66, 0x05, 0x34, 0x12]), "addw $0x1234,%ax");
}

#[test]
fn operand_size_prefix_toggles_widths() {
    let wide = decode(&[0xB8, 0x78, 0x56, 0x34, 0x12]);
    let narrow = decode(&[0x66, 0xB8, 0x34, 0x12]);
    assert_eq!(wide.mnemonic, "movl");
    assert_eq!(narrow.mnemonic, "movw");
    assert_eq!(wide.size, 5);
    assert_eq!(narrow.size, 4);
    assert_eq!(wide.dest(), Some(&Operand::reg(x86::EAX)));
    assert_eq!(narrow.dest(), Some(&Operand::reg(x86::AX)));
    assert_eq!(narrow.to_string(), "movw $0x1234,%ax");
}

#[test]
fn sib_with_disp32() {
    let insn = decode(&[0x8B, 0x84, 0x81, 0x10, 0x00, 0x00, 0x00]);
    assert_eq!(insn.kind, InstructionKind::MoveLoad);
    assert_eq!(insn.size, 7);
    let src = insn.source().and_then(Operand::as_memory).expect("memory source");
    assert_eq!(src.base, Some(x86::ECX));
    assert_eq!(src.index, Some(x86::EAX));
    assert_eq!(src.scale, 4);
    assert_eq!(src.displacement, 0x10);
    assert_eq!(insn.to_string(), "movl 0x10(%ecx,%eax,4),%eax");
}

#[test]
fn absolute_and_sixteen_bit_addressing() {
    assert_eq!(text(&[0xA1, 0x00, 0x90, 0x04, 0x08]), "movl 0x8049000,%eax");
    assert_eq!(text(&[0x8B, 0x05, 0x00, 0x90, 0x04, 0x08]), "movl 0x8049000,%eax");
    // 67 8B 00: mov (%bx,%si),%eax
    let insn = decode(&[0x67, 0x8B, 0x00]);
    let src = insn.source().and_then(Operand::as_memory).expect("memory source");
    assert_eq!(src.base, Some(x86::BX));
    assert_eq!(src.index, Some(x86::SI));
    assert_eq!(insn.size, 3);
}

#[test]
fn x87_memory_and_register_forks() {
    let reg = decode(&[0xD9, 0xC0]);
    let mem = decode(&[0xD9, 0x00]);
    assert_eq!(reg.kind, InstructionKind::Float(FloatOp::Load));
    assert_eq!(mem.kind, InstructionKind::Float(FloatOp::Load));
    assert_eq!(reg.operands, [Operand::reg(Register::st(0))]);
    assert!(mem.operands[0].is_memory());
    assert_ne!(reg.mnemonic, mem.mnemonic);
    assert_eq!(mem.to_string(), "flds (%eax)");
}

#[test]
fn x87_arithmetic() {
    let insn = decode(&[0xDC, 0x45, 0x08]);
    assert_eq!(insn.mnemonic, "faddl");
    assert_eq!(
        insn.kind,
        InstructionKind::Float(FloatOp::Arithmetic(RtlOperation::Add))
    );
    assert_eq!(text(&[0xD8, 0xC1]), "fadd %st(1),%st(0)");
    assert_eq!(text(&[0xDE, 0xE9]), "fsubp %st(0),%st(1)");
}

#[test]
fn sse_move_shapes() {
    let reg = decode(&[0xF3, 0x0F, 0x10, 0xC1]);
    let load = decode(&[0xF3, 0x0F, 0x10, 0x00]);
    let store = decode(&[0xF3, 0x0F, 0x11, 0x00]);
    assert_eq!(reg.kind, InstructionKind::Move);
    assert_eq!(load.kind, InstructionKind::MoveLoad);
    assert_eq!(store.kind, InstructionKind::MoveStore);
    assert_eq!(reg.to_string(), "movss %xmm1,%xmm0");
    assert_eq!(store.to_string(), "movss %xmm0,(%eax)");
}

#[test]
fn sse_arithmetic_and_logic() {
    let addsd = decode(&[0xF2, 0x0F, 0x58, 0xC1]);
    assert_eq!(addsd.kind, InstructionKind::Arithmetic(RtlOperation::Add));
    assert_eq!(addsd.to_string(), "addsd %xmm1,%xmm0");
    let pxor = decode(&[0x66, 0x0F, 0xEF, 0xC0]);
    assert_eq!(pxor.kind, InstructionKind::Logical(RtlOperation::Xor));
    assert_eq!(pxor.to_string(), "pxor %xmm0,%xmm0");
    let mmx = decode(&[0x0F, 0xEF, 0xC0]);
    assert_eq!(mmx.to_string(), "pxor %mm0,%mm0");
}

#[test]
fn shifts_and_rotates() {
    let shl = decode(&[0xC1, 0xE0, 0x04]);
    assert_eq!(shl.kind, InstructionKind::Shift(RtlOperation::ShiftLeft));
    assert_eq!(shl.to_string(), "shll $0x4,%eax");
    let rol = decode(&[0xD1, 0xC0]);
    assert_eq!(rol.kind, InstructionKind::Rotate(RtlOperation::RotateLeft));
    assert_eq!(rol.to_string(), "roll $0x1,%eax");
    let sar = decode(&[0xD3, 0xF8]);
    assert_eq!(sar.to_string(), "sarl %cl,%eax");
}

#[test]
fn branches_resolve_targets() {
    let jmp = decode(&[0xEB, 0xFE]);
    assert_eq!(jmp.kind, InstructionKind::Branch(BranchKind::Jump));
    assert_eq!(jmp.branch_target(0x1000), Some(0x1000));

    let jz = decode(&[0x0F, 0x84, 0x10, 0x00, 0x00, 0x00]);
    assert!(jz.is_conditional());
    assert_eq!(jz.size, 6);
    assert_eq!(jz.branch_target(0x1000), Some(0x1016));

    let symbols: SymbolTable = [Symbol::new("main", 0x2000, 0x40)].into_iter().collect();
    let call = decode(&[0xE8, 0xFB, 0x0F, 0x00, 0x00]);
    assert_eq!(call.render(0x1000, &symbols), "call 0x2000 <main>");
}

#[test]
fn string_instructions_with_rep() {
    assert_eq!(text(&[0xF3, 0xA5]), "rep movsl %ds:(%esi),%es:(%edi)");
    assert_eq!(text(&[0xF3, 0xA6]), "repz cmpsb %es:(%edi),%ds:(%esi)");
    assert_eq!(text(&[0xF2, 0xAE]), "repnz scasb %es:(%edi),%al");
}

#[test]
fn lock_prefix_renders() {
    assert_eq!(text(&[0xF0, 0x01, 0x08]), "lock addl %ecx,(%eax)");
}

#[test]
fn system_instructions() {
    // Control, debug and test register moves number both registers by `mod`.
    assert_eq!(text(&[0x0F, 0x22, 0xC0]), "movl %ebx,%cr3");
    assert_eq!(text(&[0x0F, 0x21, 0xF8]), "movl %db3,%ebx");
    assert_eq!(text(&[0x0F, 0x20, 0x00]), "movl %cr0,%eax");
    assert_eq!(text(&[0x0F, 0xA2]), "cpuid");
    assert_eq!(text(&[0x8C, 0xD8]), "movw %ds,%ax");
}

#[test]
fn system_register_number_comes_from_mod() {
    for (modrm, number) in [(0x00u8, 0u8), (0x47, 1), (0xB8, 2), (0xFF, 3)] {
        let insn = decode(&[0x0F, 0x20, modrm]);
        assert_eq!(insn.size, 3, "{modrm:#x}");
        assert_eq!(insn.operands[1], Operand::reg(Register::control(number)));
        assert_eq!(insn.operands[0], Operand::reg(Register::general(number, 32)));
    }
}

#[test]
fn memory_immediate_move_is_store() {
    let insn = decode(&[0xC7, 0x00, 0x01, 0x00, 0x00, 0x00]);
    assert!(insn.is_move());
    assert_eq!(insn.kind, InstructionKind::MoveStore);
    assert!(insn.dest().is_some_and(Operand::is_memory));
    assert_eq!(insn.to_string(), "movl $0x1,(%eax)");
    assert_eq!(decode(&[0x66, 0xC7, 0x00, 0x34, 0x12]).to_string(), "movw $0x1234,(%eax)");
}

#[test]
fn x87_register_map_boundary_is_bf() {
    let below = decode(&[0xD9, 0xBE, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(below.to_string(), "fnstcw (%esi)");
    assert_eq!(below.size, 6);

    let at = decode(&[0xD9, 0xBF, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(at.mnemonic, "fcos");
    assert_eq!(at.size, 2);
    assert_eq!(text(&[0xDC, 0xBF]), "fdiv %st(0),%st(7)");
}

#[test]
fn far_pointer_offset_follows_address_size() {
    let wide = decode(&[0x66, 0xEA, 0x78, 0x56, 0x34, 0x12, 0x08, 0x00]);
    assert_eq!(wide.size, 8);
    assert_eq!(wide.to_string(), "ljmp $0x8,$0x12345678");

    let narrow = decode(&[0x67, 0x9A, 0x34, 0x12, 0x10, 0x00]);
    assert_eq!(narrow.size, 6);
    assert!(narrow.is_call());
    assert_eq!(narrow.to_string(), "lcall $0x10,$0x1234");
}

#[test]
fn sign_extension_mnemonics_follow_operand_size() {
    assert_eq!(text(&[0x98]), "cwtl");
    assert_eq!(text(&[0x66, 0x98]), "cbtw");
    assert_eq!(text(&[0x99]), "cltd");
    assert_eq!(text(&[0x66, 0x99]), "cwtd");
}

#[test]
fn undefined_encodings_are_illegal() {
    for bytes in [&[0xF1][..], &[0xD6][..], &[0x0F, 0x04][..], &[0x0F, 0xFF][..]] {
        let insn = decode(bytes);
        assert!(insn.is_illegal(), "{bytes:02x?}");
        assert_eq!(insn.size, 1, "{bytes:02x?}");
    }
    // Nested holes keep the bytes read so far.
    let grp = decode(&[0x8F, 0xC8]);
    assert!(grp.is_illegal());
    assert_eq!(grp.size, 2);
}

#[test]
fn stream_continues_past_illegal() {
    let disasm = Ia32Disassembler::with_config(DecoderConfig::new().with_start_pc(0x400));
    let mut seen = Vec::new();
    let summary = disasm
        .decode_stream(&[0x90, 0xF1, 0xC3], &mut |pc: u64, insn: Instruction| -> ControlFlow<()> {
            seen.push((pc, insn.mnemonic));
            ControlFlow::Continue(())
        })
        .expect("stream");
    assert_eq!(summary.instructions, 3);
    assert_eq!(
        seen,
        [
            (0x400, "nop".to_string()),
            (0x401, "(bad)".to_string()),
            (0x402, "ret".to_string()),
        ]
    );
}

#[test]
fn disassemble_block_matches_stream() {
    let code = [0x55, 0x89, 0xE5, 0x83, 0xEC, 0x10, 0xC9, 0xC3];
    let disasm = Ia32Disassembler::with_config(DecoderConfig::new().with_start_pc(0x2000));
    let stream = disasm.disassemble(&code).expect("stream");
    let block: Vec<(u64, Instruction)> = disasm
        .disassemble_block(&code, 0x2000)
        .into_iter()
        .collect::<Result<_, _>>()
        .expect("block");
    assert_eq!(stream, block);
    assert_eq!(stream.last().map(|(pc, _)| *pc), Some(0x2007));
}
