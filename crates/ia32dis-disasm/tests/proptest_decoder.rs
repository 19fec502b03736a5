//! Property-based tests for the IA-32 decoder.
//!
//! These tests verify invariants that hold for arbitrary input:
//! - Stream decoding never panics and always terminates
//! - Instructions tile the buffer without gaps or stalls
//! - Decoding is deterministic
//! - Undefined one-byte opcodes decode to one-byte illegal instructions
//! - The operand-size prefix selects the 16-bit form

use std::ops::ControlFlow;

use proptest::prelude::*;

use ia32dis_core::{Instruction, Operand, RegisterClass};
use ia32dis_disasm::ia32::{lookup, table_fingerprint, OpcodeMap};
use ia32dis_disasm::{DecodeError, DecoderConfig, Disassembler, Ia32Disassembler};

fn collect(disasm: &Ia32Disassembler, bytes: &[u8]) -> (Result<usize, DecodeError>, Vec<(u64, Instruction)>) {
    let mut out = Vec::new();
    let result = disasm
        .decode_stream(bytes, &mut |pc: u64, insn: Instruction| -> ControlFlow<()> {
            out.push((pc, insn));
            ControlFlow::Continue(())
        })
        .map(|summary| summary.instructions);
    (result, out)
}

/// One-byte opcodes that are neither prefixes nor table entries.
fn undefined_one_byte_opcodes() -> Vec<u8> {
    (0..=255u8)
        .filter(|&b| ia32dis_core::Prefixes::from_byte(b).is_none())
        .filter(|&b| b != 0x0F && lookup(OpcodeMap::OneByte, b).is_none())
        .collect()
}

// =============================================================================
// Stream properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(5000))]

    /// Instructions start where the previous one ended; only the final one may
    /// run past the end of the buffer.
    #[test]
    fn stream_tiles_buffer(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let disasm = Ia32Disassembler::new();
        let (result, out) = collect(&disasm, &bytes);
        prop_assert_eq!(result, Ok(out.len()));

        let mut expected_pc = 0u64;
        for (i, (pc, insn)) in out.iter().enumerate() {
            prop_assert_eq!(*pc, expected_pc);
            prop_assert!(insn.size >= 1, "instruction must consume a byte");
            expected_pc += insn.size as u64;
            if i + 1 < out.len() {
                prop_assert!(expected_pc < bytes.len() as u64);
            }
        }
        prop_assert!(expected_pc >= bytes.len() as u64);
    }

    /// Strict mode never visits an instruction that runs past the end.
    #[test]
    fn strict_stream_never_overshoots(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let disasm = Ia32Disassembler::with_config(DecoderConfig::strict());
        let (result, out) = collect(&disasm, &bytes);
        let end: usize = out.iter().map(|(_, insn)| insn.size).sum();
        prop_assert!(end <= bytes.len());
        match result {
            Ok(_) => prop_assert_eq!(end, bytes.len()),
            Err(err) => prop_assert!(matches!(err, DecodeError::Truncated { .. }), "{}", err),
        }
    }

    /// Decoding the same bytes twice yields the same instructions.
    #[test]
    fn decode_is_deterministic(bytes in prop::collection::vec(any::<u8>(), 1..32)) {
        let disasm = Ia32Disassembler::new();
        let first = disasm.decode_instruction(&bytes, 0x1000);
        let second = disasm.decode_instruction(&bytes, 0x1000);
        match (&first, &second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.size, b.size);
                prop_assert_eq!(&a.instruction, &b.instruction);
            }
            _ => prop_assert!(false, "zero-fill decoding must not fail: {:?} / {:?}", first, second),
        }
    }

    /// Decoded sizes stay within the architectural limit for short prefix runs.
    #[test]
    fn decoded_size_is_bounded(bytes in prop::collection::vec(any::<u8>(), 1..32)) {
        let disasm = Ia32Disassembler::new();
        if let Ok(decoded) = disasm.decode_instruction(&bytes, 0) {
            let prefix_run = bytes
                .iter()
                .take_while(|&&b| ia32dis_core::Prefixes::from_byte(b).is_some())
                .count();
            prop_assert!(decoded.size >= 1);
            prop_assert!(decoded.size <= prefix_run + 15);
            prop_assert!(!decoded.instruction.mnemonic.is_empty());
        }
    }

    /// Undefined one-byte opcodes are one-byte illegal instructions.
    #[test]
    fn undefined_opcodes_are_illegal(
        index in any::<prop::sample::Index>(),
        tail in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let opcodes = undefined_one_byte_opcodes();
        let opcode = opcodes[index.index(opcodes.len())];
        let mut bytes = vec![opcode];
        bytes.extend(tail);

        let decoded = Ia32Disassembler::new().decode_instruction(&bytes, 0).unwrap();
        prop_assert!(decoded.instruction.is_illegal());
        prop_assert_eq!(decoded.size, 1);
    }

    /// `66` narrows `v`-sized register operands and the `S` suffix together.
    #[test]
    fn operand_size_prefix_narrows(reg in 0u8..8, modrm_reg in 0u8..8, rm in 0u8..8) {
        let disasm = Ia32Disassembler::new();
        let modrm = 0xC0 | (modrm_reg << 3) | rm;
        for (opcode, name) in [(0x01u8, "add"), (0x89, "mov"), (0x31, "xor")] {
            let wide = disasm.decode_instruction(&[opcode, modrm], 0).unwrap().instruction;
            let narrow = disasm.decode_instruction(&[0x66, opcode, modrm], 0).unwrap().instruction;
            prop_assert_eq!(wide.mnemonic, format!("{name}l"));
            prop_assert_eq!(&narrow.mnemonic, &format!("{name}w"));
            for op in &narrow.operands {
                let r = op.as_register().unwrap();
                prop_assert_eq!(r.class, RegisterClass::General);
                prop_assert_eq!(r.size, 16);
            }
        }

        let wide = disasm.decode_instruction(&[0x40 + reg], 0).unwrap().instruction;
        let narrow = disasm.decode_instruction(&[0x66, 0x40 + reg], 0).unwrap().instruction;
        prop_assert_eq!(wide.operands[0].as_register().map(|r| r.size), Some(32));
        prop_assert_eq!(narrow.operands[0].as_register().map(|r| r.size), Some(16));
    }

    /// A visitor that stops after N instructions sees exactly N.
    #[test]
    fn visitor_stop_is_honored(bytes in prop::collection::vec(any::<u8>(), 1..64), stop in 1usize..8) {
        let disasm = Ia32Disassembler::new();
        let mut seen = 0usize;
        let result = disasm.decode_stream(&bytes, &mut |_: u64, _: Instruction| -> ControlFlow<()> {
            seen += 1;
            if seen == stop { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });
        match result {
            Ok(summary) => prop_assert!(summary.instructions < stop),
            Err(err) => {
                prop_assert!(err.is_stop());
                prop_assert_eq!(seen, stop);
            }
        }
    }

    /// Immediates decoded under `66` never exceed 16 bits.
    #[test]
    fn narrow_immediates_fit(imm in any::<u32>()) {
        let bytes = imm.to_le_bytes();
        let code = [0x66, 0xB8, bytes[0], bytes[1], bytes[2], bytes[3]];
        let decoded = Ia32Disassembler::new().decode_instruction(&code, 0).unwrap();
        prop_assert_eq!(decoded.size, 4);
        match decoded.instruction.source() {
            Some(Operand::Immediate(value)) => prop_assert!(value.as_u64() <= 0xFFFF),
            other => prop_assert!(false, "expected immediate, got {:?}", other),
        }
    }
}

// =============================================================================
// Table properties
// =============================================================================

#[test]
fn tables_are_built_once_and_identically() {
    let first = table_fingerprint();
    let second = table_fingerprint();
    assert_eq!(first, second);

    for map in OpcodeMap::all() {
        let slots = map.slots().expect("listed map exists");
        for index in 0..slots.len() {
            assert_eq!(lookup(map, index as u8), slots[index].as_ref());
        }
    }
}

#[test]
fn edge_buffers_terminate() {
    let disasm = Ia32Disassembler::new();
    for bytes in [vec![], vec![0u8; 64], vec![0xFFu8; 64], vec![0x66u8; 16], vec![0x0Fu8; 9]] {
        let (result, out) = collect(&disasm, &bytes);
        assert!(result.is_ok());
        let end: usize = out.iter().map(|(_, insn)| insn.size).sum();
        assert!(end >= bytes.len());
    }
}
