#![no_main]

use std::ops::ControlFlow;

use ia32dis_core::{Instruction, NoSymbols};
use ia32dis_disasm::{DecoderConfig, Disassembler, Ia32Disassembler};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Single instruction decode must never panic
    let disasm = Ia32Disassembler::new();
    let _ = disasm.decode_instruction(data, 0x1000);

    // Stream decode: instructions tile the buffer and rendering never panics
    let mut next = 0u64;
    let result = disasm.decode_stream(data, &mut |pc: u64, insn: Instruction| -> ControlFlow<()> {
        assert_eq!(pc, next);
        assert!(insn.size >= 1);
        next += insn.size as u64;
        let _ = insn.render(pc, &NoSymbols);
        ControlFlow::Continue(())
    });
    assert!(result.is_ok());

    // Strict mode stops at the first truncated instruction
    let strict = Ia32Disassembler::with_config(DecoderConfig::strict());
    let mut consumed = 0usize;
    let _ = strict.decode_stream(data, &mut |_: u64, insn: Instruction| -> ControlFlow<()> {
        consumed += insn.size;
        ControlFlow::Continue(())
    });
    assert!(consumed <= data.len());
});
