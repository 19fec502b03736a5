//! # ia32dis-core
//!
//! Data model for the IA-32 disassembler: registers, prefixes, operands,
//! decoded instructions and symbol resolution. Nothing in this crate reads
//! machine code; the decoder lives in `ia32dis-disasm`.

pub mod instruction;
pub mod operand;
pub mod prefix;
pub mod register;
pub mod symbol;

pub use instruction::{BranchKind, Condition, FloatOp, Instruction, InstructionKind, RtlOperation};
pub use operand::{DirectAddress, Immediate, MemoryRef, Operand, PcRelative};
pub use prefix::Prefixes;
pub use register::{Register, RegisterClass};
pub use symbol::{NoSymbols, Symbol, SymbolResolver, SymbolTable};

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_instruction_serializes() {
        let insn = Instruction::new("pushl", 1, Prefixes::DATA, InstructionKind::General)
            .with_operand(Operand::reg(register::x86::EBP));
        let json = serde_json::to_string(&insn).unwrap();
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, insn);
    }

    #[test]
    fn test_deserialized_register_out_of_range_renders() {
        let json = r#"{"class":"General","number":9,"size":32}"#;
        let reg: Register = serde_json::from_str(json).unwrap();
        assert_eq!(reg.number, 9);
        assert_eq!(reg.to_string(), "%?");
    }
}
