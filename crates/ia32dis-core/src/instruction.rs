//! Decoded IA-32 instruction representation.

use crate::symbol::{NoSymbols, SymbolResolver};
use crate::{Operand, Prefixes};

/// A decoded instruction.
///
/// Operands are stored destination first (Intel order). Rendering emits them
/// in AT&T order, source first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    /// Mnemonic with its width suffix resolved (e.g. "addl", "movzbw").
    pub mnemonic: String,
    /// Size in bytes, prefixes included.
    pub size: usize,
    /// Legacy prefixes seen before the opcode.
    pub prefixes: Prefixes,
    /// Operands (destination first, then sources).
    pub operands: Vec<Operand>,
    /// Instruction category.
    pub kind: InstructionKind,
}

impl Instruction {
    /// Creates an instruction without operands.
    pub fn new(
        mnemonic: impl Into<String>,
        size: usize,
        prefixes: Prefixes,
        kind: InstructionKind,
    ) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            size,
            prefixes,
            operands: Vec::new(),
            kind,
        }
    }

    /// Creates the undefined-opcode instruction.
    pub fn illegal(size: usize, prefixes: Prefixes) -> Self {
        Self::new("(bad)", size, prefixes, InstructionKind::Illegal)
    }

    /// Sets operands.
    pub fn with_operands(mut self, ops: Vec<Operand>) -> Self {
        self.operands = ops;
        self
    }

    /// Adds an operand.
    pub fn with_operand(mut self, op: Operand) -> Self {
        self.operands.push(op);
        self
    }

    /// Returns the destination (first) operand.
    pub fn dest(&self) -> Option<&Operand> {
        self.operands.first()
    }

    /// Returns the first source operand.
    pub fn source(&self) -> Option<&Operand> {
        self.operands.get(1)
    }

    /// Returns the abstract operation code, if this instruction carries one.
    pub fn rtl_operation(&self) -> Option<RtlOperation> {
        match self.kind {
            InstructionKind::Arithmetic(op)
            | InstructionKind::Logical(op)
            | InstructionKind::Rotate(op)
            | InstructionKind::Shift(op)
            | InstructionKind::Float(FloatOp::Arithmetic(op)) => Some(op),
            _ => None,
        }
    }

    /// Resolves the branch target of a direct (PC-relative) branch.
    pub fn branch_target(&self, pc: u64) -> Option<u64> {
        if !self.is_branch() {
            return None;
        }
        match self.operands.first() {
            Some(Operand::PcRelative(rel)) => Some(rel.target(pc)),
            _ => None,
        }
    }

    /// Returns true for any branch, call or return.
    pub fn is_branch(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::Branch(_) | InstructionKind::CondBranch(_)
        )
    }

    /// Returns true for calls.
    pub fn is_call(&self) -> bool {
        matches!(self.kind, InstructionKind::Branch(BranchKind::Call))
    }

    /// Returns true for returns.
    pub fn is_return(&self) -> bool {
        matches!(self.kind, InstructionKind::Branch(BranchKind::Return))
    }

    /// Returns true for conditional branches.
    pub fn is_conditional(&self) -> bool {
        matches!(self.kind, InstructionKind::CondBranch(_))
    }

    /// Returns true for integer or floating-point arithmetic.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::Arithmetic(_) | InstructionKind::Float(FloatOp::Arithmetic(_))
        )
    }

    /// Returns true for bitwise logic.
    pub fn is_logical(&self) -> bool {
        matches!(self.kind, InstructionKind::Logical(_))
    }

    /// Returns true for any data move.
    pub fn is_move(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::Move | InstructionKind::MoveLoad | InstructionKind::MoveStore
        )
    }

    /// Returns true if the instruction loads from memory into a register.
    pub fn is_load(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::MoveLoad | InstructionKind::Float(FloatOp::Load)
        )
    }

    /// Returns true if the instruction stores a register to memory.
    pub fn is_store(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::MoveStore | InstructionKind::Float(FloatOp::Store)
        )
    }

    /// Returns true for x87 instructions.
    pub fn is_float(&self) -> bool {
        matches!(self.kind, InstructionKind::Float(_))
    }

    /// Returns true for shifts.
    pub fn is_shift(&self) -> bool {
        matches!(self.kind, InstructionKind::Shift(_))
    }

    /// Returns true for rotates.
    pub fn is_rotate(&self) -> bool {
        matches!(self.kind, InstructionKind::Rotate(_))
    }

    /// Returns true for undefined opcodes.
    pub fn is_illegal(&self) -> bool {
        matches!(self.kind, InstructionKind::Illegal)
    }

    /// Returns true for string instructions that honour REP prefixes.
    pub fn is_string_op(&self) -> bool {
        STRING_MNEMONICS.contains(&self.mnemonic.as_str())
    }

    fn is_indirect_branch(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::Branch(BranchKind::Jump) | InstructionKind::Branch(BranchKind::Call)
        ) && self
            .operands
            .first()
            .is_some_and(|op| op.is_register() || op.is_memory())
    }

    /// Renders the instruction in AT&T syntax.
    ///
    /// `pc` is the address the instruction was decoded at; branch targets are
    /// resolved against it and described through `symbols`.
    pub fn render(&self, pc: u64, symbols: &dyn SymbolResolver) -> String {
        self.render_with(|op| op.render(pc, symbols))
    }

    fn render_with(&self, render_operand: impl Fn(&Operand) -> String) -> String {
        if self.is_illegal() {
            return self.mnemonic.clone();
        }

        let mut out = String::new();
        if self.prefixes.contains(Prefixes::LOCK) {
            out.push_str("lock ");
        }
        if self.is_string_op() {
            if self.prefixes.contains(Prefixes::REPNZ) {
                out.push_str("repnz ");
            } else if self.prefixes.contains(Prefixes::REPZ) {
                let compares = self.mnemonic.starts_with("cmps") || self.mnemonic.starts_with("scas");
                out.push_str(if compares { "repz " } else { "rep " });
            }
        }
        out.push_str(&self.mnemonic);

        let indirect = self.is_indirect_branch();
        for (i, op) in self.operands.iter().rev().enumerate() {
            out.push_str(if i == 0 { " " } else { "," });
            if indirect {
                out.push('*');
            }
            out.push_str(&render_operand(op));
        }
        out
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Without a program counter, branch targets stay relative (`.+0x5`).
        let text = self.render_with(|op| match op {
            Operand::PcRelative(_) => op.to_string(),
            _ => op.render(0, &NoSymbols),
        });
        f.write_str(&text)
    }
}

const STRING_MNEMONICS: &[&str] = &[
    "movsb", "movsw", "movsl", "cmpsb", "cmpsw", "cmpsl", "stosb", "stosw", "stosl", "lodsb",
    "lodsw", "lodsl", "scasb", "scasw", "scasl", "insb", "insw", "insl", "outsb", "outsw", "outsl",
];

/// Instruction category, mirroring the factory constructor that built it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstructionKind {
    /// Anything without a more specific category.
    General,
    /// Integer arithmetic.
    Arithmetic(RtlOperation),
    /// Bitwise logic.
    Logical(RtlOperation),
    /// Register/register or register/immediate move.
    Move,
    /// Memory to register move.
    MoveLoad,
    /// Register to memory move.
    MoveStore,
    /// Unconditional jump, call or return.
    Branch(BranchKind),
    /// Conditional branch.
    CondBranch(Condition),
    /// Rotate.
    Rotate(RtlOperation),
    /// Shift.
    Shift(RtlOperation),
    /// x87 floating point.
    Float(FloatOp),
    /// Undefined opcode.
    Illegal,
}

/// Abstract operation code carried by arithmetic, logical, shift and
/// rotate instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RtlOperation {
    Add,
    AddWithCarry,
    Sub,
    SubWithBorrow,
    UnsignedMul,
    SignedMul,
    UnsignedDiv,
    SignedDiv,
    And,
    Or,
    Xor,
    AndNot,
    Not,
    Neg,
    Compare,
    Test,
    ShiftLeft,
    ShiftRightLogical,
    ShiftRightArithmetic,
    RotateLeft,
    RotateRight,
    RotateLeftCarry,
    RotateRightCarry,
}

impl RtlOperation {
    /// Returns the name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::AddWithCarry => "adc",
            Self::Sub => "sub",
            Self::SubWithBorrow => "sbb",
            Self::UnsignedMul => "umul",
            Self::SignedMul => "smul",
            Self::UnsignedDiv => "udiv",
            Self::SignedDiv => "sdiv",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::AndNot => "andn",
            Self::Not => "not",
            Self::Neg => "neg",
            Self::Compare => "cmp",
            Self::Test => "test",
            Self::ShiftLeft => "sll",
            Self::ShiftRightLogical => "srl",
            Self::ShiftRightArithmetic => "sra",
            Self::RotateLeft => "rol",
            Self::RotateRight => "ror",
            Self::RotateLeftCarry => "rcl",
            Self::RotateRightCarry => "rcr",
        }
    }
}

/// Unconditional control transfer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchKind {
    Jump,
    Call,
    Return,
}

/// x87 instruction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloatOp {
    /// Push onto the register stack (`fld`, `fild`, `fld1`, ...).
    Load,
    /// Store from the register stack (`fst`, `fistp`, ...).
    Store,
    /// Arithmetic on the register stack.
    Arithmetic(RtlOperation),
    /// Control and miscellaneous x87 instructions.
    Other,
}

/// Branch condition for conditional jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    Overflow,       // OF=1
    NotOverflow,    // OF=0
    Below,          // CF=1
    AboveOrEqual,   // CF=0
    Equal,          // ZF=1
    NotEqual,       // ZF=0
    BelowOrEqual,   // CF=1 or ZF=1
    Above,          // CF=0 and ZF=0
    Sign,           // SF=1
    NotSign,        // SF=0
    Parity,         // PF=1
    NotParity,      // PF=0
    Less,           // SF!=OF
    GreaterOrEqual, // SF=OF
    LessOrEqual,    // ZF=1 or SF!=OF
    Greater,        // ZF=0 and SF=OF

    // Counter-based
    CounterZero,
    CounterNotZero,
    CounterNotZeroAndEqual,
    CounterNotZeroAndNotEqual,
}

impl Condition {
    /// Returns the condition encoded in the low nibble of a Jcc/SETcc/CMOVcc
    /// opcode.
    pub const fn from_code(code: u8) -> Self {
        match code & 0xF {
            0x0 => Self::Overflow,
            0x1 => Self::NotOverflow,
            0x2 => Self::Below,
            0x3 => Self::AboveOrEqual,
            0x4 => Self::Equal,
            0x5 => Self::NotEqual,
            0x6 => Self::BelowOrEqual,
            0x7 => Self::Above,
            0x8 => Self::Sign,
            0x9 => Self::NotSign,
            0xA => Self::Parity,
            0xB => Self::NotParity,
            0xC => Self::Less,
            0xD => Self::GreaterOrEqual,
            0xE => Self::LessOrEqual,
            _ => Self::Greater,
        }
    }

    /// Returns the inverse condition, if the condition has one.
    pub fn inverse(&self) -> Option<Self> {
        let inv = match self {
            Self::Overflow => Self::NotOverflow,
            Self::NotOverflow => Self::Overflow,
            Self::Below => Self::AboveOrEqual,
            Self::AboveOrEqual => Self::Below,
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::BelowOrEqual => Self::Above,
            Self::Above => Self::BelowOrEqual,
            Self::Sign => Self::NotSign,
            Self::NotSign => Self::Sign,
            Self::Parity => Self::NotParity,
            Self::NotParity => Self::Parity,
            Self::Less => Self::GreaterOrEqual,
            Self::GreaterOrEqual => Self::Less,
            Self::LessOrEqual => Self::Greater,
            Self::Greater => Self::LessOrEqual,
            Self::CounterZero => Self::CounterNotZero,
            Self::CounterNotZero => Self::CounterZero,
            Self::CounterNotZeroAndEqual | Self::CounterNotZeroAndNotEqual => return None,
        };
        Some(inv)
    }

    /// Returns the x86 mnemonic suffix for this condition.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Overflow => "o",
            Self::NotOverflow => "no",
            Self::Below => "b",
            Self::AboveOrEqual => "ae",
            Self::Equal => "e",
            Self::NotEqual => "ne",
            Self::BelowOrEqual => "be",
            Self::Above => "a",
            Self::Sign => "s",
            Self::NotSign => "ns",
            Self::Parity => "p",
            Self::NotParity => "np",
            Self::Less => "l",
            Self::GreaterOrEqual => "ge",
            Self::LessOrEqual => "le",
            Self::Greater => "g",
            Self::CounterZero => "cxz",
            Self::CounterNotZero => "loop",
            Self::CounterNotZeroAndEqual => "loope",
            Self::CounterNotZeroAndNotEqual => "loopne",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::MemoryRef;
    use crate::register::x86;
    use crate::symbol::SymbolTable;
    use crate::Symbol;

    #[test]
    fn test_render_reverses_operands() {
        let insn = Instruction::new("addb", 2, Prefixes::empty(), InstructionKind::Arithmetic(RtlOperation::Add))
            .with_operand(Operand::reg(x86::CL))
            .with_operand(Operand::reg(x86::AL));
        assert_eq!(insn.render(0, &NoSymbols), "addb %al,%cl");
        assert!(insn.is_arithmetic());
        assert_eq!(insn.rtl_operation(), Some(RtlOperation::Add));
    }

    #[test]
    fn test_render_branch_with_symbols() {
        let insn = Instruction::new("call", 5, Prefixes::empty(), InstructionKind::Branch(BranchKind::Call))
            .with_operand(Operand::pc_rel(0x0b, 5));
        let symbols: SymbolTable = [Symbol::new("puts", 0x1010, 0x20)].into_iter().collect();
        assert_eq!(insn.render(0x1000, &symbols), "call 0x1010 <puts>");
        assert_eq!(insn.branch_target(0x1000), Some(0x1010));
        assert_eq!(insn.to_string(), "call .+0x10");
        assert!(insn.is_call());
    }

    #[test]
    fn test_render_indirect_branch() {
        let insn = Instruction::new("jmp", 2, Prefixes::empty(), InstructionKind::Branch(BranchKind::Jump))
            .with_operand(Operand::reg(x86::EAX));
        assert_eq!(insn.to_string(), "jmp *%eax");
        assert_eq!(insn.branch_target(0), None);
    }

    #[test]
    fn test_render_prefixes() {
        let rep = Instruction::new("movsl", 2, Prefixes::REPZ, InstructionKind::General);
        assert_eq!(rep.to_string(), "rep movsl");
        let repz = Instruction::new("cmpsb", 2, Prefixes::REPZ, InstructionKind::General);
        assert_eq!(repz.to_string(), "repz cmpsb");
        let not_string = Instruction::new("movsbl", 3, Prefixes::REPZ, InstructionKind::General);
        assert_eq!(not_string.to_string(), "movsbl");

        let mem = MemoryRef::base_disp(x86::EBX, 0, 4);
        let locked = Instruction::new("incl", 3, Prefixes::LOCK, InstructionKind::Arithmetic(RtlOperation::Add))
            .with_operand(Operand::Memory(mem));
        assert_eq!(locked.to_string(), "lock incl (%ebx)");
    }

    #[test]
    fn test_illegal() {
        let insn = Instruction::illegal(1, Prefixes::empty());
        assert!(insn.is_illegal());
        assert_eq!(insn.to_string(), "(bad)");
    }

    #[test]
    fn test_condition_codes() {
        assert_eq!(Condition::from_code(0x74), Condition::Equal);
        assert_eq!(Condition::from_code(0x8F), Condition::Greater);
        assert_eq!(Condition::Equal.inverse(), Some(Condition::NotEqual));
        assert_eq!(Condition::CounterNotZeroAndEqual.inverse(), None);
        assert_eq!(Condition::from_code(0x0C).suffix(), "l");
    }
}
