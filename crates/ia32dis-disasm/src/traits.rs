//! Decoder seams: instruction construction, stream visiting, and the
//! single-instruction disassembler interface.

use std::ops::ControlFlow;

use crate::DecodeError;
use ia32dis_core::{BranchKind, Condition, Operand, Prefixes, RtlOperation};

/// Header shared by every instruction the decoder asks a factory to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionInfo {
    /// Mnemonic with width suffixes resolved.
    pub mnemonic: String,
    /// Bytes consumed, prefixes included.
    pub size: usize,
    /// Prefixes seen before the opcode.
    pub prefixes: Prefixes,
}

impl InstructionInfo {
    /// Creates a new header.
    pub fn new(mnemonic: impl Into<String>, size: usize, prefixes: Prefixes) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            size,
            prefixes,
        }
    }
}

/// Builds instruction values for the decoder.
///
/// The decoder calls exactly one constructor per decoded instruction. Operands
/// are passed destination first.
pub trait InstructionFactory {
    /// The instruction representation produced.
    type Output;

    fn new_general(&self, info: InstructionInfo, operands: Vec<Operand>) -> Self::Output;

    fn new_arithmetic(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Self::Output;

    fn new_logical(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Self::Output;

    /// Register to register, or immediate to register.
    fn new_move(&self, info: InstructionInfo, dest: Operand, src: Operand) -> Self::Output;

    /// Memory to register.
    fn new_move_load(&self, info: InstructionInfo, dest: Operand, src: Operand) -> Self::Output;

    /// Register to memory.
    fn new_move_store(&self, info: InstructionInfo, dest: Operand, src: Operand) -> Self::Output;

    /// Jump, call or return. `target` is the branch destination, or the
    /// stack adjustment of `ret $imm`.
    fn new_branch(
        &self,
        info: InstructionInfo,
        kind: BranchKind,
        target: Option<Operand>,
    ) -> Self::Output;

    fn new_cond_branch(
        &self,
        info: InstructionInfo,
        condition: Condition,
        target: Operand,
    ) -> Self::Output;

    fn new_rotate(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Self::Output;

    fn new_shift(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Self::Output;

    fn new_fp_load(&self, info: InstructionInfo, operands: Vec<Operand>) -> Self::Output;

    fn new_fp_store(&self, info: InstructionInfo, operands: Vec<Operand>) -> Self::Output;

    fn new_fp_arithmetic(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Self::Output;

    /// x87 control and miscellaneous instructions.
    fn new_fp_general(&self, info: InstructionInfo, operands: Vec<Operand>) -> Self::Output;

    /// Undefined opcode.
    fn new_illegal(&self, info: InstructionInfo) -> Self::Output;
}

/// Receives decoded instructions from `decode_stream`.
pub trait InstructionVisitor<I> {
    /// Called once before the first instruction.
    fn prologue(&mut self) {}

    /// Called for each instruction in address order. Returning
    /// `ControlFlow::Break` stops the stream.
    fn visit(&mut self, pc: u64, instruction: I) -> ControlFlow<()>;

    /// Called once when the stream ends, whether it completed, failed or was
    /// stopped.
    fn epilogue(&mut self) {}
}

impl<I, F> InstructionVisitor<I> for F
where
    F: FnMut(u64, I) -> ControlFlow<()>,
{
    fn visit(&mut self, pc: u64, instruction: I) -> ControlFlow<()> {
        self(pc, instruction)
    }
}

/// Outcome of a completed stream decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    /// Number of instructions visited.
    pub instructions: usize,
    /// Bytes spanned by the visited instructions. May exceed the buffer
    /// length when the final instruction was zero-filled.
    pub bytes_consumed: usize,
}

/// Result of decoding an instruction.
#[derive(Debug, Clone)]
pub struct DecodedInstruction<I> {
    /// The decoded instruction.
    pub instruction: I,
    /// Number of bytes consumed.
    pub size: usize,
}

/// Single-instruction decoding interface.
pub trait Disassembler {
    /// The instruction representation produced.
    type Instruction;

    /// Decode a single instruction starting at the given address.
    ///
    /// # Arguments
    /// * `bytes` - The raw bytes to decode
    /// * `address` - The virtual address of the first byte
    fn decode_instruction(
        &self,
        bytes: &[u8],
        address: u64,
    ) -> Result<DecodedInstruction<Self::Instruction>, DecodeError>;

    /// Disassemble a block of code into `(address, instruction)` pairs.
    ///
    /// A failed decode is recorded and decoding resumes one byte later.
    fn disassemble_block(
        &self,
        bytes: &[u8],
        start_address: u64,
    ) -> Vec<Result<(u64, Self::Instruction), DecodeError>> {
        let mut instructions = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let remaining = &bytes[offset..];
            let address = start_address.wrapping_add(offset as u64);

            match self.decode_instruction(remaining, address) {
                Ok(decoded) => {
                    offset += decoded.size.max(1);
                    instructions.push(Ok((address, decoded.instruction)));
                }
                Err(e) => {
                    offset += 1;
                    instructions.push(Err(e));
                }
            }
        }

        instructions
    }
}
