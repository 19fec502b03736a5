//! Factory producing `ia32dis_core::Instruction` values.

use crate::traits::{InstructionFactory, InstructionInfo};
use ia32dis_core::{
    BranchKind, Condition, FloatOp, Instruction, InstructionKind, Operand, RtlOperation,
};

/// Builds the core instruction model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

fn build(info: InstructionInfo, kind: InstructionKind, operands: Vec<Operand>) -> Instruction {
    Instruction::new(info.mnemonic, info.size, info.prefixes, kind).with_operands(operands)
}

impl InstructionFactory for DefaultFactory {
    type Output = Instruction;

    fn new_general(&self, info: InstructionInfo, operands: Vec<Operand>) -> Instruction {
        build(info, InstructionKind::General, operands)
    }

    fn new_arithmetic(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Instruction {
        build(info, InstructionKind::Arithmetic(op), operands)
    }

    fn new_logical(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Instruction {
        build(info, InstructionKind::Logical(op), operands)
    }

    fn new_move(&self, info: InstructionInfo, dest: Operand, src: Operand) -> Instruction {
        build(info, InstructionKind::Move, vec![dest, src])
    }

    fn new_move_load(&self, info: InstructionInfo, dest: Operand, src: Operand) -> Instruction {
        build(info, InstructionKind::MoveLoad, vec![dest, src])
    }

    fn new_move_store(&self, info: InstructionInfo, dest: Operand, src: Operand) -> Instruction {
        build(info, InstructionKind::MoveStore, vec![dest, src])
    }

    fn new_branch(
        &self,
        info: InstructionInfo,
        kind: BranchKind,
        target: Option<Operand>,
    ) -> Instruction {
        build(info, InstructionKind::Branch(kind), target.into_iter().collect())
    }

    fn new_cond_branch(
        &self,
        info: InstructionInfo,
        condition: Condition,
        target: Operand,
    ) -> Instruction {
        build(info, InstructionKind::CondBranch(condition), vec![target])
    }

    fn new_rotate(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Instruction {
        build(info, InstructionKind::Rotate(op), operands)
    }

    fn new_shift(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Instruction {
        build(info, InstructionKind::Shift(op), operands)
    }

    fn new_fp_load(&self, info: InstructionInfo, operands: Vec<Operand>) -> Instruction {
        build(info, InstructionKind::Float(FloatOp::Load), operands)
    }

    fn new_fp_store(&self, info: InstructionInfo, operands: Vec<Operand>) -> Instruction {
        build(info, InstructionKind::Float(FloatOp::Store), operands)
    }

    fn new_fp_arithmetic(
        &self,
        info: InstructionInfo,
        op: RtlOperation,
        operands: Vec<Operand>,
    ) -> Instruction {
        build(info, InstructionKind::Float(FloatOp::Arithmetic(op)), operands)
    }

    fn new_fp_general(&self, info: InstructionInfo, operands: Vec<Operand>) -> Instruction {
        build(info, InstructionKind::Float(FloatOp::Other), operands)
    }

    fn new_illegal(&self, info: InstructionInfo) -> Instruction {
        Instruction::illegal(info.size, info.prefixes)
    }
}
