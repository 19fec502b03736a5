//! IA-32 instruction decoder.

use std::ops::ControlFlow;

use log::{debug, trace, warn};

use super::cursor::Cursor;
use super::groups;
use super::modrm::{decode_memory16, decode_memory32, ModRM};
use super::node::{AddrMode, DecoderNode, NodeKind, OperandSpec, Width};
use super::opcodes::ONE_BYTE_TABLE;
use super::opcodes_sse::lookup_two_byte;
use super::prefix::{scan_prefixes, SizeMode, SIZE_TOGGLE};
use super::x87;
use crate::config::DecoderConfig;
use crate::factory::DefaultFactory;
use crate::traits::{
    DecodedInstruction, Disassembler, InstructionFactory, InstructionInfo, InstructionVisitor,
    StreamSummary,
};
use crate::DecodeError;
use ia32dis_core::register::x86;
use ia32dis_core::{BranchKind, DirectAddress, MemoryRef, Operand, Prefixes, Register};

/// Mnemonic of undefined encodings.
const ILLEGAL_MNEMONIC: &str = "(bad)";

/// Standalone FWAIT opcode.
const FWAIT: u8 = 0x9B;

/// IA-32 (32-bit protected mode) decoder.
///
/// The decoder is stateless between calls: every table it consults is
/// static, so one instance can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Ia32Disassembler<F = DefaultFactory> {
    config: DecoderConfig,
    factory: F,
}

impl Ia32Disassembler {
    /// Creates a decoder with the default configuration and factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with the given configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            factory: DefaultFactory,
        }
    }
}

impl<F: InstructionFactory> Ia32Disassembler<F> {
    /// Replaces the instruction factory.
    pub fn with_factory<G: InstructionFactory>(self, factory: G) -> Ia32Disassembler<G> {
        Ia32Disassembler {
            config: self.config,
            factory,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `bytes` from start to end, handing each instruction to
    /// `visitor` together with its program counter.
    ///
    /// Undefined encodings are delivered as illegal instructions and decoding
    /// continues. The stream ends early when the visitor breaks (reported as
    /// `DecodeError::Stopped`), when the instruction limit is reached, or on a
    /// decode error. The visitor's epilogue runs in every case.
    pub fn decode_stream<V>(&self, bytes: &[u8], visitor: &mut V) -> Result<StreamSummary, DecodeError>
    where
        V: InstructionVisitor<F::Output> + ?Sized,
    {
        visitor.prologue();
        let result = self.run(bytes, visitor);
        visitor.epilogue();

        match &result {
            Ok(summary) => debug!(
                "decoded {} instructions ({} bytes)",
                summary.instructions, summary.bytes_consumed
            ),
            Err(err @ DecodeError::InvalidTable { .. }) => warn!("{err}"),
            Err(err) => debug!("stream ended: {err}"),
        }
        result
    }

    /// Decodes all of `bytes` into `(pc, instruction)` pairs.
    pub fn disassemble(&self, bytes: &[u8]) -> Result<Vec<(u64, F::Output)>, DecodeError> {
        let mut out = Vec::new();
        self.decode_stream(bytes, &mut |pc: u64, instruction: F::Output| -> ControlFlow<()> {
            out.push((pc, instruction));
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    fn run<V>(&self, bytes: &[u8], visitor: &mut V) -> Result<StreamSummary, DecodeError>
    where
        V: InstructionVisitor<F::Output> + ?Sized,
    {
        let mut cursor = Cursor::new(bytes, self.config.start_pc, self.config.truncation);
        let mut summary = StreamSummary::default();

        while cursor.pos() < cursor.len() {
            if self
                .config
                .max_instructions
                .is_some_and(|max| summary.instructions >= max)
            {
                debug!("instruction limit of {} reached", summary.instructions);
                break;
            }

            let start = cursor.pos();
            let pc = cursor.address_of(start);
            let instruction = self.decode_one(&mut cursor)?;
            trace!("{:#x}: {} bytes", pc, cursor.pos() - start);

            summary.instructions += 1;
            summary.bytes_consumed = cursor.pos();
            if visitor.visit(pc, instruction).is_break() {
                return Err(DecodeError::stopped(pc));
            }
        }

        Ok(summary)
    }

    /// Decodes one instruction at the cursor and leaves the cursor after it.
    fn decode_one(&self, cursor: &mut Cursor<'_>) -> Result<F::Output, DecodeError> {
        let start = cursor.pos();
        let prefixes = scan_prefixes(cursor);

        if cursor.at_end() {
            // Prefixes with no opcode: emit the first byte alone.
            cursor.set_pos(start + 1);
            return Ok(if cursor.byte_at(start) == Some(FWAIT) {
                self.factory
                    .new_general(InstructionInfo::new("fwait", 1, Prefixes::empty()), Vec::new())
            } else {
                self.illegal_byte()
            });
        }

        let opcode = cursor.read_u8()?;
        let node = if opcode == 0x0F {
            lookup_two_byte(prefixes, cursor.read_u8()?)
        } else {
            ONE_BYTE_TABLE[opcode as usize].as_ref()
        };

        let Some(node) = node else {
            cursor.set_pos(start + 1);
            return Ok(self.illegal_byte());
        };

        let mut state = DecodeState {
            factory: &self.factory,
            cursor,
            start,
            prefixes,
            opcode,
            modrm: None,
            size: SizeMode::from_prefixes(prefixes, SIZE_TOGGLE),
        };
        state.decode_node(node)
    }

    fn illegal_byte(&self) -> F::Output {
        self.factory
            .new_illegal(InstructionInfo::new(ILLEGAL_MNEMONIC, 1, Prefixes::empty()))
    }
}

impl<F: InstructionFactory> Disassembler for Ia32Disassembler<F> {
    type Instruction = F::Output;

    fn decode_instruction(
        &self,
        bytes: &[u8],
        address: u64,
    ) -> Result<DecodedInstruction<F::Output>, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::truncated(address, 1, 0));
        }
        let mut cursor = Cursor::new(bytes, address, self.config.truncation);
        let instruction = self.decode_one(&mut cursor)?;
        Ok(DecodedInstruction {
            instruction,
            size: cursor.pos(),
        })
    }
}

/// Per-instruction decode state.
struct DecodeState<'d, 'c, 'a, F> {
    factory: &'d F,
    cursor: &'c mut Cursor<'a>,
    start: usize,
    prefixes: Prefixes,
    opcode: u8,
    /// Read lazily; shared by group dispatch and operand resolution.
    modrm: Option<ModRM>,
    size: SizeMode,
}

impl<F: InstructionFactory> DecodeState<'_, '_, '_, F> {
    fn decode_node(&mut self, node: &'static DecoderNode) -> Result<F::Output, DecodeError> {
        match node.kind {
            NodeKind::Group(number) => {
                let modrm = self.modrm()?;
                let row = groups::select(number, modrm).ok_or_else(|| {
                    self.invalid_table(format!("group {number} does not exist"))
                })?;
                self.decode_entry(row[modrm.reg as usize].as_ref())
            }
            NodeKind::FloatEscape => {
                let modrm = self.modrm()?;
                self.decode_entry(x87::select(self.opcode, modrm))
            }
            NodeKind::FloatGroup(number) => {
                let modrm = self.modrm()?;
                let row = x87::FLOAT_GROUP_TABLES
                    .get(number as usize)
                    .ok_or_else(|| {
                        self.invalid_table(format!("float group {number} does not exist"))
                    })?;
                self.decode_entry(row[modrm.rm as usize].as_ref())
            }
            _ => self.build(node),
        }
    }

    fn decode_entry(&mut self, node: Option<&'static DecoderNode>) -> Result<F::Output, DecodeError> {
        match node {
            Some(node) => self.decode_node(node),
            None => Ok(self.illegal()),
        }
    }

    fn build(&mut self, node: &'static DecoderNode) -> Result<F::Output, DecodeError> {
        // 0x66 is a mandatory prefix for SSE forms, never an operand-size override.
        if node.kind.is_sse() {
            self.size.operand_32 = true;
        }
        if node.uses_modrm() {
            self.modrm()?;
        }

        let mut operands = Vec::with_capacity(3);
        for spec in node.operand_specs() {
            match self.resolve(spec)? {
                Some(operand) => operands.push(operand),
                None => return Ok(self.illegal()),
            }
        }

        let info = InstructionInfo::new(self.mnemonic(node.template), self.len(), self.prefixes);
        let factory = self.factory;
        let instruction = match node.kind {
            NodeKind::General | NodeKind::SseGeneral => factory.new_general(info, operands),
            NodeKind::Arithmetic(op) | NodeKind::SseArithmetic(op) => {
                factory.new_arithmetic(info, op, operands)
            }
            NodeKind::Logical(op) | NodeKind::SseLogical(op) => {
                factory.new_logical(info, op, operands)
            }
            NodeKind::Rotate(op) => factory.new_rotate(info, op, operands),
            NodeKind::Shift(op) | NodeKind::SseShift(op) => factory.new_shift(info, op, operands),
            NodeKind::Move | NodeKind::SseMove => self.build_move(info, operands),
            NodeKind::Jump => factory.new_branch(info, BranchKind::Jump, operands.pop()),
            NodeKind::Call => factory.new_branch(info, BranchKind::Call, operands.pop()),
            NodeKind::Return => factory.new_branch(info, BranchKind::Return, operands.pop()),
            NodeKind::CondJump(condition) => match operands.pop() {
                Some(target) => factory.new_cond_branch(info, condition, target),
                None => return Err(self.invalid_table("conditional jump without a target")),
            },
            NodeKind::FloatLoad => factory.new_fp_load(info, operands),
            NodeKind::FloatStore => factory.new_fp_store(info, operands),
            NodeKind::FloatArithmetic(op) => factory.new_fp_arithmetic(info, op, operands),
            NodeKind::FloatGeneral => factory.new_fp_general(info, operands),
            NodeKind::Group(_) | NodeKind::FloatEscape | NodeKind::FloatGroup(_) => {
                return Err(self.invalid_table("dispatch node reached as a leaf"))
            }
        };
        Ok(instruction)
    }

    /// Picks the move constructor from the resolved operand shapes.
    fn build_move(&self, info: InstructionInfo, operands: Vec<Operand>) -> F::Output {
        let [dest, src]: [Operand; 2] = match operands.try_into() {
            Ok(pair) => pair,
            Err(operands) => return self.factory.new_general(info, operands),
        };
        match (&dest, &src) {
            (Operand::Register(_), Operand::Register(_) | Operand::Immediate(_)) => {
                self.factory.new_move(info, dest, src)
            }
            (Operand::Memory(_), Operand::Register(_) | Operand::Immediate(_)) => {
                self.factory.new_move_store(info, dest, src)
            }
            (Operand::Register(_), Operand::Memory(_)) => {
                self.factory.new_move_load(info, dest, src)
            }
            _ => self.factory.new_general(info, vec![dest, src]),
        }
    }

    /// Picks the `long/short` alternative of a template, then rewrites its
    /// `S`, `N` and `C` placeholders.
    fn mnemonic(&self, template: &str) -> String {
        let template = match template.split_once('/') {
            Some((long, _)) if self.size.operand_32 => long,
            Some((_, short)) => short,
            None => template,
        };
        let mut out = String::with_capacity(template.len());
        for c in template.chars() {
            match c {
                'S' => out.push(if self.size.operand_32 { 'l' } else { 'w' }),
                'N' => {
                    if !self.prefixes.contains(Prefixes::FWAIT) {
                        out.push('n');
                    }
                }
                'C' => {
                    if self.size.address_32 {
                        out.push('e');
                    }
                }
                c => out.push(c),
            }
        }
        out
    }

    /// Resolves one operand. `None` marks an encoding with no defined meaning.
    fn resolve(&mut self, spec: OperandSpec) -> Result<Option<Operand>, DecodeError> {
        let op32 = self.size.operand_32;
        let operand = match spec.mode {
            AddrMode::E => {
                let modrm = self.modrm()?;
                if modrm.is_register() {
                    Operand::reg(Register::general(modrm.rm, spec.width.register_bits(op32)))
                } else {
                    self.memory(modrm, spec.width)?
                }
            }
            AddrMode::G => {
                let modrm = self.modrm()?;
                Operand::reg(Register::general(modrm.reg, spec.width.register_bits(op32)))
            }
            AddrMode::I => self.immediate(spec.width)?,
            AddrMode::SignedI => {
                // Sign-extended to the operand size.
                let value = self.cursor.read_i8()?;
                Operand::imm(i64::from(value), self.size.operand_bits() as u8)
            }
            AddrMode::J => {
                let displacement = match spec.width {
                    Width::B => i64::from(self.cursor.read_i8()?),
                    _ if op32 => i64::from(self.cursor.read_i32()?),
                    _ => i64::from(self.cursor.read_i16()?),
                };
                Operand::pc_rel(displacement, self.len())
            }
            AddrMode::Reg(number) => {
                Operand::reg(Register::general(number, spec.width.register_bits(op32)))
            }
            AddrMode::Seg(number) => match Register::segment(number) {
                Some(reg) => Operand::reg(reg),
                None => return Ok(None),
            },
            AddrMode::FpReg => match spec.width {
                Width::St0 => Operand::reg(x86::ST0),
                _ => Operand::reg(Register::st(self.modrm()?.rm)),
            },
            AddrMode::V => Operand::reg(Register::xmm(self.modrm()?.reg)),
            AddrMode::P => Operand::reg(Register::mmx(self.modrm()?.reg)),
            AddrMode::W => {
                let modrm = self.modrm()?;
                if modrm.is_register() {
                    Operand::reg(Register::xmm(modrm.rm))
                } else {
                    self.memory(modrm, spec.width)?
                }
            }
            AddrMode::Q => {
                let modrm = self.modrm()?;
                if modrm.is_register() {
                    Operand::reg(Register::mmx(modrm.rm))
                } else {
                    self.memory(modrm, spec.width)?
                }
            }
            AddrMode::M => {
                let modrm = self.modrm()?;
                if modrm.is_register() {
                    return Ok(None);
                }
                self.memory(modrm, spec.width)?
            }
            AddrMode::S => match Register::segment(self.modrm()?.reg) {
                Some(reg) => Operand::reg(reg),
                None => return Ok(None),
            },
            // The system register moves number their operands by `mod`.
            AddrMode::R => Operand::reg(x86::gpr32(self.modrm()?.mod_)),
            AddrMode::C => Operand::reg(Register::control(self.modrm()?.mod_)),
            AddrMode::D => Operand::reg(Register::debug(self.modrm()?.mod_)),
            AddrMode::T => Operand::reg(Register::test(self.modrm()?.mod_)),
            AddrMode::Dir => {
                let offset = if self.size.address_32 {
                    self.cursor.read_u32()?
                } else {
                    u32::from(self.cursor.read_u16()?)
                };
                let selector = self.cursor.read_u16()?;
                Operand::Direct(DirectAddress {
                    segment: Some(selector),
                    offset,
                })
            }
            AddrMode::Off => {
                let offset = if self.size.address_32 {
                    self.cursor.read_u32()?
                } else {
                    u32::from(self.cursor.read_u16()?)
                };
                let mem = MemoryRef::absolute(i64::from(offset), spec.width.bytes(op32));
                Operand::Memory(mem.with_segment(self.prefixes.segment()))
            }
            AddrMode::EsDi => {
                let base = if self.size.address_32 { x86::EDI } else { x86::DI };
                let mem = MemoryRef::base_disp(base, 0, spec.width.bytes(op32));
                Operand::Memory(mem.with_segment(Some(x86::ES)))
            }
            AddrMode::DsSi => {
                let base = if self.size.address_32 { x86::ESI } else { x86::SI };
                let mem = MemoryRef::base_disp(base, 0, spec.width.bytes(op32));
                Operand::Memory(mem.with_segment(self.prefixes.segment().or(Some(x86::DS))))
            }
            AddrMode::One => Operand::imm_unsigned(1, 8),
        };
        Ok(Some(operand))
    }

    fn immediate(&mut self, width: Width) -> Result<Operand, DecodeError> {
        let operand = match width {
            Width::B => Operand::imm_unsigned(u64::from(self.cursor.read_u8()?), 8),
            Width::W => Operand::imm_unsigned(u64::from(self.cursor.read_u16()?), 16),
            Width::V if !self.size.operand_32 => {
                Operand::imm_unsigned(u64::from(self.cursor.read_u16()?), 16)
            }
            _ => Operand::imm_unsigned(u64::from(self.cursor.read_u32()?), 32),
        };
        Ok(operand)
    }

    fn memory(&mut self, modrm: ModRM, width: Width) -> Result<Operand, DecodeError> {
        let size = width.bytes(self.size.operand_32);
        let mem = if self.size.address_32 {
            decode_memory32(self.cursor, modrm, size)?
        } else {
            decode_memory16(self.cursor, modrm, size)?
        };
        Ok(Operand::Memory(mem.with_segment(self.prefixes.segment())))
    }

    fn modrm(&mut self) -> Result<ModRM, DecodeError> {
        if let Some(modrm) = self.modrm {
            return Ok(modrm);
        }
        let modrm = ModRM::parse(self.cursor.read_u8()?);
        self.modrm = Some(modrm);
        Ok(modrm)
    }

    /// Bytes consumed so far, prefixes included.
    fn len(&self) -> usize {
        self.cursor.pos() - self.start
    }

    /// Illegal instruction covering every byte consumed so far.
    fn illegal(&self) -> F::Output {
        self.factory
            .new_illegal(InstructionInfo::new(ILLEGAL_MNEMONIC, self.len(), self.prefixes))
    }

    fn invalid_table(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::invalid_table(self.cursor.address_of(self.start), reason)
    }
}
