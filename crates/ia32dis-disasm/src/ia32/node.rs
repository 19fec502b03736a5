//! Decoder nodes: the immutable rule stored in every opcode table slot.
//!
//! A node pairs a mnemonic template with up to three operand specifications
//! and a [`NodeKind`] that decides which factory constructor builds the
//! result. A template written `long/short` names the 32-bit and 16-bit
//! operand-size forms (`cwtl/cbtw`). Templates may contain three
//! placeholders that are rewritten at decode time:
//!
//! - `S` becomes `l` with a 32-bit operand size and `w` with a 16-bit one.
//! - `N` becomes `n`, unless an FWAIT prefix was seen, in which case it is
//!   dropped (`fNstsw` decodes as `fnstsw` or `fstsw`).
//! - `C` becomes `e` with a 32-bit address size and is dropped otherwise
//!   (`jCcxz` decodes as `jecxz` or `jcxz`).

use ia32dis_core::{Condition, RtlOperation};

/// How an operand is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// General register or memory from ModR/M `rm`.
    E,
    /// General register from ModR/M `reg`.
    G,
    /// Immediate, zero-extended.
    I,
    /// 8-bit immediate sign-extended to the operand size.
    SignedI,
    /// PC-relative displacement.
    J,
    /// Fixed general register by encoding number; width picks al/ax/eax.
    Reg(u8),
    /// Fixed segment register by encoding number.
    Seg(u8),
    /// x87 stack register: `st(0)` or `st(rm)` depending on width.
    FpReg,
    /// XMM register from ModR/M `reg`.
    V,
    /// MMX register from ModR/M `reg`.
    P,
    /// XMM register or memory from ModR/M `rm`.
    W,
    /// MMX register or memory from ModR/M `rm`.
    Q,
    /// Memory only from ModR/M `rm`; the register form is undefined.
    M,
    /// Segment register from ModR/M `reg`.
    S,
    /// 32-bit general register numbered by ModR/M `mod`.
    R,
    /// Control register numbered by ModR/M `mod`.
    C,
    /// Debug register numbered by ModR/M `mod`.
    D,
    /// Test register numbered by ModR/M `mod`.
    T,
    /// Absolute far pointer: offset sized by the address size, then a
    /// 16-bit selector.
    Dir,
    /// Absolute memory offset (`moffs`) sized by the address size.
    Off,
    /// String destination `%es:(%edi)`.
    EsDi,
    /// String source `%ds:(%esi)`, segment overridable.
    DsSi,
    /// The constant 1 (shift and rotate by one).
    One,
}

impl AddrMode {
    /// Returns true if resolving this mode needs the ModR/M byte.
    pub const fn uses_modrm(self) -> bool {
        matches!(
            self,
            Self::E
                | Self::G
                | Self::FpReg
                | Self::V
                | Self::P
                | Self::W
                | Self::Q
                | Self::M
                | Self::S
                | Self::R
                | Self::C
                | Self::D
                | Self::T
        )
    }
}

/// Operand width code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// Byte.
    B,
    /// Word.
    W,
    /// Word or doubleword by operand size.
    V,
    /// Doubleword.
    D,
    /// Far pointer: offset (operand size) plus selector.
    P,
    /// Pair of `v` operands in memory (`bound`).
    A,
    /// Quadword.
    Q,
    /// Double quadword.
    Dq,
    /// Packed single.
    Ps,
    /// Packed double.
    Pd,
    /// Scalar single.
    Ss,
    /// Scalar double.
    Sd,
    /// MMX quadword of packed integers.
    Pi,
    /// Byte sign-extended to the operand size.
    Bs,
    /// x87 `st(0)`.
    St0,
    /// x87 `st(rm)`.
    Sti,
    /// 32-bit real.
    Single,
    /// 64-bit real.
    Double,
    /// 80-bit real.
    Extended,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// 80-bit packed BCD.
    Bcd,
    /// No natural width (`lea`, `fldenv`, descriptor tables).
    None,
}

impl Width {
    /// Size of a memory access in bytes.
    pub fn bytes(self, operand_32: bool) -> u8 {
        match self {
            Self::B => 1,
            Self::W | Self::Int16 => 2,
            Self::V | Self::Bs => {
                if operand_32 {
                    4
                } else {
                    2
                }
            }
            Self::D | Self::Ss | Self::Single | Self::Int32 => 4,
            Self::P => {
                if operand_32 {
                    6
                } else {
                    4
                }
            }
            Self::A => {
                if operand_32 {
                    8
                } else {
                    4
                }
            }
            Self::Q | Self::Sd | Self::Pi | Self::Double | Self::Int64 => 8,
            Self::Extended | Self::Bcd => 10,
            Self::Dq | Self::Ps | Self::Pd => 16,
            Self::St0 | Self::Sti | Self::None => 0,
        }
    }

    /// Width in bits of a general register holding this operand.
    pub fn register_bits(self, operand_32: bool) -> u16 {
        match self {
            Self::B => 8,
            Self::W => 16,
            Self::V | Self::Bs => {
                if operand_32 {
                    32
                } else {
                    16
                }
            }
            _ => 32,
        }
    }
}

/// One operand slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperandSpec {
    pub mode: AddrMode,
    pub width: Width,
}

impl OperandSpec {
    pub const fn new(mode: AddrMode, width: Width) -> Self {
        Self { mode, width }
    }
}

/// Which instruction a node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    General,
    Arithmetic(RtlOperation),
    Logical(RtlOperation),
    Rotate(RtlOperation),
    Shift(RtlOperation),
    /// Move, reclassified by operand shape after resolution.
    Move,
    Jump,
    Call,
    Return,
    CondJump(Condition),
    SseMove,
    SseArithmetic(RtlOperation),
    SseLogical(RtlOperation),
    SseShift(RtlOperation),
    SseGeneral,
    /// Dispatch on ModR/M `reg` through the numbered group table.
    Group(u8),
    /// x87 escape (`D8`..`DF`): dispatch on ModR/M through the float maps.
    FloatEscape,
    /// Dispatch on ModR/M `rm` through the numbered float group table.
    FloatGroup(u8),
    FloatLoad,
    FloatStore,
    FloatArithmetic(RtlOperation),
    FloatGeneral,
}

impl NodeKind {
    /// SSE nodes treat 0x66 as a mandatory prefix, so it never narrows
    /// their operands.
    pub const fn is_sse(self) -> bool {
        matches!(
            self,
            Self::SseMove
                | Self::SseArithmetic(_)
                | Self::SseLogical(_)
                | Self::SseShift(_)
                | Self::SseGeneral
        )
    }
}

/// A decoding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderNode {
    pub template: &'static str,
    pub kind: NodeKind,
    pub operands: [Option<OperandSpec>; 3],
}

impl DecoderNode {
    pub const fn new(template: &'static str, kind: NodeKind, ops: &[OperandSpec]) -> Self {
        let mut operands = [None; 3];
        let mut i = 0;
        while i < ops.len() && i < 3 {
            operands[i] = Some(ops[i]);
            i += 1;
        }
        Self {
            template,
            kind,
            operands,
        }
    }

    /// Returns the operand specs that are present, in order.
    pub fn operand_specs(&self) -> impl Iterator<Item = OperandSpec> + '_ {
        self.operands.iter().flatten().copied()
    }

    /// Returns true if any operand needs the ModR/M byte.
    pub fn uses_modrm(&self) -> bool {
        self.operand_specs().any(|spec| spec.mode.uses_modrm())
    }
}

// Node constructors used by the tables.

pub(crate) const fn general(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::General, ops)
}

pub(crate) const fn arith(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Arithmetic(op), ops)
}

pub(crate) const fn logic(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Logical(op), ops)
}

pub(crate) const fn rotate(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Rotate(op), ops)
}

pub(crate) const fn shift(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Shift(op), ops)
}

pub(crate) const fn mov(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Move, ops)
}

pub(crate) const fn jump(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Jump, ops)
}

pub(crate) const fn call(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Call, ops)
}

pub(crate) const fn ret(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::Return, ops)
}

pub(crate) const fn jcc(t: &'static str, cond: Condition, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::CondJump(cond), ops)
}

pub(crate) const fn group(number: u8) -> DecoderNode {
    DecoderNode::new("", NodeKind::Group(number), &[])
}

pub(crate) const fn sse_move(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::SseMove, ops)
}

pub(crate) const fn sse_arith(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::SseArithmetic(op), ops)
}

pub(crate) const fn sse_logic(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::SseLogical(op), ops)
}

pub(crate) const fn sse_shift(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::SseShift(op), ops)
}

pub(crate) const fn sse(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::SseGeneral, ops)
}

pub(crate) const fn float_escape() -> DecoderNode {
    DecoderNode::new("", NodeKind::FloatEscape, &[])
}

pub(crate) const fn float_group(number: u8) -> DecoderNode {
    DecoderNode::new("", NodeKind::FloatGroup(number), &[])
}

pub(crate) const fn fload(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::FloatLoad, ops)
}

pub(crate) const fn fstore(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::FloatStore, ops)
}

pub(crate) const fn farith(t: &'static str, op: RtlOperation, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::FloatArithmetic(op), ops)
}

pub(crate) const fn fgeneral(t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    DecoderNode::new(t, NodeKind::FloatGeneral, ops)
}

/// Operand spec shorthands, named after the Intel opcode map notation.
pub(crate) mod spec {
    use super::{AddrMode as A, OperandSpec as O, Width as W};

    pub const EB: O = O::new(A::E, W::B);
    pub const EW: O = O::new(A::E, W::W);
    pub const EV: O = O::new(A::E, W::V);
    pub const ED: O = O::new(A::E, W::D);
    pub const GB: O = O::new(A::G, W::B);
    pub const GW: O = O::new(A::G, W::W);
    pub const GV: O = O::new(A::G, W::V);
    pub const GD: O = O::new(A::G, W::D);
    pub const IB: O = O::new(A::I, W::B);
    pub const IW: O = O::new(A::I, W::W);
    pub const IV: O = O::new(A::I, W::V);
    pub const IBS: O = O::new(A::SignedI, W::Bs);
    pub const JB: O = O::new(A::J, W::B);
    pub const JV: O = O::new(A::J, W::V);
    pub const M: O = O::new(A::M, W::None);
    pub const MA: O = O::new(A::M, W::A);
    pub const MB: O = O::new(A::M, W::B);
    pub const MD: O = O::new(A::M, W::D);
    pub const MP: O = O::new(A::M, W::P);
    pub const MQ: O = O::new(A::M, W::Q);
    pub const MDQ: O = O::new(A::M, W::Dq);
    pub const MPS: O = O::new(A::M, W::Ps);
    pub const MPD: O = O::new(A::M, W::Pd);
    pub const SW: O = O::new(A::S, W::W);
    pub const RD: O = O::new(A::R, W::D);
    pub const CD: O = O::new(A::C, W::D);
    pub const DD: O = O::new(A::D, W::D);
    pub const TD: O = O::new(A::T, W::D);
    pub const AP: O = O::new(A::Dir, W::P);
    pub const OB: O = O::new(A::Off, W::B);
    pub const OV: O = O::new(A::Off, W::V);
    pub const XB: O = O::new(A::DsSi, W::B);
    pub const XV: O = O::new(A::DsSi, W::V);
    pub const YB: O = O::new(A::EsDi, W::B);
    pub const YV: O = O::new(A::EsDi, W::V);
    pub const ONE: O = O::new(A::One, W::B);

    // Fixed general registers: `v` width picks eAX or AX.
    pub const E_AX: O = O::new(A::Reg(0), W::V);
    pub const E_CX: O = O::new(A::Reg(1), W::V);
    pub const E_DX: O = O::new(A::Reg(2), W::V);
    pub const E_BX: O = O::new(A::Reg(3), W::V);
    pub const E_SP: O = O::new(A::Reg(4), W::V);
    pub const E_BP: O = O::new(A::Reg(5), W::V);
    pub const E_SI: O = O::new(A::Reg(6), W::V);
    pub const E_DI: O = O::new(A::Reg(7), W::V);
    pub const AL: O = O::new(A::Reg(0), W::B);
    pub const CL: O = O::new(A::Reg(1), W::B);
    pub const DL: O = O::new(A::Reg(2), W::B);
    pub const BL: O = O::new(A::Reg(3), W::B);
    pub const AH: O = O::new(A::Reg(4), W::B);
    pub const CH: O = O::new(A::Reg(5), W::B);
    pub const DH: O = O::new(A::Reg(6), W::B);
    pub const BH: O = O::new(A::Reg(7), W::B);
    pub const AX: O = O::new(A::Reg(0), W::W);
    pub const DX: O = O::new(A::Reg(2), W::W);
    pub const R32: [O; 8] = [
        O::new(A::Reg(0), W::D),
        O::new(A::Reg(1), W::D),
        O::new(A::Reg(2), W::D),
        O::new(A::Reg(3), W::D),
        O::new(A::Reg(4), W::D),
        O::new(A::Reg(5), W::D),
        O::new(A::Reg(6), W::D),
        O::new(A::Reg(7), W::D),
    ];
    pub const REGV: [O; 8] = [E_AX, E_CX, E_DX, E_BX, E_SP, E_BP, E_SI, E_DI];
    pub const REGB: [O; 8] = [AL, CL, DL, BL, AH, CH, DH, BH];

    pub const ES: O = O::new(A::Seg(0), W::W);
    pub const CS: O = O::new(A::Seg(1), W::W);
    pub const SS: O = O::new(A::Seg(2), W::W);
    pub const DS: O = O::new(A::Seg(3), W::W);
    pub const FS: O = O::new(A::Seg(4), W::W);
    pub const GS: O = O::new(A::Seg(5), W::W);

    // SSE / MMX
    pub const VPS: O = O::new(A::V, W::Ps);
    pub const VPD: O = O::new(A::V, W::Pd);
    pub const VSS: O = O::new(A::V, W::Ss);
    pub const VSD: O = O::new(A::V, W::Sd);
    pub const VDQ: O = O::new(A::V, W::Dq);
    pub const VQ: O = O::new(A::V, W::Q);
    pub const WPS: O = O::new(A::W, W::Ps);
    pub const WPD: O = O::new(A::W, W::Pd);
    pub const WSS: O = O::new(A::W, W::Ss);
    pub const WSD: O = O::new(A::W, W::Sd);
    pub const WDQ: O = O::new(A::W, W::Dq);
    pub const WQ: O = O::new(A::W, W::Q);
    pub const PQ: O = O::new(A::P, W::Q);
    pub const PD: O = O::new(A::P, W::D);
    pub const PPI: O = O::new(A::P, W::Pi);
    pub const QQ: O = O::new(A::Q, W::Q);
    pub const QD: O = O::new(A::Q, W::D);
    pub const QPI: O = O::new(A::Q, W::Pi);

    // x87
    pub const ST0: O = O::new(A::FpReg, W::St0);
    pub const STI: O = O::new(A::FpReg, W::Sti);
    pub const ESR: O = O::new(A::E, W::Single);
    pub const EDR: O = O::new(A::E, W::Double);
    pub const EER: O = O::new(A::E, W::Extended);
    pub const EI16: O = O::new(A::E, W::Int16);
    pub const EI32: O = O::new(A::E, W::Int32);
    pub const EI64: O = O::new(A::E, W::Int64);
    pub const EBCD: O = O::new(A::E, W::Bcd);
    pub const ENV: O = O::new(A::E, W::None);
}

#[cfg(test)]
mod tests {
    use super::spec::*;
    use super::*;

    #[test]
    fn test_node_operands_fill_in_order() {
        let node = arith("addS", RtlOperation::Add, &[EV, GV]);
        assert_eq!(node.operands, [Some(EV), Some(GV), None]);
        assert!(node.uses_modrm());
        assert!(!general("nop", &[]).uses_modrm());
        assert!(!jcc("je", Condition::Equal, &[JB]).uses_modrm());
    }

    #[test]
    fn test_width_sizes() {
        assert_eq!(Width::V.bytes(true), 4);
        assert_eq!(Width::V.bytes(false), 2);
        assert_eq!(Width::P.bytes(true), 6);
        assert_eq!(Width::Extended.bytes(true), 10);
        assert_eq!(Width::Dq.bytes(false), 16);
        assert_eq!(Width::B.register_bits(true), 8);
        assert_eq!(Width::D.register_bits(false), 32);
    }

    #[test]
    fn test_kind_classes() {
        assert!(NodeKind::SseMove.is_sse());
        assert!(!NodeKind::Move.is_sse());
        assert!(!NodeKind::Group(3).is_sse());
    }
}
