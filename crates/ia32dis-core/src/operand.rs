//! Instruction operand types.

use crate::symbol::SymbolResolver;
use crate::Register;

/// An instruction operand.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// Register operand.
    Register(Register),
    /// Immediate value.
    Immediate(Immediate),
    /// Memory reference through base/index/scale/displacement.
    Memory(MemoryRef),
    /// Absolute far pointer (`ljmp $sel,$off`).
    Direct(DirectAddress),
    /// PC-relative branch target.
    PcRelative(PcRelative),
}

impl Operand {
    /// Creates a register operand.
    pub fn reg(reg: Register) -> Self {
        Self::Register(reg)
    }

    /// Creates a sign-extended immediate operand of `size` bits.
    pub fn imm(value: i64, size: u8) -> Self {
        Self::Immediate(Immediate {
            value,
            size,
            signed: true,
        })
    }

    /// Creates an unsigned immediate operand of `size` bits.
    pub fn imm_unsigned(value: u64, size: u8) -> Self {
        Self::Immediate(Immediate {
            value: value as i64,
            size,
            signed: false,
        })
    }

    /// Creates a PC-relative operand.
    pub fn pc_rel(displacement: i64, instruction_length: usize) -> Self {
        Self::PcRelative(PcRelative {
            displacement,
            instruction_length,
        })
    }

    /// Returns true if this is a register operand.
    pub fn is_register(&self) -> bool {
        matches!(self, Self::Register(_))
    }

    /// Returns true if this is an immediate operand.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Returns true if this is a memory operand.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }

    /// Returns true if this operand names an address rather than a value
    /// (memory reference or far pointer).
    pub fn is_address(&self) -> bool {
        matches!(self, Self::Memory(_) | Self::Direct(_))
    }

    /// Returns the register, if this is a register operand.
    pub fn as_register(&self) -> Option<Register> {
        match self {
            Self::Register(reg) => Some(*reg),
            _ => None,
        }
    }

    /// Returns the memory reference, if this is a memory operand.
    pub fn as_memory(&self) -> Option<&MemoryRef> {
        match self {
            Self::Memory(mem) => Some(mem),
            _ => None,
        }
    }

    /// Renders the operand in AT&T syntax.
    ///
    /// `pc` is the address of the instruction owning the operand and is only
    /// used to resolve PC-relative targets through `symbols`.
    pub fn render(&self, pc: u64, symbols: &dyn SymbolResolver) -> String {
        match self {
            Self::PcRelative(rel) => symbols.describe(rel.target(pc)),
            _ => self.to_string(),
        }
    }
}

/// Immediate value operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Immediate {
    /// The value, sign- or zero-extended to 64 bits.
    pub value: i64,
    /// Encoded size in bits.
    pub size: u8,
    /// Whether the value was sign-extended.
    pub signed: bool,
}

impl Immediate {
    /// Returns the value as an unsigned u64.
    pub fn as_u64(&self) -> u64 {
        self.value as u64
    }

    /// Returns the value as a signed i64.
    pub fn as_i64(&self) -> i64 {
        self.value
    }
}

/// Memory reference operand: `seg:disp(base,index,scale)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryRef {
    /// Segment override, if a segment prefix was present.
    pub segment: Option<Register>,
    /// Base register (if any).
    pub base: Option<Register>,
    /// Index register (if any).
    pub index: Option<Register>,
    /// Scale factor for index (1, 2, 4, or 8).
    pub scale: u8,
    /// Displacement, sign-extended.
    pub displacement: i64,
    /// Access size in bytes (0 when the access has no natural width, e.g. `lea`).
    pub size: u8,
}

impl MemoryRef {
    /// Creates a memory reference with base and displacement.
    pub fn base_disp(base: Register, displacement: i64, size: u8) -> Self {
        Self {
            segment: None,
            base: Some(base),
            index: None,
            scale: 1,
            displacement,
            size,
        }
    }

    /// Creates a displacement-only (absolute) memory reference.
    pub fn absolute(address: i64, size: u8) -> Self {
        Self {
            segment: None,
            base: None,
            index: None,
            scale: 1,
            displacement: address,
            size,
        }
    }

    /// Creates a full SIB-style memory reference.
    pub fn sib(
        base: Option<Register>,
        index: Option<Register>,
        scale: u8,
        displacement: i64,
        size: u8,
    ) -> Self {
        Self {
            segment: None,
            base,
            index,
            scale,
            displacement,
            size,
        }
    }

    /// Sets the segment override.
    pub fn with_segment(mut self, segment: Option<Register>) -> Self {
        self.segment = segment;
        self
    }

    /// Returns true if the reference renders with a `(base,index,scale)` part.
    pub fn has_register_part(&self) -> bool {
        self.base.is_some() || self.index.is_some() || self.scale > 1
    }
}

/// Absolute far address: optional segment selector plus offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectAddress {
    /// Segment selector (present for far pointers).
    pub segment: Option<u16>,
    /// Offset within the segment.
    pub offset: u32,
}

/// PC-relative branch displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcRelative {
    /// Signed displacement from the end of the instruction.
    pub displacement: i64,
    /// Length of the instruction carrying the displacement.
    pub instruction_length: usize,
}

impl PcRelative {
    /// Resolves the branch target for an instruction starting at `pc`.
    pub fn target(&self, pc: u64) -> u64 {
        pc.wrapping_add(self.instruction_length as u64)
            .wrapping_add(self.displacement as u64)
    }
}

fn write_signed_hex(f: &mut std::fmt::Formatter<'_>, value: i64) -> std::fmt::Result {
    if value < 0 {
        write!(f, "-{:#x}", value.unsigned_abs())
    } else {
        write!(f, "{:#x}", value)
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register(reg) => write!(f, "{}", reg),
            Self::Immediate(imm) => {
                write!(f, "$")?;
                if imm.signed {
                    write_signed_hex(f, imm.value)
                } else {
                    write!(f, "{:#x}", imm.value as u64)
                }
            }
            Self::Memory(mem) => {
                if let Some(seg) = mem.segment {
                    write!(f, "{}:", seg)?;
                }
                if !mem.has_register_part() {
                    return write!(f, "{:#x}", mem.displacement as u32);
                }
                if mem.displacement != 0 {
                    write_signed_hex(f, mem.displacement)?;
                }
                write!(f, "(")?;
                if let Some(base) = mem.base {
                    write!(f, "{}", base)?;
                }
                if let Some(index) = mem.index {
                    write!(f, ",{},{}", index, mem.scale)?;
                } else if mem.scale > 1 {
                    write!(f, ",,{}", mem.scale)?;
                }
                write!(f, ")")
            }
            Self::Direct(dir) => match dir.segment {
                Some(sel) => write!(f, "${:#x},${:#x}", sel, dir.offset),
                None => write!(f, "{:#x}", dir.offset),
            },
            Self::PcRelative(rel) => {
                write!(f, ".")?;
                let delta = rel.displacement + rel.instruction_length as i64;
                if delta < 0 {
                    write!(f, "-{:#x}", delta.unsigned_abs())
                } else {
                    write!(f, "+{:#x}", delta)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::x86;
    use crate::symbol::NoSymbols;

    #[test]
    fn test_memory_sib_render() {
        let mem = MemoryRef::sib(Some(x86::ECX), Some(x86::EAX), 4, 0x10, 4);
        assert_eq!(Operand::Memory(mem).to_string(), "0x10(%ecx,%eax,4)");
    }

    #[test]
    fn test_memory_without_registers_renders_absolute() {
        let mem = MemoryRef::absolute(0x8049000, 4);
        assert_eq!(Operand::Memory(mem).to_string(), "0x8049000");
    }

    #[test]
    fn test_memory_segment_and_negative_disp() {
        let mem = MemoryRef::base_disp(x86::EBP, -8, 4).with_segment(Some(x86::FS));
        assert_eq!(Operand::Memory(mem).to_string(), "%fs:-0x8(%ebp)");
    }

    #[test]
    fn test_memory_index_only() {
        let mem = MemoryRef::sib(None, Some(x86::ESI), 8, 0x100, 4);
        assert_eq!(Operand::Memory(mem).to_string(), "0x100(,%esi,8)");
    }

    #[test]
    fn test_immediate_render() {
        assert_eq!(Operand::imm(-1, 8).to_string(), "$-0x1");
        assert_eq!(Operand::imm_unsigned(0xff, 8).to_string(), "$0xff");
    }

    #[test]
    fn test_pc_relative_target() {
        let rel = PcRelative {
            displacement: -2,
            instruction_length: 2,
        };
        assert_eq!(rel.target(0x1000), 0x1000);
        let op = Operand::pc_rel(0x10, 5);
        assert_eq!(op.render(0x2000, &NoSymbols), "0x2015");
        assert_eq!(op.to_string(), ".+0x15");
    }

    #[test]
    fn test_direct_render() {
        let far = Operand::Direct(DirectAddress {
            segment: Some(0x10),
            offset: 0x1000,
        });
        assert_eq!(far.to_string(), "$0x10,$0x1000");
    }
}
