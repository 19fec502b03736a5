//! IA-32 register catalogs.
//!
//! Every register is a small `Copy` handle identified by its class, its
//! hardware encoding number and its width. The 8/16/32-bit general purpose
//! registers share encoding numbers: `AL`, `AX` and `EAX` are all number 0
//! and differ only in size. Byte registers 4..7 name the high halves
//! (`AH`, `CH`, `DH`, `BH`) exactly as the ModR/M encoding does.

/// Register class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterClass {
    /// General purpose register (al, ax, eax, ...).
    General,
    /// Segment register (es, cs, ss, ds, fs, gs).
    Segment,
    /// x87 stack register st(0)..st(7).
    X87,
    /// MMX register mm0..mm7.
    Mmx,
    /// SSE register xmm0..xmm7.
    Xmm,
    /// Control register cr0..cr7.
    Control,
    /// Debug register db0..db7.
    Debug,
    /// Test register tr0..tr7.
    Test,
}

/// An IA-32 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Register {
    /// The class of register.
    pub class: RegisterClass,
    /// Hardware encoding number (0..7).
    pub number: u8,
    /// Size of the register in bits.
    pub size: u16,
}

impl Register {
    /// Creates a new register.
    pub const fn new(class: RegisterClass, number: u8, size: u16) -> Self {
        Self {
            class,
            number: number & 0x7,
            size,
        }
    }

    /// Returns the general purpose register with the given number and width.
    ///
    /// Widths other than 8 and 16 select the 32-bit register.
    pub const fn general(number: u8, size: u16) -> Self {
        let size = match size {
            8 | 16 => size,
            _ => 32,
        };
        Self::new(RegisterClass::General, number, size)
    }

    /// Returns the segment register with the given encoding number.
    ///
    /// Encodings 6 and 7 are reserved and yield `None`.
    pub const fn segment(number: u8) -> Option<Self> {
        if number < 6 {
            Some(Self::new(RegisterClass::Segment, number, 16))
        } else {
            None
        }
    }

    /// Returns x87 stack register `st(i)`.
    pub const fn st(index: u8) -> Self {
        Self::new(RegisterClass::X87, index, 80)
    }

    /// Returns MMX register `mm(i)`.
    pub const fn mmx(index: u8) -> Self {
        Self::new(RegisterClass::Mmx, index, 64)
    }

    /// Returns SSE register `xmm(i)`.
    pub const fn xmm(index: u8) -> Self {
        Self::new(RegisterClass::Xmm, index, 128)
    }

    /// Returns control register `cr(i)`.
    pub const fn control(index: u8) -> Self {
        Self::new(RegisterClass::Control, index, 32)
    }

    /// Returns debug register `db(i)`.
    pub const fn debug(index: u8) -> Self {
        Self::new(RegisterClass::Debug, index, 32)
    }

    /// Returns test register `tr(i)`.
    pub const fn test(index: u8) -> Self {
        Self::new(RegisterClass::Test, index, 32)
    }

    /// Returns the canonical (AT&T, without `%`) name for this register.
    ///
    /// Numbers outside the catalog (a hand-built or deserialized handle)
    /// name as `?`.
    pub fn name(&self) -> &'static str {
        let names: &[&'static str] = match self.class {
            RegisterClass::General => match self.size {
                8 => &GPR8_NAMES,
                16 => &GPR16_NAMES,
                _ => &GPR32_NAMES,
            },
            RegisterClass::Segment => &SEGMENT_NAMES,
            RegisterClass::X87 => &ST_NAMES,
            RegisterClass::Mmx => &MMX_NAMES,
            RegisterClass::Xmm => &XMM_NAMES,
            RegisterClass::Control => &CONTROL_NAMES,
            RegisterClass::Debug => &DEBUG_NAMES,
            RegisterClass::Test => &TEST_NAMES,
        };
        names.get(self.number as usize).copied().unwrap_or("?")
    }

    /// Returns true if this is a general purpose register.
    pub fn is_general(&self) -> bool {
        self.class == RegisterClass::General
    }

    /// Returns true if this is an x87 stack register.
    pub fn is_float(&self) -> bool {
        self.class == RegisterClass::X87
    }

    /// Returns true if this is an MMX or XMM register.
    pub fn is_simd(&self) -> bool {
        matches!(self.class, RegisterClass::Mmx | RegisterClass::Xmm)
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.name())
    }
}

const GPR8_NAMES: [&str; 8] = ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"];
const GPR16_NAMES: [&str; 8] = ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"];
const GPR32_NAMES: [&str; 8] = ["eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi"];
const SEGMENT_NAMES: [&str; 6] = ["es", "cs", "ss", "ds", "fs", "gs"];
const ST_NAMES: [&str; 8] = [
    "st(0)", "st(1)", "st(2)", "st(3)", "st(4)", "st(5)", "st(6)", "st(7)",
];
const MMX_NAMES: [&str; 8] = ["mm0", "mm1", "mm2", "mm3", "mm4", "mm5", "mm6", "mm7"];
const XMM_NAMES: [&str; 8] = [
    "xmm0", "xmm1", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7",
];
const CONTROL_NAMES: [&str; 8] = ["cr0", "cr1", "cr2", "cr3", "cr4", "cr5", "cr6", "cr7"];
const DEBUG_NAMES: [&str; 8] = ["db0", "db1", "db2", "db3", "db4", "db5", "db6", "db7"];
const TEST_NAMES: [&str; 8] = ["tr0", "tr1", "tr2", "tr3", "tr4", "tr5", "tr6", "tr7"];

/// Named register handles.
pub mod x86 {
    use super::{Register, RegisterClass};

    const fn gpr(number: u8, size: u16) -> Register {
        Register::new(RegisterClass::General, number, size)
    }

    const fn seg(number: u8) -> Register {
        Register::new(RegisterClass::Segment, number, 16)
    }

    /// 32-bit general register by encoding number.
    pub const fn gpr32(number: u8) -> Register {
        gpr(number, 32)
    }

    // 32-bit
    pub const EAX: Register = gpr(0, 32);
    pub const ECX: Register = gpr(1, 32);
    pub const EDX: Register = gpr(2, 32);
    pub const EBX: Register = gpr(3, 32);
    pub const ESP: Register = gpr(4, 32);
    pub const EBP: Register = gpr(5, 32);
    pub const ESI: Register = gpr(6, 32);
    pub const EDI: Register = gpr(7, 32);

    // 16-bit
    pub const AX: Register = gpr(0, 16);
    pub const CX: Register = gpr(1, 16);
    pub const DX: Register = gpr(2, 16);
    pub const BX: Register = gpr(3, 16);
    pub const SP: Register = gpr(4, 16);
    pub const BP: Register = gpr(5, 16);
    pub const SI: Register = gpr(6, 16);
    pub const DI: Register = gpr(7, 16);

    // 8-bit
    pub const AL: Register = gpr(0, 8);
    pub const CL: Register = gpr(1, 8);
    pub const DL: Register = gpr(2, 8);
    pub const BL: Register = gpr(3, 8);
    pub const AH: Register = gpr(4, 8);
    pub const CH: Register = gpr(5, 8);
    pub const DH: Register = gpr(6, 8);
    pub const BH: Register = gpr(7, 8);

    // Segment registers, hardware encoding order
    pub const ES: Register = seg(0);
    pub const CS: Register = seg(1);
    pub const SS: Register = seg(2);
    pub const DS: Register = seg(3);
    pub const FS: Register = seg(4);
    pub const GS: Register = seg(5);

    pub const ST0: Register = Register::st(0);
}

/// 8-bit general purpose registers indexed by encoding number.
pub static GPR8: [Register; 8] = catalog(RegisterClass::General, 8);
/// 16-bit general purpose registers indexed by encoding number.
pub static GPR16: [Register; 8] = catalog(RegisterClass::General, 16);
/// 32-bit general purpose registers indexed by encoding number.
pub static GPR32: [Register; 8] = catalog(RegisterClass::General, 32);
/// Segment registers indexed by encoding number.
pub static SEGMENT: [Register; 6] = [x86::ES, x86::CS, x86::SS, x86::DS, x86::FS, x86::GS];
/// x87 stack registers.
pub static X87: [Register; 8] = catalog(RegisterClass::X87, 80);
/// MMX registers.
pub static MMX: [Register; 8] = catalog(RegisterClass::Mmx, 64);
/// XMM registers.
pub static XMM: [Register; 8] = catalog(RegisterClass::Xmm, 128);
/// Control registers.
pub static CONTROL: [Register; 8] = catalog(RegisterClass::Control, 32);
/// Debug registers.
pub static DEBUG: [Register; 8] = catalog(RegisterClass::Debug, 32);
/// Test registers.
pub static TEST: [Register; 8] = catalog(RegisterClass::Test, 32);

const fn catalog(class: RegisterClass, size: u16) -> [Register; 8] {
    let mut regs = [Register::new(class, 0, size); 8];
    let mut i = 0;
    while i < 8 {
        regs[i] = Register::new(class, i as u8, size);
        i += 1;
    }
    regs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_aliases_share_number() {
        assert_eq!(x86::EAX.number, x86::AX.number);
        assert_eq!(x86::AX.number, x86::AL.number);
        assert_eq!(x86::EAX.name(), "eax");
        assert_eq!(x86::AX.name(), "ax");
        assert_eq!(x86::AL.name(), "al");
    }

    #[test]
    fn test_high_byte_registers() {
        assert_eq!(Register::general(4, 8).name(), "ah");
        assert_eq!(Register::general(7, 8).name(), "bh");
        assert_eq!(Register::general(4, 32).name(), "esp");
    }

    #[test]
    fn test_segment_encoding_order() {
        let names: Vec<_> = SEGMENT.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["es", "cs", "ss", "ds", "fs", "gs"]);
        assert!(Register::segment(6).is_none());
        assert!(Register::segment(7).is_none());
    }

    #[test]
    fn test_catalogs() {
        assert_eq!(X87[3].name(), "st(3)");
        assert_eq!(MMX[7].name(), "mm7");
        assert_eq!(XMM[2].to_string(), "%xmm2");
        assert_eq!(CONTROL[0].name(), "cr0");
        assert_eq!(DEBUG[7].name(), "db7");
        assert_eq!(TEST[6].name(), "tr6");
        assert_eq!(GPR32[5], x86::EBP);
    }

    #[test]
    fn test_out_of_range_number_names_as_placeholder() {
        let reg = Register {
            class: RegisterClass::Control,
            number: 12,
            size: 32,
        };
        assert_eq!(reg.name(), "?");
        assert_eq!(reg.to_string(), "%?");
        let seg = Register {
            class: RegisterClass::Segment,
            number: 7,
            size: 16,
        };
        assert_eq!(seg.name(), "?");
    }
}
