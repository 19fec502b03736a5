//! Legacy instruction prefixes.

use bitflags::bitflags;

use crate::register::{x86, Register};

bitflags! {
    /// Set of legacy prefixes seen before an opcode.
    ///
    /// Prefixes are accumulated by OR-ing: a repeated or conflicting prefix
    /// leaves every seen bit set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Prefixes: u16 {
        /// REP/REPE/REPZ (0xF3)
        const REPZ = 1 << 0;
        /// REPNE/REPNZ (0xF2)
        const REPNZ = 1 << 1;
        /// LOCK (0xF0)
        const LOCK = 1 << 2;
        /// CS segment override (0x2E)
        const CS = 1 << 3;
        /// SS segment override (0x36)
        const SS = 1 << 4;
        /// DS segment override (0x3E)
        const DS = 1 << 5;
        /// ES segment override (0x26)
        const ES = 1 << 6;
        /// FS segment override (0x64)
        const FS = 1 << 7;
        /// GS segment override (0x65)
        const GS = 1 << 8;
        /// Operand size override (0x66)
        const DATA = 1 << 9;
        /// Address size override (0x67)
        const ADDR = 1 << 10;
        /// FWAIT (0x9B)
        const FWAIT = 1 << 11;

        const SEGMENT = Self::CS.bits()
            | Self::SS.bits()
            | Self::DS.bits()
            | Self::ES.bits()
            | Self::FS.bits()
            | Self::GS.bits();
    }
}

impl Prefixes {
    /// Classifies a byte as a legacy prefix.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xF3 => Some(Self::REPZ),
            0xF2 => Some(Self::REPNZ),
            0xF0 => Some(Self::LOCK),
            0x2E => Some(Self::CS),
            0x36 => Some(Self::SS),
            0x3E => Some(Self::DS),
            0x26 => Some(Self::ES),
            0x64 => Some(Self::FS),
            0x65 => Some(Self::GS),
            0x66 => Some(Self::DATA),
            0x67 => Some(Self::ADDR),
            0x9B => Some(Self::FWAIT),
            _ => None,
        }
    }

    /// Returns the overriding segment register, if any.
    ///
    /// When several overrides were seen the first of CS, SS, DS, ES, FS, GS
    /// present wins.
    pub fn segment(&self) -> Option<Register> {
        if self.contains(Self::CS) {
            Some(x86::CS)
        } else if self.contains(Self::SS) {
            Some(x86::SS)
        } else if self.contains(Self::DS) {
            Some(x86::DS)
        } else if self.contains(Self::ES) {
            Some(x86::ES)
        } else if self.contains(Self::FS) {
            Some(x86::FS)
        } else if self.contains(Self::GS) {
            Some(x86::GS)
        } else {
            None
        }
    }

    /// Returns true if any segment override is present.
    pub fn has_segment_override(&self) -> bool {
        self.intersects(Self::SEGMENT)
    }
}
