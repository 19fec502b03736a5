//! ModR/M and SIB byte decoding.

use super::cursor::Cursor;
use crate::DecodeError;
use ia32dis_core::register::x86;
use ia32dis_core::{MemoryRef, Register};

/// Decoded ModR/M byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModRM {
    /// The byte as read.
    pub byte: u8,
    /// Mod field (2 bits)
    pub mod_: u8,
    /// Reg field (3 bits)
    pub reg: u8,
    /// R/M field (3 bits)
    pub rm: u8,
}

impl ModRM {
    pub fn parse(byte: u8) -> Self {
        Self {
            byte,
            mod_: (byte >> 6) & 0x3,
            reg: (byte >> 3) & 0x7,
            rm: byte & 0x7,
        }
    }

    /// Returns true if this ModR/M encodes a register operand (mod=11).
    pub fn is_register(&self) -> bool {
        self.mod_ == 0b11
    }

    /// Returns true if this ModR/M requires a SIB byte (32-bit addressing).
    pub fn needs_sib(&self) -> bool {
        self.mod_ != 0b11 && self.rm == 0b100
    }
}

/// Decoded SIB byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sib {
    /// Scale (2 bits) - actual scale is 1 << scale
    pub scale: u8,
    pub index: u8,
    pub base: u8,
}

impl Sib {
    pub fn parse(byte: u8) -> Self {
        Self {
            scale: (byte >> 6) & 0x3,
            index: (byte >> 3) & 0x7,
            base: byte & 0x7,
        }
    }

    /// Returns the actual scale factor (1, 2, 4, or 8).
    pub fn scale_factor(&self) -> u8 {
        1 << self.scale
    }
}

/// Reads the SIB byte and displacement of a 32-bit memory operand.
///
/// `modrm` must not be a register form.
pub(crate) fn decode_memory32(
    cursor: &mut Cursor<'_>,
    modrm: ModRM,
    size: u8,
) -> Result<MemoryRef, DecodeError> {
    let mut base = None;
    let mut index = None;
    let mut scale = 1;
    let mut disp32 = modrm.mod_ == 0b10;

    if modrm.needs_sib() {
        let sib = Sib::parse(cursor.read_u8()?);
        // Index 100 means no index.
        if sib.index != 0b100 {
            index = Some(x86::gpr32(sib.index));
            scale = sib.scale_factor();
        }
        if sib.base == 0b101 && modrm.mod_ == 0b00 {
            disp32 = true;
        } else {
            base = Some(x86::gpr32(sib.base));
        }
    } else if modrm.rm == 0b101 && modrm.mod_ == 0b00 {
        disp32 = true;
    } else {
        base = Some(x86::gpr32(modrm.rm));
    }

    let displacement = if disp32 {
        i64::from(cursor.read_i32()?)
    } else if modrm.mod_ == 0b01 {
        i64::from(cursor.read_i8()?)
    } else {
        0
    };

    Ok(MemoryRef::sib(base, index, scale, displacement, size))
}

/// Base/index pairs of the 16-bit addressing forms, indexed by `rm`.
const MEMORY16: [(Register, Option<Register>); 8] = [
    (x86::BX, Some(x86::SI)),
    (x86::BX, Some(x86::DI)),
    (x86::BP, Some(x86::SI)),
    (x86::BP, Some(x86::DI)),
    (x86::SI, None),
    (x86::DI, None),
    (x86::BP, None),
    (x86::BX, None),
];

/// Reads the displacement of a 16-bit memory operand.
pub(crate) fn decode_memory16(
    cursor: &mut Cursor<'_>,
    modrm: ModRM,
    size: u8,
) -> Result<MemoryRef, DecodeError> {
    if modrm.mod_ == 0b00 && modrm.rm == 0b110 {
        let disp = cursor.read_u16()?;
        return Ok(MemoryRef::absolute(i64::from(disp), size));
    }

    let (base, index) = MEMORY16[modrm.rm as usize];
    let displacement = match modrm.mod_ {
        0b01 => i64::from(cursor.read_i8()?),
        0b10 => i64::from(cursor.read_i16()?),
        _ => 0,
    };
    Ok(MemoryRef::sib(Some(base), index, 1, displacement, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TruncationPolicy;

    fn cursor(bytes: &[u8]) -> Cursor<'_> {
        Cursor::new(bytes, 0, TruncationPolicy::Error)
    }

    #[test]
    fn test_modrm_fields() {
        let modrm = ModRM::parse(0x84);
        assert_eq!((modrm.mod_, modrm.reg, modrm.rm), (2, 0, 4));
        assert!(modrm.needs_sib());
        assert!(ModRM::parse(0xC1).is_register());
        assert!(!ModRM::parse(0xC4).needs_sib());
    }

    #[test]
    fn test_sib_disp32() {
        // [ecx+eax*4+0x10]
        let bytes = [0x81, 0x10, 0x00, 0x00, 0x00];
        let mut c = cursor(&bytes);
        let mem = decode_memory32(&mut c, ModRM::parse(0x84), 4).unwrap();
        assert_eq!(mem.base, Some(x86::ECX));
        assert_eq!(mem.index, Some(x86::EAX));
        assert_eq!(mem.scale, 4);
        assert_eq!(mem.displacement, 0x10);
        assert_eq!(c.pos(), 5);
    }

    #[test]
    fn test_absolute_disp32() {
        let bytes = [0x00, 0x90, 0x04, 0x08];
        let mut c = cursor(&bytes);
        let mem = decode_memory32(&mut c, ModRM::parse(0x05), 4).unwrap();
        assert_eq!(mem.base, None);
        assert_eq!(mem.index, None);
        assert_eq!(mem.displacement, 0x0804_9000);
    }

    #[test]
    fn test_sib_no_base_no_index() {
        // mod=00 rm=100, SIB base=101 index=100: disp32 only
        let bytes = [0x25, 0x78, 0x56, 0x34, 0x12];
        let mut c = cursor(&bytes);
        let mem = decode_memory32(&mut c, ModRM::parse(0x04), 4).unwrap();
        assert_eq!(mem.base, None);
        assert_eq!(mem.index, None);
        assert_eq!(mem.displacement, 0x1234_5678);
    }

    #[test]
    fn test_sib_ebp_base_with_disp8() {
        // mod=01 rm=100, SIB base=101: base is EBP, disp8 follows
        let bytes = [0x65, 0xf8];
        let mut c = cursor(&bytes);
        let mem = decode_memory32(&mut c, ModRM::parse(0x44), 4).unwrap();
        assert_eq!(mem.base, Some(x86::EBP));
        assert_eq!(mem.index, None);
        assert_eq!(mem.displacement, -8);
    }

    #[test]
    fn test_memory16_forms() {
        let mut c = cursor(&[]);
        let mem = decode_memory16(&mut c, ModRM::parse(0x00), 2).unwrap();
        assert_eq!((mem.base, mem.index), (Some(x86::BX), Some(x86::SI)));

        let bytes = [0x34, 0x12];
        let mut c = cursor(&bytes);
        let mem = decode_memory16(&mut c, ModRM::parse(0x06), 2).unwrap();
        assert_eq!(mem.base, None);
        assert_eq!(mem.displacement, 0x1234);

        let bytes = [0xfe];
        let mut c = cursor(&bytes);
        let mem = decode_memory16(&mut c, ModRM::parse(0x46), 2).unwrap();
        assert_eq!(mem.base, Some(x86::BP));
        assert_eq!(mem.displacement, -2);
    }

    #[test]
    fn test_truncated_sib() {
        let mut c = cursor(&[]);
        assert!(matches!(
            decode_memory32(&mut c, ModRM::parse(0x04), 4),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
