//! Legacy prefix scanning and operand/address size selection.

use super::cursor::Cursor;
use ia32dis_core::Prefixes;

/// Toggle the driver XORs into the size-override flags.
///
/// A size is 32-bit when `(override_bit ^ toggle) == 1`. The driver always
/// passes 1, so 32-bit is selected exactly when the override prefix is absent.
pub(crate) const SIZE_TOGGLE: u16 = 1;

/// Consumes every legacy prefix byte at the cursor, in any order.
///
/// Stops at the first non-prefix byte or at the end of the buffer. All seen
/// prefixes are OR-ed together, repeats and conflicts included.
pub(crate) fn scan_prefixes(cursor: &mut Cursor<'_>) -> Prefixes {
    let mut prefixes = Prefixes::empty();
    while let Some(prefix) = cursor.peek().and_then(Prefixes::from_byte) {
        prefixes |= prefix;
        cursor.advance(1);
    }
    prefixes
}

/// Effective operand and address sizes for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SizeMode {
    pub operand_32: bool,
    pub address_32: bool,
}

impl SizeMode {
    pub fn from_prefixes(prefixes: Prefixes, toggle: u16) -> Self {
        let data = u16::from(prefixes.contains(Prefixes::DATA));
        let addr = u16::from(prefixes.contains(Prefixes::ADDR));
        Self {
            operand_32: (data ^ toggle) == 1,
            address_32: (addr ^ toggle) == 1,
        }
    }

    /// Operand width in bits for `v`-sized operands.
    pub fn operand_bits(&self) -> u16 {
        if self.operand_32 {
            32
        } else {
            16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TruncationPolicy;

    #[test]
    fn test_scan_stops_at_opcode() {
        let bytes = [0xF0, 0x66, 0x2E, 0x66, 0x01, 0xC8];
        let mut cursor = Cursor::new(&bytes, 0, TruncationPolicy::ZeroFill);
        let prefixes = scan_prefixes(&mut cursor);
        assert_eq!(prefixes, Prefixes::LOCK | Prefixes::DATA | Prefixes::CS);
        assert_eq!(cursor.pos(), 4);
    }

    #[test]
    fn test_scan_runs_to_end() {
        let bytes = [0xF3, 0xF2, 0x9B];
        let mut cursor = Cursor::new(&bytes, 0, TruncationPolicy::ZeroFill);
        let prefixes = scan_prefixes(&mut cursor);
        assert!(prefixes.contains(Prefixes::REPZ | Prefixes::REPNZ | Prefixes::FWAIT));
        assert!(cursor.at_end());
    }

    #[test]
    fn test_size_toggle() {
        let plain = SizeMode::from_prefixes(Prefixes::empty(), SIZE_TOGGLE);
        assert!(plain.operand_32 && plain.address_32);
        assert_eq!(plain.operand_bits(), 32);

        let data = SizeMode::from_prefixes(Prefixes::DATA, SIZE_TOGGLE);
        assert!(!data.operand_32 && data.address_32);
        assert_eq!(data.operand_bits(), 16);

        let addr = SizeMode::from_prefixes(Prefixes::ADDR, SIZE_TOGGLE);
        assert!(addr.operand_32 && !addr.address_32);

        // Toggle 0 reads the flags directly.
        let raw = SizeMode::from_prefixes(Prefixes::DATA, 0);
        assert!(raw.operand_32 && !raw.address_32);
    }
}
