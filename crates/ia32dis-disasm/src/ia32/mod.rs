//! IA-32 instruction decoder.
//!
//! This module implements a table-driven decoder for 32-bit protected mode
//! x86 code. It handles:
//! - Legacy prefixes (REP, LOCK, segment overrides, operand/address size, FWAIT)
//! - ModR/M and SIB byte decoding, with 16-bit addressing under `0x67`
//! - The one-byte map, the `0F` map and its `F2`/`F3`/`66` variants
//! - ModR/M `reg` selected opcode groups
//! - The x87 escape maps
//!
//! Every table is built by a `const fn` into a `static`, so the tables are
//! fixed at compile time and shared read-only by all decoders.

mod cursor;
mod decoder;
mod groups;
mod modrm;
mod node;
mod opcodes;
mod opcodes_0f;
mod opcodes_sse;
mod prefix;
mod x87;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use decoder::Ia32Disassembler;
pub use node::{AddrMode, DecoderNode, NodeKind, OperandSpec, Width};

/// The top-level and nested opcode maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeMap {
    /// One-byte opcodes.
    OneByte,
    /// `0F xx` opcodes.
    TwoByte,
    /// `F2 0F xx` opcodes.
    TwoByteF2,
    /// `F3 0F xx` opcodes.
    TwoByteF3,
    /// `66 0F xx` opcodes.
    TwoByte66,
    /// Group table by number, indexed by ModR/M `reg`.
    Group(u8),
    /// x87 memory forms for escape `D8 + n`, indexed by ModR/M `reg`.
    FloatMemory(u8),
    /// x87 register forms for escape `D8 + n`, indexed by ModR/M `reg`.
    FloatRegister(u8),
    /// x87 group table by number, indexed by ModR/M `rm`.
    FloatGroup(u8),
}

impl OpcodeMap {
    /// Every map, in a fixed order.
    pub fn all() -> Vec<OpcodeMap> {
        let mut maps = vec![
            Self::OneByte,
            Self::TwoByte,
            Self::TwoByteF2,
            Self::TwoByteF3,
            Self::TwoByte66,
        ];
        maps.extend((0..groups::GROUP_COUNT as u8).map(Self::Group));
        maps.extend((0..8).map(Self::FloatMemory));
        maps.extend((0..8).map(Self::FloatRegister));
        maps.extend((0..x87::FLOAT_GROUP_COUNT as u8).map(Self::FloatGroup));
        maps
    }

    /// The slots of this map, or `None` if the map number does not exist.
    pub fn slots(self) -> Option<&'static [Option<DecoderNode>]> {
        let slots: &'static [Option<DecoderNode>] = match self {
            Self::OneByte => &opcodes::ONE_BYTE_TABLE,
            Self::TwoByte => &opcodes_0f::TWO_BYTE_TABLE,
            Self::TwoByteF2 => &opcodes_sse::TWO_BYTE_F2_TABLE,
            Self::TwoByteF3 => &opcodes_sse::TWO_BYTE_F3_TABLE,
            Self::TwoByte66 => &opcodes_sse::TWO_BYTE_66_TABLE,
            Self::Group(n) => groups::GROUP_TABLES.get(n as usize)?,
            Self::FloatMemory(n) => x87::FLOAT_MAP_ONE.get(n as usize)?,
            Self::FloatRegister(n) => x87::FLOAT_MAP_TWO.get(n as usize)?,
            Self::FloatGroup(n) => x87::FLOAT_GROUP_TABLES.get(n as usize)?,
        };
        Some(slots)
    }
}

/// Returns the node stored at `index` of `map`. `None` is an undefined slot.
pub fn lookup(map: OpcodeMap, index: u8) -> Option<&'static DecoderNode> {
    map.slots()?.get(index as usize)?.as_ref()
}

/// Hash over every slot of every table.
///
/// Two calls in the same build always agree; the value changes whenever any
/// table entry changes.
pub fn table_fingerprint() -> u64 {
    let mut hasher = DefaultHasher::new();
    for map in OpcodeMap::all() {
        map.hash(&mut hasher);
        map.slots().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(OpcodeMap::OneByte, 0x90).unwrap().template, "nop");
        assert_eq!(lookup(OpcodeMap::TwoByteF3, 0x10).unwrap().template, "movss");
        assert!(lookup(OpcodeMap::OneByte, 0xD6).is_none());
        assert!(lookup(OpcodeMap::Group(200), 0).is_none());
        assert!(lookup(OpcodeMap::FloatGroup(2), 7).is_none());
        assert_eq!(lookup(OpcodeMap::FloatMemory(1), 0).unwrap().template, "flds");
    }

    #[test]
    fn test_slot_counts() {
        assert_eq!(OpcodeMap::OneByte.slots().unwrap().len(), 256);
        assert_eq!(OpcodeMap::Group(0).slots().unwrap().len(), 8);
        assert_eq!(OpcodeMap::FloatRegister(7).slots().unwrap().len(), 8);
        assert!(OpcodeMap::FloatMemory(8).slots().is_none());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(table_fingerprint(), table_fingerprint());
    }
}
