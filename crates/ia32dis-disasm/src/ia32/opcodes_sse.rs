//! Two-byte maps selected by a mandatory `F2`, `F3` or `66` prefix.

use super::groups::*;
use super::node::spec::*;
use super::node::*;
use super::opcodes_0f::TWO_BYTE_TABLE;
use ia32dis_core::Prefixes;
use ia32dis_core::RtlOperation::*;

/// `F2 0F xx` table.
pub static TWO_BYTE_F2_TABLE: [Option<DecoderNode>; 256] = build_f2_table();
/// `F3 0F xx` table.
pub static TWO_BYTE_F3_TABLE: [Option<DecoderNode>; 256] = build_f3_table();
/// `66 0F xx` table.
pub static TWO_BYTE_66_TABLE: [Option<DecoderNode>; 256] = build_66_table();

/// Looks up a two-byte opcode.
///
/// Mandatory prefix precedence is F2, then F3, then 66. When the selected
/// table has no entry the plain two-byte table is used, the prefix then
/// acting as an ordinary prefix.
pub fn lookup_two_byte(prefixes: Prefixes, opcode: u8) -> Option<&'static DecoderNode> {
    let idx = opcode as usize;
    let prefixed = if prefixes.contains(Prefixes::REPNZ) {
        TWO_BYTE_F2_TABLE[idx].as_ref()
    } else if prefixes.contains(Prefixes::REPZ) {
        TWO_BYTE_F3_TABLE[idx].as_ref()
    } else if prefixes.contains(Prefixes::DATA) {
        TWO_BYTE_66_TABLE[idx].as_ref()
    } else {
        None
    };
    prefixed.or(TWO_BYTE_TABLE[idx].as_ref())
}

/// Builds the F2 table. Pure: every call yields the same table.
pub const fn build_f2_table() -> [Option<DecoderNode>; 256] {
    let mut t: [Option<DecoderNode>; 256] = [None; 256];

    t[0x10] = Some(sse_move("movsd", &[VSD, WSD]));
    t[0x11] = Some(sse_move("movsd", &[WSD, VSD]));
    t[0x2A] = Some(sse("cvtsi2sd", &[VSD, ED]));
    t[0x2C] = Some(sse("cvttsd2si", &[GD, WSD]));
    t[0x2D] = Some(sse("cvtsd2si", &[GD, WSD]));
    t[0x51] = Some(sse("sqrtsd", &[VSD, WSD]));
    t[0x58] = Some(sse_arith("addsd", Add, &[VSD, WSD]));
    t[0x59] = Some(sse_arith("mulsd", SignedMul, &[VSD, WSD]));
    t[0x5A] = Some(sse("cvtsd2ss", &[VSS, WSD]));
    t[0x5C] = Some(sse_arith("subsd", Sub, &[VSD, WSD]));
    t[0x5D] = Some(sse("minsd", &[VSD, WSD]));
    t[0x5E] = Some(sse_arith("divsd", SignedDiv, &[VSD, WSD]));
    t[0x5F] = Some(sse("maxsd", &[VSD, WSD]));
    t[0x70] = Some(sse("pshuflw", &[VDQ, WDQ, IB]));
    t[0xC2] = Some(sse_arith("cmpsd", Compare, &[VSD, WSD, IB]));
    t[0xD6] = Some(sse_move("movdq2q", &[PQ, WQ]));
    t[0xE6] = Some(sse("cvtpd2dq", &[VDQ, WPD]));

    t
}

/// Builds the F3 table. Pure: every call yields the same table.
pub const fn build_f3_table() -> [Option<DecoderNode>; 256] {
    let mut t: [Option<DecoderNode>; 256] = [None; 256];

    t[0x10] = Some(sse_move("movss", &[VSS, WSS]));
    t[0x11] = Some(sse_move("movss", &[WSS, VSS]));
    t[0x2A] = Some(sse("cvtsi2ss", &[VSS, ED]));
    t[0x2C] = Some(sse("cvttss2si", &[GD, WSS]));
    t[0x2D] = Some(sse("cvtss2si", &[GD, WSS]));
    t[0x51] = Some(sse("sqrtss", &[VSS, WSS]));
    t[0x52] = Some(sse("rsqrtss", &[VSS, WSS]));
    t[0x53] = Some(sse("rcpss", &[VSS, WSS]));
    t[0x58] = Some(sse_arith("addss", Add, &[VSS, WSS]));
    t[0x59] = Some(sse_arith("mulss", SignedMul, &[VSS, WSS]));
    t[0x5A] = Some(sse("cvtss2sd", &[VSD, WSS]));
    t[0x5B] = Some(sse("cvttps2dq", &[VDQ, WPS]));
    t[0x5C] = Some(sse_arith("subss", Sub, &[VSS, WSS]));
    t[0x5D] = Some(sse("minss", &[VSS, WSS]));
    t[0x5E] = Some(sse_arith("divss", SignedDiv, &[VSS, WSS]));
    t[0x5F] = Some(sse("maxss", &[VSS, WSS]));
    t[0x6F] = Some(sse_move("movdqu", &[VDQ, WDQ]));
    t[0x70] = Some(sse("pshufhw", &[VDQ, WDQ, IB]));
    t[0x7E] = Some(sse_move("movq", &[VQ, WQ]));
    t[0x7F] = Some(sse_move("movdqu", &[WDQ, VDQ]));
    t[0xC2] = Some(sse_arith("cmpss", Compare, &[VSS, WSS, IB]));
    t[0xD6] = Some(sse_move("movq2dq", &[VDQ, QQ]));
    t[0xE6] = Some(sse("cvtdq2pd", &[VPD, WQ]));

    t
}

/// Builds the 66 table. Pure: every call yields the same table.
pub const fn build_66_table() -> [Option<DecoderNode>; 256] {
    let mut t: [Option<DecoderNode>; 256] = [None; 256];

    t[0x10] = Some(sse_move("movupd", &[VPD, WPD]));
    t[0x11] = Some(sse_move("movupd", &[WPD, VPD]));
    t[0x12] = Some(sse_move("movlpd", &[VQ, MQ]));
    t[0x13] = Some(sse_move("movlpd", &[MQ, VQ]));
    t[0x14] = Some(sse("unpcklpd", &[VPD, WQ]));
    t[0x15] = Some(sse("unpckhpd", &[VPD, WQ]));
    t[0x16] = Some(sse_move("movhpd", &[VQ, MQ]));
    t[0x17] = Some(sse_move("movhpd", &[MQ, VQ]));
    t[0x28] = Some(sse_move("movapd", &[VPD, WPD]));
    t[0x29] = Some(sse_move("movapd", &[WPD, VPD]));
    t[0x2A] = Some(sse("cvtpi2pd", &[VPD, QQ]));
    t[0x2B] = Some(sse_move("movntpd", &[MPD, VPD]));
    t[0x2C] = Some(sse("cvttpd2pi", &[PQ, WPD]));
    t[0x2D] = Some(sse("cvtpd2pi", &[PQ, WPD]));
    t[0x2E] = Some(sse_arith("ucomisd", Compare, &[VSD, WSD]));
    t[0x2F] = Some(sse_arith("comisd", Compare, &[VSD, WSD]));

    t[0x50] = Some(sse("movmskpd", &[GD, WPD]));
    t[0x51] = Some(sse("sqrtpd", &[VPD, WPD]));
    t[0x54] = Some(sse_logic("andpd", And, &[VPD, WPD]));
    t[0x55] = Some(sse_logic("andnpd", AndNot, &[VPD, WPD]));
    t[0x56] = Some(sse_logic("orpd", Or, &[VPD, WPD]));
    t[0x57] = Some(sse_logic("xorpd", Xor, &[VPD, WPD]));
    t[0x58] = Some(sse_arith("addpd", Add, &[VPD, WPD]));
    t[0x59] = Some(sse_arith("mulpd", SignedMul, &[VPD, WPD]));
    t[0x5A] = Some(sse("cvtpd2ps", &[VPS, WPD]));
    t[0x5B] = Some(sse("cvtps2dq", &[VDQ, WPS]));
    t[0x5C] = Some(sse_arith("subpd", Sub, &[VPD, WPD]));
    t[0x5D] = Some(sse("minpd", &[VPD, WPD]));
    t[0x5E] = Some(sse_arith("divpd", SignedDiv, &[VPD, WPD]));
    t[0x5F] = Some(sse("maxpd", &[VPD, WPD]));

    t[0x60] = Some(sse("punpcklbw", &[VDQ, WDQ]));
    t[0x61] = Some(sse("punpcklwd", &[VDQ, WDQ]));
    t[0x62] = Some(sse("punpckldq", &[VDQ, WDQ]));
    t[0x63] = Some(sse("packsswb", &[VDQ, WDQ]));
    t[0x64] = Some(sse_arith("pcmpgtb", Compare, &[VDQ, WDQ]));
    t[0x65] = Some(sse_arith("pcmpgtw", Compare, &[VDQ, WDQ]));
    t[0x66] = Some(sse_arith("pcmpgtd", Compare, &[VDQ, WDQ]));
    t[0x67] = Some(sse("packuswb", &[VDQ, WDQ]));
    t[0x68] = Some(sse("punpckhbw", &[VDQ, WDQ]));
    t[0x69] = Some(sse("punpckhwd", &[VDQ, WDQ]));
    t[0x6A] = Some(sse("punpckhdq", &[VDQ, WDQ]));
    t[0x6B] = Some(sse("packssdw", &[VDQ, WDQ]));
    t[0x6C] = Some(sse("punpcklqdq", &[VDQ, WDQ]));
    t[0x6D] = Some(sse("punpckhqdq", &[VDQ, WDQ]));
    t[0x6E] = Some(sse_move("movd", &[VDQ, ED]));
    t[0x6F] = Some(sse_move("movdqa", &[VDQ, WDQ]));

    t[0x70] = Some(sse("pshufd", &[VDQ, WDQ, IB]));
    t[0x71] = Some(group(GRP12_66));
    t[0x72] = Some(group(GRP13_66));
    t[0x73] = Some(group(GRP14_66));
    t[0x74] = Some(sse_arith("pcmpeqb", Compare, &[VDQ, WDQ]));
    t[0x75] = Some(sse_arith("pcmpeqw", Compare, &[VDQ, WDQ]));
    t[0x76] = Some(sse_arith("pcmpeqd", Compare, &[VDQ, WDQ]));
    t[0x7E] = Some(sse_move("movd", &[ED, VDQ]));
    t[0x7F] = Some(sse_move("movdqa", &[WDQ, VDQ]));

    t[0xC2] = Some(sse_arith("cmppd", Compare, &[VPD, WPD, IB]));
    t[0xC4] = Some(sse("pinsrw", &[VDQ, ED, IB]));
    t[0xC5] = Some(sse("pextrw", &[GD, WDQ, IB]));
    t[0xC6] = Some(sse("shufpd", &[VPD, WPD, IB]));

    t[0xD1] = Some(sse_shift("psrlw", ShiftRightLogical, &[VDQ, WDQ]));
    t[0xD2] = Some(sse_shift("psrld", ShiftRightLogical, &[VDQ, WDQ]));
    t[0xD3] = Some(sse_shift("psrlq", ShiftRightLogical, &[VDQ, WDQ]));
    t[0xD4] = Some(sse_arith("paddq", Add, &[VDQ, WDQ]));
    t[0xD5] = Some(sse_arith("pmullw", SignedMul, &[VDQ, WDQ]));
    t[0xD6] = Some(sse_move("movq", &[WQ, VQ]));
    t[0xD7] = Some(sse("pmovmskb", &[GD, WDQ]));
    t[0xD8] = Some(sse_arith("psubusb", Sub, &[VDQ, WDQ]));
    t[0xD9] = Some(sse_arith("psubusw", Sub, &[VDQ, WDQ]));
    t[0xDA] = Some(sse("pminub", &[VDQ, WDQ]));
    t[0xDB] = Some(sse_logic("pand", And, &[VDQ, WDQ]));
    t[0xDC] = Some(sse_arith("paddusb", Add, &[VDQ, WDQ]));
    t[0xDD] = Some(sse_arith("paddusw", Add, &[VDQ, WDQ]));
    t[0xDE] = Some(sse("pmaxub", &[VDQ, WDQ]));
    t[0xDF] = Some(sse_logic("pandn", AndNot, &[VDQ, WDQ]));

    t[0xE0] = Some(sse("pavgb", &[VDQ, WDQ]));
    t[0xE1] = Some(sse_shift("psraw", ShiftRightArithmetic, &[VDQ, WDQ]));
    t[0xE2] = Some(sse_shift("psrad", ShiftRightArithmetic, &[VDQ, WDQ]));
    t[0xE3] = Some(sse("pavgw", &[VDQ, WDQ]));
    t[0xE4] = Some(sse_arith("pmulhuw", UnsignedMul, &[VDQ, WDQ]));
    t[0xE5] = Some(sse_arith("pmulhw", SignedMul, &[VDQ, WDQ]));
    t[0xE6] = Some(sse("cvttpd2dq", &[VDQ, WPD]));
    t[0xE7] = Some(sse_move("movntdq", &[MDQ, VDQ]));
    t[0xE8] = Some(sse_arith("psubsb", Sub, &[VDQ, WDQ]));
    t[0xE9] = Some(sse_arith("psubsw", Sub, &[VDQ, WDQ]));
    t[0xEA] = Some(sse("pminsw", &[VDQ, WDQ]));
    t[0xEB] = Some(sse_logic("por", Or, &[VDQ, WDQ]));
    t[0xEC] = Some(sse_arith("paddsb", Add, &[VDQ, WDQ]));
    t[0xED] = Some(sse_arith("paddsw", Add, &[VDQ, WDQ]));
    t[0xEE] = Some(sse("pmaxsw", &[VDQ, WDQ]));
    t[0xEF] = Some(sse_logic("pxor", Xor, &[VDQ, WDQ]));

    t[0xF1] = Some(sse_shift("psllw", ShiftLeft, &[VDQ, WDQ]));
    t[0xF2] = Some(sse_shift("pslld", ShiftLeft, &[VDQ, WDQ]));
    t[0xF3] = Some(sse_shift("psllq", ShiftLeft, &[VDQ, WDQ]));
    t[0xF4] = Some(sse_arith("pmuludq", UnsignedMul, &[VDQ, WDQ]));
    t[0xF5] = Some(sse("pmaddwd", &[VDQ, WDQ]));
    t[0xF6] = Some(sse("psadbw", &[VDQ, WDQ]));
    t[0xF7] = Some(sse("maskmovdqu", &[VDQ, WDQ]));
    t[0xF8] = Some(sse_arith("psubb", Sub, &[VDQ, WDQ]));
    t[0xF9] = Some(sse_arith("psubw", Sub, &[VDQ, WDQ]));
    t[0xFA] = Some(sse_arith("psubd", Sub, &[VDQ, WDQ]));
    t[0xFB] = Some(sse_arith("psubq", Sub, &[VDQ, WDQ]));
    t[0xFC] = Some(sse_arith("paddb", Add, &[VDQ, WDQ]));
    t[0xFD] = Some(sse_arith("paddw", Add, &[VDQ, WDQ]));
    t[0xFE] = Some(sse_arith("paddd", Add, &[VDQ, WDQ]));

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_precedence() {
        // F2 beats F3 and 66.
        let all = Prefixes::REPNZ | Prefixes::REPZ | Prefixes::DATA;
        assert_eq!(lookup_two_byte(all, 0x10).unwrap().template, "movsd");
        assert_eq!(
            lookup_two_byte(Prefixes::REPZ | Prefixes::DATA, 0x10).unwrap().template,
            "movss"
        );
        assert_eq!(lookup_two_byte(Prefixes::DATA, 0x10).unwrap().template, "movupd");
        assert_eq!(lookup_two_byte(Prefixes::empty(), 0x10).unwrap().template, "movups");
    }

    #[test]
    fn test_fallback_to_plain_table() {
        let imul = lookup_two_byte(Prefixes::DATA, 0xAF).unwrap();
        assert_eq!(imul.template, "imulS");
        let movzb = lookup_two_byte(Prefixes::REPZ, 0xB6).unwrap();
        assert_eq!(movzb.template, "movzbS");
        assert!(lookup_two_byte(Prefixes::REPNZ, 0x04).is_none());
    }

    #[test]
    fn test_tables_are_deterministic() {
        assert_eq!(build_f2_table(), TWO_BYTE_F2_TABLE);
        assert_eq!(build_f3_table(), TWO_BYTE_F3_TABLE);
        assert_eq!(build_66_table(), TWO_BYTE_66_TABLE);
    }
}
