//! Two-byte (`0F xx`) opcode map without a mandatory prefix.

use super::groups::*;
use super::node::spec::*;
use super::node::*;
use ia32dis_core::Condition;
use ia32dis_core::RtlOperation::*;

/// Two-byte opcode table, indexed by the byte after `0F`.
pub static TWO_BYTE_TABLE: [Option<DecoderNode>; 256] = build_two_byte_table();

const JCC_NAMES: [&str; 16] = [
    "jo", "jno", "jb", "jae", "je", "jne", "jbe", "ja", "js", "jns", "jp", "jnp", "jl", "jge",
    "jle", "jg",
];

const SETCC_NAMES: [&str; 16] = [
    "seto", "setno", "setb", "setae", "sete", "setne", "setbe", "seta", "sets", "setns", "setp",
    "setnp", "setl", "setge", "setle", "setg",
];

const CMOVCC_NAMES: [&str; 16] = [
    "cmovoS", "cmovnoS", "cmovbS", "cmovaeS", "cmoveS", "cmovneS", "cmovbeS", "cmovaS", "cmovsS",
    "cmovnsS", "cmovpS", "cmovnpS", "cmovlS", "cmovgeS", "cmovleS", "cmovgS",
];

/// Builds the two-byte table. Pure: every call yields the same table.
pub const fn build_two_byte_table() -> [Option<DecoderNode>; 256] {
    let mut t: [Option<DecoderNode>; 256] = [None; 256];

    t[0x00] = Some(group(GRP6));
    t[0x01] = Some(group(GRP7));
    t[0x02] = Some(general("larS", &[GV, EW]));
    t[0x03] = Some(general("lslS", &[GV, EW]));
    t[0x06] = Some(general("clts", &[]));
    t[0x08] = Some(general("invd", &[]));
    t[0x09] = Some(general("wbinvd", &[]));
    t[0x0B] = Some(general("ud2", &[]));

    t[0x10] = Some(sse_move("movups", &[VPS, WPS]));
    t[0x11] = Some(sse_move("movups", &[WPS, VPS]));
    t[0x12] = Some(sse_move("movlps", &[VQ, MQ]));
    t[0x13] = Some(sse_move("movlps", &[MQ, VQ]));
    t[0x14] = Some(sse("unpcklps", &[VPS, WQ]));
    t[0x15] = Some(sse("unpckhps", &[VPS, WQ]));
    t[0x16] = Some(sse_move("movhps", &[VQ, MQ]));
    t[0x17] = Some(sse_move("movhps", &[MQ, VQ]));
    t[0x18] = Some(group(GRP16));

    t[0x20] = Some(mov("movl", &[RD, CD]));
    t[0x21] = Some(mov("movl", &[RD, DD]));
    t[0x22] = Some(mov("movl", &[CD, RD]));
    t[0x23] = Some(mov("movl", &[DD, RD]));
    t[0x24] = Some(mov("movl", &[RD, TD]));
    t[0x26] = Some(mov("movl", &[TD, RD]));

    t[0x28] = Some(sse_move("movaps", &[VPS, WPS]));
    t[0x29] = Some(sse_move("movaps", &[WPS, VPS]));
    t[0x2A] = Some(sse("cvtpi2ps", &[VPS, QQ]));
    t[0x2B] = Some(sse_move("movntps", &[MPS, VPS]));
    t[0x2C] = Some(sse("cvttps2pi", &[PQ, WQ]));
    t[0x2D] = Some(sse("cvtps2pi", &[PQ, WQ]));
    t[0x2E] = Some(sse_arith("ucomiss", Compare, &[VSS, WSS]));
    t[0x2F] = Some(sse_arith("comiss", Compare, &[VSS, WSS]));

    t[0x30] = Some(general("wrmsr", &[]));
    t[0x31] = Some(general("rdtsc", &[]));
    t[0x32] = Some(general("rdmsr", &[]));
    t[0x33] = Some(general("rdpmc", &[]));
    t[0x34] = Some(general("sysenter", &[]));
    t[0x35] = Some(general("sysexit", &[]));

    let mut cc = 0;
    while cc < 16 {
        t[0x40 + cc] = Some(general(CMOVCC_NAMES[cc], &[GV, EV]));
        t[0x80 + cc] = Some(jcc(JCC_NAMES[cc], Condition::from_code(cc as u8), &[JV]));
        t[0x90 + cc] = Some(general(SETCC_NAMES[cc], &[EB]));
        cc += 1;
    }

    t[0x50] = Some(sse("movmskps", &[GD, WPS]));
    t[0x51] = Some(sse("sqrtps", &[VPS, WPS]));
    t[0x52] = Some(sse("rsqrtps", &[VPS, WPS]));
    t[0x53] = Some(sse("rcpps", &[VPS, WPS]));
    t[0x54] = Some(sse_logic("andps", And, &[VPS, WPS]));
    t[0x55] = Some(sse_logic("andnps", AndNot, &[VPS, WPS]));
    t[0x56] = Some(sse_logic("orps", Or, &[VPS, WPS]));
    t[0x57] = Some(sse_logic("xorps", Xor, &[VPS, WPS]));
    t[0x58] = Some(sse_arith("addps", Add, &[VPS, WPS]));
    t[0x59] = Some(sse_arith("mulps", SignedMul, &[VPS, WPS]));
    t[0x5A] = Some(sse("cvtps2pd", &[VPD, WQ]));
    t[0x5B] = Some(sse("cvtdq2ps", &[VPS, WDQ]));
    t[0x5C] = Some(sse_arith("subps", Sub, &[VPS, WPS]));
    t[0x5D] = Some(sse("minps", &[VPS, WPS]));
    t[0x5E] = Some(sse_arith("divps", SignedDiv, &[VPS, WPS]));
    t[0x5F] = Some(sse("maxps", &[VPS, WPS]));

    t[0x60] = Some(sse("punpcklbw", &[PQ, QD]));
    t[0x61] = Some(sse("punpcklwd", &[PQ, QD]));
    t[0x62] = Some(sse("punpckldq", &[PQ, QD]));
    t[0x63] = Some(sse("packsswb", &[PQ, QQ]));
    t[0x64] = Some(sse_arith("pcmpgtb", Compare, &[PQ, QQ]));
    t[0x65] = Some(sse_arith("pcmpgtw", Compare, &[PQ, QQ]));
    t[0x66] = Some(sse_arith("pcmpgtd", Compare, &[PQ, QQ]));
    t[0x67] = Some(sse("packuswb", &[PQ, QQ]));
    t[0x68] = Some(sse("punpckhbw", &[PQ, QQ]));
    t[0x69] = Some(sse("punpckhwd", &[PQ, QQ]));
    t[0x6A] = Some(sse("punpckhdq", &[PQ, QQ]));
    t[0x6B] = Some(sse("packssdw", &[PQ, QQ]));
    t[0x6E] = Some(sse_move("movd", &[PD, ED]));
    t[0x6F] = Some(sse_move("movq", &[PQ, QQ]));

    t[0x70] = Some(sse("pshufw", &[PQ, QQ, IB]));
    t[0x71] = Some(group(GRP12));
    t[0x72] = Some(group(GRP13));
    t[0x73] = Some(group(GRP14));
    t[0x74] = Some(sse_arith("pcmpeqb", Compare, &[PQ, QQ]));
    t[0x75] = Some(sse_arith("pcmpeqw", Compare, &[PQ, QQ]));
    t[0x76] = Some(sse_arith("pcmpeqd", Compare, &[PQ, QQ]));
    t[0x77] = Some(sse("emms", &[]));
    t[0x7E] = Some(sse_move("movd", &[ED, PD]));
    t[0x7F] = Some(sse_move("movq", &[QQ, PQ]));

    t[0xA0] = Some(general("pushS", &[FS]));
    t[0xA1] = Some(general("popS", &[FS]));
    t[0xA2] = Some(general("cpuid", &[]));
    t[0xA3] = Some(logic("btS", Test, &[EV, GV]));
    t[0xA4] = Some(shift("shldS", ShiftLeft, &[EV, GV, IB]));
    t[0xA5] = Some(shift("shldS", ShiftLeft, &[EV, GV, CL]));
    t[0xA8] = Some(general("pushS", &[GS]));
    t[0xA9] = Some(general("popS", &[GS]));
    t[0xAA] = Some(general("rsm", &[]));
    t[0xAB] = Some(general("btsS", &[EV, GV]));
    t[0xAC] = Some(shift("shrdS", ShiftRightLogical, &[EV, GV, IB]));
    t[0xAD] = Some(shift("shrdS", ShiftRightLogical, &[EV, GV, CL]));
    t[0xAE] = Some(group(GRP15));
    t[0xAF] = Some(arith("imulS", SignedMul, &[GV, EV]));

    t[0xB0] = Some(general("cmpxchgb", &[EB, GB]));
    t[0xB1] = Some(general("cmpxchgS", &[EV, GV]));
    t[0xB2] = Some(general("lssS", &[GV, MP]));
    t[0xB3] = Some(general("btrS", &[EV, GV]));
    t[0xB4] = Some(general("lfsS", &[GV, MP]));
    t[0xB5] = Some(general("lgsS", &[GV, MP]));
    t[0xB6] = Some(mov("movzbS", &[GV, EB]));
    t[0xB7] = Some(mov("movzwS", &[GV, EW]));
    t[0xBA] = Some(group(GRP8));
    t[0xBB] = Some(general("btcS", &[EV, GV]));
    t[0xBC] = Some(general("bsfS", &[GV, EV]));
    t[0xBD] = Some(general("bsrS", &[GV, EV]));
    t[0xBE] = Some(mov("movsbS", &[GV, EB]));
    t[0xBF] = Some(mov("movswS", &[GV, EW]));

    t[0xC0] = Some(arith("xaddb", Add, &[EB, GB]));
    t[0xC1] = Some(arith("xaddS", Add, &[EV, GV]));
    t[0xC2] = Some(sse_arith("cmpps", Compare, &[VPS, WPS, IB]));
    t[0xC3] = Some(sse_move("movnti", &[MD, GD]));
    t[0xC4] = Some(sse("pinsrw", &[PQ, ED, IB]));
    t[0xC5] = Some(sse("pextrw", &[GD, QQ, IB]));
    t[0xC6] = Some(sse("shufps", &[VPS, WPS, IB]));
    t[0xC7] = Some(group(GRP9));
    let mut r = 0;
    while r < 8 {
        t[0xC8 + r] = Some(general("bswap", &[R32[r]]));
        r += 1;
    }

    t[0xD1] = Some(sse_shift("psrlw", ShiftRightLogical, &[PQ, QQ]));
    t[0xD2] = Some(sse_shift("psrld", ShiftRightLogical, &[PQ, QQ]));
    t[0xD3] = Some(sse_shift("psrlq", ShiftRightLogical, &[PQ, QQ]));
    t[0xD4] = Some(sse_arith("paddq", Add, &[PQ, QQ]));
    t[0xD5] = Some(sse_arith("pmullw", SignedMul, &[PQ, QQ]));
    t[0xD7] = Some(sse("pmovmskb", &[GD, QQ]));
    t[0xD8] = Some(sse_arith("psubusb", Sub, &[PQ, QQ]));
    t[0xD9] = Some(sse_arith("psubusw", Sub, &[PQ, QQ]));
    t[0xDA] = Some(sse("pminub", &[PQ, QQ]));
    t[0xDB] = Some(sse_logic("pand", And, &[PQ, QQ]));
    t[0xDC] = Some(sse_arith("paddusb", Add, &[PQ, QQ]));
    t[0xDD] = Some(sse_arith("paddusw", Add, &[PQ, QQ]));
    t[0xDE] = Some(sse("pmaxub", &[PQ, QQ]));
    t[0xDF] = Some(sse_logic("pandn", AndNot, &[PQ, QQ]));

    t[0xE0] = Some(sse("pavgb", &[PQ, QQ]));
    t[0xE1] = Some(sse_shift("psraw", ShiftRightArithmetic, &[PQ, QQ]));
    t[0xE2] = Some(sse_shift("psrad", ShiftRightArithmetic, &[PQ, QQ]));
    t[0xE3] = Some(sse("pavgw", &[PQ, QQ]));
    t[0xE4] = Some(sse_arith("pmulhuw", UnsignedMul, &[PQ, QQ]));
    t[0xE5] = Some(sse_arith("pmulhw", SignedMul, &[PQ, QQ]));
    t[0xE7] = Some(sse_move("movntq", &[MQ, PQ]));
    t[0xE8] = Some(sse_arith("psubsb", Sub, &[PQ, QQ]));
    t[0xE9] = Some(sse_arith("psubsw", Sub, &[PQ, QQ]));
    t[0xEA] = Some(sse("pminsw", &[PQ, QQ]));
    t[0xEB] = Some(sse_logic("por", Or, &[PQ, QQ]));
    t[0xEC] = Some(sse_arith("paddsb", Add, &[PQ, QQ]));
    t[0xED] = Some(sse_arith("paddsw", Add, &[PQ, QQ]));
    t[0xEE] = Some(sse("pmaxsw", &[PQ, QQ]));
    t[0xEF] = Some(sse_logic("pxor", Xor, &[PQ, QQ]));

    t[0xF1] = Some(sse_shift("psllw", ShiftLeft, &[PQ, QQ]));
    t[0xF2] = Some(sse_shift("pslld", ShiftLeft, &[PQ, QQ]));
    t[0xF3] = Some(sse_shift("psllq", ShiftLeft, &[PQ, QQ]));
    t[0xF4] = Some(sse_arith("pmuludq", UnsignedMul, &[PQ, QQ]));
    t[0xF5] = Some(sse("pmaddwd", &[PQ, QQ]));
    t[0xF6] = Some(sse("psadbw", &[PQ, QQ]));
    t[0xF7] = Some(sse("maskmovq", &[PQ, QQ]));
    t[0xF8] = Some(sse_arith("psubb", Sub, &[PQ, QQ]));
    t[0xF9] = Some(sse_arith("psubw", Sub, &[PQ, QQ]));
    t[0xFA] = Some(sse_arith("psubd", Sub, &[PQ, QQ]));
    t[0xFB] = Some(sse_arith("psubq", Sub, &[PQ, QQ]));
    t[0xFC] = Some(sse_arith("paddb", Add, &[PQ, QQ]));
    t[0xFD] = Some(sse_arith("paddw", Add, &[PQ, QQ]));
    t[0xFE] = Some(sse_arith("paddd", Add, &[PQ, QQ]));

    t
}
