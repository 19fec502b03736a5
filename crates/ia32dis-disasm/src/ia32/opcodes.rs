//! One-byte opcode map.

use super::groups::*;
use super::node::spec::*;
use super::node::*;
use ia32dis_core::Condition::{self, *};
use ia32dis_core::RtlOperation::*;

/// One-byte opcode table, indexed by the opcode byte.
///
/// Prefix bytes and the `0F` escape are consumed by the driver and have no
/// entry here.
pub static ONE_BYTE_TABLE: [Option<DecoderNode>; 256] = build_one_byte_table();

const JCC_NAMES: [&str; 16] = [
    "jo", "jno", "jb", "jae", "je", "jne", "jbe", "ja", "js", "jns", "jp", "jnp", "jl", "jge",
    "jle", "jg",
];

/// Builds the one-byte table. Pure: every call yields the same table.
pub const fn build_one_byte_table() -> [Option<DecoderNode>; 256] {
    let mut t: [Option<DecoderNode>; 256] = [None; 256];

    // 00-3F: the eight ALU operations in the same six forms, plus
    // segment push/pop and BCD adjusts in the gaps.
    t[0x00] = Some(arith("addb", Add, &[EB, GB]));
    t[0x01] = Some(arith("addS", Add, &[EV, GV]));
    t[0x02] = Some(arith("addb", Add, &[GB, EB]));
    t[0x03] = Some(arith("addS", Add, &[GV, EV]));
    t[0x04] = Some(arith("addb", Add, &[AL, IB]));
    t[0x05] = Some(arith("addS", Add, &[E_AX, IV]));
    t[0x06] = Some(general("pushS", &[ES]));
    t[0x07] = Some(general("popS", &[ES]));

    t[0x08] = Some(logic("orb", Or, &[EB, GB]));
    t[0x09] = Some(logic("orS", Or, &[EV, GV]));
    t[0x0A] = Some(logic("orb", Or, &[GB, EB]));
    t[0x0B] = Some(logic("orS", Or, &[GV, EV]));
    t[0x0C] = Some(logic("orb", Or, &[AL, IB]));
    t[0x0D] = Some(logic("orS", Or, &[E_AX, IV]));
    t[0x0E] = Some(general("pushS", &[CS]));

    t[0x10] = Some(arith("adcb", AddWithCarry, &[EB, GB]));
    t[0x11] = Some(arith("adcS", AddWithCarry, &[EV, GV]));
    t[0x12] = Some(arith("adcb", AddWithCarry, &[GB, EB]));
    t[0x13] = Some(arith("adcS", AddWithCarry, &[GV, EV]));
    t[0x14] = Some(arith("adcb", AddWithCarry, &[AL, IB]));
    t[0x15] = Some(arith("adcS", AddWithCarry, &[E_AX, IV]));
    t[0x16] = Some(general("pushS", &[SS]));
    t[0x17] = Some(general("popS", &[SS]));

    t[0x18] = Some(arith("sbbb", SubWithBorrow, &[EB, GB]));
    t[0x19] = Some(arith("sbbS", SubWithBorrow, &[EV, GV]));
    t[0x1A] = Some(arith("sbbb", SubWithBorrow, &[GB, EB]));
    t[0x1B] = Some(arith("sbbS", SubWithBorrow, &[GV, EV]));
    t[0x1C] = Some(arith("sbbb", SubWithBorrow, &[AL, IB]));
    t[0x1D] = Some(arith("sbbS", SubWithBorrow, &[E_AX, IV]));
    t[0x1E] = Some(general("pushS", &[DS]));
    t[0x1F] = Some(general("popS", &[DS]));

    t[0x20] = Some(logic("andb", And, &[EB, GB]));
    t[0x21] = Some(logic("andS", And, &[EV, GV]));
    t[0x22] = Some(logic("andb", And, &[GB, EB]));
    t[0x23] = Some(logic("andS", And, &[GV, EV]));
    t[0x24] = Some(logic("andb", And, &[AL, IB]));
    t[0x25] = Some(logic("andS", And, &[E_AX, IV]));
    t[0x27] = Some(general("daa", &[]));

    t[0x28] = Some(arith("subb", Sub, &[EB, GB]));
    t[0x29] = Some(arith("subS", Sub, &[EV, GV]));
    t[0x2A] = Some(arith("subb", Sub, &[GB, EB]));
    t[0x2B] = Some(arith("subS", Sub, &[GV, EV]));
    t[0x2C] = Some(arith("subb", Sub, &[AL, IB]));
    t[0x2D] = Some(arith("subS", Sub, &[E_AX, IV]));
    t[0x2F] = Some(general("das", &[]));

    t[0x30] = Some(logic("xorb", Xor, &[EB, GB]));
    t[0x31] = Some(logic("xorS", Xor, &[EV, GV]));
    t[0x32] = Some(logic("xorb", Xor, &[GB, EB]));
    t[0x33] = Some(logic("xorS", Xor, &[GV, EV]));
    t[0x34] = Some(logic("xorb", Xor, &[AL, IB]));
    t[0x35] = Some(logic("xorS", Xor, &[E_AX, IV]));
    t[0x37] = Some(general("aaa", &[]));

    t[0x38] = Some(arith("cmpb", Compare, &[EB, GB]));
    t[0x39] = Some(arith("cmpS", Compare, &[EV, GV]));
    t[0x3A] = Some(arith("cmpb", Compare, &[GB, EB]));
    t[0x3B] = Some(arith("cmpS", Compare, &[GV, EV]));
    t[0x3C] = Some(arith("cmpb", Compare, &[AL, IB]));
    t[0x3D] = Some(arith("cmpS", Compare, &[E_AX, IV]));
    t[0x3F] = Some(general("aas", &[]));

    // 40-5F: register-in-opcode inc/dec/push/pop
    let mut r = 0;
    while r < 8 {
        t[0x40 + r] = Some(arith("incS", Add, &[REGV[r]]));
        t[0x48 + r] = Some(arith("decS", Sub, &[REGV[r]]));
        t[0x50 + r] = Some(general("pushS", &[REGV[r]]));
        t[0x58 + r] = Some(general("popS", &[REGV[r]]));
        r += 1;
    }

    t[0x60] = Some(general("pushaS", &[]));
    t[0x61] = Some(general("popaS", &[]));
    t[0x62] = Some(general("boundS", &[GV, MA]));
    t[0x63] = Some(general("arpl", &[EW, GW]));
    t[0x68] = Some(general("pushS", &[IV]));
    t[0x69] = Some(arith("imulS", SignedMul, &[GV, EV, IV]));
    t[0x6A] = Some(general("pushS", &[IBS]));
    t[0x6B] = Some(arith("imulS", SignedMul, &[GV, EV, IBS]));
    t[0x6C] = Some(general("insb", &[YB, DX]));
    t[0x6D] = Some(general("insS", &[YV, DX]));
    t[0x6E] = Some(general("outsb", &[DX, XB]));
    t[0x6F] = Some(general("outsS", &[DX, XV]));

    // 70-7F: short conditional jumps
    let mut cc = 0;
    while cc < 16 {
        t[0x70 + cc] = Some(jcc(JCC_NAMES[cc], Condition::from_code(cc as u8), &[JB]));
        cc += 1;
    }

    t[0x80] = Some(group(GRP1_EB_IB));
    t[0x81] = Some(group(GRP1_EV_IV));
    t[0x82] = Some(group(GRP1_EB_IB));
    t[0x83] = Some(group(GRP1_EV_IBS));
    t[0x84] = Some(logic("testb", Test, &[EB, GB]));
    t[0x85] = Some(logic("testS", Test, &[EV, GV]));
    t[0x86] = Some(general("xchgb", &[EB, GB]));
    t[0x87] = Some(general("xchgS", &[EV, GV]));
    t[0x88] = Some(mov("movb", &[EB, GB]));
    t[0x89] = Some(mov("movS", &[EV, GV]));
    t[0x8A] = Some(mov("movb", &[GB, EB]));
    t[0x8B] = Some(mov("movS", &[GV, EV]));
    t[0x8C] = Some(mov("movw", &[EW, SW]));
    t[0x8D] = Some(general("leaS", &[GV, M]));
    t[0x8E] = Some(mov("movw", &[SW, EW]));
    t[0x8F] = Some(group(GRP1A));

    t[0x90] = Some(general("nop", &[]));
    let mut r = 1;
    while r < 8 {
        t[0x90 + r] = Some(general("xchgS", &[REGV[r], E_AX]));
        r += 1;
    }
    t[0x98] = Some(general("cwtl/cbtw", &[]));
    t[0x99] = Some(general("cltd/cwtd", &[]));
    t[0x9A] = Some(call("lcall", &[AP]));
    t[0x9C] = Some(general("pushfS", &[]));
    t[0x9D] = Some(general("popfS", &[]));
    t[0x9E] = Some(general("sahf", &[]));
    t[0x9F] = Some(general("lahf", &[]));

    t[0xA0] = Some(mov("movb", &[AL, OB]));
    t[0xA1] = Some(mov("movS", &[E_AX, OV]));
    t[0xA2] = Some(mov("movb", &[OB, AL]));
    t[0xA3] = Some(mov("movS", &[OV, E_AX]));
    t[0xA4] = Some(general("movsb", &[YB, XB]));
    t[0xA5] = Some(general("movsS", &[YV, XV]));
    t[0xA6] = Some(general("cmpsb", &[XB, YB]));
    t[0xA7] = Some(general("cmpsS", &[XV, YV]));
    t[0xA8] = Some(logic("testb", Test, &[AL, IB]));
    t[0xA9] = Some(logic("testS", Test, &[E_AX, IV]));
    t[0xAA] = Some(general("stosb", &[YB, AL]));
    t[0xAB] = Some(general("stosS", &[YV, E_AX]));
    t[0xAC] = Some(general("lodsb", &[AL, XB]));
    t[0xAD] = Some(general("lodsS", &[E_AX, XV]));
    t[0xAE] = Some(general("scasb", &[AL, YB]));
    t[0xAF] = Some(general("scasS", &[E_AX, YV]));

    let mut r = 0;
    while r < 8 {
        t[0xB0 + r] = Some(mov("movb", &[REGB[r], IB]));
        t[0xB8 + r] = Some(mov("movS", &[REGV[r], IV]));
        r += 1;
    }

    t[0xC0] = Some(group(GRP2_EB_IB));
    t[0xC1] = Some(group(GRP2_EV_IB));
    t[0xC2] = Some(ret("ret", &[IW]));
    t[0xC3] = Some(ret("ret", &[]));
    t[0xC4] = Some(general("lesS", &[GV, MP]));
    t[0xC5] = Some(general("ldsS", &[GV, MP]));
    t[0xC6] = Some(mov("movb", &[EB, IB]));
    t[0xC7] = Some(mov("movS", &[EV, IV]));
    t[0xC8] = Some(general("enter", &[IW, IB]));
    t[0xC9] = Some(general("leave", &[]));
    t[0xCA] = Some(ret("lret", &[IW]));
    t[0xCB] = Some(ret("lret", &[]));
    t[0xCC] = Some(general("int3", &[]));
    t[0xCD] = Some(general("int", &[IB]));
    t[0xCE] = Some(general("into", &[]));
    t[0xCF] = Some(ret("iret", &[]));

    t[0xD0] = Some(group(GRP2_EB_1));
    t[0xD1] = Some(group(GRP2_EV_1));
    t[0xD2] = Some(group(GRP2_EB_CL));
    t[0xD3] = Some(group(GRP2_EV_CL));
    t[0xD4] = Some(general("aam", &[IB]));
    t[0xD5] = Some(general("aad", &[IB]));
    t[0xD7] = Some(general("xlat", &[]));

    // D8-DF: x87 escapes
    let mut esc = 0;
    while esc < 8 {
        t[0xD8 + esc] = Some(float_escape());
        esc += 1;
    }

    t[0xE0] = Some(jcc("loopne", CounterNotZeroAndNotEqual, &[JB]));
    t[0xE1] = Some(jcc("loope", CounterNotZeroAndEqual, &[JB]));
    t[0xE2] = Some(jcc("loop", CounterNotZero, &[JB]));
    t[0xE3] = Some(jcc("jCcxz", CounterZero, &[JB]));
    t[0xE4] = Some(general("inb", &[AL, IB]));
    t[0xE5] = Some(general("inS", &[E_AX, IB]));
    t[0xE6] = Some(general("outb", &[IB, AL]));
    t[0xE7] = Some(general("outS", &[IB, E_AX]));
    t[0xE8] = Some(call("call", &[JV]));
    t[0xE9] = Some(jump("jmp", &[JV]));
    t[0xEA] = Some(jump("ljmp", &[AP]));
    t[0xEB] = Some(jump("jmp", &[JB]));
    t[0xEC] = Some(general("inb", &[AL, DX]));
    t[0xED] = Some(general("inS", &[E_AX, DX]));
    t[0xEE] = Some(general("outb", &[DX, AL]));
    t[0xEF] = Some(general("outS", &[DX, E_AX]));

    t[0xF4] = Some(general("hlt", &[]));
    t[0xF5] = Some(general("cmc", &[]));
    t[0xF6] = Some(group(GRP3_EB));
    t[0xF7] = Some(group(GRP3_EV));
    t[0xF8] = Some(general("clc", &[]));
    t[0xF9] = Some(general("stc", &[]));
    t[0xFA] = Some(general("cli", &[]));
    t[0xFB] = Some(general("sti", &[]));
    t[0xFC] = Some(general("cld", &[]));
    t[0xFD] = Some(general("std", &[]));
    t[0xFE] = Some(group(GRP4));
    t[0xFF] = Some(group(GRP5));

    t
}
