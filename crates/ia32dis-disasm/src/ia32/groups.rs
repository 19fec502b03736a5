//! Opcode extension groups, selected by the ModR/M `reg` field.

use super::modrm::ModRM;
use super::node::spec::*;
use super::node::*;
use ia32dis_core::RtlOperation::{self, *};

pub const GRP1_EB_IB: u8 = 0;
pub const GRP1_EV_IV: u8 = 1;
pub const GRP1_EV_IBS: u8 = 2;
pub const GRP1A: u8 = 3;
pub const GRP2_EB_IB: u8 = 4;
pub const GRP2_EV_IB: u8 = 5;
pub const GRP2_EB_1: u8 = 6;
pub const GRP2_EV_1: u8 = 7;
pub const GRP2_EB_CL: u8 = 8;
pub const GRP2_EV_CL: u8 = 9;
pub const GRP3_EB: u8 = 10;
pub const GRP3_EV: u8 = 11;
pub const GRP4: u8 = 12;
pub const GRP5: u8 = 13;
pub const GRP6: u8 = 14;
pub const GRP7: u8 = 15;
pub const GRP8: u8 = 16;
pub const GRP9: u8 = 17;
pub const GRP12: u8 = 18;
pub const GRP13: u8 = 19;
pub const GRP14: u8 = 20;
pub const GRP12_66: u8 = 21;
pub const GRP13_66: u8 = 22;
pub const GRP14_66: u8 = 23;
pub const GRP15: u8 = 24;
/// Register forms (`mod == 3`) of group 15: the fences.
pub const GRP15_REG: u8 = 25;
pub const GRP16: u8 = 26;

pub const GROUP_COUNT: usize = 27;

/// Group tables, indexed by group number then ModR/M `reg`.
pub static GROUP_TABLES: [[Option<DecoderNode>; 8]; GROUP_COUNT] = build_group_tables();

type Row = [Option<DecoderNode>; 8];

const EMPTY: Row = [None; 8];

const ALU_NAMES_B: [&str; 8] = ["addb", "orb", "adcb", "sbbb", "andb", "subb", "xorb", "cmpb"];
const ALU_NAMES_S: [&str; 8] = ["addS", "orS", "adcS", "sbbS", "andS", "subS", "xorS", "cmpS"];

/// The eight ALU operations of group 1 in `reg` order.
const fn alu(reg: usize, t: &'static str, ops: &[OperandSpec]) -> DecoderNode {
    match reg {
        0 => arith(t, Add, ops),
        1 => logic(t, Or, ops),
        2 => arith(t, AddWithCarry, ops),
        3 => arith(t, SubWithBorrow, ops),
        4 => logic(t, And, ops),
        5 => arith(t, Sub, ops),
        6 => logic(t, Xor, ops),
        _ => arith(t, Compare, ops),
    }
}

const fn grp1(names: &[&'static str; 8], dst: OperandSpec, src: OperandSpec) -> Row {
    let mut row = EMPTY;
    let mut reg = 0;
    while reg < 8 {
        row[reg] = Some(alu(reg, names[reg], &[dst, src]));
        reg += 1;
    }
    row
}

/// Group 2: rotates and shifts. `/6` is undefined.
const fn grp2(byte: bool, ops: &[OperandSpec]) -> Row {
    let mut row = EMPTY;
    let names: [&str; 8] = if byte {
        ["rolb", "rorb", "rclb", "rcrb", "shlb", "shrb", "", "sarb"]
    } else {
        ["rolS", "rorS", "rclS", "rcrS", "shlS", "shrS", "", "sarS"]
    };
    let ops_rot: [RtlOperation; 4] = [RotateLeft, RotateRight, RotateLeftCarry, RotateRightCarry];
    let mut reg = 0;
    while reg < 4 {
        row[reg] = Some(rotate(names[reg], ops_rot[reg], ops));
        reg += 1;
    }
    row[4] = Some(shift(names[4], ShiftLeft, ops));
    row[5] = Some(shift(names[5], ShiftRightLogical, ops));
    row[7] = Some(shift(names[7], ShiftRightArithmetic, ops));
    row
}

/// Group 3: test/not/neg/mul/imul/div/idiv on a single operand.
const fn grp3(byte: bool) -> Row {
    let mut row = EMPTY;
    if byte {
        row[0] = Some(logic("testb", Test, &[EB, IB]));
        row[2] = Some(logic("notb", Not, &[EB]));
        row[3] = Some(arith("negb", Neg, &[EB]));
        row[4] = Some(arith("mulb", UnsignedMul, &[EB]));
        row[5] = Some(arith("imulb", SignedMul, &[EB]));
        row[6] = Some(arith("divb", UnsignedDiv, &[EB]));
        row[7] = Some(arith("idivb", SignedDiv, &[EB]));
    } else {
        row[0] = Some(logic("testS", Test, &[EV, IV]));
        row[2] = Some(logic("notS", Not, &[EV]));
        row[3] = Some(arith("negS", Neg, &[EV]));
        row[4] = Some(arith("mulS", UnsignedMul, &[EV]));
        row[5] = Some(arith("imulS", SignedMul, &[EV]));
        row[6] = Some(arith("divS", UnsignedDiv, &[EV]));
        row[7] = Some(arith("idivS", SignedDiv, &[EV]));
    }
    row
}

/// MMX (`0F 71`..`0F 73`) or XMM (`66 0F 71`..`66 0F 73`) shift-by-immediate
/// groups.
const fn shift_imm(names: [&'static str; 8], xmm: bool) -> Row {
    let mut row = EMPTY;
    let target = if xmm { WDQ } else { QQ };
    let ops: [RtlOperation; 8] = [
        ShiftLeft,
        ShiftLeft,
        ShiftRightLogical,
        ShiftRightLogical,
        ShiftRightArithmetic,
        ShiftRightArithmetic,
        ShiftLeft,
        ShiftLeft,
    ];
    let mut reg = 0;
    while reg < 8 {
        if !names[reg].is_empty() {
            row[reg] = Some(sse_shift(names[reg], ops[reg], &[target, IB]));
        }
        reg += 1;
    }
    row
}

/// Builds every group table. Pure: every call yields the same tables.
pub const fn build_group_tables() -> [[Option<DecoderNode>; 8]; GROUP_COUNT] {
    let mut g = [EMPTY; GROUP_COUNT];

    g[GRP1_EB_IB as usize] = grp1(&ALU_NAMES_B, EB, IB);
    g[GRP1_EV_IV as usize] = grp1(&ALU_NAMES_S, EV, IV);
    g[GRP1_EV_IBS as usize] = grp1(&ALU_NAMES_S, EV, IBS);

    g[GRP1A as usize][0] = Some(general("popS", &[EV]));

    g[GRP2_EB_IB as usize] = grp2(true, &[EB, IB]);
    g[GRP2_EV_IB as usize] = grp2(false, &[EV, IB]);
    g[GRP2_EB_1 as usize] = grp2(true, &[EB, ONE]);
    g[GRP2_EV_1 as usize] = grp2(false, &[EV, ONE]);
    g[GRP2_EB_CL as usize] = grp2(true, &[EB, CL]);
    g[GRP2_EV_CL as usize] = grp2(false, &[EV, CL]);

    g[GRP3_EB as usize] = grp3(true);
    g[GRP3_EV as usize] = grp3(false);

    g[GRP4 as usize][0] = Some(arith("incb", Add, &[EB]));
    g[GRP4 as usize][1] = Some(arith("decb", Sub, &[EB]));

    g[GRP5 as usize][0] = Some(arith("incS", Add, &[EV]));
    g[GRP5 as usize][1] = Some(arith("decS", Sub, &[EV]));
    g[GRP5 as usize][2] = Some(call("call", &[EV]));
    g[GRP5 as usize][3] = Some(call("lcall", &[MP]));
    g[GRP5 as usize][4] = Some(jump("jmp", &[EV]));
    g[GRP5 as usize][5] = Some(jump("ljmp", &[MP]));
    g[GRP5 as usize][6] = Some(general("pushS", &[EV]));

    g[GRP6 as usize][0] = Some(general("sldt", &[EW]));
    g[GRP6 as usize][1] = Some(general("str", &[EW]));
    g[GRP6 as usize][2] = Some(general("lldt", &[EW]));
    g[GRP6 as usize][3] = Some(general("ltr", &[EW]));
    g[GRP6 as usize][4] = Some(general("verr", &[EW]));
    g[GRP6 as usize][5] = Some(general("verw", &[EW]));

    g[GRP7 as usize][0] = Some(general("sgdt", &[M]));
    g[GRP7 as usize][1] = Some(general("sidt", &[M]));
    g[GRP7 as usize][2] = Some(general("lgdt", &[M]));
    g[GRP7 as usize][3] = Some(general("lidt", &[M]));
    g[GRP7 as usize][4] = Some(general("smsw", &[EW]));
    g[GRP7 as usize][6] = Some(general("lmsw", &[EW]));
    g[GRP7 as usize][7] = Some(general("invlpg", &[M]));

    g[GRP8 as usize][4] = Some(logic("btS", Test, &[EV, IB]));
    g[GRP8 as usize][5] = Some(general("btsS", &[EV, IB]));
    g[GRP8 as usize][6] = Some(general("btrS", &[EV, IB]));
    g[GRP8 as usize][7] = Some(general("btcS", &[EV, IB]));

    g[GRP9 as usize][1] = Some(general("cmpxchg8b", &[MQ]));

    g[GRP12 as usize] = shift_imm(["", "", "psrlw", "", "psraw", "", "psllw", ""], false);
    g[GRP13 as usize] = shift_imm(["", "", "psrld", "", "psrad", "", "pslld", ""], false);
    g[GRP14 as usize] = shift_imm(["", "", "psrlq", "", "", "", "psllq", ""], false);
    g[GRP12_66 as usize] = shift_imm(["", "", "psrlw", "", "psraw", "", "psllw", ""], true);
    g[GRP13_66 as usize] = shift_imm(["", "", "psrld", "", "psrad", "", "pslld", ""], true);
    g[GRP14_66 as usize] = shift_imm(["", "", "psrlq", "psrldq", "", "", "psllq", "pslldq"], true);

    g[GRP15 as usize][0] = Some(general("fxsave", &[M]));
    g[GRP15 as usize][1] = Some(general("fxrstor", &[M]));
    g[GRP15 as usize][2] = Some(general("ldmxcsr", &[MD]));
    g[GRP15 as usize][3] = Some(general("stmxcsr", &[MD]));
    g[GRP15 as usize][7] = Some(general("clflush", &[MB]));

    g[GRP15_REG as usize][5] = Some(general("lfence", &[]));
    g[GRP15_REG as usize][6] = Some(general("mfence", &[]));
    g[GRP15_REG as usize][7] = Some(general("sfence", &[]));

    g[GRP16 as usize][0] = Some(general("prefetchnta", &[MB]));
    g[GRP16 as usize][1] = Some(general("prefetcht0", &[MB]));
    g[GRP16 as usize][2] = Some(general("prefetcht1", &[MB]));
    g[GRP16 as usize][3] = Some(general("prefetcht2", &[MB]));

    g
}

/// Returns the table a group node dispatches through for `modrm`.
///
/// Group 15 switches to its register-form table when `mod == 3`. `None`
/// means the group number does not exist.
pub(crate) fn select(group: u8, modrm: ModRM) -> Option<&'static Row> {
    let group = if group == GRP15 && modrm.is_register() {
        GRP15_REG
    } else {
        group
    };
    GROUP_TABLES.get(group as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grp1_rows() {
        let row = &GROUP_TABLES[GRP1_EV_IBS as usize];
        let names: Vec<_> = row.iter().map(|n| n.unwrap().template).collect();
        assert_eq!(names, ALU_NAMES_S);
        assert_eq!(row[4].unwrap().kind, NodeKind::Logical(And));
        assert_eq!(row[7].unwrap().kind, NodeKind::Arithmetic(Compare));
        assert_eq!(row[0].unwrap().operands[1], Some(IBS));
    }

    #[test]
    fn test_grp2_hole() {
        for group in [GRP2_EB_IB, GRP2_EV_1, GRP2_EV_CL] {
            let row = &GROUP_TABLES[group as usize];
            assert!(row[6].is_none());
            assert_eq!(row[0].unwrap().kind, NodeKind::Rotate(RotateLeft));
            assert_eq!(row[7].unwrap().kind, NodeKind::Shift(ShiftRightArithmetic));
        }
    }

    #[test]
    fn test_grp15_register_forms() {
        let mem = select(GRP15, ModRM::parse(0x38)).unwrap();
        assert_eq!(mem[7].unwrap().template, "clflush");
        let reg = select(GRP15, ModRM::parse(0xF8)).unwrap();
        assert_eq!(reg[7].unwrap().template, "sfence");
        assert!(reg[0].is_none());
    }

    #[test]
    fn test_unknown_group() {
        assert!(select(GROUP_COUNT as u8, ModRM::parse(0)).is_none());
    }

    #[test]
    fn test_tables_are_deterministic() {
        assert_eq!(build_group_tables(), GROUP_TABLES);
    }
}
