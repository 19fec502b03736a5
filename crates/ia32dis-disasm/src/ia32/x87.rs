//! x87 escape maps (`D8`..`DF`).
//!
//! The same escape byte and ModR/M `reg` pair names different instructions
//! for the memory form (`mod != 3`) and the register form (`mod == 3`), so
//! there are two 8x8 maps indexed by `[escape - 0xD8][reg]`. Register-form
//! slots that depend on `rm` as well forward to a float group table.

use super::node::spec::*;
use super::node::*;
use ia32dis_core::RtlOperation::*;

type Map = [[Option<DecoderNode>; 8]; 8];
type Row = [Option<DecoderNode>; 8];

pub const FG_D9_2: u8 = 0;
pub const FG_D9_4: u8 = 1;
pub const FG_D9_5: u8 = 2;
pub const FG_D9_6: u8 = 3;
pub const FG_D9_7: u8 = 4;
pub const FG_DA_5: u8 = 5;
pub const FG_DB_4: u8 = 6;
pub const FG_DE_3: u8 = 7;
pub const FG_DF_4: u8 = 8;
/// Number of float group tables.
pub const FLOAT_GROUP_COUNT: usize = 9;

/// Memory forms.
pub static FLOAT_MAP_ONE: Map = build_float_map_one();
/// Register forms.
pub static FLOAT_MAP_TWO: Map = build_float_map_two();
/// Register forms selected by `rm`, indexed by float group number.
pub static FLOAT_GROUP_TABLES: [Row; FLOAT_GROUP_COUNT] = build_float_groups();

/// Arithmetic row shared by D8, DA, DC and DE memory forms.
const fn arith_row(names: [&'static str; 8], operand: OperandSpec) -> Row {
    [
        Some(farith(names[0], Add, &[operand])),
        Some(farith(names[1], SignedMul, &[operand])),
        Some(farith(names[2], Compare, &[operand])),
        Some(farith(names[3], Compare, &[operand])),
        Some(farith(names[4], Sub, &[operand])),
        Some(farith(names[5], Sub, &[operand])),
        Some(farith(names[6], SignedDiv, &[operand])),
        Some(farith(names[7], SignedDiv, &[operand])),
    ]
}

/// Builds the memory-form map. Pure: every call yields the same map.
pub const fn build_float_map_one() -> Map {
    let mut m: Map = [[None; 8]; 8];

    m[0] = arith_row(
        ["fadds", "fmuls", "fcoms", "fcomps", "fsubs", "fsubrs", "fdivs", "fdivrs"],
        ESR,
    );

    m[1][0] = Some(fload("flds", &[ESR]));
    m[1][2] = Some(fstore("fsts", &[ESR]));
    m[1][3] = Some(fstore("fstps", &[ESR]));
    m[1][4] = Some(fgeneral("fldenv", &[ENV]));
    m[1][5] = Some(fgeneral("fldcw", &[EI16]));
    m[1][6] = Some(fgeneral("fNstenv", &[ENV]));
    m[1][7] = Some(fgeneral("fNstcw", &[EI16]));

    m[2] = arith_row(
        ["fiaddl", "fimull", "ficoml", "ficompl", "fisubl", "fisubrl", "fidivl", "fidivrl"],
        EI32,
    );

    m[3][0] = Some(fload("fildl", &[EI32]));
    m[3][2] = Some(fstore("fistl", &[EI32]));
    m[3][3] = Some(fstore("fistpl", &[EI32]));
    m[3][5] = Some(fload("fldt", &[EER]));
    m[3][7] = Some(fstore("fstpt", &[EER]));

    m[4] = arith_row(
        ["faddl", "fmull", "fcoml", "fcompl", "fsubl", "fsubrl", "fdivl", "fdivrl"],
        EDR,
    );

    m[5][0] = Some(fload("fldl", &[EDR]));
    m[5][2] = Some(fstore("fstl", &[EDR]));
    m[5][3] = Some(fstore("fstpl", &[EDR]));
    m[5][4] = Some(fgeneral("frstor", &[ENV]));
    m[5][6] = Some(fgeneral("fNsave", &[ENV]));
    m[5][7] = Some(fgeneral("fNstsw", &[EI16]));

    m[6] = arith_row(
        ["fiadds", "fimuls", "ficoms", "ficomps", "fisubs", "fisubrs", "fidivs", "fidivrs"],
        EI16,
    );

    m[7][0] = Some(fload("filds", &[EI16]));
    m[7][2] = Some(fstore("fists", &[EI16]));
    m[7][3] = Some(fstore("fistps", &[EI16]));
    m[7][4] = Some(fload("fbld", &[EBCD]));
    m[7][5] = Some(fload("fildll", &[EI64]));
    m[7][6] = Some(fstore("fbstp", &[EBCD]));
    m[7][7] = Some(fstore("fistpll", &[EI64]));

    m
}

/// Builds the register-form map. Pure: every call yields the same map.
pub const fn build_float_map_two() -> Map {
    let mut m: Map = [[None; 8]; 8];

    // D8: st(0) op st(i)
    m[0][0] = Some(farith("fadd", Add, &[ST0, STI]));
    m[0][1] = Some(farith("fmul", SignedMul, &[ST0, STI]));
    m[0][2] = Some(farith("fcom", Compare, &[STI]));
    m[0][3] = Some(farith("fcomp", Compare, &[STI]));
    m[0][4] = Some(farith("fsub", Sub, &[ST0, STI]));
    m[0][5] = Some(farith("fsubr", Sub, &[ST0, STI]));
    m[0][6] = Some(farith("fdiv", SignedDiv, &[ST0, STI]));
    m[0][7] = Some(farith("fdivr", SignedDiv, &[ST0, STI]));

    m[1][0] = Some(fload("fld", &[STI]));
    m[1][1] = Some(fgeneral("fxch", &[STI]));
    m[1][2] = Some(float_group(FG_D9_2));
    m[1][4] = Some(float_group(FG_D9_4));
    m[1][5] = Some(float_group(FG_D9_5));
    m[1][6] = Some(float_group(FG_D9_6));
    m[1][7] = Some(float_group(FG_D9_7));

    m[2][0] = Some(fgeneral("fcmovb", &[ST0, STI]));
    m[2][1] = Some(fgeneral("fcmove", &[ST0, STI]));
    m[2][2] = Some(fgeneral("fcmovbe", &[ST0, STI]));
    m[2][3] = Some(fgeneral("fcmovu", &[ST0, STI]));
    m[2][5] = Some(float_group(FG_DA_5));

    m[3][0] = Some(fgeneral("fcmovnb", &[ST0, STI]));
    m[3][1] = Some(fgeneral("fcmovne", &[ST0, STI]));
    m[3][2] = Some(fgeneral("fcmovnbe", &[ST0, STI]));
    m[3][3] = Some(fgeneral("fcmovnu", &[ST0, STI]));
    m[3][4] = Some(float_group(FG_DB_4));
    m[3][5] = Some(farith("fucomi", Compare, &[ST0, STI]));
    m[3][6] = Some(farith("fcomi", Compare, &[ST0, STI]));

    // DC: st(i) op st(0); reg 4..7 carry the Intel names.
    m[4][0] = Some(farith("fadd", Add, &[STI, ST0]));
    m[4][1] = Some(farith("fmul", SignedMul, &[STI, ST0]));
    m[4][4] = Some(farith("fsubr", Sub, &[STI, ST0]));
    m[4][5] = Some(farith("fsub", Sub, &[STI, ST0]));
    m[4][6] = Some(farith("fdivr", SignedDiv, &[STI, ST0]));
    m[4][7] = Some(farith("fdiv", SignedDiv, &[STI, ST0]));

    m[5][0] = Some(fgeneral("ffree", &[STI]));
    m[5][2] = Some(fstore("fst", &[STI]));
    m[5][3] = Some(fstore("fstp", &[STI]));
    m[5][4] = Some(farith("fucom", Compare, &[STI]));
    m[5][5] = Some(farith("fucomp", Compare, &[STI]));

    m[6][0] = Some(farith("faddp", Add, &[STI, ST0]));
    m[6][1] = Some(farith("fmulp", SignedMul, &[STI, ST0]));
    m[6][3] = Some(float_group(FG_DE_3));
    m[6][4] = Some(farith("fsubrp", Sub, &[STI, ST0]));
    m[6][5] = Some(farith("fsubp", Sub, &[STI, ST0]));
    m[6][6] = Some(farith("fdivrp", SignedDiv, &[STI, ST0]));
    m[6][7] = Some(farith("fdivp", SignedDiv, &[STI, ST0]));

    m[7][4] = Some(float_group(FG_DF_4));
    m[7][5] = Some(farith("fucomip", Compare, &[ST0, STI]));
    m[7][6] = Some(farith("fcomip", Compare, &[ST0, STI]));

    m
}

/// Builds the `rm`-selected tables. Pure: every call yields the same tables.
pub const fn build_float_groups() -> [Row; FLOAT_GROUP_COUNT] {
    let mut g: [Row; FLOAT_GROUP_COUNT] = [[None; 8]; FLOAT_GROUP_COUNT];

    g[FG_D9_2 as usize][0] = Some(fgeneral("fnop", &[]));

    g[FG_D9_4 as usize][0] = Some(farith("fchs", Neg, &[]));
    g[FG_D9_4 as usize][1] = Some(fgeneral("fabs", &[]));
    g[FG_D9_4 as usize][4] = Some(farith("ftst", Compare, &[]));
    g[FG_D9_4 as usize][5] = Some(fgeneral("fxam", &[]));

    g[FG_D9_5 as usize] = [
        Some(fload("fld1", &[])),
        Some(fload("fldl2t", &[])),
        Some(fload("fldl2e", &[])),
        Some(fload("fldpi", &[])),
        Some(fload("fldlg2", &[])),
        Some(fload("fldln2", &[])),
        Some(fload("fldz", &[])),
        None,
    ];

    g[FG_D9_6 as usize] = [
        Some(fgeneral("f2xm1", &[])),
        Some(fgeneral("fyl2x", &[])),
        Some(fgeneral("fptan", &[])),
        Some(fgeneral("fpatan", &[])),
        Some(fgeneral("fxtract", &[])),
        Some(fgeneral("fprem1", &[])),
        Some(fgeneral("fdecstp", &[])),
        Some(fgeneral("fincstp", &[])),
    ];

    g[FG_D9_7 as usize] = [
        Some(fgeneral("fprem", &[])),
        Some(fgeneral("fyl2xp1", &[])),
        Some(fgeneral("fsqrt", &[])),
        Some(fgeneral("fsincos", &[])),
        Some(fgeneral("frndint", &[])),
        Some(fgeneral("fscale", &[])),
        Some(fgeneral("fsin", &[])),
        Some(fgeneral("fcos", &[])),
    ];

    g[FG_DA_5 as usize][1] = Some(farith("fucompp", Compare, &[]));

    g[FG_DB_4 as usize][2] = Some(fgeneral("fNclex", &[]));
    g[FG_DB_4 as usize][3] = Some(fgeneral("fNinit", &[]));

    g[FG_DE_3 as usize][1] = Some(farith("fcompp", Compare, &[]));

    g[FG_DF_4 as usize][0] = Some(fgeneral("fNstsw", &[AX]));

    g
}

/// First ModR/M byte routed to the register map.
const REGISTER_FORMS: u8 = 0xBF;

/// Returns the map entry for escape byte `opcode` and ModR/M `modrm`.
///
/// ModR/M bytes below `0xBF` select the memory map; `0xBF` and above select
/// the register map.
pub(crate) fn select(opcode: u8, modrm: super::modrm::ModRM) -> Option<&'static DecoderNode> {
    let escape = opcode.checked_sub(0xD8)? as usize;
    let map = if modrm.byte < REGISTER_FORMS {
        &FLOAT_MAP_ONE
    } else {
        &FLOAT_MAP_TWO
    };
    map.get(escape)?[modrm.reg as usize].as_ref()
}
