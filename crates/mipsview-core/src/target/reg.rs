use core::fmt;

/// CPU register ids in register-file order: the 32 GPRs followed by the
/// multiply/divide results and the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Reg {
    Zero,
    At,
    V0,
    V1,
    A0,
    A1,
    A2,
    A3,
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    T8,
    T9,
    K0,
    K1,
    Gp,
    Sp,
    Fp,
    Ra,
    Hi,
    Lo,
    Pc,
}

const NAMES: [&str; Reg::COUNT] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra", "hi", "lo", "pc",
];

impl Reg {
    /// Number of entries in the register file.
    pub const COUNT: usize = 35;
    /// Number of general-purpose registers addressable by instruction fields.
    pub const GPR_COUNT: usize = 32;

    const ALL: [Reg; Self::COUNT] = [
        Reg::Zero,
        Reg::At,
        Reg::V0,
        Reg::V1,
        Reg::A0,
        Reg::A1,
        Reg::A2,
        Reg::A3,
        Reg::T0,
        Reg::T1,
        Reg::T2,
        Reg::T3,
        Reg::T4,
        Reg::T5,
        Reg::T6,
        Reg::T7,
        Reg::S0,
        Reg::S1,
        Reg::S2,
        Reg::S3,
        Reg::S4,
        Reg::S5,
        Reg::S6,
        Reg::S7,
        Reg::T8,
        Reg::T9,
        Reg::K0,
        Reg::K1,
        Reg::Gp,
        Reg::Sp,
        Reg::Fp,
        Reg::Ra,
        Reg::Hi,
        Reg::Lo,
        Reg::Pc,
    ];

    /// Register at `index` in register-file order.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// GPR named by a 5-bit instruction field.
    pub fn gpr(field: u32) -> Self {
        Self::ALL[(field & 0x1F) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Conventional ABI name.
    pub fn name(self) -> &'static str {
        NAMES[self.index()]
    }

    pub fn iter() -> impl Iterator<Item = Reg> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Reg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches('$').to_ascii_lowercase();
        if let Some(index) = NAMES.iter().position(|candidate| *candidate == name) {
            return Ok(Self::ALL[index]);
        }
        // `$29`-style numeric GPR references.
        match name.parse::<usize>() {
            Ok(index) if index < Self::GPR_COUNT => Ok(Self::ALL[index]),
            _ => Err(format!("unknown register: {s}")),
        }
    }
}
