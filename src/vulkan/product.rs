use std::fmt;

pub const INTEL_VENDOR_ID: u32 = 0x8086;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntelProduct {
    Unknown,
    Kbl,
    Cfl,
    Icl,
    Tgl,
    Dg1,
    Adls,
    Adlp,
    Dg2,
    Mtl,
    Pvc,
    Lnl,
    Bmg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntelGen {
    Unknown,
    Gen9,
    Gen11,
    Gen12Lp,
    XeHpg,
    XeHpc,
    XeLpg,
    Xe2,
}

impl IntelProduct {
    pub fn from_device_id(device_id: u32) -> Self {
        match device_id {
            0x5900..=0x59FF => Self::Kbl,
            0x3E90..=0x3EFF => Self::Cfl,
            0x8A50..=0x8A71 => Self::Icl,
            0x9A40..=0x9AFF => Self::Tgl,
            0x4905..=0x4909 => Self::Dg1,
            0x4680..=0x469F => Self::Adls,
            0x46A0..=0x46DF => Self::Adlp,
            0x5690..=0x56FF => Self::Dg2,
            0x7D40..=0x7DFF => Self::Mtl,
            0x0BD0..=0x0BDF => Self::Pvc,
            0x6420..=0x64BF => Self::Lnl,
            0xE200..=0xE2FF => Self::Bmg,
            _ => Self::Unknown,
        }
    }

    pub fn generation(self) -> IntelGen {
        match self {
            Self::Unknown => IntelGen::Unknown,
            Self::Kbl | Self::Cfl => IntelGen::Gen9,
            Self::Icl => IntelGen::Gen11,
            Self::Tgl | Self::Dg1 | Self::Adls | Self::Adlp => IntelGen::Gen12Lp,
            Self::Dg2 => IntelGen::XeHpg,
            Self::Pvc => IntelGen::XeHpc,
            Self::Mtl => IntelGen::XeLpg,
            Self::Lnl | Self::Bmg => IntelGen::Xe2,
        }
    }
}

impl fmt::Display for IntelProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::Kbl => "KBL",
            Self::Cfl => "CFL",
            Self::Icl => "ICL",
            Self::Tgl => "TGL",
            Self::Dg1 => "DG1",
            Self::Adls => "ADLS",
            Self::Adlp => "ADLP",
            Self::Dg2 => "DG2",
            Self::Mtl => "MTL",
            Self::Pvc => "PVC",
            Self::Lnl => "LNL",
            Self::Bmg => "BMG",
        };
        f.write_str(name)
    }
}

impl fmt::Display for IntelGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::Gen9 => "Gen9",
            Self::Gen11 => "Gen11",
            Self::Gen12Lp => "Gen12LP",
            Self::XeHpg => "XeHPG",
            Self::XeHpc => "XeHPC",
            Self::XeLpg => "XeLPG",
            Self::Xe2 => "Xe2",
        };
        f.write_str(name)
    }
}
