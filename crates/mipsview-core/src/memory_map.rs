//! Physical memory layout of the console bus.
//!
//! Centralizing the bank bases and sizes keeps the code-region and memory
//! viewport logic free of magic numbers.

use core::{fmt, ops::Range};

use crate::address::PhysicalAddress;

/// Main RAM base address.
pub const RAM_BASE: PhysicalAddress = 0x0000_0000;
/// Size of main RAM (2 MiB).
pub const RAM_SIZE: u32 = 0x0020_0000;
/// End of the RAM mirror window; RAM repeats every [`RAM_SIZE`] bytes up to here.
pub const RAM_MIRROR_END: PhysicalAddress = 0x0080_0000;
/// Mask that folds a mirrored RAM address back onto the physical array.
pub const RAM_MASK: u32 = RAM_SIZE - 1;

/// Expansion region 1 (parallel port) base address.
pub const EXP1_BASE: PhysicalAddress = 0x1F00_0000;
/// Size of the EXP1 window.
pub const EXP1_SIZE: u32 = 0x0080_0000;

/// Scratchpad (data cache used as fast RAM) base address.
pub const SCRATCHPAD_BASE: PhysicalAddress = 0x1F80_0000;
/// Size of the scratchpad (1 KiB).
pub const SCRATCHPAD_SIZE: u32 = 0x400;

/// BIOS ROM base address.
pub const BIOS_BASE: PhysicalAddress = 0x1FC0_0000;
/// Size of the BIOS ROM (512 KiB).
pub const BIOS_SIZE: u32 = 0x0008_0000;

/// Identity of an instruction-addressable physical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeRegionId {
    Ram,
    Bios,
}

impl CodeRegionId {
    /// Canonical bounds of this region on the console bus.
    pub const fn bounds(self) -> Range<PhysicalAddress> {
        match self {
            // The whole mirror window, so a PC executing from a mirror still
            // lands inside the code view.
            Self::Ram => RAM_BASE..RAM_MIRROR_END,
            Self::Bios => BIOS_BASE..BIOS_BASE + BIOS_SIZE,
        }
    }
}

impl fmt::Display for CodeRegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ram => f.write_str("RAM"),
            Self::Bios => f.write_str("BIOS"),
        }
    }
}

/// A contiguous physical range that instructions can be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeRegion {
    pub id: CodeRegionId,
    /// Inclusive physical start.
    pub start: PhysicalAddress,
    /// Exclusive physical end.
    pub end: PhysicalAddress,
}

impl CodeRegion {
    pub const fn new(id: CodeRegionId, start: PhysicalAddress, end: PhysicalAddress) -> Self {
        Self { id, start, end }
    }

    /// The region as laid out on the console bus.
    pub const fn canonical(id: CodeRegionId) -> Self {
        let bounds = id.bounds();
        Self::new(id, bounds.start, bounds.end)
    }

    pub const fn contains(&self, address: PhysicalAddress) -> bool {
        address >= self.start && address < self.end
    }
}

/// Resolves the console code region covering `address`, if any.
pub fn code_region_for_address(address: PhysicalAddress) -> Option<CodeRegion> {
    [CodeRegionId::Ram, CodeRegionId::Bios]
        .into_iter()
        .map(CodeRegion::canonical)
        .find(|region| region.contains(address))
}

/// Memory banks the hex viewport can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryRegion {
    #[default]
    Ram,
    Scratchpad,
    Exp1,
}

impl MemoryRegion {
    pub const ALL: [MemoryRegion; 3] = [Self::Ram, Self::Scratchpad, Self::Exp1];

    pub const fn base(self) -> PhysicalAddress {
        match self {
            Self::Ram => RAM_BASE,
            Self::Scratchpad => SCRATCHPAD_BASE,
            Self::Exp1 => EXP1_BASE,
        }
    }

    pub const fn size(self) -> u32 {
        match self {
            Self::Ram => RAM_SIZE,
            Self::Scratchpad => SCRATCHPAD_SIZE,
            Self::Exp1 => EXP1_SIZE,
        }
    }

    /// Bank containing `address`, together with the offset inside that bank.
    ///
    /// RAM mirrors are folded back onto the 2 MiB array.
    pub fn containing(address: PhysicalAddress) -> Option<(Self, u32)> {
        if address < RAM_MIRROR_END {
            return Some((Self::Ram, address & RAM_MASK));
        }
        Self::ALL
            .into_iter()
            .find(|region| address >= region.base() && address - region.base() < region.size())
            .map(|region| (region, address - region.base()))
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ram => "ram",
            Self::Scratchpad => "scratchpad",
            Self::Exp1 => "exp1",
        };
        f.write_str(s)
    }
}

impl core::str::FromStr for MemoryRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ram" => Ok(Self::Ram),
            "scratchpad" | "dcache" => Ok(Self::Scratchpad),
            "exp1" => Ok(Self::Exp1),
            other => Err(format!("unknown memory region: {other}")),
        }
    }
}
