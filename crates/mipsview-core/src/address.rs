//! Virtual <-> physical address translation for the R3000 segment layout.
//!
//! The CPU sees a 4 GiB virtual space split by the top three address bits
//! into KUSEG, KSEG0 and KSEG1 (both mirroring the first 512 MiB of physical
//! memory) and KSEG2. Every function here is pure so repeated repaints map the
//! same row to the same address.

use core::fmt;

/// Address as issued by the CPU.
pub type VirtualAddress = u32;
/// Address as decoded by the bus.
pub type PhysicalAddress = u32;

/// Mask applied to KUSEG/KSEG0/KSEG1 addresses to reach the physical bus.
pub const PHYSICAL_ADDRESS_MASK: u32 = 0x1FFF_FFFF;

/// Size of one instruction word.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Address-translation mode selected by the top bits of a virtual address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Segment {
    /// User segment, `0x0000_0000-0x7FFF_FFFF`.
    #[default]
    Kuseg,
    /// Kernel cached mirror, `0x8000_0000-0x9FFF_FFFF`.
    Kseg0,
    /// Kernel uncached mirror, `0xA000_0000-0xBFFF_FFFF`.
    Kseg1,
    /// Kernel mapped segment, `0xC000_0000-0xFFFF_FFFF`. Passed through as-is.
    Kseg2,
}

impl Segment {
    /// Segment implied by `address`.
    pub const fn for_address(address: VirtualAddress) -> Self {
        match address >> 29 {
            0..=3 => Self::Kuseg,
            4 => Self::Kseg0,
            5 => Self::Kseg1,
            _ => Self::Kseg2,
        }
    }

    /// Bits OR'd onto a physical address to place it in this segment.
    pub const fn base(self) -> u32 {
        match self {
            Self::Kuseg | Self::Kseg2 => 0,
            Self::Kseg0 => 0x8000_0000,
            Self::Kseg1 => 0xA000_0000,
        }
    }

    /// Whether accesses through this segment go through the cache.
    pub const fn is_cached(self) -> bool {
        matches!(self, Self::Kuseg | Self::Kseg0)
    }

    pub const fn to_physical(self, address: VirtualAddress) -> PhysicalAddress {
        match self {
            Self::Kseg2 => address,
            _ => address & PHYSICAL_ADDRESS_MASK,
        }
    }

    pub const fn to_virtual(self, address: PhysicalAddress) -> VirtualAddress {
        address | self.base()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Kuseg => "KUSEG",
            Self::Kseg0 => "KSEG0",
            Self::Kseg1 => "KSEG1",
            Self::Kseg2 => "KSEG2",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Translates a CPU address into the bus address it decodes to.
#[inline]
pub const fn virtual_to_physical(address: VirtualAddress) -> PhysicalAddress {
    Segment::for_address(address).to_physical(address)
}

/// Places a bus address into `segment`.
#[inline]
pub const fn physical_to_virtual(address: PhysicalAddress, segment: Segment) -> VirtualAddress {
    segment.to_virtual(address)
}
