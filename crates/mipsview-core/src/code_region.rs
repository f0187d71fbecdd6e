//! Tracks which code region the instruction view is windowed onto.

use core::ops::Range;

use tracing::debug;

use crate::{
    address::{Segment, VirtualAddress, virtual_to_physical},
    memory_map::CodeRegionId,
    target::DebugTarget,
};

/// Outcome of [`CodeRegionTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionUpdate {
    /// The window moved to a new region or segment.
    Changed,
    /// The address lies in the region already on display.
    Unchanged,
    /// No code region covers the address; the previous window is kept.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegionTracker {
    segment: Segment,
    region: Option<CodeRegionId>,
    start: VirtualAddress,
    end: VirtualAddress,
}

impl CodeRegionTracker {
    pub fn new() -> Self {
        Self {
            segment: Segment::Kuseg,
            region: None,
            start: 0,
            end: 0,
        }
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn region(&self) -> Option<CodeRegionId> {
        self.region
    }

    /// Current window as a half-open virtual interval.
    pub fn window(&self) -> Range<VirtualAddress> {
        self.start..self.end
    }

    pub fn start(&self) -> VirtualAddress {
        self.start
    }

    pub fn end(&self) -> VirtualAddress {
        self.end
    }

    pub fn contains(&self, address: VirtualAddress) -> bool {
        address >= self.start && address < self.end
    }

    /// Re-windows onto the region covering `address` if it differs from the
    /// one on display.
    pub fn update<T: DebugTarget + ?Sized>(
        &mut self,
        address: VirtualAddress,
        target: &T,
    ) -> RegionUpdate {
        let segment = Segment::for_address(address);
        let Some(region) = target.code_region_for_address(virtual_to_physical(address)) else {
            return RegionUpdate::Unresolved;
        };
        if segment == self.segment && Some(region.id) == self.region {
            return RegionUpdate::Unchanged;
        }

        self.segment = segment;
        self.region = Some(region.id);
        self.start = segment.to_virtual(region.start);
        self.end = segment.to_virtual(region.end);
        debug!(
            "code view re-windowed to {} ({}) 0x{:08X}..0x{:08X}",
            region.id, segment, self.start, self.end
        );
        RegionUpdate::Changed
    }
}

impl Default for CodeRegionTracker {
    fn default() -> Self {
        Self::new()
    }
}
