//! Breakpoint records and a reusable in-memory registry.

use crate::{address::VirtualAddress, target::BreakpointRegistry};

/// Default number of breakpoint slots in a [`BreakpointTable`].
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoint {
    /// Sequential number assigned at creation.
    pub number: u32,
    pub address: VirtualAddress,
    pub enabled: bool,
    pub hit_count: u32,
    /// Removed automatically the first time it is hit (step-over/step-out).
    pub temporary: bool,
}

/// Breakpoint store with a fixed number of slots.
///
/// Suitable as the emulator-side registry: the CPU loop calls
/// [`BreakpointTable::record_hit`] when it stops on an address.
#[derive(Debug, Clone)]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
    capacity: usize,
    next_number: u32,
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            next_number: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: VirtualAddress) -> Option<&Breakpoint> {
        self.entries.iter().find(|bp| bp.address == address)
    }

    /// Whether execution should stop at `address`.
    pub fn should_break(&self, address: VirtualAddress) -> bool {
        self.get(address).is_some_and(|bp| bp.enabled)
    }

    /// Enables or disables the breakpoint at `address`.
    /// Returns `false` when no breakpoint exists there.
    pub fn set_enabled(&mut self, address: VirtualAddress, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|bp| bp.address == address) {
            Some(bp) => {
                bp.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Counts a hit on an enabled breakpoint and returns its updated record.
    /// Temporary breakpoints are removed by the hit.
    pub fn record_hit(&mut self, address: VirtualAddress) -> Option<Breakpoint> {
        let index = self
            .entries
            .iter()
            .position(|bp| bp.address == address && bp.enabled)?;
        let entry = &mut self.entries[index];
        entry.hit_count = entry.hit_count.saturating_add(1);
        let hit = *entry;
        if hit.temporary {
            self.entries.remove(index);
        }
        Some(hit)
    }

    /// Drops every temporary breakpoint, e.g. when the user pauses manually
    /// before a step-over target is reached.
    pub fn clear_temporary(&mut self) {
        self.entries.retain(|bp| !bp.temporary);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakpointRegistry for BreakpointTable {
    fn has_breakpoint(&self, address: VirtualAddress) -> bool {
        self.get(address).is_some()
    }

    fn add_breakpoint(&mut self, address: VirtualAddress, temporary: bool) -> bool {
        if self.has_breakpoint(address) || self.entries.len() >= self.capacity {
            return false;
        }
        self.entries.push(Breakpoint {
            number: self.next_number,
            address,
            enabled: true,
            hit_count: 0,
            temporary,
        });
        self.next_number += 1;
        true
    }

    fn remove_breakpoint(&mut self, address: VirtualAddress) -> bool {
        let before = self.entries.len();
        self.entries.retain(|bp| bp.address != address);
        self.entries.len() != before
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        self.entries.clone()
    }

    fn breakpoint_enabled(&self, address: VirtualAddress) -> Option<bool> {
        self.get(address).map(|bp| bp.enabled)
    }
}
