//! A frozen machine image usable as a [`DebugTarget`].
//!
//! Hosts without a live emulator (the CLI, tests) fill one of these from raw
//! memory dumps and register values.

use crate::{
    address::{Segment, VirtualAddress, virtual_to_physical},
    breakpoints::{Breakpoint, BreakpointTable},
    error::DebuggerError,
    memory_map::{
        BIOS_BASE, BIOS_SIZE, EXP1_BASE, EXP1_SIZE, MemoryRegion, RAM_MASK, RAM_MIRROR_END,
        RAM_SIZE, SCRATCHPAD_BASE, SCRATCHPAD_SIZE,
    },
    target::{BreakpointRegistry, DebugTarget, Reg},
};

#[derive(Debug, Clone)]
pub struct Snapshot {
    regs: [u32; Reg::COUNT],
    ram: Vec<u8>,
    scratchpad: Vec<u8>,
    bios: Vec<u8>,
    exp1: Option<Vec<u8>>,
    breakpoints: BreakpointTable,
}

impl Snapshot {
    /// Zeroed RAM and scratchpad, no BIOS and no expansion device.
    pub fn new() -> Self {
        Self {
            regs: [0; Reg::COUNT],
            ram: vec![0; RAM_SIZE as usize],
            scratchpad: vec![0; SCRATCHPAD_SIZE as usize],
            bios: Vec::new(),
            exp1: None,
            breakpoints: BreakpointTable::new(),
        }
    }

    pub fn set_register(&mut self, reg: Reg, value: u32) {
        // $zero is hardwired.
        if reg != Reg::Zero {
            self.regs[reg.index()] = value;
        }
    }

    pub fn set_pc(&mut self, pc: VirtualAddress) {
        self.set_register(Reg::Pc, pc);
    }

    /// Copies `image` to the start of RAM. Bytes past 2 MiB are ignored.
    pub fn load_ram(&mut self, image: &[u8]) {
        let len = image.len().min(self.ram.len());
        self.ram[..len].copy_from_slice(&image[..len]);
    }

    pub fn load_scratchpad(&mut self, image: &[u8]) {
        let len = image.len().min(self.scratchpad.len());
        self.scratchpad[..len].copy_from_slice(&image[..len]);
    }

    /// Installs a BIOS image, truncated to 512 KiB.
    pub fn load_bios(&mut self, image: &[u8]) {
        let len = image.len().min(BIOS_SIZE as usize);
        self.bios = image[..len].to_vec();
    }

    /// Attaches an expansion device image to EXP1.
    pub fn attach_exp1(&mut self, image: &[u8]) {
        let len = image.len().min(EXP1_SIZE as usize);
        self.exp1 = Some(image[..len].to_vec());
    }

    /// Stores `value` little-endian at `address`.
    pub fn write_word(&mut self, address: VirtualAddress, value: u32) -> Result<(), DebuggerError> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, address: VirtualAddress, bytes: &[u8]) -> Result<(), DebuggerError> {
        let (bank, offset) = self
            .locate_mut(address)
            .ok_or(DebuggerError::UnmappedAddress { address })?;
        let dest = bank
            .get_mut(offset..offset + bytes.len())
            .ok_or(DebuggerError::UnmappedAddress { address })?;
        dest.copy_from_slice(bytes);
        Ok(())
    }

    pub fn breakpoint_table(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    pub fn breakpoint_table_mut(&mut self) -> &mut BreakpointTable {
        &mut self.breakpoints
    }

    fn locate(&self, address: VirtualAddress, fetch: bool) -> Option<(&[u8], usize)> {
        let physical = virtual_to_physical(address);
        if physical < RAM_MIRROR_END {
            return Some((self.ram.as_slice(), (physical & RAM_MASK) as usize));
        }
        if (BIOS_BASE..BIOS_BASE + BIOS_SIZE).contains(&physical) {
            return Some((self.bios.as_slice(), (physical - BIOS_BASE) as usize));
        }
        // The scratchpad is data cache: not fetchable and only reachable
        // through the cached segments.
        if !fetch
            && Segment::for_address(address).is_cached()
            && (SCRATCHPAD_BASE..SCRATCHPAD_BASE + SCRATCHPAD_SIZE).contains(&physical)
        {
            return Some((self.scratchpad.as_slice(), (physical - SCRATCHPAD_BASE) as usize));
        }
        if (EXP1_BASE..EXP1_BASE + EXP1_SIZE).contains(&physical) {
            let exp1 = self.exp1.as_deref()?;
            return Some((exp1, (physical - EXP1_BASE) as usize));
        }
        None
    }

    fn locate_mut(&mut self, address: VirtualAddress) -> Option<(&mut [u8], usize)> {
        let physical = virtual_to_physical(address);
        if physical < RAM_MIRROR_END {
            return Some((self.ram.as_mut_slice(), (physical & RAM_MASK) as usize));
        }
        if (BIOS_BASE..BIOS_BASE + BIOS_SIZE).contains(&physical) {
            return Some((self.bios.as_mut_slice(), (physical - BIOS_BASE) as usize));
        }
        if (SCRATCHPAD_BASE..SCRATCHPAD_BASE + SCRATCHPAD_SIZE).contains(&physical) {
            return Some((self.scratchpad.as_mut_slice(), (physical - SCRATCHPAD_BASE) as usize));
        }
        if (EXP1_BASE..EXP1_BASE + EXP1_SIZE).contains(&physical) {
            let exp1 = self.exp1.as_deref_mut()?;
            return Some((exp1, (physical - EXP1_BASE) as usize));
        }
        None
    }

    fn read_u32(&self, address: VirtualAddress, fetch: bool) -> Option<u32> {
        let (bank, offset) = self.locate(address, fetch)?;
        let bytes = bank.get(offset..offset + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTarget for Snapshot {
    fn register(&self, reg: Reg) -> u32 {
        self.regs[reg.index()]
    }

    fn safe_read_instruction(&self, address: VirtualAddress) -> Option<u32> {
        self.read_u32(address, true)
    }

    fn safe_read_word(&self, address: VirtualAddress) -> Option<u32> {
        self.read_u32(address, false)
    }

    fn memory_bank(&self, region: MemoryRegion) -> Option<&[u8]> {
        match region {
            MemoryRegion::Ram => Some(self.ram.as_slice()),
            MemoryRegion::Scratchpad => Some(self.scratchpad.as_slice()),
            MemoryRegion::Exp1 => self.exp1.as_deref(),
        }
    }
}

impl BreakpointRegistry for Snapshot {
    fn has_breakpoint(&self, address: VirtualAddress) -> bool {
        self.breakpoints.has_breakpoint(address)
    }

    fn add_breakpoint(&mut self, address: VirtualAddress, temporary: bool) -> bool {
        self.breakpoints.add_breakpoint(address, temporary)
    }

    fn remove_breakpoint(&mut self, address: VirtualAddress) -> bool {
        self.breakpoints.remove_breakpoint(address)
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        self.breakpoints.breakpoints()
    }

    fn breakpoint_enabled(&self, address: VirtualAddress) -> Option<bool> {
        self.breakpoints.breakpoint_enabled(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_is_visible_through_every_mirror() {
        let mut snapshot = Snapshot::new();
        snapshot.write_word(0x8001_0000, 0x2408_0001).expect("ram write");

        assert_eq!(snapshot.safe_read_word(0x0001_0000), Some(0x2408_0001));
        assert_eq!(snapshot.safe_read_word(0xA001_0000), Some(0x2408_0001));
        assert_eq!(snapshot.safe_read_instruction(0x8021_0000), Some(0x2408_0001));
    }

    #[test]
    fn scratchpad_is_data_only_and_cached_only() {
        let mut snapshot = Snapshot::new();
        snapshot.write_word(0x1F80_0010, 0xCAFE_BABE).expect("scratchpad write");

        assert_eq!(snapshot.safe_read_word(0x1F80_0010), Some(0xCAFE_BABE));
        assert_eq!(snapshot.safe_read_word(0x9F80_0010), Some(0xCAFE_BABE));
        assert_eq!(snapshot.safe_read_word(0xBF80_0010), None);
        assert_eq!(snapshot.safe_read_instruction(0x1F80_0010), None);
    }

    #[test]
    fn missing_banks_read_as_unmapped() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.safe_read_instruction(0xBFC0_0000), None);
        assert_eq!(snapshot.safe_read_word(0x1F00_0000), None);
        assert_eq!(snapshot.safe_read_word(0x1F80_1810), None);
        assert!(snapshot.memory_bank(MemoryRegion::Exp1).is_none());
    }

    #[test]
    fn bios_reads_after_load() {
        let mut snapshot = Snapshot::new();
        snapshot.load_bios(&[0x00, 0x00, 0x08, 0x3C, 0xAA]);
        assert_eq!(snapshot.safe_read_instruction(0xBFC0_0000), Some(0x3C08_0000));
        // Only one byte left past the first word.
        assert_eq!(snapshot.safe_read_instruction(0xBFC0_0004), None);
    }

    #[test]
    fn zero_register_stays_zero() {
        let mut snapshot = Snapshot::new();
        snapshot.set_register(Reg::Zero, 5);
        snapshot.set_register(Reg::Sp, 0x801F_FFF0);
        assert_eq!(snapshot.register(Reg::Zero), 0);
        assert_eq!(snapshot.stack_pointer(), 0x801F_FFF0);
    }

    #[test]
    fn writes_outside_memory_fail() {
        let mut snapshot = Snapshot::new();
        assert_eq!(
            snapshot.write_word(0x1F80_1810, 1),
            Err(DebuggerError::UnmappedAddress {
                address: 0x1F80_1810
            })
        );
    }
}
