#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::{Result, bail};
use mipsview_core::{
    Breakpoint, BreakpointRegistry, BreakpointTable, DebugTarget, DebuggerConfig,
    DebuggerSession, ExecutionControl, MemoryRegion, PhysicalAddress, Reg, ViewEvent,
    VirtualAddress,
    memory_map::{CodeRegion, CodeRegionId},
    target::{RawWords, snapshot::Snapshot},
};

pub const MAX_RUN_STEPS: usize = 10_000;

// Encoded instructions used by the scripted programs.
pub const NOP: u32 = 0x0000_0000;
/// jal 0x80020000
pub const JAL_0X80020000: u32 = 0x0C00_8000;
/// jr $ra
pub const JR_RA: u32 = 0x03E0_0008;
/// beq $zero, $zero, -1
pub const BEQ_SELF: u32 = 0x1000_FFFF;
/// lw $a0, 16($sp)
pub const LW_A0_16_SP: u32 = 0x8FA4_0010;

pub fn session() -> DebuggerSession<Vec<ViewEvent>> {
    DebuggerSession::new(DebuggerConfig::default(), Box::new(RawWords), Vec::new())
}

/// A snapshot with run control. Execution is sequential except for
/// explicitly scripted jumps; breakpoints stop `run` the way the emulator's
/// CPU loop would.
#[derive(Debug, Clone)]
pub struct ScriptedMachine {
    pub snapshot: Snapshot,
    paused: bool,
    jumps: HashMap<VirtualAddress, VirtualAddress>,
    pub steps: usize,
}

impl ScriptedMachine {
    pub fn new(pc: VirtualAddress) -> Self {
        let mut snapshot = Snapshot::new();
        snapshot.set_pc(pc);
        Self {
            snapshot,
            paused: true,
            jumps: HashMap::new(),
            steps: 0,
        }
    }

    /// Loads consecutive words starting at `address`.
    pub fn program(&mut self, address: VirtualAddress, words: &[u32]) -> Result<()> {
        for (index, &word) in words.iter().enumerate() {
            self.snapshot
                .write_word(address + 4 * index as u32, word)?;
        }
        Ok(())
    }

    /// After executing `from`, continue at `to`.
    pub fn jump(&mut self, from: VirtualAddress, to: VirtualAddress) {
        self.jumps.insert(from, to);
    }

    /// Runs until an enabled breakpoint is reached, then pauses there.
    pub fn run(&mut self) -> Result<VirtualAddress> {
        if self.paused {
            bail!("machine was not resumed");
        }
        for _ in 0..MAX_RUN_STEPS {
            self.single_step();
            let pc = self.snapshot.pc();
            if self.snapshot.breakpoint_table().should_break(pc) {
                self.snapshot.breakpoint_table_mut().record_hit(pc);
                self.paused = true;
                return Ok(pc);
            }
        }
        bail!("no breakpoint hit within {MAX_RUN_STEPS} steps");
    }
}

impl DebugTarget for ScriptedMachine {
    fn register(&self, reg: Reg) -> u32 {
        self.snapshot.register(reg)
    }

    fn safe_read_instruction(&self, address: VirtualAddress) -> Option<u32> {
        self.snapshot.safe_read_instruction(address)
    }

    fn safe_read_word(&self, address: VirtualAddress) -> Option<u32> {
        self.snapshot.safe_read_word(address)
    }

    fn memory_bank(&self, region: MemoryRegion) -> Option<&[u8]> {
        self.snapshot.memory_bank(region)
    }
}

impl BreakpointRegistry for ScriptedMachine {
    fn has_breakpoint(&self, address: VirtualAddress) -> bool {
        self.snapshot.has_breakpoint(address)
    }

    fn add_breakpoint(&mut self, address: VirtualAddress, temporary: bool) -> bool {
        self.snapshot.add_breakpoint(address, temporary)
    }

    fn remove_breakpoint(&mut self, address: VirtualAddress) -> bool {
        self.snapshot.remove_breakpoint(address)
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        self.snapshot.breakpoints()
    }

    fn breakpoint_enabled(&self, address: VirtualAddress) -> Option<bool> {
        self.snapshot.breakpoint_enabled(address)
    }
}

impl ExecutionControl for ScriptedMachine {
    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn single_step(&mut self) {
        let pc = self.snapshot.pc();
        let next = self.jumps.get(&pc).copied().unwrap_or(pc.wrapping_add(4));
        self.snapshot.set_pc(next);
        self.steps += 1;
    }
}

/// Target whose only code region is a 4 KiB window at physical 0x1000,
/// with every word reading back its own address.
#[derive(Debug, Default)]
pub struct WindowTarget {
    pub pc: VirtualAddress,
    pub breakpoints: BreakpointTable,
}

pub const WINDOW: CodeRegion = CodeRegion::new(CodeRegionId::Ram, 0x1000, 0x2000);

impl DebugTarget for WindowTarget {
    fn register(&self, reg: Reg) -> u32 {
        match reg {
            Reg::Pc => self.pc,
            _ => 0,
        }
    }

    fn safe_read_instruction(&self, address: VirtualAddress) -> Option<u32> {
        self.safe_read_word(address)
    }

    fn safe_read_word(&self, address: VirtualAddress) -> Option<u32> {
        WINDOW
            .contains(address & 0x1FFF_FFFF)
            .then_some(address)
    }

    fn code_region_for_address(&self, address: PhysicalAddress) -> Option<CodeRegion> {
        WINDOW.contains(address).then_some(WINDOW)
    }

    fn memory_bank(&self, _region: MemoryRegion) -> Option<&[u8]> {
        None
    }
}

impl BreakpointRegistry for WindowTarget {
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
