//! Interfaces the debugger consumes from the emulator.
//!
//! The views never touch emulator globals; every query receives the target
//! explicitly. Implementations are only queried while the emulated CPU is
//! stopped, so reads never race with execution.

use crate::{
    address::{PhysicalAddress, VirtualAddress},
    breakpoints::Breakpoint,
    memory_map::{self, CodeRegion, MemoryRegion},
};

mod reg;
pub mod snapshot;

pub use reg::Reg;

/// Read-only view of the paused machine.
pub trait DebugTarget {
    /// Current program counter.
    fn pc(&self) -> VirtualAddress {
        self.register(Reg::Pc)
    }

    fn register(&self, reg: Reg) -> u32;

    fn register_name(&self, reg: Reg) -> &str {
        reg.name()
    }

    fn stack_pointer(&self) -> VirtualAddress {
        self.register(Reg::Sp)
    }

    /// Fetches the instruction word at `address` without side effects.
    /// Returns `None` when the address is not backed by executable memory.
    fn safe_read_instruction(&self, address: VirtualAddress) -> Option<u32>;

    /// Reads a data word at `address` without side effects.
    /// Returns `None` when the address is not backed by memory.
    fn safe_read_word(&self, address: VirtualAddress) -> Option<u32>;

    /// Instruction-addressable region covering a physical address.
    fn code_region_for_address(&self, address: PhysicalAddress) -> Option<CodeRegion> {
        memory_map::code_region_for_address(address)
    }

    /// Live contents of a memory bank, or `None` when the bank is absent.
    ///
    /// The slice is only borrowed for the current query; callers must not
    /// hold on to anything derived from it across a resume.
    fn memory_bank(&self, region: MemoryRegion) -> Option<&[u8]>;
}

/// Address-keyed breakpoint store owned by the emulator.
///
/// Mutations are immediately visible to subsequent queries.
pub trait BreakpointRegistry {
    fn has_breakpoint(&self, address: VirtualAddress) -> bool;

    /// Returns `false` when the registry refuses the breakpoint
    /// (already present, or out of slots).
    fn add_breakpoint(&mut self, address: VirtualAddress, temporary: bool) -> bool;

    /// Returns `false` when there was no breakpoint at `address`.
    fn remove_breakpoint(&mut self, address: VirtualAddress) -> bool;

    /// Current breakpoints ordered by number.
    fn breakpoints(&self) -> Vec<Breakpoint>;

    /// Enable state of the breakpoint at `address`, `None` when there is none.
    fn breakpoint_enabled(&self, address: VirtualAddress) -> Option<bool> {
        self.breakpoints()
            .into_iter()
            .find(|bp| bp.address == address)
            .map(|bp| bp.enabled)
    }
}

/// Run control provided by the host. All calls are synchronous.
pub trait ExecutionControl {
    fn is_paused(&self) -> bool;

    fn set_paused(&mut self, paused: bool);

    /// Executes exactly one instruction and returns once the CPU is stopped again.
    fn single_step(&mut self);
}

/// Formats one instruction for the code view.
pub trait Disassembler {
    fn disassemble(&self, address: VirtualAddress, bits: u32) -> String;
}

impl<F> Disassembler for F
where
    F: Fn(VirtualAddress, u32) -> String,
{
    fn disassemble(&self, address: VirtualAddress, bits: u32) -> String {
        self(address, bits)
    }
}

/// Disassembler that prints the raw word as a data directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawWords;

impl Disassembler for RawWords {
    fn disassemble(&self, _address: VirtualAddress, bits: u32) -> String {
        format!(".word 0x{bits:08x}")
    }
}
