use thiserror::Error;

use crate::address::VirtualAddress;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebuggerError {
    #[error("the target must be paused for this operation")]
    NotPaused,
    #[error("breakpoint registry rejected the change at 0x{address:08X}")]
    BreakpointRejected { address: VirtualAddress },
    #[error("cannot step over the instruction at 0x{pc:08X}")]
    StepOverUnavailable { pc: VirtualAddress },
    #[error("failed to add step-out breakpoint at 0x{pc:08X}, are you in a valid function?")]
    StepOutUnavailable { pc: VirtualAddress },
    #[error("instruction at 0x{address:08X} is not a load or store")]
    NoLoadStore { address: VirtualAddress },
    #[error("address 0x{address:08X} is not backed by memory")]
    UnmappedAddress { address: VirtualAddress },
    #[error("address 0x{address:08X} is not inside an executable region")]
    NoCodeRegion { address: VirtualAddress },
}
