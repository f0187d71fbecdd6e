//! View synchronization and address translation for a MIPS R3000 debugger.
//!
//! The emulator is reached only through the traits in [`target`]; a
//! [`DebuggerSession`] turns run-state changes into ordered view
//! invalidations that a host UI (or the bundled text renderer) consumes.

pub mod address;
pub mod breakpoints;
pub mod code_region;
pub mod config;
pub mod error;
pub mod instruction;
pub mod memory_map;
pub mod models;
pub mod session;
pub mod target;
pub mod viewport;

pub use address::{PhysicalAddress, Segment, VirtualAddress};
pub use breakpoints::{Breakpoint, BreakpointTable};
pub use config::DebuggerConfig;
pub use error::DebuggerError;
pub use memory_map::MemoryRegion;
pub use models::{Invalidation, TableModel, ViewContext, ViewKind};
pub use session::{DebuggerSession, StepOutcome, ViewEvent, ViewListener};
pub use target::{BreakpointRegistry, DebugTarget, Disassembler, ExecutionControl, Reg};
pub use viewport::{MemoryViewport, TextSurface};
