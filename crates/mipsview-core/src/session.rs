//! Keeps every view consistent with the machine across pause, resume and
//! step transitions.
//!
//! The session owns the table models and the memory viewport. Hosts call
//! into it with the target after every run-state change and receive
//! notifications through a [`ViewListener`] in mutation order.

use tracing::{debug, warn};

use crate::{
    address::{INSTRUCTION_SIZE, Segment, VirtualAddress, virtual_to_physical},
    config::DebuggerConfig,
    error::DebuggerError,
    instruction::Instruction,
    memory_map::MemoryRegion,
    models::{
        BreakpointListModel, CodeModel, Invalidation, RegistersModel, StackModel, ViewContext,
        ViewKind,
        code::{COLUMN_ADDRESS, COLUMN_BYTES, COLUMN_INSTRUCTION},
    },
    target::{BreakpointRegistry, DebugTarget, Disassembler, ExecutionControl},
    viewport::{DataBinding, MemoryViewport},
};

/// Receives change notifications from a [`DebuggerSession`].
///
/// Every method defaults to doing nothing.
pub trait ViewListener {
    /// Every row of `view` must be re-queried.
    fn on_full_reset(&mut self, _view: ViewKind) {}

    /// Rows `first..=last` of `view` must be re-queried.
    fn on_rows_changed(&mut self, _view: ViewKind, _first: usize, _last: usize) {}

    /// Geometry unchanged, contents must be repainted.
    fn on_repaint(&mut self, _view: ViewKind) {}

    fn on_scroll_to(&mut self, _view: ViewKind, _row: usize) {}

    fn on_ui_enabled(&mut self, _enabled: bool) {}

    /// Transient message for a status bar.
    fn on_status_message(&mut self, _message: &str) {}
}

/// Listener that drops every notification.
impl ViewListener for () {}

/// A recorded [`ViewListener`] notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    FullReset(ViewKind),
    RowsChanged {
        view: ViewKind,
        first: usize,
        last: usize,
    },
    Repaint(ViewKind),
    ScrollTo {
        view: ViewKind,
        row: usize,
    },
    UiEnabled(bool),
    StatusMessage(String),
}

impl ViewListener for Vec<ViewEvent> {
    fn on_full_reset(&mut self, view: ViewKind) {
        self.push(ViewEvent::FullReset(view));
    }

    fn on_rows_changed(&mut self, view: ViewKind, first: usize, last: usize) {
        self.push(ViewEvent::RowsChanged { view, first, last });
    }

    fn on_repaint(&mut self, view: ViewKind) {
        self.push(ViewEvent::Repaint(view));
    }

    fn on_scroll_to(&mut self, view: ViewKind, row: usize) {
        self.push(ViewEvent::ScrollTo { view, row });
    }

    fn on_ui_enabled(&mut self, enabled: bool) {
        self.push(ViewEvent::UiEnabled(enabled));
    }

    fn on_status_message(&mut self, message: &str) {
        self.push(ViewEvent::StatusMessage(message.to_string()));
    }
}

/// What a step request did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction executed; the machine is paused again.
    Stepped,
    /// A temporary breakpoint was placed and the machine resumed.
    RunningTo(VirtualAddress),
}

/// Address a step-over should stop at: the instruction after the delay slot
/// of the call at the PC.
pub fn step_over_address<T: DebugTarget + ?Sized>(
    target: &T,
) -> Result<VirtualAddress, DebuggerError> {
    let pc = target.pc();
    let unavailable = DebuggerError::StepOverUnavailable { pc };
    let inst = target
        .safe_read_instruction(pc)
        .map(Instruction)
        .ok_or(unavailable.clone())?;
    if !inst.is_call() {
        return Err(unavailable);
    }
    // A branch in the delay slot would not come back to pc + 8.
    let delay_slot = target
        .safe_read_instruction(pc.wrapping_add(INSTRUCTION_SIZE))
        .map(Instruction)
        .ok_or(unavailable.clone())?;
    if delay_slot.is_branch() {
        return Err(unavailable);
    }
    Ok(pc.wrapping_add(2 * INSTRUCTION_SIZE))
}

/// First `jr $ra` after the PC within `limit` instructions.
/// The scan stops early at unreadable memory.
pub fn step_out_address<T: DebugTarget + ?Sized>(
    target: &T,
    limit: u32,
) -> Result<VirtualAddress, DebuggerError> {
    let pc = target.pc();
    (1..=limit)
        .map(|n| pc.wrapping_add(n.wrapping_mul(INSTRUCTION_SIZE)))
        .map_while(|address| {
            target
                .safe_read_instruction(address)
                .map(|bits| (address, Instruction(bits)))
        })
        .find(|(_, inst)| inst.is_return())
        .map(|(address, _)| address)
        .ok_or(DebuggerError::StepOutUnavailable { pc })
}

/// Makes sure execution stops at `address`. An enabled breakpoint already
/// there is reused and a missing one is added as temporary; a disabled one
/// never stops the CPU, so placement fails.
fn place_stop<T: BreakpointRegistry + ?Sized>(target: &mut T, address: VirtualAddress) -> bool {
    match target.breakpoint_enabled(address) {
        Some(enabled) => enabled,
        None => target.add_breakpoint(address, true),
    }
}

pub struct DebuggerSession<L: ViewListener> {
    config: DebuggerConfig,
    disassembler: Box<dyn Disassembler>,
    listener: L,
    code: CodeModel,
    registers: RegistersModel,
    stack: StackModel,
    breakpoint_list: BreakpointListModel,
    viewport: MemoryViewport,
    active_region: MemoryRegion,
    ui_enabled: bool,
}

impl<L: ViewListener> DebuggerSession<L> {
    pub fn new(config: DebuggerConfig, disassembler: Box<dyn Disassembler>, listener: L) -> Self {
        let stack = StackModel::new(config.stack_range);
        let viewport = MemoryViewport::new(&config.memory);
        Self {
            config,
            disassembler,
            listener,
            code: CodeModel::new(),
            registers: RegistersModel::new(),
            stack,
            breakpoint_list: BreakpointListModel::new(),
            viewport,
            active_region: MemoryRegion::default(),
            ui_enabled: false,
        }
    }

    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    pub fn code(&self) -> &CodeModel {
        &self.code
    }

    pub fn registers(&self) -> &RegistersModel {
        &self.registers
    }

    pub fn stack(&self) -> &StackModel {
        &self.stack
    }

    pub fn breakpoint_list(&self) -> &BreakpointListModel {
        &self.breakpoint_list
    }

    pub fn viewport(&self) -> &MemoryViewport {
        &self.viewport
    }

    /// Direct access for host-driven geometry changes (resize, font, scroll).
    pub fn viewport_mut(&mut self) -> &mut MemoryViewport {
        &mut self.viewport
    }

    pub fn active_memory_region(&self) -> MemoryRegion {
        self.active_region
    }

    pub fn is_ui_enabled(&self) -> bool {
        self.ui_enabled
    }

    /// Context for querying the models against `target`.
    pub fn view_context<'a, T>(&'a self, target: &'a T) -> ViewContext<'a>
    where
        T: DebugTarget + BreakpointRegistry,
    {
        ViewContext::new(target, self.disassembler.as_ref(), &self.config)
    }

    fn emit(&mut self, view: ViewKind, invalidation: Invalidation) {
        match invalidation {
            Invalidation::None => {}
            Invalidation::Reset => self.listener.on_full_reset(view),
            Invalidation::Rows(rows) => {
                for range in rows {
                    self.listener
                        .on_rows_changed(view, *range.start(), *range.end());
                }
            }
        }
    }

    fn set_ui_enabled(&mut self, enabled: bool) {
        self.ui_enabled = enabled;
        self.listener.on_ui_enabled(enabled);
    }

    fn status(&mut self, error: &DebuggerError) {
        self.listener.on_status_message(&error.to_string());
    }

    /// Reacts to the host pausing or resuming the machine.
    pub fn on_emulation_paused<T: DebugTarget + ?Sized>(&mut self, paused: bool, target: &T) {
        if paused {
            self.set_ui_enabled(true);
            self.refresh_all(target);
            self.refresh_breakpoint_list();
        } else {
            self.set_ui_enabled(false);
        }
    }

    /// Brings every view up to date with the paused machine.
    pub fn refresh_all<T: DebugTarget + ?Sized>(&mut self, target: &T) {
        let registers = self.registers.invalidate();
        self.emit(ViewKind::Registers, registers);
        let stack = self.stack.invalidate();
        self.emit(ViewKind::Stack, stack);
        self.listener.on_repaint(ViewKind::Memory);

        let code = self.code.set_pc(target.pc(), target);
        self.emit(ViewKind::Code, code);
        if let Some(row) = self.code.row_for_pc() {
            self.listener.on_scroll_to(ViewKind::Code, row);
        }
    }

    pub fn refresh_breakpoint_list(&mut self) {
        self.listener.on_full_reset(ViewKind::Breakpoints);
    }

    /// Adds a breakpoint at `address` if there is none, removes it otherwise.
    /// Returns whether a breakpoint is now set.
    pub fn toggle_breakpoint<T: BreakpointRegistry + ?Sized>(
        &mut self,
        address: VirtualAddress,
        target: &mut T,
    ) -> Result<bool, DebuggerError> {
        let enable = !target.has_breakpoint(address);
        let applied = if enable {
            target.add_breakpoint(address, false)
        } else {
            target.remove_breakpoint(address)
        };
        if !applied {
            warn!("breakpoint registry rejected toggle at 0x{address:08X}");
            let error = DebuggerError::BreakpointRejected { address };
            self.status(&error);
            return Err(error);
        }

        let row = self.code.invalidate_address(address);
        self.emit(ViewKind::Code, row);
        self.refresh_breakpoint_list();
        Ok(enable)
    }

    /// Binds the memory viewport to `region`. An absent bank leaves the
    /// viewport disabled.
    pub fn set_active_memory_region<T: DebugTarget + ?Sized>(
        &mut self,
        region: MemoryRegion,
        target: &T,
    ) {
        self.active_region = region;
        let binding = target.memory_bank(region).map(|bank| DataBinding {
            size: bank.len().min(region.size() as usize),
            ..DataBinding::for_region(region)
        });
        if binding.is_none() {
            debug!("memory region {region} has no backing bank");
        }
        self.viewport.set_data(binding);
        self.listener.on_repaint(ViewKind::Memory);
    }

    /// Shows `address` in the memory viewport, switching banks if needed.
    pub fn scroll_to_memory_address<T: DebugTarget + ?Sized>(
        &mut self,
        address: VirtualAddress,
        target: &T,
    ) -> Result<(), DebuggerError> {
        let physical = virtual_to_physical(address);
        let (region, offset) =
            MemoryRegion::containing(physical).ok_or(DebuggerError::UnmappedAddress { address })?;
        // The scratchpad only answers through the cached segments.
        if region == MemoryRegion::Scratchpad && !Segment::for_address(address).is_cached() {
            return Err(DebuggerError::UnmappedAddress { address });
        }
        if region != self.active_region || !self.viewport.is_enabled() {
            self.set_active_memory_region(region, target);
        }
        if !self.viewport.is_enabled() {
            return Err(DebuggerError::UnmappedAddress { address });
        }

        self.viewport.scroll_to_address(offset as usize);
        self.listener
            .on_scroll_to(ViewKind::Memory, self.viewport.scroll_row());
        Ok(())
    }

    /// Scrolls the code view to `address`, re-windowing onto its region.
    /// Returns the row scrolled to.
    pub fn scroll_to_code_address<T: DebugTarget + ?Sized>(
        &mut self,
        address: VirtualAddress,
        target: &T,
    ) -> Result<usize, DebuggerError> {
        let window = self.code.reset_code_view(address, target);
        self.emit(ViewKind::Code, window);
        let row = self
            .code
            .row_for_address(address)
            .ok_or(DebuggerError::NoCodeRegion { address })?;
        self.listener.on_scroll_to(ViewKind::Code, row);
        Ok(row)
    }

    pub fn scroll_to_pc<T: DebugTarget + ?Sized>(
        &mut self,
        target: &T,
    ) -> Result<usize, DebuggerError> {
        self.scroll_to_code_address(target.pc(), target)
    }

    /// Shows the memory accessed by the load/store at `address`.
    /// Returns the effective address.
    pub fn follow_load_store<T: DebugTarget + ?Sized>(
        &mut self,
        address: VirtualAddress,
        target: &T,
    ) -> Result<VirtualAddress, DebuggerError> {
        let bits = target
            .safe_read_instruction(address)
            .ok_or(DebuggerError::UnmappedAddress { address })?;
        let effective = Instruction(bits)
            .effective_address(|reg| target.register(reg))
            .ok_or(DebuggerError::NoLoadStore { address })?;
        self.scroll_to_memory_address(effective, target)?;
        Ok(effective)
    }

    /// Handles activation (double-click/enter) of a code view cell.
    pub fn activate_code_cell<T>(
        &mut self,
        row: usize,
        column: usize,
        target: &mut T,
    ) -> Result<(), DebuggerError>
    where
        T: DebugTarget + BreakpointRegistry + ?Sized,
    {
        if row >= self.code.len() {
            return Ok(());
        }
        let address = self.code.address_for_row(row);
        match column {
            COLUMN_ADDRESS | COLUMN_BYTES => self.scroll_to_memory_address(address, &*target),
            COLUMN_INSTRUCTION => self.toggle_breakpoint(address, target).map(|_| ()),
            _ => Ok(()),
        }
    }

    fn ensure_paused<T: ExecutionControl + ?Sized>(target: &T) -> Result<(), DebuggerError> {
        if target.is_paused() {
            Ok(())
        } else {
            Err(DebuggerError::NotPaused)
        }
    }

    pub fn step_into<T>(&mut self, target: &mut T) -> Result<StepOutcome, DebuggerError>
    where
        T: DebugTarget + ExecutionControl + ?Sized,
    {
        Self::ensure_paused(&*target)?;
        self.registers.save_current_values(&*target);
        target.single_step();
        self.refresh_all(&*target);
        Ok(StepOutcome::Stepped)
    }

    /// Runs until the call at the PC returns; anything that is not a call is
    /// stepped into instead.
    pub fn step_over<T>(&mut self, target: &mut T) -> Result<StepOutcome, DebuggerError>
    where
        T: DebugTarget + BreakpointRegistry + ExecutionControl + ?Sized,
    {
        Self::ensure_paused(&*target)?;
        let next = match step_over_address(&*target) {
            Ok(next) => next,
            Err(error) => {
                debug!("{error}, stepping into");
                return self.step_into(target);
            }
        };
        if !place_stop(target, next) {
            warn!("cannot stop at 0x{next:08X} for step-over, stepping into");
            return self.step_into(target);
        }
        self.resume_unchecked(target);
        Ok(StepOutcome::RunningTo(next))
    }

    /// Runs until the current function executes `jr $ra`.
    pub fn step_out<T>(&mut self, target: &mut T) -> Result<StepOutcome, DebuggerError>
    where
        T: DebugTarget + BreakpointRegistry + ExecutionControl + ?Sized,
    {
        Self::ensure_paused(&*target)?;
        let placed = step_out_address(&*target, self.config.step_out_search_limit).and_then(
            |address| {
                if place_stop(target, address) {
                    Ok(address)
                } else {
                    Err(DebuggerError::StepOutUnavailable { pc: target.pc() })
                }
            },
        );
        match placed {
            Ok(address) => {
                self.resume_unchecked(target);
                Ok(StepOutcome::RunningTo(address))
            }
            Err(error) => {
                warn!("{error}");
                self.status(&error);
                Err(error)
            }
        }
    }

    /// Pauses the machine and refreshes every view. Pausing a paused machine
    /// only refreshes.
    pub fn pause<T>(&mut self, target: &mut T)
    where
        T: DebugTarget + ExecutionControl + ?Sized,
    {
        target.set_paused(true);
        self.on_emulation_paused(true, &*target);
    }

    pub fn resume<T>(&mut self, target: &mut T) -> Result<(), DebuggerError>
    where
        T: DebugTarget + ExecutionControl + ?Sized,
    {
        Self::ensure_paused(&*target)?;
        self.resume_unchecked(target);
        Ok(())
    }

    fn resume_unchecked<T>(&mut self, target: &mut T)
    where
        T: DebugTarget + ExecutionControl + ?Sized,
    {
        self.registers.save_current_values(&*target);
        self.on_emulation_paused(false, &*target);
        target.set_paused(false);
    }
}
