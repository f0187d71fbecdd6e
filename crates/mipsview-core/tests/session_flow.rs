mod common;

use anyhow::Result;
use common::{BEQ_SELF, JAL_0X80020000, JR_RA, NOP, ScriptedMachine, session};
use mipsview_core::{
    BreakpointRegistry, DebugTarget, DebuggerError, ExecutionControl, Reg, StepOutcome,
    TableModel, ViewEvent, ViewKind,
};

const CALLER: u32 = 0x8001_0000;
const CALLEE: u32 = 0x8002_0000;

/// `jal CALLEE; nop` at CALLER and `nop; jr $ra; nop` at CALLEE, with the
/// control flow scripted to match.
fn call_program() -> Result<ScriptedMachine> {
    let mut machine = ScriptedMachine::new(CALLER);
    machine.program(CALLER, &[JAL_0X80020000, NOP, NOP])?;
    machine.program(CALLEE, &[NOP, JR_RA, NOP])?;
    machine.jump(CALLER + 4, CALLEE);
    machine.jump(CALLEE + 8, CALLER + 8);
    Ok(machine)
}

#[test]
fn step_into_executes_one_instruction_and_refreshes() -> Result<()> {
    let mut machine = call_program()?;
    let mut session = session();
    session.on_emulation_paused(true, &machine);
    session.listener_mut().clear();

    assert_eq!(session.step_into(&mut machine)?, StepOutcome::Stepped);
    assert_eq!(machine.pc(), CALLER + 4);
    assert_eq!(machine.steps, 1);

    let old_row = session.code().row_for_address(CALLER).expect("caller row");
    let events = session.listener();
    assert_eq!(events.first(), Some(&ViewEvent::FullReset(ViewKind::Registers)));
    assert!(events.contains(&ViewEvent::RowsChanged {
        view: ViewKind::Code,
        first: old_row,
        last: old_row,
    }));
    assert!(events.contains(&ViewEvent::ScrollTo {
        view: ViewKind::Code,
        row: old_row + 1,
    }));
    Ok(())
}

#[test]
fn stepping_highlights_changed_registers() -> Result<()> {
    let mut machine = call_program()?;
    let mut session = session();
    session.on_emulation_paused(true, &machine);
    session.step_into(&mut machine)?;

    let ctx = session.view_context(&machine);
    let pc_style = session.registers().row_style(&ctx, Reg::Pc.index());
    assert_eq!(pc_style.foreground, Some(session.config().colors.changed_foreground));
    assert_eq!(session.registers().row_style(&ctx, Reg::V0.index()).foreground, None);
    Ok(())
}

#[test]
fn step_over_a_call_runs_to_the_return_site() -> Result<()> {
    let mut machine = call_program()?;
    let mut session = session();
    session.on_emulation_paused(true, &machine);

    assert_eq!(
        session.step_over(&mut machine)?,
        StepOutcome::RunningTo(CALLER + 8)
    );
    assert!(!machine.is_paused());
    assert!(!session.is_ui_enabled());
    let temporary = machine
        .breakpoints()
        .into_iter()
        .find(|bp| bp.address == CALLER + 8)
        .expect("temporary breakpoint");
    assert!(temporary.temporary);

    assert_eq!(machine.run()?, CALLER + 8);
    session.on_emulation_paused(true, &machine);
    assert!(session.is_ui_enabled());
    assert!(!machine.has_breakpoint(CALLER + 8));
    assert_eq!(
        session.code().row_for_pc(),
        session.code().row_for_address(CALLER + 8)
    );
    Ok(())
}

#[test]
fn step_over_keeps_an_existing_user_breakpoint() -> Result<()> {
    let mut machine = call_program()?;
    assert!(machine.add_breakpoint(CALLER + 8, false));
    let mut session = session();
    session.on_emulation_paused(true, &machine);

    assert_eq!(
        session.step_over(&mut machine)?,
        StepOutcome::RunningTo(CALLER + 8)
    );
    machine.run()?;
    assert!(machine.has_breakpoint(CALLER + 8));
    Ok(())
}

#[test]
fn step_over_onto_a_disabled_breakpoint_steps_into() -> Result<()> {
    let mut machine = call_program()?;
    assert!(machine.add_breakpoint(CALLER + 8, false));
    machine
        .snapshot
        .breakpoint_table_mut()
        .set_enabled(CALLER + 8, false);
    let mut session = session();
    session.on_emulation_paused(true, &machine);

    assert_eq!(session.step_over(&mut machine)?, StepOutcome::Stepped);
    assert!(machine.is_paused());
    assert_eq!(machine.pc(), CALLER + 4);
    assert_eq!(machine.breakpoint_enabled(CALLER + 8), Some(false));
    assert_eq!(machine.breakpoints().len(), 1);
    Ok(())
}

#[test]
fn step_over_a_plain_instruction_steps_into() -> Result<()> {
    let mut machine = ScriptedMachine::new(CALLER + 4);
    machine.program(CALLER, &[JAL_0X80020000, NOP, NOP])?;
    let mut session = session();
    session.on_emulation_paused(true, &machine);

    assert_eq!(session.step_over(&mut machine)?, StepOutcome::Stepped);
    assert!(machine.is_paused());
    assert_eq!(machine.pc(), CALLER + 8);
    assert!(machine.breakpoints().is_empty());
    Ok(())
}

#[test]
fn step_over_a_call_with_a_branch_in_its_delay_slot_steps_into() -> Result<()> {
    let mut machine = ScriptedMachine::new(CALLER);
    machine.program(CALLER, &[JAL_0X80020000, BEQ_SELF])?;
    let mut session = session();
    session.on_emulation_paused(true, &machine);

    assert_eq!(session.step_over(&mut machine)?, StepOutcome::Stepped);
    assert!(machine.breakpoints().is_empty());
    Ok(())
}

#[test]
fn step_out_runs_to_the_function_return() -> Result<()> {
    let mut machine = call_program()?;
    machine.snapshot.set_pc(CALLEE);
    let mut session = session();
    session.on_emulation_paused(true, &machine);

    assert_eq!(
        session.step_out(&mut machine)?,
        StepOutcome::RunningTo(CALLEE + 4)
    );
    assert_eq!(machine.run()?, CALLEE + 4);
    assert!(machine.breakpoints().is_empty());
    Ok(())
}

#[test]
fn step_out_onto_a_disabled_breakpoint_reports_and_stays_paused() -> Result<()> {
    let mut machine = call_program()?;
    machine.snapshot.set_pc(CALLEE);
    assert!(machine.add_breakpoint(CALLEE + 4, false));
    machine
        .snapshot
        .breakpoint_table_mut()
        .set_enabled(CALLEE + 4, false);
    let mut session = session();
    session.on_emulation_paused(true, &machine);
    session.listener_mut().clear();

    assert_eq!(
        session.step_out(&mut machine),
        Err(DebuggerError::StepOutUnavailable { pc: CALLEE })
    );
    assert!(machine.is_paused());
    assert!(session.is_ui_enabled());
    assert_eq!(machine.steps, 0);
    assert_eq!(machine.breakpoint_enabled(CALLEE + 4), Some(false));
    assert!(matches!(
        session.listener().as_slice(),
        [ViewEvent::StatusMessage(_)]
    ));
    Ok(())
}

#[test]
fn step_out_without_a_return_reports_and_stays_paused() {
    let mut machine = ScriptedMachine::new(0x8003_0000);
    let mut session = session();
    session.on_emulation_paused(true, &machine);
    session.listener_mut().clear();

    let result = session.step_out(&mut machine);
    assert_eq!(
        result,
        Err(DebuggerError::StepOutUnavailable { pc: 0x8003_0000 })
    );
    assert!(machine.is_paused());
    assert!(machine.breakpoints().is_empty());
    assert!(matches!(
        session.listener().as_slice(),
        [ViewEvent::StatusMessage(message)] if message.contains("valid function")
    ));
}

#[test]
fn run_control_requires_a_paused_machine() {
    let mut machine = ScriptedMachine::new(CALLER);
    machine.set_paused(false);
    let mut session = session();

    assert_eq!(session.step_into(&mut machine), Err(DebuggerError::NotPaused));
    assert_eq!(session.step_over(&mut machine), Err(DebuggerError::NotPaused));
    assert_eq!(session.step_out(&mut machine), Err(DebuggerError::NotPaused));
    assert_eq!(session.resume(&mut machine), Err(DebuggerError::NotPaused));
    assert_eq!(machine.steps, 0);
}

#[test]
fn pause_and_resume_toggle_the_ui() -> Result<()> {
    let mut machine = ScriptedMachine::new(CALLER);
    let mut session = session();

    session.resume(&mut machine)?;
    assert!(!machine.is_paused());
    assert!(!session.is_ui_enabled());

    session.pause(&mut machine);
    assert!(machine.is_paused());
    assert!(session.is_ui_enabled());
    assert_eq!(
        session.listener().last(),
        Some(&ViewEvent::FullReset(ViewKind::Breakpoints))
    );
    Ok(())
}

#[test]
fn breakpoint_list_tracks_hits() -> Result<()> {
    let mut machine = call_program()?;
    let mut session = session();
    session.on_emulation_paused(true, &machine);
    session.toggle_breakpoint(CALLEE + 4, &mut machine)?;

    session.resume(&mut machine)?;
    assert_eq!(machine.run()?, CALLEE + 4);
    session.on_emulation_paused(true, &machine);

    let ctx = session.view_context(&machine);
    let list = session.breakpoint_list();
    assert_eq!(list.row_count(&ctx), 1);
    assert_eq!(list.cell_value(&ctx, 0, 1).as_deref(), Some("0x80020004"));
    assert_eq!(list.cell_value(&ctx, 0, 2).as_deref(), Some("1"));
    Ok(())
}
