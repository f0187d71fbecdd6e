use std::{fs, io::Write, ops::Range, path::Path};

use anyhow::{Context, Result};
use mipsview_core::{
    BreakpointRegistry, DebugTarget, DebuggerConfig, DebuggerSession, Reg,
    TableModel, TextSurface, ViewContext, ViewKind, ViewListener,
    config::PrintableRange,
    target::{RawWords, snapshot::Snapshot},
};
use tracing::{debug, info};

use crate::args::Args;

/// Forwards status messages to the log; everything else is repainted in
/// one pass at the end.
struct LogListener;

impl ViewListener for LogListener {
    fn on_full_reset(&mut self, view: ViewKind) {
        debug!("{view:?} view reset");
    }

    fn on_status_message(&mut self, message: &str) {
        info!("{message}");
    }
}

pub struct App {
    args: Args,
    machine: Snapshot,
    session: DebuggerSession<LogListener>,
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut machine = Snapshot::new();
        if let Some(path) = &args.ram {
            machine.load_ram(&read_image(path)?);
        }
        if let Some(path) = &args.bios {
            machine.load_bios(&read_image(path)?);
        }
        if let Some(path) = &args.scratchpad {
            machine.load_scratchpad(&read_image(path)?);
        }
        if let Some(path) = &args.exp1 {
            machine.attach_exp1(&read_image(path)?);
        }

        machine.set_pc(args.pc);
        if let Some(sp) = args.sp {
            machine.set_register(Reg::Sp, sp);
        }
        for &(reg, value) in &args.regs {
            machine.set_register(reg, value);
        }
        for &address in &args.breakpoints {
            if !machine.add_breakpoint(address, false) {
                anyhow::bail!("cannot add breakpoint at 0x{address:08X}");
            }
        }

        let mut config = DebuggerConfig::default();
        if args.latin1 {
            config.memory.printable = PrintableRange::Latin1;
        }
        let session = DebuggerSession::new(config, Box::new(RawWords), LogListener);

        Ok(Self {
            args,
            machine,
            session,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.prepare()?;
        let mut out = std::io::stdout().lock();
        self.print(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Opens the session on the paused snapshot and positions the hex view.
    fn prepare(&mut self) -> Result<()> {
        self.session.on_emulation_paused(true, &self.machine);

        let font = self.session.config().memory.font;
        let viewport = self.session.viewport_mut();
        viewport.resize(viewport.content_width(), self.args.memory_rows * font.char_height);
        self.session
            .set_active_memory_region(self.args.region, &self.machine);
        if let Some(address) = self.args.memory_address {
            self.session
                .scroll_to_memory_address(address, &self.machine)
                .with_context(|| format!("showing memory at 0x{address:08X}"))?;
        }
        Ok(())
    }

    fn print(&self, out: &mut impl Write) -> Result<()> {
        let session = &self.session;
        let ctx = session.view_context(&self.machine);

        let code = session.code();
        let code_rows = match code.row_for_pc() {
            Some(pc_row) => centered(pc_row, self.args.code_rows, code.len()),
            None => 0..0,
        };
        writeln!(out, "== code ({}) ==", code.region().segment())?;
        print_table(out, code, &ctx, code_rows, |row| {
            let address = code.address_for_row(row);
            if code.row_for_pc() == Some(row) {
                '>'
            } else if self.machine.has_breakpoint(address) {
                '*'
            } else {
                ' '
            }
        })?;

        writeln!(out, "\n== registers ==")?;
        let registers = session.registers();
        print_table(out, registers, &ctx, 0..registers.row_count(&ctx), |_| ' ')?;

        writeln!(out, "\n== stack (sp = 0x{:08X}) ==", self.machine.stack_pointer())?;
        let stack = session.stack();
        let stack_rows = centered(stack.sp_row(), self.args.stack_rows, stack.len());
        print_table(out, stack, &ctx, stack_rows, |row| {
            if row == stack.sp_row() { '>' } else { ' ' }
        })?;

        writeln!(out, "\n== breakpoints ==")?;
        let list = session.breakpoint_list();
        print_table(out, list, &ctx, 0..list.row_count(&ctx), |_| ' ')?;

        self.print_memory(out, &ctx)
    }

    fn print_memory(&self, out: &mut impl Write, ctx: &ViewContext<'_>) -> Result<()> {
        let region = self.session.active_memory_region();
        writeln!(out, "\n== memory ({region}) ==")?;
        let viewport = self.session.viewport();
        let bank = match ctx.target.memory_bank(region) {
            Some(bank) if viewport.is_enabled() => bank,
            _ => {
                writeln!(out, "{}", ctx.config.invalid_placeholder)?;
                return Ok(());
            }
        };
        let mut surface = TextSurface::for_viewport(viewport);
        viewport.draw(bank, &mut surface);
        write!(out, "{surface}")?;
        Ok(())
    }
}

/// `count` rows centred on `row`, clamped to `0..len`.
fn centered(row: usize, count: usize, len: usize) -> Range<usize> {
    let start = row.saturating_sub(count / 2).min(len.saturating_sub(count));
    start..(start + count).min(len)
}

fn print_table(
    out: &mut impl Write,
    model: &dyn TableModel,
    ctx: &ViewContext<'_>,
    rows: Range<usize>,
    marker: impl Fn(usize) -> char,
) -> Result<()> {
    let columns = model.column_count();
    let cells: Vec<Vec<String>> = rows
        .clone()
        .map(|row| {
            (0..columns)
                .map(|col| model.cell_value(ctx, row, col).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            let header = model.header_label(col).map_or(0, str::len);
            cells
                .iter()
                .map(|row| row[col].len())
                .fold(header, usize::max)
        })
        .collect();

    let header: Vec<String> = (0..columns)
        .map(|col| format!("{:<w$}", model.header_label(col).unwrap_or(""), w = widths[col]))
        .collect();
    writeln!(out, "  {}", header.join("  ").trim_end())?;
    for (row, values) in rows.zip(cells) {
        let line: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, &w)| format!("{value:<w$}"))
            .collect();
        writeln!(out, "{} {}", marker(row), line.join("  ").trim_end())?;
    }
    Ok(())
}
