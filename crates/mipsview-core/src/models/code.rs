use tracing::trace;

use crate::{
    address::{INSTRUCTION_SIZE, VirtualAddress},
    code_region::{CodeRegionTracker, RegionUpdate},
    models::{Invalidation, RowStyle, TableModel, ViewContext, hex_word},
    target::DebugTarget,
};

const HEADERS: [&str; 3] = ["Address", "Bytes", "Instruction"];

pub const COLUMN_ADDRESS: usize = 0;
pub const COLUMN_BYTES: usize = 1;
pub const COLUMN_INSTRUCTION: usize = 2;

/// Instruction view windowed onto the code region containing the PC.
#[derive(Debug, Clone, Default)]
pub struct CodeModel {
    region: CodeRegionTracker,
    last_pc: VirtualAddress,
}

impl CodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> &CodeRegionTracker {
        &self.region
    }

    pub fn last_pc(&self) -> VirtualAddress {
        self.last_pc
    }

    /// Number of instruction rows in the current window.
    pub fn len(&self) -> usize {
        (self.region.end().wrapping_sub(self.region.start()) / INSTRUCTION_SIZE) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row showing `address`, or `None` if it lies outside the window.
    pub fn row_for_address(&self, address: VirtualAddress) -> Option<usize> {
        if !self.region.contains(address) {
            return None;
        }
        Some(((address - self.region.start()) / INSTRUCTION_SIZE) as usize)
    }

    pub fn address_for_row(&self, row: usize) -> VirtualAddress {
        self.region
            .start()
            .wrapping_add((row as u32).wrapping_mul(INSTRUCTION_SIZE))
    }

    pub fn row_for_pc(&self) -> Option<usize> {
        self.row_for_address(self.last_pc)
    }

    /// Windows the view onto the region containing `address` without moving
    /// the PC marker.
    pub fn reset_code_view<T: DebugTarget + ?Sized>(
        &mut self,
        address: VirtualAddress,
        target: &T,
    ) -> Invalidation {
        match self.region.update(address, target) {
            RegionUpdate::Changed => Invalidation::Reset,
            RegionUpdate::Unchanged | RegionUpdate::Unresolved => Invalidation::None,
        }
    }

    /// Moves the PC marker.
    ///
    /// Re-windows (full reset) when the PC left the displayed region;
    /// otherwise only the rows of the old and new PC need repainting.
    pub fn set_pc<T: DebugTarget + ?Sized>(
        &mut self,
        pc: VirtualAddress,
        target: &T,
    ) -> Invalidation {
        let prev_pc = self.last_pc;
        self.last_pc = pc;
        if self.region.update(pc, target) == RegionUpdate::Changed {
            return Invalidation::Reset;
        }

        let rows: Vec<_> = [prev_pc, pc]
            .into_iter()
            .filter_map(|address| self.row_for_address(address))
            .map(|row| row..=row)
            .collect();
        if rows.is_empty() {
            Invalidation::None
        } else {
            Invalidation::Rows(rows)
        }
    }

    /// Invalidation for the single row displaying `address`.
    pub fn invalidate_address(&self, address: VirtualAddress) -> Invalidation {
        match self.row_for_address(address) {
            Some(row) => Invalidation::Rows(vec![row..=row]),
            None => Invalidation::None,
        }
    }
}

impl TableModel for CodeModel {
    fn row_count(&self, _ctx: &ViewContext<'_>) -> usize {
        self.len()
    }

    fn column_count(&self) -> usize {
        HEADERS.len()
    }

    fn header_label(&self, column: usize) -> Option<&'static str> {
        HEADERS.get(column).copied()
    }

    fn cell_value(&self, ctx: &ViewContext<'_>, row: usize, column: usize) -> Option<String> {
        if row >= self.len() {
            return None;
        }
        let address = self.address_for_row(row);
        match column {
            COLUMN_ADDRESS => Some(hex_word(address)),
            COLUMN_BYTES => Some(match ctx.target.safe_read_instruction(address) {
                Some(bits) => format!("{bits:08X}"),
                None => ctx.invalid(),
            }),
            COLUMN_INSTRUCTION => Some(match ctx.target.safe_read_instruction(address) {
                Some(bits) => {
                    trace!("disassemble 0x{address:08X}");
                    ctx.disassembler.disassemble(address, bits)
                }
                None => ctx.invalid(),
            }),
            _ => None,
        }
    }

    fn row_style(&self, ctx: &ViewContext<'_>, row: usize) -> RowStyle {
        if row >= self.len() {
            return RowStyle::default();
        }
        let address = self.address_for_row(row);
        let colors = &ctx.config.colors;
        if address == self.last_pc {
            RowStyle {
                foreground: Some(colors.pc_foreground),
                background: Some(colors.pc_background),
            }
        } else if ctx.breakpoints.breakpoint_enabled(address) == Some(true) {
            RowStyle {
                foreground: None,
                background: Some(colors.breakpoint_background),
            }
        } else {
            RowStyle::default()
        }
    }
}
