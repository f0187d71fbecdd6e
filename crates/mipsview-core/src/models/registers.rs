use crate::{
    models::{Invalidation, RowStyle, TableModel, ViewContext, hex_word},
    target::{DebugTarget, Reg},
};

const HEADERS: [&str; 2] = ["Register", "Value"];

/// One row per register-file entry.
#[derive(Debug, Clone, Default)]
pub struct RegistersModel {
    /// Values captured right before the last resume/step, used to highlight
    /// what the CPU changed.
    saved: Option<[u32; Reg::COUNT]>,
}

impl RegistersModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the current values so the next paint can flag changes.
    pub fn save_current_values<T: DebugTarget + ?Sized>(&mut self, target: &T) {
        self.saved = Some(core::array::from_fn(|index| {
            Reg::from_index(index).map_or(0, |reg| target.register(reg))
        }));
    }

    pub fn clear_saved_values(&mut self) {
        self.saved = None;
    }

    /// Whether `reg` differs from the value saved before the last step.
    pub fn has_changed<T: DebugTarget + ?Sized>(&self, target: &T, reg: Reg) -> bool {
        self.saved
            .is_some_and(|saved| saved[reg.index()] != target.register(reg))
    }

    /// Register geometry never changes, so a full reset is always safe.
    pub fn invalidate(&self) -> Invalidation {
        Invalidation::Reset
    }
}

impl TableModel for RegistersModel {
    fn row_count(&self, _ctx: &ViewContext<'_>) -> usize {
        Reg::COUNT
    }

    fn column_count(&self) -> usize {
        HEADERS.len()
    }

    fn header_label(&self, column: usize) -> Option<&'static str> {
        HEADERS.get(column).copied()
    }

    fn cell_value(&self, ctx: &ViewContext<'_>, row: usize, column: usize) -> Option<String> {
        let reg = Reg::from_index(row)?;
        match column {
            0 => Some(ctx.target.register_name(reg).to_string()),
            1 => Some(hex_word(ctx.target.register(reg))),
            _ => None,
        }
    }

    fn row_style(&self, ctx: &ViewContext<'_>, row: usize) -> RowStyle {
        match Reg::from_index(row) {
            Some(reg) if self.has_changed(ctx.target, reg) => RowStyle {
                foreground: Some(ctx.config.colors.changed_foreground),
                background: None,
            },
            _ => RowStyle::default(),
        }
    }
}
