use crate::{
    address::VirtualAddress,
    breakpoints::Breakpoint,
    models::{TableModel, ViewContext, hex_word},
};

const HEADERS: [&str; 4] = ["#", "Address", "Hits", "Enabled"];

/// Secondary view listing every breakpoint in the registry.
///
/// Holds no rows itself; the registry is queried on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakpointListModel;

impl BreakpointListModel {
    pub fn new() -> Self {
        Self
    }

    fn entry(ctx: &ViewContext<'_>, row: usize) -> Option<Breakpoint> {
        ctx.breakpoints.breakpoints().get(row).copied()
    }

    /// Check state of the row's enable box.
    pub fn is_enabled(&self, ctx: &ViewContext<'_>, row: usize) -> Option<bool> {
        Self::entry(ctx, row).map(|bp| bp.enabled)
    }

    pub fn address_for_row(&self, ctx: &ViewContext<'_>, row: usize) -> Option<VirtualAddress> {
        Self::entry(ctx, row).map(|bp| bp.address)
    }
}

impl TableModel for BreakpointListModel {
    fn row_count(&self, ctx: &ViewContext<'_>) -> usize {
        ctx.breakpoints.breakpoints().len()
    }

    fn column_count(&self) -> usize {
        HEADERS.len()
    }

    fn header_label(&self, column: usize) -> Option<&'static str> {
        HEADERS.get(column).copied()
    }

    fn cell_value(&self, ctx: &ViewContext<'_>, row: usize, column: usize) -> Option<String> {
        let bp = Self::entry(ctx, row)?;
        match column {
            0 => Some(bp.number.to_string()),
            1 => Some(hex_word(bp.address)),
            2 => Some(bp.hit_count.to_string()),
            3 => Some(if bp.enabled { "yes" } else { "no" }.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DebuggerConfig,
        target::{BreakpointRegistry, RawWords, snapshot::Snapshot},
    };

    #[test]
    fn rows_mirror_the_registry() {
        let mut snapshot = Snapshot::new();
        snapshot.add_breakpoint(0x8001_0000, false);
        snapshot.add_breakpoint(0x8001_0010, false);
        snapshot.breakpoint_table_mut().record_hit(0x8001_0010);
        snapshot.breakpoint_table_mut().set_enabled(0x8001_0000, false);

        let config = DebuggerConfig::default();
        let ctx = ViewContext::new(&snapshot, &RawWords, &config);
        let model = BreakpointListModel::new();

        assert_eq!(model.row_count(&ctx), 2);
        assert_eq!(model.cell_value(&ctx, 0, 0).as_deref(), Some("1"));
        assert_eq!(model.cell_value(&ctx, 0, 1).as_deref(), Some("0x80010000"));
        assert_eq!(model.is_enabled(&ctx, 0), Some(false));
        assert_eq!(model.cell_value(&ctx, 1, 2).as_deref(), Some("1"));
        assert_eq!(model.is_enabled(&ctx, 1), Some(true));
        assert_eq!(model.address_for_row(&ctx, 1), Some(0x8001_0010));
        assert_eq!(model.cell_value(&ctx, 0, 3).as_deref(), Some("no"));
        assert_eq!(model.cell_value(&ctx, 0, 4), None);
        assert_eq!(model.cell_value(&ctx, 2, 0), None);
    }
}
