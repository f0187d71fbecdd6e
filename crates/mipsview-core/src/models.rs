//! Table models backing the code, register, stack and breakpoint views.
//!
//! Models hold only their geometry (window bounds, last PC, saved register
//! values). Cell text is derived from the live target on every call because
//! the machine may have executed since the previous paint.

use core::ops::RangeInclusive;

use crate::{
    config::{DebuggerConfig, Rgb},
    target::{BreakpointRegistry, DebugTarget, Disassembler},
};

pub mod breakpoint_list;
pub mod code;
pub mod registers;
pub mod stack;

pub use breakpoint_list::BreakpointListModel;
pub use code::CodeModel;
pub use registers::RegistersModel;
pub use stack::StackModel;

/// Everything a model needs to render a cell.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub target: &'a dyn DebugTarget,
    pub breakpoints: &'a dyn BreakpointRegistry,
    pub disassembler: &'a dyn Disassembler,
    pub config: &'a DebuggerConfig,
}

impl<'a> ViewContext<'a> {
    /// Builds a context from a target that also owns the breakpoint registry.
    pub fn new<T>(
        target: &'a T,
        disassembler: &'a dyn Disassembler,
        config: &'a DebuggerConfig,
    ) -> Self
    where
        T: DebugTarget + BreakpointRegistry,
    {
        Self {
            target,
            breakpoints: target,
            disassembler,
            config,
        }
    }

    pub(crate) fn invalid(&self) -> String {
        self.config.invalid_placeholder.clone()
    }
}

/// Colours a row should be painted with; `None` means the host default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowStyle {
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
}

/// Identifies a view in change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Code,
    Registers,
    Stack,
    Breakpoints,
    Memory,
}

/// What a host must repaint after a model changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Invalidation {
    #[default]
    None,
    /// Geometry changed; every row must be re-queried.
    Reset,
    /// Only these inclusive row ranges changed.
    Rows(Vec<RangeInclusive<usize>>),
}

impl Invalidation {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }

    /// Row ranges touched, empty unless this is [`Invalidation::Rows`].
    pub fn rows(&self) -> &[RangeInclusive<usize>] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Interface the presentation layer binds to.
pub trait TableModel {
    fn row_count(&self, ctx: &ViewContext<'_>) -> usize;

    fn column_count(&self) -> usize;

    fn header_label(&self, column: usize) -> Option<&'static str>;

    /// Display text of a cell, re-read from the target.
    /// `None` when the row or column is out of range.
    fn cell_value(&self, ctx: &ViewContext<'_>, row: usize, column: usize) -> Option<String>;

    fn row_style(&self, _ctx: &ViewContext<'_>, _row: usize) -> RowStyle {
        RowStyle::default()
    }
}

pub(crate) fn hex_word(value: u32) -> String {
    format!("0x{value:08X}")
}
