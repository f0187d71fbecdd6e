use crate::{
    address::VirtualAddress,
    models::{Invalidation, TableModel, ViewContext, hex_word},
};

const HEADERS: [&str; 2] = ["Address", "Value"];

/// Size of one stack slot.
pub const STACK_VALUE_SIZE: u32 = 4;

/// Fixed window of `range` slots below and `range` slots above the live
/// stack pointer.
#[derive(Debug, Clone)]
pub struct StackModel {
    range: u32,
}

impl StackModel {
    pub fn new(range: u32) -> Self {
        Self { range }
    }

    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn len(&self) -> usize {
        self.range as usize * 2
    }

    pub fn is_empty(&self) -> bool {
        self.range == 0
    }

    fn base(&self, sp: VirtualAddress) -> VirtualAddress {
        sp.wrapping_sub(self.range.wrapping_mul(STACK_VALUE_SIZE))
    }

    pub fn address_for_row(&self, sp: VirtualAddress, row: usize) -> VirtualAddress {
        self.base(sp)
            .wrapping_add((row as u32).wrapping_mul(STACK_VALUE_SIZE))
    }

    pub fn row_for_address(&self, sp: VirtualAddress, address: VirtualAddress) -> Option<usize> {
        let row = (address.wrapping_sub(self.base(sp)) / STACK_VALUE_SIZE) as usize;
        (row < self.len()).then_some(row)
    }

    /// Row holding the slot the stack pointer addresses.
    pub fn sp_row(&self) -> usize {
        self.range as usize
    }

    pub fn invalidate(&self) -> Invalidation {
        Invalidation::Reset
    }
}

impl Default for StackModel {
    fn default() -> Self {
        Self::new(128)
    }
}

impl TableModel for StackModel {
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
        let address = self.address_for_row(ctx.target.stack_pointer(), row);
        match column {
            0 => Some(hex_word(address)),
            1 => Some(
                ctx.target
                    .safe_read_word(address)
                    .map_or_else(|| ctx.invalid(), hex_word),
            ),
            _ => None,
        }
    }
}
