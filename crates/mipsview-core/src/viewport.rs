//! Virtualized hex/ASCII view over a memory bank.
//!
//! The viewport never owns or retains the bank: the host passes the live
//! slice to [`MemoryViewport::rows`] / [`MemoryViewport::draw`] on every paint
//! and only the visible window is touched.

use core::{fmt, ops::Range};

use tracing::trace;

use crate::{
    config::{FontMetrics, MemoryViewConfig, PrintableRange},
    memory_map::MemoryRegion,
};

/// Bytes shown per row.
pub const BYTES_PER_LINE: usize = 16;

/// Which bank the viewport shows and where it sits on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBinding {
    /// Address printed for offset 0.
    pub address_offset: u32,
    pub region: MemoryRegion,
    /// Bytes of the bank that may be displayed.
    pub size: usize,
}

impl DataBinding {
    /// Binds the whole bank at its physical base.
    pub fn for_region(region: MemoryRegion) -> Self {
        Self {
            address_offset: region.base(),
            region,
            size: region.size() as usize,
        }
    }
}

/// One visible row of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexRow<'a> {
    /// Absolute address of the first byte.
    pub address: u32,
    /// Offset of the first byte inside the bank.
    pub offset: usize,
    /// Up to [`BYTES_PER_LINE`] bytes; shorter on the last row of the bank.
    pub bytes: &'a [u8],
}

impl HexRow<'_> {
    pub fn hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn ascii(&self, printable: PrintableRange) -> String {
        self.bytes
            .iter()
            .map(|&b| printable.display_char(b))
            .collect()
    }
}

/// Paint role of a filled rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Base,
    /// Stripe behind every other hex column.
    AlternateBase,
}

/// Drawing backend for [`MemoryViewport::draw`].
///
/// Coordinates are in pixels relative to the viewport's top-left corner.
/// `text` positions are baselines, so a string drawn at `y = char_height`
/// occupies the first line.
pub trait Surface {
    fn text(&mut self, x: i32, y: i32, text: &str);

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, fill: Fill);
}

#[derive(Debug, Clone)]
pub struct MemoryViewport {
    binding: Option<DataBinding>,
    scroll_row: usize,
    horizontal_scroll: u32,
    width: u32,
    height: u32,
    font: FontMetrics,
    address_blocks: u32,
    printable: PrintableRange,

    visible_rows: usize,
    window: Range<usize>,
    max_scroll_row: usize,
    max_horizontal_scroll: u32,
}

impl MemoryViewport {
    pub fn new(config: &MemoryViewConfig) -> Self {
        Self {
            binding: None,
            scroll_row: 0,
            horizontal_scroll: 0,
            width: 0,
            height: 0,
            font: config.font,
            address_blocks: config.address_blocks,
            printable: config.printable,
            visible_rows: 0,
            window: 0..0,
            max_scroll_row: 0,
            max_horizontal_scroll: 0,
        }
    }

    /// Rebinds the viewport. Scroll state is reset; `None` or an empty bank
    /// disables it.
    pub fn set_data(&mut self, binding: Option<DataBinding>) {
        self.binding = binding.filter(|b| b.size > 0);
        self.scroll_row = 0;
        self.horizontal_scroll = 0;
        self.recompute_window();
    }

    pub fn binding(&self) -> Option<DataBinding> {
        self.binding
    }

    pub fn is_enabled(&self) -> bool {
        self.binding.is_some()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.recompute_window();
    }

    pub fn set_font(&mut self, font: FontMetrics) {
        self.font = font;
        self.recompute_window();
    }

    pub fn font(&self) -> FontMetrics {
        self.font
    }

    pub fn set_scroll_row(&mut self, row: usize) {
        self.scroll_row = row;
        self.recompute_window();
    }

    pub fn set_horizontal_scroll(&mut self, value: u32) {
        self.horizontal_scroll = value;
        self.recompute_window();
    }

    /// Scrolls so the row holding bank offset `offset` is first.
    pub fn scroll_to_address(&mut self, offset: usize) {
        self.scroll_row = offset / BYTES_PER_LINE;
        self.horizontal_scroll = 0;
        self.recompute_window();
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn horizontal_scroll(&self) -> u32 {
        self.horizontal_scroll
    }

    pub fn max_scroll_row(&self) -> usize {
        self.max_scroll_row
    }

    pub fn max_horizontal_scroll(&self) -> u32 {
        self.max_horizontal_scroll
    }

    pub fn visible_row_count(&self) -> usize {
        self.visible_rows
    }

    /// First bank offset in the window.
    pub fn start_offset(&self) -> usize {
        self.window.start
    }

    /// Last bank offset in the window, `None` when nothing is visible.
    pub fn end_offset(&self) -> Option<usize> {
        self.window.end.checked_sub(1).filter(|_| !self.window.is_empty())
    }

    /// Visible bank offsets as a half-open range.
    pub fn window(&self) -> Range<usize> {
        self.window.clone()
    }

    pub fn address_width(&self) -> u32 {
        (self.address_blocks * 4 + self.address_blocks.saturating_sub(1)) * self.font.char_width
    }

    pub fn hex_width(&self) -> u32 {
        (BYTES_PER_LINE as u32 * 4 + 1) * self.font.char_width
    }

    pub fn ascii_width(&self) -> u32 {
        (BYTES_PER_LINE as u32 * 2 + 1) * self.font.char_width
    }

    /// Full width of the address, hex and ASCII columns.
    pub fn content_width(&self) -> u32 {
        self.address_width() + self.hex_width() + self.ascii_width()
    }

    pub fn recompute_window(&mut self) {
        let Some(binding) = self.binding else {
            self.visible_rows = 0;
            self.window = 0..0;
            self.max_scroll_row = 0;
            self.max_horizontal_scroll = 0;
            self.scroll_row = 0;
            self.horizontal_scroll = 0;
            return;
        };

        self.max_horizontal_scroll = self.content_width().saturating_sub(self.width);
        self.horizontal_scroll = self.horizontal_scroll.min(self.max_horizontal_scroll);

        self.visible_rows = (self.height / self.font.char_height.max(1)) as usize;
        let total_lines = binding.size.div_ceil(BYTES_PER_LINE);
        self.max_scroll_row = total_lines.saturating_sub(self.visible_rows);
        self.scroll_row = self.scroll_row.min(self.max_scroll_row);

        let start = self.scroll_row * BYTES_PER_LINE;
        let end = (start + self.visible_rows * BYTES_PER_LINE).min(binding.size);
        self.window = start..end.max(start);
    }

    /// Rows of the current window over `data`, the live bank slice.
    pub fn rows<'a>(&self, data: &'a [u8]) -> impl Iterator<Item = HexRow<'a>> + 'a {
        let address_offset = self.binding.map_or(0, |b| b.address_offset);
        let limit = self.binding.map_or(0, |b| b.size).min(data.len());
        let start = self.window.start.min(limit);
        let end = self.window.end.min(limit);
        data[start..end]
            .chunks(BYTES_PER_LINE)
            .enumerate()
            .map(move |(index, bytes)| {
                let offset = start + index * BYTES_PER_LINE;
                HexRow {
                    address: address_offset.wrapping_add(offset as u32),
                    offset,
                    bytes,
                }
            })
    }

    /// Paints the visible window onto `surface`.
    pub fn draw(&self, data: &[u8], surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        trace!(
            "memory view window 0x{:X}..0x{:X}",
            self.window.start, self.window.end
        );

        let cw = self.font.char_width as i32;
        let ch = self.font.char_height as i32;
        let width = self.width as i32;
        let height = self.height as i32;
        let off_x = self.horizontal_scroll as i32;
        let rows: Vec<_> = self.rows(data).collect();

        surface.fill_rect(0, 0, width, height, Fill::Base);

        let mut y = 2 * ch;
        for row in &rows {
            surface.text(cw / 2 - off_x, y, &format!("{:08X}", row.address));
            y += ch;
        }

        let mut lx = self.address_width() as i32 + cw;
        surface.line(lx - off_x, 0, lx - off_x, height);
        lx += cw / 2;

        let mut x = lx - off_x + 4 * cw;
        for _ in 0..BYTES_PER_LINE / 2 {
            surface.fill_rect(x - cw / 4, 0, 3 * cw, height, Fill::AlternateBase);
            x += 8 * cw;
        }

        y = ch;
        x = lx - off_x;
        for column in 0..BYTES_PER_LINE {
            surface.text(x, y, &format!("{column:02X}"));
            x += 4 * cw;
        }
        surface.line(0, y + 3, width, y + 4);

        y += ch;
        for row in &rows {
            x = lx - off_x;
            for byte in row.bytes {
                surface.text(x, y, &format!("{byte:02X}"));
                x += 4 * cw;
            }
            y += ch;
        }

        lx = (self.address_width() + self.hex_width()) as i32;
        surface.line(lx - off_x, 0, lx - off_x, height);
        lx += cw / 2;

        y = ch;
        x = lx - off_x;
        for column in 0..BYTES_PER_LINE {
            surface.text(x, y, &format!("{column:X}"));
            x += 2 * cw;
        }

        y += ch;
        let mut buf = [0u8; 4];
        for row in &rows {
            x = lx - off_x;
            for &byte in row.bytes {
                let glyph = self.printable.display_char(byte).encode_utf8(&mut buf);
                surface.text(x, y, glyph);
                x += 2 * cw;
            }
            y += ch;
        }
    }
}

impl Default for MemoryViewport {
    fn default() -> Self {
        Self::new(&MemoryViewConfig::default())
    }
}

/// [`Surface`] that rasterizes into a grid of characters.
///
/// Pixel positions are rounded to the nearest character cell. Fills are
/// ignored; vertical lines become `|` and horizontal lines are dropped.
#[derive(Debug, Clone)]
pub struct TextSurface {
    font: FontMetrics,
    columns: usize,
    cells: Vec<Vec<char>>,
}

impl TextSurface {
    pub fn new(columns: usize, lines: usize, font: FontMetrics) -> Self {
        Self {
            font,
            columns,
            cells: vec![vec![' '; columns]; lines],
        }
    }

    /// A grid large enough for the header and every visible row of `viewport`.
    pub fn for_viewport(viewport: &MemoryViewport) -> Self {
        let font = viewport.font();
        let columns = viewport
            .content_width()
            .div_ceil(font.char_width.max(1)) as usize
            + 1;
        Self::new(columns, viewport.visible_row_count() + 1, font)
    }

    fn column_at(&self, x: i32) -> i32 {
        let cw = self.font.char_width.max(1) as i32;
        (x + cw / 2).div_euclid(cw)
    }

    fn line_at(&self, baseline: i32) -> i32 {
        baseline.div_euclid(self.font.char_height.max(1) as i32) - 1
    }

    fn put(&mut self, column: i32, line: i32, value: char) {
        if column < 0 || line < 0 {
            return;
        }
        if let Some(cell) = self
            .cells
            .get_mut(line as usize)
            .and_then(|row| row.get_mut(column as usize))
        {
            *cell = value;
        }
    }

    /// Grid contents with trailing blanks removed.
    pub fn lines(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl Surface for TextSurface {
    fn text(&mut self, x: i32, y: i32, text: &str) {
        let column = self.column_at(x);
        let line = self.line_at(y);
        for (index, value) in text.chars().enumerate() {
            self.put(column + index as i32, line, value);
        }
    }

    fn line(&mut self, x0: i32, _y0: i32, x1: i32, _y1: i32) {
        if x0 != x1 {
            return;
        }
        let column = self.column_at(x0);
        for line in 0..self.cells.len() {
            self.put(column, line as i32, '|');
        }
    }

    fn fill_rect(&mut self, _x: i32, _y: i32, _width: i32, _height: i32, _fill: Fill) {}
}

impl fmt::Display for TextSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
