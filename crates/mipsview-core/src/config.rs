//! Tunables for the debugger views.

/// 24-bit colour used for row highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// Highlight palette for the code and register views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewColors {
    pub pc_foreground: Rgb,
    pub pc_background: Rgb,
    pub breakpoint_background: Rgb,
    /// Register values that changed since the last resume/step.
    pub changed_foreground: Rgb,
}

impl Default for ViewColors {
    fn default() -> Self {
        Self {
            pc_foreground: Rgb::WHITE,
            pc_background: Rgb(100, 100, 0),
            breakpoint_background: Rgb(171, 97, 107),
            changed_foreground: Rgb(255, 80, 80),
        }
    }
}

/// Byte values drawn as themselves in the ASCII column; everything else
/// is drawn as `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrintableRange {
    /// `0x20..=0x7E`, the C locale's `isprint`.
    #[default]
    Ascii,
    /// Everything from `0x20` up except DEL and the C1 control block.
    Latin1,
}

impl PrintableRange {
    pub fn is_printable(self, value: u8) -> bool {
        match self {
            Self::Ascii => (0x20..=0x7E).contains(&value),
            Self::Latin1 => (0x20..=0x7E).contains(&value) || value >= 0xA0,
        }
    }

    pub fn display_char(self, value: u8) -> char {
        if self.is_printable(value) {
            char::from(value)
        } else {
            '.'
        }
    }
}

/// Character cell size of the monospace font, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontMetrics {
    pub char_width: u32,
    pub char_height: u32,
}

impl FontMetrics {
    /// One pixel per character; handy for character-grid hosts.
    pub const CELL: FontMetrics = FontMetrics {
        char_width: 1,
        char_height: 1,
    };
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            char_width: 8,
            char_height: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryViewConfig {
    /// Number of 4-digit groups in the address column.
    pub address_blocks: u32,
    pub font: FontMetrics,
    pub printable: PrintableRange,
}

impl Default for MemoryViewConfig {
    fn default() -> Self {
        Self {
            address_blocks: 2,
            font: FontMetrics::default(),
            printable: PrintableRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebuggerConfig {
    /// Stack slots shown on each side of the stack pointer.
    pub stack_range: u32,
    /// How far step-out scans ahead for `jr $ra`, in instructions.
    pub step_out_search_limit: u32,
    /// Text shown in cells whose backing memory cannot be read.
    pub invalid_placeholder: String,
    pub colors: ViewColors,
    pub memory: MemoryViewConfig,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            stack_range: 128,
            step_out_search_limit: 1000,
            invalid_placeholder: "<invalid>".to_string(),
            colors: ViewColors::default(),
            memory: MemoryViewConfig::default(),
        }
    }
}
