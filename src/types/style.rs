//! Stroke, character and paragraph styling records.
//!
//! Records that other records point at (line styles, HJ rules) are referenced
//! by key into [`StyleTables`](crate::document::StyleTables) rather than
//! embedded, so a paragraph format stays a plain value.

use bitflags::bitflags;

use super::color::Color;
use super::geometry::Rect;

// ---------------------------------------------------------------------------
// Strokes
// ---------------------------------------------------------------------------

/// Line end cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Rect,
    Stretch,
}

impl LineCap {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(LineCap::Butt),
            1 => Some(LineCap::Round),
            2 => Some(LineCap::Rect),
            3 => Some(LineCap::Stretch),
            _ => None,
        }
    }
}

/// Line join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(LineJoin::Miter),
            1 => Some(LineJoin::Round),
            2 => Some(LineJoin::Bevel),
            _ => None,
        }
    }
}

/// A dash or stripe pattern
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// Alternating dash/gap lengths; proportional to `pattern_length` when
    /// `is_proportional` is set, absolute points otherwise.
    pub segment_lengths: Vec<f64>,
    pub is_stripe: bool,
    pub is_proportional: bool,
    pub pattern_length: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            segment_lengths: Vec::new(),
            is_stripe: false,
            is_proportional: true,
            pattern_length: 6.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }
}

impl LineStyle {
    pub fn new(
        segment_lengths: Vec<f64>,
        is_proportional: bool,
        pattern_length: f64,
        cap: LineCap,
        join: LineJoin,
    ) -> Self {
        LineStyle {
            segment_lengths,
            is_stripe: false,
            is_proportional,
            pattern_length,
            cap,
            join,
        }
    }
}

/// Arrowhead markers available on lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arrow {
    /// Plain triangular head
    Head,
    /// Feathered tail
    Tail,
}

impl Arrow {
    /// SVG path data of the marker.
    pub fn path(&self) -> &'static str {
        match self {
            Arrow::Head => "m9 0 l-9 25 l6 -1.5 l6 0 l6 1.5 z",
            Arrow::Tail => "m9 5 l-9 -5 l0 20 l6 10 l6 0 l6 -10 l0 -20 z",
        }
    }

    pub fn viewbox(&self) -> &'static str {
        match self {
            Arrow::Head => "0 0 18 25",
            Arrow::Tail => "0 0 18 35",
        }
    }

    /// Marker width as a multiple of the stroke width.
    pub fn scale(&self) -> f64 {
        match self {
            Arrow::Head => 3.0,
            Arrow::Tail => 2.5,
        }
    }
}

/// Stroke of a line or border of a box
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub color: Option<Color>,
    pub gap_color: Option<Color>,
    /// Key into the line style table
    pub line_style: Option<u32>,
    pub start_arrow: Option<Arrow>,
    pub end_arrow: Option<Arrow>,
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            width: 1.0,
            color: None,
            gap_color: None,
            line_style: None,
            start_arrow: None,
            end_arrow: None,
        }
    }
}

impl Frame {
    /// Apply an arrow selector code (`1..=5`); other codes leave the frame
    /// without arrows.
    pub fn set_arrows(&mut self, code: u32) {
        let (start, end) = match code {
            1 => (None, Some(Arrow::Head)),
            2 => (Some(Arrow::Head), None),
            3 => (Some(Arrow::Tail), Some(Arrow::Head)),
            4 => (Some(Arrow::Head), Some(Arrow::Tail)),
            5 => (Some(Arrow::Head), Some(Arrow::Head)),
            _ => return,
        };
        self.start_arrow = start;
        self.end_arrow = end;
    }
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// Hyphenation and justification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HjRule {
    pub hyphenate: bool,
    pub min_before: u32,
    pub min_after: u32,
    /// Maximum consecutive hyphenated lines, 0 for unlimited
    pub max_in_row: u32,
    pub single_word_justify: bool,
}

impl Default for HjRule {
    fn default() -> Self {
        HjRule {
            hyphenate: true,
            min_before: 3,
            min_after: 2,
            max_in_row: 0,
            single_word_justify: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justified,
    Forced,
}

impl HorizontalAlignment {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(HorizontalAlignment::Left),
            1 => Some(HorizontalAlignment::Center),
            2 => Some(HorizontalAlignment::Right),
            3 => Some(HorizontalAlignment::Justified),
            4 => Some(HorizontalAlignment::Forced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
    Justified,
}

impl VerticalAlignment {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(VerticalAlignment::Top),
            1 => Some(VerticalAlignment::Center),
            2 => Some(VerticalAlignment::Bottom),
            3 => Some(VerticalAlignment::Justified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TabStopType {
    #[default]
    Left,
    Center,
    Right,
    Align,
}

impl TabStopType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TabStopType::Left),
            1 => Some(TabStopType::Center),
            2 => Some(TabStopType::Right),
            3 => Some(TabStopType::Align),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TabStop {
    pub tab_type: TabStopType,
    pub position: f64,
    pub fill_char: Option<char>,
    pub align_char: Option<char>,
}

impl TabStop {
    /// Unused tab slots carry a negative position.
    pub fn is_defined(&self) -> bool {
        self.position >= 0.0
    }
}

/// Rule drawn above or below a paragraph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphRule {
    pub width: f64,
    pub color: Color,
    /// Key into the line style table
    pub line_style: Option<u32>,
    pub left_margin: f64,
    pub right_margin: f64,
    pub offset: f64,
}

impl Default for ParagraphRule {
    fn default() -> Self {
        ParagraphRule {
            width: 1.0,
            color: Color::BLACK,
            line_style: None,
            left_margin: 0.0,
            right_margin: 0.0,
            offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphFormat {
    pub alignment: HorizontalAlignment,
    pub margin: Rect,
    pub first_line_indent: f64,
    pub leading: f64,
    pub incremental_leading: bool,
    pub rule_above: Option<ParagraphRule>,
    pub rule_below: Option<ParagraphRule>,
    pub tab_stops: Vec<TabStop>,
    /// Index into the HJ rule table
    pub hj: Option<usize>,
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

bitflags! {
    /// Character style flags as stored in a character format record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CharFlags: u16 {
        const BOLD = 0x1;
        const ITALIC = 0x2;
        const UNDERLINE = 0x4;
        const OUTLINE = 0x8;
        const SHADOW = 0x10;
        const SUPERSCRIPT = 0x20;
        const SUBSCRIPT = 0x40;
        const SUPERIOR = 0x100;
        const STRIKE = 0x200;
        const ALL_CAPS = 0x400;
        const SMALL_CAPS = 0x800;
        const WORD_UNDERLINE = 0x1000;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharFormat {
    pub font_name: String,
    pub font_size: f64,
    pub baseline_shift: f64,
    pub color: Color,
    pub flags: CharFlags,
    /// Runs of this format hold layout control codes, not visible text
    pub is_control_chars: bool,
}

impl Default for CharFormat {
    fn default() -> Self {
        CharFormat {
            font_name: "Arial".to_string(),
            font_size: 12.0,
            baseline_shift: 0.0,
            color: Color::BLACK,
            flags: CharFlags::empty(),
            is_control_chars: false,
        }
    }
}

impl CharFormat {
    pub fn has(&self, flag: CharFlags) -> bool {
        self.flags.contains(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_codes() {
        let mut frame = Frame::default();
        frame.set_arrows(3);
        assert_eq!(frame.start_arrow, Some(Arrow::Tail));
        assert_eq!(frame.end_arrow, Some(Arrow::Head));

        let mut frame = Frame::default();
        frame.set_arrows(1);
        assert_eq!(frame.start_arrow, None);
        assert_eq!(frame.end_arrow, Some(Arrow::Head));

        let mut frame = Frame::default();
        frame.set_arrows(9);
        assert_eq!(frame.start_arrow, None);
        assert_eq!(frame.end_arrow, None);
    }

    #[test]
    fn test_char_flags_truncate_unknown_bits() {
        let flags = CharFlags::from_bits_truncate(0x1 | 0x40 | 0x80 | 0x1000);
        assert!(flags.contains(CharFlags::BOLD));
        assert!(flags.contains(CharFlags::SUBSCRIPT));
        assert!(flags.contains(CharFlags::WORD_UNDERLINE));
        assert!(!flags.contains(CharFlags::ITALIC));
        assert_eq!(flags.bits() & 0x80, 0);
    }

    #[test]
    fn test_defaults() {
        let hj = HjRule::default();
        assert!(hj.hyphenate);
        assert_eq!((hj.min_before, hj.min_after, hj.max_in_row), (3, 2, 0));
        let cf = CharFormat::default();
        assert_eq!(cf.font_name, "Arial");
        assert_eq!(cf.font_size, 12.0);
        assert_eq!(LineStyle::default().pattern_length, 6.0);
    }

    #[test]
    fn test_tab_stop_defined() {
        let mut tab = TabStop::default();
        assert!(tab.is_defined());
        tab.position = -1.0;
        assert!(!tab.is_defined());
    }

    #[test]
    fn test_enum_codes() {
        assert_eq!(HorizontalAlignment::from_code(4), Some(HorizontalAlignment::Forced));
        assert_eq!(VerticalAlignment::from_code(2), Some(VerticalAlignment::Bottom));
        assert_eq!(TabStopType::from_code(3), Some(TabStopType::Align));
        assert_eq!(LineCap::from_code(3), Some(LineCap::Stretch));
        assert_eq!(LineJoin::from_code(7), None);
    }
}
