//! Document composition sink.
//!
//! The [`ContentCollector`](super::ContentCollector) drives a
//! [`DocumentSink`] with finished, ordered drawing and text calls. All
//! coordinates are in points and page-relative.

use crate::types::{Color, LineJoin, Point};

// ---------------------------------------------------------------------------
// Graphics
// ---------------------------------------------------------------------------

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo { c1: Point, c2: Point, end: Point },
    SmoothCurveTo { c1: Point, c2: Point, end: Point },
    Close,
}

impl PathCommand {
    /// SVG path action letter.
    pub fn action(&self) -> char {
        match self {
            PathCommand::MoveTo(_) => 'M',
            PathCommand::LineTo(_) => 'L',
            PathCommand::CurveTo { .. } => 'C',
            PathCommand::SmoothCurveTo { .. } => 'S',
            PathCommand::Close => 'Z',
        }
    }

    /// End point of the command, `None` for [`PathCommand::Close`].
    pub fn end_point(&self) -> Option<Point> {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::CurveTo { end, .. } | PathCommand::SmoothCurveTo { end, .. } => Some(*end),
            PathCommand::Close => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    Butt,
    Round,
    Square,
}

/// Unit of dash lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashUnit {
    /// Relative to the stroke width
    Percent,
    Point,
}

/// Two-dot dash pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub dots1_length: f64,
    pub dots2_length: f64,
    pub distance: f64,
    pub unit: DashUnit,
}

/// Arrowhead at one end of a stroke
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub viewbox: &'static str,
    pub path: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash: Option<Dash>,
    pub cap: Option<StrokeCap>,
    pub join: Option<LineJoin>,
    pub start_marker: Option<Marker>,
    pub end_marker: Option<Marker>,
}

/// Fill as seen by the sink; gradient angles are whole degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphicFill {
    Solid(Color),
    Linear {
        start: Color,
        end: Color,
        angle: i32,
    },
    Radial {
        start: Color,
        end: Color,
        cx: f64,
        cy: f64,
        border: f64,
        angle: i32,
    },
    Square {
        start: Color,
        end: Color,
        cx: f64,
        cy: f64,
        border: f64,
        angle: i32,
    },
}

/// Style of a path or ellipse; `None` stroke/fill means not painted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphicStyle {
    pub stroke: Option<Stroke>,
    pub fill: Option<GraphicFill>,
    /// Text wraps around the shape
    pub wrap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    /// Degrees, only set when non-zero
    pub rotation: Option<f64>,
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAreaAlign {
    #[default]
    Top,
    Middle,
    Bottom,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Frame a run of paragraphs is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextObjectProps {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub vertical_align: Option<TextAreaAlign>,
    pub rotation: Option<f64>,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    End,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAlign {
    Left,
    Right,
    Center,
    /// Aligned on a character
    Char(Option<char>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabProps {
    pub position: f64,
    pub leader: Option<char>,
    pub align: TabAlign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hyphenation {
    pub hyphenate: bool,
    /// `None` means no limit
    pub ladder_count: Option<u32>,
    pub justify_single_word: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Solid,
    Double,
    Dotted,
    Dashed,
}

/// Paragraph rule rendered as a border
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f64,
    pub style: BorderStyle,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphProps {
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub text_indent: f64,
    pub line_height: f64,
    pub align: TextAlign,
    pub hyphenation: Option<Hyphenation>,
    pub tab_stops: Vec<TabProps>,
    pub border_top: Option<Border>,
    pub border_bottom: Option<Border>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderlineMode {
    Continuous,
    SkipWhiteSpace,
}

/// Vertical offset and glyph scale, both as fractions of the font size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPosition {
    pub offset: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanProps {
    pub font_name: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<UnderlineMode>,
    pub strike: bool,
    pub small_caps: bool,
    pub capitalize: bool,
    pub outline: bool,
    pub shadow: bool,
    pub color: Color,
    pub position: Option<TextPosition>,
    /// Horizontal glyph scale
    pub text_scale: Option<f64>,
    pub hyphenation_remain: Option<u32>,
    pub hyphenation_push: Option<u32>,
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Receiver of composed output.
///
/// Every call defaults to a no-op so consumers only implement the calls
/// they render. Calls arrive properly nested: pages inside the document,
/// groups and text objects inside pages, spans inside paragraphs inside
/// text objects.
pub trait DocumentSink {
    fn start_document(&mut self) {}
    fn end_document(&mut self) {}

    fn start_page(&mut self, _width: f64, _height: f64) {}
    fn end_page(&mut self) {}

    fn open_group(&mut self, _z: i32) {}
    fn close_group(&mut self) {}

    fn draw_path(&mut self, _path: &[PathCommand], _style: &GraphicStyle, _z: i32) {}
    fn draw_ellipse(&mut self, _ellipse: &Ellipse, _style: &GraphicStyle, _z: i32) {}

    fn start_text_object(&mut self, _props: &TextObjectProps) {}
    fn end_text_object(&mut self) {}

    fn open_paragraph(&mut self, _props: &ParagraphProps) {}
    fn close_paragraph(&mut self) {}

    fn open_span(&mut self, _props: &SpanProps) {}
    fn close_span(&mut self) {}

    fn insert_text(&mut self, _text: &str) {}
    fn insert_line_break(&mut self) {}
    fn insert_tab(&mut self) {}
    fn insert_space(&mut self) {}
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl DocumentSink for NullSink {}
