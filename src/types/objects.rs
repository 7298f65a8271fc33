//! Page objects produced by the record decoders
//!
//! Every decoded page element is one of the [`Object`] variants. Z order is
//! not stored here; it is assigned when a page is composed.

use std::rc::Rc;

use super::color::Fill;
use super::geometry::{Point, Rect};
use super::style::{Frame, VerticalAlignment};
use super::text::Text;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Geometry of one side of a page
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageSettings {
    pub offset: Rect,
}

/// A decoded page header; two settings for a facing spread.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub settings: Vec<PageSettings>,
    pub objects_count: u32,
}

impl Page {
    pub fn is_facing(&self) -> bool {
        self.settings.len() == 2
    }
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoxType {
    #[default]
    Rectangle,
    Oval,
    Polygon,
    Bezier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CornerType {
    #[default]
    Default,
    Rounded,
    Beveled,
    Concave,
}

/// One closed or open sub-path of a bezier shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveComponent {
    pub bbox: Rect,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub bbox: Rect,
    pub runaround: bool,
    pub rotation: f64,
    pub style: Frame,
    pub curve_components: Vec<CurveComponent>,
}

/// Placement of an image inside a picture box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PictureSettings {
    pub rotation: f64,
    pub skew: f64,
    pub offset_top: f64,
    pub offset_left: f64,
    pub scale_horizontal: f64,
    pub scale_vertical: f64,
}

impl Default for PictureSettings {
    fn default() -> Self {
        PictureSettings {
            rotation: 0.0,
            skew: 0.0,
            offset_top: 0.0,
            offset_left: 0.0,
            scale_horizontal: 1.0,
            scale_vertical: 1.0,
        }
    }
}

/// Empty and picture boxes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeBox {
    pub bbox: Rect,
    pub runaround: bool,
    pub rotation: f64,
    pub frame: Frame,
    pub fill: Option<Fill>,
    pub box_type: BoxType,
    pub corner_type: CornerType,
    pub corner_radius: f64,
    /// Vertices of a polygon box
    pub custom_points: Vec<Point>,
    pub curve_components: Vec<CurveComponent>,
    pub picture: Option<PictureSettings>,
}

// ---------------------------------------------------------------------------
// Text objects
// ---------------------------------------------------------------------------

/// Position of a text object inside its link chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkedTextSettings {
    pub link_id: u32,
    pub offset_into_text: u32,
    /// Position in the chain, 0 for the chain head
    pub linked_index: u32,
    /// Position of the next box, 0 if this one is last
    pub next_linked_index: u32,
    /// Known once the next box has been seen
    pub text_length: Option<u32>,
}

impl LinkedTextSettings {
    pub fn is_linked(&self) -> bool {
        self.linked_index > 0 || self.next_linked_index > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSettings {
    pub columns_count: u32,
    pub gutter_width: f64,
    pub inset: Rect,
    pub rotation: f64,
    pub skew: f64,
    pub vertical_alignment: VerticalAlignment,
}

impl Default for TextSettings {
    fn default() -> Self {
        TextSettings {
            columns_count: 1,
            gutter_width: 12.0,
            inset: Rect::default(),
            rotation: 0.0,
            skew: 0.0,
            vertical_alignment: VerticalAlignment::Top,
        }
    }
}

/// Which part of the glyphs sits on a text path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextPathAlignment {
    Ascent,
    Center,
    #[default]
    Baseline,
    Descent,
}

impl TextPathAlignment {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TextPathAlignment::Ascent),
            1 => Some(TextPathAlignment::Center),
            2 => Some(TextPathAlignment::Baseline),
            3 => Some(TextPathAlignment::Descent),
            _ => None,
        }
    }
}

/// Which edge of the stroke the text is aligned against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextPathLineAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

impl TextPathLineAlignment {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TextPathLineAlignment::Top),
            1 => Some(TextPathLineAlignment::Center),
            2 => Some(TextPathLineAlignment::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextPathSettings {
    pub skew_characters: bool,
    pub rotate_characters: bool,
    pub alignment: TextPathAlignment,
    pub line_alignment: TextPathLineAlignment,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBox {
    pub shape: ShapeBox,
    pub link: LinkedTextSettings,
    pub text: Option<Rc<Text>>,
    pub settings: TextSettings,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextPath {
    pub line: Line,
    pub link: LinkedTextSettings,
    pub text: Option<Rc<Text>>,
    pub settings: TextPathSettings,
}

/// Sibling indices within the same page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub bbox: Rect,
    pub elements: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Line(Line),
    Box(ShapeBox),
    TextBox(TextBox),
    TextPath(TextPath),
    Group(Group),
}

impl Object {
    pub fn bbox(&self) -> &Rect {
        match self {
            Object::Line(line) => &line.bbox,
            Object::Box(shape) => &shape.bbox,
            Object::TextBox(text_box) => &text_box.shape.bbox,
            Object::TextPath(path) => &path.line.bbox,
            Object::Group(group) => &group.bbox,
        }
    }

    /// Link settings of text-bearing objects.
    pub fn link(&self) -> Option<&LinkedTextSettings> {
        match self {
            Object::TextBox(text_box) => Some(&text_box.link),
            Object::TextPath(path) => Some(&path.link),
            _ => None,
        }
    }

    pub fn link_mut(&mut self) -> Option<&mut LinkedTextSettings> {
        match self {
            Object::TextBox(text_box) => Some(&mut text_box.link),
            Object::TextPath(path) => Some(&mut path.link),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&Rc<Text>> {
        match self {
            Object::TextBox(text_box) => text_box.text.as_ref(),
            Object::TextPath(path) => path.text.as_ref(),
            _ => None,
        }
    }

    /// Attach `text` to a text-bearing object; no-op for other kinds.
    pub fn set_text(&mut self, text: Rc<Text>) {
        match self {
            Object::TextBox(text_box) => text_box.text = Some(text),
            Object::TextPath(path) => path.text = Some(text),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::qxp::encoding::TextEncoding;

    #[test]
    fn test_linked_flag() {
        let mut link = LinkedTextSettings::default();
        assert!(!link.is_linked());
        link.next_linked_index = 4;
        assert!(link.is_linked());
    }

    #[test]
    fn test_set_text_only_on_text_objects() {
        let text = Rc::new(Text::new(TextEncoding::MacRoman));
        let mut group = Object::Group(Group::default());
        group.set_text(text.clone());
        assert!(group.text().is_none());

        let mut text_box = Object::TextBox(TextBox::default());
        text_box.set_text(text);
        assert!(text_box.text().is_some());
    }

    #[test]
    fn test_bbox_of_text_path_is_line_bbox() {
        let mut path = TextPath::default();
        path.line.bbox = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(*Object::TextPath(path).bbox(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_path_alignment_codes() {
        assert_eq!(TextPathAlignment::from_code(3), Some(TextPathAlignment::Descent));
        assert_eq!(TextPathLineAlignment::from_code(3), None);
        assert_eq!(TextPathAlignment::default(), TextPathAlignment::Baseline);
    }
}
