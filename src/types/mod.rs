//! Value types shared by the decoders and the collector

pub mod color;
pub mod geometry;
pub mod objects;
pub mod style;
pub mod text;
pub mod version;

pub use color::{Color, Fill, Gradient, GradientType};
pub use geometry::{Point, Rect};
pub use objects::{
    BoxType, CornerType, CurveComponent, Group, Line, LinkedTextSettings, Object, Page,
    PageSettings, PictureSettings, ShapeBox, TextBox, TextPath, TextPathAlignment,
    TextPathLineAlignment, TextPathSettings, TextSettings,
};
pub use style::{
    Arrow, CharFlags, CharFormat, Frame, HjRule, HorizontalAlignment, LineCap, LineJoin,
    LineStyle, ParagraphFormat, ParagraphRule, TabStop, TabStopType, VerticalAlignment,
};
pub use text::{CharFormatSpec, ParagraphSpec, Text, TextSpec};
pub use version::QxpVersion;
