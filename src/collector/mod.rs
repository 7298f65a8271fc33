//! Content resolution between the record decoders and the output sink
//!
//! Decoders push pages, objects and story texts into a [`Collector`] in
//! file order. [`ContentCollector`] buffers them until every linked text
//! object on the buffered pages can be resolved, then composes the pages
//! onto a [`DocumentSink`].

mod content_collector;
pub mod sink;

use std::rc::Rc;

use crate::document::{DocumentProperties, StyleTables};
use crate::types::{Group, Line, Page, ShapeBox, Text, TextBox, TextPath};

pub use content_collector::ContentCollector;
pub use sink::{
    Border, BorderStyle, Dash, DashUnit, DocumentSink, Ellipse, GraphicFill, GraphicStyle,
    Hyphenation, Marker, NullSink, Padding, ParagraphProps, PathCommand, SpanProps, Stroke,
    StrokeCap, TabAlign, TabProps, TextAlign, TextAreaAlign, TextObjectProps, TextPosition,
    UnderlineMode,
};

/// Receiver of decoded document content.
pub trait Collector {
    fn start_document(&mut self) {}
    fn end_document(&mut self) {}

    fn collect_document_properties(&mut self, _properties: &DocumentProperties) {}
    /// Tables decoded by the global pass; text spans and frames index into them.
    fn collect_style_tables(&mut self, _tables: Rc<StyleTables>) {}

    fn start_page(&mut self, _page: &Page) {}
    fn end_page(&mut self) {}

    fn collect_line(&mut self, _line: Line) {}
    fn collect_box(&mut self, _shape: ShapeBox) {}
    fn collect_text_box(&mut self, _text_box: TextBox) {}
    fn collect_text_path(&mut self, _text_path: TextPath) {}
    fn collect_group(&mut self, _group: Group) {}

    /// Story text shared by every object with `link_id`.
    fn collect_text(&mut self, _text: Rc<Text>, _link_id: u32) {}
}

/// Swallows everything; master pages are decoded into it so the cipher
/// state advances without producing output.
#[derive(Debug, Default)]
pub struct DummyCollector;

impl Collector for DummyCollector {}
