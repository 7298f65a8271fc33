//! Shared test utilities for qxprust integration tests.
//!
//! A recording [`DocumentSink`] that keeps every composer call, plus the
//! byte-level document builders in [`builders`]. All test crates import them
//! via `mod common;`.

#![allow(dead_code)]

pub mod builders;

use qxprust::collector::{
    DocumentSink, Ellipse, GraphicStyle, ParagraphProps, PathCommand, SpanProps, TextObjectProps,
};
use qxprust::{ParseReport, ParseStatus, Point, QxpReader, QxpReaderConfiguration, Result};
use std::io::Cursor;

// ===========================================================================
// Recording sink
// ===========================================================================

/// One call received by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StartDocument,
    EndDocument,
    StartPage(f64, f64),
    EndPage,
    OpenGroup(i32),
    CloseGroup,
    Path(Vec<PathCommand>, GraphicStyle, i32),
    Ellipse(Ellipse, GraphicStyle, i32),
    StartText(TextObjectProps),
    EndText,
    OpenParagraph,
    CloseParagraph,
    OpenSpan,
    CloseSpan,
    Text(String),
    LineBreak,
    Tab,
    Space,
}

/// Sink that records calls in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<Call>,
}

impl DocumentSink for RecordingSink {
    fn start_document(&mut self) {
        self.calls.push(Call::StartDocument);
    }
    fn end_document(&mut self) {
        self.calls.push(Call::EndDocument);
    }
    fn start_page(&mut self, width: f64, height: f64) {
        self.calls.push(Call::StartPage(width, height));
    }
    fn end_page(&mut self) {
        self.calls.push(Call::EndPage);
    }
    fn open_group(&mut self, z: i32) {
        self.calls.push(Call::OpenGroup(z));
    }
    fn close_group(&mut self) {
        self.calls.push(Call::CloseGroup);
    }
    fn draw_path(&mut self, path: &[PathCommand], style: &GraphicStyle, z: i32) {
        self.calls.push(Call::Path(path.to_vec(), style.clone(), z));
    }
    fn draw_ellipse(&mut self, ellipse: &Ellipse, style: &GraphicStyle, z: i32) {
        self.calls.push(Call::Ellipse(*ellipse, style.clone(), z));
    }
    fn start_text_object(&mut self, props: &TextObjectProps) {
        self.calls.push(Call::StartText(*props));
    }
    fn end_text_object(&mut self) {
        self.calls.push(Call::EndText);
    }
    fn open_paragraph(&mut self, _props: &ParagraphProps) {
        self.calls.push(Call::OpenParagraph);
    }
    fn close_paragraph(&mut self) {
        self.calls.push(Call::CloseParagraph);
    }
    fn open_span(&mut self, _props: &SpanProps) {
        self.calls.push(Call::OpenSpan);
    }
    fn close_span(&mut self) {
        self.calls.push(Call::CloseSpan);
    }
    fn insert_text(&mut self, text: &str) {
        self.calls.push(Call::Text(text.to_string()));
    }
    fn insert_line_break(&mut self) {
        self.calls.push(Call::LineBreak);
    }
    fn insert_tab(&mut self) {
        self.calls.push(Call::Tab);
    }
    fn insert_space(&mut self) {
        self.calls.push(Call::Space);
    }
}

impl RecordingSink {
    /// Page sizes in drawing order.
    pub fn pages(&self) -> Vec<(f64, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::StartPage(w, h) => Some((*w, *h)),
                _ => None,
            })
            .collect()
    }

    pub fn paths(&self) -> Vec<(Vec<PathCommand>, GraphicStyle)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Path(path, style, _) => Some((path.clone(), style.clone())),
                _ => None,
            })
            .collect()
    }

    /// Inserted text, one entry per text object.
    pub fn text_objects(&self) -> Vec<String> {
        let mut objects = Vec::new();
        let mut current: Option<String> = None;
        for call in &self.calls {
            match call {
                Call::StartText(_) => current = Some(String::new()),
                Call::EndText => objects.extend(current.take()),
                Call::Text(t) => {
                    if let Some(current) = current.as_mut() {
                        current.push_str(t);
                    }
                }
                _ => {}
            }
        }
        objects
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

// ===========================================================================
// Read helpers
// ===========================================================================

/// Decode `data` in failsafe mode.
pub fn read(data: Vec<u8>) -> (Result<ParseReport>, RecordingSink) {
    read_with(data, QxpReaderConfiguration::default())
}

pub fn read_strict(data: Vec<u8>) -> (Result<ParseReport>, RecordingSink) {
    read_with(data, QxpReaderConfiguration { failsafe: false })
}

pub fn read_with(
    data: Vec<u8>,
    config: QxpReaderConfiguration,
) -> (Result<ParseReport>, RecordingSink) {
    let mut sink = RecordingSink::default();
    let result = QxpReader::from_bytes(data).with_config(config).parse(&mut sink);
    (result, sink)
}

/// Decode through the top-level status API.
pub fn parse_status(data: Vec<u8>) -> (ParseStatus, RecordingSink) {
    let mut sink = RecordingSink::default();
    let status = qxprust::parse(&mut Cursor::new(data), &mut sink);
    (status, sink)
}

/// Closed four-corner path of an unrotated rectangle in page coordinates.
pub fn rect_path(top: f64, left: f64, bottom: f64, right: f64) -> Vec<PathCommand> {
    vec![
        PathCommand::MoveTo(Point::new(left, top)),
        PathCommand::LineTo(Point::new(right, top)),
        PathCommand::LineTo(Point::new(right, bottom)),
        PathCommand::LineTo(Point::new(left, bottom)),
        PathCommand::Close,
    ]
}
