//! Record decoder for 1.x documents.
//!
//! 1.x has no font or color tables, no cipher and no object groups. Pages
//! end with an explicit "last object" marker instead of an object count.
//! Story text is not decoded; text frames come out as plain boxes.

use std::rc::Rc;

use crate::collector::Collector;
use crate::error::{QxpError, Result};
use crate::notification::NotificationType;
use crate::types::{
    CharFlags, CharFormat, Color, Fill, Line, Page, PageSettings, ParagraphFormat, QxpVersion,
    Rect, ShapeBox, TabStop,
};

use super::super::block_chain::BlockChainReader;
use super::super::encoding::TextEncoding;
use super::super::file_header::{adjust_position, Qxp1Header};
use super::super::stream_reader::{ByteCursor, Endian};
use super::common::DecoderContext;

/// Font used for every 1.x character format
const FONT_NAME: &str = "Helvetica";

const TAB_STOPS_COUNT: usize = 20;

/// Shade steps of the 1.x shade menu.
fn shade(id: u8) -> f64 {
    match id {
        0..=2 => 0.1 * id as f64,
        3..=5 => 0.2 * (id - 1) as f64,
        _ => 1.0,
    }
}

/// Kinds of page objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectKind {
    Line,
    Text,
    Picture,
}

impl ObjectKind {
    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 | 1 => ObjectKind::Line,
            3 => ObjectKind::Text,
            4..=6 => ObjectKind::Picture,
            _ => return Err(QxpError::parse(format!("Unknown object type {code}"))),
        })
    }

    /// Bytes following the common object header
    fn body_length(&self) -> u64 {
        match self {
            ObjectKind::Line => 25,
            ObjectKind::Text => 40,
            ObjectKind::Picture => 54,
        }
    }
}

/// Decodes the record chain of a 1.x document.
pub struct Qxp1Decoder {
    ctx: DecoderContext,
    header: Qxp1Header,
    skipped_text: u32,
}

impl Qxp1Decoder {
    pub fn new(blocks: BlockChainReader, header: Qxp1Header, failsafe: bool) -> Self {
        Qxp1Decoder {
            ctx: DecoderContext::new(blocks, QxpVersion::Qxp1, TextEncoding::MacRoman, failsafe),
            header,
            skipped_text: 0,
        }
    }

    pub fn context(&self) -> &DecoderContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut DecoderContext {
        &mut self.ctx
    }

    pub fn decode(&mut self, collector: &mut dyn Collector) -> Result<()> {
        collector.start_document();
        let mut input = self.ctx.document_stream();
        self.parse_document(&mut input)?;
        collector.collect_style_tables(Rc::clone(&self.ctx.tables));
        self.parse_pages(&mut input, collector)?;

        if self.skipped_text > 0 {
            self.ctx.notifications.notify(
                NotificationType::NotImplemented,
                format!("Text of {} 1.x text boxes was not decoded", self.skipped_text),
            );
        }
        collector.end_document();
        Ok(())
    }

    fn parse_document(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.tables_mut().char_formats.clear();
        self.ctx.parse_collection(input, "char formats", |ctx, input| {
            let format = read_char_format(ctx, input)?;
            ctx.tables_mut().push_char_format(format);
            Ok(())
        })?;

        self.ctx.tables_mut().paragraph_formats.clear();
        self.ctx.parse_collection(input, "paragraph formats", |ctx, input| {
            let format = read_paragraph_format(ctx, input)?;
            ctx.tables_mut().push_paragraph_format(format);
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    fn parse_pages(&mut self, input: &mut ByteCursor, collector: &mut dyn Collector) -> Result<()> {
        let page = Page {
            settings: vec![PageSettings {
                offset: Rect::new(0.0, self.header.page_width, self.header.page_height, 0.0),
            }],
            objects_count: 0,
        };

        for ind in 0..self.header.pages {
            let empty = read_page_header(input)?;
            log::debug!("Page {ind}: empty = {empty}");
            collector.start_page(&page);
            if !empty {
                while !self.parse_object(input, collector)? {}
            }
            self.ctx.end_page();
            collector.end_page();
        }
        Ok(())
    }

    /// Decode one object; returns `true` after the last object of a page.
    fn parse_object(&mut self, input: &mut ByteCursor, collector: &mut dyn Collector) -> Result<bool> {
        let kind = ObjectKind::from_code(input.read_u8()?)?;
        let transparent = match input.read_u8()? {
            0 => false,
            1 => true,
            value => {
                log::debug!("Unexpected transparency value {value}");
                true
            }
        };

        let content_index = input.read_u16_as(Endian::Little)?;
        input.skip(2)?;
        let bbox = read_coordinates(input)?;

        let text_offset = input.read_u32_be()? >> 8;
        input.skip(8)?;
        let link_id = input.read_u32_be()?;
        let shade_id = input.read_u8()?;
        let color_id = input.read_u8()? as u32;
        let color = self.ctx.color(color_id).apply_shade(shade(shade_id));

        input.skip(kind.body_length())?;

        match kind {
            ObjectKind::Line => {
                let mut line = Line {
                    bbox,
                    ..Default::default()
                };
                line.style.color = Some(color);
                collector.collect_line(line);
            }
            ObjectKind::Text | ObjectKind::Picture => {
                if kind == ObjectKind::Text {
                    log::debug!(
                        "Skipping text {content_index} (link {link_id}, offset {text_offset})"
                    );
                    self.skipped_text += 1;
                }
                collector.collect_box(ShapeBox {
                    bbox,
                    fill: (!transparent).then_some(Fill::Solid(color)),
                    ..Default::default()
                });
            }
        }

        match input.read_u8()? {
            0 | 1 => Ok(false),
            2 => Ok(true),
            value => Err(QxpError::parse(format!("Unknown last object marker {value}"))),
        }
    }
}

/// Returns whether the page has no objects.
fn read_page_header(input: &mut ByteCursor) -> Result<bool> {
    input.skip(15)?;
    match input.read_u8()? {
        1 => Ok(false),
        2 => Ok(true),
        value => Err(QxpError::parse(format!("Unknown empty page marker {value}"))),
    }
}

/// Whole-point corners followed by one adjustment word per value.
fn read_coordinates(input: &mut ByteCursor) -> Result<Rect> {
    let mut values = [0.0; 4];
    for value in values.iter_mut() {
        *value = input.read_u16_be()? as f64;
    }
    for value in values.iter_mut() {
        *value = adjust_position(*value, input.read_u16_be()?);
    }
    let [y1, x1, y2, x2] = values;
    Ok(Rect::new(y1, x2, y2, x1))
}

fn read_char_format(ctx: &mut DecoderContext, input: &mut ByteCursor) -> Result<CharFormat> {
    input.skip(2)?;
    let _font_index = input.read_i16()?;
    let font_size = input.read_u16()? as f64 / 4.0;
    let flags = CharFlags::from_bits_truncate(input.read_u16()?);
    input.skip(2)?;
    let color_id = input.read_u8()? as u32;
    let shade_id = input.read_u8()?;
    let color: Color = ctx.color(color_id).apply_shade(shade(shade_id));

    Ok(CharFormat {
        font_name: FONT_NAME.to_string(),
        font_size,
        color,
        flags,
        ..Default::default()
    })
}

fn read_paragraph_format(
    ctx: &mut DecoderContext,
    input: &mut ByteCursor,
) -> Result<ParagraphFormat> {
    let mut format = ParagraphFormat::default();

    input.skip(3)?;
    format.alignment = ctx.read_hor_align(input)?;
    input.skip(2)?;
    let left = input.read_fraction()?;
    format.first_line_indent = input.read_fraction()?;
    let right = input.read_fraction()?;
    format.leading = input.read_fraction()?;
    let top = input.read_fraction()?;
    let bottom = input.read_fraction()?;
    format.margin = Rect::new(top, right, bottom, left);

    for _ in 0..TAB_STOPS_COUNT {
        let tab_type = ctx.tab_stop_type(input.read_u8()?);
        let fill_char = input.read_u8()? as char;
        let tab_stop = TabStop {
            tab_type,
            position: input.read_fraction()?,
            fill_char: Some(fill_char),
            align_char: None,
        };
        if tab_stop.is_defined() {
            format.tab_stops.push(tab_stop);
        }
    }

    Ok(format)
}
