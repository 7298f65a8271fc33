//! Record grammar shared by every version family.
//!
//! [`DecoderContext`] owns the block chain reader and the style tables of
//! one document, and implements the table and field readers whose layout is
//! identical across versions (or differs only by a width switch on the
//! version).

use std::rc::Rc;

use ahash::AHashSet;

use crate::collector::Collector;
use crate::document::{StyleTables, DEFAULT_FONT};
use crate::error::{QxpError, Result};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{
    CharFlags, CharFormat, Color, Fill, Gradient, GradientType, HjRule, HorizontalAlignment,
    LinkedTextSettings, PageSettings, ParagraphRule, Point, QxpVersion, Rect, TabStop,
    TabStopType, Text, VerticalAlignment,
};

use super::super::block_chain::BlockChainReader;
use super::super::constants::DOCUMENT_CHAIN_INDEX;
use super::super::encoding::TextEncoding;
use super::super::stream_reader::{ByteCursor, Endian};
use super::text_reader::TextReader;

/// Paragraph format flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParagraphFlags {
    pub incremental_leading: bool,
    pub rule_above: bool,
    pub rule_below: bool,
}

/// Object flag bits common to all versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectFlags {
    pub raw: u8,
    pub no_color: bool,
}

/// What an object holds, decoded from its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    None,
    /// Group
    Objects,
    Text,
    Picture,
}

/// Decoding state of one document.
pub struct DecoderContext {
    pub version: QxpVersion,
    pub encoding: TextEncoding,
    /// Recover from bounded sub-record failures instead of aborting
    pub failsafe: bool,
    pub tables: Rc<StyleTables>,
    pub notifications: NotificationCollection,
    blocks: BlockChainReader,
    /// Objects already claimed by a group on the current page
    group_objects: AHashSet<u32>,
}

impl DecoderContext {
    pub fn new(
        blocks: BlockChainReader,
        version: QxpVersion,
        encoding: TextEncoding,
        failsafe: bool,
    ) -> Self {
        DecoderContext {
            version,
            encoding,
            failsafe,
            tables: Rc::new(StyleTables::default()),
            notifications: NotificationCollection::new(),
            blocks,
            group_objects: AHashSet::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.blocks.endian()
    }

    pub fn is_big_endian(&self) -> bool {
        self.endian().is_big()
    }

    pub fn is_qxp4(&self) -> bool {
        self.version >= QxpVersion::Qxp4
    }

    /// The record chain holding the global tables followed by the pages.
    pub fn document_stream(&mut self) -> ByteCursor {
        let data = self.blocks.get_chain(DOCUMENT_CHAIN_INDEX);
        ByteCursor::new(data, self.endian()).with_encoding(self.encoding)
    }

    /// Tables are only written during the global pass, before any page has
    /// shared them with the collector.
    pub fn tables_mut(&mut self) -> &mut StyleTables {
        Rc::make_mut(&mut self.tables)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notifications.notify(NotificationType::Warning, message);
    }

    /// Forget group membership at the end of a page.
    pub fn end_page(&mut self) {
        self.group_objects.clear();
    }

    // -----------------------------------------------------------------------
    // Recovery
    // -----------------------------------------------------------------------

    /// Run `decode` over a sub-record that ends at `end` and leave `input`
    /// at `end` whatever happened.
    ///
    /// A failure is notified and yields `None` in failsafe mode, and is
    /// returned otherwise.
    pub fn recover<T>(
        &mut self,
        input: &mut ByteCursor,
        end: u64,
        what: &str,
        decode: impl FnOnce(&mut Self, &mut ByteCursor) -> Result<T>,
    ) -> Result<Option<T>> {
        let value = match decode(self, input) {
            Ok(value) => Some(value),
            Err(e) if self.failsafe => {
                self.notifications.notify(
                    NotificationType::Error,
                    format!("Failed to parse {what} at offset {}: {e}", input.position()),
                );
                None
            }
            Err(e) => return Err(e),
        };
        input.seek(end)?;
        Ok(value)
    }

    /// Read a `u32` length and return the offset the record ends at.
    pub fn read_record_end(&mut self, input: &mut ByteCursor, what: &str) -> Result<u64> {
        let length = input.read_u32()? as u64;
        if length > input.remaining() {
            return Err(QxpError::parse(format!("Invalid {what} length {length}")));
        }
        Ok(input.position() + length)
    }

    pub fn skip_record(&mut self, input: &mut ByteCursor) -> Result<()> {
        let length = input.read_u32()?;
        input.skip(length as u64)
    }

    /// Length-prefixed sequence of entries, each decoded by `item`.
    ///
    /// The first failing entry ends the collection; the stream resumes at
    /// the record end.
    pub fn parse_collection(
        &mut self,
        input: &mut ByteCursor,
        what: &str,
        mut item: impl FnMut(&mut Self, &mut ByteCursor) -> Result<()>,
    ) -> Result<()> {
        let end = self.read_record_end(input, what)?;
        self.recover(input, end, what, |ctx, input| {
            while input.position() < end {
                item(ctx, input)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Table lookups
    // -----------------------------------------------------------------------

    pub fn color(&mut self, id: u32) -> Color {
        match self.tables.color(id) {
            Some(color) => color,
            None => {
                self.warn(format!("Color {id} not found"));
                Color::BLACK
            }
        }
    }

    pub fn shaded_color(&mut self, id: u32, shade: f64) -> Color {
        self.color(id).apply_shade(shade)
    }

    pub fn font(&mut self, index: i32) -> String {
        match self.tables.font(index) {
            Some(name) => name.to_string(),
            None => {
                self.warn(format!("Font {index} not found"));
                DEFAULT_FONT.to_string()
            }
        }
    }

    /// Key of an existing line style.
    pub fn line_style(&mut self, id: u32) -> Option<u32> {
        if self.tables.line_style(id).is_some() {
            Some(id)
        } else {
            self.warn(format!("Line style {id} not found"));
            None
        }
    }

    // -----------------------------------------------------------------------
    // Global tables
    // -----------------------------------------------------------------------

    pub fn parse_fonts(&mut self, input: &mut ByteCursor) -> Result<()> {
        let end = self.read_record_end(input, "fonts")?;
        self.recover(input, end, "fonts", |ctx, input| {
            let count = input.read_u16()?;
            for _ in 0..count {
                let index = input.read_i16()? as i32;
                if ctx.is_qxp4() {
                    input.skip(2)?;
                }
                let name = input.read_platform_string()?;
                input.read_platform_string()?;
                ctx.tables_mut().fonts.insert(index, name);
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn parse_hj_props(&mut self, input: &mut ByteCursor) -> Result<HjRule> {
        input.skip(1)?;
        let min_before = input.read_u8()? as u32;
        let min_after = input.read_u8()? as u32;
        let max_in_row = input.read_u8()? as u32;
        input.skip(4)?;
        let single_word_justify = input.read_u8()? == 0;
        input.skip(1)?;
        let hyphenate = input.read_u8()? != 0;
        input.skip(33)?;
        Ok(HjRule {
            hyphenate,
            min_before,
            min_after,
            max_in_row,
            single_word_justify,
        })
    }

    /// Font, flags and size, in that order.
    pub fn parse_common_char_format(
        &mut self,
        input: &mut ByteCursor,
        format: &mut CharFormat,
    ) -> Result<()> {
        let font_index = input.read_i16()? as i32;
        format.font_name = self.font(font_index);
        format.flags = CharFlags::from_bits_truncate(input.read_u16()?);
        format.font_size = input.read_fraction()?;
        Ok(())
    }

    pub fn tab_stop_type(&mut self, code: u8) -> TabStopType {
        TabStopType::from_code(code).unwrap_or_else(|| {
            self.warn(format!("Unknown tab stop type {code}"));
            TabStopType::Left
        })
    }

    pub fn parse_tab_stop(&mut self, input: &mut ByteCursor) -> Result<TabStop> {
        let tab_type = self.tab_stop_type(input.read_u8()?);
        let align_char = match input.read_u8()? {
            1 => '.',
            2 => ',',
            c => c as char,
        };
        let fill_char = char::from_u32(input.read_u16()? as u32);
        let position = input.read_fraction()?;
        Ok(TabStop {
            tab_type,
            position,
            fill_char,
            align_char: Some(align_char),
        })
    }

    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    /// Geometry of a single page or of both sides of a spread.
    pub fn parse_page_settings(&mut self, input: &mut ByteCursor) -> Result<Vec<PageSettings>> {
        input.skip(6)?;
        let count = input.read_u16()?;
        if count == 0 || count > 2 {
            return Err(QxpError::parse(format!(
                "Invalid page settings blocks count {count}"
            )));
        }
        input.skip(2)?;

        let mut pages = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let top = input.read_fraction()?;
            let left = input.read_fraction()?;
            let bottom = input.read_fraction()?;
            let right = input.read_fraction()?;
            pages.push(PageSettings {
                offset: Rect::new(top, right, bottom, left),
            });
            input.skip(36)?;
            input.skip(if self.is_qxp4() { 12 } else { 8 })?;
        }

        for _ in 0..=count {
            let length = input.read_u32()? as u64;
            input.skip(length + 4)?;
        }

        if !self.is_big_endian() {
            input.skip(4)?;
        }
        let name_length = input.read_u32()?;
        input.skip(name_length as u64)?;

        Ok(pages)
    }

    // -----------------------------------------------------------------------
    // Object fields
    // -----------------------------------------------------------------------

    pub fn read_object_bbox(&mut self, input: &mut ByteCursor) -> Result<Rect> {
        let top = input.read_fraction()?;
        let left = input.read_fraction()?;
        let bottom = input.read_fraction()?;
        let right = input.read_fraction()?;
        Ok(Rect::new(top, right, bottom, left))
    }

    pub fn read_yx(&mut self, input: &mut ByteCursor) -> Result<Point> {
        let y = input.read_fraction()?;
        let x = input.read_fraction()?;
        Ok(Point::new(x, y))
    }

    pub fn read_gradient(&mut self, input: &mut ByteCursor, color1: Color) -> Result<Fill> {
        input.skip(if self.is_qxp4() { 20 } else { 14 })?;

        let code = (input.read_u16()? & 0xff) as u8;
        let gradient_type = GradientType::from_code(code).unwrap_or_else(|| {
            self.warn(format!("Unknown gradient type {code:#x}"));
            GradientType::Linear
        });
        input.skip(4)?;

        let color_id = if self.is_qxp4() {
            input.read_u16()? as u32
        } else {
            let id = input.read_u8()? as u32;
            input.skip(1)?;
            id
        };
        let shade = input.read_fraction()?;
        let color2 = self.shaded_color(color_id, shade);

        let angle = input.read_fraction()?;
        input.skip(4)?;

        Ok(Fill::Gradient(Gradient {
            gradient_type,
            color1,
            color2,
            angle,
        }))
    }

    pub fn read_hor_align(&mut self, input: &mut ByteCursor) -> Result<HorizontalAlignment> {
        let code = input.read_u8()?;
        Ok(HorizontalAlignment::from_code(code).unwrap_or_else(|| {
            self.warn(format!("Unknown horizontal alignment {code}"));
            HorizontalAlignment::Left
        }))
    }

    pub fn read_vert_align(&mut self, input: &mut ByteCursor) -> Result<VerticalAlignment> {
        let code = input.read_u8()?;
        Ok(VerticalAlignment::from_code(code).unwrap_or_else(|| {
            self.warn(format!("Unknown vertical alignment {code}"));
            VerticalAlignment::Top
        }))
    }

    pub fn read_paragraph_rule(&mut self, input: &mut ByteCursor) -> Result<ParagraphRule> {
        let width = input.read_fraction()?;
        let style_index = if self.is_qxp4() {
            input.read_u16()? as u32
        } else {
            input.read_u8()? as u32
        };
        let line_style = self.line_style(style_index);
        let color_id = if self.is_qxp4() {
            input.read_u16()? as u32
        } else {
            input.read_u8()? as u32
        };
        let shade = input.read_fraction()?;
        let color = self.shaded_color(color_id, shade);
        Ok(ParagraphRule {
            width,
            color,
            line_style,
            left_margin: input.read_fraction()?,
            right_margin: input.read_fraction()?,
            offset: input.read_fraction()?,
        })
    }

    /// The bit layout is mirrored between byte orders.
    pub fn read_paragraph_flags(&mut self, input: &mut ByteCursor) -> Result<ParagraphFlags> {
        let flags = input.read_u8()?;
        Ok(if self.is_big_endian() {
            ParagraphFlags {
                rule_below: flags & 0x2 != 0,
                rule_above: flags & 0x4 != 0,
                incremental_leading: flags & 0x20 != 0,
            }
        } else {
            ParagraphFlags {
                incremental_leading: flags & 0x4 != 0,
                rule_above: flags & 0x20 != 0,
                rule_below: flags & 0x40 != 0,
            }
        })
    }

    pub fn read_object_flags(&mut self, input: &mut ByteCursor) -> Result<ObjectFlags> {
        let raw = input.read_u8()?;
        let mask = if self.is_big_endian() { 0x80 } else { 0x1 };
        Ok(ObjectFlags {
            raw,
            no_color: raw & mask != 0,
        })
    }

    pub fn skip_file_info(&mut self, input: &mut ByteCursor) -> Result<()> {
        let length = input.read_u32()?;
        input.skip(length as u64)
    }

    /// Read `count` child indices of the group at `index`.
    ///
    /// Indices outside the page, self references and objects already claimed
    /// by another group on this page are dropped.
    pub fn read_group_elements(
        &mut self,
        input: &mut ByteCursor,
        count: u32,
        objects_count: u32,
        index: u32,
    ) -> Result<Vec<u32>> {
        let mut elements = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let element = input.read_u32()?;
            if element >= objects_count || element == index {
                self.warn(format!("Invalid group element index {element}"));
                continue;
            }
            if self.group_objects.insert(element) {
                elements.push(element);
            }
        }
        Ok(elements)
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// Decode the story stored at chain `index` and hand it to the collector.
    ///
    /// A story that fails to decode is reported and replaced by an empty one
    /// so the objects showing it still resolve.
    pub fn parse_text(
        &mut self,
        index: u32,
        link_id: u32,
        collector: &mut dyn Collector,
    ) -> Result<Rc<Text>> {
        let decoded = TextReader::new(&mut self.blocks, self.version, self.encoding)
            .read(index, &self.tables);
        match decoded {
            Ok(text) => {
                let text = Rc::new(text);
                collector.collect_text(Rc::clone(&text), link_id);
                Ok(text)
            }
            Err(e) if self.failsafe => {
                self.notifications.notify(
                    NotificationType::Error,
                    format!("Failed to parse text {index}: {e}"),
                );
                Ok(Rc::new(Text::new(self.encoding)))
            }
            Err(e) => Err(e),
        }
    }

    /// Attach the story of a text object with a non-zero content index.
    ///
    /// Only the chain head (offset 0) stores the story; continuation boxes
    /// record their position in the chain and receive the text later.
    pub fn link_story(
        &mut self,
        link: &mut LinkedTextSettings,
        content_index: u32,
        collector: &mut dyn Collector,
    ) -> Result<Option<Rc<Text>>> {
        if link.offset_into_text > 0 {
            link.linked_index = content_index;
            Ok(None)
        } else {
            self.parse_text(content_index, link.link_id, collector).map(Some)
        }
    }
}

/// Little-endian and big-endian flag bits for a mirrored pair.
pub fn flag(value: u8, big_endian: bool, be_mask: u8, le_mask: u8) -> bool {
    let mask = if big_endian { be_mask } else { le_mask };
    value & mask != 0
}
