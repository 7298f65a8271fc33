//! Record decoder for 4.x documents.
//!
//! 4.x adds bezier shapes, text on paths, OLE and picture payloads, a
//! block-indexed color table and a line style table. Object headers are
//! protected by the [`RotatingCipher`], which steps three times per object
//! (once per page before the first object, after the content type byte and
//! after the object itself).

use std::rc::Rc;

use crate::collector::{Collector, DummyCollector};
use crate::error::{QxpError, Result};
use crate::types::{
    BoxType, CharFormat, Color, CornerType, CurveComponent, Fill, Frame, Group, Line, LineCap,
    LineJoin, LineStyle, LinkedTextSettings, Page, ParagraphFormat, PictureSettings, QxpVersion,
    Rect, ShapeBox, TabStop, TextBox, TextPath, TextPathAlignment, TextPathLineAlignment,
    TextPathSettings, TextSettings,
};

use super::super::block_chain::BlockChainReader;
use super::super::cipher::{Cipher, RotatingCipher};
use super::super::constants::{LINE_STYLE_ENTRY_LENGTH, MAX_LINE_STYLE_SEGMENTS};
use super::super::encoding::TextEncoding;
use super::super::file_header::Qxp4Header;
use super::super::stream_reader::ByteCursor;
use super::common::{ContentType, DecoderContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeType {
    Line,
    OrthogonalLine,
    BezierLine,
    Rectangle,
    RoundedRectangle,
    ConcaveRectangle,
    BeveledRectangle,
    Oval,
    BezierBox,
}

impl ShapeType {
    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            1 => ShapeType::Line,
            2 => ShapeType::OrthogonalLine,
            4 => ShapeType::BezierLine,
            5 => ShapeType::Rectangle,
            6 => ShapeType::RoundedRectangle,
            7 => ShapeType::ConcaveRectangle,
            8 => ShapeType::BeveledRectangle,
            9 => ShapeType::Oval,
            11 => ShapeType::BezierBox,
            _ => return Err(QxpError::parse(format!("Unknown shape type {code}"))),
        })
    }

    fn is_line(&self) -> bool {
        matches!(self, ShapeType::Line | ShapeType::OrthogonalLine)
    }

    /// Rectangles of every corner treatment and ovals
    fn is_simple_box(&self) -> bool {
        matches!(
            self,
            ShapeType::Rectangle
                | ShapeType::RoundedRectangle
                | ShapeType::ConcaveRectangle
                | ShapeType::BeveledRectangle
                | ShapeType::Oval
        )
    }

    fn box_type(&self) -> BoxType {
        match self {
            ShapeType::Oval => BoxType::Oval,
            ShapeType::BezierBox => BoxType::Bezier,
            _ => BoxType::Rectangle,
        }
    }

    fn corner_type(&self) -> CornerType {
        match self {
            ShapeType::RoundedRectangle => CornerType::Rounded,
            ShapeType::ConcaveRectangle => CornerType::Concave,
            ShapeType::BeveledRectangle => CornerType::Beveled,
            _ => CornerType::Default,
        }
    }
}

fn content_type(code: u8) -> Result<ContentType> {
    Ok(match code {
        0 => ContentType::None,
        2 => ContentType::Objects,
        3 => ContentType::Text,
        4 => ContentType::Picture,
        _ => return Err(QxpError::parse(format!("Unknown content type {code}"))),
    })
}

/// Fields common to every object. Geometry lives in the object body.
#[derive(Debug, Clone)]
struct ObjectHeader {
    content_type: ContentType,
    shape_type: ShapeType,
    content_index: u32,
    link_id: u32,
    ole_id: u32,
    gradient_id: u32,
    /// Object color, also the first gradient color
    color: Color,
    fill: Option<Fill>,
    rotation: f64,
}

impl ObjectHeader {
    fn shape_box(&self) -> ShapeBox {
        ShapeBox {
            rotation: self.rotation,
            fill: self.fill,
            box_type: self.shape_type.box_type(),
            corner_type: self.shape_type.corner_type(),
            ..Default::default()
        }
    }

    fn line(&self) -> Line {
        Line {
            rotation: self.rotation,
            ..Default::default()
        }
    }

    fn link(&self) -> LinkedTextSettings {
        LinkedTextSettings {
            link_id: self.link_id,
            ..Default::default()
        }
    }
}

/// Decodes the record chain of a 4.x document.
pub struct Qxp4Decoder {
    ctx: DecoderContext,
    header: Qxp4Header,
}

impl Qxp4Decoder {
    pub fn new(blocks: BlockChainReader, header: Qxp4Header, failsafe: bool) -> Self {
        let encoding =
            TextEncoding::for_document(!header.base.endian().is_big(), header.base.language);
        Qxp4Decoder {
            ctx: DecoderContext::new(blocks, QxpVersion::Qxp4, encoding, failsafe),
            header,
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
        self.parse_document(&mut input, collector)?;
        collector.collect_style_tables(Rc::clone(&self.ctx.tables));
        self.parse_pages(&mut input, collector)?;
        collector.end_document();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Global pass
    // -----------------------------------------------------------------------

    fn parse_document(&mut self, input: &mut ByteCursor, collector: &mut dyn Collector) -> Result<()> {
        collector.collect_document_properties(&self.header.properties);

        for _ in 0..5 {
            self.ctx.skip_record(input)?;
        }
        self.ctx.parse_fonts(input)?;
        self.ctx.skip_record(input)?;
        self.parse_colors(input)?;
        self.skip_paragraph_stylesheets(input)?;
        self.ctx.skip_record(input)?;
        self.parse_hjs(input)?;
        self.parse_line_styles(input)?;
        self.ctx.skip_record(input)?;
        self.skip_templates(input)?;
        self.parse_char_formats(input)?;
        self.parse_tab_stops(input)?;
        self.parse_paragraph_formats(input)?;
        self.ctx.skip_record(input)?;
        Ok(())
    }

    /// The color record is a table of blocks; a color entry points at the
    /// block holding its RGB components.
    fn parse_colors(&mut self, input: &mut ByteCursor) -> Result<()> {
        let length = input.read_u32()? as u64;
        if length > input.remaining() {
            return Err(QxpError::parse(format!("Invalid colors length {length}")));
        }
        let mut record = input.sub_cursor(length)?;

        self.ctx.recover(&mut record, length, "colors", |ctx, record| {
            record.skip(14)?;
            let blocks_count = record.read_u16()? as u64;
            if blocks_count == 0 || blocks_count * 4 > length {
                log::debug!("Invalid number of color blocks {blocks_count}");
                return Ok(());
            }
            record.skip(20)?;

            // block numbering starts at 1
            let mut offsets = vec![0u64; blocks_count as usize + 1];
            for offset in offsets.iter_mut().skip(1) {
                *offset = (record.read_u32()? & 0x0FFF_FFFF) as u64;
            }

            for i in 2..offsets.len() {
                record.seek(offsets[i])?;
                let tag = record.read_u16()? as u32 + record.read_u16()? as u32;
                if tag == 6 {
                    parse_color(ctx, record, &offsets)?;
                }
            }
            Ok(())
        })?;
        Ok(())
    }

    fn skip_paragraph_stylesheets(&mut self, input: &mut ByteCursor) -> Result<()> {
        let end = self.ctx.read_record_end(input, "paragraph stylesheets")?;

        let mut tab_records = 0;
        while input.position() < end {
            input.skip(90)?;
            if input.read_u16()? > 0 {
                tab_records += 1;
            }
            input.skip(152)?;
        }
        input.seek(end)?;

        for _ in 0..tab_records {
            self.ctx.skip_record(input)?;
        }
        Ok(())
    }

    fn parse_hjs(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.parse_collection(input, "hjs", |ctx, input| {
            input.skip(4)?;
            let hj = ctx.parse_hj_props(input)?;
            input.skip(64)?;
            ctx.tables_mut().hjs.push(hj);
            Ok(())
        })
    }

    /// Fixed-size entries; a broken entry is dropped and the next one is
    /// read from its fixed offset.
    fn parse_line_styles(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.parse_collection(input, "line styles", |ctx, input| {
            let start = input.position();
            let end = start + LINE_STYLE_ENTRY_LENGTH;
            let entry = ctx.recover(input, end, "line style", |ctx, input| {
                read_line_style(ctx, input, start)
            })?;
            if let Some((id, style)) = entry {
                ctx.tables_mut().line_styles.insert(id, style);
            }
            Ok(())
        })
    }

    fn skip_templates(&mut self, input: &mut ByteCursor) -> Result<()> {
        let length = input.read_u32()?;
        if length as u64 > input.remaining() {
            return Err(QxpError::parse(format!("Invalid templates index length {length}")));
        }
        let count = input.read_u32()?;
        let rest = length
            .checked_sub(4)
            .ok_or_else(|| QxpError::parse(format!("Invalid templates index length {length}")))?;
        input.skip(rest as u64)?;

        if count as u64 > input.remaining() / 4 {
            return Err(QxpError::parse(format!("Invalid template count {count}")));
        }
        for _ in 0..count {
            self.ctx.skip_record(input)?;
        }
        Ok(())
    }

    fn parse_char_formats(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.tables_mut().char_formats.clear();
        self.ctx.parse_collection(input, "char formats", |ctx, input| {
            let format = read_char_format(ctx, input)?;
            ctx.tables_mut().push_char_format(format);
            Ok(())
        })
    }

    /// Tab stop lists referenced by paragraph formats. The list headers and
    /// the lists are both stored last to first.
    fn parse_tab_stops(&mut self, input: &mut ByteCursor) -> Result<()> {
        let spec_length = input.read_u32()?;
        if spec_length as u64 > input.remaining() {
            return Err(QxpError::parse(format!("Invalid tab stop spec length {spec_length}")));
        }

        let mut counts = vec![0usize; spec_length as usize / 8];
        for count in counts.iter_mut().rev() {
            input.skip(2)?;
            let value = input.read_u16()? as u64;
            if value > input.remaining() / 8 {
                return Err(QxpError::parse(format!("Invalid tab stop count {value}")));
            }
            *count = value as usize;
            input.skip(4)?;
        }

        let mut lists: Vec<Vec<TabStop>> = vec![Vec::new(); counts.len()];
        for (i, list) in lists.iter_mut().rev().enumerate() {
            input.skip(4)?;
            for _ in 0..counts[i] {
                list.push(self.ctx.parse_tab_stop(input)?);
            }
        }
        self.ctx.tables_mut().tab_stops = lists;
        Ok(())
    }

    fn parse_paragraph_formats(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.tables_mut().paragraph_formats.clear();
        self.ctx.parse_collection(input, "paragraph formats", |ctx, input| {
            let format = read_paragraph_format(ctx, input)?;
            ctx.tables_mut().push_paragraph_format(format);
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Page pass
    // -----------------------------------------------------------------------

    fn parse_pages(&mut self, input: &mut ByteCursor, collector: &mut dyn Collector) -> Result<()> {
        let mut cipher = RotatingCipher::new(self.header.seed, self.header.increment);
        let mut dummy = DummyCollector;
        let masters = self.header.master_pages_count as u32;
        let total = self.header.pages_count as u32 + masters;

        for ind in 0..total {
            let coll: &mut dyn Collector = if ind < masters {
                &mut dummy
            } else {
                &mut *collector
            };

            let settings = self.ctx.parse_page_settings(input)?;
            let objects_count = cipher.apply_u16((input.read_u32()? & 0xffff) as u16) as u32;
            let page = Page {
                settings,
                objects_count,
            };
            log::debug!("Page {ind}: {objects_count} objects");
            coll.start_page(&page);
            cipher.advance_reverse();

            for index in 0..page.objects_count {
                self.parse_object(input, &mut cipher, coll, &page, index)?;
            }

            self.ctx.end_page();
            coll.end_page();
        }
        Ok(())
    }

    fn parse_object(
        &mut self,
        input: &mut ByteCursor,
        cipher: &mut RotatingCipher,
        collector: &mut dyn Collector,
        page: &Page,
        index: u32,
    ) -> Result<()> {
        let header = self.parse_object_header(input, cipher)?;

        use ContentType as C;
        use ShapeType as S;
        match (header.content_type, header.shape_type) {
            (C::Objects, _) => self.parse_group(input, collector, page, index)?,
            (C::None, s) if s.is_line() => self.parse_line(input, &header, collector)?,
            (C::None, S::BezierLine) => self.parse_bezier_line(input, &header, collector)?,
            (C::None, S::BezierBox) => self.parse_bezier_empty_box(input, &header, collector)?,
            (C::None, s) if s.is_simple_box() => self.parse_empty_box(input, &header, collector)?,
            (C::Picture, S::BezierBox) => {
                self.parse_bezier_picture_box(input, &header, collector)?
            }
            (C::Picture, s) if s.is_simple_box() => {
                self.parse_picture_box(input, &header, collector)?
            }
            (C::Text, s) if s.is_line() => self.parse_line_text(input, &header, collector)?,
            (C::Text, S::BezierLine) => self.parse_bezier_text(input, &header, collector)?,
            (C::Text, S::BezierBox) => self.parse_bezier_text_box(input, &header, collector)?,
            (C::Text, s) if s.is_simple_box() => self.parse_text_box(input, &header, collector)?,
            (content, shape) => {
                return Err(QxpError::parse(format!(
                    "Unsupported shape {shape:?} for content {content:?}"
                )))
            }
        }

        cipher.advance(header.content_index as u16);
        Ok(())
    }

    fn parse_object_header(
        &mut self,
        input: &mut ByteCursor,
        cipher: &mut RotatingCipher,
    ) -> Result<ObjectHeader> {
        let flags = self.ctx.read_object_flags(input)?;
        input.skip(1)?;

        let color_id = input.read_u16()? as u32;
        let shade = input.read_fraction()?;
        let color = self.ctx.shaded_color(color_id, shade);
        let fill = (!flags.no_color).then_some(Fill::Solid(color));

        input.skip(4)?;
        let content_index_obf = (input.read_u32()? & 0xffff) as u16;

        let rotation = input.read_fraction()?;
        let _skew = input.read_fraction()?;
        let link_id = input.read_u32()?;
        let ole_id = input.read_u32()?;
        let gradient_id = input.read_u32()?;
        input.skip(4)?;

        // flip flags
        input.skip(2)?;

        let content_code = cipher.apply_u8(input.read_u8()?);
        cipher.advance_shift(content_code as u16);
        let content_index = cipher.apply_u16(content_index_obf) as u32;
        let shape_code = cipher.apply_u8(input.read_u8()?);

        Ok(ObjectHeader {
            content_type: content_type(content_code)?,
            shape_type: ShapeType::from_code(shape_code)?,
            content_index,
            link_id,
            ole_id,
            gradient_id,
            color,
            fill,
            rotation,
        })
    }

    // -----------------------------------------------------------------------
    // Object fields
    // -----------------------------------------------------------------------

    fn read_frame(&mut self, input: &mut ByteCursor) -> Result<Frame> {
        let width = input.read_fraction()?;
        let shade = input.read_fraction()?;
        let color_id = input.read_u16()? as u32;
        let color = self.ctx.shaded_color(color_id, shade);
        let gap_color_id = input.read_u16()? as u32;
        let gap_shade = input.read_fraction()?;
        let gap_color = self.ctx.shaded_color(gap_color_id, gap_shade);

        let mut frame = Frame {
            width,
            color: Some(color),
            gap_color: Some(gap_color),
            ..Default::default()
        };

        let arrow = input.read_u8()?;
        frame.set_arrows(((arrow >> 2) & 0xf) as u32);

        let is_bitmap = input.read_u8()? == 1;
        let style_index = input.read_u16()? as u32;
        if !is_bitmap {
            frame.line_style = self.ctx.line_style(style_index);
        }
        Ok(frame)
    }

    fn read_runaround(&mut self, input: &mut ByteCursor) -> Result<bool> {
        let runaround = input.read_u8()? == 1;
        input.skip(39)?;
        Ok(runaround)
    }

    fn read_linked_text_settings(
        &mut self,
        input: &mut ByteCursor,
        link: &mut LinkedTextSettings,
    ) -> Result<()> {
        link.next_linked_index = input.read_u32()?;
        input.skip(4)
    }

    fn read_text_settings(&mut self, input: &mut ByteCursor) -> Result<TextSettings> {
        input.skip(2)?;
        let gutter_width = input.read_fraction()?;
        let top = input.read_fraction()?;
        let left = input.read_fraction()?;
        let right = input.read_fraction()?;
        let bottom = input.read_fraction()?;
        let settings = TextSettings {
            gutter_width,
            inset: Rect::new(top, right, bottom, left),
            rotation: input.read_fraction()?,
            skew: input.read_fraction()?,
            columns_count: input.read_u8()? as u32,
            vertical_alignment: self.ctx.read_vert_align(input)?,
        };
        input.skip(10)?;
        Ok(settings)
    }

    fn read_text_path_settings(&mut self, input: &mut ByteCursor) -> Result<TextPathSettings> {
        let skew_characters = input.read_u8()? == 1;
        let rotate_characters = input.read_u8()? == 1;
        let code = input.read_u8()?;
        let alignment = TextPathAlignment::from_code(code).unwrap_or_else(|| {
            log::debug!("Unknown text path align {code}");
            TextPathAlignment::Baseline
        });
        let code = input.read_u8()?;
        let line_alignment = TextPathLineAlignment::from_code(code).unwrap_or_else(|| {
            log::debug!("Unknown text path line align {code}");
            TextPathLineAlignment::Top
        });
        Ok(TextPathSettings {
            skew_characters,
            rotate_characters,
            alignment,
            line_alignment,
        })
    }

    fn read_picture_settings(&mut self, input: &mut ByteCursor) -> Result<PictureSettings> {
        input.skip(24)?;
        let rotation = input.read_fraction()?;
        let skew = input.read_fraction()?;
        let offset_left = input.read_fraction()?;
        let offset_top = input.read_fraction()?;
        Ok(PictureSettings {
            rotation,
            skew,
            offset_top,
            offset_left,
            scale_horizontal: input.read_fraction()?,
            scale_vertical: input.read_fraction()?,
        })
    }

    /// OLE objects and image payloads are skipped whole.
    fn skip_length_block(&mut self, input: &mut ByteCursor) -> Result<()> {
        let length = input.read_u32()?;
        input.skip(length as u64)
    }

    /// Curve components and their overall bounding box.
    ///
    /// A component table that does not fit its record is dropped; the
    /// stream resumes after the record either way.
    fn read_bezier_data(&mut self, input: &mut ByteCursor) -> Result<(Rect, Vec<CurveComponent>)> {
        let length = input.read_u32()? as u64;
        if length > input.remaining() {
            return Err(QxpError::parse(format!("Invalid bezier data length {length}")));
        }
        let start = input.position();
        let end = start + length;

        let data = self.ctx.recover(input, end, "bezier data", |ctx, input| {
            input.skip(2)?;
            let components_count = input.read_u16()? as u64;
            if components_count > length / 24 {
                return Err(QxpError::parse(format!(
                    "Invalid bezier components count {components_count}"
                )));
            }
            let bbox = ctx.read_object_bbox(input)?;

            let mut offsets = Vec::with_capacity(components_count as usize);
            for _ in 0..components_count {
                offsets.push(start + input.read_u32()? as u64);
            }

            let mut components = Vec::with_capacity(offsets.len());
            for offset in offsets {
                input.seek(offset)?;
                input.skip(2)?;
                let points_count = input.read_u16()? as u64;
                if points_count > length / 8 {
                    return Err(QxpError::parse(format!(
                        "Invalid bezier points count {points_count}"
                    )));
                }
                let bbox = ctx.read_object_bbox(input)?;
                let points = (0..points_count)
                    .map(|_| ctx.read_yx(input))
                    .collect::<Result<Vec<_>>>()?;
                components.push(CurveComponent { bbox, points });
            }
            Ok((bbox, components))
        })?;
        Ok(data.unwrap_or_default())
    }

    /// Trailer of text objects; present on chain heads and empty objects.
    fn skip_text_object_end(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        link: &LinkedTextSettings,
    ) -> Result<()> {
        if header.content_index == 0 || link.offset_into_text == 0 {
            input.skip(4)?;
            let file_info_id = input.read_u32()?;
            input.skip(4)?;
            if file_info_id != 0 {
                self.ctx.skip_file_info(input)?;
            }
            if header.content_index == 0 {
                input.skip(16)?;
            }
        }
        Ok(())
    }

    fn gradient_fill(&mut self, input: &mut ByteCursor, header: &ObjectHeader, shape: &mut ShapeBox) -> Result<()> {
        if header.gradient_id != 0 {
            shape.fill = Some(self.ctx.read_gradient(input, header.color)?);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lines
    // -----------------------------------------------------------------------

    fn parse_line(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut line = header.line();
        line.style = self.read_frame(input)?;
        input.skip(4)?;
        line.runaround = self.read_runaround(input)?;
        input.skip(4)?;
        line.bbox = self.ctx.read_object_bbox(input)?;
        input.skip(24)?;

        collector.collect_line(line);
        Ok(())
    }

    fn parse_bezier_line(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut line = header.line();
        line.style = self.read_frame(input)?;
        input.skip(4)?;
        line.runaround = self.read_runaround(input)?;
        input.skip(44)?;
        (line.bbox, line.curve_components) = self.read_bezier_data(input)?;

        collector.collect_line(line);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Boxes
    // -----------------------------------------------------------------------

    fn parse_bezier_empty_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        shape.runaround = self.read_runaround(input)?;
        input.skip(44)?;
        self.gradient_fill(input, header, &mut shape)?;
        (shape.bbox, shape.curve_components) = self.read_bezier_data(input)?;

        collector.collect_box(shape);
        Ok(())
    }

    fn parse_empty_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        shape.runaround = self.read_runaround(input)?;
        input.skip(4)?;
        shape.bbox = self.ctx.read_object_bbox(input)?;
        shape.corner_radius = input.read_fraction()?;
        input.skip(20)?;
        self.gradient_fill(input, header, &mut shape)?;

        collector.collect_box(shape);
        Ok(())
    }

    fn parse_bezier_picture_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        shape.runaround = self.read_runaround(input)?;
        input.skip(40)?;

        self.skip_length_block(input)?;
        self.gradient_fill(input, header, &mut shape)?;
        shape.picture = Some(self.read_picture_settings(input)?);
        input.skip(76)?;
        if header.content_index != 0 && header.ole_id == 0 {
            self.skip_length_block(input)?;
        }
        (shape.bbox, shape.curve_components) = self.read_bezier_data(input)?;

        collector.collect_box(shape);
        Ok(())
    }

    fn parse_picture_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        shape.runaround = self.read_runaround(input)?;
        input.skip(4)?;
        shape.bbox = self.ctx.read_object_bbox(input)?;
        shape.corner_radius = input.read_fraction()?;
        input.skip(16)?;

        self.skip_length_block(input)?;
        self.gradient_fill(input, header, &mut shape)?;
        shape.picture = Some(self.read_picture_settings(input)?);
        input.skip(76)?;
        if header.content_index != 0 && header.ole_id == 0 {
            self.skip_length_block(input)?;
        }

        collector.collect_box(shape);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Text objects
    // -----------------------------------------------------------------------

    fn collect_text_path(
        &mut self,
        line: Line,
        mut link: LinkedTextSettings,
        settings: TextPathSettings,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        if header.content_index == 0 {
            collector.collect_line(line);
            return Ok(());
        }
        let text = self.ctx.link_story(&mut link, header.content_index, collector)?;
        collector.collect_text_path(TextPath {
            line,
            link,
            text,
            settings,
        });
        Ok(())
    }

    fn collect_text_box(
        &mut self,
        shape: ShapeBox,
        mut link: LinkedTextSettings,
        settings: TextSettings,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        if header.content_index == 0 {
            collector.collect_box(shape);
            return Ok(());
        }
        let text = self.ctx.link_story(&mut link, header.content_index, collector)?;
        collector.collect_text_box(TextBox {
            shape,
            link,
            text,
            settings,
        });
        Ok(())
    }

    fn parse_line_text(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut line = header.line();
        let mut link = header.link();

        line.style = self.read_frame(input)?;
        input.skip(4)?;
        line.runaround = self.read_runaround(input)?;
        input.skip(4)?;
        line.bbox = self.ctx.read_object_bbox(input)?;
        input.skip(24)?;

        link.offset_into_text = input.read_u32()?;
        input.skip(44)?;
        self.read_linked_text_settings(input, &mut link)?;
        input.skip(4)?;
        let settings = self.read_text_path_settings(input)?;
        input.skip(4)?;

        self.skip_text_object_end(input, header, &link)?;
        self.collect_text_path(line, link, settings, header, collector)
    }

    fn parse_bezier_text(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut line = header.line();
        let mut link = header.link();

        line.style = self.read_frame(input)?;
        input.skip(4)?;
        line.runaround = self.read_runaround(input)?;
        input.skip(44)?;

        link.offset_into_text = input.read_u32()?;
        input.skip(44)?;
        self.read_linked_text_settings(input, &mut link)?;
        input.skip(4)?;
        let settings = self.read_text_path_settings(input)?;
        input.skip(4)?;

        (line.bbox, line.curve_components) = self.read_bezier_data(input)?;

        self.skip_text_object_end(input, header, &link)?;
        self.collect_text_path(line, link, settings, header, collector)
    }

    fn parse_bezier_text_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        let mut link = header.link();

        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        shape.runaround = self.read_runaround(input)?;
        input.skip(44)?;
        self.gradient_fill(input, header, &mut shape)?;

        link.offset_into_text = input.read_u32()?;
        input.skip(2)?;
        let settings = self.read_text_settings(input)?;
        self.read_linked_text_settings(input, &mut link)?;
        input.skip(12)?;

        (shape.bbox, shape.curve_components) = self.read_bezier_data(input)?;

        self.skip_text_object_end(input, header, &link)?;
        self.collect_text_box(shape, link, settings, header, collector)
    }

    fn parse_text_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        let mut link = header.link();

        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        shape.runaround = self.read_runaround(input)?;
        input.skip(4)?;
        shape.bbox = self.ctx.read_object_bbox(input)?;
        shape.corner_radius = input.read_fraction()?;
        input.skip(20)?;
        self.gradient_fill(input, header, &mut shape)?;

        link.offset_into_text = input.read_u32()?;
        input.skip(2)?;
        let settings = self.read_text_settings(input)?;
        self.read_linked_text_settings(input, &mut link)?;
        input.skip(12)?;

        self.skip_text_object_end(input, header, &link)?;
        self.collect_text_box(shape, link, settings, header, collector)
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    fn parse_group(
        &mut self,
        input: &mut ByteCursor,
        collector: &mut dyn Collector,
        page: &Page,
        index: u32,
    ) -> Result<()> {
        input.skip(68)?;
        let bbox = self.ctx.read_object_bbox(input)?;
        input.skip(24)?;

        let count = input.read_u16()? as u32;
        if count > page.objects_count.saturating_sub(1) {
            return Err(QxpError::parse(format!("Invalid group elements count {count}")));
        }
        input.skip(10)?;

        let elements = self
            .ctx
            .read_group_elements(input, count, page.objects_count, index)?;
        collector.collect_group(Group { bbox, elements });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Table entries
// ---------------------------------------------------------------------------

fn parse_color(ctx: &mut DecoderContext, record: &mut ByteCursor, offsets: &[u64]) -> Result<()> {
    record.skip(30)?;
    let id = record.read_u16()? as u32;
    record.skip(70)?;
    let rgb_block = record.read_u16()? as usize;
    if rgb_block == 0 {
        return Ok(());
    }
    let Some(&offset) = offsets.get(rgb_block) else {
        log::debug!("RGB block {rgb_block} not found");
        return Ok(());
    };

    record.seek(offset + 16)?;
    let red = record.read_color_comp()?;
    let green = record.read_color_comp()?;
    let blue = record.read_color_comp()?;
    ctx.tables_mut().colors.insert(id, Color::from_rgb(red, green, blue));
    Ok(())
}

/// Segment lengths sit at the start of the entry, ahead of the header
/// fields that describe them.
fn read_line_style(
    ctx: &mut DecoderContext,
    input: &mut ByteCursor,
    start: u64,
) -> Result<(u32, LineStyle)> {
    input.skip(168)?;
    let id = input.read_u16()? as u32;
    let is_stripe = input.read_u8()? == 1;
    input.skip(1)?;

    let segments_count = input.read_u16()?;
    if segments_count > MAX_LINE_STYLE_SEGMENTS {
        return Err(QxpError::parse(format!(
            "Invalid line style segments count {segments_count}"
        )));
    }
    let is_proportional = input.read_u8()? == 1;
    input.skip(69)?;
    let pattern_length = input.read_fraction()?;

    let code = input.read_u16()?;
    let join = LineJoin::from_code(code).unwrap_or_else(|| {
        ctx.warn(format!("Unknown line join type {code}"));
        LineJoin::Miter
    });
    let code = input.read_u16()?;
    let cap = LineCap::from_code(code).unwrap_or_else(|| {
        ctx.warn(format!("Unknown line cap type {code}"));
        LineCap::Butt
    });

    input.seek(start)?;
    let segment_lengths = (0..segments_count)
        .map(|_| input.read_fraction())
        .collect::<Result<Vec<_>>>()?;

    Ok((
        id,
        LineStyle {
            segment_lengths,
            is_stripe,
            is_proportional,
            pattern_length,
            cap,
            join,
        },
    ))
}

fn read_char_format(ctx: &mut DecoderContext, input: &mut ByteCursor) -> Result<CharFormat> {
    input.skip(8)?;
    let mut format = CharFormat::default();
    ctx.parse_common_char_format(input, &mut format)?;
    input.skip(4)?;

    let color_id = input.read_u16()? as u32;
    input.skip(2)?;
    let shade = input.read_fraction()?;
    format.color = ctx.shaded_color(color_id, shade);

    input.skip(8)?;
    format.baseline_shift = input.read_fraction()?;
    format.is_control_chars = input.read_u8()? != 0;
    input.skip(23)?;
    Ok(format)
}

fn read_paragraph_format(
    ctx: &mut DecoderContext,
    input: &mut ByteCursor,
) -> Result<ParagraphFormat> {
    let mut format = ParagraphFormat::default();

    input.skip(8)?;
    let flags = ctx.read_paragraph_flags(input)?;
    format.incremental_leading = flags.incremental_leading;
    input.skip(2)?;
    format.alignment = ctx.read_hor_align(input)?;
    input.skip(4)?;

    let hj = input.read_u16()? as usize;
    if hj < ctx.tables.hjs.len() {
        format.hj = Some(hj);
    }
    input.skip(2)?;

    let left = input.read_fraction()?;
    format.first_line_indent = input.read_fraction()?;
    let right = input.read_fraction()?;
    format.leading = input.read_fraction()?;
    let top = input.read_fraction()?;
    let bottom = input.read_fraction()?;
    format.margin = Rect::new(top, right, bottom, left);
    input.skip(4)?;

    let rule_above = ctx.read_paragraph_rule(input)?;
    let rule_below = ctx.read_paragraph_rule(input)?;
    format.rule_above = flags.rule_above.then_some(rule_above);
    format.rule_below = flags.rule_below.then_some(rule_below);

    let tab_index = input.read_u16()?;
    if tab_index != 0xffff {
        match ctx.tables.tab_stops.get(tab_index as usize) {
            Some(tab_stops) => format.tab_stops = tab_stops.clone(),
            None => ctx.warn(format!("Tab stops {tab_index} not found")),
        }
    }
    input.skip(2)?;

    Ok(format)
}
