//! Record decoder for 3.1 Mac, 3.1 and 3.3 documents.
//!
//! Object headers are protected by the [`AdditiveCipher`], which steps once
//! per object. Before 3.3 the content and shape kinds share a single
//! enciphered type byte; 3.3 stores them as two plain bytes.

use std::rc::Rc;

use crate::collector::{Collector, DummyCollector};
use crate::error::{QxpError, Result};
use crate::types::{
    BoxType, CharFormat, Color, CornerType, Fill, Frame, Group, Line, LinkedTextSettings, Page,
    ParagraphFormat, PictureSettings, Point, QxpVersion, Rect, ShapeBox, TextBox, TextSettings,
};

use super::super::block_chain::BlockChainReader;
use super::super::cipher::{AdditiveCipher, Cipher};
use super::super::constants::POLYGON_PREFIX_LENGTH;
use super::super::encoding::TextEncoding;
use super::super::file_header::Qxp33Header;
use super::super::stream_reader::ByteCursor;
use super::common::{flag, ContentType, DecoderContext};

/// Number of tab stop slots stored in every paragraph format
const TAB_STOPS_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeType {
    Line,
    OrthogonalLine,
    Rectangle,
    CorneredRectangle,
    Oval,
    Polygon,
}

impl ShapeType {
    fn is_line(&self) -> bool {
        matches!(self, ShapeType::Line | ShapeType::OrthogonalLine)
    }

    fn box_type(&self) -> BoxType {
        match self {
            ShapeType::Oval => BoxType::Oval,
            ShapeType::Polygon => BoxType::Polygon,
            _ => BoxType::Rectangle,
        }
    }
}

/// Kinds packed into the single type byte of pre-3.3 documents.
fn legacy_object_type(code: u8) -> Result<(ShapeType, ContentType)> {
    Ok(match code {
        0 => (ShapeType::Line, ContentType::None),
        1 => (ShapeType::OrthogonalLine, ContentType::None),
        3 => (ShapeType::Rectangle, ContentType::Text),
        11 => (ShapeType::Rectangle, ContentType::Objects),
        12 => (ShapeType::Rectangle, ContentType::Picture),
        13 => (ShapeType::CorneredRectangle, ContentType::Picture),
        14 => (ShapeType::Oval, ContentType::Picture),
        15 => (ShapeType::Polygon, ContentType::Picture),
        _ => return Err(QxpError::parse(format!("Unknown object type {code}"))),
    })
}

fn content_type(code: u8) -> Result<ContentType> {
    Ok(match code {
        1 => ContentType::Objects,
        2 | 4 => ContentType::None,
        3 => ContentType::Text,
        5 => ContentType::Picture,
        _ => return Err(QxpError::parse(format!("Unknown content type {code}"))),
    })
}

fn shape_type(code: u8) -> Result<ShapeType> {
    Ok(match code {
        0 => ShapeType::Line,
        1 => ShapeType::OrthogonalLine,
        2 => ShapeType::Rectangle,
        3 => ShapeType::CorneredRectangle,
        4 => ShapeType::Oval,
        5 => ShapeType::Polygon,
        _ => return Err(QxpError::parse(format!("Unknown shape type {code}"))),
    })
}

/// Fields common to every object
#[derive(Debug, Clone)]
struct ObjectHeader {
    content_type: ContentType,
    shape_type: ShapeType,
    content_index: u32,
    link_id: u32,
    fill: Option<Fill>,
    runaround: bool,
    rotation: f64,
    skew: f64,
    corner_type: CornerType,
    corner_radius: f64,
    bbox: Rect,
}

impl ObjectHeader {
    fn shape_box(&self) -> ShapeBox {
        ShapeBox {
            bbox: self.bbox,
            runaround: self.runaround,
            rotation: self.rotation,
            fill: self.fill,
            box_type: self.shape_type.box_type(),
            corner_type: self.corner_type,
            corner_radius: self.corner_radius,
            ..Default::default()
        }
    }

    /// A line is stroked with the object color.
    fn line(&self) -> Line {
        let mut line = Line {
            bbox: self.bbox,
            runaround: self.runaround,
            rotation: self.rotation,
            ..Default::default()
        };
        match self.fill {
            Some(Fill::Solid(color)) => line.style.color = Some(color),
            Some(Fill::Gradient(_)) => log::debug!("Unsupported line fill type"),
            None => {}
        }
        line
    }
}

/// Decodes the record chain of a 3.x document.
pub struct Qxp33Decoder {
    ctx: DecoderContext,
    header: Qxp33Header,
}

impl Qxp33Decoder {
    pub fn new(blocks: BlockChainReader, header: Qxp33Header, failsafe: bool) -> Self {
        let version = QxpVersion::from_code(header.base.version_code).unwrap_or(QxpVersion::Qxp33);
        let encoding = TextEncoding::for_document(
            !header.base.endian().is_big(),
            header.base.language,
        );
        Qxp33Decoder {
            ctx: DecoderContext::new(blocks, version, encoding, failsafe),
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

        for _ in 0..4 {
            self.ctx.skip_record(input)?;
        }
        self.ctx.parse_fonts(input)?;
        if self.ctx.version == QxpVersion::Qxp33 {
            self.ctx.skip_record(input)?;
        }
        self.parse_colors(input)?;
        // style sheets; every object carries a resolved copy of its style
        self.ctx.skip_record(input)?;
        self.ctx.skip_record(input)?;
        self.parse_hjs(input)?;
        self.ctx.skip_record(input)?;
        self.parse_char_formats(input)?;
        self.parse_paragraph_formats(input)?;
        self.ctx.skip_record(input)?;
        Ok(())
    }

    fn parse_colors(&mut self, input: &mut ByteCursor) -> Result<()> {
        let end = self.ctx.read_record_end(input, "colors")?;
        self.ctx.recover(input, end, "colors", |ctx, input| {
            input.skip(1)?;
            let count = input.read_u8()?;
            input.skip(32)?;
            for _ in 0..count {
                let id = input.read_u8()? as u32;
                input.skip(1)?;
                let red = input.read_color_comp()?;
                let green = input.read_color_comp()?;
                let blue = input.read_color_comp()?;
                ctx.tables_mut()
                    .colors
                    .insert(id, Color::from_rgb(red, green, blue));
                input.skip(42)?;
                input.read_name()?;
            }
            Ok(())
        })?;
        Ok(())
    }

    fn parse_hjs(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.parse_collection(input, "hjs", |ctx, input| {
            input.skip(4)?;
            let hj = ctx.parse_hj_props(input)?;
            input.read_name()?;
            ctx.tables_mut().hjs.push(hj);
            Ok(())
        })
    }

    fn parse_char_formats(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.ctx.tables_mut().char_formats.clear();
        self.ctx.parse_collection(input, "char formats", |ctx, input| {
            let format = read_char_format(ctx, input)?;
            ctx.tables_mut().push_char_format(format);
            Ok(())
        })
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

    /// Master pages come first and are decoded only to keep the cipher in
    /// step; their objects are repeated on every content page.
    fn parse_pages(&mut self, input: &mut ByteCursor, collector: &mut dyn Collector) -> Result<()> {
        let mut cipher = AdditiveCipher::new(self.header.seed, self.header.increment);
        let mut dummy = DummyCollector;
        let masters = self.header.master_pages_count as u32;
        let total = self.header.pages_count as u32 + masters;

        for ind in 0..total {
            let coll: &mut dyn Collector = if ind < masters {
                &mut dummy
            } else {
                &mut *collector
            };

            let page = Page {
                settings: self.ctx.parse_page_settings(input)?,
                objects_count: input.read_u32()?,
            };
            log::debug!("Page {ind}: {} objects", page.objects_count);
            coll.start_page(&page);

            for index in 0..page.objects_count {
                self.parse_object(input, &cipher, coll, &page, index)?;
                cipher.advance();
            }

            self.ctx.end_page();
            coll.end_page();
        }
        Ok(())
    }

    fn parse_object(
        &mut self,
        input: &mut ByteCursor,
        cipher: &AdditiveCipher,
        collector: &mut dyn Collector,
        page: &Page,
        index: u32,
    ) -> Result<()> {
        let header = self.parse_object_header(input, cipher)?;

        match header.content_type {
            ContentType::None if header.shape_type.is_line() => {
                self.parse_line(input, &header, collector)
            }
            ContentType::None => self.parse_empty_box(input, &header, collector),
            ContentType::Picture => self.parse_picture_box(input, &header, collector),
            ContentType::Text => self.parse_text_box(input, &header, collector),
            ContentType::Objects => self.parse_group(input, &header, collector, page, index),
        }
    }

    fn parse_object_header(
        &mut self,
        input: &mut ByteCursor,
        cipher: &AdditiveCipher,
    ) -> Result<ObjectHeader> {
        let is_qxp33 = self.ctx.version == QxpVersion::Qxp33;
        let be = self.ctx.is_big_endian();

        let object_type = cipher.apply_u8(input.read_u8()?);
        let mut kinds = if is_qxp33 {
            None
        } else {
            Some(legacy_object_type(object_type)?)
        };

        let color_id = input.read_u8()? as u32;
        let shade = input.read_fraction()?;
        let color = self.ctx.shaded_color(color_id, shade);

        let content_index = cipher.apply_u16((input.read_u32()? & 0xffff) as u16) as u32;

        let flags = self.ctx.read_object_flags(input)?;
        let no_runaround = flag(flags.raw, be, 0x02, 0x20);
        let mut fill = if flags.no_color {
            None
        } else {
            Some(Fill::Solid(color))
        };
        input.skip(1)?;

        let rotation = input.read_fraction()?;
        let skew = input.read_fraction()?;
        let link_id = input.read_u32()?;
        let gradient_id = input.read_u32()?;
        input.skip(4)?;

        let _box_flag1 = input.read_u8()?;
        let box_flag2 = input.read_u8()?;
        let beveled = flag(box_flag2, be, 0x20, 0x2);
        let concave = flag(box_flag2, be, 0x40, 0x4);

        if is_qxp33 {
            let content = content_type(input.read_u8()?)?;
            let shape = shape_type(input.read_u8()?)?;
            kinds = Some((shape, content));
        }
        let (shape_type, content_type) =
            kinds.ok_or_else(|| QxpError::parse("Missing object type"))?;

        let corner_type = if shape_type == ShapeType::CorneredRectangle {
            if concave {
                CornerType::Concave
            } else if beveled {
                CornerType::Beveled
            } else {
                CornerType::Rounded
            }
        } else {
            CornerType::Default
        };

        let corner_radius = if is_qxp33 { input.read_fraction()? } else { 0.0 };

        if gradient_id != 0 {
            fill = Some(self.ctx.read_gradient(input, color)?);
        }

        let bbox = self.ctx.read_object_bbox(input)?;

        Ok(ObjectHeader {
            content_type,
            shape_type,
            content_index,
            link_id,
            fill,
            runaround: !no_runaround,
            rotation,
            skew,
            corner_type,
            corner_radius,
            bbox,
        })
    }

    fn read_frame(&mut self, input: &mut ByteCursor) -> Result<Frame> {
        let width = input.read_fraction()?;
        let shade = input.read_fraction()?;
        let color_id = input.read_u8()? as u32;
        let color = self.ctx.shaded_color(color_id, shade);
        input.skip(1)?;
        Ok(Frame {
            width,
            color: Some(color),
            ..Default::default()
        })
    }

    fn read_polygon_data(&mut self, input: &mut ByteCursor) -> Result<Vec<Point>> {
        let length = input.read_u32()?;
        if length < POLYGON_PREFIX_LENGTH || length as u64 > input.remaining() {
            return Err(QxpError::parse(format!("Invalid polygon data length {length}")));
        }
        input.skip(POLYGON_PREFIX_LENGTH as u64)?;

        let count = (length - POLYGON_PREFIX_LENGTH) / 8;
        (0..count).map(|_| self.ctx.read_yx(input)).collect()
    }

    fn skip_length_block(&mut self, input: &mut ByteCursor) -> Result<()> {
        let length = input.read_u32()?;
        input.skip(length as u64)
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    fn parse_line(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut line = header.line();
        line.style.width = input.read_fraction()?;

        let style_index = input.read_u8()?;
        let is_stripe = (style_index >> 7) == 1;
        if !is_stripe {
            line.style.line_style = self.ctx.line_style(style_index as u32);
        }

        let arrow = input.read_u8()?;
        line.style.set_arrows(arrow as u32);

        collector.collect_line(line);
        Ok(())
    }

    fn parse_text_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shape = header.shape_box();
        shape.frame = self.read_frame(input)?;
        input.skip(4)?;
        let runaround_id = input.read_u32()?;

        let mut link = LinkedTextSettings {
            link_id: header.link_id,
            offset_into_text: input.read_u32()?,
            ..Default::default()
        };
        input.skip(4)?;

        let gutter_width = input.read_fraction()?;
        let inset_top = input.read_fraction()?;
        let inset_left = input.read_fraction()?;
        let inset_right = input.read_fraction()?;
        let inset_bottom = input.read_fraction()?;
        let settings = TextSettings {
            gutter_width,
            inset: Rect::new(inset_top, inset_right, inset_bottom, inset_left),
            rotation: input.read_fraction()?,
            skew: input.read_fraction()?,
            columns_count: input.read_u8()? as u32,
            vertical_alignment: self.ctx.read_vert_align(input)?,
        };
        input.skip(8)?;
        link.next_linked_index = input.read_u32()?;
        input.skip(8)?;

        if header.shape_type == ShapeType::Polygon {
            shape.custom_points = self.read_polygon_data(input)?;
        }

        if header.content_index == 0 || link.offset_into_text == 0 {
            input.skip(4)?;
            let file_info_id = input.read_u32()?;
            input.skip(4)?;
            if file_info_id != 0 {
                self.ctx.skip_file_info(input)?;
            }
            if header.content_index == 0 {
                input.skip(12)?;
            }
        }

        if runaround_id != 0 {
            self.skip_length_block(input)?;
        }

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

    fn parse_picture_box(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let frame = self.read_frame(input)?;
        input.skip(4)?;

        let mut shape = header.shape_box();
        shape.frame = frame;

        let mut runaround_id = 0;
        let mut clip_id = 0;
        if self.ctx.version == QxpVersion::Qxp33 {
            runaround_id = input.read_u32()?;
            input.skip(2)?;
            clip_id = input.read_u32()?;
            input.skip(14)?;
        } else {
            input.skip(4)?;
            match header.shape_type {
                ShapeType::CorneredRectangle => {
                    shape.corner_radius = input.read_fraction()?;
                    shape.corner_type = match input.read_u8()? {
                        0 => CornerType::Beveled,
                        1 => CornerType::Rounded,
                        2 => CornerType::Concave,
                        code => {
                            log::debug!("Unknown corner type {code}");
                            CornerType::Rounded
                        }
                    };
                }
                ShapeType::Polygon => input.skip(5)?,
                _ => {}
            }
        }

        let rotation = input.read_fraction()?;
        let skew = input.read_fraction()?;
        let offset_left = input.read_fraction()?;
        let offset_top = input.read_fraction()?;
        shape.picture = Some(PictureSettings {
            rotation,
            skew,
            offset_top,
            offset_left,
            scale_horizontal: input.read_fraction()?,
            scale_vertical: input.read_fraction()?,
        });
        input.skip(30)?;

        if header.shape_type == ShapeType::Polygon {
            shape.custom_points = self.read_polygon_data(input)?;
        }

        if runaround_id != 0 {
            self.skip_length_block(input)?;
            if clip_id != 0 {
                self.skip_length_block(input)?;
            }
        }

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
        let runaround_id = input.read_u32()?;
        input.skip(74)?;

        if header.shape_type == ShapeType::Polygon {
            shape.custom_points = self.read_polygon_data(input)?;
        }
        if runaround_id != 0 {
            self.skip_length_block(input)?;
        }

        collector.collect_box(shape);
        Ok(())
    }

    fn parse_group(
        &mut self,
        input: &mut ByteCursor,
        header: &ObjectHeader,
        collector: &mut dyn Collector,
        page: &Page,
        index: u32,
    ) -> Result<()> {
        input.skip(10)?;
        let count = input.read_u16()? as u32;
        if count > page.objects_count.saturating_sub(1) {
            return Err(QxpError::parse(format!("Invalid group elements count {count}")));
        }
        input.skip(6)?;

        let elements = self
            .ctx
            .read_group_elements(input, count, page.objects_count, index)?;
        collector.collect_group(Group {
            bbox: header.bbox,
            elements,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Format records
// ---------------------------------------------------------------------------

fn read_char_format(ctx: &mut DecoderContext, input: &mut ByteCursor) -> Result<CharFormat> {
    input.skip(2)?;
    let mut format = CharFormat::default();
    ctx.parse_common_char_format(input, &mut format)?;
    input.skip(4)?;

    let color_id = input.read_u8()? as u32;
    input.skip(1)?;
    let shade = input.read_fraction()?;
    format.color = ctx.shaded_color(color_id, shade);

    input.skip(8)?;
    format.baseline_shift = input.read_fraction()?;
    format.is_control_chars = input.read_u8()? != 0;
    input.skip(13)?;
    Ok(format)
}

fn read_paragraph_format(
    ctx: &mut DecoderContext,
    input: &mut ByteCursor,
) -> Result<ParagraphFormat> {
    let mut format = ParagraphFormat::default();

    input.skip(2)?;
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

    let rule_above = ctx.read_paragraph_rule(input)?;
    let rule_below = ctx.read_paragraph_rule(input)?;
    format.rule_above = flags.rule_above.then_some(rule_above);
    format.rule_below = flags.rule_below.then_some(rule_below);
    input.skip(8)?;

    for _ in 0..TAB_STOPS_COUNT {
        let tab_stop = ctx.parse_tab_stop(input)?;
        if tab_stop.is_defined() {
            format.tab_stops.push(tab_stop);
        }
    }
    input.skip(6)?;

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Collector;
    use crate::io::qxp::stream_reader::Endian;
    use crate::notification::NotificationType;
    use crate::types::HorizontalAlignment;

    #[derive(Default)]
    struct Collected {
        lines: Vec<Line>,
        boxes: Vec<ShapeBox>,
        text_boxes: Vec<TextBox>,
        groups: Vec<Group>,
    }

    impl Collector for Collected {
        fn collect_line(&mut self, line: Line) {
            self.lines.push(line);
        }
        fn collect_box(&mut self, shape: ShapeBox) {
            self.boxes.push(shape);
        }
        fn collect_text_box(&mut self, text_box: TextBox) {
            self.text_boxes.push(text_box);
        }
        fn collect_group(&mut self, group: Group) {
            self.groups.push(group);
        }
    }

    fn decoder(version: QxpVersion) -> Qxp33Decoder {
        let mut header = Qxp33Header::new(None);
        header.base.version_code = version.code();
        let blocks = BlockChainReader::new(vec![0; 1024], Endian::Big, version);
        Qxp33Decoder::new(blocks, header, true)
    }

    fn fraction(v: f64) -> [u8; 4] {
        ((v * 65536.0) as i32).to_be_bytes()
    }

    /// A 3.3 header with zero cipher state.
    fn qxp33_header(content: u8, shape: u8, content_index: u16, bbox: [f64; 4]) -> Vec<u8> {
        let mut data = vec![0, 2];
        data.extend(fraction(1.0));
        data.extend((content_index as u32).to_be_bytes());
        data.extend([0, 0]);
        data.extend(fraction(0.0));
        data.extend(fraction(0.0));
        data.extend(7u32.to_be_bytes());
        data.extend(0u32.to_be_bytes());
        data.extend([0; 4]);
        data.extend([0, 0]);
        data.extend([content, shape]);
        data.extend(fraction(0.0));
        for v in bbox {
            data.extend(fraction(v));
        }
        data
    }

    #[test]
    fn test_object_header_qxp33() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let data = qxp33_header(4, 2, 0, [10.0, 20.0, 110.0, 220.0]);
        let mut input = ByteCursor::new(data, Endian::Big);
        let header = dec
            .parse_object_header(&mut input, &AdditiveCipher::new(0, 0))
            .unwrap();
        assert_eq!(header.content_type, ContentType::None);
        assert_eq!(header.shape_type, ShapeType::Rectangle);
        assert_eq!(header.link_id, 7);
        assert_eq!(header.fill, Some(Fill::Solid(Color::RED)));
        assert!(header.runaround);
        assert_eq!(header.bbox, Rect::new(10.0, 220.0, 110.0, 20.0));
        assert!(input.at_end());
    }

    #[test]
    fn test_object_header_legacy_type_is_enciphered() {
        let mut dec = decoder(QxpVersion::Qxp31);
        let cipher = AdditiveCipher::new(0x337c, 0x3797);
        // 0x7f deciphers to 3: a rectangular text box
        let mut data = vec![0x7f, 1];
        data.extend(fraction(1.0));
        data.extend(0u32.to_be_bytes());
        data.extend([0x80, 0]);
        data.extend([0; 22]);
        data.extend([0; 16]);
        let mut input = ByteCursor::new(data, Endian::Big);
        let header = dec.parse_object_header(&mut input, &cipher).unwrap();
        assert_eq!(header.content_type, ContentType::Text);
        assert_eq!(header.shape_type, ShapeType::Rectangle);
        assert_eq!(header.content_index, 0x337c);
        assert_eq!(header.fill, None);
    }

    #[test]
    fn test_unknown_shape_is_fatal() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let data = qxp33_header(4, 9, 0, [0.0; 4]);
        let mut input = ByteCursor::new(data, Endian::Big);
        let result = dec.parse_object_header(&mut input, &AdditiveCipher::new(0, 0));
        assert!(matches!(result, Err(QxpError::Parse(_))));
    }

    #[test]
    fn test_line_stripe_has_no_dash() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut data = qxp33_header(2, 0, 0, [0.0, 0.0, 10.0, 100.0]);
        data.extend(fraction(2.0));
        data.extend([0x81, 3]);
        data.extend(qxp33_header(2, 1, 0, [0.0, 0.0, 10.0, 100.0]));
        data.extend(fraction(0.5));
        data.extend([1, 0]);

        let page = Page {
            settings: Vec::new(),
            objects_count: 2,
        };
        let mut input = ByteCursor::new(data, Endian::Big);
        let mut out = Collected::default();
        let cipher = AdditiveCipher::new(0, 0);
        dec.parse_object(&mut input, &cipher, &mut out, &page, 0).unwrap();
        dec.parse_object(&mut input, &cipher, &mut out, &page, 1).unwrap();

        assert_eq!(out.lines.len(), 2);
        assert_eq!(out.lines[0].style.width, 2.0);
        assert_eq!(out.lines[0].style.line_style, None);
        assert!(out.lines[0].style.start_arrow.is_some());
        assert_eq!(out.lines[0].style.color, Some(Color::RED));
        assert_eq!(out.lines[1].style.line_style, Some(1));
        assert!(input.at_end());
    }

    #[test]
    fn test_empty_box_and_group() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut data = qxp33_header(2, 4, 0, [0.0, 0.0, 50.0, 50.0]);
        data.extend(fraction(1.0));
        data.extend(fraction(1.0));
        data.extend([1, 0]);
        data.extend([0; 4]);
        data.extend(0u32.to_be_bytes());
        data.extend([0; 74]);

        data.extend(qxp33_header(1, 2, 0, [0.0, 0.0, 50.0, 50.0]));
        data.extend([0; 10]);
        data.extend(2u16.to_be_bytes());
        data.extend([0; 6]);
        data.extend(0u32.to_be_bytes());
        data.extend(1u32.to_be_bytes());

        let page = Page {
            settings: Vec::new(),
            objects_count: 3,
        };
        let mut input = ByteCursor::new(data, Endian::Big);
        let mut out = Collected::default();
        let cipher = AdditiveCipher::new(0, 0);
        dec.parse_object(&mut input, &cipher, &mut out, &page, 0).unwrap();
        dec.parse_object(&mut input, &cipher, &mut out, &page, 1).unwrap();

        assert_eq!(out.boxes.len(), 1);
        assert_eq!(out.boxes[0].box_type, BoxType::Oval);
        assert_eq!(out.boxes[0].frame.color, Some(Color::BLACK));
        // the self reference is dropped
        assert_eq!(out.groups[0].elements, vec![0]);
        assert!(dec.context().notifications.has_type(NotificationType::Warning));
    }

    #[test]
    fn test_group_count_past_page_is_fatal() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut data = qxp33_header(1, 2, 0, [0.0; 4]);
        data.extend([0; 10]);
        data.extend(5u16.to_be_bytes());
        data.extend([0; 6]);
        let page = Page {
            settings: Vec::new(),
            objects_count: 3,
        };
        let mut input = ByteCursor::new(data, Endian::Big);
        let result = dec.parse_object(
            &mut input,
            &AdditiveCipher::new(0, 0),
            &mut Collected::default(),
            &page,
            0,
        );
        assert!(matches!(result, Err(QxpError::Parse(_))));
    }

    #[test]
    fn test_text_box_without_content_is_a_box() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut data = qxp33_header(3, 2, 0, [0.0, 0.0, 50.0, 50.0]);
        data.extend([0; 10]);
        data.extend([0; 4]);
        data.extend(0u32.to_be_bytes());
        data.extend(0u32.to_be_bytes());
        data.extend([0; 4]);
        data.extend(fraction(12.0));
        for _ in 0..6 {
            data.extend(fraction(0.0));
        }
        data.extend([1, 0]);
        data.extend([0; 8]);
        data.extend(0u32.to_be_bytes());
        data.extend([0; 8]);
        data.extend([0; 12]);
        data.extend([0; 12]);

        let page = Page {
            settings: Vec::new(),
            objects_count: 1,
        };
        let mut input = ByteCursor::new(data, Endian::Big);
        let mut out = Collected::default();
        dec.parse_object(&mut input, &AdditiveCipher::new(0, 0), &mut out, &page, 0)
            .unwrap();
        assert_eq!(out.boxes.len(), 1);
        assert!(out.text_boxes.is_empty());
        assert!(input.at_end());
    }

    #[test]
    fn test_polygon_data_bounds() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut data = 34u32.to_be_bytes().to_vec();
        data.extend([0; 18]);
        data.extend(fraction(1.0));
        data.extend(fraction(2.0));
        data.extend(fraction(3.0));
        data.extend(fraction(4.0));
        let mut input = ByteCursor::new(data, Endian::Big);
        let points = dec.read_polygon_data(&mut input).unwrap();
        assert_eq!(points, vec![Point::new(2.0, 1.0), Point::new(4.0, 3.0)]);

        let mut input = ByteCursor::new(10u32.to_be_bytes().to_vec(), Endian::Big);
        assert!(dec.read_polygon_data(&mut input).is_err());
    }

    #[test]
    fn test_colors_recover_at_record_end() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut body = vec![0, 2];
        body.extend([0; 32]);
        body.extend([10, 0]);
        body.extend([0xff, 0xff, 0x80, 0x00, 0x00, 0x00]);
        body.extend([0; 42]);
        body.extend([0, 0]);
        // second entry truncated
        body.extend([11, 0, 0xff]);
        let mut data = (body.len() as u32).to_be_bytes().to_vec();
        data.extend(body);
        data.push(0xaa);

        let mut input = ByteCursor::new(data, Endian::Big);
        dec.parse_colors(&mut input).unwrap();
        assert_eq!(dec.context().tables.color(10), Some(Color::from_rgb(255, 128, 0)));
        assert_eq!(input.read_u8().unwrap(), 0xaa);
        assert!(dec.context().notifications.has_type(NotificationType::Error));
    }

    #[test]
    fn test_paragraph_format_layout() {
        let mut dec = decoder(QxpVersion::Qxp33);
        let mut data = vec![0, 0, 0x04, 0, 0, 1, 0, 0, 0, 0];
        data.extend(0u16.to_be_bytes());
        data.extend([0, 0]);
        for v in [5.0, 10.0, 6.0, 14.0, 1.0, 2.0] {
            data.extend(fraction(v));
        }
        for _ in 0..2 {
            data.extend(fraction(1.0));
            data.extend([0, 1]);
            data.extend(fraction(1.0));
            data.extend(fraction(0.0));
            data.extend(fraction(0.0));
            data.extend(fraction(0.0));
        }
        data.extend([0; 8]);
        data.extend([0, 0, 0, 0]);
        data.extend(fraction(36.0));
        for _ in 1..TAB_STOPS_COUNT {
            data.extend([0, 0, 0, 0]);
            data.extend(fraction(-1.0));
        }
        data.extend([0; 6]);
        let len = data.len() as u64;

        let mut input = ByteCursor::new(data, Endian::Big);
        let format = read_paragraph_format(&mut dec.ctx, &mut input).unwrap();
        assert_eq!(input.position(), len);
        assert_eq!(format.alignment, HorizontalAlignment::Center);
        assert_eq!(format.margin, Rect::new(1.0, 6.0, 2.0, 5.0));
        assert_eq!(format.first_line_indent, 10.0);
        assert_eq!(format.leading, 14.0);
        assert!(format.rule_above.is_some());
        assert!(format.rule_below.is_none());
        assert_eq!(format.hj, None);
        assert_eq!(format.tab_stops.len(), 1);
    }
}
