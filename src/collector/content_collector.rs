//! Buffering, linked-text resolution and page composition

use std::collections::BTreeMap;
use std::rc::Rc;

use ahash::AHashMap;

use crate::document::{DocumentProperties, StyleTables};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::geometry::{almost_zero, normalize_deg_angle};
use crate::types::{
    Arrow, BoxType, CharFlags, CharFormat, Fill, Frame, GradientType, Group, HorizontalAlignment,
    Line, LineCap, LinkedTextSettings, Object, Page, PageSettings, ParagraphFormat, ParagraphRule,
    ParagraphSpec, Point, ShapeBox, TabStopType, Text, TextBox, TextPath, TextPathAlignment,
    TextPathLineAlignment, VerticalAlignment,
};

use super::sink::{
    Border, BorderStyle, Dash, DashUnit, DocumentSink, Ellipse, GraphicFill, GraphicStyle,
    Hyphenation, Marker, Padding, ParagraphProps, PathCommand, SpanProps, Stroke, StrokeCap,
    TabAlign, TabProps, TextAlign, TextAreaAlign, TextObjectProps, TextPosition, UnderlineMode,
};
use super::Collector;

/// Z distance between consecutive objects; a text box uses two slots.
const Z_INDEX_STEP: i32 = 100;

/// Gap between a text box border and its text, in points.
const TEXT_BOX_LEFT_PADDING: f64 = 3.0;

// ---------------------------------------------------------------------------
// Buffered pages
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CollectedObject {
    object: Object,
    z: i32,
    processed: bool,
}

#[derive(Debug)]
struct CollectedPage {
    settings: PageSettings,
    /// Keyed by the object's index within its page (spread)
    objects: BTreeMap<u32, CollectedObject>,
    groups: Vec<u32>,
    linked: Vec<u32>,
}

impl CollectedPage {
    fn new(settings: PageSettings) -> Self {
        CollectedPage {
            settings,
            objects: BTreeMap::new(),
            groups: Vec::new(),
            linked: Vec::new(),
        }
    }

    fn x(&self, x: f64) -> f64 {
        x - self.settings.offset.left
    }

    fn y(&self, y: f64) -> f64 {
        y - self.settings.offset.top
    }

    fn point(&self, p: Point) -> Point {
        Point::new(self.x(p.x), self.y(p.y))
    }
}

// ---------------------------------------------------------------------------
// ContentCollector
// ---------------------------------------------------------------------------

/// Resolves linked text and composes pages onto a [`DocumentSink`].
///
/// Pages are buffered until every linked text object on them knows both
/// its story and its length. A link is resolvable once the box holding the
/// next position in the chain has been collected, which may be several pages
/// later. `end_document` flushes whatever is still pending.
///
/// Dropping a started collector ends the document, so a decoder that bails
/// out still gets its buffered pages drawn.
pub struct ContentCollector<'a> {
    sink: &'a mut dyn DocumentSink,
    document_started: bool,
    collecting_facing_page: bool,
    current_object_index: u32,
    pages: Vec<CollectedPage>,
    link_texts: AHashMap<u32, Rc<Text>>,
    /// `link_id -> linked_index -> offset_into_text`
    link_offsets: AHashMap<u32, AHashMap<u32, u32>>,
    properties: DocumentProperties,
    tables: Rc<StyleTables>,
    notifications: NotificationCollection,
}

impl<'a> ContentCollector<'a> {
    pub fn new(sink: &'a mut dyn DocumentSink) -> Self {
        ContentCollector {
            sink,
            document_started: false,
            collecting_facing_page: false,
            current_object_index: 0,
            pages: Vec::new(),
            link_texts: AHashMap::new(),
            link_offsets: AHashMap::new(),
            properties: DocumentProperties::default(),
            tables: Rc::new(StyleTables::default()),
            notifications: NotificationCollection::new(),
        }
    }

    /// Diagnostics gathered while composing.
    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> NotificationCollection {
        std::mem::take(&mut self.notifications)
    }

    fn insertion_page(&self, object: &Object) -> Option<usize> {
        let last = self.pages.len().checked_sub(1)?;
        if self.collecting_facing_page
            && last > 0
            && object.bbox().left < self.pages[last].settings.offset.left
        {
            Some(last - 1)
        } else {
            Some(last)
        }
    }

    fn add_object(&mut self, object: Object) -> Option<(usize, u32)> {
        let Some(page_index) = self.insertion_page(&object) else {
            self.notifications
                .notify(NotificationType::Warning, "Object collected outside of a page");
            return None;
        };
        let index = self.current_object_index;
        self.current_object_index += 1;
        self.pages[page_index].objects.insert(
            index,
            CollectedObject {
                object,
                z: 0,
                processed: false,
            },
        );
        Some((page_index, index))
    }

    fn collect_text_object(&mut self, mut object: Object, link: LinkedTextSettings) {
        if link.link_id == 0 {
            log::debug!("Collected text object with link ID 0");
        }
        if link.linked_index > 0 {
            self.link_offsets
                .entry(link.link_id)
                .or_default()
                .insert(link.linked_index, link.offset_into_text);
        }
        if object.text().is_none() {
            if let Some(text) = self.link_texts.get(&link.link_id) {
                object.set_text(Rc::clone(text));
            }
        }
        if let Some((page, index)) = self.add_object(object) {
            if link.is_linked() {
                self.pages[page].linked.push(index);
            }
        }
    }

    fn update_linked_texts(&mut self) {
        for page in self.pages.iter_mut() {
            for index in &page.linked {
                let Some(link) = page
                    .objects
                    .get_mut(index)
                    .and_then(|entry| entry.object.link_mut())
                else {
                    continue;
                };
                if link.next_linked_index == 0 || link.text_length.is_some() {
                    continue;
                }
                let next_offset = self
                    .link_offsets
                    .get(&link.link_id)
                    .and_then(|chain| chain.get(&link.next_linked_index));
                if let Some(next_offset) = next_offset {
                    link.text_length = Some(next_offset.wrapping_sub(link.offset_into_text));
                }
            }
        }
    }

    fn has_unfinished_linked_texts(&self) -> bool {
        self.pages.iter().any(|page| {
            page.linked
                .iter()
                .filter_map(|index| page.objects.get(index))
                .any(|entry| {
                    entry.object.text().is_none()
                        || entry
                            .object
                            .link()
                            .is_some_and(|l| l.next_linked_index > 0 && l.text_length.is_none())
                })
        })
    }

    fn draw(&mut self, force: bool) {
        self.update_linked_texts();

        if self.has_unfinished_linked_texts() {
            if !force {
                return;
            }
            self.notifications.notify(
                NotificationType::Warning,
                "Drawing pages with unresolved linked text",
            );
        }

        for mut page in std::mem::take(&mut self.pages) {
            self.sink
                .start_page(page.settings.offset.width(), page.settings.offset.height());

            let mut z = 0;
            for entry in page.objects.values_mut().rev() {
                entry.z = z;
                z += Z_INDEX_STEP;
            }

            for index in page.groups.clone() {
                self.draw_object(&mut page, index);
            }
            let indices: Vec<u32> = page.objects.keys().copied().collect();
            for index in indices {
                self.draw_object(&mut page, index);
            }

            self.sink.end_page();
        }
    }

    // -----------------------------------------------------------------------
    // Shapes
    // -----------------------------------------------------------------------

    fn draw_object(&mut self, page: &mut CollectedPage, index: u32) {
        match page.objects.get_mut(&index) {
            Some(entry) if !entry.processed => entry.processed = true,
            _ => return,
        }

        let elements = match &page.objects[&index].object {
            Object::Group(group) => Some(group.elements.clone()),
            _ => None,
        };
        match elements {
            Some(elements) => self.draw_group(page, &elements),
            None => {
                let entry = &page.objects[&index];
                self.draw_shape(&entry.object, entry.z, page);
            }
        }
    }

    fn draw_group(&mut self, page: &mut CollectedPage, elements: &[u32]) {
        let mut opened = false;
        for &index in elements {
            let Some(child) = page.objects.get(&index) else {
                self.notifications.notify(
                    NotificationType::Warning,
                    format!("Group element {} not found", index),
                );
                continue;
            };
            if !opened {
                self.sink.open_group(child.z - 1);
                opened = true;
            }
            self.draw_object(page, index);
        }
        if opened {
            self.sink.close_group();
        }
    }

    fn draw_shape(&mut self, object: &Object, z: i32, page: &CollectedPage) {
        match object {
            Object::Line(line) => self.draw_line(line, z, page),
            Object::Box(shape) => self.draw_box(shape, z, page),
            Object::TextBox(text_box) => self.draw_text_box(text_box, z, page),
            Object::TextPath(text_path) => self.draw_text_path(text_path, z, page),
            Object::Group(_) => {}
        }
    }

    fn draw_line(&mut self, line: &Line, z: i32, page: &CollectedPage) {
        let center = line.bbox.center();
        let mut path = Vec::new();
        if line.curve_components.is_empty() {
            path.push(PathCommand::MoveTo(
                page.point(line.bbox.top_left().rotate_deg(-line.rotation, center)),
            ));
            path.push(PathCommand::LineTo(
                page.point(line.bbox.bottom_right().rotate_deg(-line.rotation, center)),
            ));
        } else {
            for curve in &line.curve_components {
                let points: Vec<Point> = curve
                    .points
                    .iter()
                    .map(|p| page.point(p.rotate_deg(-line.rotation, center)))
                    .collect();
                add_bezier_path(&mut path, &points, false);
            }
        }

        let style = GraphicStyle {
            stroke: stroke_style(&line.style, true, &self.tables),
            fill: None,
            wrap: line.runaround,
        };
        self.sink.draw_path(&path, &style, z);
    }

    fn draw_box(&mut self, shape: &ShapeBox, z: i32, page: &CollectedPage) {
        let style = shape_style(shape, &self.tables);
        match shape.box_type {
            BoxType::Rectangle => {
                let bbox = shape.bbox.shrink(shape.frame.width / 2.0);
                let mut points = [
                    page.point(bbox.top_left()),
                    page.point(bbox.top_right()),
                    page.point(bbox.bottom_right()),
                    page.point(bbox.bottom_left()),
                ];
                if !almost_zero(shape.rotation) {
                    let center = page.point(shape.bbox.center());
                    for p in points.iter_mut() {
                        *p = p.rotate_deg(-shape.rotation, center);
                    }
                }
                self.sink.draw_path(&line_path(&points, true), &style, z);
            }
            BoxType::Oval => {
                let center = shape.bbox.center();
                let ellipse = Ellipse {
                    center: page.point(center),
                    rx: shape.bbox.width() / 2.0 - shape.frame.width / 2.0,
                    ry: shape.bbox.height() / 2.0 - shape.frame.width / 2.0,
                    rotation: (!almost_zero(shape.rotation)).then_some(shape.rotation),
                };
                self.sink.draw_ellipse(&ellipse, &style, z);
            }
            BoxType::Polygon => {
                let center = shape.bbox.center();
                let points: Vec<Point> = shape
                    .custom_points
                    .iter()
                    .map(|p| page.point(p.rotate_deg(-shape.rotation, center)))
                    .collect();
                self.sink.draw_path(&line_path(&points, true), &style, z);
            }
            BoxType::Bezier => {
                let center = shape.bbox.center();
                let mut path = Vec::new();
                for curve in &shape.curve_components {
                    let points: Vec<Point> = curve
                        .points
                        .iter()
                        .map(|p| page.point(p.rotate_deg(-shape.rotation, center)))
                        .collect();
                    add_bezier_path(&mut path, &points, true);
                }
                self.sink.draw_path(&path, &style, z);
            }
        }
    }

    fn draw_text_box(&mut self, text_box: &TextBox, z: i32, page: &CollectedPage) {
        let shape = &text_box.shape;
        self.draw_box(shape, z, page);

        let bbox = shape.bbox.shrink(shape.frame.width);
        let vertical_align = match text_box.settings.vertical_alignment {
            VerticalAlignment::Top => TextAreaAlign::Top,
            VerticalAlignment::Center => TextAreaAlign::Middle,
            VerticalAlignment::Bottom => TextAreaAlign::Bottom,
            VerticalAlignment::Justified => TextAreaAlign::Justify,
        };
        let props = TextObjectProps {
            x: page.x(bbox.left),
            y: page.y(bbox.top),
            width: bbox.width(),
            height: bbox.height(),
            padding: Padding {
                left: TEXT_BOX_LEFT_PADDING,
                ..Padding::default()
            },
            vertical_align: Some(vertical_align),
            rotation: (!almost_zero(shape.rotation)).then_some(-shape.rotation),
            z: z + 1,
        };

        self.sink.start_text_object(&props);
        if let Some(text) = &text_box.text {
            self.draw_text(text, &text_box.link);
        }
        self.sink.end_text_object();
    }

    fn draw_text_path(&mut self, text_path: &TextPath, z: i32, page: &CollectedPage) {
        let line = &text_path.line;
        self.draw_line(line, z, page);

        let Some(text) = &text_path.text else {
            return;
        };

        let line_y = match text_path.settings.line_alignment {
            TextPathLineAlignment::Top => line.bbox.top - line.style.width / 2.0,
            TextPathLineAlignment::Center => line.bbox.top,
            TextPathLineAlignment::Bottom => line.bbox.top + line.style.width / 2.0,
        };
        let height = text.max_font_size(&self.tables);
        let text_y = match text_path.settings.alignment {
            TextPathAlignment::Descent | TextPathAlignment::Baseline => line_y - height,
            TextPathAlignment::Center => line_y - height / 2.0,
            TextPathAlignment::Ascent => line_y,
        };

        let props = TextObjectProps {
            x: page.x(line.bbox.left),
            y: page.y(text_y),
            width: line.bbox.width() + height,
            height,
            padding: Padding::default(),
            vertical_align: None,
            rotation: (!almost_zero(line.rotation)).then_some(-line.rotation),
            z: z + 1,
        };

        self.sink.start_text_object(&props);
        self.draw_text(text, &text_path.link);
        self.sink.end_text_object();
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    fn draw_text(&mut self, text: &Text, link: &LinkedTextSettings) {
        let tables = Rc::clone(&self.tables);
        let mut start = link.offset_into_text as usize;
        let text_end = match link.text_length {
            Some(length) => start.saturating_add(length as usize),
            None => text.len(),
        };

        let mut paragraph_index = 0;
        for paragraph in &text.paragraphs {
            if paragraph.spec.start >= text_end {
                break;
            }
            if start > paragraph.spec.end_index() {
                continue;
            }

            let format = tables.paragraph_format(paragraph.format);
            let props = self.paragraph_props(
                text,
                paragraph,
                format,
                &tables,
                paragraph_index,
                text.paragraphs.len(),
            );
            self.sink.open_paragraph(&props);

            for run in &text.char_formats {
                if start > paragraph.spec.end_index()
                    || start >= text_end
                    || run.spec.start > paragraph.spec.end_index()
                    || run.spec.start >= text_end
                {
                    break;
                }
                if start > run.spec.end_index() {
                    continue;
                }
                if start >= text.len() {
                    log::debug!("Span start {} out of range", start);
                    break;
                }

                let span_end = run
                    .spec
                    .after_end_index()
                    .min(paragraph.spec.after_end_index())
                    .min(text.len())
                    .min(text_end);

                let char_format = tables.char_format(run.format);
                if char_format.is_control_chars {
                    start = span_end;
                    continue;
                }

                let span = self.span_props(char_format, format, &tables);
                self.sink.open_span(&span);
                insert_text(&mut *self.sink, &text.decode(start, span_end));
                self.sink.close_span();

                start = span_end;
            }

            self.sink.close_paragraph();
            paragraph_index += 1;
        }
    }

    fn paragraph_props(
        &self,
        text: &Text,
        paragraph: &ParagraphSpec,
        format: &ParagraphFormat,
        tables: &StyleTables,
        index: usize,
        count: usize,
    ) -> ParagraphProps {
        let line_height = if !almost_zero(format.leading) && !format.incremental_leading {
            format.leading
        } else {
            let font_size = text.max_font_size_in(paragraph, tables);
            let auto = self.properties.auto_leading();
            let initial = if self.properties.is_incremental_auto_leading() {
                font_size + auto
            } else {
                font_size + font_size * auto
            };
            initial + format.leading
        };

        let align = match format.alignment {
            HorizontalAlignment::Left => TextAlign::Left,
            HorizontalAlignment::Right => TextAlign::End,
            HorizontalAlignment::Center => TextAlign::Center,
            HorizontalAlignment::Justified | HorizontalAlignment::Forced => TextAlign::Justify,
        };

        let hyphenation = format.hj.map(|_| {
            let hj = tables.hj(format.hj);
            Hyphenation {
                hyphenate: hj.hyphenate,
                ladder_count: (hj.max_in_row != 0).then_some(hj.max_in_row),
                justify_single_word: hj.single_word_justify,
            }
        });

        let tab_stops = format
            .tab_stops
            .iter()
            .map(|tab| TabProps {
                position: tab.position,
                leader: tab.fill_char,
                align: match tab.tab_type {
                    TabStopType::Left => TabAlign::Left,
                    TabStopType::Right => TabAlign::Right,
                    TabStopType::Center => TabAlign::Center,
                    TabStopType::Align => TabAlign::Char(tab.align_char),
                },
            })
            .collect();

        ParagraphProps {
            margin_top: format.margin.top,
            margin_right: format.margin.right,
            margin_bottom: format.margin.bottom,
            margin_left: format.margin.left,
            text_indent: format.first_line_indent,
            line_height,
            align,
            hyphenation,
            tab_stops,
            border_top: format
                .rule_above
                .filter(|_| index > 0)
                .map(|rule| paragraph_border(&rule, tables)),
            border_bottom: format
                .rule_below
                .filter(|_| index + 1 < count)
                .map(|rule| paragraph_border(&rule, tables)),
        }
    }

    fn span_props(
        &self,
        format: &CharFormat,
        paragraph: &ParagraphFormat,
        tables: &StyleTables,
    ) -> SpanProps {
        let props = &self.properties;
        let shift = format.baseline_shift;

        let (position, text_scale) = if format.has(CharFlags::SUBSCRIPT) {
            (
                Some(TextPosition {
                    offset: props.subscript_offset + shift,
                    scale: props.subscript_v_scale,
                }),
                Some(props.subscript_h_scale),
            )
        } else if format.has(CharFlags::SUPERSCRIPT) {
            (
                Some(TextPosition {
                    offset: props.superscript_offset + shift,
                    scale: props.superscript_v_scale,
                }),
                Some(props.superscript_h_scale),
            )
        } else if format.has(CharFlags::SUPERIOR) {
            // glyph tops line up with the cap height of the full-size font
            (
                Some(TextPosition {
                    offset: 1.0 - props.superior_v_scale + shift,
                    scale: props.superior_v_scale,
                }),
                Some(props.superior_h_scale),
            )
        } else if shift != 0.0 {
            (
                Some(TextPosition {
                    offset: shift,
                    scale: 1.0,
                }),
                None,
            )
        } else {
            (None, None)
        };

        let underline = if format.has(CharFlags::WORD_UNDERLINE) {
            Some(UnderlineMode::SkipWhiteSpace)
        } else if format.has(CharFlags::UNDERLINE) {
            Some(UnderlineMode::Continuous)
        } else {
            None
        };

        let hj = paragraph.hj.map(|_| tables.hj(paragraph.hj));

        SpanProps {
            font_name: format.font_name.clone(),
            font_size: format.font_size.max(1.0),
            bold: format.has(CharFlags::BOLD),
            italic: format.has(CharFlags::ITALIC),
            underline,
            strike: format.has(CharFlags::STRIKE),
            small_caps: format.has(CharFlags::SMALL_CAPS),
            capitalize: format.has(CharFlags::ALL_CAPS),
            outline: format.has(CharFlags::OUTLINE),
            shadow: format.has(CharFlags::SHADOW),
            color: format.color,
            position,
            text_scale,
            hyphenation_remain: hj.map(|hj| hj.min_before.max(1)),
            hyphenation_push: hj.map(|hj| hj.min_after.max(1)),
        }
    }
}

impl Collector for ContentCollector<'_> {
    fn start_document(&mut self) {
        if self.document_started {
            return;
        }
        self.sink.start_document();
        self.document_started = true;
    }

    fn end_document(&mut self) {
        if !self.document_started {
            return;
        }
        if !self.pages.is_empty() {
            self.end_page();
        }
        if !self.pages.is_empty() {
            self.draw(true);
        }
        self.sink.end_document();
        self.document_started = false;
    }

    fn collect_document_properties(&mut self, properties: &DocumentProperties) {
        self.properties = *properties;
    }

    fn collect_style_tables(&mut self, tables: Rc<StyleTables>) {
        self.tables = tables;
    }

    fn start_page(&mut self, page: &Page) {
        if page.settings.is_empty() {
            self.pages.push(CollectedPage::new(PageSettings::default()));
        }
        for settings in page.settings.iter().take(2) {
            self.pages.push(CollectedPage::new(*settings));
        }
        self.collecting_facing_page = page.is_facing();
        self.current_object_index = 0;
    }

    fn end_page(&mut self) {
        if !self.pages.is_empty() {
            self.draw(false);
        }
    }

    fn collect_line(&mut self, line: Line) {
        self.add_object(Object::Line(line));
    }

    fn collect_box(&mut self, shape: ShapeBox) {
        self.add_object(Object::Box(shape));
    }

    fn collect_text_box(&mut self, text_box: TextBox) {
        let link = text_box.link;
        self.collect_text_object(Object::TextBox(text_box), link);
    }

    fn collect_text_path(&mut self, text_path: TextPath) {
        let link = text_path.link;
        self.collect_text_object(Object::TextPath(text_path), link);
    }

    fn collect_group(&mut self, group: Group) {
        if let Some((page, index)) = self.add_object(Object::Group(group)) {
            self.pages[page].groups.push(index);
        }
    }

    fn collect_text(&mut self, text: Rc<Text>, link_id: u32) {
        for page in self.pages.iter_mut() {
            for entry in page.objects.values_mut() {
                let waiting = entry.object.text().is_none()
                    && entry.object.link().is_some_and(|l| l.link_id == link_id);
                if waiting {
                    entry.object.set_text(Rc::clone(&text));
                }
            }
        }
        self.link_texts.insert(link_id, text);
    }
}

impl Drop for ContentCollector<'_> {
    fn drop(&mut self) {
        self.end_document();
    }
}

// ---------------------------------------------------------------------------
// Style helpers
// ---------------------------------------------------------------------------

fn marker(arrow: Arrow, stroke_width: f64) -> Marker {
    Marker {
        viewbox: arrow.viewbox(),
        path: arrow.path(),
        width: stroke_width * arrow.scale(),
    }
}

/// Stroke of a frame; hairlines (zero width) are only painted for lines.
fn stroke_style(frame: &Frame, allow_hairline: bool, tables: &StyleTables) -> Option<Stroke> {
    let color = frame.color?;
    if !allow_hairline && almost_zero(frame.width) {
        return None;
    }

    let mut stroke = Stroke {
        color,
        width: frame.width,
        dash: None,
        cap: None,
        join: None,
        start_marker: frame.start_arrow.map(|a| marker(a, frame.width)),
        end_marker: frame.end_arrow.map(|a| marker(a, frame.width)),
    };

    if let Some(style) = frame.line_style.and_then(|id| tables.line_style(id)) {
        let segments = &style.segment_lengths;
        if segments.len() > 1 && !style.is_stripe {
            let (scale, unit) = if style.is_proportional {
                (style.pattern_length, DashUnit::Percent)
            } else {
                (1.0, DashUnit::Point)
            };
            let dots2 = if segments.len() >= 3 { segments[2] } else { segments[0] };
            stroke.dash = Some(Dash {
                dots1_length: segments[0] * scale,
                dots2_length: dots2 * scale,
                distance: segments[1] * scale,
                unit,
            });
        }
        stroke.cap = Some(match style.cap {
            LineCap::Round => StrokeCap::Round,
            LineCap::Rect => StrokeCap::Square,
            LineCap::Butt | LineCap::Stretch => StrokeCap::Butt,
        });
        stroke.join = Some(style.join);
    }

    Some(stroke)
}

fn graphic_fill(fill: &Fill) -> GraphicFill {
    let gradient = match fill {
        Fill::Solid(color) => return GraphicFill::Solid(*color),
        Fill::Gradient(gradient) => gradient,
    };
    let (start, end) = (gradient.color1, gradient.color2);
    match gradient.gradient_type {
        GradientType::Linear | GradientType::MidLinear => GraphicFill::Linear {
            start,
            end,
            angle: normalize_deg_angle(gradient.angle + 90.0) as i32,
        },
        GradientType::Circular | GradientType::FullCircular => GraphicFill::Radial {
            start,
            end,
            cx: 0.5,
            cy: 0.5,
            border: if gradient.gradient_type == GradientType::Circular {
                0.25
            } else {
                0.0
            },
            angle: normalize_deg_angle(gradient.angle) as i32,
        },
        GradientType::Rectangular | GradientType::Diamond => GraphicFill::Square {
            start,
            end,
            cx: 0.5,
            cy: 0.5,
            border: 0.0,
            angle: normalize_deg_angle(gradient.angle) as i32,
        },
    }
}

fn shape_style(shape: &ShapeBox, tables: &StyleTables) -> GraphicStyle {
    GraphicStyle {
        stroke: stroke_style(&shape.frame, false, tables),
        fill: shape.fill.as_ref().map(graphic_fill),
        wrap: shape.runaround,
    }
}

fn paragraph_border(rule: &ParagraphRule, tables: &StyleTables) -> Border {
    let style = match rule.line_style.and_then(|id| tables.line_style(id)) {
        Some(style) if style.is_stripe => BorderStyle::Double,
        Some(style) if style.segment_lengths.len() == 2 => BorderStyle::Dotted,
        Some(style) if style.segment_lengths.len() > 2 => BorderStyle::Dashed,
        _ => BorderStyle::Solid,
    };
    Border {
        width: rule.width,
        style,
        color: rule.color,
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn line_path(points: &[Point], closed: bool) -> Vec<PathCommand> {
    let mut path: Vec<PathCommand> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 {
                PathCommand::MoveTo(*p)
            } else {
                PathCommand::LineTo(*p)
            }
        })
        .collect();
    if closed {
        path.push(PathCommand::Close);
    }
    path
}

/// Append one curve component. Points come in (control, anchor, control)
/// triples starting with the incoming control of the first anchor.
fn add_bezier_path(path: &mut Vec<PathCommand>, points: &[Point], can_be_closed: bool) {
    if points.len() < 6 {
        log::debug!("Not enough bezier points, {}", points.len());
        return;
    }

    path.push(PathCommand::MoveTo(points[1]));
    path.push(PathCommand::CurveTo {
        c1: points[2],
        c2: points[3],
        end: points[4],
    });

    for i in (6..points.len()).step_by(3) {
        if i + 1 >= points.len() {
            log::debug!("Unexpected end of bezier points, {} / {}", i, points.len());
            break;
        }
        path.push(PathCommand::SmoothCurveTo {
            c1: points[i],
            c2: points[3],
            end: points[i + 1],
        });
    }

    if can_be_closed && points[1] == points[points.len() - 2] {
        path.push(PathCommand::Close);
    }
}

/// Feed decoded text to the sink, turning line feeds, tabs and runs of
/// spaces into explicit calls. Carriage returns are dropped.
fn insert_text(sink: &mut dyn DocumentSink, text: &str) {
    fn flush(sink: &mut dyn DocumentSink, current: &mut String) {
        if !current.is_empty() {
            sink.insert_text(current);
            current.clear();
        }
    }

    let mut was_space = false;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '\r' => was_space = false,
            '\n' => {
                was_space = false;
                flush(sink, &mut current);
                sink.insert_line_break();
            }
            '\t' => {
                was_space = false;
                flush(sink, &mut current);
                sink.insert_tab();
            }
            ' ' if was_space => {
                flush(sink, &mut current);
                sink.insert_space();
            }
            ' ' => {
                was_space = true;
                current.push(' ');
            }
            _ => {
                was_space = false;
                current.push(c);
            }
        }
    }
    flush(sink, &mut current);
}
