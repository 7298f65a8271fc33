//! Document-wide state shared by the decoders and the collector
//!
//! [`StyleTables`] is the arena every decoded record points into: text runs
//! hold a char/paragraph format index, frames and rules hold a line style
//! key. The tables are filled during the global pass and are read-only while
//! pages are decoded and composed.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;

use crate::types::{
    CharFormat, Color, HjRule, LineCap, LineJoin, LineStyle, ParagraphFormat, TabStop,
};

// ---------------------------------------------------------------------------
// Document type
// ---------------------------------------------------------------------------

/// Document subtype declared by the header or the enclosing container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentType {
    #[default]
    Unknown,
    Document,
    Template,
    Book,
    Library,
}

impl DocumentType {
    /// Only documents and templates carry pages this reader can compose.
    pub fn is_parsable(&self) -> bool {
        matches!(self, DocumentType::Document | DocumentType::Template)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentType::Unknown => "unknown",
            DocumentType::Document => "document",
            DocumentType::Template => "template",
            DocumentType::Book => "book",
            DocumentType::Library => "library",
        };
        f.write_str(name)
    }
}

/// Type and creator codes reported by the container that wrapped the payload
/// (Macintosh file info, resource fork or archive entry).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerInfo {
    pub type_code: String,
    pub creator: String,
}

impl ContainerInfo {
    pub fn new(type_code: impl Into<String>, creator: impl Into<String>) -> Self {
        ContainerInfo {
            type_code: type_code.into(),
            creator: creator.into(),
        }
    }

    /// Document type implied by a 3.x/4.x creator code.
    pub fn document_type(&self) -> Option<DocumentType> {
        if self.creator != "XPR3" {
            return None;
        }
        match self.type_code.as_str() {
            "XDOC" => Some(DocumentType::Document),
            "XTMP" => Some(DocumentType::Template),
            "XBOK" => Some(DocumentType::Book),
            "XLIB" => Some(DocumentType::Library),
            _ => None,
        }
    }

    /// 1.x files are only recognizable through their container.
    pub fn is_qxp1_document(&self) -> bool {
        self.creator == "XPRS" && self.type_code == "XDOC"
    }
}

// ---------------------------------------------------------------------------
// Document properties
// ---------------------------------------------------------------------------

/// Typographic defaults read from the header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentProperties {
    pub superscript_offset: f64,
    pub superscript_h_scale: f64,
    pub superscript_v_scale: f64,
    pub subscript_offset: f64,
    pub subscript_h_scale: f64,
    pub subscript_v_scale: f64,
    pub superior_h_scale: f64,
    pub superior_v_scale: f64,
    auto_leading: f64,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        DocumentProperties {
            superscript_offset: 1.0 / 3.0,
            superscript_h_scale: 1.0,
            superscript_v_scale: 1.0,
            subscript_offset: -1.0 / 3.0,
            subscript_h_scale: 1.0,
            subscript_v_scale: 1.0,
            superior_h_scale: 0.5,
            superior_v_scale: 0.5,
            auto_leading: 0.2,
        }
    }
}

impl DocumentProperties {
    pub fn auto_leading(&self) -> f64 {
        self.auto_leading
    }

    /// Values outside `[-63, 63]` are rejected and the previous value kept.
    pub fn set_auto_leading(&mut self, value: f64) -> bool {
        if !(-63.0..=63.0).contains(&value) {
            log::debug!("Invalid auto leading {}", value);
            return false;
        }
        self.auto_leading = value;
        true
    }

    /// Incremental auto leading adds a fixed amount in points; otherwise the
    /// value is a fraction of the font size.
    pub fn is_incremental_auto_leading(&self) -> bool {
        self.auto_leading < 0.0 || self.auto_leading > 1.0
    }
}

// ---------------------------------------------------------------------------
// Style tables
// ---------------------------------------------------------------------------

static DEFAULT_CHAR_FORMAT: Lazy<CharFormat> = Lazy::new(CharFormat::default);
static DEFAULT_PARAGRAPH_FORMAT: Lazy<ParagraphFormat> = Lazy::new(ParagraphFormat::default);

/// Name used for fonts missing from the font table.
pub const DEFAULT_FONT: &str = "Arial";

/// Global resources of a document
#[derive(Debug, Clone)]
pub struct StyleTables {
    pub fonts: IndexMap<i32, String>,
    pub colors: IndexMap<u32, Color>,
    pub line_styles: IndexMap<u32, LineStyle>,
    pub hjs: Vec<HjRule>,
    pub char_formats: Vec<CharFormat>,
    pub paragraph_formats: Vec<ParagraphFormat>,
    pub tab_stops: Vec<Vec<TabStop>>,
}

impl Default for StyleTables {
    fn default() -> Self {
        let colors = [
            Color::WHITE,
            Color::BLACK,
            Color::RED,
            Color::GREEN,
            Color::BLUE,
            Color::CYAN,
            Color::MAGENTA,
            Color::YELLOW,
            Color::REGISTRATION,
        ]
        .into_iter()
        .enumerate()
        .map(|(id, color)| (id as u32, color))
        .collect();

        let line_styles = [
            LineStyle::new(Vec::new(), true, 1.0, LineCap::Butt, LineJoin::Miter),
            LineStyle::new(vec![0.6, 0.4], true, 5.0, LineCap::Butt, LineJoin::Miter),
            LineStyle::new(vec![0.75, 0.25], true, 4.0, LineCap::Butt, LineJoin::Miter),
            LineStyle::new(
                vec![0.5455, 0.1818, 0.0909, 0.1818],
                true,
                11.0,
                LineCap::Butt,
                LineJoin::Miter,
            ),
            LineStyle::new(vec![0.0, 1.0], true, 2.0, LineCap::Round, LineJoin::Miter),
        ]
        .into_iter()
        .enumerate()
        .map(|(id, style)| (id as u32, style))
        .collect();

        StyleTables {
            fonts: IndexMap::new(),
            colors,
            line_styles,
            hjs: Vec::new(),
            char_formats: Vec::new(),
            paragraph_formats: Vec::new(),
            tab_stops: Vec::new(),
        }
    }
}

impl StyleTables {
    pub fn font(&self, index: i32) -> Option<&str> {
        self.fonts.get(&index).map(String::as_str)
    }

    pub fn color(&self, id: u32) -> Option<Color> {
        self.colors.get(&id).copied()
    }

    pub fn line_style(&self, id: u32) -> Option<&LineStyle> {
        self.line_styles.get(&id)
    }

    /// Resolve a char format index; `None` or a stale index yields the default.
    pub fn char_format(&self, index: Option<usize>) -> &CharFormat {
        index
            .and_then(|i| self.char_formats.get(i))
            .unwrap_or(&DEFAULT_CHAR_FORMAT)
    }

    pub fn paragraph_format(&self, index: Option<usize>) -> &ParagraphFormat {
        index
            .and_then(|i| self.paragraph_formats.get(i))
            .unwrap_or(&DEFAULT_PARAGRAPH_FORMAT)
    }

    pub fn hj(&self, index: Option<usize>) -> HjRule {
        index
            .and_then(|i| self.hjs.get(i))
            .copied()
            .unwrap_or_default()
    }

    /// Append a char format and return its index.
    pub fn push_char_format(&mut self, format: CharFormat) -> usize {
        self.char_formats.push(format);
        self.char_formats.len() - 1
    }

    pub fn push_paragraph_format(&mut self, format: ParagraphFormat) -> usize {
        self.paragraph_formats.push(format);
        self.paragraph_formats.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colors() {
        let tables = StyleTables::default();
        assert_eq!(tables.colors.len(), 9);
        assert_eq!(tables.color(0), Some(Color::WHITE));
        assert_eq!(tables.color(5), Some(Color::from_rgb(1, 160, 198)));
        assert_eq!(tables.color(6), Some(Color::from_rgb(239, 4, 127)));
        assert_eq!(tables.color(9), None);
    }

    #[test]
    fn test_default_line_styles() {
        let tables = StyleTables::default();
        assert_eq!(tables.line_styles.len(), 5);
        let dots = tables.line_style(4).unwrap();
        assert_eq!(dots.segment_lengths, vec![0.0, 1.0]);
        assert_eq!(dots.cap, LineCap::Round);
        assert_eq!(tables.line_style(3).unwrap().pattern_length, 11.0);
        assert!(tables.line_style(5).is_none());
    }

    #[test]
    fn test_format_fallbacks() {
        let mut tables = StyleTables::default();
        assert_eq!(tables.char_format(None).font_name, "Arial");
        assert_eq!(tables.char_format(Some(3)).font_size, 12.0);
        let idx = tables.push_char_format(CharFormat {
            font_size: 9.0,
            ..Default::default()
        });
        assert_eq!(tables.char_format(Some(idx)).font_size, 9.0);
        assert_eq!(tables.hj(Some(0)), HjRule::default());
    }

    #[test]
    fn test_auto_leading_range() {
        let mut props = DocumentProperties::default();
        assert!(!props.is_incremental_auto_leading());
        assert!(props.set_auto_leading(-2.0));
        assert!(props.is_incremental_auto_leading());
        assert!(!props.set_auto_leading(64.0));
        assert_eq!(props.auto_leading(), -2.0);
    }

    #[test]
    fn test_container_hint() {
        assert_eq!(
            ContainerInfo::new("XTMP", "XPR3").document_type(),
            Some(DocumentType::Template)
        );
        assert_eq!(ContainerInfo::new("XDOC", "XPRS").document_type(), None);
        assert!(ContainerInfo::new("XDOC", "XPRS").is_qxp1_document());
        assert!(!DocumentType::Book.is_parsable());
    }
}
