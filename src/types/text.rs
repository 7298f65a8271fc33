//! Story text with its character and paragraph runs

use crate::document::StyleTables;
use crate::io::qxp::encoding::TextEncoding;

use super::style::{CharFormat, ParagraphFormat};

/// A `[start, start + length)` byte range inside a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSpec {
    pub start: usize,
    pub length: usize,
}

impl TextSpec {
    pub fn new(start: usize, length: usize) -> Self {
        TextSpec { start, length }
    }

    /// Index of the last byte covered.
    pub fn end_index(&self) -> usize {
        (self.start + self.length).saturating_sub(1)
    }

    /// First index after the range.
    pub fn after_end_index(&self) -> usize {
        self.start + self.length
    }

    pub fn overlaps(&self, other: &TextSpec) -> bool {
        self.start <= other.end_index() && other.start <= self.end_index()
    }
}

/// A run of text sharing one character format.
///
/// `format` indexes [`StyleTables::char_formats`]; `None` is the default format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharFormatSpec {
    pub spec: TextSpec,
    pub format: Option<usize>,
}

/// A paragraph and its format index into [`StyleTables::paragraph_formats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphSpec {
    pub spec: TextSpec,
    pub format: Option<usize>,
}

/// Raw story bytes in the document code page plus their runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub bytes: Vec<u8>,
    pub encoding: TextEncoding,
    pub char_formats: Vec<CharFormatSpec>,
    pub paragraphs: Vec<ParagraphSpec>,
}

impl Text {
    pub fn new(encoding: TextEncoding) -> Self {
        Text {
            bytes: Vec::new(),
            encoding,
            char_formats: Vec::new(),
            paragraphs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode `bytes[start..end]`, clamped to the story.
    pub fn decode(&self, start: usize, end: usize) -> String {
        let end = end.min(self.bytes.len());
        if start >= end {
            return String::new();
        }
        self.encoding.decode(&self.bytes[start..end])
    }

    /// Largest font size among runs that carry visible text.
    pub fn max_font_size(&self, tables: &StyleTables) -> f64 {
        self.char_formats
            .iter()
            .map(|cf| tables.char_format(cf.format))
            .filter(|f| !f.is_control_chars)
            .map(|f| f.font_size)
            .fold(0.0, f64::max)
    }

    /// Like [`max_font_size`](Self::max_font_size), restricted to runs
    /// overlapping `paragraph`.
    pub fn max_font_size_in(&self, paragraph: &ParagraphSpec, tables: &StyleTables) -> f64 {
        self.char_formats
            .iter()
            .filter(|cf| cf.spec.overlaps(&paragraph.spec))
            .map(|cf| tables.char_format(cf.format))
            .filter(|f| !f.is_control_chars)
            .map(|f| f.font_size)
            .fold(0.0, f64::max)
    }

    pub fn char_format<'a>(&self, spec: &CharFormatSpec, tables: &'a StyleTables) -> &'a CharFormat {
        tables.char_format(spec.format)
    }

    pub fn paragraph_format<'a>(
        &self,
        spec: &ParagraphSpec,
        tables: &'a StyleTables,
    ) -> &'a ParagraphFormat {
        tables.paragraph_format(spec.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_bounds() {
        let spec = TextSpec::new(10, 5);
        assert_eq!(spec.end_index(), 14);
        assert_eq!(spec.after_end_index(), 15);
    }

    #[test]
    fn test_overlaps() {
        let a = TextSpec::new(0, 10);
        assert!(a.overlaps(&TextSpec::new(9, 3)));
        assert!(!a.overlaps(&TextSpec::new(10, 3)));
        assert!(TextSpec::new(5, 1).overlaps(&a));
    }

    #[test]
    fn test_decode_clamps() {
        let mut text = Text::new(TextEncoding::Windows1252);
        text.bytes = b"Hello".to_vec();
        assert_eq!(text.decode(1, 99), "ello");
        assert_eq!(text.decode(4, 2), "");
    }

    #[test]
    fn test_max_font_size_ignores_control_runs() {
        let mut tables = StyleTables::default();
        let big = tables.push_char_format(CharFormat {
            font_size: 48.0,
            is_control_chars: true,
            ..Default::default()
        });
        let normal = tables.push_char_format(CharFormat {
            font_size: 18.0,
            ..Default::default()
        });
        let mut text = Text::new(TextEncoding::MacRoman);
        text.bytes = vec![b'a'; 20];
        text.char_formats = vec![
            CharFormatSpec {
                spec: TextSpec::new(0, 10),
                format: Some(big),
            },
            CharFormatSpec {
                spec: TextSpec::new(10, 10),
                format: Some(normal),
            },
        ];
        assert_eq!(text.max_font_size(&tables), 18.0);

        let first = ParagraphSpec {
            spec: TextSpec::new(0, 5),
            format: None,
        };
        assert_eq!(text.max_font_size_in(&first, &tables), 0.0);
    }
}
