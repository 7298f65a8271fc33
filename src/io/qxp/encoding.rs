//! Document code pages and their `encoding_rs` decoders.

use encoding_rs::Encoding;

/// 8-bit code page of a document's strings and story text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    #[default]
    MacRoman,
    Windows1252,
}

impl TextEncoding {
    /// Code page implied by the header.
    ///
    /// Documents saved on Windows are little-endian and use Windows-1252;
    /// Macintosh documents are big-endian and use MacRoman. The language byte
    /// does not change this for any language seen so far.
    pub fn for_document(little_endian: bool, _language: u8) -> Self {
        if little_endian {
            TextEncoding::Windows1252
        } else {
            TextEncoding::MacRoman
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        match self {
            TextEncoding::MacRoman => encoding_rs::MACINTOSH,
            TextEncoding::Windows1252 => encoding_rs::WINDOWS_1252,
        }
    }

    /// Decode bytes, substituting U+FFFD for unmappable input.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = self.encoding().decode_without_bom_handling(bytes);
        text.into_owned()
    }
}
