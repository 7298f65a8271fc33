//! Fixed sizes, offsets and magic values of the document layout.

/// Size of one storage block.
pub const BLOCK_LENGTH: usize = 256;

/// Chain holding the global tables (fonts, colors, formats) and the pages.
pub const DOCUMENT_CHAIN_INDEX: u32 = 3;

/// Offset of the first record after the fixed header block.
pub const HEADER_END: u64 = 512;

/// Signature bytes at offset 3 of 3.x/4.x headers.
pub const SIGNATURE: &[u8; 3] = b"XPR";

/// Processor byte marking a little-endian (Intel) document.
pub const PROC_INTEL: u8 = b'I';

/// Processor byte marking a big-endian (Motorola) document.
pub const PROC_MOTOROLA: u8 = b'M';

/// Language byte of English documents.
pub const LANGUAGE_ENGLISH: u8 = 0x33;

/// Polygon records start with a fixed-size prefix before the vertices.
pub const POLYGON_PREFIX_LENGTH: u32 = 18;

/// Every 4.x line style entry occupies this many bytes.
pub const LINE_STYLE_ENTRY_LENGTH: u64 = 252;

/// Upper bound on dash segments in a line style.
pub const MAX_LINE_STYLE_SEGMENTS: u16 = 42;

/// Header offsets of 3.x documents.
pub mod qxp33 {
    pub const PAGES_OFFSET: u64 = 0x40;
}

/// Header offsets of 4.x documents.
pub mod qxp4 {
    pub const TYPE_OFFSET: u64 = 12;
    pub const INCREMENT_OFFSET: u64 = 0x52;
    pub const AUTO_LEADING_OFFSET: u64 = 0x58;
    pub const SEED_OFFSET: u64 = 0x80;
}
