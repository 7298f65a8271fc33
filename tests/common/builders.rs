//! Byte-level builders for block-chained 3.3 and 4.x documents.
//!
//! Layout of a built document:
//!
//! - blocks 1-2: the fixed header
//! - block 3: start of the document chain, linking into a big-block run
//! - blocks 4..=18: the rest of the document chain
//! - blocks 19..: stories, one info block and one character block each
//!
//! Object headers are enciphered with the library's own ciphers, replaying
//! the decoder's sequence of seed steps.

#![allow(dead_code)]

use qxprust::io::qxp::{AdditiveCipher, Cipher, RotatingCipher};

pub const BLOCK: usize = 256;

/// Blocks reserved for the document chain.
const STREAM_BLOCKS: usize = 16;

/// First block after the document chain.
pub const FIRST_FREE_BLOCK: u32 = 3 + STREAM_BLOCKS as u32;

pub const SEED_33: u16 = 0x337c;
pub const INCREMENT_33: u16 = 0x3797;
pub const SEED_4: u16 = 0x3c3e;
pub const INCREMENT_4: u16 = 0xb3b7;

// ===========================================================================
// ByteWriter
// ===========================================================================

/// Big-endian byte sink with chainable writes.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// 16.16 fixed point
    pub fn fraction(&mut self, v: f64) -> &mut Self {
        self.i32((v * 65536.0) as i32)
    }

    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.data.resize(self.data.len() + n, 0);
        self
    }

    pub fn bytes(&mut self, b: &[u8]) -> &mut Self {
        self.data.extend_from_slice(b);
        self
    }

    /// `u32` length followed by `body`.
    pub fn record(&mut self, body: &[u8]) -> &mut Self {
        self.u32(body.len() as u32).bytes(body)
    }

    pub fn empty_record(&mut self) -> &mut Self {
        self.u32(0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

fn padded(mut data: Vec<u8>, len: usize) -> Vec<u8> {
    assert!(data.len() <= len, "{} bytes do not fit in {}", data.len(), len);
    data.resize(len, 0);
    data
}

// ===========================================================================
// Objects
// ===========================================================================

/// `[top, left, bottom, right]`
pub type Bounds = [f64; 4];

/// Objects the builders know how to encode.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Empty rectangle with a red fill
    Rect { bbox: Bounds },
    /// Rectangular text box. `content_index` is the story block for the
    /// chain head and the chain position for continuation boxes.
    TextBox {
        bbox: Bounds,
        link_id: u32,
        content_index: u32,
        offset: u32,
        next: u32,
    },
    Group { bbox: Bounds, elements: Vec<u32> },
}

impl Shape {
    pub fn rect(bbox: Bounds) -> Self {
        Shape::Rect { bbox }
    }

    /// Head of a text chain holding the story at `story`.
    pub fn text_head(bbox: Bounds, link_id: u32, story: u32, next: u32) -> Self {
        Shape::TextBox {
            bbox,
            link_id,
            content_index: story,
            offset: 0,
            next,
        }
    }

    /// Continuation box at chain position `index`, starting `offset`
    /// characters into the story.
    pub fn text_next(bbox: Bounds, link_id: u32, index: u32, offset: u32, next: u32) -> Self {
        Shape::TextBox {
            bbox,
            link_id,
            content_index: index,
            offset,
            next,
        }
    }

    pub fn group(bbox: Bounds, elements: &[u32]) -> Self {
        Shape::Group {
            bbox,
            elements: elements.to_vec(),
        }
    }

    fn content_index(&self) -> u32 {
        match self {
            Shape::TextBox { content_index, .. } => *content_index,
            _ => 0,
        }
    }

    fn link_id(&self) -> u32 {
        match self {
            Shape::TextBox { link_id, .. } => *link_id,
            _ => 0,
        }
    }
}

// ===========================================================================
// DocumentBuilder
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Qxp33,
    Qxp4,
}

/// Assembles a complete payload: header, document chain and stories.
pub struct DocumentBuilder {
    flavor: Flavor,
    seed: u16,
    increment: u16,
    type_code: [u8; 2],
    pages: u16,
    stream: ByteWriter,
    blocks: Vec<Vec<u8>>,
    additive: AdditiveCipher,
    rotating: RotatingCipher,
}

impl DocumentBuilder {
    fn new(flavor: Flavor, seed: u16, increment: u16) -> Self {
        DocumentBuilder {
            flavor,
            seed,
            increment,
            type_code: *b"DC",
            pages: 0,
            stream: ByteWriter::new(),
            blocks: Vec::new(),
            additive: AdditiveCipher::new(seed, increment),
            rotating: RotatingCipher::new(seed, increment),
        }
    }

    pub fn qxp33() -> Self {
        Self::new(Flavor::Qxp33, SEED_33, INCREMENT_33)
    }

    pub fn qxp4() -> Self {
        Self::new(Flavor::Qxp4, SEED_4, INCREMENT_4)
    }

    pub fn with_cipher(mut self, seed: u16, increment: u16) -> Self {
        self.seed = seed;
        self.increment = increment;
        self.additive = AdditiveCipher::new(seed, increment);
        self.rotating = RotatingCipher::new(seed, increment);
        self
    }

    /// Two-letter 4.x type code, `DC` by default.
    pub fn with_type_code(mut self, code: &[u8; 2]) -> Self {
        self.type_code = *code;
        self
    }

    fn is_qxp4(&self) -> bool {
        self.flavor == Flavor::Qxp4
    }

    // -----------------------------------------------------------------------
    // Global pass
    // -----------------------------------------------------------------------

    /// Empty tables in the order the global pass reads them.
    pub fn globals(&mut self) -> &mut Self {
        let w = &mut self.stream;
        match self.flavor {
            Flavor::Qxp33 => {
                for _ in 0..4 {
                    w.empty_record();
                }
                // fonts, count 0
                w.record(&[0, 0]);
                w.empty_record();
                // colors: skip 1, count 0, skip 32
                w.record(&[0; 34]);
                w.empty_record().empty_record();
                // hjs
                w.empty_record();
                w.empty_record();
                // char and paragraph formats
                w.empty_record().empty_record();
                w.empty_record();
            }
            Flavor::Qxp4 => {
                for _ in 0..5 {
                    w.empty_record();
                }
                w.record(&[0, 0]);
                w.empty_record();
                // colors with no blocks
                w.record(&[0; 16]);
                // paragraph stylesheets
                w.empty_record();
                w.empty_record();
                // hjs, line styles
                w.empty_record().empty_record();
                w.empty_record();
                // templates index: length 4, count 0
                w.u32(4).u32(0);
                // char formats, tab stops, paragraph formats
                w.empty_record().empty_record().empty_record();
                w.empty_record();
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Stories
    // -----------------------------------------------------------------------

    /// Append a raw block after the document chain and return its index.
    pub fn add_block(&mut self, data: Vec<u8>) -> u32 {
        let index = FIRST_FREE_BLOCK + self.blocks.len() as u32;
        self.blocks.push(padded(data, BLOCK));
        index
    }

    /// Append a story whose runs all use format 0 and return the index of
    /// its info chain.
    pub fn story(&mut self, text: &[u8], char_runs: &[u32], paragraph_runs: &[u32]) -> u32 {
        let info_index = FIRST_FREE_BLOCK + self.blocks.len() as u32;
        let chars_index = info_index + 1;
        let wide = self.is_qxp4();

        let mut info = ByteWriter::new();
        info.zeros(4);
        if wide {
            info.u32(8).u32(chars_index).u32(text.len() as u32);
        } else {
            info.u32(6).u32(chars_index).u16(text.len() as u16);
        }
        for runs in [char_runs, paragraph_runs] {
            let entry = if wide { 8 } else { 6 };
            info.u32((runs.len() * entry) as u32);
            for &length in runs {
                if wide {
                    info.u32(0);
                } else {
                    info.u16(0);
                }
                info.u32(length);
            }
        }

        let mut block = padded(info.finish(), BLOCK - 4);
        // end of chain
        block.extend_from_slice(&0i32.to_be_bytes());
        self.add_block(block);
        self.add_block(text.to_vec());
        info_index
    }

    /// Story of a single paragraph and a single character run.
    pub fn plain_story(&mut self, text: &[u8]) -> u32 {
        let length = text.len() as u32;
        self.story(text, &[length], &[length])
    }

    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    /// A single-sided page spanning `bounds`, followed by its objects.
    pub fn page(&mut self, bounds: Bounds, objects: &[Shape]) -> &mut Self {
        self.pages += 1;
        let qxp4 = self.is_qxp4();
        let count = objects.len() as u16;

        let w = &mut self.stream;
        w.zeros(6).u16(1).zeros(2);
        for v in bounds {
            w.fraction(v);
        }
        w.zeros(36).zeros(if qxp4 { 12 } else { 8 });
        for _ in 0..2 {
            w.u32(0).zeros(4);
        }
        // page name
        w.u32(0);

        if qxp4 {
            w.u32(self.rotating.apply_u16(count) as u32);
            self.rotating.advance_reverse();
        } else {
            w.u32(count as u32);
        }

        for object in objects {
            match self.flavor {
                Flavor::Qxp33 => self.object_33(object),
                Flavor::Qxp4 => self.object_4(object),
            }
        }
        self
    }

    fn object_33(&mut self, object: &Shape) {
        let (content, shape, bbox) = match object {
            Shape::Rect { bbox } => (2, 2, bbox),
            Shape::TextBox { bbox, .. } => (3, 2, bbox),
            Shape::Group { bbox, .. } => (1, 2, bbox),
        };
        let content_index = object.content_index();
        let cipher = self.additive;

        let w = &mut self.stream;
        w.u8(cipher.apply_u8(0)).u8(2).fraction(1.0);
        w.u32(cipher.apply_u16(content_index as u16) as u32);
        w.u8(0).u8(0);
        w.fraction(0.0).fraction(0.0);
        w.u32(object.link_id()).u32(0).zeros(4);
        w.u8(0).u8(0);
        w.u8(content).u8(shape);
        w.fraction(0.0);
        for &v in bbox {
            w.fraction(v);
        }

        match object {
            Shape::Rect { .. } => {
                frame_33(w);
                w.zeros(4).u32(0).zeros(74);
            }
            Shape::TextBox { offset, next, .. } => {
                frame_33(w);
                w.zeros(4).u32(0).u32(*offset).zeros(4);
                for _ in 0..7 {
                    w.fraction(0.0);
                }
                w.u8(1).u8(0).zeros(8);
                w.u32(*next).zeros(8);
                if content_index == 0 || *offset == 0 {
                    w.zeros(4).u32(0).zeros(4);
                    if content_index == 0 {
                        w.zeros(12);
                    }
                }
            }
            Shape::Group { elements, .. } => {
                w.zeros(10).u16(elements.len() as u16).zeros(6);
                for &e in elements {
                    w.u32(e);
                }
            }
        }

        self.additive.advance();
    }

    fn object_4(&mut self, object: &Shape) {
        let (content, shape): (u8, u8) = match object {
            Shape::Rect { .. } => (0, 5),
            Shape::TextBox { .. } => (3, 5),
            Shape::Group { .. } => (2, 5),
        };
        let content_index = object.content_index();

        let stored_content = self.rotating.apply_u8(content);
        self.rotating.advance_shift(content as u16);
        let stored_index = self.rotating.apply_u16(content_index as u16);
        let stored_shape = self.rotating.apply_u8(shape);

        let w = &mut self.stream;
        w.u8(0).u8(0).u16(2).fraction(1.0).zeros(4);
        w.u32(stored_index as u32);
        w.fraction(0.0).fraction(0.0);
        w.u32(object.link_id()).u32(0).u32(0).zeros(4);
        w.zeros(2);
        w.u8(stored_content).u8(stored_shape);

        match object {
            Shape::Rect { bbox } => box_body_4(w, bbox),
            Shape::TextBox {
                bbox, offset, next, ..
            } => {
                box_body_4(w, bbox);
                w.u32(*offset).zeros(2);
                w.zeros(2);
                for _ in 0..7 {
                    w.fraction(0.0);
                }
                w.u8(1).u8(0).zeros(10);
                w.u32(*next).zeros(4);
                w.zeros(12);
                if content_index == 0 || *offset == 0 {
                    w.zeros(4).u32(0).zeros(4);
                    if content_index == 0 {
                        w.zeros(16);
                    }
                }
            }
            Shape::Group { bbox, elements } => {
                w.zeros(68);
                for &v in bbox {
                    w.fraction(v);
                }
                w.zeros(24).u16(elements.len() as u16).zeros(10);
                for &e in elements {
                    w.u32(e);
                }
            }
        }

        self.rotating.advance(content_index as u16);
    }

    /// Raw bytes appended to the document chain.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.stream.bytes(bytes);
        self
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    fn header(&self) -> Vec<u8> {
        let mut h = vec![0u8; 512];
        h[2] = b'M';
        h[4..7].copy_from_slice(b"XPR");
        h[7] = 0x33;
        let put16 = |h: &mut Vec<u8>, at: usize, v: u16| {
            h[at..at + 2].copy_from_slice(&v.to_be_bytes());
        };

        match self.flavor {
            Flavor::Qxp33 => {
                put16(&mut h, 8, 0x3f);
                put16(&mut h, 0x40, self.pages);
                // seed and increment follow the script fractions
                let seed_at = 0x40 + 2 + 51 + 1 + 6 + 4 + 84 + 32 + 28;
                put16(&mut h, seed_at, self.seed);
                put16(&mut h, seed_at + 2, self.increment);
            }
            Flavor::Qxp4 => {
                put16(&mut h, 8, 0x41);
                h[12..14].copy_from_slice(&self.type_code);
                let pages = (self.pages & 0xfffc) | ((self.pages & 0x3) ^ 0x3);
                let stored = RotatingCipher::new(self.seed, self.increment).apply_u16(pages);
                put16(&mut h, 34, stored);
                put16(&mut h, 0x52, self.increment);
                put16(&mut h, 0x80, self.seed);
            }
        }
        h
    }

    pub fn build(&mut self) -> Vec<u8> {
        let stream = self.stream.finish();
        let run = STREAM_BLOCKS - 1;
        let head_len = BLOCK - 4;
        let run_len = run * BLOCK - 6;
        assert!(
            stream.len() <= head_len + run_len,
            "document chain of {} bytes is too long",
            stream.len()
        );

        let mut data = self.header();

        let split = stream.len().min(head_len);
        data.extend(padded(stream[..split].to_vec(), head_len));
        // big-block run starting at block 4
        data.extend_from_slice(&(-4i32).to_be_bytes());

        data.extend_from_slice(&(run as u16).to_be_bytes());
        data.extend(padded(stream[split..].to_vec(), run_len));
        data.extend_from_slice(&0i32.to_be_bytes());

        for block in &self.blocks {
            data.extend_from_slice(block);
        }
        data
    }
}

fn frame_33(w: &mut ByteWriter) {
    w.fraction(0.0).fraction(1.0).u8(1).u8(0);
}

/// Frame, runaround, geometry and corner fields of a 4.x rectangle.
fn box_body_4(w: &mut ByteWriter, bbox: &Bounds) {
    w.fraction(0.0).fraction(1.0).u16(1).u16(0).fraction(1.0);
    // no arrows, bitmap frame
    w.u8(0).u8(1).u16(0);
    w.zeros(4);
    w.u8(0).zeros(39);
    w.zeros(4);
    for &v in bbox {
        w.fraction(v);
    }
    w.fraction(0.0).zeros(20);
}

/// Header of the given version word with an otherwise empty body.
pub fn bare_header(version: u16) -> Vec<u8> {
    let mut h = vec![0u8; 1024];
    h[2] = b'M';
    h[4..7].copy_from_slice(b"XPR");
    h[7] = 0x33;
    h[8..10].copy_from_slice(&version.to_be_bytes());
    h
}
