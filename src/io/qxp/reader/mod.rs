//! Record decoders and the top-level reader.
//!
//! - [`common`] — the decoding context and record primitives shared by all
//!   versions
//! - [`text_reader`] — story chains
//! - [`qxp1_reader`], [`qxp33_reader`], [`qxp4_reader`] — one record grammar
//!   per version family
//! - [`qxp_reader`] — [`QxpReader`], which detects the version, binds the
//!   matching decoder and drives the content collector

pub mod common;
pub mod qxp1_reader;
pub mod qxp33_reader;
pub mod qxp4_reader;
pub mod qxp_reader;
pub mod text_reader;

pub use common::{ContentType, DecoderContext};
pub use qxp1_reader::Qxp1Decoder;
pub use qxp33_reader::Qxp33Decoder;
pub use qxp4_reader::Qxp4Decoder;
pub use qxp_reader::{detect_stream, ParseReport, QxpReader, QxpReaderConfiguration, RecordDecoder};
pub use text_reader::TextReader;
