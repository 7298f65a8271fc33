//! QuarkXPress 1.x-4.x payload decoding.
//!
//! The payload is a sequence of 256-byte blocks. Logical records are chains
//! of blocks ([`block_chain`]); the header ([`file_header`]) selects one of
//! three record grammars ([`reader`]), whose object headers are protected by
//! a per-version [`cipher`].

pub mod block_chain;
pub mod cipher;
pub mod constants;
pub mod detector;
pub mod encoding;
pub mod file_header;
pub mod reader;
pub mod stream_reader;

pub use block_chain::BlockChainReader;
pub use cipher::{AdditiveCipher, Cipher, RotatingCipher};
pub use detector::{Detection, FormatDetector};
pub use encoding::TextEncoding;
pub use file_header::VersionHeader;
pub use reader::{detect_stream, ParseReport, QxpReader, QxpReaderConfiguration, RecordDecoder};
pub use stream_reader::{ByteCursor, Endian};
