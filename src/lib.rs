//! # qxprust
//!
//! A pure Rust reader for QuarkXPress 1.x, 3.x and 4.x documents and
//! templates.
//!
//! The reader decodes the block-chained binary payload (container unwrapping
//! is left to the caller), resolves text flowing through linked boxes across
//! pages, and composes each page onto a [`DocumentSink`] as paths, ellipses
//! and styled text objects.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qxprust::{collector::NullSink, parse, ParseStatus};
//!
//! let mut file = std::fs::File::open("sample.qxd")?;
//! let mut sink = NullSink;
//! assert_eq!(parse(&mut file, &mut sink), ParseStatus::Ok);
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - `io::qxp` - byte cursor, block chains, ciphers, version headers and the
//!   per-version record decoders
//! - `collector` - the `Collector` the decoders feed and the
//!   `ContentCollector` that buffers pages until linked text resolves
//! - `document` / `types` - style tables and the decoded object model

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod collector;
pub mod document;
pub mod error;
pub mod io;
pub mod notification;
pub mod types;

use std::io::{Read, Seek};

// Re-export commonly used types
pub use collector::{Collector, ContentCollector, DocumentSink};
pub use document::{ContainerInfo, DocumentProperties, DocumentType, StyleTables};
pub use error::{ParseStatus, QxpError, Result};
pub use io::qxp::{Detection, ParseReport, QxpReader, QxpReaderConfiguration};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use types::{Color, Point, QxpVersion, Rect};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Detect whether `stream` holds a supported document.
///
/// The stream position is restored.
pub fn detect<R: Read + Seek>(stream: &mut R) -> Result<Detection> {
    io::qxp::detect_stream(stream, None)
}

/// Like [`detect`], with the type/creator hint of the enclosing container.
/// 1.x payloads are only recognized through such a hint.
pub fn detect_with_container<R: Read + Seek>(
    stream: &mut R,
    container: Option<&ContainerInfo>,
) -> Result<Detection> {
    io::qxp::detect_stream(stream, container)
}

/// Decode `stream` onto `sink` with the default configuration.
pub fn parse<R: Read + Seek>(stream: &mut R, sink: &mut dyn DocumentSink) -> ParseStatus {
    parse_with_container(stream, None, sink)
}

pub fn parse_with_container<R: Read + Seek>(
    stream: &mut R,
    container: Option<&ContainerInfo>,
    sink: &mut dyn DocumentSink,
) -> ParseStatus {
    let mut reader = QxpReader::from_reader(stream);
    if let Some(container) = container {
        reader = reader.with_container(container.clone());
    }
    match reader.parse(sink) {
        Ok(_) => ParseStatus::Ok,
        Err(e) => {
            log::warn!("Parse failed: {e}");
            e.status()
        }
    }
}
