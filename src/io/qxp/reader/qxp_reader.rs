//! QuarkXPress reader orchestrator, the main entry point for decoding a
//! document payload.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qxprust::collector::NullSink;
//! use qxprust::io::qxp::QxpReader;
//!
//! let mut sink = NullSink;
//! let report = QxpReader::from_file("sample.qxd")?.parse(&mut sink)?;
//! println!("{} notifications", report.notifications.len());
//! ```

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::collector::{Collector, ContentCollector, DocumentSink};
use crate::document::{ContainerInfo, DocumentType};
use crate::error::{QxpError, Result};
use crate::notification::NotificationCollection;
use crate::types::QxpVersion;

use super::super::detector::{Detection, FormatDetector};
use super::super::file_header::VersionHeader;
use super::super::stream_reader::{ByteCursor, Endian};
use super::common::DecoderContext;
use super::{Qxp1Decoder, Qxp33Decoder, Qxp4Decoder};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration options for the reader.
#[derive(Debug, Clone)]
pub struct QxpReaderConfiguration {
    /// When `true`, failures inside bounded sub-records (a color entry, a
    /// line style, a story) are reported as notifications and skipped.
    /// When `false` they abort the read.
    ///
    /// Default: `true`.
    pub failsafe: bool,
}

impl Default for QxpReaderConfiguration {
    fn default() -> Self {
        Self { failsafe: true }
    }
}

/// Summary of a completed read
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub version: QxpVersion,
    pub document_type: DocumentType,
    /// Everything that was skipped or defaulted on the way
    pub notifications: NotificationCollection,
}

// ---------------------------------------------------------------------------
// Version dispatch
// ---------------------------------------------------------------------------

/// The record decoder bound to a detected version family.
pub enum RecordDecoder {
    Qxp1(Qxp1Decoder),
    Qxp33(Qxp33Decoder),
    Qxp4(Qxp4Decoder),
}

impl RecordDecoder {
    /// Decode global tables and pages into `collector`.
    pub fn decode(&mut self, collector: &mut dyn Collector) -> Result<()> {
        match self {
            RecordDecoder::Qxp1(d) => d.decode(collector),
            RecordDecoder::Qxp33(d) => d.decode(collector),
            RecordDecoder::Qxp4(d) => d.decode(collector),
        }
    }

    pub fn context(&self) -> &DecoderContext {
        match self {
            RecordDecoder::Qxp1(d) => d.context(),
            RecordDecoder::Qxp33(d) => d.context(),
            RecordDecoder::Qxp4(d) => d.context(),
        }
    }

    pub fn context_mut(&mut self) -> &mut DecoderContext {
        match self {
            RecordDecoder::Qxp1(d) => d.context_mut(),
            RecordDecoder::Qxp33(d) => d.context_mut(),
            RecordDecoder::Qxp4(d) => d.context_mut(),
        }
    }

    pub fn take_notifications(&mut self) -> NotificationCollection {
        std::mem::take(&mut self.context_mut().notifications)
    }
}

// ---------------------------------------------------------------------------
// QxpReader
// ---------------------------------------------------------------------------

/// Reads a QuarkXPress payload and composes it onto a [`DocumentSink`].
///
/// The pipeline is:
///
/// 1. Load the payload and detect the version from its header (or from the
///    container hint for 1.x).
/// 2. Reject anything but documents and templates.
/// 3. Bind the version's record decoder to the block chain.
/// 4. Decode into a [`ContentCollector`], which resolves linked text and
///    draws each page once it is complete.
pub struct QxpReader<R: Read + Seek> {
    reader: R,
    config: QxpReaderConfiguration,
    container: Option<ContainerInfo>,
}

impl QxpReader<BufReader<File>> {
    /// Open a payload by path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| QxpError::FileAccess(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl QxpReader<Cursor<Vec<u8>>> {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::from_reader(Cursor::new(data))
    }
}

impl<R: Read + Seek> QxpReader<R> {
    /// Create a reader over any seekable stream positioned anywhere; the
    /// payload is read from its start.
    pub fn from_reader(reader: R) -> Self {
        QxpReader {
            reader,
            config: QxpReaderConfiguration::default(),
            container: None,
        }
    }

    pub fn with_config(mut self, config: QxpReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Attach the type/creator hint of the enclosing container.
    pub fn with_container(mut self, container: ContainerInfo) -> Self {
        self.container = Some(container);
        self
    }

    fn load(&mut self) -> Result<ByteCursor> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(ByteCursor::new(data, Endian::Big))
    }

    /// Detect the payload's version and subtype without decoding it.
    pub fn detect(&mut self) -> Result<Detection> {
        let mut input = self.load()?;
        let header = FormatDetector::detect(&mut input, self.container.as_ref());
        Ok(FormatDetector::describe(header.as_ref()))
    }

    /// Decode the document into `sink`.
    ///
    /// Pages already complete when a fatal error occurs are still drawn.
    pub fn parse(mut self, sink: &mut dyn DocumentSink) -> Result<ParseReport> {
        let mut input = self.load()?;
        let header = FormatDetector::detect(&mut input, self.container.as_ref()).ok_or_else(|| {
            QxpError::UnsupportedFormat("not a QuarkXPress 1.x-4.x payload".to_string())
        })?;

        let document_type = header.document_type();
        if !document_type.is_parsable() {
            return Err(QxpError::UnsupportedFormat(format!(
                "cannot decode a {document_type}"
            )));
        }
        let version = header.version();
        log::debug!("Decoding {document_type}, version {version:?}");

        let mut decoder = header.create_decoder(input.into_inner(), &self.config);
        let mut collector = ContentCollector::new(sink);
        let result = decoder.decode(&mut collector);
        collector.end_document();

        let mut notifications = decoder.take_notifications();
        notifications.extend(collector.take_notifications());
        if let Err(e) = result {
            log::warn!("Decoding aborted: {e} ({} notifications)", notifications.len());
            return Err(e);
        }

        Ok(ParseReport {
            version,
            document_type,
            notifications,
        })
    }
}

/// Detect `stream` and put its position back where it was.
pub fn detect_stream<R: Read + Seek>(
    stream: &mut R,
    container: Option<&ContainerInfo>,
) -> Result<Detection> {
    let position = stream.stream_position()?;
    stream.seek(SeekFrom::Start(0))?;
    let mut data = Vec::new();
    let read = stream.read_to_end(&mut data);
    stream.seek(SeekFrom::Start(position))?;
    read?;

    let mut input = ByteCursor::new(data, Endian::Big);
    let header = FormatDetector::detect(&mut input, container);
    Ok(FormatDetector::describe(header.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::NullSink;

    #[test]
    fn test_default_config_is_failsafe() {
        assert!(QxpReaderConfiguration::default().failsafe);
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let result = QxpReader::from_bytes(vec![0x55; 1024]).parse(&mut NullSink);
        assert!(matches!(result, Err(QxpError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_detect_restores_position() {
        let mut stream = Cursor::new(vec![0u8; 64]);
        stream.set_position(17);
        let detection = detect_stream(&mut stream, None).unwrap();
        assert!(!detection.supported);
        assert_eq!(stream.position(), 17);
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let result = QxpReader::from_file("/nonexistent/qxprust/sample.qxd");
        assert!(matches!(result, Err(QxpError::FileAccess(_))));
    }
}
