//! Signature sniffing and header selection.

use crate::document::{ContainerInfo, DocumentType};
use crate::types::QxpVersion;

use super::file_header::{HeaderBase, VersionHeader};
use super::stream_reader::ByteCursor;

/// Outcome of format detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub supported: bool,
    pub document_type: DocumentType,
    pub version: Option<QxpVersion>,
}

impl Detection {
    pub fn unsupported() -> Self {
        Detection {
            supported: false,
            document_type: DocumentType::Unknown,
            version: None,
        }
    }
}

/// Picks and loads the header of a payload.
pub struct FormatDetector;

impl FormatDetector {
    /// Return the loaded header if the payload is a known version, `None`
    /// otherwise. The header is returned even when its document type is
    /// unknown; [`Detection::supported`] reflects that.
    pub fn detect(input: &mut ByteCursor, container: Option<&ContainerInfo>) -> Option<VersionHeader> {
        let file_type = container.and_then(ContainerInfo::document_type);

        let mut header = if container.is_some_and(ContainerInfo::is_qxp1_document) {
            VersionHeader::create_qxp1()
        } else {
            Self::sniff(input, file_type)?
        };

        match header.load(input) {
            Ok(()) => Some(header),
            Err(e) => {
                log::debug!("Failed to load header: {}", e);
                None
            }
        }
    }

    fn sniff(input: &mut ByteCursor, file_type: Option<DocumentType>) -> Option<VersionHeader> {
        let base = match HeaderBase::read(input) {
            Ok(base) => base,
            Err(e) => {
                log::debug!("Too short for a header: {}", e);
                return None;
            }
        };
        if !base.has_signature() {
            return None;
        }
        if QxpVersion::is_known_unsupported(base.version_code) {
            log::debug!("Unsupported version {:#x}", base.version_code);
            return None;
        }
        VersionHeader::create(base.version_code, file_type).ok()
    }

    /// Summarize a detected header.
    pub fn describe(header: Option<&VersionHeader>) -> Detection {
        match header {
            Some(header) => {
                let document_type = header.document_type();
                Detection {
                    supported: document_type != DocumentType::Unknown,
                    document_type,
                    version: Some(header.version()),
                }
            }
            None => Detection::unsupported(),
        }
    }
}
