//! Fixed-offset document headers.
//!
//! The header is the single place where the format version is decided.
//! [`VersionHeader::create_decoder`] binds the matching record decoder and
//! nothing downstream inspects the version family again.

mod qxp1;
mod qxp33;
mod qxp4;

pub use qxp1::{adjust_position, Qxp1Header};
pub use qxp33::Qxp33Header;
pub use qxp4::Qxp4Header;

use crate::document::{DocumentProperties, DocumentType};
use crate::error::{QxpError, Result};
use crate::types::QxpVersion;

use super::block_chain::BlockChainReader;
use super::constants::SIGNATURE;
use super::encoding::TextEncoding;
use super::reader::{Qxp1Decoder, Qxp33Decoder, Qxp4Decoder, QxpReaderConfiguration, RecordDecoder};
use super::stream_reader::{ByteCursor, Endian};

/// Fields shared by 3.x and 4.x headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBase {
    pub proc: u8,
    pub signature: [u8; 3],
    pub language: u8,
    pub version_code: u16,
}

impl Default for HeaderBase {
    fn default() -> Self {
        HeaderBase {
            proc: super::constants::PROC_MOTOROLA,
            signature: [0; 3],
            language: 0,
            version_code: 0,
        }
    }
}

impl HeaderBase {
    /// Read the processor, signature, language and version at offset 2.
    ///
    /// Leaves `input` switched to the header's byte order.
    pub fn read(input: &mut ByteCursor) -> Result<Self> {
        input.seek(2)?;
        let proc = input.read_u8()?;
        input.skip(1)?;
        let sig = input.read_bytes(3)?;
        let signature = [sig[0], sig[1], sig[2]];
        let language = input.read_u8()?;
        input.set_endian(Endian::from_proc(proc));
        let version_code = input.read_u16()?;
        Ok(HeaderBase {
            proc,
            signature,
            language,
            version_code,
        })
    }

    pub fn endian(&self) -> Endian {
        Endian::from_proc(self.proc)
    }

    pub fn has_signature(&self) -> bool {
        &self.signature == SIGNATURE
    }
}

/// Header of one version family
#[derive(Debug, Clone)]
pub enum VersionHeader {
    /// 1.x, identified through the container only
    Qxp1(Qxp1Header),
    /// 3.1 Mac, 3.1 and 3.3
    Qxp33(Qxp33Header),
    /// 4.x
    Qxp4(Qxp4Header),
}

impl VersionHeader {
    /// Create an unloaded header for a 3.x/4.x version word.
    pub fn create(version_code: u16, file_type: Option<DocumentType>) -> Result<Self> {
        match QxpVersion::from_code(version_code) {
            Some(QxpVersion::Qxp31Mac) | Some(QxpVersion::Qxp31) | Some(QxpVersion::Qxp33) => {
                Ok(VersionHeader::Qxp33(Qxp33Header::new(file_type)))
            }
            Some(QxpVersion::Qxp4) => Ok(VersionHeader::Qxp4(Qxp4Header::new(file_type))),
            _ => Err(QxpError::UnsupportedVersion(version_code)),
        }
    }

    pub fn create_qxp1() -> Self {
        VersionHeader::Qxp1(Qxp1Header::default())
    }

    /// Parse the header from the start of the payload and leave `input`
    /// positioned after it.
    pub fn load(&mut self, input: &mut ByteCursor) -> Result<()> {
        input.seek(0)?;
        match self {
            VersionHeader::Qxp1(h) => h.load(input),
            VersionHeader::Qxp33(h) => h.load(input),
            VersionHeader::Qxp4(h) => h.load(input),
        }
    }

    pub fn version_code(&self) -> u16 {
        match self {
            VersionHeader::Qxp1(h) => h.version_code,
            VersionHeader::Qxp33(h) => h.base.version_code,
            VersionHeader::Qxp4(h) => h.base.version_code,
        }
    }

    /// Version of the loaded header, falling back to the family's newest
    /// member if the stored word is unexpected.
    pub fn version(&self) -> QxpVersion {
        let family = match self {
            VersionHeader::Qxp1(_) => QxpVersion::Qxp1,
            VersionHeader::Qxp33(_) => QxpVersion::Qxp33,
            VersionHeader::Qxp4(_) => QxpVersion::Qxp4,
        };
        QxpVersion::from_code(self.version_code()).unwrap_or(family)
    }

    pub fn endian(&self) -> Endian {
        match self {
            VersionHeader::Qxp1(_) => Endian::Big,
            VersionHeader::Qxp33(h) => h.base.endian(),
            VersionHeader::Qxp4(h) => h.base.endian(),
        }
    }

    pub fn language(&self) -> u8 {
        match self {
            VersionHeader::Qxp1(_) => 0,
            VersionHeader::Qxp33(h) => h.base.language,
            VersionHeader::Qxp4(h) => h.base.language,
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        TextEncoding::for_document(self.endian() == Endian::Little, self.language())
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            VersionHeader::Qxp1(_) => DocumentType::Document,
            VersionHeader::Qxp33(h) => h.document_type(),
            VersionHeader::Qxp4(h) => h.document_type(),
        }
    }

    pub fn pages_count(&self) -> u32 {
        match self {
            VersionHeader::Qxp1(h) => h.pages as u32,
            VersionHeader::Qxp33(h) => h.pages_count as u32,
            VersionHeader::Qxp4(h) => h.pages_count as u32,
        }
    }

    pub fn master_pages_count(&self) -> u32 {
        match self {
            VersionHeader::Qxp1(_) => 0,
            VersionHeader::Qxp33(h) => h.master_pages_count as u32,
            VersionHeader::Qxp4(h) => h.master_pages_count as u32,
        }
    }

    pub fn document_properties(&self) -> DocumentProperties {
        match self {
            VersionHeader::Qxp1(_) => DocumentProperties::default(),
            VersionHeader::Qxp33(h) => h.properties,
            VersionHeader::Qxp4(h) => h.properties,
        }
    }

    /// Bind the record decoder of this header's version family to the
    /// whole payload `data`.
    pub fn create_decoder(&self, data: Vec<u8>, config: &QxpReaderConfiguration) -> RecordDecoder {
        let blocks = BlockChainReader::new(data, self.endian(), self.version());
        match self {
            VersionHeader::Qxp1(h) => {
                RecordDecoder::Qxp1(Qxp1Decoder::new(blocks, h.clone(), config.failsafe))
            }
            VersionHeader::Qxp33(h) => {
                RecordDecoder::Qxp33(Qxp33Decoder::new(blocks, h.clone(), config.failsafe))
            }
            VersionHeader::Qxp4(h) => {
                RecordDecoder::Qxp4(Qxp4Decoder::new(blocks, h.clone(), config.failsafe))
            }
        }
    }

    /// Initial cipher `(seed, increment)`; 1.x documents are not obfuscated.
    pub fn cipher_state(&self) -> (u16, u16) {
        match self {
            VersionHeader::Qxp1(_) => (0, 0),
            VersionHeader::Qxp33(h) => (h.seed, h.increment),
            VersionHeader::Qxp4(h) => (h.seed, h.increment),
        }
    }
}
