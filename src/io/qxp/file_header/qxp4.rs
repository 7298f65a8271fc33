use crate::document::{DocumentProperties, DocumentType};
use crate::error::Result;
use crate::io::qxp::cipher::{Cipher, RotatingCipher};
use crate::io::qxp::constants::{qxp4, HEADER_END};
use crate::io::qxp::stream_reader::ByteCursor;

use super::qxp33::read_script_properties;
use super::HeaderBase;

/// Header of 4.x documents. The page count is stored enciphered.
#[derive(Debug, Clone)]
pub struct Qxp4Header {
    pub base: HeaderBase,
    pub file_type: Option<DocumentType>,
    /// Two-letter type code
    pub type_code: String,
    pub pages_count: u16,
    pub master_pages_count: u8,
    pub seed: u16,
    pub increment: u16,
    pub properties: DocumentProperties,
}

impl Qxp4Header {
    pub fn new(file_type: Option<DocumentType>) -> Self {
        Qxp4Header {
            base: HeaderBase::default(),
            file_type,
            type_code: String::new(),
            pages_count: 0,
            master_pages_count: 0,
            seed: 0,
            increment: 0,
            properties: DocumentProperties::default(),
        }
    }

    /// The container type wins over the in-header code.
    pub fn document_type(&self) -> DocumentType {
        if let Some(file_type) = self.file_type {
            return file_type;
        }
        match self.type_code.as_str() {
            "BK" => DocumentType::Book,
            "DC" => DocumentType::Document,
            "LB" => DocumentType::Library,
            "TP" => DocumentType::Template,
            _ => DocumentType::Unknown,
        }
    }

    pub(super) fn load(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.base = HeaderBase::read(input)?;

        input.seek(qxp4::TYPE_OFFSET)?;
        self.type_code = input.read_string(2)?;

        input.skip(20)?;
        let pages_obfuscated = input.read_u16()?;
        input.skip(41)?;
        self.master_pages_count = input.read_u8()?;

        input.seek(qxp4::INCREMENT_OFFSET)?;
        self.increment = input.read_u16()?;

        input.seek(qxp4::AUTO_LEADING_OFFSET)?;
        self.properties.set_auto_leading(input.read_fraction()?);

        input.seek(qxp4::SEED_OFFSET)?;
        self.seed = input.read_u16()?;

        let pages = RotatingCipher::new(self.seed, self.increment).apply_u16(pages_obfuscated);
        self.pages_count = (pages & 0xfffc) | ((pages & 0x3) ^ 0x3);

        input.skip(42)?;
        read_script_properties(input, &mut self.properties)?;

        input.seek(HEADER_END)?;
        Ok(())
    }
}
