use crate::document::{DocumentProperties, DocumentType};
use crate::error::Result;
use crate::io::qxp::constants::{qxp33, HEADER_END};
use crate::io::qxp::stream_reader::ByteCursor;

use super::HeaderBase;

/// Header of 3.1 Mac, 3.1 and 3.3 documents.
#[derive(Debug, Clone)]
pub struct Qxp33Header {
    pub base: HeaderBase,
    /// Type reported by the container, if any
    pub file_type: Option<DocumentType>,
    pub pages_count: u16,
    pub master_pages_count: u8,
    pub seed: u16,
    pub increment: u16,
    pub properties: DocumentProperties,
}

impl Qxp33Header {
    pub fn new(file_type: Option<DocumentType>) -> Self {
        Qxp33Header {
            base: HeaderBase::default(),
            file_type,
            pages_count: 0,
            master_pages_count: 0,
            seed: 0,
            increment: 0,
            properties: DocumentProperties::default(),
        }
    }

    /// 3.x headers carry no type code; anything uncontained is a document.
    pub fn document_type(&self) -> DocumentType {
        self.file_type.unwrap_or(DocumentType::Document)
    }

    pub(super) fn load(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.base = HeaderBase::read(input)?;

        input.seek(qxp33::PAGES_OFFSET)?;
        self.pages_count = input.read_u16()?;
        input.skip(51)?;
        self.master_pages_count = input.read_u8()?;

        input.skip(6)?;
        self.properties.set_auto_leading(input.read_fraction()?);

        input.skip(84)?;
        read_script_properties(input, &mut self.properties)?;

        input.skip(28)?;
        self.seed = input.read_u16()?;
        self.increment = input.read_u16()?;

        input.seek(HEADER_END)?;
        Ok(())
    }
}

/// Super/subscript and superior settings, stored in the same order by 3.x
/// and 4.x headers.
pub(super) fn read_script_properties(
    input: &mut ByteCursor,
    props: &mut DocumentProperties,
) -> Result<()> {
    props.superscript_offset = input.read_fraction()?;
    props.superscript_h_scale = input.read_fraction()?;
    props.superscript_v_scale = input.read_fraction()?;
    props.subscript_offset = -input.read_fraction()?;
    props.subscript_h_scale = input.read_fraction()?;
    props.subscript_v_scale = input.read_fraction()?;
    props.superior_h_scale = input.read_fraction()?;
    props.superior_v_scale = input.read_fraction()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::qxp::stream_reader::Endian;

    fn header_bytes(proc: u8) -> Vec<u8> {
        let mut data = vec![0u8; 512];
        data[2] = proc;
        data[4..7].copy_from_slice(b"XPR");
        data[7] = 0x33;
        let le = proc == b'I';
        let put16 = |data: &mut Vec<u8>, at: usize, v: u16| {
            let b = if le { v.to_le_bytes() } else { v.to_be_bytes() };
            data[at..at + 2].copy_from_slice(&b);
        };
        put16(&mut data, 8, 0x3f);
        put16(&mut data, 0x40, 2);
        data[0x40 + 2 + 51] = 1;
        // seed and increment follow the 8 script fractions
        let seed_at = 0x40 + 2 + 51 + 1 + 6 + 4 + 84 + 32 + 28;
        put16(&mut data, seed_at, 0x337c);
        put16(&mut data, seed_at + 2, 0x3797);
        data
    }

    #[test]
    fn test_load_big_endian() {
        let mut input = ByteCursor::new(header_bytes(b'M'), Endian::Big);
        let mut header = Qxp33Header::new(None);
        header.load(&mut input).unwrap();
        assert_eq!(header.base.version_code, 0x3f);
        assert_eq!(header.pages_count, 2);
        assert_eq!(header.master_pages_count, 1);
        assert_eq!((header.seed, header.increment), (0x337c, 0x3797));
        assert_eq!(input.position(), 512);
        assert_eq!(header.document_type(), DocumentType::Document);
        // zero fractions in the fixture
        assert_eq!(header.properties.auto_leading(), 0.0);
    }

    #[test]
    fn test_load_little_endian() {
        let mut input = ByteCursor::new(header_bytes(b'I'), Endian::Big);
        let mut header = Qxp33Header::new(Some(DocumentType::Template));
        header.load(&mut input).unwrap();
        assert_eq!((header.seed, header.increment), (0x337c, 0x3797));
        assert_eq!(header.document_type(), DocumentType::Template);
    }
}
