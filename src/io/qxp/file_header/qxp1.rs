use crate::error::Result;
use crate::io::qxp::stream_reader::ByteCursor;

/// Apply a 1.x sub-point adjustment word to an integer coordinate.
pub fn adjust_position(position: f64, adjustment: u16) -> f64 {
    position + (adjustment as f64 - 0x8000 as f64) / 65536.0
}

/// 1.x header: always big-endian, page size stored as integer points plus
/// adjustment words.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Qxp1Header {
    pub version_code: u16,
    pub pages: u16,
    pub page_height: f64,
    pub page_width: f64,
}

impl Qxp1Header {
    pub(super) fn load(&mut self, input: &mut ByteCursor) -> Result<()> {
        self.version_code = input.read_u16_be()?;
        input.skip(152)?;
        self.pages = input.read_u16_be()?;

        let height = input.read_u16_be()? as f64;
        let height_adj = input.read_u16_be()?;
        let width = input.read_u16_be()? as f64;
        let width_adj = input.read_u16_be()?;
        self.page_height = adjust_position(height, height_adj);
        self.page_width = adjust_position(width, width_adj);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::qxp::stream_reader::Endian;

    #[test]
    fn test_adjust() {
        assert_eq!(adjust_position(10.0, 0x8000), 10.0);
        assert_eq!(adjust_position(10.0, 0xc000), 10.25);
        assert_eq!(adjust_position(10.0, 0x4000), 9.75);
    }

    #[test]
    fn test_load() {
        let mut data = vec![0u8; 170];
        data[0..2].copy_from_slice(&0x20u16.to_be_bytes());
        data[154..156].copy_from_slice(&3u16.to_be_bytes());
        data[156..158].copy_from_slice(&792u16.to_be_bytes());
        data[158..160].copy_from_slice(&0x8000u16.to_be_bytes());
        data[160..162].copy_from_slice(&612u16.to_be_bytes());
        data[162..164].copy_from_slice(&0xc000u16.to_be_bytes());
        let mut input = ByteCursor::new(data, Endian::Little);
        let mut header = Qxp1Header::default();
        header.load(&mut input).unwrap();
        assert_eq!(header.version_code, 0x20);
        assert_eq!(header.pages, 3);
        assert_eq!(header.page_height, 792.0);
        assert_eq!(header.page_width, 612.25);
    }
}
