//! Bounds-checked random access reads over an in-memory record stream.
//!
//! Every multi-byte read takes the cursor's current [`Endian`]; headers and
//! a few cipher fields override it explicitly with the `_be` readers.

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::error::{QxpError, Result};

use super::encoding::TextEncoding;

/// Byte order of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    /// Only documents written on Intel hardware are little-endian.
    pub fn from_proc(proc: u8) -> Self {
        if proc == super::constants::PROC_INTEL {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    pub fn is_big(&self) -> bool {
        *self == Endian::Big
    }
}

/// Decode a 16.16 fixed point value.
pub fn fraction_from_bits(num: i32) -> f64 {
    (num >> 16) as f64 + (num & 0xffff) as f64 / 65536.0
}

/// Cursor over a decoded chain or the raw input.
pub struct ByteCursor {
    stream: Cursor<Vec<u8>>,
    endian: Endian,
    encoding: TextEncoding,
}

impl ByteCursor {
    pub fn new(data: Vec<u8>, endian: Endian) -> Self {
        let encoding = TextEncoding::for_document(endian == Endian::Little, 0);
        ByteCursor {
            stream: Cursor::new(data),
            endian,
            encoding,
        }
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn len(&self) -> u64 {
        self.stream.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.stream.get_ref().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.stream.position()
    }

    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    pub fn at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn data(&self) -> &[u8] {
        self.stream.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.stream.into_inner()
    }

    // -----------------------------------------------------------------------
    // Positioning
    // -----------------------------------------------------------------------

    /// Absolute seek; the end of the stream is a valid target.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.len() {
            return Err(QxpError::SeekOutOfRange(pos));
        }
        self.stream.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn skip(&mut self, count: u64) -> Result<()> {
        let target = self.position().saturating_add(count);
        self.seek(target)
    }

    fn ensure(&self, requested: u64) -> Result<()> {
        if self.remaining() < requested {
            return Err(QxpError::EndOfStream {
                position: self.position(),
                requested,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Integers
    // -----------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.stream.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_u16_as(self.endian)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_u16_as(Endian::Big)
    }

    pub fn read_u16_as(&mut self, endian: Endian) -> Result<u16> {
        self.ensure(2)?;
        let value = match endian {
            Endian::Big => self.stream.read_u16::<BigEndian>()?,
            Endian::Little => self.stream.read_u16::<LittleEndian>()?,
        };
        Ok(value)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_u32_as(self.endian)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_u32_as(Endian::Big)
    }

    pub fn read_u32_as(&mut self, endian: Endian) -> Result<u32> {
        self.ensure(4)?;
        let value = match endian {
            Endian::Big => self.stream.read_u32::<BigEndian>()?,
            Endian::Little => self.stream.read_u32::<LittleEndian>()?,
        };
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    // -----------------------------------------------------------------------
    // Fixed point
    // -----------------------------------------------------------------------

    /// 16.16 signed fixed point.
    pub fn read_fraction(&mut self) -> Result<f64> {
        Ok(fraction_from_bits(self.read_i32()?))
    }

    pub fn read_fraction_be(&mut self) -> Result<f64> {
        Ok(fraction_from_bits(self.read_u32_be()? as i32))
    }

    /// Unsigned 16-bit fraction of 65536, used for shades and percentages.
    pub fn read_float16(&mut self) -> Result<f64> {
        Ok(self.read_u16()? as f64 / 65536.0)
    }

    /// A float16 scaled to a 0-255 color channel.
    pub fn read_color_comp(&mut self) -> Result<u8> {
        Ok((255.0 * self.read_float16()?).round() as u8)
    }

    // -----------------------------------------------------------------------
    // Bytes and strings
    // -----------------------------------------------------------------------

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut buf = vec![0u8; count];
        self.stream.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read up to `count` bytes, stopping early at the end of the stream.
    pub fn read_available(&mut self, count: usize) -> Vec<u8> {
        let count = count.min(self.remaining() as usize);
        let start = self.position() as usize;
        let buf = self.data()[start..start + count].to_vec();
        self.stream.set_position((start + count) as u64);
        buf
    }

    /// Fixed-length string in the document code page.
    pub fn read_string(&mut self, length: usize) -> Result<String> {
        let bytes = self.read_bytes(length)?;
        Ok(self.encoding.decode(&bytes))
    }

    pub fn read_pascal_string(&mut self) -> Result<String> {
        let length = self.read_u8()? as usize;
        self.read_string(length)
    }

    pub fn read_c_string(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            let c = self.read_u8()?;
            if c == 0 {
                break;
            }
            bytes.push(c);
        }
        Ok(self.encoding.decode(&bytes))
    }

    /// Pascal string on Macintosh documents, C string on Windows ones.
    pub fn read_platform_string(&mut self) -> Result<String> {
        match self.endian {
            Endian::Big => self.read_pascal_string(),
            Endian::Little => self.read_c_string(),
        }
    }

    /// Platform string padded to an even byte count.
    pub fn read_name(&mut self) -> Result<String> {
        let start = self.position();
        let name = self.read_platform_string()?;
        if (self.position() - start) % 2 == 1 {
            self.skip(1)?;
        }
        Ok(name)
    }

    /// Copy the next `length` bytes into a standalone cursor.
    pub fn sub_cursor(&mut self, length: u64) -> Result<ByteCursor> {
        let bytes = self.read_bytes(length as usize)?;
        Ok(ByteCursor {
            stream: Cursor::new(bytes),
            endian: self.endian,
            encoding: self.encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(fraction_from_bits(0x0001_8000), 1.5);
        assert_eq!(fraction_from_bits(-0x0001_0000), -1.0);
        // -0.5 is stored as integer part -1 plus 0x8000
        assert_eq!(fraction_from_bits(0xffff_8000u32 as i32), -0.5);
    }

    #[test]
    fn test_endian_reads() {
        let mut be = ByteCursor::new(vec![0x12, 0x34, 0x12, 0x34], Endian::Big);
        assert_eq!(be.read_u16().unwrap(), 0x1234);
        be.set_endian(Endian::Little);
        assert_eq!(be.read_u16().unwrap(), 0x3412);
        assert!(be.at_end());
    }

    #[test]
    fn test_float16_and_color() {
        let mut c = ByteCursor::new(vec![0x80, 0x00, 0xff, 0xff], Endian::Big);
        assert_eq!(c.read_float16().unwrap(), 0.5);
        assert_eq!(c.read_color_comp().unwrap(), 255);
    }

    #[test]
    fn test_out_of_range() {
        let mut c = ByteCursor::new(vec![1, 2, 3], Endian::Big);
        assert!(c.seek(3).is_ok());
        assert!(matches!(c.seek(4), Err(QxpError::SeekOutOfRange(4))));
        c.seek(2).unwrap();
        assert!(matches!(
            c.read_u16(),
            Err(QxpError::EndOfStream { position: 2, requested: 2 })
        ));
        assert!(c.skip(2).is_err());
    }

    #[test]
    fn test_platform_strings() {
        let mut mac = ByteCursor::new(vec![3, b'a', b'b', b'c', 9], Endian::Big);
        assert_eq!(mac.read_name().unwrap(), "abc");
        assert_eq!(mac.position(), 4);

        let mut win = ByteCursor::new(b"ab\0xy\0\0".to_vec(), Endian::Little);
        assert_eq!(win.read_name().unwrap(), "ab");
        assert_eq!(win.position(), 4);
        assert_eq!(win.read_name().unwrap(), "y");
        assert_eq!(win.position(), 6);
    }

    #[test]
    fn test_read_available_stops_at_end() {
        let mut c = ByteCursor::new(vec![1, 2, 3], Endian::Big);
        c.skip(1).unwrap();
        assert_eq!(c.read_available(10), vec![2, 3]);
        assert!(c.at_end());
    }

    #[test]
    fn test_sub_cursor() {
        let mut c = ByteCursor::new(vec![0, 0, 0, 7, 1], Endian::Big);
        let mut sub = c.sub_cursor(4).unwrap();
        assert_eq!(sub.read_u32().unwrap(), 7);
        assert_eq!(c.read_u8().unwrap(), 1);
    }
}
