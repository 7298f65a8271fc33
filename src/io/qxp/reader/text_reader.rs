//! Story decoding.
//!
//! A story chain starts with a list of `(block, length)` pairs naming the
//! blocks that hold the characters, followed by the character format runs
//! and the paragraph runs.

use crate::document::StyleTables;
use crate::error::Result;
use crate::types::{CharFormatSpec, ParagraphSpec, QxpVersion, Text, TextSpec};

use super::super::block_chain::BlockChainReader;
use super::super::encoding::TextEncoding;
use super::super::stream_reader::ByteCursor;

/// Reads stories through the document's block chain.
pub struct TextReader<'a> {
    blocks: &'a mut BlockChainReader,
    version: QxpVersion,
    encoding: TextEncoding,
}

impl<'a> TextReader<'a> {
    pub fn new(blocks: &'a mut BlockChainReader, version: QxpVersion, encoding: TextEncoding) -> Self {
        TextReader {
            blocks,
            version,
            encoding,
        }
    }

    fn is_qxp4(&self) -> bool {
        self.version >= QxpVersion::Qxp4
    }

    /// Decode the story whose info chain starts at `index`.
    pub fn read(&mut self, index: u32, tables: &StyleTables) -> Result<Text> {
        let data = self.blocks.get_chain(index);
        let mut info = ByteCursor::new(data, self.blocks.endian()).with_encoding(self.encoding);

        let mut text = Text::new(self.encoding);

        info.skip(4)?;
        let blocks_length = info.read_u32()? as u64;
        let end = info.position() + blocks_length;
        while info.position() < end {
            let block_index = info.read_u32()?;
            let length = if self.is_qxp4() {
                info.read_u32()?
            } else {
                info.read_u16()? as u32
            } as usize;
            match self.blocks.get_block(block_index) {
                Some(block) => {
                    let length = length.min(block.len());
                    text.bytes.extend_from_slice(&block[..length]);
                }
                None => log::debug!("Text block {} not found", block_index),
            }
        }

        let char_runs = self.read_runs(&mut info, tables.char_formats.len())?;
        text.char_formats = char_runs
            .into_iter()
            .map(|(spec, format)| CharFormatSpec { spec, format })
            .collect();

        let paragraph_runs = self.read_runs(&mut info, tables.paragraph_formats.len())?;
        text.paragraphs = paragraph_runs
            .into_iter()
            .map(|(spec, format)| ParagraphSpec { spec, format })
            .collect();

        Ok(text)
    }

    /// Consecutive runs, each starting where the previous one ended. An
    /// unknown format index falls back to the first format of the table.
    fn read_runs(
        &mut self,
        info: &mut ByteCursor,
        formats_count: usize,
    ) -> Result<Vec<(TextSpec, Option<usize>)>> {
        let length = (info.read_u32()? as u64).min(info.remaining());
        let end = info.position() + length;

        let mut runs: Vec<(TextSpec, Option<usize>)> = Vec::new();
        while info.position() < end {
            let format_index = if self.is_qxp4() {
                info.read_u32()?
            } else {
                info.read_u16()? as u32
            } as usize;
            let length = info.read_u32()? as usize;
            let start = runs.last().map_or(0, |(spec, _)| spec.after_end_index());

            let format = if format_index < formats_count {
                Some(format_index)
            } else {
                log::debug!("Format {} not found", format_index);
                if formats_count > 0 {
                    Some(0)
                } else {
                    None
                }
            };
            runs.push((TextSpec::new(start, length), format));
        }
        Ok(runs)
    }
}
