//! Reassembly of logical records from the 256-byte block chain.
//!
//! A record starts at a block index and continues through the link stored in
//! the last bytes of each block. A negative link switches the next hop to
//! "big block" mode, where the block starts with a count of contiguous
//! blocks to consume before the following link.

use std::collections::HashSet;

use crate::error::Result;
use crate::types::QxpVersion;

use super::constants::BLOCK_LENGTH;
use super::stream_reader::{ByteCursor, Endian};

/// Width of the trailing link field of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkWidth {
    Short,
    Long,
}

impl LinkWidth {
    pub fn for_version(version: QxpVersion) -> Self {
        if version >= QxpVersion::Qxp31Mac {
            LinkWidth::Long
        } else {
            LinkWidth::Short
        }
    }

    fn size(&self) -> usize {
        match self {
            LinkWidth::Short => 2,
            LinkWidth::Long => 4,
        }
    }
}

/// Random access to blocks and chains of the raw document.
pub struct BlockChainReader {
    input: ByteCursor,
    link_width: LinkWidth,
    last_block: u32,
}

impl BlockChainReader {
    pub fn new(data: Vec<u8>, endian: Endian, version: QxpVersion) -> Self {
        let length = data.len();
        let last_block = if length > 0 {
            (length / BLOCK_LENGTH + 1) as u32
        } else {
            0
        };
        BlockChainReader {
            input: ByteCursor::new(data, endian),
            link_width: LinkWidth::for_version(version),
            last_block,
        }
    }

    pub fn last_block(&self) -> u32 {
        self.last_block
    }

    pub fn endian(&self) -> Endian {
        self.input.endian()
    }

    /// Payload of a single block, 1-based. `None` for index 0, indices past
    /// the last block, or a block with no bytes.
    pub fn get_block(&mut self, index: u32) -> Option<Vec<u8>> {
        if index == 0 || index > self.last_block {
            return None;
        }
        self.input
            .seek((index as u64 - 1) * BLOCK_LENGTH as u64)
            .ok()?;
        let block = self.input.read_available(BLOCK_LENGTH);
        if block.is_empty() {
            None
        } else {
            Some(block)
        }
    }

    /// Follow the chain starting at `index` and return the joined payload.
    ///
    /// Reading is best effort: a structural problem ends the walk and returns
    /// what was collected. Every block is consumed at most once, so cyclic
    /// links terminate after salvaging the bytes before the repeat.
    pub fn get_chain(&mut self, index: u32) -> Vec<u8> {
        let mut chain = Vec::new();
        if let Err(e) = self.walk_chain(index, &mut chain) {
            log::debug!("Chain {} ended early: {}", index, e);
        }
        chain
    }

    fn walk_chain(&mut self, index: u32, chain: &mut Vec<u8>) -> Result<()> {
        let mut visited: HashSet<u32> = HashSet::new();
        let mut is_big = false;
        let mut next = index;

        while next > 0 && next <= self.last_block {
            let first = next - 1;
            self.input.seek(first as u64 * BLOCK_LENGTH as u64)?;

            let mut count = if is_big {
                self.input.read_u16()? as u32
            } else {
                1
            };
            count = count.min(self.last_block - next);

            // Stop at the first block already consumed, keeping the blocks
            // before it.
            let mut stop = false;
            for i in first..first + count {
                if !visited.insert(i) {
                    stop = true;
                    count = i - first;
                    break;
                }
            }
            if count == 0 {
                break;
            }

            let end = (first + count) as u64 * BLOCK_LENGTH as u64;
            let len = end
                .saturating_sub(self.link_width.size() as u64)
                .saturating_sub(self.input.position()) as usize;
            let bytes = self.input.read_available(len);
            let short_read = bytes.len() < len;
            chain.extend_from_slice(&bytes);

            if stop || short_read {
                break;
            }

            let link = match self.link_width {
                LinkWidth::Long => self.input.read_i32()?,
                LinkWidth::Short => self.input.read_i16()? as i32,
            };
            is_big = link < 0;
            next = link.unsigned_abs();
        }
        Ok(())
    }
}
