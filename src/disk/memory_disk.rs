use std::io::{Error, ErrorKind, Result};
use std::ops::Range;

use crate::disk::{
    block_device::BlockDevice,
    types::{BlockId, Geometry},
};

/// 内存中的虚拟磁盘，所有块扁平存放在一个缓冲区里
#[derive(Debug, Clone)]
pub struct MemoryDisk {
    bytes: Vec<u8>,
    geometry: Geometry,
}

impl MemoryDisk {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            bytes: vec![0u8; geometry.capacity() as usize],
            geometry,
        }
    }

    /// 读取整块，块号越界返回 None
    pub fn block(&self, block_id: BlockId) -> Option<&[u8]> {
        let range = self.span(block_id, 0, self.geometry.block_size).ok()?;
        Some(&self.bytes[range])
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    // 把 (块号, 块内偏移, 长度) 换算成缓冲区下标，越界则报错
    fn span(&self, block_id: BlockId, offset: usize, len: usize) -> Result<Range<usize>> {
        if block_id >= self.geometry.total_blocks {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "block {} out of range (total {})",
                    block_id, self.geometry.total_blocks
                ),
            ));
        }
        if offset + len > self.geometry.block_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "access of {} bytes at offset {} crosses the end of block {}",
                    len, offset, block_id
                ),
            ));
        }
        let start = block_id as usize * self.geometry.block_size + offset;
        Ok(start..start + len)
    }
}

impl BlockDevice for MemoryDisk {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn read_at(&self, block_id: BlockId, offset: usize, buf: &mut [u8]) -> Result<()> {
        let range = self.span(block_id, offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_at(&mut self, block_id: BlockId, offset: usize, buf: &[u8]) -> Result<()> {
        let range = self.span(block_id, offset, buf.len())?;
        self.bytes[range].copy_from_slice(buf);
        Ok(())
    }

    fn fill(&mut self, block_id: BlockId, count: u64, byte: u8) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let last = block_id + count - 1;
        let first = self.span(block_id, 0, 0)?.start;
        let end = self.span(last, 0, self.geometry.block_size)?.end;
        self.bytes[first..end].fill(byte);
        Ok(())
    }
}
