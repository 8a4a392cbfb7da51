use std::io::Result;

use crate::disk::types::{BlockId, Geometry};

/// 以块为单位寻址的存储介质。
///
/// 每次访问都限定在单个块之内：`offset + buf.len()` 不能越过块尾，
/// 越界的块号或跨块的访问返回 `ErrorKind::InvalidInput`。
pub trait BlockDevice {
    fn geometry(&self) -> Geometry;
    fn read_at(&self, block_id: BlockId, offset: usize, buf: &mut [u8]) -> Result<()>;
    fn write_at(&mut self, block_id: BlockId, offset: usize, buf: &[u8]) -> Result<()>;
    /// 用同一个字节填满从 `block_id` 开始的 `count` 个块
    fn fill(&mut self, block_id: BlockId, count: u64, byte: u8) -> Result<()>;
}
