/// 块编号（从 0 开始）
pub type BlockId = u64;

/// 介质几何信息：块大小与块总数
/// 容量 = block_size * total_blocks，整个运行期间不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub block_size: usize,
    pub total_blocks: u64,
}

impl Geometry {
    pub fn new(block_size: usize, total_blocks: u64) -> Self {
        Self {
            block_size,
            total_blocks,
        }
    }

    /// 可用字节总数
    pub fn capacity(&self) -> u64 {
        self.block_size as u64 * self.total_blocks
    }

    /// 存放 `bytes` 字节所需的块数（向上取整）
    pub fn blocks_for(&self, bytes: u64) -> u64 {
        bytes.div_ceil(self.block_size as u64)
    }
}
