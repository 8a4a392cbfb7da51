use crate::disk::BlockId;

/// 块占用表 + 连续块分配器
///
/// `free[i] == true` 表示第 i 块空闲。长度在创建后固定不变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAllocator {
    free: Vec<bool>,
    free_blocks: u64,
}

impl BlockAllocator {
    pub fn new(total_blocks: u64) -> Self {
        Self {
            free: vec![true; total_blocks as usize],
            free_blocks: total_blocks,
        }
    }

    /// 首次适配：从左到右扫描，遇到占用块就把连续计数清零，
    /// 第一段长度达到 `required` 的空闲块立即被占用并返回起始块号。
    ///
    /// 找不到时返回 `None`，占用表保持不变。
    pub fn allocate(&mut self, required: u64) -> Option<BlockId> {
        debug_assert!(required > 0, "allocate called with zero blocks");
        if required == 0 || required > self.free_blocks {
            return None;
        }

        let mut run = 0u64;
        for (index, &is_free) in self.free.iter().enumerate() {
            if !is_free {
                run = 0;
                continue;
            }
            run += 1;
            if run == required {
                let start = index + 1 - required as usize;
                self.free[start..=index].fill(false);
                self.free_blocks -= required;
                log::debug!("allocated blocks {}..={} ({} blocks)", start, index, required);
                return Some(start as BlockId);
            }
        }
        log::debug!("no run of {} free blocks", required);
        None
    }

    /// 释放从 `start` 开始的 `count` 个块，超出介质范围的部分直接忽略
    pub fn release(&mut self, start: BlockId, count: u64) {
        let total = self.free.len() as u64;
        let end = start.saturating_add(count).min(total);
        for index in start.min(total)..end {
            let slot = &mut self.free[index as usize];
            // 防止重复释放
            if !*slot {
                *slot = true;
                self.free_blocks += 1;
            }
        }
        log::debug!("released blocks {}..{}", start, end);
    }

    pub fn is_free(&self, block_id: BlockId) -> bool {
        self.free.get(block_id as usize).copied().unwrap_or(false)
    }

    pub fn total_blocks(&self) -> u64 {
        self.free.len() as u64
    }

    pub fn free_blocks(&self) -> u64 {
        self.free_blocks
    }

    pub fn used_blocks(&self) -> u64 {
        self.total_blocks() - self.free_blocks
    }

    /// 最长的连续空闲块数，即当前能满足的最大单次分配
    pub fn largest_free_run(&self) -> u64 {
        let mut best = 0u64;
        let mut run = 0u64;
        for &is_free in &self.free {
            if is_free {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fit_from_the_left() {
        let mut alloc = BlockAllocator::new(8);
        assert_eq!(alloc.allocate(3), Some(0));
        assert_eq!(alloc.allocate(2), Some(3));
        assert_eq!(alloc.free_blocks(), 3);
        assert_eq!(alloc.used_blocks(), 5);
        assert!(!alloc.is_free(4));
        assert!(alloc.is_free(5));
    }

    #[test]
    fn released_hole_is_reused() {
        let mut alloc = BlockAllocator::new(4);
        assert_eq!(alloc.allocate(2), Some(0));
        assert_eq!(alloc.allocate(2), Some(2));
        alloc.release(0, 2);
        assert_eq!(alloc.allocate(1), Some(0));
        assert_eq!(alloc.allocate(1), Some(1));
        assert_eq!(alloc.allocate(1), None);
    }

    #[test]
    fn fragmented_space_cannot_satisfy_a_longer_run() {
        // 空闲段：[0,1] 与 [3,4,5]，共 5 块，但没有连续 4 块
        let mut alloc = BlockAllocator::new(7);
        assert_eq!(alloc.allocate(7), Some(0));
        alloc.release(0, 2);
        alloc.release(3, 3);
        assert_eq!(alloc.free_blocks(), 5);
        assert_eq!(alloc.largest_free_run(), 3);

        let before = alloc.clone();
        assert_eq!(alloc.allocate(4), None);
        assert_eq!(alloc, before);

        assert_eq!(alloc.allocate(3), Some(3));
    }

    #[test]
    fn adjacent_releases_coalesce_for_later_scans() {
        let mut alloc = BlockAllocator::new(6);
        assert_eq!(alloc.allocate(2), Some(0));
        assert_eq!(alloc.allocate(2), Some(2));
        assert_eq!(alloc.allocate(2), Some(4));
        alloc.release(0, 2);
        alloc.release(2, 2);
        assert_eq!(alloc.allocate(4), Some(0));
    }

    #[test]
    fn release_clamps_out_of_range_blocks() {
        let mut alloc = BlockAllocator::new(4);
        assert_eq!(alloc.allocate(4), Some(0));
        alloc.release(2, 10);
        alloc.release(9, 3);
        assert_eq!(alloc.free_blocks(), 2);
        assert!(alloc.is_free(3));
        assert!(!alloc.is_free(1));
        assert!(!alloc.is_free(100));
    }

    #[test]
    fn double_release_does_not_inflate_free_count() {
        let mut alloc = BlockAllocator::new(4);
        assert_eq!(alloc.allocate(2), Some(0));
        alloc.release(0, 2);
        alloc.release(0, 2);
        assert_eq!(alloc.free_blocks(), 4);
    }

    #[test]
    fn request_larger_than_medium_fails() {
        let mut alloc = BlockAllocator::new(4);
        assert_eq!(alloc.allocate(5), None);
        assert_eq!(alloc.free_blocks(), 4);
    }
}
