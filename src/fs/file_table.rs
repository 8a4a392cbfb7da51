use std::ops::Range;

use chrono::{DateTime, Local};

use crate::disk::BlockId;

/// 文件表中的一个已占用条目
///
/// 空闲槽位用 `None` 表示，因此这里不存在“半空闲”的条目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,              // 文件大小（字节）
    pub start_block: BlockId,   // 起始块号
    pub block_count: u64,       // ceil(size / block_size)
    pub created: DateTime<Local>,
}

impl FileEntry {
    pub fn new(name: &str, size: u64, start_block: BlockId, block_count: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            start_block,
            block_count,
            created: Local::now(),
        }
    }

    /// 该文件占用的块区间 [start, start + count)
    pub fn blocks(&self) -> Range<BlockId> {
        self.start_block..self.start_block + self.block_count
    }
}

/// 固定容量的文件表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTable {
    slots: Vec<Option<FileEntry>>,
    occupied: usize,
}

impl FileTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            occupied: 0,
        }
    }

    // 线性查找，只比较已占用的槽位，大小写敏感
    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(entry) if entry.name == name))
    }

    pub fn get(&self, slot: usize) -> Option<&FileEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// 把条目放进空闲槽位；槽位已被占用时原样退回条目
    pub fn occupy(&mut self, slot: usize, entry: FileEntry) -> Result<(), FileEntry> {
        match self.slots.get_mut(slot) {
            Some(cell) if cell.is_none() => {
                *cell = Some(entry);
                self.occupied += 1;
                Ok(())
            }
            _ => Err(entry),
        }
    }

    /// 清空槽位，返回原条目
    pub fn vacate(&mut self, slot: usize) -> Option<FileEntry> {
        let entry = self.slots.get_mut(slot)?.take()?;
        self.occupied -= 1;
        Some(entry)
    }

    /// 按槽位顺序遍历已占用条目
    pub fn iter(&self) -> impl Iterator<Item = (usize, &FileEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|e| (slot, e)))
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupied >= self.slots.len()
    }
}
