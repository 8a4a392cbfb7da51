use std::fmt;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::{disk::BlockId, fs::FileSystem, utils::percent};

/// `list` 的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub start_block: BlockId,
    pub block_count: u64,
    pub created: DateTime<Local>,
}

/// 文件表与块占用表的联合统计
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub used_bytes: u64, // Σ 文件大小
    pub free_bytes: u64,
    pub capacity: u64,
    pub percent_used: f64,
    pub files: usize,
    pub max_files: usize,
    pub used_blocks: u64,
    pub free_blocks: u64,
    pub total_blocks: u64,
    pub largest_free_run: u64,
    pub unusable_bytes: u64,
}

/// 块的归属
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Free,
    File(String),
    /// 标记为占用却不属于任何文件
    Orphan,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::File(name) => write!(f, "{}", name),
            Self::Orphan => write!(f, "orphan"),
        }
    }
}

/// 块图中归属相同的一段连续块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: BlockId,
    pub blocks: u64,
    pub owner: Owner,
}

/// `check` 发现的不一致
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("'{name}' has {actual} blocks, its size needs {expected}")]
    BlockCount {
        name: String,
        expected: u64,
        actual: u64,
    },
    #[error("'{name}' runs past the end of the medium")]
    OutOfRange { name: String },
    #[error("'{first}' and '{second}' both own block {block}")]
    Overlap {
        first: String,
        second: String,
        block: BlockId,
    },
    #[error("'{name}' owns block {block}, which is marked free")]
    OwnsFreeBlock { name: String, block: BlockId },
    #[error("block {0} is marked used but no file owns it")]
    Orphan(BlockId),
    #[error("file counter says {recorded}, table holds {counted}")]
    Counter { recorded: usize, counted: usize },
}

impl FileSystem {
    /// 按槽位顺序列出所有文件
    pub fn list(&self) -> Vec<FileInfo> {
        self.table
            .iter()
            .map(|(_, entry)| FileInfo {
                name: entry.name.clone(),
                size: entry.size,
                start_block: entry.start_block,
                block_count: entry.block_count,
                created: entry.created,
            })
            .collect()
    }

    pub fn status(&self) -> Status {
        let capacity = self.geometry().capacity();
        let used_bytes: u64 = self.table.iter().map(|(_, entry)| entry.size).sum();
        Status {
            used_bytes,
            free_bytes: capacity - used_bytes,
            capacity,
            percent_used: percent(used_bytes, capacity),
            files: self.table.len(),
            max_files: self.table.capacity(),
            used_blocks: self.allocator.used_blocks(),
            free_blocks: self.allocator.free_blocks(),
            total_blocks: self.allocator.total_blocks(),
            largest_free_run: self.allocator.largest_free_run(),
            unusable_bytes: self.super_block.unusable_bytes,
        }
    }

    // 每个块归属的槽位；重叠时保留先出现的槽位
    fn block_owners(&self) -> Vec<Option<usize>> {
        let total = self.allocator.total_blocks();
        let mut owners = vec![None; total as usize];
        for (slot, entry) in self.table.iter() {
            for block in entry.start_block.min(total)..entry.blocks().end.min(total) {
                owners[block as usize].get_or_insert(slot);
            }
        }
        owners
    }

    /// 块图：按块号顺序合并归属相同的相邻块
    pub fn block_map(&self) -> Vec<Segment> {
        let owners = self.block_owners();
        let mut segments: Vec<(Segment, Option<usize>)> = Vec::new();

        for (block, &owner_slot) in owners.iter().enumerate() {
            let key = if self.allocator.is_free(block as BlockId) {
                None
            } else {
                Some(owner_slot)
            };
            let owner_key = key.flatten();
            if let Some((segment, last)) = segments.last_mut() {
                if *last == owner_key && same_kind(&segment.owner, key) {
                    segment.blocks += 1;
                    continue;
                }
            }
            let owner = match key {
                None => Owner::Free,
                Some(None) => Owner::Orphan,
                Some(Some(slot)) => self
                    .table
                    .get(slot)
                    .map(|entry| Owner::File(entry.name.clone()))
                    .unwrap_or(Owner::Orphan),
            };
            segments.push((
                Segment {
                    start: block as BlockId,
                    blocks: 1,
                    owner,
                },
                owner_key,
            ));
        }

        segments.into_iter().map(|(segment, _)| segment).collect()
    }

    /// 检查文件表与块占用表是否一致，返回发现的全部问题
    pub fn check(&self) -> Vec<Inconsistency> {
        let geometry = self.geometry();
        let total = geometry.total_blocks;
        let mut problems = Vec::new();
        let mut owners: Vec<Option<usize>> = vec![None; total as usize];

        for (slot, entry) in self.table.iter() {
            let expected = geometry.blocks_for(entry.size);
            if entry.block_count != expected {
                problems.push(Inconsistency::BlockCount {
                    name: entry.name.clone(),
                    expected,
                    actual: entry.block_count,
                });
            }
            if entry.blocks().end > total {
                problems.push(Inconsistency::OutOfRange {
                    name: entry.name.clone(),
                });
                continue;
            }

            let mut reported_free = false;
            for block in entry.blocks() {
                if self.allocator.is_free(block) && !reported_free {
                    reported_free = true;
                    problems.push(Inconsistency::OwnsFreeBlock {
                        name: entry.name.clone(),
                        block,
                    });
                }
                let existing = owners[block as usize];
                match existing {
                    Some(other) => {
                        let first = self
                            .table
                            .get(other)
                            .map(|e| e.name.clone())
                            .unwrap_or_default();
                        problems.push(Inconsistency::Overlap {
                            first,
                            second: entry.name.clone(),
                            block,
                        });
                        break;
                    }
                    None => owners[block as usize] = Some(slot),
                }
            }
        }

        for (block, owner) in owners.iter().enumerate() {
            if owner.is_none() && !self.allocator.is_free(block as BlockId) {
                problems.push(Inconsistency::Orphan(block as BlockId));
            }
        }

        let counted = self.table.iter().count();
        if counted != self.table.len() {
            problems.push(Inconsistency::Counter {
                recorded: self.table.len(),
                counted,
            });
        }
        problems
    }
}

// 空闲段与占用段即使都没有归属槽位也不能合并
fn same_kind(owner: &Owner, key: Option<Option<usize>>) -> bool {
    matches!(
        (owner, key),
        (Owner::Free, None) | (Owner::Orphan, Some(None)) | (Owner::File(_), Some(Some(_)))
    )
}
