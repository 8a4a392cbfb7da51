use crate::{
    disk::{BlockDevice, Geometry, MemoryDisk},
    fs::{
        block_allocator::BlockAllocator,
        error::{ConfigError, Result, StorageError},
        file_table::{FileEntry, FileTable},
        super_block::SuperBlock,
    },
};

pub mod block_allocator;
pub mod config;
pub mod directory;
pub mod error;
pub mod file_table;
pub mod report;
pub mod super_block;
pub mod transfer;

pub use config::FsConfig;

/// 存储句柄：介质、占用表和文件表的唯一所有者。
///
/// 所有操作都通过 `&mut FileSystem` 显式传入，不存在全局状态。
#[derive(Debug)]
pub struct FileSystem {
    config: FsConfig,
    super_block: SuperBlock,    // 卷信息
    disk: MemoryDisk,           // 原始字节
    allocator: BlockAllocator,  // 块占用表
    table: FileTable,           // 文件元数据
}

impl FileSystem {
    /// 按配置分配介质并清空全部状态
    pub fn init(config: FsConfig) -> std::result::Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        let unusable = config.unusable_bytes();
        if unusable > 0 {
            log::warn!(
                "disk size {} is not a multiple of block size {}: {} trailing bytes are unusable",
                config.disk_size,
                config.block_size,
                unusable
            );
        }

        let fs = Self {
            super_block: SuperBlock::new(unusable),
            disk: MemoryDisk::new(geometry),
            allocator: BlockAllocator::new(geometry.total_blocks),
            table: FileTable::new(config.max_files),
            config,
        };
        log::info!(
            "initialized volume {}: {} blocks of {} bytes, {} file slots",
            fs.super_block.volume_id,
            geometry.total_blocks,
            geometry.block_size,
            fs.config.max_files
        );
        Ok(fs)
    }

    /// 清空所有文件，重新生成卷
    pub fn format(&mut self) {
        let geometry = self.geometry();
        self.super_block = SuperBlock::new(self.super_block.unusable_bytes);
        self.disk = MemoryDisk::new(geometry);
        self.allocator = BlockAllocator::new(geometry.total_blocks);
        self.table = FileTable::new(self.config.max_files);
        log::info!("formatted volume {}", self.super_block.volume_id);
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    pub fn geometry(&self) -> Geometry {
        self.disk.geometry()
    }

    pub fn disk(&self) -> &MemoryDisk {
        &self.disk
    }

    pub fn table(&self) -> &FileTable {
        &self.table
    }

    /// 单个文件的大小上限：介质的可用容量，与当前剩余空间无关
    pub fn max_file_size(&self) -> u64 {
        self.geometry().capacity()
    }

    /// 按名字查找槽位
    pub fn find(&self, name: &str) -> Result<usize> {
        self.table
            .find(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    pub fn entry(&self, name: &str) -> Result<&FileEntry> {
        let slot = self.find(name)?;
        self.table
            .get(slot)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}
