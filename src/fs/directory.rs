use crate::{
    disk::BlockDevice,
    fs::{
        error::{Result, StorageError},
        file_table::FileEntry,
        FileSystem,
    },
};

/// 删除文件时覆盖释放块的字节
pub const SCRUB_BYTE: u8 = b'-';

impl FileSystem {
    /// 创建文件：占用第一个空闲槽位和一段连续块。
    ///
    /// 新分配的块被文件名首字节填满（调试用，不是文件内容）。
    /// 任何失败都不会改动文件表或占用表。
    pub fn create(&mut self, name: &str, size: i64) -> Result<FileEntry> {
        self.validate_name(name)?;

        let max = self.max_file_size();
        if size <= 0 || size as u64 > max {
            return Err(StorageError::InvalidSize { size, max });
        }
        let size = size as u64;

        if self.table.find(name).is_some() {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        if self.table.is_full() {
            return Err(StorageError::TableFull(self.table.capacity()));
        }
        let slot = self.table.first_free_slot().ok_or_else(|| {
            StorageError::Corrupted(format!(
                "{} files recorded but no slot is free",
                self.table.len()
            ))
        })?;

        let blocks = self.geometry().blocks_for(size);
        let start = self
            .allocator
            .allocate(blocks)
            .ok_or_else(|| StorageError::InsufficientStorage {
                name: name.to_string(),
                blocks,
            })?;

        let entry = FileEntry::new(name, size, start, blocks);
        if let Err(entry) = self.table.occupy(slot, entry.clone()) {
            self.allocator.release(start, blocks);
            return Err(StorageError::Corrupted(format!(
                "slot {} reported free but is taken, '{}' not created",
                slot, entry.name
            )));
        }

        let pattern = name.as_bytes()[0];
        if let Err(e) = self.disk.fill(start, blocks, pattern) {
            self.table.vacate(slot);
            self.allocator.release(start, blocks);
            return Err(e.into());
        }

        log::info!(
            "created '{}' ({} bytes, {} blocks at {})",
            name,
            size,
            blocks,
            start
        );
        Ok(entry)
    }

    /// 删除文件，释放槽位和块区间
    pub fn delete(&mut self, name: &str) -> Result<FileEntry> {
        let slot = self.find(name)?;
        let (start, blocks) = match self.table.get(slot) {
            Some(entry) => (entry.start_block, entry.block_count),
            None => return Err(StorageError::NotFound(name.to_string())),
        };

        // 先擦除，I/O 失败时状态仍然完整
        self.disk.fill(start, blocks, SCRUB_BYTE)?;
        let entry = self
            .table
            .vacate(slot)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        self.allocator.release(entry.start_block, entry.block_count);

        log::info!("deleted '{}', released {} blocks at {}", name, blocks, start);
        Ok(entry)
    }

    /// 改变文件大小：先删除再以新大小创建。
    ///
    /// 文件可能被搬到新的块区间，原有内容不保留。新分配失败时文件已经被删除，
    /// 返回 `ResizeFailed`。
    pub fn resize(&mut self, name: &str, new_size: i64) -> Result<FileEntry> {
        let old = self.delete(name)?;
        match self.create(name, new_size) {
            Ok(entry) => {
                log::info!("resized '{}' from {} to {} bytes", name, old.size, entry.size);
                Ok(entry)
            }
            Err(source) => {
                log::warn!("resize of '{}' failed after release, file lost: {}", name, source);
                Err(StorageError::ResizeFailed {
                    name: name.to_string(),
                    source: Box::new(source),
                })
            }
        }
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        let max = self.config.max_name_len;
        if name.is_empty() || name.chars().count() > max {
            return Err(StorageError::InvalidName {
                name: name.to_string(),
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::{
        block_allocator::BlockAllocator, error::StorageError, file_table::FileTable,
        tests::small_fs, FileSystem, FsConfig,
    };

    fn snapshot(fs: &FileSystem) -> (Vec<u8>, BlockAllocator, FileTable) {
        (
            fs.disk().as_bytes().to_vec(),
            fs.allocator.clone(),
            fs.table().clone(),
        )
    }

    #[test]
    fn create_fills_claimed_blocks_with_name_byte() {
        let mut fs = small_fs(4, 16);
        let entry = fs.create("xyz", 20).unwrap();
        assert_eq!(entry.block_count, 2);
        let bytes = fs.disk().as_bytes();
        assert!(bytes[..32].iter().all(|&b| b == b'x'));
        assert!(bytes[32..].iter().all(|&b| b == 0));
    }

    #[test]
    fn delete_scrubs_released_blocks() {
        let mut fs = small_fs(4, 16);
        fs.create("a", 16).unwrap();
        fs.create("b", 16).unwrap();
        fs.delete("a").unwrap();
        let bytes = fs.disk().as_bytes();
        assert!(bytes[..16].iter().all(|&b| b == b'-'));
        assert!(bytes[16..32].iter().all(|&b| b == b'b'));
        assert!(fs.allocator.is_free(0));
        assert_eq!(fs.table().len(), 1);
    }

    #[test]
    fn duplicate_name_leaves_state_untouched() {
        let mut fs = small_fs(8, 16);
        fs.create("a", 40).unwrap();
        fs.write("a", 0, b"hello").unwrap();
        let before = snapshot(&fs);

        let err = fs.create("a", 10).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(ref n) if n == "a"));
        assert_eq!(snapshot(&fs), before);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut fs = small_fs(4, 16);
        assert!(matches!(fs.create("", 1), Err(StorageError::InvalidName { .. })));
        let long = "n".repeat(32);
        assert!(matches!(fs.create(&long, 1), Err(StorageError::InvalidName { max: 31, .. })));
        assert!(fs.create(&"n".repeat(31), 1).is_ok());
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let mut fs = small_fs(4, 16);
        assert!(matches!(fs.create("a", 0), Err(StorageError::InvalidSize { .. })));
        assert!(matches!(fs.create("a", -5), Err(StorageError::InvalidSize { .. })));
        assert!(matches!(
            fs.create("a", 65),
            Err(StorageError::InvalidSize { size: 65, max: 64 })
        ));
        assert!(fs.create("a", 64).is_ok());
        assert!(fs.table().iter().count() == 1);
    }

    #[test]
    fn size_cap_is_independent_of_free_space() {
        let mut fs = small_fs(4, 16);
        fs.create("a", 16).unwrap();
        // 不超过容量上限，但空间不够：空间不足而不是大小非法
        assert!(matches!(
            fs.create("b", 64),
            Err(StorageError::InsufficientStorage { blocks: 4, .. })
        ));
    }

    #[test]
    fn table_full_is_reported_before_allocation() {
        let mut fs = FileSystem::init(FsConfig {
            block_size: 16,
            disk_size: 64,
            max_files: 2,
            ..FsConfig::default()
        })
        .unwrap();
        fs.create("a", 1).unwrap();
        fs.create("b", 1).unwrap();
        let free_before = fs.allocator.free_blocks();
        assert!(matches!(fs.create("c", 1), Err(StorageError::TableFull(2))));
        assert_eq!(fs.allocator.free_blocks(), free_before);

        fs.delete("a").unwrap();
        assert!(fs.create("c", 1).is_ok());
    }

    #[test]
    fn fragmented_free_space_fails_without_mutation() {
        let mut fs = small_fs(7, 16);
        fs.create("a", 32).unwrap(); // 0..2
        fs.create("b", 16).unwrap(); // 2
        fs.create("c", 48).unwrap(); // 3..6
        fs.create("d", 16).unwrap(); // 6
        fs.delete("a").unwrap();
        fs.delete("c").unwrap();
        assert_eq!(fs.allocator.free_blocks(), 5);

        let before = snapshot(&fs);
        assert!(matches!(
            fs.create("e", 64),
            Err(StorageError::InsufficientStorage { blocks: 4, .. })
        ));
        assert_eq!(snapshot(&fs), before);
        assert_eq!(fs.create("e", 48).unwrap().start_block, 3);
    }

    #[test]
    fn delete_missing_file() {
        let mut fs = small_fs(4, 16);
        assert!(matches!(fs.delete("ghost"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn resize_relocates_and_drops_content() {
        let mut fs = small_fs(8, 16);
        fs.create("a", 16).unwrap();
        fs.create("b", 16).unwrap();
        fs.write("a", 0, b"data").unwrap();

        let entry = fs.resize("a", 40).unwrap();
        assert_eq!(entry.start_block, 2);
        assert_eq!(entry.block_count, 3);
        assert_eq!(fs.entry("a").unwrap().size, 40);
        assert_eq!(fs.read("a", 0, 4).unwrap().data, b"aaaa");
        assert!(fs.allocator.is_free(0));
    }

    #[test]
    fn resize_of_missing_file_is_not_found() {
        let mut fs = small_fs(4, 16);
        assert!(matches!(fs.resize("nope", 4), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn failed_resize_loses_the_file() {
        let mut fs = small_fs(4, 16);
        fs.create("a", 16).unwrap();
        fs.create("b", 16).unwrap();
        fs.create("c", 16).unwrap();
        // 释放 a 后只有块 0 与块 3 空闲，不连续
        let err = fs.resize("a", 32).unwrap_err();
        match err {
            StorageError::ResizeFailed { ref name, ref source } => {
                assert_eq!(name, "a");
                assert!(matches!(**source, StorageError::InsufficientStorage { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(fs.find("a").is_err());
        assert_eq!(fs.allocator.used_blocks(), 2);
    }
}
