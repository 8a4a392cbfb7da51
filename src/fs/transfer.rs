use crate::{
    disk::{BlockDevice, BlockId},
    fs::{
        error::{Result, StorageError},
        FileSystem,
    },
};

/// 一次块内传输：落在单个块内的一段字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub block: BlockId,    // 介质上的块号
    pub offset: usize,     // 块内偏移
    pub len: usize,
    pub buf_offset: usize, // 在调用方缓冲区中的位置
}

/// 把文件内的字节区间 [offset, offset + len) 切成一串块内传输。
///
/// 每一步：block_in_file = pos / block_size，offset_in_block = pos % block_size，
/// 长度取 min(剩余字节, block_size - offset_in_block)，保证不会跨块。
#[derive(Debug, Clone)]
pub struct BlockSpan {
    start_block: BlockId,
    block_size: u64,
    origin: u64,
    pos: u64,
    end: u64,
}

impl BlockSpan {
    pub fn new(start_block: BlockId, block_size: usize, offset: u64, len: u64) -> Self {
        Self {
            start_block,
            block_size: block_size as u64,
            origin: offset,
            pos: offset,
            end: offset + len,
        }
    }
}

impl Iterator for BlockSpan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.pos >= self.end {
            return None;
        }
        let block_in_file = self.pos / self.block_size;
        let offset = self.pos % self.block_size;
        let len = (self.end - self.pos).min(self.block_size - offset);
        let chunk = Chunk {
            block: self.start_block + block_in_file,
            offset: offset as usize,
            len: len as usize,
            buf_offset: (self.pos - self.origin) as usize,
        };
        self.pos += len;
        Some(chunk)
    }
}

/// 写入结果：实际写入的字节数与请求的字节数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    pub requested: usize,
}

impl WriteReport {
    /// 写入超出文件末尾，被截断
    pub fn is_truncated(&self) -> bool {
        self.written < self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReport {
    pub data: Vec<u8>,
    pub requested: u64,
}

impl ReadReport {
    pub fn is_truncated(&self) -> bool {
        (self.data.len() as u64) < self.requested
    }
}

impl FileSystem {
    /// 从 `offset` 开始写入 `data`。
    ///
    /// 写入永远不会让文件变大：超出声明大小的部分被丢弃，并在报告里体现。
    /// `offset == size` 合法，写入 0 字节。
    pub fn write(&mut self, name: &str, offset: i64, data: &[u8]) -> Result<WriteReport> {
        let entry = self.entry(name)?;
        let (start, size) = (entry.start_block, entry.size);

        if offset < 0 || offset as u64 > size {
            return Err(StorageError::InvalidOffset {
                name: name.to_string(),
                offset,
                size,
            });
        }
        let offset = offset as u64;

        let writable = (data.len() as u64).min(size - offset) as usize;
        if writable < data.len() {
            log::warn!(
                "write to '{}' truncated at end of file: {} of {} bytes",
                name,
                writable,
                data.len()
            );
        }

        for chunk in BlockSpan::new(start, self.geometry().block_size, offset, writable as u64) {
            let src = &data[chunk.buf_offset..chunk.buf_offset + chunk.len];
            self.disk.write_at(chunk.block, chunk.offset, src)?;
        }

        log::debug!("wrote {} bytes to '{}' at offset {}", writable, name, offset);
        Ok(WriteReport {
            written: writable,
            requested: data.len(),
        })
    }

    /// 从 `offset` 开始读取最多 `length` 字节。
    ///
    /// 与写入不同，`offset == size` 视为越界。
    pub fn read(&self, name: &str, offset: i64, length: i64) -> Result<ReadReport> {
        let entry = self.entry(name)?;
        let (start, size) = (entry.start_block, entry.size);

        if offset < 0 || offset as u64 >= size {
            return Err(StorageError::InvalidOffset {
                name: name.to_string(),
                offset,
                size,
            });
        }
        if length <= 0 {
            return Err(StorageError::InvalidLength(length));
        }
        let (offset, requested) = (offset as u64, length as u64);

        let readable = requested.min(size - offset);
        if readable < requested {
            log::warn!(
                "read from '{}' clamped at end of file: {} of {} bytes",
                name,
                readable,
                requested
            );
        }

        let mut data = vec![0u8; readable as usize];
        for chunk in BlockSpan::new(start, self.geometry().block_size, offset, readable) {
            let dst = &mut data[chunk.buf_offset..chunk.buf_offset + chunk.len];
            self.disk.read_at(chunk.block, chunk.offset, dst)?;
        }

        log::debug!("read {} bytes from '{}' at offset {}", readable, name, offset);
        Ok(ReadReport { data, requested })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::tests::small_fs;

    #[test]
    fn span_splits_at_block_boundaries() {
        let chunks: Vec<_> = BlockSpan::new(10, 8, 5, 12).collect();
        assert_eq!(
            chunks,
            [
                Chunk { block: 10, offset: 5, len: 3, buf_offset: 0 },
                Chunk { block: 11, offset: 0, len: 8, buf_offset: 3 },
                Chunk { block: 12, offset: 0, len: 1, buf_offset: 11 },
            ]
        );
        assert_eq!(BlockSpan::new(0, 8, 3, 0).count(), 0);
    }

    #[test]
    fn round_trip_inside_one_block() {
        let mut fs = small_fs(8, 64);
        let data = b"hello, world!";
        fs.create("f", data.len() as i64).unwrap();
        let report = fs.write("f", 0, data).unwrap();
        assert_eq!(report, WriteReport { written: 13, requested: 13 });
        assert_eq!(fs.read("f", 0, data.len() as i64).unwrap().data, data);
    }

    #[test]
    fn round_trip_across_three_blocks() {
        let mut fs = small_fs(8, 16);
        fs.create("pad", 10).unwrap();
        let data: Vec<u8> = (0..40u8).map(|i| b'A' + i % 26).collect();
        fs.create("f", data.len() as i64).unwrap();
        assert_eq!(fs.entry("f").unwrap().block_count, 3);

        fs.write("f", 0, &data).unwrap();
        let report = fs.read("f", 0, data.len() as i64).unwrap();
        assert!(!report.is_truncated());
        assert_eq!(report.data, data);

        // 首块之外的 pad 不受影响
        assert!(fs.read("pad", 0, 10).unwrap().data.iter().all(|&b| b == b'p'));
    }

    #[test]
    fn write_at_offset_crossing_boundary() {
        let mut fs = small_fs(4, 8);
        fs.create("f", 24).unwrap();
        fs.write("f", 6, b"XYZW").unwrap();
        assert_eq!(fs.read("f", 4, 8).unwrap().data, b"ffXYZWff");
        let bytes = fs.disk().as_bytes();
        assert_eq!(&bytes[6..10], b"XYZW");
    }

    #[test]
    fn write_never_grows_the_file() {
        let mut fs = small_fs(4, 16);
        fs.create("f", 10).unwrap();
        let report = fs.write("f", 7, b"abcdef").unwrap();
        assert_eq!(report.written, 3);
        assert!(report.is_truncated());
        assert_eq!(fs.entry("f").unwrap().size, 10);
        assert_eq!(fs.read("f", 7, 3).unwrap().data, b"abc");
        // 声明大小之外、同一块内的字节保持填充值
        assert_eq!(fs.disk().as_bytes()[10], b'f');
    }

    #[test]
    fn write_at_end_of_file_is_a_noop() {
        let mut fs = small_fs(4, 16);
        fs.create("f", 10).unwrap();
        let before = fs.disk().as_bytes().to_vec();
        let report = fs.write("f", 10, b"more").unwrap();
        assert_eq!(report, WriteReport { written: 0, requested: 4 });
        assert_eq!(fs.disk().as_bytes(), &before[..]);
    }

    #[test]
    fn write_offset_out_of_range() {
        let mut fs = small_fs(4, 16);
        fs.create("f", 10).unwrap();
        assert!(matches!(
            fs.write("f", 11, b"x"),
            Err(StorageError::InvalidOffset { offset: 11, size: 10, .. })
        ));
        assert!(matches!(
            fs.write("f", -1, b"x"),
            Err(StorageError::InvalidOffset { .. })
        ));
        assert!(matches!(fs.write("g", 0, b"x"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn read_at_end_of_file_is_invalid() {
        let mut fs = small_fs(4, 16);
        fs.create("f", 10).unwrap();
        assert!(matches!(
            fs.read("f", 10, 1),
            Err(StorageError::InvalidOffset { offset: 10, .. })
        ));
        assert!(matches!(fs.read("f", -3, 1), Err(StorageError::InvalidOffset { .. })));
        assert!(matches!(fs.read("g", 0, 1), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn read_length_must_be_positive() {
        let mut fs = small_fs(4, 16);
        fs.create("f", 10).unwrap();
        assert!(matches!(fs.read("f", 0, 0), Err(StorageError::InvalidLength(0))));
        assert!(matches!(fs.read("f", 0, -2), Err(StorageError::InvalidLength(-2))));
    }

    #[test]
    fn read_is_clamped_to_file_size() {
        let mut fs = small_fs(4, 16);
        fs.create("f", 20).unwrap();
        fs.write("f", 0, b"0123456789abcdefghij").unwrap();
        let report = fs.read("f", 15, 100).unwrap();
        assert_eq!(report.data, b"fghij");
        assert_eq!(report.requested, 100);
        assert!(report.is_truncated());
    }
}
