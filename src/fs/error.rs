use thiserror::Error;

/// 文件系统错误类型
///
/// 所有错误都可恢复：失败的调用不会留下任何部分修改。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name '{name}' (must be 1..={max} characters)")]
    InvalidName { name: String, max: usize },

    #[error("Invalid file size {size} (must be 1..={max} bytes)")]
    InvalidSize { size: i64, max: u64 },

    #[error("Invalid offset {offset} for file '{name}' (size {size})")]
    InvalidOffset { name: String, offset: i64, size: u64 },

    #[error("Invalid length {0} (must be greater than 0)")]
    InvalidLength(i64),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File table is full ({0} files)")]
    TableFull(usize),

    #[error("Not enough contiguous space for '{name}' ({blocks} blocks)")]
    InsufficientStorage { name: String, blocks: u64 },

    // 删除已经完成，重新创建失败：文件不复存在
    #[error("Resize of '{name}' failed and the file was removed: {source}")]
    ResizeFailed {
        name: String,
        #[source]
        source: Box<StorageError>,
    },

    // 底层块设备 I/O 错误
    #[error("Disk I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File system corrupted: {0}")]
    Corrupted(String),
}

/// 配置加载 / 校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, StorageError>;
