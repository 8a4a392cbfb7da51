use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{disk::Geometry, fs::error::ConfigError};

/// 默认块大小：512 字节
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// 默认介质大小：1 MiB
pub const DEFAULT_DISK_SIZE: u64 = 1024 * 1024;

/// 文件表容量
pub const DEFAULT_MAX_FILES: usize = 100;

// 文件名最多 31 个字符
pub const DEFAULT_MAX_NAME_LEN: usize = 31;

// 单次 WRITE 最多 511 字节
pub const DEFAULT_MAX_WRITE_LEN: usize = 511;

/// 启动时固定的文件系统参数，可以从 TOML 文件加载，缺省字段取默认值。
///
/// ```toml
/// block_size = 512
/// disk_size = 1048576
/// max_files = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsConfig {
    pub block_size: usize,
    pub disk_size: u64,
    pub max_files: usize,
    pub max_name_len: usize,
    pub max_write_len: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            disk_size: DEFAULT_DISK_SIZE,
            max_files: DEFAULT_MAX_FILES,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_write_len: DEFAULT_MAX_WRITE_LEN,
        }
    }
}

impl FsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// 校验参数并推导介质几何
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::Invalid("block_size must be positive".into()));
        }
        if self.disk_size < self.block_size as u64 {
            return Err(ConfigError::Invalid(format!(
                "disk_size {} is smaller than one block ({} bytes)",
                self.disk_size, self.block_size
            )));
        }
        if self.max_files == 0 {
            return Err(ConfigError::Invalid("max_files must be positive".into()));
        }
        if self.max_name_len == 0 {
            return Err(ConfigError::Invalid("max_name_len must be positive".into()));
        }
        if self.max_write_len == 0 {
            return Err(ConfigError::Invalid("max_write_len must be positive".into()));
        }
        Ok(Geometry::new(
            self.block_size,
            self.disk_size / self.block_size as u64,
        ))
    }

    /// 不足一整块、无法使用的尾部字节数
    pub fn unusable_bytes(&self) -> u64 {
        if self.block_size == 0 {
            return self.disk_size;
        }
        self.disk_size % self.block_size as u64
    }
}
