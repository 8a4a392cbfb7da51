use chrono::{DateTime, Local};

use crate::utils::generate_uuid;

pub const FS_TYPE: &str = "BlockFS";

/// 卷的总体信息，格式化时生成
#[derive(Debug, Clone)]
pub struct SuperBlock {
    pub fs_type: &'static str,
    pub volume_id: String,   // 每次格式化生成新的 uuid
    pub unusable_bytes: u64, // 介质大小不是块大小整数倍时丢弃的尾部
    pub formatted_at: DateTime<Local>,
}

impl SuperBlock {
    pub fn new(unusable_bytes: u64) -> Self {
        Self {
            fs_type: FS_TYPE,
            volume_id: generate_uuid(),
            unusable_bytes,
            formatted_at: Local::now(),
        }
    }
}
