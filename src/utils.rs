use uuid::Uuid;

/// 生成一个随机唯一 ID
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// 百分比，保留两位小数；总量为 0 时返回 0
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 10000.0 / total as f64).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_two_decimals() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(1, 2), 50.0);
        assert_eq!(percent(5, 0), 0.0);
    }

    #[test]
    fn uuids_are_unique() {
        assert_ne!(generate_uuid(), generate_uuid());
    }
}
