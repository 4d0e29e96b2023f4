// ==========================================
// 装箱发货计划 - 箱型配置实体
// ==========================================
// 职责: 箱型列表快照（配置存储的读出结果）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 系统默认箱型
pub const DEFAULT_PACK_SIZES: [i64; 5] = [250, 500, 1000, 2000, 5000];

/// 箱型列表快照
///
/// 读出时总是独立副本，计算过程中不受并发更新影响。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSizeSnapshot {
    /// 箱型列表（保持写入时的顺序）
    pub sizes: Vec<i64>,
    /// 修订号（每次整体替换 +1）
    pub revision: u64,
    /// 最近一次更新时间
    pub updated_at: DateTime<Utc>,
}

impl PackSizeSnapshot {
    pub fn new(sizes: Vec<i64>, revision: u64) -> Self {
        Self {
            sizes,
            revision,
            updated_at: Utc::now(),
        }
    }
}

/// 解析逗号分隔的箱型列表，如 "250,500,1000"
///
/// 空白项忽略；非整数项返回错误描述。
pub fn parse_pack_sizes(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| format!("无法解析箱型 '{}': {}", s, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pack_sizes() {
        assert_eq!(
            parse_pack_sizes("250, 500,1000 ,").unwrap(),
            vec![250, 500, 1000]
        );
        assert!(parse_pack_sizes("").unwrap().is_empty());
        assert!(parse_pack_sizes("250,abc").is_err());
    }
}
