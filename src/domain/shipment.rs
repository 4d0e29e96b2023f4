// ==========================================
// 装箱发货计划 - 发货方案实体
// ==========================================
// 职责: 承载规划引擎的输出（溢出量、箱数、各箱型用量）
// 红线: 无效请求只通过 extra_units = -1 表达，不抛错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 无效请求哨兵值（订单数量非正 / 箱型列表为空）
pub const INVALID_EXTRA_UNITS: i64 = -1;

// ==========================================
// ShipmentPlan - 发货方案
// ==========================================

/// 发货方案
///
/// - `extra_units`: 溢出量（实发 - 订单数量）；无效请求时为 -1
/// - `total_boxes`: 使用的箱子总数
/// - `box_counts`: 箱型 → 使用数量（不含数量为 0 的箱型）
///
/// 调用方必须先检查 `extra_units < 0` 再信任其余字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentPlan {
    pub extra_units: i64,
    pub total_boxes: i64,
    pub box_counts: BTreeMap<i64, i64>,
}

impl ShipmentPlan {
    /// 无效请求的方案（哨兵）
    pub fn invalid() -> Self {
        Self {
            extra_units: INVALID_EXTRA_UNITS,
            total_boxes: 0,
            box_counts: BTreeMap::new(),
        }
    }

    /// 是否为无效请求哨兵
    pub fn is_invalid(&self) -> bool {
        self.extra_units < 0
    }

    /// 实发数量（Σ 箱型 × 数量）
    pub fn units_shipped(&self) -> i64 {
        self.box_counts
            .iter()
            .map(|(size, count)| size * count)
            .sum()
    }
}
