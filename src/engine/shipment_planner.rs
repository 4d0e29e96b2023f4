// ==========================================
// 装箱发货计划 - 发货方案规划引擎
// ==========================================
// 算法: 完全背包动态规划（非贪心）
// 目标: 1) 溢出量最小 2) 溢出量相同时箱数最少
// ==========================================
// 输入: 订单数量 + 箱型列表（调用方的列表不会被修改）
// 输出: ShipmentPlan
// ==========================================

use crate::domain::shipment::ShipmentPlan;
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// DpCell - 动态规划单元
// ==========================================

/// 恰好凑出某个数量的最优记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DpCell {
    /// 无法恰好凑出
    Unreached,
    /// 最少箱数 + 最后使用的箱型（0 号单元 last_size = 0）
    Reached { boxes: i64, last_size: usize },
}

// ==========================================
// ShipmentPlanner - 发货方案规划引擎
// ==========================================
pub struct ShipmentPlanner {
    // 无状态引擎，不需要注入依赖
}

impl ShipmentPlanner {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算发货方案
    ///
    /// # 参数
    /// - `order_quantity`: 订单数量（必须 > 0）
    /// - `box_sizes`: 可选箱型（必须非空，元素 > 0）
    ///
    /// # 返回
    /// - 有效请求: 全局最优方案（溢出量优先，其次箱数）
    /// - 无效请求: `extra_units = -1` 的哨兵方案
    #[instrument(skip(self, box_sizes), fields(box_size_count = box_sizes.len()))]
    pub fn plan(&self, order_quantity: i64, box_sizes: &[i64]) -> ShipmentPlan {
        if order_quantity <= 0 || box_sizes.is_empty() {
            tracing::debug!("无效请求: order_quantity={}", order_quantity);
            return ShipmentPlan::invalid();
        }

        // 工作副本：升序、去重、剔除非正箱型
        let mut sizes: Vec<usize> = box_sizes
            .iter()
            .filter(|&&s| s > 0)
            .map(|&s| s as usize)
            .collect();
        if sizes.is_empty() {
            tracing::warn!("箱型列表中没有正数箱型: {:?}", box_sizes);
            return ShipmentPlan::invalid();
        }
        sizes.sort_unstable();
        sizes.dedup();

        let order = order_quantity as usize;
        let max_box = sizes[sizes.len() - 1];
        // 溢出超过一个最大箱型的方案不可能最优
        let limit = order + max_box;

        let table = build_table(&sizes, limit);

        // 溢出量随 x 严格递增，每个溢出量只有一个候选 x；
        // 第一个可达的 x 在两级目标上都是最优
        let chosen = (order..=limit).find(|&x| matches!(table[x], DpCell::Reached { .. }));

        let Some(x) = chosen else {
            // 最小箱型的倍数必然落在长度为 max_box 的窗口内
            unreachable!(
                "no reachable quantity in [{}, {}] for sizes {:?}",
                order, limit, sizes
            );
        };

        let plan = reconstruct(&table, x, (x - order) as i64);
        tracing::debug!(
            extra_units = plan.extra_units,
            total_boxes = plan.total_boxes,
            "发货方案计算完成"
        );
        plan
    }
}

impl Default for ShipmentPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// 计算发货方案（无状态便捷入口）
pub fn plan_shipment(order_quantity: i64, box_sizes: &[i64]) -> ShipmentPlan {
    ShipmentPlanner::new().plan(order_quantity, box_sizes)
}

// ==========================================
// 辅助方法
// ==========================================

/// 构建 0..=limit 的动态规划表
///
/// best(x) = min(best(x - s) + 1)，箱型升序遍历，严格小于才替换（先到先得）
fn build_table(sizes: &[usize], limit: usize) -> Vec<DpCell> {
    let mut table = vec![DpCell::Unreached; limit + 1];
    table[0] = DpCell::Reached {
        boxes: 0,
        last_size: 0,
    };

    for x in 1..=limit {
        let mut best: Option<(i64, usize)> = None;
        for &size in sizes {
            if size > x {
                break;
            }
            if let DpCell::Reached { boxes, .. } = table[x - size] {
                let candidate = boxes + 1;
                if best.map_or(true, |(b, _)| candidate < b) {
                    best = Some((candidate, size));
                }
            }
        }
        if let Some((boxes, last_size)) = best {
            table[x] = DpCell::Reached { boxes, last_size };
        }
    }

    table
}

/// 从 x 沿 last_size 回溯到 0，统计各箱型用量
fn reconstruct(table: &[DpCell], x: usize, extra_units: i64) -> ShipmentPlan {
    let mut box_counts: BTreeMap<i64, i64> = BTreeMap::new();
    let mut total_boxes = 0;
    let mut cur = x;

    while cur > 0 {
        match table[cur] {
            DpCell::Reached { last_size, .. } if last_size > 0 => {
                *box_counts.entry(last_size as i64).or_insert(0) += 1;
                total_boxes += 1;
                cur -= last_size;
            }
            // 不可达单元：停止回溯
            _ => break,
        }
    }

    ShipmentPlan {
        extra_units,
        total_boxes,
        box_counts,
    }
}
