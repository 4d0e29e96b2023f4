// ==========================================
// 装箱发货计划 - CSV 批量计算
// ==========================================
// 输入: 含 items 列的 CSV（必须有表头）
// 输出: items,leftover,total_packs,total_items_shipped,distribution
// ==========================================

use crate::domain::shipment::ShipmentPlan;
use crate::engine::shipment_planner::ShipmentPlanner;
use serde::Serialize;
use std::io::{Read, Write};
use thiserror::Error;

/// 批量计算错误
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("CSV解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("缺少列: {0}")]
    MissingColumn(String),

    #[error("第{row}行数据无效: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

pub type BatchResult<T> = Result<T, BatchError>;

/// 批量计算汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub total_items: i64,
    pub total_items_shipped: i64,
    pub total_packs: i64,
}

/// 输出行
#[derive(Debug, Serialize)]
struct BatchOutputRow {
    items: i64,
    leftover: i64,
    total_packs: i64,
    total_items_shipped: i64,
    distribution: String,
}

// ==========================================
// BatchPlanner - 批量计算
// ==========================================
pub struct BatchPlanner {
    planner: ShipmentPlanner,
    max_order_quantity: i64,
}

impl BatchPlanner {
    pub fn new(max_order_quantity: i64) -> Self {
        Self {
            planner: ShipmentPlanner::new(),
            max_order_quantity,
        }
    }

    /// 逐行计算并写出结果
    ///
    /// 任一行无效即中止（行号从 1 开始，表头为第 1 行）。
    pub fn run<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        pack_sizes: &[i64],
    ) -> BatchResult<BatchSummary> {
        if pack_sizes.is_empty() {
            return Err(BatchError::InvalidInput("箱型列表为空".to_string()));
        }
        if let Some(&bad) = pack_sizes.iter().find(|&&s| s < 1) {
            return Err(BatchError::InvalidInput(format!("箱型必须大于0: {}", bad)));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let items_idx = reader
            .headers()?
            .iter()
            .position(|h| h.eq_ignore_ascii_case("items"))
            .ok_or_else(|| BatchError::MissingColumn("items".to_string()))?;

        let mut writer = csv::Writer::from_writer(output);
        let mut summary = BatchSummary::default();

        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = row_idx + 2; // 跳过表头

            let raw = record.get(items_idx).unwrap_or("");
            let items: i64 = raw.parse().map_err(|_| BatchError::InvalidRow {
                row,
                message: format!("items 不是整数: '{}'", raw),
            })?;
            if items < 1 {
                return Err(BatchError::InvalidRow {
                    row,
                    message: format!("items 必须大于0: {}", items),
                });
            }
            if items > self.max_order_quantity {
                return Err(BatchError::InvalidRow {
                    row,
                    message: format!(
                        "items 超出上限: {} > {}",
                        items, self.max_order_quantity
                    ),
                });
            }

            let plan = self.planner.plan(items, pack_sizes);
            if plan.is_invalid() {
                return Err(BatchError::InvalidRow {
                    row,
                    message: format!("无法为 items={} 生成发货方案", items),
                });
            }
            let shipped = plan.units_shipped();
            writer.serialize(BatchOutputRow {
                items,
                leftover: plan.extra_units,
                total_packs: plan.total_boxes,
                total_items_shipped: shipped,
                distribution: format_distribution(&plan),
            })?;

            summary.rows += 1;
            summary.total_items += items;
            summary.total_items_shipped += shipped;
            summary.total_packs += plan.total_boxes;
        }

        writer.flush()?;
        tracing::info!(
            rows = summary.rows,
            total_items = summary.total_items,
            total_items_shipped = summary.total_items_shipped,
            "批量计算完成"
        );
        Ok(summary)
    }
}

/// 箱型用量格式化为 "250:1;500:1"（箱型升序）
pub fn format_distribution(plan: &ShipmentPlan) -> String {
    plan.box_counts
        .iter()
        .map(|(size, count)| format!("{}:{}", size, count))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: [i64; 5] = [250, 500, 1000, 2000, 5000];

    #[test]
    fn test_batch_writes_one_row_per_order() {
        let input = "items\n1\n250\n501\n";
        let mut output = Vec::new();

        let summary = BatchPlanner::new(1_000_000)
            .run(input.as_bytes(), &mut output, &SIZES)
            .unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.total_items, 752);
        assert_eq!(summary.total_items_shipped, 250 + 250 + 750);
        assert_eq!(summary.total_packs, 4);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "items,leftover,total_packs,total_items_shipped,distribution"
        );
        assert_eq!(lines[1], "1,249,1,250,250:1");
        assert_eq!(lines[2], "250,0,1,250,250:1");
        assert_eq!(lines[3], "501,249,2,750,250:1;500:1");
    }

    #[test]
    fn test_batch_reports_invalid_row_number() {
        let input = "order_id,items\nA,10\nB,0\n";
        let err = BatchPlanner::new(1_000_000)
            .run(input.as_bytes(), Vec::new(), &SIZES)
            .unwrap_err();
        match err {
            BatchError::InvalidRow { row, .. } => assert_eq!(row, 3),
            other => panic!("Expected InvalidRow, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_rejects_non_integer_and_ceiling() {
        let err = BatchPlanner::new(1_000_000)
            .run("items\nabc\n".as_bytes(), Vec::new(), &SIZES)
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidRow { row: 2, .. }));

        let err = BatchPlanner::new(100)
            .run("items\n101\n".as_bytes(), Vec::new(), &SIZES)
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidRow { row: 2, .. }));
    }

    #[test]
    fn test_batch_requires_items_column() {
        let err = BatchPlanner::new(1_000_000)
            .run("qty\n10\n".as_bytes(), Vec::new(), &SIZES)
            .unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn(_)));
    }

    #[test]
    fn test_batch_rejects_non_positive_pack_sizes() {
        let mut output = Vec::new();
        let err = BatchPlanner::new(100)
            .run("items
10
".as_bytes(), &mut output, &[0, -5])
            .unwrap_err();

        assert!(matches!(err, BatchError::InvalidInput(_)));
        assert!(output.is_empty());
    }

    #[test]
    fn test_batch_requires_pack_sizes() {
        let err = BatchPlanner::new(1_000_000)
            .run("items\n10\n".as_bytes(), Vec::new(), &[])
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidInput(_)));
    }
}
