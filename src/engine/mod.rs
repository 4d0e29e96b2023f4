// ==========================================
// 装箱发货计划 - 引擎层
// ==========================================
// 职责: 发货方案规划算法与批量计算
// 红线: 引擎不感知 HTTP / 存储 / 配置来源
// ==========================================

pub mod batch;
pub mod shipment_planner;

// 重导出核心引擎
pub use batch::{BatchError, BatchPlanner, BatchResult, BatchSummary};
pub use shipment_planner::{plan_shipment, ShipmentPlanner};
