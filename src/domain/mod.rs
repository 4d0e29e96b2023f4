// ==========================================
// 装箱发货计划 - 领域模型层
// ==========================================
// 职责: 定义领域实体与值对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod pack_size;
pub mod shipment;

// 重导出核心类型
pub use pack_size::{parse_pack_sizes, PackSizeSnapshot, DEFAULT_PACK_SIZES};
pub use shipment::{ShipmentPlan, INVALID_EXTRA_UNITS};
