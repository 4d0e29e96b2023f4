// ==========================================
// 装箱发货计划 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供箱型配置的读写接口,屏蔽存储细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod pack_size_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use pack_size_repo::{MemoryPackSizeStore, PackSizeStore, SqlitePackSizeStore};
