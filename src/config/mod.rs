// ==========================================
// 装箱发货计划 - 配置层
// ==========================================
// 职责: 进程级配置（端口、存储、默认箱型、输入上限）
// ==========================================

pub mod app_config;

// 重导出核心配置
pub use app_config::{
    env_keys, get_default_db_path, AppConfig, ConfigError, PlanningLimits, StoreKind,
};
