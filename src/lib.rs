// ==========================================
// 装箱发货计划 - 核心库
// ==========================================
// 技术栈: Rust + axum + SQLite
// 系统定位: 给定订单数量与可选箱型，计算溢出最小、箱数最少的发货方案
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 规划算法
pub mod engine;

// 数据仓储层 - 箱型配置存储
pub mod repository;

// 配置层 - 进程配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 运行计数
pub mod metrics;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{PackSizeSnapshot, ShipmentPlan, DEFAULT_PACK_SIZES};

// 引擎
pub use engine::{plan_shipment, BatchPlanner, ShipmentPlanner};

// 仓储
pub use repository::{MemoryPackSizeStore, PackSizeStore, SqlitePackSizeStore};

// API
pub use api::{ApiError, ApiResult, PackApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Pack Planner";
