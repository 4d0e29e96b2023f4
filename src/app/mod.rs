// ==========================================
// 装箱发货计划 - 应用层
// ==========================================
// 职责: 共享状态与 HTTP 集成,连接调用方与 API 层
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::{create_router, serve};
pub use state::AppState;
