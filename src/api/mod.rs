// ==========================================
// 装箱发货计划 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP / CLI 调用
// 红线: 不依赖任何 Web 框架
// ==========================================

pub mod error;
pub mod pack_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use pack_api::{
    validate_pack_sizes, CalculatePacksRequest, CalculatePacksResponse, GetPackSizesResponse,
    PackApi, UpdatePackSizesRequest, UpdatePackSizesResponse,
};
