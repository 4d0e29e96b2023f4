// ==========================================
// 装箱发货计划 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{validate_pack_sizes, ApiResult, PackApi};
use crate::config::{AppConfig, StoreKind};
use crate::metrics::PlannerMetrics;
use crate::repository::{
    MemoryPackSizeStore, PackSizeStore, RepositoryResult, SqlitePackSizeStore,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，以 `Arc<AppState>` 形式注入 HTTP 路由
pub struct AppState {
    /// 进程配置
    pub config: AppConfig,

    /// 箱型配置存储
    pub pack_size_store: Arc<dyn PackSizeStore>,

    /// 箱型与计算 API
    pub pack_api: Arc<PackApi>,

    /// 运行计数
    pub metrics: Arc<PlannerMetrics>,
}

impl AppState {
    /// 按配置创建AppState
    ///
    /// 存储类型为 sqlite 时打开 `config.resolve_db_path()`（首次打开写入默认箱型）
    pub fn new(config: AppConfig) -> RepositoryResult<Self> {
        tracing::info!(store = ?config.store, "初始化AppState");

        let store: Arc<dyn PackSizeStore> = match config.store {
            StoreKind::Sqlite => {
                let db_path = config.resolve_db_path();
                tracing::info!("使用数据库: {}", db_path);
                Arc::new(SqlitePackSizeStore::open(
                    &db_path,
                    &config.default_pack_sizes,
                )?)
            }
            StoreKind::Memory => Arc::new(MemoryPackSizeStore::new(&config.default_pack_sizes)),
        };

        Ok(Self::with_store(config, store))
    }

    /// 使用临时箱型创建AppState（内存存储，不写入数据库）
    ///
    /// 箱型按 `config.limits` 校验，与 API 写入路径一致。
    pub fn with_pack_sizes(config: AppConfig, packs: &[i64]) -> ApiResult<Self> {
        validate_pack_sizes(packs, &config.limits)?;
        let store = Arc::new(MemoryPackSizeStore::new(packs));
        Ok(Self::with_store(config, store))
    }

    /// 使用外部提供的存储创建AppState
    pub fn with_store(config: AppConfig, store: Arc<dyn PackSizeStore>) -> Self {
        let metrics = Arc::new(PlannerMetrics::new());
        let pack_api = Arc::new(PackApi::new(store.clone(), config.limits, metrics.clone()));

        Self {
            config,
            pack_size_store: store,
            pack_api,
            metrics,
        }
    }
}
