// ==========================================
// 装箱发货计划 - 箱型与计算 API
// ==========================================
// 职责: 请求校验 → 读取箱型快照 → 调用规划引擎 → 组装响应
// 红线: 非法请求在进入引擎之前拒绝
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlanningLimits;
use crate::engine::ShipmentPlanner;
use crate::metrics::PlannerMetrics;
use crate::repository::PackSizeStore;

// ==========================================
// 请求 / 响应 DTO
// ==========================================

/// 更新箱型请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePackSizesRequest {
    pub packs: Vec<i64>,
}

/// 更新箱型响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePackSizesResponse {
    pub packs: Vec<i64>,
}

/// 查询箱型响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPackSizesResponse {
    pub packs: Vec<i64>,
}

/// 计算请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatePacksRequest {
    pub items: i64,
}

/// 计算响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatePacksResponse {
    /// 订单数量
    pub order: i64,
    /// 溢出量
    pub leftover: i64,
    /// 箱子总数
    pub total_packs: i64,
    /// 箱型 → 数量
    pub distribution: BTreeMap<i64, i64>,
    /// 实发数量（= order + leftover）
    pub total_items_shipped: i64,
}

// ==========================================
// 箱型校验
// ==========================================

/// 校验箱型列表
///
/// # 校验
/// - 列表非空
/// - 每个箱型在 1..=max_pack_size 之间（箱型上限同时约束规划表长度）
pub fn validate_pack_sizes(packs: &[i64], limits: &PlanningLimits) -> ApiResult<()> {
    if packs.is_empty() {
        return Err(ApiError::InvalidInput("No packs provided".to_string()));
    }
    if let Some(&bad) = packs
        .iter()
        .find(|&&s| s < 1 || s > limits.max_pack_size)
    {
        return Err(ApiError::InvalidInput(format!(
            "Pack size must be between 1 and {}: {}",
            limits.max_pack_size, bad
        )));
    }
    Ok(())
}

// ==========================================
// PackApi - 箱型与计算 API
// ==========================================
pub struct PackApi {
    store: Arc<dyn PackSizeStore>,
    planner: ShipmentPlanner,
    limits: PlanningLimits,
    metrics: Arc<PlannerMetrics>,
}

impl PackApi {
    /// 创建PackApi
    ///
    /// # 参数
    /// - `store`: 箱型配置存储（与 AppState 共享）
    /// - `limits`: 订单数量与箱型上限，读写两侧都按它校验
    /// - `metrics`: 运行计数
    pub fn new(
        store: Arc<dyn PackSizeStore>,
        limits: PlanningLimits,
        metrics: Arc<PlannerMetrics>,
    ) -> Self {
        Self {
            store,
            planner: ShipmentPlanner::new(),
            limits,
            metrics,
        }
    }

    /// 查询当前箱型
    pub fn get_pack_sizes(&self) -> ApiResult<GetPackSizesResponse> {
        let packs = self.store.get_pack_sizes().map_err(|e| {
            tracing::error!(error = %e, "读取箱型失败");
            ApiError::from(e)
        })?;
        Ok(GetPackSizesResponse { packs })
    }

    /// 整体替换箱型
    ///
    /// # 校验
    /// - 列表非空
    /// - 每个箱型在 1..=max_pack_size 之间
    pub fn update_pack_sizes(
        &self,
        request: UpdatePackSizesRequest,
    ) -> ApiResult<UpdatePackSizesResponse> {
        if let Err(e) = validate_pack_sizes(&request.packs, &self.limits) {
            self.metrics.record_invalid_request();
            return Err(e);
        }

        self.store.update_pack_sizes(&request.packs).map_err(|e| {
            tracing::error!(error = %e, "更新箱型失败");
            ApiError::from(e)
        })?;
        self.metrics.record_pack_update();
        tracing::info!(packs = ?request.packs, "箱型已更新");

        Ok(UpdatePackSizesResponse {
            packs: request.packs,
        })
    }

    /// 计算发货方案
    ///
    /// # 校验
    /// - items >= 1
    /// - items <= max_order_quantity
    /// - 当前箱型非空且满足箱型上限
    pub fn calculate_packs(
        &self,
        request: CalculatePacksRequest,
    ) -> ApiResult<CalculatePacksResponse> {
        let items = request.items;
        if items < 1 {
            self.metrics.record_invalid_request();
            return Err(ApiError::InvalidInput("Items must be > 0".to_string()));
        }
        if items > self.limits.max_order_quantity {
            self.metrics.record_invalid_request();
            return Err(ApiError::InvalidInput(format!(
                "Items must be <= {}",
                self.limits.max_order_quantity
            )));
        }

        let packs = self.store.get_pack_sizes().map_err(|e| {
            tracing::error!(error = %e, "计算前读取箱型失败");
            ApiError::from(e)
        })?;
        if packs.is_empty() {
            self.metrics.record_invalid_request();
            return Err(ApiError::InvalidInput("No packs configured".to_string()));
        }
        // 存储中的箱型可能写于更宽的上限之下，或未经 API 写入
        if let Err(e) = validate_pack_sizes(&packs, &self.limits) {
            tracing::warn!(packs = ?packs, error = %e, "已保存的箱型不满足当前上限");
            self.metrics.record_invalid_request();
            return Err(e);
        }

        let plan = {
            let _perf = self.metrics.start_calculation("calculate_packs");
            self.planner.plan(items, &packs)
        };
        if plan.is_invalid() {
            // 前置校验已覆盖所有无效输入
            return Err(ApiError::InternalError(format!(
                "planner rejected items={} packs={:?}",
                items, packs
            )));
        }

        let total_items_shipped = plan.units_shipped();
        tracing::info!(
            order = items,
            leftover = plan.extra_units,
            total_packs = plan.total_boxes,
            "发货方案计算完成"
        );

        Ok(CalculatePacksResponse {
            order: items,
            leftover: plan.extra_units,
            total_packs: plan.total_boxes,
            distribution: plan.box_counts,
            total_items_shipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryPackSizeStore;

    fn create_test_api(sizes: &[i64]) -> (PackApi, Arc<PlannerMetrics>) {
        let metrics = Arc::new(PlannerMetrics::new());
        let api = PackApi::new(
            Arc::new(MemoryPackSizeStore::new(sizes)),
            PlanningLimits {
                max_order_quantity: 1_000_000,
                max_pack_size: 10_000,
            },
            metrics.clone(),
        );
        (api, metrics)
    }

    #[test]
    fn test_calculate_packs_response_shape() {
        let (api, metrics) = create_test_api(&[250, 500, 1000, 2000, 5000]);

        let resp = api
            .calculate_packs(CalculatePacksRequest { items: 501 })
            .unwrap();

        assert_eq!(resp.order, 501);
        assert_eq!(resp.leftover, 249);
        assert_eq!(resp.total_packs, 2);
        assert_eq!(resp.distribution, BTreeMap::from([(250, 1), (500, 1)]));
        assert_eq!(resp.total_items_shipped, 750);
        assert_eq!(metrics.snapshot().calculations, 1);
    }

    #[test]
    fn test_calculate_rejects_non_positive_and_ceiling() {
        let (api, metrics) = create_test_api(&[250]);

        let err = api
            .calculate_packs(CalculatePacksRequest { items: 0 })
            .unwrap_err();
        assert!(err.is_client_error());

        let err = api
            .calculate_packs(CalculatePacksRequest { items: 1_000_001 })
            .unwrap_err();
        assert!(err.is_client_error());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.invalid_requests, 2);
        assert_eq!(snapshot.calculations, 0);
    }

    #[test]
    fn test_calculate_with_empty_store() {
        let (api, _) = create_test_api(&[]);
        let err = api
            .calculate_packs(CalculatePacksRequest { items: 10 })
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_update_validation() {
        let (api, metrics) = create_test_api(&[250]);

        let err = api
            .update_pack_sizes(UpdatePackSizesRequest { packs: vec![] })
            .unwrap_err();
        assert_eq!(err.to_string(), "No packs provided");

        assert!(api
            .update_pack_sizes(UpdatePackSizesRequest { packs: vec![250, 0] })
            .is_err());
        assert!(api
            .update_pack_sizes(UpdatePackSizesRequest { packs: vec![10_001] })
            .is_err());

        // 失败的更新不改变存储
        assert_eq!(api.get_pack_sizes().unwrap().packs, vec![250]);
        assert_eq!(metrics.snapshot().pack_updates, 0);
    }

    #[test]
    fn test_calculate_rejects_stored_sizes_outside_limits() {
        // max_pack_size = 10_000
        let (api, metrics) = create_test_api(&[50_000]);
        let err = api
            .calculate_packs(CalculatePacksRequest { items: 1 })
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Pack size must be between 1 and 10000: 50000");

        let (api, _) = create_test_api(&[250, 0]);
        let err = api
            .calculate_packs(CalculatePacksRequest { items: 1 })
            .unwrap_err();
        assert!(err.is_client_error());

        assert_eq!(metrics.snapshot().calculations, 0);
        assert_eq!(metrics.snapshot().invalid_requests, 1);
    }

    #[test]
    fn test_validate_pack_sizes() {
        let limits = PlanningLimits {
            max_order_quantity: 100,
            max_pack_size: 500,
        };

        assert!(validate_pack_sizes(&[1, 500], &limits).is_ok());
        assert!(validate_pack_sizes(&[], &limits).is_err());
        assert!(validate_pack_sizes(&[250, -5], &limits).is_err());
        assert!(validate_pack_sizes(&[501], &limits).is_err());
    }

    #[test]
    fn test_update_then_calculate_uses_new_sizes() {
        let (api, metrics) = create_test_api(&[250]);

        let resp = api
            .update_pack_sizes(UpdatePackSizesRequest {
                packs: vec![53, 31, 23],
            })
            .unwrap();
        assert_eq!(resp.packs, vec![53, 31, 23]);
        assert_eq!(api.get_pack_sizes().unwrap().packs, vec![53, 31, 23]);

        let resp = api
            .calculate_packs(CalculatePacksRequest { items: 500_000 })
            .unwrap();
        assert_eq!(resp.leftover, 0);
        assert_eq!(resp.total_packs, 9438);
        assert_eq!(
            resp.distribution,
            BTreeMap::from([(23, 2), (31, 7), (53, 9429)])
        );
        assert_eq!(resp.total_items_shipped, 500_000);
        assert_eq!(metrics.snapshot().pack_updates, 1);
    }
}
