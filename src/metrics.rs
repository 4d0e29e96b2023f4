// ==========================================
// 装箱发货计划 - 运行计数
// ==========================================
// 职责: 计算次数、无效请求、箱型更新、规划耗时累计
// 暴露: /metrics（JSON 快照）
// ==========================================

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// 服务运行计数（随 AppState 共享）
#[derive(Debug, Default)]
pub struct PlannerMetrics {
    calculations: AtomicU64,
    invalid_requests: AtomicU64,
    pack_updates: AtomicU64,
    planner_micros_total: AtomicU64,
}

/// 计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub calculations: u64,
    pub invalid_requests: u64,
    pub pack_updates: u64,
    pub planner_micros_total: u64,
}

impl PlannerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_invalid_request(&self) {
        self.invalid_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pack_update(&self) {
        self.pack_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// 开始一次规划计时；Guard 释放时计入
    pub fn start_calculation(&self, op: &'static str) -> PerfGuard<'_> {
        PerfGuard {
            metrics: self,
            op,
            start: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calculations: self.calculations.load(Ordering::Relaxed),
            invalid_requests: self.invalid_requests.load(Ordering::Relaxed),
            pack_updates: self.pack_updates.load(Ordering::Relaxed),
            planner_micros_total: self.planner_micros_total.load(Ordering::Relaxed),
        }
    }
}

/// 规划计时 Guard：记录 elapsed 并累计到计数
///
/// 使用方式：
/// ```ignore
/// let _perf = metrics.start_calculation("calculate_packs");
/// // do work...
/// ```
pub struct PerfGuard<'a> {
    metrics: &'a PlannerMetrics,
    op: &'static str,
    start: Instant,
}

impl Drop for PerfGuard<'_> {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros() as u64;
        self.metrics.calculations.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .planner_micros_total
            .fetch_add(elapsed_us, Ordering::Relaxed);

        tracing::debug!(target: "perf", op = self.op, elapsed_us, "done");
    }
}
