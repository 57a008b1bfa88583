//! 指标汇（MetricsSink）边界
//!
//! 纯副作用接口：缺省实现为惰性空操作，缺失指标后端绝不导致请求失败。
//!
use std::time::Duration;

/// 请求结果标签
pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_ERROR: &str = "error";

/// 指标汇：按 action 维度记录时延、总量与拒绝计数
pub trait MetricsSink: Send + Sync {
    /// 记录一次执行时延样本（无论成败都记录）
    fn record_duration(&self, action: &str, elapsed: Duration);

    /// 按结果标签累加总量计数
    fn incr_total(&self, action: &str, outcome: &str);

    /// 授权拒绝专用计数
    fn incr_denied(&self, action: &str);
}

/// 空操作实现：未配置指标后端时的缺省值
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_duration(&self, _action: &str, _elapsed: Duration) {}

    fn incr_total(&self, _action: &str, _outcome: &str) {}

    fn incr_denied(&self, _action: &str) {}
}
