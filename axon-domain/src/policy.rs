//! 策略引擎（PolicyEngine）边界
//!
//! 管线只消费 `(principal, action, resource)` 的放行/拒绝决策，
//! 规则语言与求值器属于外部协作方。引擎实例应在应用启动时显式构建并
//! 注入授权拦截器，而非进程级惰性单例；规则重载由实现方自行提供。
//!
use crate::error::DomainResult;
use async_trait::async_trait;

/// 授权决策边界
///
/// 返回约定：
/// - `Ok(())`：放行；
/// - `Err(Permission)`：显式拒绝（可预期结果，内层处理器不会被调用）；
/// - `Err(Internal)`：求值失败（与拒绝严格区分）。
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    async fn authorize(&self, principal: &str, action: &str, resource: &str) -> DomainResult<()>;
}
