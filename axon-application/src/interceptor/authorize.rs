//! 授权门（AuthorizationGate）
//!
//! 以 `(principal, action, resource)` 向策略引擎求一个放行/拒绝决策。
//! 拒绝即短路：内层处理器不会执行，因而没有副作用、没有事务写入、
//! 也没有事件入队。该拦截器必须是最内层的非终端包装，保证其余拦截器
//! （日志、指标、工作单元、事件分发）都能观察到结果，而受保护的处理器
//! 只在检查通过后执行。
//!
use crate::chain::{
    BoxAnySend, CommandInterceptor, CommandNext, ResourceQueryInterceptor, ResourceQueryNext,
};
use crate::context::AppContext;
use axon_domain::error::DomainResult;
use axon_domain::policy::PolicyEngine;
use async_trait::async_trait;
use std::sync::Arc;

/// 授权拦截器
pub struct AuthorizationGate {
    policy: Arc<dyn PolicyEngine>,
}

impl AuthorizationGate {
    pub fn new(policy: Arc<dyn PolicyEngine>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ResourceQueryInterceptor for AuthorizationGate {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: ResourceQueryNext<'_>,
    ) -> DomainResult<BoxAnySend> {
        self.policy
            .authorize(ctx.principal(), action, resource)
            .await?;
        next.run(ctx).await
    }
}

#[async_trait]
impl CommandInterceptor for AuthorizationGate {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()> {
        self.policy
            .authorize(ctx.principal(), action, resource)
            .await?;
        next.run(ctx).await
    }
}
