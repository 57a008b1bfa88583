//! 日志拦截器
//!
//! 进入时以 debug 级记录开始；退出时按结果分级：成功 debug、
//! 授权拒绝 warn（"denied"，属可预期结果，降级记录）、其余失败 error（"failed"）。
//! 纯观测：不改变控制流与错误值。
//!
use crate::chain::{
    BoxAnySend, CommandInterceptor, CommandNext, QueryInterceptor, QueryNext,
    ResourceQueryInterceptor, ResourceQueryNext,
};
use crate::context::AppContext;
use axon_domain::error::DomainResult;
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// 日志拦截器（按链种类标记）
pub struct LoggingInterceptor {
    kind: &'static str,
}

impl LoggingInterceptor {
    pub fn query() -> Self {
        Self { kind: "query" }
    }

    pub fn command() -> Self {
        Self { kind: "command" }
    }

    fn on_start(&self, ctx: &AppContext, action: &str, resource: Option<&str>) {
        debug!(
            request_id = %ctx.request_id(),
            principal = ctx.principal(),
            kind = self.kind,
            action,
            resource = resource.unwrap_or("-"),
            "started"
        );
    }

    fn on_finish<T>(&self, ctx: &AppContext, action: &str, result: &DomainResult<T>) {
        match result {
            Ok(_) => debug!(
                request_id = %ctx.request_id(),
                kind = self.kind,
                action,
                "completed"
            ),
            Err(err) if err.is_permission() => warn!(
                request_id = %ctx.request_id(),
                principal = ctx.principal(),
                kind = self.kind,
                action,
                error = %err,
                "denied"
            ),
            Err(err) => error!(
                request_id = %ctx.request_id(),
                kind = self.kind,
                action,
                error = %err,
                "failed"
            ),
        }
    }
}

#[async_trait]
impl QueryInterceptor for LoggingInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        next: QueryNext<'_>,
    ) -> DomainResult<BoxAnySend> {
        self.on_start(ctx, action, None);
        let result = next.run(ctx).await;
        self.on_finish(ctx, action, &result);
        result
    }
}

#[async_trait]
impl ResourceQueryInterceptor for LoggingInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: ResourceQueryNext<'_>,
    ) -> DomainResult<BoxAnySend> {
        self.on_start(ctx, action, Some(resource));
        let result = next.run(ctx).await;
        self.on_finish(ctx, action, &result);
        result
    }
}

#[async_trait]
impl CommandInterceptor for LoggingInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()> {
        self.on_start(ctx, action, Some(resource));
        let result = next.run(ctx).await;
        self.on_finish(ctx, action, &result);
        result
    }
}
