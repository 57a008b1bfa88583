//! 指标拦截器
//!
//! 按 action 维度记录：每次执行一条时延样本；按结果标签累加总量；
//! 权限拒绝额外累加拒绝计数。纯观测：不改变控制流与错误值，
//! 指标汇缺省为空操作时同样成立。
//!
use crate::chain::{
    BoxAnySend, CommandInterceptor, CommandNext, QueryInterceptor, QueryNext,
    ResourceQueryInterceptor, ResourceQueryNext,
};
use crate::context::AppContext;
use axon_domain::error::DomainResult;
use axon_domain::metrics::{OUTCOME_ERROR, OUTCOME_SUCCESS};
use async_trait::async_trait;
use std::time::Instant;

/// 指标拦截器
pub struct MetricsInterceptor;

fn observe<T>(ctx: &AppContext, action: &str, started: Instant, result: &DomainResult<T>) {
    let sink = ctx.metrics();
    sink.record_duration(action, started.elapsed());
    match result {
        Ok(_) => sink.incr_total(action, OUTCOME_SUCCESS),
        Err(err) => {
            sink.incr_total(action, OUTCOME_ERROR);
            if err.is_permission() {
                sink.incr_denied(action);
            }
        }
    }
}

#[async_trait]
impl QueryInterceptor for MetricsInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        next: QueryNext<'_>,
    ) -> DomainResult<BoxAnySend> {
        let started = Instant::now();
        let result = next.run(ctx).await;
        observe(ctx, action, started, &result);
        result
    }
}

#[async_trait]
impl ResourceQueryInterceptor for MetricsInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        _resource: &str,
        next: ResourceQueryNext<'_>,
    ) -> DomainResult<BoxAnySend> {
        let started = Instant::now();
        let result = next.run(ctx).await;
        observe(ctx, action, started, &result);
        result
    }
}

#[async_trait]
impl CommandInterceptor for MetricsInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        _resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()> {
        let started = Instant::now();
        let result = next.run(ctx).await;
        observe(ctx, action, started, &result);
        result
    }
}
