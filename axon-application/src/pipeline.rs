//! 管线装配（Pipeline）
//!
//! 以外部协作方（存储、策略引擎、分发器、指标汇）装配三条缺省链，
//! 并提供上下文工厂与 `query` / `resource_query` / `command` 入口。
//!
//! 缺省命令链：日志 → 指标 → 活动审计 → 工作单元 → 事件分发 → 授权门 → 处理器。
//! 工作单元位于事件分发与授权门之外侧，使授权检查、处理器变更与级联
//! 事件处理全部发生在同一事务内，任一失败整体回滚。
//!
use crate::chain::{CommandChain, QueryChain, ResourceQueryChain};
use crate::context::{ANONYMOUS, AppContext};
use crate::dispatch::EventDispatcher;
use crate::interceptor::{
    ActivityTracker, AuthorizationGate, EventDispatchInterceptor, LoggingInterceptor,
    MetricsInterceptor, UnitOfWorkInterceptor,
};
use axon_domain::error::DomainResult;
use axon_domain::metrics::{MetricsSink, NoopMetrics};
use axon_domain::policy::PolicyEngine;
use axon_domain::store::Store;
use bon::Builder;
use std::future::Future;
use std::sync::Arc;

/// 请求执行管线
#[derive(Builder)]
pub struct Pipeline {
    store: Arc<dyn Store>,
    policy: Arc<dyn PolicyEngine>,
    dispatcher: Option<Arc<dyn EventDispatcher>>,
    #[builder(default = Arc::new(NoopMetrics))]
    metrics: Arc<dyn MetricsSink>,
}

impl Pipeline {
    /// 以匿名主体构造请求上下文
    pub fn context(&self) -> AppContext {
        self.context_for(ANONYMOUS)
    }

    /// 以指定主体构造请求上下文（携带本管线的分发器与指标汇引用）
    pub fn context_for(&self, principal: impl Into<String>) -> AppContext {
        AppContext::builder()
            .principal(principal.into())
            .maybe_dispatcher(self.dispatcher.clone())
            .metrics(self.metrics.clone())
            .build()
    }

    /// 缺省查询链：日志 → 指标
    pub fn query_chain(&self) -> QueryChain {
        QueryChain::new(vec![
            Arc::new(LoggingInterceptor::query()),
            Arc::new(MetricsInterceptor),
        ])
    }

    /// 缺省资源查询链：日志 → 指标 → 授权门
    pub fn resource_query_chain(&self) -> ResourceQueryChain {
        ResourceQueryChain::new(vec![
            Arc::new(LoggingInterceptor::query()),
            Arc::new(MetricsInterceptor),
            Arc::new(AuthorizationGate::new(self.policy.clone())),
        ])
    }

    /// 缺省命令链：日志 → 指标 → 活动审计 → 工作单元 → 事件分发 → 授权门
    pub fn command_chain(&self) -> CommandChain {
        CommandChain::new(vec![
            Arc::new(LoggingInterceptor::command()),
            Arc::new(MetricsInterceptor),
            Arc::new(ActivityTracker),
            Arc::new(UnitOfWorkInterceptor::new(self.store.clone())),
            Arc::new(EventDispatchInterceptor),
            Arc::new(AuthorizationGate::new(self.policy.clone())),
        ])
    }

    /// 执行普通查询
    pub async fn query<R, F, Fut>(
        &self,
        ctx: &AppContext,
        action: &str,
        handler: F,
    ) -> DomainResult<R>
    where
        R: Send + 'static,
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<R>> + Send + 'static,
    {
        self.query_chain().execute(ctx, action, handler).await
    }

    /// 执行带资源授权的查询
    pub async fn resource_query<R, F, Fut>(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        handler: F,
    ) -> DomainResult<R>
    where
        R: Send + 'static,
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<R>> + Send + 'static,
    {
        self.resource_query_chain()
            .execute(ctx, action, resource, handler)
            .await
    }

    /// 执行命令
    pub async fn command<F, Fut>(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        handler: F,
    ) -> DomainResult<()>
    where
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<()>> + Send + 'static,
    {
        self.command_chain()
            .execute(ctx, action, resource, handler)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_domain::error::DomainError;
    use axon_domain::store::StoreTransaction;
    use async_trait::async_trait;
    use std::any::Any;

    struct AllowAll;

    #[async_trait]
    impl PolicyEngine for AllowAll {
        async fn authorize(
            &self,
            _principal: &str,
            _action: &str,
            _resource: &str,
        ) -> DomainResult<()> {
            Ok(())
        }
    }

    struct NullTx;

    #[async_trait]
    impl StoreTransaction for NullTx {
        async fn commit(&self) -> DomainResult<()> {
            Ok(())
        }

        async fn rollback(&self) -> DomainResult<()> {
            Ok(())
        }

        fn as_any(&self) -> &(dyn Any + Send + Sync) {
            self
        }
    }

    struct NullStore;

    #[async_trait]
    impl Store for NullStore {
        async fn begin(&self) -> DomainResult<Arc<dyn StoreTransaction>> {
            Ok(Arc::new(NullTx))
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::builder()
            .store(Arc::new(NullStore))
            .policy(Arc::new(AllowAll))
            .build()
    }

    #[test]
    fn context_factory_seeds_principal() {
        let p = pipeline();
        assert_eq!(p.context().principal(), ANONYMOUS);
        assert_eq!(p.context_for("u-1").principal(), "u-1");
    }

    #[tokio::test]
    async fn query_returns_handler_value() {
        let p = pipeline();
        let ctx = p.context();
        let got: String = p
            .query(&ctx, "menu.list", |_ctx| async { Ok("soup".to_string()) })
            .await
            .unwrap();
        assert_eq!(got, "soup");
    }

    #[tokio::test]
    async fn command_binds_a_transaction_for_the_handler() {
        let p = pipeline();
        let ctx = p.context_for("u-1");
        // 外层上下文没有事务；处理器看到的子上下文必须携带事务
        assert!(ctx.transaction().is_none());
        p.command(&ctx, "order.complete", "order", |child| async move {
            assert!(child.transaction().is_some());
            Ok(())
        })
        .await
        .unwrap();
        assert!(ctx.transaction().is_none());
    }

    #[tokio::test]
    async fn invalid_error_reaches_the_caller_unchanged() {
        let p = pipeline();
        let ctx = p.context();
        let err = p
            .command(&ctx, "order.complete", "order", |_child| async {
                Err(DomainError::invalid("empty order"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Invalid { .. }));
    }
}
