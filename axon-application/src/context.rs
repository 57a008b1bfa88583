//! 请求上下文（AppContext）
//!
//! 承载一次调用（命令/查询）的横切信息：执行主体、事件累积列表、
//! 活动中的事务句柄、审计记录、实体缓存，以及本请求使用的分发器/指标汇引用。
//! 上下文每次进入包装层时派生子上下文（如绑定事务），外层上下文永不被原地修改；
//! 可变状态（事件、审计、缓存）经 `Arc` 在父子间共享。
//!
//! 约束：同一上下文实例只在单任务内使用；事务一经绑定，本请求剩余的
//! 全部读写都必须经由该事务（不存在回落到临时连接的路径）。
//!
use crate::activity::Activity;
use crate::dispatch::EventDispatcher;
use crate::entity_cache::EntityCache;
use crate::uow::UnitOfWork;
use axon_domain::error::{DomainError, DomainResult};
use axon_domain::event::Event;
use axon_domain::metrics::{MetricsSink, NoopMetrics};
use bon::Builder;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 未显式设置主体时的缺省值
pub const ANONYMOUS: &str = "anonymous";

/// 一次请求的上下文
#[derive(Builder, Clone)]
pub struct AppContext {
    /// 请求ID（日志关联用）
    #[builder(default = Uuid::new_v4())]
    request_id: Uuid,
    /// 执行主体；缺省为 [`ANONYMOUS`]
    #[builder(default = ANONYMOUS.to_string(), into)]
    principal: String,
    /// 本请求累积的事件（仅追加）
    #[builder(skip)]
    events: Arc<Mutex<Vec<Arc<dyn Event>>>>,
    /// 活动中的工作单元；仅在工作单元拦截器内部的子上下文上存在
    #[builder(skip)]
    transaction: Option<Arc<UnitOfWork>>,
    /// 审计记录；仅在命令执行期间存在
    #[builder(skip)]
    activity: Arc<Mutex<Option<Activity>>>,
    /// 请求级实体缓存
    #[builder(skip)]
    cache: Arc<EntityCache>,
    /// 事件分发器（可缺省：事件只入队不产生副作用）
    dispatcher: Option<Arc<dyn EventDispatcher>>,
    /// 指标汇（缺省为空操作）
    #[builder(default = Arc::new(NoopMetrics))]
    metrics: Arc<dyn MetricsSink>,
    /// 上游取消信号
    #[builder(default)]
    cancellation: CancellationToken,
}

impl AppContext {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// 追加一个事件（仅追加，分发时机由管线决定）
    pub fn emit<E: Event>(&self, event: E) {
        self.events.lock().unwrap().push(Arc::new(event));
    }

    /// 当前事件列表的快照
    pub fn events(&self) -> Vec<Arc<dyn Event>> {
        self.events.lock().unwrap().clone()
    }

    /// 活动中的工作单元（如有）
    pub fn transaction(&self) -> Option<&Arc<UnitOfWork>> {
        self.transaction.as_ref()
    }

    /// 派生绑定事务的子上下文；事件/审计/缓存与父上下文共享
    pub(crate) fn with_transaction(&self, uow: Arc<UnitOfWork>) -> Self {
        let mut child = self.clone();
        child.transaction = Some(uow);
        child
    }

    /// 记录命令触达的实体（命令执行期间外调用为空操作）
    pub fn touch_entity(&self, entity_id: impl Into<String>) {
        if let Some(activity) = self.activity.lock().unwrap().as_mut() {
            activity.touch(entity_id);
        }
    }

    pub(crate) fn begin_activity(&self, activity: Activity) {
        *self.activity.lock().unwrap() = Some(activity);
    }

    /// 取出并封存审计记录
    pub(crate) fn seal_activity(&self, error: Option<String>) -> Option<Activity> {
        let mut guard = self.activity.lock().unwrap();
        let mut activity = guard.take()?;
        activity.complete(error);
        Some(activity)
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn dispatcher(&self) -> Option<&Arc<dyn EventDispatcher>> {
        self.dispatcher.as_ref()
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// 在存储操作前机会性检查取消信号
    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.cancellation.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Ping;

    impl Event for Ping {
        fn name(&self) -> &'static str {
            "ping"
        }

        fn as_any(&self) -> &(dyn Any + Send + Sync) {
            self
        }
    }

    #[test]
    fn defaults_to_anonymous_principal() {
        let ctx = AppContext::builder().build();
        assert_eq!(ctx.principal(), ANONYMOUS);
        assert!(ctx.transaction().is_none());
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn emitted_events_accumulate_in_order() {
        let ctx = AppContext::builder().build();
        ctx.emit(Ping);
        ctx.emit(Ping);

        let events = ctx.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "ping");
    }

    #[test]
    fn touch_outside_command_is_a_noop() {
        let ctx = AppContext::builder().build();
        ctx.touch_entity("order-1");
        assert!(ctx.seal_activity(None).is_none());
    }

    #[test]
    fn sealed_activity_carries_touches_from_shared_state() {
        let ctx = AppContext::builder().principal("u-1").build();
        ctx.begin_activity(Activity::started("order.complete", "order", ctx.principal()));

        // 子上下文共享同一审计记录
        let child = ctx.clone();
        child.touch_entity("order-1");
        child.touch_entity("order-1");

        let sealed = ctx.seal_activity(None).unwrap();
        assert_eq!(sealed.touched(), ["order-1"]);
        assert_eq!(sealed.principal(), "u-1");
    }

    #[test]
    fn cancellation_fails_ensure_active() {
        let ctx = AppContext::builder().build();
        assert!(ctx.ensure_active().is_ok());
        ctx.cancellation().cancel();
        assert!(matches!(ctx.ensure_active(), Err(DomainError::Cancelled)));
    }
}
