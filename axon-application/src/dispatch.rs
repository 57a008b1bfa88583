//! 事件分发（dispatch）
//!
//! - `EventDispatcher`：管线消费的分发边界，将单个事件扇出给零或多个订阅方；
//! - `EventSubscriber`：按事件名订阅（单个/多个/全部）的消费方；
//! - `InMemoryDispatcher`：进程内实现，按注册顺序同步逐个调用订阅方。
//!
//! 无匹配订阅方不是错误：记一条警告后返回成功。订阅方处理失败立即向上
//! 返回该错误（由外层事务决定回滚）。订阅方在处理过程中向上下文追加的
//! 新事件不会被本轮分发处理。
//!
use crate::context::AppContext;
use axon_domain::error::DomainResult;
use axon_domain::event::Event;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// 事件分发边界：把一个事件交给所有匹配的订阅方
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, ctx: &AppContext, event: &dyn Event) -> DomainResult<()>;
}

/// 订阅方声明的事件范围
#[derive(Clone, Debug)]
pub enum HandledEventType {
    One(&'static str),
    Many(Vec<&'static str>),
    All,
}

/// 事件订阅方：消费某一类/多类/全部事件
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// 订阅方名称（用于日志与审计）
    fn subscriber_name(&self) -> &str;

    /// 订阅的事件范围
    fn handled_event_type(&self) -> HandledEventType;

    /// 处理事件；可经 `ctx.emit` 追加级联事件（下一代事件不在本轮分发）
    async fn handle(&self, ctx: &AppContext, event: &dyn Event) -> DomainResult<()>;
}

/// 进程内分发器
///
/// 按事件名维护订阅注册表；`All` 订阅方对每个事件都会被调用，
/// 排在按名匹配的订阅方之后。
#[derive(Default)]
pub struct InMemoryDispatcher {
    by_type: DashMap<&'static str, Vec<Arc<dyn EventSubscriber>>>,
    catch_all: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册订阅方
    pub fn register(&self, subscriber: Arc<dyn EventSubscriber>) {
        match subscriber.handled_event_type() {
            HandledEventType::One(name) => {
                self.by_type.entry(name).or_default().push(subscriber);
            }
            HandledEventType::Many(names) => {
                for name in names {
                    self.by_type.entry(name).or_default().push(subscriber.clone());
                }
            }
            HandledEventType::All => {
                self.catch_all.write().unwrap().push(subscriber);
            }
        }
    }

    fn matching(&self, event_name: &str) -> Vec<Arc<dyn EventSubscriber>> {
        let mut merged: Vec<Arc<dyn EventSubscriber>> = Vec::new();
        if let Some(list) = self.by_type.get(event_name) {
            merged.extend(list.iter().cloned());
        }
        merged.extend(self.catch_all.read().unwrap().iter().cloned());
        merged
    }
}

#[async_trait]
impl EventDispatcher for InMemoryDispatcher {
    async fn dispatch(&self, ctx: &AppContext, event: &dyn Event) -> DomainResult<()> {
        let subscribers = self.matching(event.name());
        if subscribers.is_empty() {
            warn!(
                request_id = %ctx.request_id(),
                event = event.name(),
                "no subscriber registered for event"
            );
            return Ok(());
        }

        for subscriber in subscribers {
            subscriber.handle(ctx, event).await?;
        }

        Ok(())
    }
}
