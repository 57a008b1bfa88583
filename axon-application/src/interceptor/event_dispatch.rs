//! 事件分发拦截器
//!
//! 在被包装的处理器成功后，对上下文此刻累积的事件做一次快照，
//! 按发出顺序逐个交给分发器；任何一次分发失败立即返回该错误
//! （剩余事件不再分发，且因本拦截器处于工作单元内侧，整个事务回滚）。
//!
//! 级联规则：分发过程中订阅方追加的新事件不进入本轮快照——单次命令
//! 只做一代扇出，未分发的事件保留在上下文中且不会被自动重投。
//! 未配置分发器时本拦截器为空操作（事件仅入队）。
//!
use crate::chain::{CommandInterceptor, CommandNext};
use crate::context::AppContext;
use axon_domain::error::DomainResult;
use async_trait::async_trait;

/// 事件分发拦截器
pub struct EventDispatchInterceptor;

#[async_trait]
impl CommandInterceptor for EventDispatchInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        _action: &str,
        _resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()> {
        next.run(ctx).await?;

        let Some(dispatcher) = ctx.dispatcher().cloned() else {
            return Ok(());
        };

        // 快照：只分发进入本拦截器时已存在的事件
        let snapshot = ctx.events();
        for event in &snapshot {
            dispatcher.dispatch(ctx, event.as_ref()).await?;
        }

        Ok(())
    }
}
