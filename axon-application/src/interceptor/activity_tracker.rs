//! 活动审计拦截器
//!
//! 进入时创建以 action/resource/principal 与当前时刻为起点的审计记录，
//! 并使处理器可经 `ctx.touch_entity` 登记触达实体；退出时（无论成败）
//! 封存记录，并在配置了分发器时立即投递一条 `activity.completed` 事件。
//!
//! 该拦截器位于工作单元之外，审计投递不与命令自身的事务同属一个原子域：
//! 若主流程已提交而审计投递失败，以 Internal 错误向调用方暴露
//! （"committed with audit-delivery failure"），变更保持已提交。
//!
use crate::activity::{Activity, ActivityCompleted};
use crate::chain::{CommandInterceptor, CommandNext};
use crate::context::AppContext;
use axon_domain::error::{DomainError, DomainResult};
use async_trait::async_trait;
use tracing::warn;

/// 活动审计拦截器
pub struct ActivityTracker;

#[async_trait]
impl CommandInterceptor for ActivityTracker {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()> {
        ctx.begin_activity(Activity::started(action, resource, ctx.principal()));

        let result = next.run(ctx).await;

        let sealed = ctx.seal_activity(result.as_ref().err().map(|err| err.to_string()));
        if let (Some(activity), Some(dispatcher)) = (sealed, ctx.dispatcher().cloned()) {
            let completed = ActivityCompleted { activity };
            if let Err(dispatch_err) = dispatcher.dispatch(ctx, &completed).await {
                match &result {
                    Ok(()) => {
                        return Err(DomainError::internal(format!(
                            "committed with audit-delivery failure: {dispatch_err}"
                        )));
                    }
                    Err(primary) => warn!(
                        request_id = %ctx.request_id(),
                        action,
                        error = %dispatch_err,
                        primary = %primary,
                        "audit delivery failed after command failure"
                    ),
                }
            }
        }

        result
    }
}
