//! 工作单元拦截器
//!
//! 开启存储事务并绑定到派生的子上下文（外层上下文不被原地修改），
//! 以子上下文调用续延：成功则提交，失败则回滚并原样返回内层错误。
//! 每次命令调用恰好一个事务；嵌套命令应复用既有事务（由领域侧只从
//! 顶层入口发起命令来保证）。存储操作前机会性检查取消信号。
//!
use crate::chain::{CommandInterceptor, CommandNext};
use crate::context::AppContext;
use crate::uow::UnitOfWork;
use axon_domain::error::DomainResult;
use axon_domain::store::Store;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// 事务边界拦截器
pub struct UnitOfWorkInterceptor {
    store: Arc<dyn Store>,
}

impl UnitOfWorkInterceptor {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandInterceptor for UnitOfWorkInterceptor {
    async fn intercept(
        &self,
        ctx: &AppContext,
        _action: &str,
        _resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()> {
        ctx.ensure_active()?;

        let tx = self.store.begin().await?;
        let uow = Arc::new(UnitOfWork::new(tx));
        let child = ctx.with_transaction(uow.clone());

        match next.run(&child).await {
            Ok(()) => {
                // 提交前再次检查取消信号
                if let Err(cancelled) = child.ensure_active() {
                    rollback_logging_failure(&uow, &child).await;
                    return Err(cancelled);
                }
                uow.commit(&child).await
            }
            Err(err) => {
                rollback_logging_failure(&uow, &child).await;
                Err(err)
            }
        }
    }
}

// 回滚失败只记日志，原始错误保持不变
async fn rollback_logging_failure(uow: &UnitOfWork, ctx: &AppContext) {
    if let Err(rollback_err) = uow.rollback().await {
        error!(
            request_id = %ctx.request_id(),
            error = %rollback_err,
            "transaction rollback failed"
        );
    }
}
