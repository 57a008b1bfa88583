//! 工作单元（UnitOfWork）
//!
//! 包装一次命令的存储事务，并承载提交时的后置保存步骤（Saver）。
//! `done` 标记一经置位（提交或回滚），任何后续 `register`/`commit`/`rollback`
//! 均视为错误。提交顺序：先提交存储事务，再按注册顺序执行 Saver；
//! 任一 Saver 失败都作为硬错误向调用方暴露。
//!
use crate::context::AppContext;
use axon_domain::error::{DomainError, DomainResult};
use axon_domain::store::StoreTransaction;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// 工作单元参与方：在提交时执行后置保存
#[async_trait]
pub trait Saver: Send + Sync {
    async fn save(&self, ctx: &AppContext) -> DomainResult<()>;
}

/// 一次命令的事务边界
pub struct UnitOfWork {
    tx: Arc<dyn StoreTransaction>,
    savers: Mutex<Vec<Arc<dyn Saver>>>,
    done: AtomicBool,
}

impl UnitOfWork {
    pub fn new(tx: Arc<dyn StoreTransaction>) -> Self {
        Self {
            tx,
            savers: Mutex::new(Vec::new()),
            done: AtomicBool::new(false),
        }
    }

    /// 活动中的存储事务句柄；处理器据此进行本请求内的全部读写
    pub fn store_tx(&self) -> &Arc<dyn StoreTransaction> {
        &self.tx
    }

    /// 注册提交时的后置保存步骤（按注册顺序执行）
    pub fn register(&self, saver: Arc<dyn Saver>) -> DomainResult<()> {
        if self.done.load(Ordering::Acquire) {
            return Err(DomainError::internal("unit of work already completed"));
        }
        self.savers.lock().unwrap().push(saver);
        Ok(())
    }

    /// 提交：存储事务先行，随后按注册顺序执行 Saver
    pub(crate) async fn commit(&self, ctx: &AppContext) -> DomainResult<()> {
        self.finish()?;
        self.tx.commit().await?;

        let savers: Vec<Arc<dyn Saver>> = self.savers.lock().unwrap().clone();
        for saver in savers {
            saver.save(ctx).await?;
        }

        Ok(())
    }

    /// 回滚存储事务
    pub(crate) async fn rollback(&self) -> DomainResult<()> {
        self.finish()?;
        self.tx.rollback().await
    }

    // 占用 done 标记；已完成则报错
    fn finish(&self) -> DomainResult<()> {
        if self
            .done
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DomainError::internal("unit of work already completed"));
        }
        Ok(())
    }
}
