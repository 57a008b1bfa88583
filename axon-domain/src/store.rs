//! 事务存储（Store）边界
//!
//! 管线只依赖 begin/commit/rollback 三个原语；缓冲写的可见性与隔离级别
//! 由存储实现自行保证（要么全部生效、要么全部不生效）。
//! 跨请求并发由存储自身的事务隔离负责，管线不做加锁。
//!
use crate::error::DomainResult;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// 事务存储：开启写事务
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> DomainResult<Arc<dyn StoreTransaction>>;
}

/// 活动中的存储事务句柄
///
/// commit/rollback 各自最多被调用一次（由工作单元的 done 标记保证），
/// 实现方无需自行做重入保护。
#[async_trait]
pub trait StoreTransaction: Send + Sync {
    async fn commit(&self) -> DomainResult<()>;

    async fn rollback(&self) -> DomainResult<()>;

    /// 领域处理器按具体实现类型还原句柄后进行读写
    fn as_any(&self) -> &(dyn Any + Send + Sync);
}
