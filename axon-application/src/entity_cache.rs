//! 请求级实体缓存（EntityCache）
//!
//! 以 (实体类型, 实体ID) 为键缓存一次请求内已加载的领域对象，避免重复读取。
//! 生命周期与请求上下文一致：不淘汰、不设 TTL、不跨请求共享，随上下文一起丢弃。
//!
use axon_domain::error::DomainResult;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// 可入缓存的实体：提供自身的结构化标识
pub trait CachedEntity: Send + Sync + 'static {
    /// 实体类型（稳定名称）
    fn entity_type(&self) -> &'static str;
    /// 实体ID
    fn entity_id(&self) -> String;
}

type CacheKey = (String, String);

/// 请求级实体缓存
#[derive(Default)]
pub struct EntityCache {
    inner: Mutex<HashMap<CacheKey, Arc<dyn Any + Send + Sync>>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 (类型, ID) 查找；类型不符视作未命中
    pub fn get<T: Send + Sync + 'static>(&self, entity_type: &str, id: &str) -> Option<Arc<T>> {
        let guard = self.inner.lock().unwrap();
        let value = guard.get(&(entity_type.to_string(), id.to_string()))?;
        value.clone().downcast::<T>().ok()
    }

    /// 以实体自身标识为键写入；已有条目无条件覆盖
    pub fn set<E: CachedEntity>(&self, entity: E) {
        let key = (entity.entity_type().to_string(), entity.entity_id());
        self.inner
            .lock()
            .unwrap()
            .insert(key, Arc::new(entity) as Arc<dyn Any + Send + Sync>);
    }

    /// 命中即返回；未命中执行 `fetch`，仅在成功时写入缓存。
    /// 拉取失败不缓存，后续调用会重新拉取。
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        entity_type: &str,
        id: &str,
        fetch: F,
    ) -> DomainResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = DomainResult<T>> + Send,
    {
        if let Some(hit) = self.get::<T>(entity_type, id) {
            return Ok(hit);
        }

        let fetched = Arc::new(fetch().await?);
        self.inner.lock().unwrap().insert(
            (entity_type.to_string(), id.to_string()),
            fetched.clone() as Arc<dyn Any + Send + Sync>,
        );

        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_domain::error::DomainError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        qty: i64,
    }

    impl CachedEntity for Item {
        fn entity_type(&self) -> &'static str {
            "item"
        }

        fn entity_id(&self) -> String {
            self.id.clone()
        }
    }

    #[test]
    fn set_then_get_roundtrip() {
        let cache = EntityCache::new();
        cache.set(Item {
            id: "i-1".into(),
            qty: 3,
        });

        let hit = cache.get::<Item>("item", "i-1").unwrap();
        assert_eq!(hit.qty, 3);
        assert!(cache.get::<Item>("item", "i-2").is_none());
    }

    #[test]
    fn set_overwrites_unconditionally() {
        let cache = EntityCache::new();
        cache.set(Item {
            id: "i-1".into(),
            qty: 3,
        });
        cache.set(Item {
            id: "i-1".into(),
            qty: 9,
        });

        assert_eq!(cache.get::<Item>("item", "i-1").unwrap().qty, 9);
    }

    #[tokio::test]
    async fn get_or_fetch_hits_cache_after_first_call() {
        let cache = EntityCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let got = cache
                .get_or_fetch::<Item, _, _>("item", "i-1", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        Ok(Item {
                            id: "i-1".into(),
                            qty: 5,
                        })
                    }
                })
                .await
                .unwrap();
            assert_eq!(got.qty, 5);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failures_are_never_cached() {
        let cache = EntityCache::new();
        let calls = AtomicUsize::new(0);

        let err = cache
            .get_or_fetch::<Item, _, _>("item", "i-1", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DomainError::not_found("item i-1")) }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        // 第二次调用会重新拉取
        let got = cache
            .get_or_fetch::<Item, _, _>("item", "i-1", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Ok(Item {
                        id: "i-1".into(),
                        qty: 7,
                    })
                }
            })
            .await
            .unwrap();

        assert_eq!(got.qty, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
