//! 领域事件（Event）
//!
//! 事件是处理器在一次请求中追加的不透明事实，由分发端按具体类型还原消费。
//! 管线本身不理解事件内容，只负责收集与按序分发。
//!
use std::any::Any;

/// 不透明事件：由具体形状（concrete type）标记，携带稳定名称用于路由
pub trait Event: Send + Sync + 'static {
    /// 事件的稳定名称（建议 `<聚合>.<动作>` 形式，不随重构变化）
    fn name(&self) -> &'static str;

    /// 用于分发端按具体类型还原
    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

impl dyn Event {
    /// 尝试按具体类型还原事件
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct StockDepleted {
        item: String,
    }

    impl Event for StockDepleted {
        fn name(&self) -> &'static str {
            "stock.depleted"
        }

        fn as_any(&self) -> &(dyn Any + Send + Sync) {
            self
        }
    }

    #[derive(Debug)]
    struct Other;

    impl Event for Other {
        fn name(&self) -> &'static str {
            "other"
        }

        fn as_any(&self) -> &(dyn Any + Send + Sync) {
            self
        }
    }

    #[test]
    fn downcast_by_concrete_shape() {
        let ev: Box<dyn Event> = Box::new(StockDepleted {
            item: "flour".into(),
        });
        let got = ev.downcast_ref::<StockDepleted>().unwrap();
        assert_eq!(got.item, "flour");
        assert!(ev.downcast_ref::<Other>().is_none());
    }
}
