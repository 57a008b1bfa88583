//! axon-domain：管线的基础契约层
//!
//! 定义统一错误分类与各外部协作方的边界协议：
//! - `PolicyEngine`：授权决策；
//! - `Store` / `StoreTransaction`：事务存储原语；
//! - `MetricsSink`：指标汇（可缺省为空操作）；
//! - `Event`：不透明领域事件。
//!
//! 该 crate 只定义协议，不绑定任何具体实现。
//!
pub mod error;
pub mod event;
pub mod metrics;
pub mod policy;
pub mod store;

pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use metrics::{MetricsSink, NoopMetrics, OUTCOME_ERROR, OUTCOME_SUCCESS};
pub use policy::PolicyEngine;
pub use store::{Store, StoreTransaction};
