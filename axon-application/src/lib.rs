//! axon-application：请求执行管线
//!
//! 为任意领域处理器提供统一的执行骨架：授权、事务边界、事件收集与扇出、
//! 活动审计、请求级实体缓存与可观测性，由有序拦截器链组合而成。
//!
//! - `chain`：链抽象（查询/资源查询/命令三种实例化）；
//! - `context`：请求上下文与派生规则；
//! - `uow`：工作单元与提交时的后置保存协议；
//! - `dispatch`：事件分发边界与进程内实现；
//! - `activity`：命令审计记录；
//! - `entity_cache`：请求级实体缓存；
//! - `interceptor`：缺省拦截器集合；
//! - `pipeline`：缺省链装配与执行入口。
//!
pub mod activity;
pub mod chain;
pub mod context;
pub mod dispatch;
pub mod entity_cache;
pub mod interceptor;
pub mod pipeline;
pub mod uow;

pub use activity::{ACTIVITY_COMPLETED, Activity, ActivityCompleted};
pub use context::{ANONYMOUS, AppContext};
pub use dispatch::{EventDispatcher, EventSubscriber, HandledEventType, InMemoryDispatcher};
pub use entity_cache::{CachedEntity, EntityCache};
pub use pipeline::Pipeline;
pub use uow::{Saver, UnitOfWork};
