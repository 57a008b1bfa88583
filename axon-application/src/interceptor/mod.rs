//! 拦截器集合
//!
//! 命令链的声明顺序：日志 → 指标 → 活动审计 → 工作单元 → 事件分发 → 授权门。
//! 授权门紧贴终端处理器，使授权检查、处理器变更与级联事件都处于同一事务内；
//! 可观测性拦截器在最外层，与业务成败无关地记录结果。
//!
pub mod activity_tracker;
pub mod authorize;
pub mod event_dispatch;
pub mod logging;
pub mod metrics;
pub mod unit_of_work;

pub use activity_tracker::ActivityTracker;
pub use authorize::AuthorizationGate;
pub use event_dispatch::EventDispatchInterceptor;
pub use logging::LoggingInterceptor;
pub use metrics::MetricsInterceptor;
pub use unit_of_work::UnitOfWorkInterceptor;
