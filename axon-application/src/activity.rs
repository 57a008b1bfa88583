//! 活动审计记录（Activity）
//!
//! 记录一次命令执行的动作、资源、主体、起止时间、成败与触达实体集合。
//! 触达列表去重且保留首次出现顺序；封存（seal）仅发生一次。
//!
use axon_domain::event::Event;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;

/// 单次命令的审计记录
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    action: String,
    resource: String,
    principal: String,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    touched: Vec<String>,
    success: Option<bool>,
    error: Option<String>,
}

impl Activity {
    /// 以当前时刻作为开始时间创建记录
    pub fn started(
        action: impl Into<String>,
        resource: impl Into<String>,
        principal: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            principal: principal.into(),
            started_at: Utc::now(),
            completed_at: None,
            touched: Vec::new(),
            success: None,
            error: None,
        }
    }

    /// 记录触达的实体；重复ID只保留首次出现
    pub fn touch(&mut self, entity_id: impl Into<String>) {
        let entity_id = entity_id.into();
        if !self.touched.contains(&entity_id) {
            self.touched.push(entity_id);
        }
    }

    /// 封存记录：写入完成时间与成败；重复调用不生效
    pub(crate) fn complete(&mut self, error: Option<String>) {
        if self.completed_at.is_some() {
            return;
        }
        self.completed_at = Some(Utc::now());
        self.success = Some(error.is_none());
        self.error = error;
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn touched(&self) -> &[String] {
        &self.touched
    }

    pub fn success(&self) -> Option<bool> {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// `ActivityCompleted` 事件的稳定名称
pub const ACTIVITY_COMPLETED: &str = "activity.completed";

/// 命令完结事件：携带封存后的审计快照，供审计订阅方消费
#[derive(Debug, Clone)]
pub struct ActivityCompleted {
    pub activity: Activity,
}

impl Event for ActivityCompleted {
    fn name(&self) -> &'static str {
        ACTIVITY_COMPLETED
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_deduplicates_preserving_first_occurrence_order() {
        let mut act = Activity::started("order.complete", "order", "u-1");
        act.touch("order-1");
        act.touch("item-2");
        act.touch("order-1");
        act.touch("item-3");

        assert_eq!(act.touched(), ["order-1", "item-2", "item-3"]);
    }

    #[test]
    fn complete_seals_exactly_once() {
        let mut act = Activity::started("order.complete", "order", "u-1");
        act.complete(Some("boom".into()));

        assert_eq!(act.success(), Some(false));
        assert_eq!(act.error(), Some("boom"));
        let first = act.completed_at();

        // 二次封存不改变任何字段
        act.complete(None);
        assert_eq!(act.success(), Some(false));
        assert_eq!(act.error(), Some("boom"));
        assert_eq!(act.completed_at(), first);
    }

    #[test]
    fn success_completion_has_no_error() {
        let mut act = Activity::started("order.complete", "order", "u-1");
        act.complete(None);

        assert_eq!(act.success(), Some(true));
        assert!(act.error().is_none());
        assert!(act.completed_at().unwrap() >= act.started_at());
    }
}
