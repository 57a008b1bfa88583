//! 统一错误定义
//!
//! 按调用方可见的结果分类（参数校验、未找到、权限拒绝、内部失败等），
//! 拦截器只透传错误、不做类别转换，便于外层按类别决定日志级别与指标标签。
//!
use thiserror::Error;

/// 统一错误类型（管线最小必要集）
///
/// - `Invalid` / `NotFound` / `Permission` 属于调用方可预期的结果；
/// - `Internal` 为基础设施或编程错误，通常不可由调用方自行恢复；
/// - `Cancelled` 表示上游取消信号，原样向外传播；
/// - `TypeMismatch` 仅出现在类型擦除还原失败的场景。
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid: {reason}")]
    Invalid { reason: String },

    #[error("not found: {reason}")]
    NotFound { reason: String },

    #[error("permission denied: {reason}")]
    Permission { reason: String },

    #[error("internal: {reason}")]
    Internal { reason: String },

    #[error("cancelled")]
    Cancelled,

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },
}

impl DomainError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    pub fn permission(reason: impl Into<String>) -> Self {
        Self::Permission {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// 是否为权限拒绝（日志降级与拒绝计数依赖该判断）
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal {
            reason: err.to_string(),
        }
    }
}
