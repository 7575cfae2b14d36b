//! 领域层统一错误定义
//!
//! 仓储端口与领域规则的错误在此汇总为 `DomainError`，
//! 并通过 [`Transient`] 区分可重试的连接类错误与其余终止错误。
//!
use crate::state::RequestState;
use crate::value_object::Version;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    // --- 校验 ---
    #[error("validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    // --- 仓储/远端 ---
    #[error("connection error: {reason}")]
    Connection { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("version conflict: expected={expected}, actual={actual}")]
    VersionConflict { expected: Version, actual: Version },

    // --- 领域规则/命令与状态 ---
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: RequestState,
        to: RequestState,
    },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn invalid_command(reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            reason: reason.into(),
        }
    }
}

/// 错误的瞬时性判定：仅瞬时错误会被重试
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for DomainError {
    fn is_transient(&self) -> bool {
        matches!(self, DomainError::Connection { .. })
    }
}
