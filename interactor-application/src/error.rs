use crate::connection_guard::GuardError;
use interactor_domain::error::DomainError;

/// 应用层错误：编排结果中“失败”一支携带的原因
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("validation: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate operation: key={key}")]
    DuplicateOperation { key: String },

    #[error("exhausted retries after {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        source: DomainError,
    },

    #[error("aborted after {attempts} attempts")]
    Aborted { attempts: u32 },

    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("config: {0}")]
    Config(String),
}

impl AppError {
    /// 稳定的分类名，用于日志字段与通知
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::DuplicateOperation { .. } => "duplicate_operation",
            AppError::ExhaustedRetries { .. } => "exhausted_retries",
            AppError::Aborted { .. } => "aborted",
            AppError::Domain(_) => "domain",
            AppError::Config(_) => "config",
        }
    }

    /// 将 ConnectionGuard 的结果映射为应用层错误
    pub fn from_guard(err: GuardError<DomainError>) -> Self {
        match err {
            GuardError::Exhausted { attempts, last } => AppError::ExhaustedRetries {
                attempts,
                source: last,
            },
            GuardError::Rejected { error, .. } => AppError::from_domain(error),
            GuardError::Aborted { attempts, .. } => AppError::Aborted { attempts },
        }
    }

    /// 领域错误中已有应用层对应分类的，提升为对应变体
    pub fn from_domain(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { reason } => AppError::NotFound(reason),
            DomainError::Validation { errors } => AppError::Validation(errors),
            other => AppError::Domain(other),
        }
    }
}

impl From<GuardError<DomainError>> for AppError {
    fn from(err: GuardError<DomainError>) -> Self {
        AppError::from_guard(err)
    }
}
