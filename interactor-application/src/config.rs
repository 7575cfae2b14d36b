//! 编排器配置
//!
//! 对外的配置面只有三项，可由 JSON 加载：
//! `{ "max_attempts": 3, "backoff_ms": [0, 200, 400], "confirmation_timeout_ms": null }`
//!
use crate::connection_guard::{Backoff, RetryPolicy};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// 最多尝试次数（含首次）
    pub max_attempts: u32,
    /// 第 n 次尝试前的等待毫秒数，超出部分沿用最后一项
    pub backoff_ms: Vec<u64>,
    /// 等待确认的上限；为空则一直等待
    pub confirmation_timeout_ms: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: vec![0, 200, 400],
            confirmation_timeout_ms: None,
        }
    }
}

impl OrchestratorConfig {
    /// 解析并校验
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let cfg: Self = serde_json::from_str(raw).map_err(|e| AppError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_attempts == 0 {
            return Err(AppError::Config("max_attempts must be at least 1".into()));
        }
        if self.backoff_ms.is_empty() {
            return Err(AppError::Config("backoff_ms must not be empty".into()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Backoff::Schedule(
                self.backoff_ms
                    .iter()
                    .copied()
                    .map(Duration::from_millis)
                    .collect(),
            ),
        }
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_ms.map(Duration::from_millis)
    }
}
