//! 请求生命周期状态机（RequestState）
//!
//! ```text
//! Created → Validated → AwaitingConfirmation → Confirmed → Executing → Executed
//!    │          │               │                                │
//!    └──────────┴───────────────┴──→ Cancelled                   └──→ Failed
//! ```
//!
//! `Executed`、`Cancelled`、`Failed` 为终态，终态不再接受任何迁移。
//!
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Created,
    Validated,
    AwaitingConfirmation,
    Confirmed,
    Executing,
    Executed,
    Cancelled,
    Failed,
}

impl RequestState {
    /// 判断从当前状态迁移到 `next` 是否合法
    pub fn can_transition_to(self, next: RequestState) -> bool {
        use RequestState::*;

        matches!(
            (self, next),
            (Created, Validated)
                | (Validated, AwaitingConfirmation)
                | (AwaitingConfirmation, Confirmed)
                | (Confirmed, Executing)
                | (Executing, Executed)
                | (Executing, Failed)
                | (Created | Validated | AwaitingConfirmation, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Executed | RequestState::Cancelled | RequestState::Failed
        )
    }

    /// 持有幂等锁的窗口：已确认或执行中
    pub fn is_in_flight(self) -> bool {
        matches!(self, RequestState::Confirmed | RequestState::Executing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestState::Created => "created",
            RequestState::Validated => "validated",
            RequestState::AwaitingConfirmation => "awaiting_confirmation",
            RequestState::Confirmed => "confirmed",
            RequestState::Executing => "executing",
            RequestState::Executed => "executed",
            RequestState::Cancelled => "cancelled",
            RequestState::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
