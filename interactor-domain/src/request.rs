//! 命令请求（CommandRequest）
//!
//! 一次调用对应一个请求：记录目标实体、操作类型、负载、生命周期状态、
//! 执行尝试次数与迁移时间戳。请求只存活于一次编排过程中，
//! 进入终态后以 [`RequestTrace`] 的形式留存结果。
//!
use crate::error::{DomainError, DomainResult};
use crate::operation::{CommandTarget, OperationKind};
use crate::state::RequestState;
use chrono::{DateTime, Utc};
use interactor_macros::entity_id;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// 请求标识：创建时分配，不可变
#[entity_id]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// 幂等键：`(实体类型, 操作类型, 目标标识)`
///
/// 与 `request_id` 无关，同一实体上的同一种操作在任一时刻只允许一个请求执行。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IdempotencyKey {
    entity_type: &'static str,
    operation_kind: OperationKind,
    target_id: String,
}

impl IdempotencyKey {
    pub fn new(
        entity_type: &'static str,
        operation_kind: OperationKind,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            operation_kind,
            target_id: target_id.into(),
        }
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    pub fn operation_kind(&self) -> OperationKind {
        self.operation_kind
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.entity_type, self.operation_kind, self.target_id
        )
    }
}

/// 交给确认方（Confirmer）展示的请求摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSummary {
    pub request_id: RequestId,
    pub entity_type: &'static str,
    pub operation_kind: OperationKind,
    pub target_id: String,
}

impl fmt::Display for CommandSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.operation_kind, self.entity_type, self.target_id
        )
    }
}

/// 终态请求的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTrace {
    pub request_id: RequestId,
    pub entity_type: &'static str,
    pub operation_kind: OperationKind,
    pub target_id: String,
    pub state: RequestState,
    pub attempt_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_transition_at: DateTime<Utc>,
    /// 按顺序经历过的全部状态（含 `Created`）
    pub history: Vec<RequestState>,
}

/// 一次命令调用
pub struct CommandRequest<T: CommandTarget> {
    request_id: RequestId,
    target_id: T::Id,
    operation_kind: OperationKind,
    payload: T::Payload,
    state: RequestState,
    attempt_count: u32,
    created_at: DateTime<Utc>,
    last_transition_at: DateTime<Utc>,
    history: Vec<RequestState>,
}

impl<T: CommandTarget> CommandRequest<T> {
    /// 以 `Created` 状态创建请求，并分配新的 `request_id`
    pub fn new(target_id: T::Id, operation_kind: OperationKind, payload: T::Payload) -> Self {
        let now = Utc::now();
        Self {
            request_id: RequestId::generate(),
            target_id,
            operation_kind,
            payload,
            state: RequestState::Created,
            attempt_count: 0,
            created_at: now,
            last_transition_at: now,
            history: vec![RequestState::Created],
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn target_id(&self) -> &T::Id {
        &self.target_id
    }

    pub fn operation_kind(&self) -> OperationKind {
        self.operation_kind
    }

    pub fn payload(&self) -> &T::Payload {
        &self.payload
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_transition_at(&self) -> DateTime<Utc> {
        self.last_transition_at
    }

    pub fn history(&self) -> &[RequestState] {
        &self.history
    }

    /// 迁移到下一个状态；非法迁移（含终态后的任何迁移）返回 `InvalidTransition`
    pub fn transition_to(&mut self, next: RequestState) -> DomainResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        self.state = next;
        self.last_transition_at = Utc::now();
        self.history.push(next);
        Ok(())
    }

    /// 记录执行尝试次数；仅在执行窗口内有意义
    pub fn record_attempts(&mut self, attempts: u32) {
        self.attempt_count = attempts;
    }

    pub fn idempotency_key(&self) -> IdempotencyKey {
        IdempotencyKey::new(T::TYPE, self.operation_kind, self.target_id.to_string())
    }

    pub fn summary(&self) -> CommandSummary {
        CommandSummary {
            request_id: self.request_id.clone(),
            entity_type: T::TYPE,
            operation_kind: self.operation_kind,
            target_id: self.target_id.to_string(),
        }
    }

    pub fn trace(&self) -> RequestTrace {
        RequestTrace {
            request_id: self.request_id.clone(),
            entity_type: T::TYPE,
            operation_kind: self.operation_kind,
            target_id: self.target_id.to_string(),
            state: self.state,
            attempt_count: self.attempt_count,
            created_at: self.created_at,
            last_transition_at: self.last_transition_at,
            history: self.history.clone(),
        }
    }
}

impl<T> fmt::Debug for CommandRequest<T>
where
    T: CommandTarget,
    T::Payload: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRequest")
            .field("request_id", &self.request_id)
            .field("entity_type", &T::TYPE)
            .field("target_id", &self.target_id.to_string())
            .field("operation_kind", &self.operation_kind)
            .field("payload", &self.payload)
            .field("state", &self.state)
            .field("attempt_count", &self.attempt_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::value_object::Version;
    use interactor_macros::entity;

    #[entity(id = u64)]
    struct Bookmark {
        url: String,
    }

    impl CommandTarget for Bookmark {
        const TYPE: &'static str = "bookmark";
        type Payload = Option<String>;

        fn apply(&mut self, _kind: OperationKind, payload: &Self::Payload) -> DomainResult<()> {
            if let Some(url) = payload {
                self.url.clone_from(url);
            }
            Ok(())
        }
    }

    fn request() -> CommandRequest<Bookmark> {
        CommandRequest::new(42, OperationKind::Update, Some("https://example.org".into()))
    }

    #[test]
    fn new_request_starts_created() {
        let r = request();
        assert_eq!(r.state(), RequestState::Created);
        assert_eq!(r.attempt_count(), 0);
        assert_eq!(r.history(), &[RequestState::Created]);
        assert_eq!(r.created_at(), r.last_transition_at());
        assert_eq!(r.payload().as_deref(), Some("https://example.org"));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(request().request_id(), request().request_id());
    }

    #[test]
    fn transitions_are_recorded_in_order() {
        let mut r = request();
        r.transition_to(RequestState::Validated).unwrap();
        r.transition_to(RequestState::AwaitingConfirmation).unwrap();
        r.transition_to(RequestState::Cancelled).unwrap();

        assert_eq!(
            r.history(),
            &[
                RequestState::Created,
                RequestState::Validated,
                RequestState::AwaitingConfirmation,
                RequestState::Cancelled,
            ]
        );
        assert!(r.last_transition_at() >= r.created_at());
    }

    #[test]
    fn illegal_transition_is_rejected_and_state_kept() {
        let mut r = request();
        let err = r.transition_to(RequestState::Executing).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: RequestState::Created,
                to: RequestState::Executing,
            }
        );
        assert_eq!(r.state(), RequestState::Created);
        assert_eq!(r.history().len(), 1);
    }

    #[test]
    fn terminal_request_rejects_further_transitions() {
        let mut r = request();
        r.transition_to(RequestState::Cancelled).unwrap();
        assert!(r.transition_to(RequestState::Validated).is_err());
        assert!(r.transition_to(RequestState::Cancelled).is_err());
    }

    #[test]
    fn key_summary_and_trace_describe_the_target() {
        let mut r = request();
        r.record_attempts(2);

        let key = r.idempotency_key();
        assert_eq!(key, IdempotencyKey::new("bookmark", OperationKind::Update, "42"));
        assert_eq!(key.to_string(), "bookmark:update:42");

        let summary = r.summary();
        assert_eq!(summary.to_string(), "update bookmark 42");
        assert_eq!(&summary.request_id, r.request_id());

        let trace = r.trace();
        assert_eq!(trace.attempt_count, 2);
        assert_eq!(trace.state, RequestState::Created);
        assert_eq!(trace.target_id, "42");

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["operation_kind"], "update");
        assert_eq!(json["entity_type"], "bookmark");
        assert_eq!(json["request_id"], r.request_id().to_string());
    }

    #[test]
    fn applying_payload_goes_through_the_target() {
        let r = request();
        let mut b = Bookmark::new(42, Version::new());
        b.apply(r.operation_kind(), r.payload()).unwrap();
        assert_eq!(b.url, "https://example.org");
    }
}
