//! 命令编排器（CommandOrchestrator）
//!
//! 驱动一个 [`CommandRequest`] 走完“校验 → 确认 → 加幂等锁 → 执行 → 通知”：
//!
//! ```text
//! Created ─validate─► Validated ─► AwaitingConfirmation ─yes─► Confirmed ─► Executing ─┬─► Executed
//!    │ invalid                            │ no / timeout / duplicate                   └─► Failed
//!    └────────────────────────────────────┴──► Cancelled
//! ```
//!
//! 所有错误都在 `submit` 内部收敛：每条路径恰好到达一个终态，并恰好调用一次通知器。
//!
use crate::config::OrchestratorConfig;
use crate::connection_guard::ConnectionGuard;
use crate::context::AppContext;
use crate::error::AppError;
use crate::idempotency::IdempotencyTracker;
use crate::ports::{Confirmer, Notifier, Validator};
use bon::Builder;
use interactor_domain::operation::CommandTarget;
use interactor_domain::persist::Repository;
use interactor_domain::request::{CommandRequest, CommandSummary, RequestTrace};
use interactor_domain::state::RequestState;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// 编排结局：三者互斥
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(AppError),
    Cancellation,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Outcome::Cancellation)
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            Outcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, AppError> {
        match self {
            Outcome::Success(v) => Ok(Some(v)),
            Outcome::Cancellation => Ok(None),
            Outcome::Failure(err) => Err(err),
        }
    }
}

/// `submit` 的返回：结局加上终态请求的快照
#[derive(Debug, Clone)]
pub struct Completion<T> {
    pub outcome: Outcome<T>,
    pub trace: RequestTrace,
}

#[derive(Builder)]
pub struct CommandOrchestrator {
    #[builder(default)]
    guard: ConnectionGuard,
    /// 可在多个编排器间共享，使幂等约束跨越它们生效
    #[builder(default)]
    tracker: Arc<IdempotencyTracker>,
    confirmation_timeout: Option<Duration>,
}

impl Default for CommandOrchestrator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CommandOrchestrator {
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self::builder()
            .guard(ConnectionGuard::new(config.retry_policy())?)
            .maybe_confirmation_timeout(config.confirmation_timeout())
            .build())
    }

    pub fn tracker(&self) -> &Arc<IdempotencyTracker> {
        &self.tracker
    }

    pub fn guard(&self) -> &ConnectionGuard {
        &self.guard
    }

    /// 唯一入口：编排一次命令
    pub async fn submit<T, V, C, R, N>(
        &self,
        ctx: &AppContext,
        request: CommandRequest<T>,
        validator: &V,
        confirmer: &C,
        repository: &R,
        notifier: &N,
    ) -> Completion<T>
    where
        T: CommandTarget,
        V: Validator<T::Payload> + ?Sized,
        C: Confirmer + ?Sized,
        R: Repository<T> + ?Sized,
        N: Notifier<T> + ?Sized,
    {
        let span = tracing::info_span!(
            "submit",
            request_id = %request.request_id(),
            entity = T::TYPE,
            operation = %request.operation_kind(),
            target_id = %request.target_id(),
            correlation_id = ctx.correlation_id(),
            actor_id = ctx.actor_id(),
        );

        self.run(ctx, request, validator, confirmer, repository, notifier)
            .instrument(span)
            .await
    }

    async fn run<T, V, C, R, N>(
        &self,
        ctx: &AppContext,
        mut request: CommandRequest<T>,
        validator: &V,
        confirmer: &C,
        repository: &R,
        notifier: &N,
    ) -> Completion<T>
    where
        T: CommandTarget,
        V: Validator<T::Payload> + ?Sized,
        C: Confirmer + ?Sized,
        R: Repository<T> + ?Sized,
        N: Notifier<T> + ?Sized,
    {
        // 1. 校验
        let verdict = validator.validate(request.payload());
        if !verdict.is_valid() {
            advance(&mut request, RequestState::Cancelled);
            let cause = AppError::Validation(verdict.into_errors());
            tracing::info!(%cause, "rejected by validator");
            notifier.notify_error(&cause).await;
            return finish(request, Outcome::Failure(cause));
        }
        advance(&mut request, RequestState::Validated);

        // 2. 确认
        advance(&mut request, RequestState::AwaitingConfirmation);
        if !self.confirm(ctx, confirmer, &request.summary()).await {
            advance(&mut request, RequestState::Cancelled);
            tracing::info!("cancelled before execution");
            notifier.notify_cancellation().await;
            return finish(request, Outcome::Cancellation);
        }

        // 3. 幂等锁
        let key = request.idempotency_key();
        let Some(lock) = self
            .tracker
            .acquire(key.clone(), request.request_id().clone())
        else {
            advance(&mut request, RequestState::Cancelled);
            let cause = AppError::DuplicateOperation {
                key: key.to_string(),
            };
            tracing::warn!(%key, holder = ?self.tracker.holder(&key), "duplicate operation");
            notifier.notify_error(&cause).await;
            return finish(request, Outcome::Failure(cause));
        };

        // 4. 进入执行窗口
        advance(&mut request, RequestState::Confirmed);
        advance(&mut request, RequestState::Executing);

        // 5. 执行 find → apply → save
        let target_id = request.target_id();
        let kind = request.operation_kind();
        let payload = request.payload();
        let executed = self
            .guard
            .execute(ctx.cancellation(), move |attempt| async move {
                tracing::debug!(attempt, "executing against repository");
                let mut entity = repository.find(target_id).await?;
                entity.apply(kind, payload)?;
                repository.save(entity).await
            })
            .await;

        match executed {
            Ok((entity, attempts)) => {
                request.record_attempts(attempts);
                advance(&mut request, RequestState::Executed);
                lock.release();
                tracing::info!(attempts, "command executed");
                notifier.notify_success(&entity).await;
                finish(request, Outcome::Success(entity))
            }
            Err(err) => {
                request.record_attempts(err.attempts());
                let cause = AppError::from_guard(err);
                advance(&mut request, RequestState::Failed);
                lock.release();
                tracing::warn!(kind = cause.kind(), %cause, attempts = request.attempt_count(), "command failed");
                notifier.notify_error(&cause).await;
                finish(request, Outcome::Failure(cause))
            }
        }
    }

    /// 超时或取消都视为“否”
    async fn confirm<C>(&self, ctx: &AppContext, confirmer: &C, summary: &CommandSummary) -> bool
    where
        C: Confirmer + ?Sized,
    {
        let token = ctx.cancellation();
        let ask = confirmer.request_confirmation(summary);

        match self.confirmation_timeout {
            Some(limit) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!("confirmation interrupted by cancellation");
                    false
                }
                answer = tokio::time::timeout(limit, ask) => match answer {
                    Ok(answer) => answer,
                    Err(_) => {
                        tracing::info!(timeout_ms = limit.as_millis() as u64, "confirmation timed out");
                        false
                    }
                },
            },
            None => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!("confirmation interrupted by cancellation");
                    false
                }
                answer = ask => answer,
            },
        }
    }
}

fn advance<T: CommandTarget>(request: &mut CommandRequest<T>, next: RequestState) {
    let from = request.state();
    match request.transition_to(next) {
        Ok(()) => tracing::debug!(%from, to = %next, "state transition"),
        Err(err) => tracing::error!(%err, "state transition rejected"),
    }
}

fn finish<T: CommandTarget>(request: CommandRequest<T>, outcome: Outcome<T>) -> Completion<T> {
    Completion {
        outcome,
        trace: request.trace(),
    }
}
