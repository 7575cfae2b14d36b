use async_trait::async_trait;
use interactor_application::connection_guard::{Backoff, ConnectionGuard, RetryPolicy};
use interactor_application::context::AppContext;
use interactor_application::error::AppError;
use interactor_application::ports::{
    AcceptAll, AutoConfirm, Confirmer, Notifier, ValidationResult,
};
use interactor_application::{CommandOrchestrator, InMemoryRepository, Outcome};
use interactor_domain::entity::Entity;
use interactor_domain::error::{DomainError, DomainResult};
use interactor_domain::operation::{CommandTarget, OperationKind};
use interactor_domain::persist::Repository;
use interactor_domain::request::{CommandRequest, CommandSummary, IdempotencyKey};
use interactor_domain::state::RequestState;
use interactor_domain::value_object::Version;
use interactor_macros::entity;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

// ---------- domain fixtures ----------

#[entity]
#[derive(Clone, PartialEq)]
struct Bookmark {
    url: String,
    deleted: bool,
}

#[derive(Debug, Clone, Default)]
struct DeleteBookmark {
    confirmation_token: Option<String>,
}

impl CommandTarget for Bookmark {
    const TYPE: &'static str = "bookmark";
    type Payload = DeleteBookmark;

    fn apply(&mut self, kind: OperationKind, _payload: &DeleteBookmark) -> DomainResult<()> {
        match kind {
            OperationKind::Delete if self.deleted => {
                Err(DomainError::invalid_state("bookmark already deleted"))
            }
            OperationKind::Delete => {
                self.deleted = true;
                Ok(())
            }
            other => Err(DomainError::invalid_command(format!("{other} on bookmark"))),
        }
    }
}

#[entity]
#[derive(Clone, PartialEq)]
struct TouristAccount {
    active: bool,
}

impl CommandTarget for TouristAccount {
    const TYPE: &'static str = "tourist_account";
    type Payload = ();

    fn apply(&mut self, kind: OperationKind, _payload: &()) -> DomainResult<()> {
        match kind {
            OperationKind::Toggle => {
                self.active = !self.active;
                Ok(())
            }
            other => Err(DomainError::invalid_command(format!("{other} on account"))),
        }
    }
}

fn require_token(payload: &DeleteBookmark) -> ValidationResult {
    match payload.confirmation_token.as_deref() {
        Some(token) if !token.is_empty() => ValidationResult::ok(),
        _ => ValidationResult::invalid(["confirmation_token is required"]),
    }
}

// ---------- collaborators ----------

/// 可编排故障的仓储：计数 find/save，可注入连接错误、版本冲突与 find 闸门
struct ScriptedRepo<E: Entity> {
    inner: InMemoryRepository<E>,
    finds: AtomicU32,
    saves: AtomicU32,
    failing_saves: AtomicU32,
    offline: bool,
    conflicting: bool,
    gate: Option<Arc<Notify>>,
}

impl<E: Entity + Clone> ScriptedRepo<E> {
    fn with(entities: impl IntoIterator<Item = E>) -> Self {
        let inner = InMemoryRepository::new();
        for e in entities {
            inner.insert(e);
        }
        Self {
            inner,
            finds: AtomicU32::new(0),
            saves: AtomicU32::new(0),
            failing_saves: AtomicU32::new(0),
            offline: false,
            conflicting: false,
            gate: None,
        }
    }

    fn failing_saves(self, n: u32) -> Self {
        self.failing_saves.store(n, Ordering::SeqCst);
        self
    }

    fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn conflicting(mut self) -> Self {
        self.conflicting = true;
        self
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn finds(&self) -> u32 {
        self.finds.load(Ordering::SeqCst)
    }

    fn saves(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: Entity + Clone + 'static> Repository<E> for ScriptedRepo<E> {
    async fn find(&self, id: &E::Id) -> DomainResult<E> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.offline {
            return Err(DomainError::connection("backend unreachable"));
        }
        self.inner.find(id).await
    }

    async fn save(&self, entity: E) -> DomainResult<E> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.conflicting {
            return Err(DomainError::VersionConflict {
                expected: entity.version(),
                actual: entity.version().next(),
            });
        }
        let pending = self.failing_saves.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_saves.store(pending - 1, Ordering::SeqCst);
            return Err(DomainError::connection("connection reset"));
        }
        self.inner.save(entity).await
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Success,
    Error(AppError),
    Cancellation,
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T: Sync> Notifier<T> for RecordingNotifier {
    async fn notify_success(&self, _result: &T) {
        self.notices.lock().unwrap().push(Notice::Success);
    }

    async fn notify_error(&self, cause: &AppError) {
        self.notices.lock().unwrap().push(Notice::Error(cause.clone()));
    }

    async fn notify_cancellation(&self) {
        self.notices.lock().unwrap().push(Notice::Cancellation);
    }
}

/// 从不应答的确认方
struct Silent;

#[async_trait]
impl Confirmer for Silent {
    async fn request_confirmation(&self, _summary: &CommandSummary) -> bool {
        std::future::pending::<bool>().await
    }
}

fn immediate(max_attempts: u32) -> CommandOrchestrator {
    CommandOrchestrator::builder()
        .guard(ConnectionGuard::new(RetryPolicy::immediate(max_attempts)).unwrap())
        .build()
}

fn bookmark(id: &str) -> Bookmark {
    let mut b = Bookmark::new(id.into(), Version::from_value(1));
    b.url = format!("https://example.org/{id}");
    b
}

fn delete_request(id: &str, token: Option<&str>) -> CommandRequest<Bookmark> {
    CommandRequest::new(
        id.into(),
        OperationKind::Delete,
        DeleteBookmark {
            confirmation_token: token.map(Into::into),
        },
    )
}

fn toggle_request(id: &str) -> CommandRequest<TouristAccount> {
    CommandRequest::new(id.into(), OperationKind::Toggle, ())
}

// ---------- scenarios ----------

#[tokio::test]
async fn delete_happy_path() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([bookmark("bm-1")]);
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", Some("tok-123")),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    let deleted = match done.outcome {
        Outcome::Success(b) => b,
        other => panic!("expected success, got {other:?}"),
    };
    assert!(deleted.deleted);
    assert_eq!(deleted.version(), Version::from_value(2));
    assert_eq!(done.trace.state, RequestState::Executed);
    assert_eq!(done.trace.attempt_count, 1);
    assert_eq!(
        done.trace.history,
        vec![
            RequestState::Created,
            RequestState::Validated,
            RequestState::AwaitingConfirmation,
            RequestState::Confirmed,
            RequestState::Executing,
            RequestState::Executed,
        ]
    );
    assert_eq!((repo.finds(), repo.saves()), (1, 1));
    assert_eq!(notifier.notices(), vec![Notice::Success]);
}

#[tokio::test]
async fn delete_without_confirmation_token_is_rejected() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([bookmark("bm-1")]);
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", None),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    let cause = AppError::Validation(vec!["confirmation_token is required".into()]);
    assert_eq!(done.outcome, Outcome::Failure(cause.clone()));
    assert_eq!(done.trace.state, RequestState::Cancelled);
    assert_eq!(done.trace.attempt_count, 0);
    assert_eq!((repo.finds(), repo.saves()), (0, 0));
    assert_eq!(notifier.notices(), vec![Notice::Error(cause)]);
}

#[tokio::test]
async fn toggle_recovers_from_transient_failures() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([TouristAccount::new("acc-1".into(), Version::from_value(1))])
        .failing_saves(2);
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            toggle_request("acc-1"),
            &AcceptAll,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    assert!(done.outcome.is_success());
    assert_eq!(done.trace.attempt_count, 3);
    assert_eq!(done.trace.state, RequestState::Executed);
    assert_eq!((repo.finds(), repo.saves()), (3, 3));
    assert!(repo.inner.get(&"acc-1".to_string()).unwrap().active);
    assert_eq!(notifier.notices(), vec![Notice::Success]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_duplicate_is_rejected_without_touching_the_repository() {
    let orch = Arc::new(immediate(3));
    let gate = Arc::new(Notify::new());
    let repo = Arc::new(
        ScriptedRepo::with([TouristAccount::new("acc-1".into(), Version::from_value(1))])
            .gated(gate.clone()),
    );
    let first_notifier = Arc::new(RecordingNotifier::default());

    let first = {
        let orch = orch.clone();
        let repo = repo.clone();
        let notifier = first_notifier.clone();
        tokio::spawn(async move {
            orch.submit(
                &AppContext::default(),
                toggle_request("acc-1"),
                &AcceptAll,
                &AutoConfirm(true),
                &repo,
                &notifier,
            )
            .await
        })
    };

    let key = IdempotencyKey::new("tourist_account", OperationKind::Toggle, "acc-1");
    tokio::time::timeout(Duration::from_secs(5), async {
        while repo.finds() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("first submit never reached the repository");
    assert!(orch.tracker().is_held(&key));

    let second_notifier = RecordingNotifier::default();
    let second = orch
        .submit(
            &AppContext::default(),
            toggle_request("acc-1"),
            &AcceptAll,
            &AutoConfirm(true),
            &repo,
            &second_notifier,
        )
        .await;

    let duplicate = AppError::DuplicateOperation {
        key: "tourist_account:toggle:acc-1".into(),
    };
    assert_eq!(second.outcome, Outcome::Failure(duplicate.clone()));
    assert_eq!(second.trace.state, RequestState::Cancelled);
    assert_eq!(repo.finds(), 1);
    assert_eq!(second_notifier.notices(), vec![Notice::Error(duplicate)]);

    gate.notify_one();
    let first = first.await.unwrap();
    assert!(first.outcome.is_success());
    assert_eq!(first_notifier.notices(), vec![Notice::Success]);
    assert!(!orch.tracker().is_held(&key));
    assert_eq!(orch.tracker().in_flight(), 0);
}

#[tokio::test]
async fn declined_confirmation_cancels_without_repository_calls() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([bookmark("bm-1")]);
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", Some("tok")),
            &require_token,
            &AutoConfirm(false),
            &repo,
            &notifier,
        )
        .await;

    assert!(done.outcome.is_cancellation());
    assert_eq!(done.trace.state, RequestState::Cancelled);
    assert_eq!((repo.finds(), repo.saves()), (0, 0));
    assert_eq!(notifier.notices(), vec![Notice::Cancellation]);
}

// ---------- properties ----------

#[tokio::test]
async fn retries_stop_at_max_attempts() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([bookmark("bm-1")]).offline();
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", Some("tok")),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    let cause = AppError::ExhaustedRetries {
        attempts: 3,
        source: DomainError::connection("backend unreachable"),
    };
    assert_eq!(done.outcome, Outcome::Failure(cause.clone()));
    assert_eq!(done.trace.attempt_count, 3);
    assert_eq!(done.trace.state, RequestState::Failed);
    assert_eq!(repo.finds(), 3);
    assert_eq!(notifier.notices(), vec![Notice::Error(cause)]);
    assert_eq!(orch.tracker().in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_entity_fails_on_first_attempt_without_backoff() {
    let orch = CommandOrchestrator::default();
    let repo = ScriptedRepo::<Bookmark>::with([]);
    let notifier = RecordingNotifier::default();
    let started = Instant::now();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("ghost", Some("tok")),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    assert_eq!(
        done.outcome,
        Outcome::Failure(AppError::NotFound("entity ghost".into()))
    );
    assert_eq!(done.trace.attempt_count, 1);
    assert_eq!(done.trace.state, RequestState::Failed);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(repo.finds(), 1);
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test]
async fn version_conflict_is_not_retried() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([bookmark("bm-1")]).conflicting();
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", Some("tok")),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    let cause = AppError::Domain(DomainError::VersionConflict {
        expected: Version::from_value(1),
        actual: Version::from_value(2),
    });
    assert_eq!(done.outcome, Outcome::Failure(cause));
    assert_eq!(done.trace.attempt_count, 1);
    assert_eq!(repo.saves(), 1);
}

#[tokio::test]
async fn business_rule_violation_fails_and_releases_the_key() {
    let orch = immediate(3);
    let mut gone = bookmark("bm-1");
    gone.deleted = true;
    let repo = ScriptedRepo::with([gone]);
    let notifier = RecordingNotifier::default();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", Some("tok")),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    assert_eq!(
        done.outcome.error(),
        Some(&AppError::Domain(DomainError::invalid_state(
            "bookmark already deleted"
        )))
    );
    assert_eq!(repo.saves(), 0);
    assert_eq!(orch.tracker().in_flight(), 0);
}

#[tokio::test]
async fn sequential_submits_on_the_same_key_both_run() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([TouristAccount::new("acc-1".into(), Version::from_value(1))]);
    let notifier = RecordingNotifier::default();

    for _ in 0..2 {
        let done = orch
            .submit(
                &AppContext::default(),
                toggle_request("acc-1"),
                &AcceptAll,
                &AutoConfirm(true),
                &repo,
                &notifier,
            )
            .await;
        assert!(done.outcome.is_success());
    }

    let account = repo.inner.get(&"acc-1".to_string()).unwrap();
    assert!(!account.active);
    assert_eq!(account.version(), Version::from_value(3));
    assert_eq!(notifier.notices(), vec![Notice::Success, Notice::Success]);
}

// ---------- suspension points ----------

#[tokio::test(start_paused = true)]
async fn unanswered_confirmation_times_out_as_cancellation() {
    let orch = CommandOrchestrator::builder()
        .confirmation_timeout(Duration::from_secs(5))
        .build();
    let repo = ScriptedRepo::with([bookmark("bm-1")]);
    let notifier = RecordingNotifier::default();
    let started = Instant::now();

    let done = orch
        .submit(
            &AppContext::default(),
            delete_request("bm-1", Some("tok")),
            &require_token,
            &Silent,
            &repo,
            &notifier,
        )
        .await;

    assert!(done.outcome.is_cancellation());
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(repo.finds(), 0);
    assert_eq!(notifier.notices(), vec![Notice::Cancellation]);
}

#[tokio::test]
async fn cancelled_context_resolves_confirmation_to_no() {
    let orch = immediate(3);
    let repo = ScriptedRepo::with([bookmark("bm-1")]);
    let notifier = RecordingNotifier::default();
    let ctx = AppContext::builder().correlation_id("cor-7".into()).build();
    ctx.cancellation().cancel();

    let done = orch
        .submit(
            &ctx,
            delete_request("bm-1", Some("tok")),
            &require_token,
            &Silent,
            &repo,
            &notifier,
        )
        .await;

    assert!(done.outcome.is_cancellation());
    assert_eq!(repo.finds(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_pending_retries() {
    let orch = CommandOrchestrator::builder()
        .guard(ConnectionGuard::new(RetryPolicy {
            max_attempts: 5,
            backoff: Backoff::Schedule(vec![Duration::ZERO, Duration::from_secs(10)]),
        })
        .unwrap())
        .build();
    let repo = ScriptedRepo::with([bookmark("bm-1")]).offline();
    let notifier = RecordingNotifier::default();
    let ctx = AppContext::default();

    let token = ctx.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
    });

    let done = orch
        .submit(
            &ctx,
            delete_request("bm-1", Some("tok")),
            &require_token,
            &AutoConfirm(true),
            &repo,
            &notifier,
        )
        .await;

    let cause = AppError::Aborted { attempts: 1 };
    assert_eq!(done.outcome, Outcome::Failure(cause.clone()));
    assert_eq!(done.trace.state, RequestState::Failed);
    assert_eq!(done.trace.attempt_count, 1);
    assert_eq!(repo.finds(), 1);
    assert_eq!(notifier.notices(), vec![Notice::Error(cause)]);
}
