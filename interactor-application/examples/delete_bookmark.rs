use interactor_application::config::OrchestratorConfig;
use interactor_application::context::AppContext;
use interactor_application::logging::{self, Profile};
use interactor_application::ports::{AutoConfirm, TracingNotifier, ValidationResult};
use interactor_application::{CommandOrchestrator, InMemoryRepository, Outcome};
use interactor_domain::entity::Entity;
use interactor_domain::error::{DomainError, DomainResult};
use interactor_domain::operation::{CommandTarget, OperationKind};
use interactor_domain::request::CommandRequest;
use interactor_domain::value_object::Version;
use interactor_macros::{entity, entity_id};

#[entity_id]
struct BookmarkId(u64);

#[entity(id = BookmarkId)]
#[derive(Clone)]
struct Bookmark {
    url: String,
    deleted: bool,
}

#[derive(Debug)]
struct DeleteBookmark {
    confirmation_token: String,
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

fn require_token(payload: &DeleteBookmark) -> ValidationResult {
    if payload.confirmation_token.is_empty() {
        ValidationResult::invalid(["confirmation_token is required"])
    } else {
        ValidationResult::ok()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(Profile::Development);

    let config = OrchestratorConfig::from_json(
        r#"{ "max_attempts": 3, "backoff_ms": [0, 100], "confirmation_timeout_ms": 2000 }"#,
    )?;
    let orchestrator = CommandOrchestrator::from_config(&config)?;

    let repo = InMemoryRepository::new();
    let mut bm = Bookmark::new(BookmarkId::new(7), Version::new());
    bm.url = "https://www.rust-lang.org".into();
    repo.insert(bm);

    let ctx = AppContext::builder().correlation_id("cor-1".into()).build();

    for (token, confirm) in [("tok-1", false), ("", true), ("tok-2", true), ("tok-3", true)] {
        let request = CommandRequest::<Bookmark>::new(
            BookmarkId::new(7),
            OperationKind::Delete,
            DeleteBookmark {
                confirmation_token: token.into(),
            },
        );

        let done = orchestrator
            .submit(
                &ctx,
                request,
                &require_token,
                &AutoConfirm(confirm),
                &repo,
                &TracingNotifier,
            )
            .await;

        match &done.outcome {
            Outcome::Success(b) => println!("deleted {} ({}), now {}", b.id(), b.url, b.version()),
            Outcome::Failure(err) => println!("failed [{}]: {err}", err.kind()),
            Outcome::Cancellation => println!("cancelled by user"),
        }
        println!("trace: {}", serde_json::to_string(&done.trace)?);
    }

    Ok(())
}
