//! 应用层：命令编排
//!
//! - [`CommandOrchestrator`]：唯一入口 `submit`，驱动请求走完校验、确认、执行与通知；
//! - [`ConnectionGuard`]：对瞬时连接错误的有界重试；
//! - [`IdempotencyTracker`]：同一逻辑键同一时刻只允许一个请求执行；
//! - [`ports`]：由调用方注入的校验器、确认方与通知器。
//!
pub mod config;
pub mod connection_guard;
pub mod context;
pub mod error;
pub mod idempotency;
pub mod inmemory_repository;
pub mod logging;
pub mod orchestrator;
pub mod ports;

pub use connection_guard::ConnectionGuard;
pub use idempotency::IdempotencyTracker;
pub use inmemory_repository::InMemoryRepository;
pub use orchestrator::{CommandOrchestrator, Completion, Outcome};
