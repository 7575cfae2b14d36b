//! 编排器依赖的注入端口
//!
//! 仓储端口位于领域层（`interactor_domain::persist::Repository`），
//! 其余由调用方实现的能力定义在此。
//!
mod confirmer;
mod notifier;
mod validator;

pub use confirmer::{AutoConfirm, Confirmer};
pub use notifier::{Notifier, TracingNotifier};
pub use validator::{AcceptAll, ValidationResult, Validator};
