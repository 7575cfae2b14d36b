use async_trait::async_trait;
use interactor_domain::request::CommandSummary;
use std::sync::Arc;

/// 确认方：执行前向用户/调用方索取“是/否”
///
/// 可能长时间挂起（等待人工输入）；超时与取消由编排器负责，届时视为“否”。
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn request_confirmation(&self, summary: &CommandSummary) -> bool;
}

#[async_trait]
impl<T> Confirmer for Arc<T>
where
    T: Confirmer + ?Sized,
{
    async fn request_confirmation(&self, summary: &CommandSummary) -> bool {
        (**self).request_confirmation(summary).await
    }
}

/// 固定应答
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn request_confirmation(&self, summary: &CommandSummary) -> bool {
        tracing::debug!(%summary, answer = self.0, "auto confirmation");
        self.0
    }
}
