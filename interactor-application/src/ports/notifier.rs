use crate::error::AppError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// 通知端口：每次编排恰好调用其中一个方法一次，返回值不被消费
#[async_trait]
pub trait Notifier<T>: Send + Sync {
    async fn notify_success(&self, result: &T);

    async fn notify_error(&self, cause: &AppError);

    async fn notify_cancellation(&self);
}

#[async_trait]
impl<T, N> Notifier<T> for Arc<N>
where
    T: Sync,
    N: Notifier<T> + ?Sized,
{
    async fn notify_success(&self, result: &T) {
        (**self).notify_success(result).await
    }

    async fn notify_error(&self, cause: &AppError) {
        (**self).notify_error(cause).await
    }

    async fn notify_cancellation(&self) {
        (**self).notify_cancellation().await
    }
}

/// 把结果写入日志的通知器
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl<T> Notifier<T> for TracingNotifier
where
    T: Debug + Sync,
{
    async fn notify_success(&self, result: &T) {
        tracing::info!(?result, "command succeeded");
    }

    async fn notify_error(&self, cause: &AppError) {
        tracing::error!(kind = cause.kind(), %cause, "command failed");
    }

    async fn notify_cancellation(&self) {
        tracing::info!("command cancelled");
    }
}
