use bon::Builder;
use tokio_util::sync::CancellationToken;

/// 应用层上下文（Application Context）
///
/// 承载一次 `submit` 调用的横切信息：
/// - 关联追踪 `correlation_id` 与执行者 `actor_id`，写入日志 span；
/// - 取消令牌 `cancellation`：确认等待与重试退避两处挂起点都会响应它。
///
/// 典型用法：
/// ```rust
/// use interactor_application::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("cor-123".into())
///     .actor_id("u-1".into())
///     .build();
///
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// assert!(!ctx.cancellation().is_cancelled());
/// ```
#[derive(Clone, Debug, Default, Builder)]
pub struct AppContext {
    correlation_id: Option<String>,
    actor_id: Option<String>,
    #[builder(default)]
    cancellation: CancellationToken,
}

impl AppContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}
