//! 连接守卫（ConnectionGuard）
//!
//! 包裹一次远端调用，按 [`RetryPolicy`] 对瞬时错误做有界重试；
//! 非瞬时错误原样立即返回。守卫本身无共享可变状态，可在并发调用间复用，
//! 每次调用的尝试次数只在本次调用内计数。
//!
use crate::error::AppError;
use interactor_domain::error::Transient;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 重试之间的退避策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// 固定表：第 n 次尝试前等待 `delays[n-1]`，超出部分沿用最后一项
    Schedule(Vec<Duration>),
    /// 指数退避：`base * factor^(n-2)`，封顶 `max`；首次尝试不等待
    Exponential {
        base: Duration,
        factor: u32,
        max: Duration,
    },
}

impl Backoff {
    /// 第 `attempt` 次尝试（从 1 开始）之前的等待时长
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Schedule(delays) => {
                let idx = attempt.saturating_sub(1) as usize;
                delays
                    .get(idx)
                    .or_else(|| delays.last())
                    .copied()
                    .unwrap_or_default()
            }
            Backoff::Exponential { base, factor, max } => {
                if attempt <= 1 {
                    return Duration::ZERO;
                }
                let exp = attempt - 2;
                let mul = factor.checked_pow(exp).unwrap_or(u32::MAX);
                base.checked_mul(mul).map_or(*max, |d| d.min(*max))
            }
        }
    }
}

/// 重试策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Schedule(vec![
                Duration::ZERO,
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]),
        }
    }
}

impl RetryPolicy {
    /// 不等待的重试策略，测试与本地场景常用
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Schedule(vec![Duration::ZERO]),
        }
    }
}

/// 守卫失败的三种结局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError<E> {
    /// 瞬时错误重试耗尽
    Exhausted { attempts: u32, last: E },
    /// 非瞬时错误，原样返回，不重试
    Rejected { attempts: u32, error: E },
    /// 重试前被取消
    Aborted { attempts: u32, last: E },
}

impl<E> GuardError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            GuardError::Exhausted { attempts, .. }
            | GuardError::Rejected { attempts, .. }
            | GuardError::Aborted { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionGuard {
    policy: RetryPolicy,
}

impl ConnectionGuard {
    /// 至少允许一次尝试；`max_attempts == 0` 视为配置错误
    pub fn new(policy: RetryPolicy) -> Result<Self, AppError> {
        if policy.max_attempts == 0 {
            return Err(AppError::Config("max_attempts must be at least 1".into()));
        }
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 执行 `op`，成功时返回 `(值, 实际尝试次数)`
    ///
    /// `op` 接收当前尝试序号（从 1 开始）。取消只在两次尝试之间生效：
    /// 已经开始的尝试总会跑完。
    pub async fn execute<T, E, F, Fut>(
        &self,
        cancellation: &CancellationToken,
        mut op: F,
    ) -> Result<(T, u32), GuardError<E>>
    where
        E: Transient + std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            let last = match op(attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(err) if err.is_transient() => err,
                Err(error) => return Err(GuardError::Rejected { attempts: attempt, error }),
            };

            if attempt >= max_attempts {
                return Err(GuardError::Exhausted {
                    attempts: attempt,
                    last,
                });
            }
            if cancellation.is_cancelled() {
                return Err(GuardError::Aborted {
                    attempts: attempt,
                    last,
                });
            }

            let delay = self.policy.backoff.delay_before(attempt + 1);
            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %last,
                "transient failure, retrying"
            );

            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => {
                        return Err(GuardError::Aborted { attempts: attempt, last });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            attempt += 1;
        }
    }
}
