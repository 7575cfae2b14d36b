//! 日志初始化
//!
//! 库代码只通过 `tracing` 宏输出结构化字段；订阅器由宿主进程按场景安装一次。
//!
use std::sync::Once;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// 人类可读输出，默认 `interactor=debug`
    Development,
    /// JSON 结构化输出，默认 `interactor=info`
    Production,
    /// 空订阅器
    Test,
}

static INIT_ONCE: Once = Once::new();

/// 安装全局订阅器；重复调用无效果。`RUST_LOG` 存在时优先于默认过滤规则。
///
/// ```
/// use interactor_application::logging::{Profile, init};
///
/// init(Profile::Development);
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        // 宿主可能已自行安装订阅器，此时保留宿主的
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter_or("interactor=debug"))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter_or("interactor=info"))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
