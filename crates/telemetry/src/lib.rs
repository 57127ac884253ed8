//! telemetry - 日志初始化
//!
//! `RUST_LOG` 优先于配置中的日志级别。

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读（开发环境）
    Pretty,
    /// JSON（生产环境）
    Json,
}

impl LogFormat {
    pub fn for_env(app_env: &str) -> Self {
        if app_env == "production" {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// 初始化 tracing
///
/// 已经安装过全局 subscriber 时返回 false，不会 panic。
pub fn init_tracing(log_level: &str, format: LogFormat) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(log_level));

    let result = match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    result.is_ok()
}
