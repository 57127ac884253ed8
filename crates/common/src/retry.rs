//! 启动期重试
//!
//! 仅用于服务启动时建立外部依赖（如数据库连接池）。
//! 请求处理路径上不做任何重试，失败直接返回给调用方。

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

/// 指数退避配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 最大尝试次数（包含第一次）
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 初始延迟（毫秒）
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// 最大延迟（毫秒）
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: initial_delay.as_millis() as u64,
            max_delay_ms: max_delay.as_millis() as u64,
        }
    }

    /// 第 n 次失败后的等待时间（n 从 0 开始），每次翻倍，封顶 max_delay
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay_ms = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

/// 带退避的重试执行器
///
/// 所有尝试都失败时返回最后一次的错误。`max_attempts` 为 0 时按 1 处理。
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Startup step succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) if attempt + 1 >= max_attempts => {
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts,
                    error = %e,
                    "Startup step failed, giving up"
                );
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Startup step failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let result: Result<i32, &str> = with_retry(&fast(), "test", || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_success_after_failures() {
        let counter = AtomicU32::new(0);

        let result: Result<i32, &str> = with_retry(&fast(), "test", || {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            async move { if count < 2 { Err("not yet") } else { Ok(7) } }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_with_last_error() {
        let counter = AtomicU32::new(0);

        let result: Result<i32, String> = with_retry(&fast(), "test", || {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("failure {}", count)) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failure 2");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let config = RetryConfig::new(0, Duration::from_millis(1), Duration::from_millis(1));
        let counter = AtomicU32::new(0);

        let result: Result<(), &str> = with_retry(&config, "test", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let config = RetryConfig::new(10, Duration::from_millis(100), Duration::from_secs(1));

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(70), Duration::from_secs(1));
    }
}
