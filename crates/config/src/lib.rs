//! storefront-config - 配置加载库
//!
//! 加载顺序：`{dir}/default.toml` → `{dir}/{APP_ENV}.toml` → `STORE_` 前缀环境变量。
//! 环境变量用双下划线表示层级，例如 `STORE_DATABASE__URL`。

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use storefront_common::RetryConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// 启动时执行建表迁移
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    /// 商品表为空时写入初始商品
    #[serde(default = "default_true")]
    pub seed_catalog: bool,
    /// 启动时连接数据库的重试策略
    #[serde(default)]
    pub connect_retry: RetryConfig,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// TLS 证书配置（PEM 文件路径）
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 单次请求超时，0 表示只依赖客户端的 deadline
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub tls: Option<TlsConfig>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    6767
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// 健康检查 HTTP 端口（gRPC 端口 + 1000）
    pub fn health_port(&self) -> u16 {
        self.port.saturating_add(1000)
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// 商店业务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// 搜索结果流中相邻两条消息之间的间隔（毫秒），0 表示不等待
    #[serde(default)]
    pub search_stream_delay_ms: u64,
    /// 首次查询订单时写入的状态
    #[serde(default = "default_order_status")]
    pub default_order_status: String,
}

fn default_order_status() -> String {
    "IN_PROGRESS".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            search_stream_delay_ms: 0,
            default_order_status: default_order_status(),
        }
    }
}

impl StoreConfig {
    pub fn search_stream_delay(&self) -> Duration {
        Duration::from_millis(self.search_stream_delay_ms)
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("STORE_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
