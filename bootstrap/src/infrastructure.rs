//! 基础设施资源管理
//!
//! 服务启动时创建一次，按值克隆后分发给 gRPC 服务、健康检查和 metrics 采集器。

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use storefront_adapter_postgres::{PoolStatus, PostgresConfig, check_connection, create_pool};
use storefront_common::with_retry;
use storefront_config::AppConfig;
use storefront_errors::{AppError, AppResult};
use tracing::info;

/// 基础设施资源容器
#[derive(Clone)]
pub struct Infrastructure {
    config: Arc<AppConfig>,
    postgres_pool: PgPool,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（连接数据库带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let db = &config.database;
        let pg_config = PostgresConfig::new(db.url.expose_secret())
            .with_max_connections(db.max_connections)
            .with_min_connections(db.min_connections)
            .with_acquire_timeout(db.acquire_timeout());

        let postgres_pool = with_retry(&db.connect_retry, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move {
                let pool = create_pool(&cfg).await?;
                check_connection(&pool).await?;
                Ok::<_, AppError>(pool)
            }
        })
        .await?;

        info!(
            max_connections = db.max_connections,
            min_connections = db.min_connections,
            "PostgreSQL connection pool created"
        );

        Ok(Self::new(config, postgres_pool))
    }

    /// 使用已有连接池构建
    pub fn new(config: AppConfig, postgres_pool: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            postgres_pool,
        }
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取 PostgreSQL 连接池状态
    pub fn postgres_pool_status(&self) -> PoolStatus {
        PoolStatus::of(&self.postgres_pool)
    }

    /// 检查 PostgreSQL 是否可用
    pub async fn check_postgres(&self) -> AppResult<()> {
        check_connection(&self.postgres_pool).await
    }
}
