//! PostgreSQL 迁移管理模块
//!
//! 按版本号顺序执行建表 SQL，已执行的版本记录在迁移表中并校验 SHA-256

use sha2::{Digest, Sha256};
use sqlx::PgPool;
use storefront_errors::{AppError, AppResult};
use tracing::{info, warn};

/// 迁移记录
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// 迁移定义
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub checksum: String,
}

impl Migration {
    /// 创建新的迁移
    pub fn new(version: i64, name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        let up_sql = up_sql.into();
        let checksum = Self::calculate_checksum(&up_sql);
        Self {
            version,
            name: name.into(),
            up_sql,
            checksum,
        }
    }

    fn calculate_checksum(sql: &str) -> String {
        format!("{:x}", Sha256::digest(sql.as_bytes()))
    }
}

/// 迁移管理器
pub struct MigrationManager {
    pool: PgPool,
    table_name: String,
}

impl MigrationManager {
    /// 创建新的迁移管理器
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_name: "_migrations".to_string(),
        }
    }

    /// 初始化迁移表
    pub async fn init(&self) -> AppResult<()> {
        let create_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                checksum VARCHAR(64) NOT NULL
            )
            "#,
            self.table_name
        );

        sqlx::query(&create_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create migration table: {}", e)))?;

        info!(table = %self.table_name, "Migration table initialized");
        Ok(())
    }

    /// 获取已应用的迁移
    pub async fn get_applied_migrations(&self) -> AppResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT version, name, applied_at, checksum FROM {} ORDER BY version ASC",
            self.table_name
        );

        sqlx::query_as::<_, MigrationRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get migrations: {}", e)))
    }

    /// 在单个事务中应用迁移并写入记录
    pub async fn apply(&self, migration: &Migration) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        // 多个实例同时启动时只允许一个执行迁移
        sqlx::query(&format!("LOCK TABLE {} IN EXCLUSIVE MODE", self.table_name))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to lock migration table: {}", e)))?;

        let check_sql = format!("SELECT version FROM {} WHERE version = $1", self.table_name);
        let existing: Option<(i64,)> = sqlx::query_as(&check_sql)
            .bind(migration.version)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to check migration: {}", e)))?;

        if existing.is_some() {
            warn!(
                version = migration.version,
                name = %migration.name,
                "Migration already applied, skipping"
            );
            return Ok(());
        }

        // 一个迁移可以包含多条语句，使用简单查询协议执行
        sqlx::raw_sql(&migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to apply migration {}: {}",
                    migration.version, e
                ))
            })?;

        let insert_sql = format!(
            "INSERT INTO {} (version, name, checksum) VALUES ($1, $2, $3)",
            self.table_name
        );
        sqlx::query(&insert_sql)
            .bind(migration.version)
            .bind(&migration.name)
            .bind(&migration.checksum)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to record migration: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit migration: {}", e)))?;

        info!(
            version = migration.version,
            name = %migration.name,
            "Migration applied successfully"
        );

        Ok(())
    }

    /// 应用所有待处理的迁移
    pub async fn migrate(&self, migrations: &[Migration]) -> AppResult<MigrationResult> {
        self.init().await?;

        let applied = self.get_applied_migrations().await?;

        let mut result = MigrationResult::default();

        let mut sorted_migrations: Vec<_> = migrations.iter().collect();
        sorted_migrations.sort_by_key(|m| m.version);

        for migration in sorted_migrations {
            if let Some(record) = applied.iter().find(|r| r.version == migration.version) {
                if record.checksum != migration.checksum {
                    result.errors.push(MigrationError {
                        version: migration.version,
                        name: migration.name.clone(),
                        error: "Checksum mismatch - migration has been modified".to_string(),
                    });
                    break;
                }
                result.skipped.push(migration.version);
                continue;
            }

            match self.apply(migration).await {
                Ok(()) => result.applied.push(migration.version),
                Err(e) => {
                    result.errors.push(MigrationError {
                        version: migration.version,
                        name: migration.name.clone(),
                        error: e.to_string(),
                    });
                    // 停止后续迁移
                    break;
                }
            }
        }

        Ok(result)
    }
}

/// 迁移结果
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    /// 已应用的迁移版本
    pub applied: Vec<i64>,
    /// 跳过的迁移版本
    pub skipped: Vec<i64>,
    /// 错误
    pub errors: Vec<MigrationError>,
}

impl MigrationResult {
    /// 是否成功
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// 应用的迁移数量
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// 转换为错误（存在失败的迁移时）
    pub fn into_result(self) -> AppResult<Self> {
        match self.errors.first() {
            None => Ok(self),
            Some(first) => Err(AppError::internal(format!(
                "Migration {} ({}) failed: {}",
                first.version, first.name, first.error
            ))),
        }
    }
}

/// 迁移错误
#[derive(Debug, Clone)]
pub struct MigrationError {
    pub version: i64,
    pub name: String,
    pub error: String,
}
