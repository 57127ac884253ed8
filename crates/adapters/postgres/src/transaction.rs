//! PostgreSQL 事务管理模块
//!
//! 事务对象在未提交时被 drop（包括请求被取消的情况），sqlx 会自动回滚。

use sqlx::{PgPool, Postgres, Transaction};
use storefront_errors::AppResult;
use tracing::{debug, warn};

use crate::map_sqlx_error;

/// 事务管理器
#[derive(Clone)]
pub struct TransactionManager {
    pool: PgPool,
}

impl TransactionManager {
    /// 创建新的事务管理器
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 开始事务
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e).context("begin transaction"))?;
        debug!("Transaction started");
        Ok(tx)
    }

    /// 提交事务
    pub async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e).context("commit transaction"))
    }

    /// 回滚事务
    ///
    /// 回滚失败只记录日志，不覆盖调用方手里的原始错误。
    pub async fn rollback(tx: Transaction<'static, Postgres>) {
        if let Err(e) = tx.rollback().await {
            warn!(error = %e, "Failed to rollback transaction");
        } else {
            debug!("Transaction rolled back");
        }
    }
}
