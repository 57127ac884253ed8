//! PostgreSQL 订单仓储

use async_trait::async_trait;
use sqlx::PgPool;
use storefront_adapter_postgres::map_sqlx_error;
use storefront_errors::AppResult;

use super::rows::OrderRow;
use crate::domain::{Order, OrderRepository};

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn find(&self, order_id: &str) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT order_id, status, updated_at FROM orders WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Order::from))
    }

    async fn insert_if_absent(&self, order_id: &str, status: &str) -> AppResult<Option<Order>> {
        // 冲突时不返回行，由调用方重新读取
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (order_id, status, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (order_id) DO NOTHING
            RETURNING order_id, status, updated_at
            "#,
        )
        .bind(order_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Order::from))
    }
}
