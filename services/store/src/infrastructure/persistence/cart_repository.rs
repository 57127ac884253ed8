//! PostgreSQL 购物车仓储

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use storefront_adapter_postgres::{
    FOREIGN_KEY_VIOLATION, TransactionManager, has_sqlstate, map_sqlx_error,
};
use storefront_errors::{AppError, AppResult};
use tracing::debug;

use super::rows::CartItemRow;
use crate::domain::{Cart, CartItem, CartRepository};

pub struct PostgresCartRepository {
    pool: PgPool,
    tx_manager: TransactionManager,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tx_manager: TransactionManager::new(pool.clone()),
            pool,
        }
    }

    async fn upsert_item(
        tx: &mut Transaction<'static, Postgres>,
        user_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO carts (user_id, updated_at)
            VALUES ($1, NOW())
            ON CONFLICT (user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        // 数量在数据库内原子累加，并发请求不会丢失增量
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

fn map_add_item_error(e: sqlx::Error, product_id: &str) -> AppError {
    // 购物车行在同一事务内刚写入，外键冲突只可能来自商品
    if has_sqlstate(&e, FOREIGN_KEY_VIOLATION) {
        return AppError::not_found(format!("product {} not found", product_id));
    }
    map_sqlx_error(e).context("upsert cart item")
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn add_item(&self, user_id: &str, product_id: &str, quantity: i32) -> AppResult<()> {
        let mut tx = self.tx_manager.begin().await?;

        match Self::upsert_item(&mut tx, user_id, product_id, quantity).await {
            Ok(()) => {
                TransactionManager::commit(tx).await?;
                debug!(user_id = %user_id, product_id = %product_id, quantity, "Cart item upserted");
                Ok(())
            }
            Err(e) => {
                TransactionManager::rollback(tx).await;
                Err(map_add_item_error(e, product_id))
            }
        }
    }

    async fn get_cart(&self, user_id: &str) -> AppResult<Cart> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT p.id, p.name, p.description, p.price, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.product_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e).context("load cart items"))?;

        Ok(Cart::new(
            user_id,
            rows.into_iter().map(CartItem::from).collect(),
        ))
    }
}
