//! 建表迁移与初始商品

use rust_decimal::Decimal;
use sqlx::PgPool;
use storefront_adapter_postgres::{Migration, MigrationManager, TransactionManager, map_sqlx_error};
use storefront_config::DatabaseConfig;
use storefront_errors::AppResult;
use tracing::info;

use crate::domain::Product;

const CREATE_PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    price NUMERIC(12, 2) NOT NULL CHECK (price >= 0)
);
"#;

const CREATE_CARTS: &str = r#"
CREATE TABLE IF NOT EXISTS carts (
    user_id TEXT PRIMARY KEY,
    updated_at TIMESTAMPTZ NOT NULL
);
"#;

const CREATE_CART_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS cart_items (
    user_id TEXT NOT NULL REFERENCES carts (user_id),
    product_id TEXT NOT NULL REFERENCES products (id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    PRIMARY KEY (user_id, product_id)
);
"#;

const CREATE_ORDERS: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    order_id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#;

/// 全部迁移，按版本号执行
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "create_products", CREATE_PRODUCTS),
        Migration::new(2, "create_carts", CREATE_CARTS),
        Migration::new(3, "create_cart_items", CREATE_CART_ITEMS),
        Migration::new(4, "create_orders", CREATE_ORDERS),
    ]
}

/// 初始商品目录
pub fn seed_products() -> Vec<Product> {
    [
        ("1", "Laptop", "A powerful laptop", 120050),
        ("2", "Mouse", "A wireless mouse", 4599),
        ("3", "Keyboard", "Mechanical keyboard", 15000),
        ("4", "Laptop Stand", "Ergonomic stand", 8999),
    ]
    .into_iter()
    .map(|(id, name, description, cents)| Product {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        price: Decimal::new(cents, 2),
    })
    .collect()
}

/// 商品表为空时写入初始商品，返回写入的行数
pub async fn seed_catalog(pool: &PgPool) -> AppResult<u64> {
    let tx_manager = TransactionManager::new(pool.clone());
    let mut tx = tx_manager.begin().await?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e).context("count products"))?;

    if count > 0 {
        TransactionManager::rollback(tx).await;
        return Ok(0);
    }

    let mut inserted = 0;
    for product in seed_products() {
        let result = sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e).context(format!("seed product {}", product.name)))?;
        inserted += result.rows_affected();
    }

    TransactionManager::commit(tx).await?;
    info!(inserted, "Product catalog seeded");
    Ok(inserted)
}

/// 按配置执行迁移和初始数据写入
pub async fn prepare_database(pool: &PgPool, config: &DatabaseConfig) -> AppResult<()> {
    if config.run_migrations {
        let result = MigrationManager::new(pool.clone())
            .migrate(&migrations())
            .await?
            .into_result()?;
        info!(
            applied = result.applied_count(),
            skipped = result.skipped.len(),
            "Database migrations finished"
        );
    }

    if config.seed_catalog {
        seed_catalog(pool).await?;
    }

    Ok(())
}
