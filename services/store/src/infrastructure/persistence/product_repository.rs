//! PostgreSQL 商品仓储

use futures::StreamExt;
use sqlx::PgPool;
use storefront_adapter_postgres::map_sqlx_error;

use super::rows::ProductRow;
use crate::domain::{Product, ProductRepository, ProductStream};

pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 转义 LIKE 通配符，使 `%`、`_` 和 `\` 按字面匹配
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl ProductRepository for PostgresProductRepository {
    fn search<'a>(&'a self, query: &'a str) -> ProductStream<'a> {
        let pattern = format!("%{}%", escape_like(query));

        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price
            FROM products
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(pattern)
        .fetch(&self.pool)
        .map(|row| row.map(Product::from).map_err(map_sqlx_error))
        .boxed()
    }
}
