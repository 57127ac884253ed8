//! 数据库行结构

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{CartItem, Order, Product};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CartItemRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            product: Product {
                id: row.id,
                name: row.name,
                description: row.description,
                price: row.price,
            },
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderRow {
    pub order_id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            order_id: row.order_id,
            status: row.status,
            updated_at: row.updated_at,
        }
    }
}
