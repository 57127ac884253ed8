//! PostgreSQL 持久化

mod cart_repository;
mod order_repository;
mod product_repository;
mod rows;
mod schema;

pub use cart_repository::PostgresCartRepository;
pub use order_repository::PostgresOrderRepository;
pub use product_repository::{PostgresProductRepository, escape_like};
pub use schema::{migrations, prepare_database, seed_catalog, seed_products};
