//! 应用层

mod commands;
mod handler;
mod queries;

pub use commands::AddToCartCommand;
pub use handler::{StoreHandler, StoreSettings};
pub use queries::{GetOrderStatusQuery, SearchProductsQuery};
