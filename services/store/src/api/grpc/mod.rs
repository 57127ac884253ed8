//! gRPC 服务模块

mod conversions;
mod store_service;

pub use conversions::{cart_to_proto, decimal_to_f64, order_to_proto, product_to_proto};
pub use store_service::StoreServiceImpl;
