//! 领域层：商品、购物车、订单及仓储接口

pub mod cart;
pub mod order;
pub mod product;
pub mod repositories;

pub use cart::{Cart, CartItem};
pub use order::{DEFAULT_ORDER_STATUS, Order};
pub use product::Product;
pub use repositories::{CartRepository, OrderRepository, ProductRepository, ProductStream};
