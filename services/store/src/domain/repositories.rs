//! 仓储接口

use async_trait::async_trait;
use futures::stream::BoxStream;
use storefront_errors::AppResult;

use super::cart::Cart;
use super::order::Order;
use super::product::Product;

/// 商品结果流，出错后流即结束
pub type ProductStream<'a> = BoxStream<'a, AppResult<Product>>;

/// 商品仓储
pub trait ProductRepository: Send + Sync {
    /// 按 id 顺序逐条返回名称包含 query 的商品（不区分大小写）
    fn search<'a>(&'a self, query: &'a str) -> ProductStream<'a>;
}

/// 购物车仓储
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// 在单个事务中创建/更新购物车并累加商品数量
    ///
    /// 商品不存在时返回 NotFound，且不留下任何数据。
    async fn add_item(&self, user_id: &str, product_id: &str, quantity: i32) -> AppResult<()>;

    /// 读取购物车全部明细（按商品 id 排序），没有明细时返回空购物车
    async fn get_cart(&self, user_id: &str) -> AppResult<Cart>;
}

/// 订单仓储
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find(&self, order_id: &str) -> AppResult<Option<Order>>;

    /// 插入新订单，order_id 已存在（包括并发插入）时返回 None
    async fn insert_if_absent(&self, order_id: &str, status: &str) -> AppResult<Option<Order>>;
}
