//! 查询定义

use std::time::Duration;

/// 商品搜索查询
///
/// `page_size`/`page_token` 只做透传，结果不分页。
#[derive(Debug, Clone, Default)]
pub struct SearchProductsQuery {
    pub query: String,
    pub page_size: i32,
    pub page_token: String,
    /// 调用方剩余的时间，超过后停止推送
    pub timeout: Option<Duration>,
}

/// 订单状态查询
///
/// order_id 不做格式校验，空字符串也是合法的键。
#[derive(Debug, Clone)]
pub struct GetOrderStatusQuery {
    pub order_id: String,
}
