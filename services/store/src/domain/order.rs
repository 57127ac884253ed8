//! 订单状态

use chrono::{DateTime, Utc};

/// 首次查询订单时写入的状态
pub const DEFAULT_ORDER_STATUS: &str = "IN_PROGRESS";

/// 订单状态记录，order_id 由调用方指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}
