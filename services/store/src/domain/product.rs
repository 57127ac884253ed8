//! 商品

use rust_decimal::Decimal;

/// 目录中的商品（服务只读）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// 单价，两位小数
    pub price: Decimal,
}

impl Product {
    /// 名称是否包含查询串（不区分大小写），空串匹配所有商品
    pub fn name_matches(&self, query: &str) -> bool {
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }
}
