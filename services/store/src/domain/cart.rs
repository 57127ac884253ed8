//! 购物车
//!
//! 总价由明细推导，不单独存储。

use rust_decimal::Decimal;

use super::product::Product;

/// 购物车明细
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i32,
}

impl CartItem {
    /// 小计 = 单价 × 数量
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// 用户购物车
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new(user_id: impl Into<String>, items: Vec<CartItem>) -> Self {
        Self {
            user_id: user_id.into(),
            items,
        }
    }

    /// 总价 = Σ 单价 × 数量
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn quantity_of(&self, product_id: &str) -> Option<i32> {
        self.items
            .iter()
            .find(|item| item.product.id == product_id)
            .map(|item| item.quantity)
    }
}
