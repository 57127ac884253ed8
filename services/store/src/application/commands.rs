//! 购物车命令

use storefront_errors::{AppError, AppResult};

/// 加入购物车命令
#[derive(Debug, Clone)]
pub struct AddToCartCommand {
    pub user_id: String,
    pub product_id: String,
    pub quantity: i32,
}

impl AddToCartCommand {
    /// 在访问数据库之前校验参数
    pub fn validate(&self) -> AppResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }
        if self.product_id.trim().is_empty() {
            return Err(AppError::validation("product_id must not be empty"));
        }
        if self.quantity <= 0 {
            return Err(AppError::validation(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}
