//! Proto 转换模块
//!
//! 金额在领域内使用 Decimal，只在这里转换为 proto 的 double。

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::api::proto::store as pb;
use crate::domain::{Cart, CartItem, Order, Product};

pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

pub fn product_to_proto(product: Product) -> pb::Product {
    pb::Product {
        id: product.id,
        name: product.name,
        description: product.description.unwrap_or_default(),
        price: decimal_to_f64(product.price),
    }
}

fn cart_item_to_proto(item: CartItem) -> pb::CartItem {
    pb::CartItem {
        product: Some(product_to_proto(item.product)),
        quantity: item.quantity,
    }
}

pub fn cart_to_proto(cart: Cart) -> pb::Cart {
    let total_price = decimal_to_f64(cart.total_price());
    pb::Cart {
        user_id: cart.user_id,
        items: cart.items.into_iter().map(cart_item_to_proto).collect(),
        total_price,
    }
}

pub fn order_to_proto(order: Order) -> pb::OrderStatus {
    pb::OrderStatus {
        order_id: order.order_id,
        status: order.status,
        updated_at: order.updated_at.timestamp(),
    }
}
