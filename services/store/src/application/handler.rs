//! 商店应用服务
//!
//! 不持有任何跨请求状态，所有数据都在仓储中。

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use storefront_config::StoreConfig;
use storefront_errors::{AppError, AppResult};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};

use super::commands::AddToCartCommand;
use super::queries::{GetOrderStatusQuery, SearchProductsQuery};
use crate::domain::{
    Cart, CartRepository, DEFAULT_ORDER_STATUS, Order, OrderRepository, Product,
    ProductRepository,
};

/// 搜索结果通道容量
const SEARCH_CHANNEL_CAPACITY: usize = 16;

/// 业务参数
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// 相邻两条搜索结果之间的间隔
    pub search_stream_delay: Duration,
    pub default_order_status: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            search_stream_delay: Duration::ZERO,
            default_order_status: DEFAULT_ORDER_STATUS.to_string(),
        }
    }
}

impl From<&StoreConfig> for StoreSettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            search_stream_delay: config.search_stream_delay(),
            default_order_status: config.default_order_status.clone(),
        }
    }
}

/// 商店应用服务
pub struct StoreHandler {
    products: Arc<dyn ProductRepository>,
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    settings: StoreSettings,
}

impl StoreHandler {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            products,
            carts,
            orders,
            settings,
        }
    }

    /// 启动搜索，结果通过通道逐条送出
    ///
    /// 接收端被丢弃后，后台任务停止读取并释放数据库游标。
    /// 读取出错或超过调用方期限时送出一条错误后结束。
    pub fn search_products(&self, query: SearchProductsQuery) -> mpsc::Receiver<AppResult<Product>> {
        let (tx, rx) = mpsc::channel(SEARCH_CHANNEL_CAPACITY);

        if query.page_size != 0 || !query.page_token.is_empty() {
            debug!(
                page_size = query.page_size,
                page_token = %query.page_token,
                "Pagination parameters ignored"
            );
        }

        let products = self.products.clone();
        let delay = self.settings.search_stream_delay;
        let deadline = query.timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        tokio::spawn(
            produce_search_results(products, query.query, delay, deadline, tx).in_current_span(),
        );

        rx
    }

    /// 加入购物车并返回更新后的购物车
    pub async fn add_to_cart(&self, cmd: AddToCartCommand) -> AppResult<Cart> {
        cmd.validate()?;

        self.carts
            .add_item(&cmd.user_id, &cmd.product_id, cmd.quantity)
            .await
            .map_err(|e| {
                e.context(format!(
                    "add to cart (user_id={}, product_id={})",
                    cmd.user_id, cmd.product_id
                ))
            })?;

        let cart = self
            .carts
            .get_cart(&cmd.user_id)
            .await
            .map_err(|e| e.context(format!("load cart (user_id={})", cmd.user_id)))?;

        info!(
            user_id = %cmd.user_id,
            product_id = %cmd.product_id,
            quantity = cmd.quantity,
            items = cart.items.len(),
            total_price = %cart.total_price(),
            "Item added to cart"
        );

        Ok(cart)
    }

    /// 查询订单状态，不存在时以默认状态创建
    ///
    /// 并发的首次查询由 order_id 的唯一约束裁决，插入失败的一方读取胜出方写入的记录。
    pub async fn get_order_status(&self, query: GetOrderStatusQuery) -> AppResult<Order> {
        let order_id = query.order_id.as_str();
        let ctx = || format!("get order status (order_id={})", order_id);

        if let Some(order) = self.orders.find(order_id).await.map_err(|e| e.context(ctx()))? {
            return Ok(order);
        }

        let inserted = self
            .orders
            .insert_if_absent(order_id, &self.settings.default_order_status)
            .await
            .map_err(|e| e.context(ctx()))?;

        if let Some(order) = inserted {
            info!(order_id = %order_id, status = %order.status, "Order created");
            return Ok(order);
        }

        debug!(order_id = %order_id, "Order created concurrently, re-reading");
        self.orders
            .find(order_id)
            .await
            .map_err(|e| e.context(ctx()))?
            .ok_or_else(|| AppError::internal(format!("{}: order vanished after insert conflict", ctx())))
    }
}

async fn produce_search_results(
    products: Arc<dyn ProductRepository>,
    query: String,
    delay: Duration,
    deadline: Option<Instant>,
    tx: mpsc::Sender<AppResult<Product>>,
) {
    let mut results = products.search(&query);
    let mut sent: u64 = 0;
    let expired = expire_at(deadline);
    tokio::pin!(expired);

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                debug!(query = %query, sent, "Search caller went away");
                break;
            }
            _ = &mut expired => {
                send_deadline_exceeded(&tx, &query, sent).await;
                break;
            }
            next = results.next() => next,
        };

        match next {
            None => break,
            Some(Ok(product)) => {
                if sent > 0 && !delay.is_zero() {
                    tokio::select! {
                        _ = tx.closed() => break,
                        _ = &mut expired => {
                            send_deadline_exceeded(&tx, &query, sent).await;
                            break;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                debug!(product_id = %product.id, name = %product.name, "Streaming product");
                let delivered = tokio::select! {
                    _ = &mut expired => {
                        send_deadline_exceeded(&tx, &query, sent).await;
                        break;
                    }
                    result = tx.send(Ok(product)) => result.is_ok(),
                };
                if !delivered {
                    break;
                }
                sent += 1;
            }
            Some(Err(e)) => {
                warn!(query = %query, sent, error = %e, "Search failed mid-stream");
                let _ = tx
                    .send(Err(e.context(format!("search products (query={:?})", query))))
                    .await;
                break;
            }
        }
    }
    drop(results);

    metrics::counter!("store_search_products_streamed_total").increment(sent);
    info!(query = %query, sent, "Search stream finished");
}

/// 到达期限时完成，没有期限时永不完成
async fn expire_at(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn send_deadline_exceeded(tx: &mpsc::Sender<AppResult<Product>>, query: &str, sent: u64) {
    warn!(query = %query, sent, "Search deadline exceeded");
    let _ = tx
        .send(Err(AppError::deadline_exceeded(format!(
            "search products (query={:?}): deadline exceeded after {} results",
            query, sent
        ))))
        .await;
}
