//! 测试用内存仓储

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use store_service::api::StoreServiceImpl;
use store_service::application::{StoreHandler, StoreSettings};
use store_service::domain::{
    Cart, CartItem, CartRepository, Order, OrderRepository, Product, ProductRepository,
    ProductStream,
};
use store_service::infrastructure::persistence::seed_products;
use storefront_errors::{AppError, AppResult};

/// 内存商品目录
pub struct InMemoryProductRepository {
    products: Vec<Product>,
    /// 送出这么多条后返回错误
    fail_after: Option<usize>,
    /// 已经从“游标”中取出的条数
    pulled: Arc<AtomicUsize>,
}

impl InMemoryProductRepository {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            fail_after: None,
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn pulled(&self) -> Arc<AtomicUsize> {
        self.pulled.clone()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn search<'a>(&'a self, query: &'a str) -> ProductStream<'a> {
        let mut matches: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.name_matches(query))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        let mut results: Vec<AppResult<Product>> = matches.into_iter().map(Ok).collect();
        if let Some(n) = self.fail_after {
            results.truncate(n);
            results.push(Err(AppError::unavailable("connection reset")));
        }

        let pulled = self.pulled.clone();
        futures::stream::iter(results)
            .inspect(move |_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }
}

/// 内存购物车，商品不存在时整个操作不生效
pub struct InMemoryCartRepository {
    catalog: Vec<Product>,
    carts: Mutex<HashMap<String, BTreeMap<String, i32>>>,
}

impl InMemoryCartRepository {
    pub fn new(catalog: Vec<Product>) -> Self {
        Self {
            catalog,
            carts: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_cart(&self, user_id: &str) -> bool {
        self.carts.lock().unwrap().contains_key(user_id)
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn add_item(&self, user_id: &str, product_id: &str, quantity: i32) -> AppResult<()> {
        if !self.catalog.iter().any(|p| p.id == product_id) {
            return Err(AppError::not_found(format!("product {} not found", product_id)));
        }

        let mut carts = self.carts.lock().unwrap();
        let current = carts
            .get(user_id)
            .and_then(|items| items.get(product_id))
            .copied()
            .unwrap_or(0);
        let updated = current
            .checked_add(quantity)
            .ok_or_else(|| AppError::validation("Numeric value out of range"))?;

        carts
            .entry(user_id.to_string())
            .or_default()
            .insert(product_id.to_string(), updated);
        Ok(())
    }

    async fn get_cart(&self, user_id: &str) -> AppResult<Cart> {
        let carts = self.carts.lock().unwrap();
        let items = carts
            .get(user_id)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|(product_id, quantity)| {
                        self.catalog
                            .iter()
                            .find(|p| &p.id == product_id)
                            .map(|product| CartItem {
                                product: product.clone(),
                                quantity: *quantity,
                            })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Cart::new(user_id, items))
    }
}

/// 内存订单表，插入按 order_id 去重
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<String, Order>>,
    inserts: AtomicUsize,
}

impl InMemoryOrderRepository {
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find(&self, order_id: &str) -> AppResult<Option<Order>> {
        Ok(self.orders.lock().unwrap().get(order_id).cloned())
    }

    async fn insert_if_absent(&self, order_id: &str, status: &str) -> AppResult<Option<Order>> {
        let mut orders = self.orders.lock().unwrap();
        if orders.contains_key(order_id) {
            return Ok(None);
        }
        let order = Order {
            order_id: order_id.to_string(),
            status: status.to_string(),
            updated_at: Utc::now(),
        };
        orders.insert(order_id.to_string(), order.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(Some(order))
    }
}

/// 模拟并发插入失败：第一次查询看不到胜出方写入的订单，插入返回冲突
pub struct RacingOrderRepository {
    winner: Order,
    finds: AtomicUsize,
}

impl RacingOrderRepository {
    pub fn new(winner: Order) -> Self {
        Self {
            winner,
            finds: AtomicUsize::new(0),
        }
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderRepository for RacingOrderRepository {
    async fn find(&self, _order_id: &str) -> AppResult<Option<Order>> {
        let previous = self.finds.fetch_add(1, Ordering::SeqCst);
        Ok((previous > 0).then(|| self.winner.clone()))
    }

    async fn insert_if_absent(&self, _order_id: &str, _status: &str) -> AppResult<Option<Order>> {
        Ok(None)
    }
}

/// 订单仓储始终失败
pub struct FailingOrderRepository;

#[async_trait]
impl OrderRepository for FailingOrderRepository {
    async fn find(&self, _order_id: &str) -> AppResult<Option<Order>> {
        Err(AppError::unavailable("Database connection pool timeout"))
    }

    async fn insert_if_absent(&self, _order_id: &str, _status: &str) -> AppResult<Option<Order>> {
        Err(AppError::unavailable("Database connection pool timeout"))
    }
}

/// 测试夹具
pub struct TestStore {
    pub service: StoreServiceImpl,
    pub carts: Arc<InMemoryCartRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
}

pub fn settings_with_delay(delay: Duration) -> StoreSettings {
    StoreSettings {
        search_stream_delay: delay,
        ..StoreSettings::default()
    }
}

/// 使用初始商品目录构建服务
pub fn test_store() -> TestStore {
    let catalog = seed_products();
    let carts = Arc::new(InMemoryCartRepository::new(catalog.clone()));
    let orders = Arc::new(InMemoryOrderRepository::default());
    let handler = StoreHandler::new(
        Arc::new(InMemoryProductRepository::new(catalog)),
        carts.clone(),
        orders.clone(),
        StoreSettings::default(),
    );
    TestStore {
        service: StoreServiceImpl::new(Arc::new(handler)),
        carts,
        orders,
    }
}

/// 使用指定仓储构建服务
pub fn service_with(
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    settings: StoreSettings,
) -> StoreServiceImpl {
    let handler = StoreHandler::new(
        products,
        Arc::new(InMemoryCartRepository::new(seed_products())),
        orders,
        settings,
    );
    StoreServiceImpl::new(Arc::new(handler))
}
