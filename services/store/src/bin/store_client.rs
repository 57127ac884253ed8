//! store-client：依次调用三个接口，检查服务是否可用
//!
//! 环境变量：
//! - `SERVER_ADDR`：服务地址，默认 `localhost:6767`
//! - `STORE_TLS_CA`：服务端证书（PEM）路径，设置后使用 TLS 连接

use std::time::Duration;

use anyhow::{Context, Result};
use store_service::api::proto::store::e_commerce_store_client::ECommerceStoreClient;
use store_service::api::proto::store::{AddItemRequest, OrderRequest, SearchRequest};
use storefront_telemetry::{LogFormat, init_tracing};
use tokio::time::Instant;
use tonic::Request;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tracing::{info, warn};

/// 整个运行过程的截止时间
const RUN_DEADLINE: Duration = Duration::from_secs(15);

type StoreClient = ECommerceStoreClient<Channel>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info", LogFormat::Pretty);

    let server_addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| "localhost:6767".to_string());
    let tls_ca = std::env::var("STORE_TLS_CA").ok();

    let channel = connect(&server_addr, tls_ca.as_deref()).await?;
    info!(%server_addr, tls = tls_ca.is_some(), "Connected to gRPC server");

    let mut client = ECommerceStoreClient::new(channel);
    let deadline = Instant::now() + RUN_DEADLINE;

    info!("=== Search products ===");
    search_products(&mut client, deadline, "laptop").await?;

    info!("=== Add to cart ===");
    add_to_cart(&mut client, deadline, "user-123", "1", 2).await;
    add_to_cart(&mut client, deadline, "user-123", "2", 1).await;

    info!("=== Get order status ===");
    get_order_status(&mut client, deadline, "order-xyz-789").await?;

    info!("=== Done ===");
    Ok(())
}

async fn connect(server_addr: &str, tls_ca: Option<&str>) -> Result<Channel> {
    let endpoint = match tls_ca {
        None => Channel::from_shared(format!("http://{}", server_addr))?,
        Some(ca_path) => {
            let pem = tokio::fs::read_to_string(ca_path)
                .await
                .with_context(|| format!("failed to read CA certificate {}", ca_path))?;
            // 证书按主机名校验
            let host = server_addr
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or(server_addr);
            Channel::from_shared(format!("https://{}", server_addr))?.tls_config(
                ClientTlsConfig::new()
                    .ca_certificate(Certificate::from_pem(pem))
                    .domain_name(host),
            )?
        }
    };

    endpoint
        .connect()
        .await
        .with_context(|| format!("failed to connect to {}", server_addr))
}

/// 带剩余截止时间的请求
fn request_with_deadline<T>(message: T, deadline: Instant) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(deadline.saturating_duration_since(Instant::now()));
    request
}

async fn search_products(client: &mut StoreClient, deadline: Instant, query: &str) -> Result<()> {
    let request = request_with_deadline(
        SearchRequest {
            query: query.to_string(),
            ..Default::default()
        },
        deadline,
    );

    let mut stream = client
        .search_products(request)
        .await
        .context("SearchProducts failed")?
        .into_inner();

    let mut count = 0;
    while let Some(product) = stream.message().await.context("SearchProducts stream failed")? {
        count += 1;
        info!(id = %product.id, name = %product.name, price = product.price, "Product");
    }
    info!(query, count, "Search finished");
    Ok(())
}

async fn add_to_cart(
    client: &mut StoreClient,
    deadline: Instant,
    user_id: &str,
    product_id: &str,
    quantity: i32,
) {
    let request = request_with_deadline(
        AddItemRequest {
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
        },
        deadline,
    );

    match client.add_to_cart(request).await {
        Ok(response) => {
            let cart = response.into_inner();
            info!(
                user_id = %cart.user_id,
                items = cart.items.len(),
                total_price = cart.total_price,
                "Cart updated"
            );
        }
        Err(status) => {
            warn!(user_id, product_id, code = ?status.code(), message = %status.message(), "AddToCart failed");
        }
    }
}

async fn get_order_status(client: &mut StoreClient, deadline: Instant, order_id: &str) -> Result<()> {
    let request = request_with_deadline(
        OrderRequest {
            order_id: order_id.to_string(),
        },
        deadline,
    );

    let status = client
        .get_order_status(request)
        .await
        .context("GetOrderStatus failed")?
        .into_inner();

    info!(
        order_id = %status.order_id,
        status = %status.status,
        updated_at = status.updated_at,
        "Order status"
    );
    Ok(())
}
