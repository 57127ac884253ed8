//! 商店 gRPC 服务实现

use std::pin::Pin;
use std::sync::Arc;

use storefront_bootstrap::{RequestTimer, TimedStream, create_request_span, grpc_timeout};
use storefront_errors::AppError;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::{Instrument, error, info, warn};

use super::conversions::{cart_to_proto, order_to_proto, product_to_proto};
use crate::api::proto::store::{
    AddItemRequest, Cart, OrderRequest, OrderStatus, Product, SearchRequest,
    e_commerce_store_server::ECommerceStore,
};
use crate::application::{AddToCartCommand, GetOrderStatusQuery, SearchProductsQuery, StoreHandler};

const SERVICE_NAME: &str = "store.v1.ECommerceStore";

/// 商店 gRPC 服务
pub struct StoreServiceImpl {
    handler: Arc<StoreHandler>,
}

impl StoreServiceImpl {
    pub fn new(handler: Arc<StoreHandler>) -> Self {
        Self { handler }
    }
}

/// 记录失败并转换为 gRPC 状态
fn into_status(method: &str, e: AppError) -> Status {
    if e.is_client_error() {
        warn!(method, error = %e, "Request rejected");
    } else {
        error!(method, error = %e, "Request failed");
    }
    Status::from(e)
}

fn finish_timer<T>(timer: RequestTimer, result: &Result<T, Status>) {
    match result {
        Ok(_) => timer.finish("Ok"),
        Err(status) => timer.finish(&format!("{:?}", status.code())),
    }
}

#[tonic::async_trait]
impl ECommerceStore for StoreServiceImpl {
    type SearchProductsStream =
        Pin<Box<dyn futures::Stream<Item = Result<Product, Status>> + Send>>;

    async fn search_products(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<Self::SearchProductsStream>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "SearchProducts");
        let span = create_request_span(&request, "SearchProducts");
        let timeout = grpc_timeout(&request);
        let req = request.into_inner();

        let rx = span.in_scope(|| {
            info!(query = %req.query, ?timeout, "Processing SearchProducts request");
            self.handler.search_products(SearchProductsQuery {
                query: req.query,
                page_size: req.page_size,
                page_token: req.page_token,
                timeout,
            })
        });

        let stream = ReceiverStream::new(rx).map(|result| {
            result
                .map(product_to_proto)
                .map_err(|e| into_status("SearchProducts", e))
        });

        let stream = TimedStream::new(stream, timer);
        Ok(Response::new(Box::pin(stream) as Self::SearchProductsStream))
    }

    async fn add_to_cart(&self, request: Request<AddItemRequest>) -> Result<Response<Cart>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "AddToCart");
        let span = create_request_span(&request, "AddToCart");
        let req = request.into_inner();

        let result = async {
            info!(
                user_id = %req.user_id,
                product_id = %req.product_id,
                quantity = req.quantity,
                "Processing AddToCart request"
            );
            let cmd = AddToCartCommand {
                user_id: req.user_id,
                product_id: req.product_id,
                quantity: req.quantity,
            };
            self.handler
                .add_to_cart(cmd)
                .await
                .map(|cart| Response::new(cart_to_proto(cart)))
                .map_err(|e| into_status("AddToCart", e))
        }
        .instrument(span)
        .await;

        finish_timer(timer, &result);
        result
    }

    async fn get_order_status(
        &self,
        request: Request<OrderRequest>,
    ) -> Result<Response<OrderStatus>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "GetOrderStatus");
        let span = create_request_span(&request, "GetOrderStatus");
        let req = request.into_inner();

        let result = async {
            info!(order_id = %req.order_id, "Processing GetOrderStatus request");
            self.handler
                .get_order_status(GetOrderStatusQuery {
                    order_id: req.order_id,
                })
                .await
                .map(|order| Response::new(order_to_proto(order)))
                .map_err(|e| into_status("GetOrderStatus", e))
        }
        .instrument(span)
        .await;

        finish_timer(timer, &result);
        result
    }
}
