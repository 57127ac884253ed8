//! Store Service 入口

use std::sync::Arc;

use storefront_bootstrap::{Infrastructure, build_reflection, run_server, tracing_interceptor};
use tracing::info;

use store_service::api::StoreServiceImpl;
use store_service::api::proto::FILE_DESCRIPTOR_SET;
use store_service::api::proto::store::e_commerce_store_server::ECommerceStoreServer;
use store_service::application::{StoreHandler, StoreSettings};
use store_service::infrastructure::persistence::{
    PostgresCartRepository, PostgresOrderRepository, PostgresProductRepository, prepare_database,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_server("config", |infra: Infrastructure, mut server| async move {
        info!("Initializing Store Service...");

        let pool = infra.postgres_pool();
        let config = infra.config();

        prepare_database(&pool, &config.database).await?;

        let handler = Arc::new(StoreHandler::new(
            Arc::new(PostgresProductRepository::new(pool.clone())),
            Arc::new(PostgresCartRepository::new(pool.clone())),
            Arc::new(PostgresOrderRepository::new(pool)),
            StoreSettings::from(&config.store),
        ));

        let reflection_service = build_reflection(vec![FILE_DESCRIPTOR_SET])?;

        info!("gRPC services created");

        Ok(server
            .add_service(ECommerceStoreServer::with_interceptor(
                StoreServiceImpl::new(handler),
                tracing_interceptor,
            ))
            .add_service(reflection_service))
    })
    .await
}
