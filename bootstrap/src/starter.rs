//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use storefront_config::{AppConfig, ServerConfig, TlsConfig};
use storefront_errors::{AppError, AppResult};
use tonic::transport::server::Router;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{error, info};

use crate::health::{HealthChecker, HealthServer};
use crate::infrastructure::Infrastructure;
use crate::metrics::{MetricsRecorder, PoolMetricsCollector};
use crate::runtime::{init_runtime, shutdown_signal};

/// 连接池指标采集间隔
const POOL_METRICS_INTERVAL: Duration = Duration::from_secs(15);

/// 运行 gRPC 服务
///
/// 所有服务的统一入口：
/// 1. 加载配置并初始化日志
/// 2. 创建基础设施（数据库连接带重试）
/// 3. 启动健康检查 HTTP 服务器（gRPC 端口 + 1000）和连接池指标采集
/// 4. 调用闭包注册 gRPC 服务
/// 5. 启动服务器，收到关闭信号后优雅退出
///
/// # 示例
///
/// ```ignore
/// run_server("config", |infra, mut server| async move {
///     let service = MyServiceImpl::new(infra.postgres_pool());
///     Ok(server.add_service(MyServiceServer::new(service)))
/// })
/// .await
/// ```
pub async fn run_server<F, Fut>(
    config_dir: &str,
    build_services: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure, Server) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics = Arc::new(MetricsRecorder::new()?);
    let infra = Infrastructure::from_config(config.clone()).await?;

    let collector_handle = PoolMetricsCollector::new(infra.clone(), POOL_METRICS_INTERVAL).start();

    let health_server = HealthServer::new(
        Arc::new(HealthChecker::new(infra.clone())),
        metrics,
        config.server.host.clone(),
        config.server.health_port(),
    );
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.serve().await {
            error!(error = %e, "Health server error");
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let server = build_server(&config.server).await?;
    let router = build_services(infra, server).await?;

    info!(%addr, tls = config.server.tls.is_some(), "gRPC server starting");

    let result = router.serve_with_shutdown(addr, shutdown_signal()).await;

    health_handle.abort();
    collector_handle.abort();

    result?;
    info!("Service stopped");
    Ok(())
}

/// 按配置创建 gRPC Server（请求超时、TLS）
pub async fn build_server(config: &ServerConfig) -> AppResult<Server> {
    let mut server = Server::builder();

    if let Some(timeout) = config.request_timeout() {
        server = server.timeout(timeout);
    }

    if let Some(tls) = &config.tls {
        let tls_config = load_tls_config(tls).await?;
        server = server
            .tls_config(tls_config)
            .map_err(|e| AppError::internal(format!("Invalid TLS configuration: {}", e)))?;
    }

    Ok(server)
}

async fn load_tls_config(tls: &TlsConfig) -> AppResult<ServerTlsConfig> {
    let cert = tokio::fs::read_to_string(&tls.cert_path).await.map_err(|e| {
        AppError::internal(format!("Failed to read TLS certificate {}: {}", tls.cert_path, e))
    })?;
    let key = tokio::fs::read_to_string(&tls.key_path).await.map_err(|e| {
        AppError::internal(format!("Failed to read TLS key {}: {}", tls.key_path, e))
    })?;

    info!(cert = %tls.cert_path, "TLS enabled");
    Ok(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
}
