//! 健康检查模块
//!
//! 提供 /health、/ready 和 /metrics 端点

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use tracing::info;

use crate::Infrastructure;
use crate::metrics::MetricsRecorder;

const HEALTHY: &str = "healthy";
const UNHEALTHY: &str = "unhealthy";

/// 健康检查状态
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub checks: Vec<ComponentHealth>,
}

/// 组件健康状态
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: HEALTHY.to_string(),
            checks: vec![],
        }
    }

    /// 任意一个组件不健康，整体即不健康
    pub fn add_check(&mut self, check: ComponentHealth) {
        if check.status != HEALTHY {
            self.status = UNHEALTHY.to_string();
        }
        self.checks.push(check);
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HEALTHY.to_string(),
            message: None,
        }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: UNHEALTHY.to_string(),
            message: Some(message.into()),
        }
    }
}

/// 健康检查器
pub struct HealthChecker {
    infra: Infrastructure,
}

impl HealthChecker {
    pub fn new(infra: Infrastructure) -> Self {
        Self { infra }
    }

    /// 存活检查：只检查进程是否在运行
    pub async fn liveness(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    /// 就绪检查：检查数据库是否可用
    pub async fn readiness(&self) -> HealthStatus {
        let mut status = HealthStatus::healthy();
        let postgres = match self.infra.check_postgres().await {
            Ok(()) => ComponentHealth::healthy("postgres"),
            Err(e) => ComponentHealth::unhealthy("postgres", e.to_string()),
        };
        status.add_check(postgres);
        status
    }
}

#[derive(Clone)]
struct HealthServerState {
    checker: Arc<HealthChecker>,
    metrics: Arc<MetricsRecorder>,
}

/// HTTP 健康检查服务器
pub struct HealthServer {
    checker: Arc<HealthChecker>,
    metrics: Arc<MetricsRecorder>,
    host: String,
    port: u16,
}

impl HealthServer {
    pub fn new(
        checker: Arc<HealthChecker>,
        metrics: Arc<MetricsRecorder>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            checker,
            metrics,
            host: host.into(),
            port,
        }
    }

    /// 构建路由
    pub fn router(&self) -> Router {
        let state = HealthServerState {
            checker: self.checker.clone(),
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
    }

    /// 启动 HTTP 服务器
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let app = self.router();
        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        info!(%addr, "Health check HTTP server starting");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await
    }
}

async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let status = state.checker.liveness().await;
    (StatusCode::OK, Json(status))
}

async fn ready_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let status = state.checker.readiness().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn metrics_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}
